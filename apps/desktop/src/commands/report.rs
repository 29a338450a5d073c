//! # Report Commands
//!
//! Sales report over a date range (admins) and the dashboard summary
//! (everyone logged in). Dates are UTC calendar days.

use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;
use dukkan_core::{Action, DashboardSummary, DateRange, SalesReport, DEFAULT_TOP_PRODUCTS};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportArgs {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    #[serde(default)]
    pub top_n: Option<usize>,
}

pub async fn get_sales_report(state: &AppState, args: SalesReportArgs) -> ApiResult<SalesReport> {
    state.session.require(Action::ViewReports).await?;
    debug!(start = %args.start, end = %args.end, "get_sales_report command");

    let range = DateRange::new(args.start, args.end)?;
    let top_n = args.top_n.unwrap_or(DEFAULT_TOP_PRODUCTS);

    Ok(state.db.inner().sales().report(range, top_n).await?)
}

/// Today, month-to-date, and the last seven days.
pub async fn get_dashboard(state: &AppState) -> ApiResult<DashboardSummary> {
    state.session.require(Action::ViewDashboard).await?;
    let today = Utc::now().date_naive();
    debug!(%today, "get_dashboard command");

    Ok(state.db.inner().sales().dashboard(today).await?)
}
