//! # Expense Commands

use tracing::debug;

use super::DateRangeArgs;
use crate::error::ApiResult;
use crate::state::AppState;
use dukkan_core::{Action, Expense, ExpenseInput};

/// Records an expense attributed to the logged-in user.
pub async fn add_expense(state: &AppState, input: ExpenseInput) -> ApiResult<Expense> {
    let user = state.session.require(Action::RecordExpense).await?;
    debug!(amount_cents = input.amount_cents, "add_expense command");

    Ok(state.db.inner().expenses().create(&input, &user.id).await?)
}

pub async fn get_expenses(state: &AppState, args: DateRangeArgs) -> ApiResult<Vec<Expense>> {
    state.session.require(Action::ViewExpenses).await?;
    debug!(start = %args.start, end = %args.end, "get_expenses command");

    let range = args.to_range()?;
    Ok(state.db.inner().expenses().list(range).await?)
}
