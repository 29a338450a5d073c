//! # Request/Response Bridge
//!
//! The UI talks to the host through newline-delimited JSON: one request per
//! stdin line, one response per stdout line, in order.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin   {"op":"login","args":{"username":"admin","password":"..."}}    │
//! │  stdout  {"ok":true,"data":{"id":"...","username":"admin",...}}         │
//! │                                                                         │
//! │  stdin   {"op":"getProducts"}                                           │
//! │  stdout  {"ok":true,"data":[...]}                                       │
//! │                                                                         │
//! │  stdin   {"op":"deleteProduct","args":{"id":"..."}}                     │
//! │  stdout  {"ok":false,"error":{"code":"CONFLICT_ERROR","message":"..."}} │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `args` may be omitted or `null` for operations without arguments, and
//! for operations whose arguments are all optional. Blank lines are ignored.
//! Requests are handled one at a time.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

use super::auth::{self, AddUserArgs, LoginArgs};
use super::customer::{self, GetCustomersArgs, UpdateCustomerArgs};
use super::expense;
use super::product::{self, AdjustStockArgs, SearchProductsArgs, UpdateProductArgs};
use super::report::{self, SalesReportArgs};
use super::sale;
use super::settings;
use super::{DateRangeArgs, IdArgs};
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::AppState;
use dukkan_core::{Cart, CustomerInput, ExpenseInput, ProductInput, SettingsPatch};
use dukkan_db::SaleFilter;

// =============================================================================
// Requests
// =============================================================================

/// Every operation the host understands, with its arguments.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "camelCase")]
pub enum Request {
    // Catalog
    GetProducts {},
    SearchProducts(SearchProductsArgs),
    AddProduct(ProductInput),
    UpdateProduct(UpdateProductArgs),
    DeleteProduct(IdArgs),
    AdjustStock(AdjustStockArgs),

    // Customers
    GetCustomers(GetCustomersArgs),
    AddCustomer(CustomerInput),
    UpdateCustomer(UpdateCustomerArgs),
    DeleteCustomer(IdArgs),

    // Sales
    CreateSale(Cart),
    GetSales(SaleFilter),
    GetSale(IdArgs),

    // Reports
    GetSalesReport(SalesReportArgs),
    GetDashboard {},

    // Expenses
    AddExpense(ExpenseInput),
    GetExpenses(DateRangeArgs),

    // Session & users
    Login(LoginArgs),
    Logout {},
    CurrentUser {},
    AddUser(AddUserArgs),

    // Settings
    GetSettings {},
    UpdateSettings(SettingsPatch),
}

#[derive(Deserialize)]
struct Envelope {
    op: String,
    #[serde(default)]
    args: Value,
}

/// Parses one request line.
///
/// ## Errors
/// `BAD_REQUEST` when the line is not JSON, names no known operation, or
/// carries arguments of the wrong shape.
pub fn parse_request(line: &str) -> ApiResult<Request> {
    let envelope: Envelope = serde_json::from_str(line)
        .map_err(|e| ApiError::bad_request(format!("Malformed request: {}", e)))?;

    let args = match envelope.args {
        Value::Null => Value::Object(Map::new()),
        args => args,
    };

    serde_json::from_value(json!({ "op": envelope.op, "args": args })).map_err(|e| {
        ApiError::bad_request(format!("Invalid request for '{}': {}", envelope.op, e))
    })
}

// =============================================================================
// Responses
// =============================================================================

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    pub fn success(data: Value) -> Self {
        Response {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ApiError) -> Self {
        Response {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

impl From<ApiResult<Value>> for Response {
    fn from(result: ApiResult<Value>) -> Self {
        match result {
            Ok(data) => Response::success(data),
            Err(e) => Response::failure(e),
        }
    }
}

fn to_data<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| {
        error!(error = %e, "Could not encode response");
        ApiError::internal("Could not encode response")
    })
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one request against `state`.
pub async fn dispatch(state: &AppState, request: Request) -> ApiResult<Value> {
    match request {
        Request::GetProducts {} => to_data(product::get_products(state).await?),
        Request::SearchProducts(args) => to_data(product::search_products(state, args).await?),
        Request::AddProduct(input) => to_data(product::add_product(state, input).await?),
        Request::UpdateProduct(args) => to_data(product::update_product(state, args).await?),
        Request::DeleteProduct(args) => to_data(product::delete_product(state, args).await?),
        Request::AdjustStock(args) => to_data(product::adjust_stock(state, args).await?),

        Request::GetCustomers(args) => to_data(customer::get_customers(state, args).await?),
        Request::AddCustomer(input) => to_data(customer::add_customer(state, input).await?),
        Request::UpdateCustomer(args) => to_data(customer::update_customer(state, args).await?),
        Request::DeleteCustomer(args) => to_data(customer::delete_customer(state, args).await?),

        Request::CreateSale(cart) => to_data(sale::create_sale(state, cart).await?),
        Request::GetSales(filter) => to_data(sale::get_sales(state, filter).await?),
        Request::GetSale(args) => to_data(sale::get_sale(state, args).await?),

        Request::GetSalesReport(args) => to_data(report::get_sales_report(state, args).await?),
        Request::GetDashboard {} => to_data(report::get_dashboard(state).await?),

        Request::AddExpense(input) => to_data(expense::add_expense(state, input).await?),
        Request::GetExpenses(args) => to_data(expense::get_expenses(state, args).await?),

        Request::Login(args) => to_data(auth::login(state, args).await?),
        Request::Logout {} => to_data(auth::logout(state).await?),
        Request::CurrentUser {} => to_data(auth::current_user(state).await?),
        Request::AddUser(args) => to_data(auth::add_user(state, args).await?),

        Request::GetSettings {} => to_data(settings::get_settings(state).await?),
        Request::UpdateSettings(patch) => to_data(settings::update_settings(state, patch).await?),
    }
}

/// Parses, dispatches, and wraps one request line.
pub async fn handle_line(state: &AppState, line: &str) -> Response {
    let start = Instant::now();

    let result = match parse_request(line) {
        Ok(request) => dispatch(state, request).await,
        Err(e) => Err(e),
    };

    match &result {
        Ok(_) => debug!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Request handled"
        ),
        Err(e) => debug!(
            code = ?e.code,
            message = %e.message,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Request failed"
        ),
    }

    Response::from(result)
}

// =============================================================================
// Line Loop
// =============================================================================

/// Serves requests from `reader` until end of input, writing each response
/// as one line to `writer`.
pub async fn serve<R, W>(state: &AppState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(state, &line).await;
        if let Some(e) = &response.error {
            if e.code == ErrorCode::BadRequest {
                warn!(message = %e.message, "Rejected request line");
            }
        }

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
        handled += 1;
    }

    debug!(handled, "Input closed");
    Ok(())
}
