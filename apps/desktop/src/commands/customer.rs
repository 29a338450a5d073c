//! # Customer Commands
//!
//! Customer records are optional on a sale; a sale without one is a walk-in.

use serde::Deserialize;
use tracing::debug;

use super::IdArgs;
use crate::error::ApiResult;
use crate::state::AppState;
use dukkan_core::{Action, Customer, CustomerInput};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetCustomersArgs {
    /// Filters by name or phone when present and not blank.
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCustomerArgs {
    pub id: String,
    pub customer: CustomerInput,
}

pub async fn get_customers(state: &AppState, args: GetCustomersArgs) -> ApiResult<Vec<Customer>> {
    state.session.require(Action::ManageCustomers).await?;
    debug!(query = ?args.query, "get_customers command");

    let customers = state.db.inner().customers();
    let found = match args.query.as_deref() {
        Some(query) => customers.search(query).await?,
        None => customers.list().await?,
    };
    Ok(found)
}

pub async fn add_customer(state: &AppState, input: CustomerInput) -> ApiResult<Customer> {
    state.session.require(Action::ManageCustomers).await?;
    debug!("add_customer command");

    Ok(state.db.inner().customers().create(&input).await?)
}

pub async fn update_customer(state: &AppState, args: UpdateCustomerArgs) -> ApiResult<Customer> {
    state.session.require(Action::ManageCustomers).await?;
    debug!(id = %args.id, "update_customer command");

    Ok(state.db.inner().customers().update(&args.id, &args.customer).await?)
}

/// Removes a customer. Customers attached to past sales are kept and the
/// call fails with `CONFLICT_ERROR`.
pub async fn delete_customer(state: &AppState, args: IdArgs) -> ApiResult<()> {
    state.session.require(Action::ManageCustomers).await?;
    debug!(id = %args.id, "delete_customer command");

    state.db.inner().customers().delete(&args.id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{state, state_as};
    use dukkan_core::Role;

    fn input(name: &str, phone: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            phone: Some(phone.to_string()),
            email: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_cashier_manages_customers() {
        let state = state_as(Role::Cashier).await;

        let ahmed = add_customer(&state, input("Ahmed", "0500000001")).await.unwrap();
        add_customer(&state, input("Sara", "0500000002")).await.unwrap();

        let all = get_customers(&state, GetCustomersArgs::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let by_phone = get_customers(
            &state,
            GetCustomersArgs {
                query: Some("0002".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].name, "Sara");

        let renamed = update_customer(
            &state,
            UpdateCustomerArgs {
                id: ahmed.id.clone(),
                customer: input("Ahmed Ali", "0500000001"),
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "Ahmed Ali");

        delete_customer(&state, IdArgs { id: ahmed.id }).await.unwrap();
        assert_eq!(get_customers(&state, GetCustomersArgs::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_customer_not_found() {
        let state = state_as(Role::Admin).await;
        let err = update_customer(
            &state,
            UpdateCustomerArgs {
                id: "missing".to_string(),
                customer: input("Nobody", "1"),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_requires_login() {
        let state = state().await;
        let err = get_customers(&state, GetCustomersArgs::default()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }
}
