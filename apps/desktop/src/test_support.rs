//! Fixtures shared by the command tests.

use dukkan_core::{AuthenticatedUser, Product, ProductInput, Role};
use dukkan_db::{Database, DbConfig};

use crate::state::AppState;

/// Fresh in-memory state with the default admin and nobody logged in.
pub async fn state() -> AppState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    AppState::bootstrap(db, "password").await.unwrap()
}

/// Fresh state with a user of `role` already logged in.
pub async fn state_as(role: Role) -> AppState {
    let state = state().await;
    let user = match role {
        Role::Admin => state.db.inner().users().get_by_username("admin").await.unwrap().unwrap(),
        Role::Cashier => state
            .db
            .inner()
            .users()
            .create("cashier", "secret", Role::Cashier)
            .await
            .unwrap(),
    };
    state.session.set(AuthenticatedUser::from(&user)).await;
    state
}

pub fn product_input(code: &str, price_cents: i64, quantity: i64) -> ProductInput {
    ProductInput {
        code: code.to_string(),
        name: format!("Product {code}"),
        description: None,
        price_cents,
        cost_cents: 0,
        quantity,
        category: None,
        image_path: None,
    }
}

pub async fn seed_product(state: &AppState, code: &str, price_cents: i64, quantity: i64) -> Product {
    state
        .db
        .inner()
        .products()
        .create(&product_input(code, price_cents, quantity))
        .await
        .unwrap()
}
