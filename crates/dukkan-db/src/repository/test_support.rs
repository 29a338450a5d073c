//! Fixtures shared by the repository tests.

use dukkan_core::{Cart, CartLine, PaymentMethod, Product, ProductInput, Role, User};

use crate::pool::Database;

pub async fn seed_admin(db: &Database) -> User {
    db.users()
        .create("admin", "password", Role::Admin)
        .await
        .unwrap()
}

pub async fn seed_product(db: &Database, code: &str, price_cents: i64, quantity: i64) -> Product {
    db.products()
        .create(&ProductInput {
            code: code.to_string(),
            name: format!("Product {code}"),
            description: None,
            price_cents,
            cost_cents: 0,
            quantity,
            category: None,
            image_path: None,
        })
        .await
        .unwrap()
}

/// A cart built directly from lines, bypassing the add-time stock check.
pub fn cart_of(lines: &[(&Product, i64)], payment_method: PaymentMethod, discount_cents: i64) -> Cart {
    Cart {
        lines: lines
            .iter()
            .map(|(product, qty)| CartLine::from_product(product, *qty))
            .collect(),
        payment_method,
        discount_cents,
        customer_id: None,
    }
}
