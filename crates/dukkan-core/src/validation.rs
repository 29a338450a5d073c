//! # Validation Module
//!
//! Input validation for everything that crosses the bridge into the store.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: UI form            empty fields, obvious typos               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Bridge (Rust)      deserialization + THIS MODULE             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite             NOT NULL, UNIQUE(code), CHECK, FOREIGN KEY │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators take borrowed input and return `ValidationResult<()>`; the
//! repositories call them before touching the database so the caller gets
//! a field-level message instead of a constraint failure.

use crate::error::ValidationError;
use crate::types::{CustomerInput, ExpenseInput, ProductInput};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_CODE_LEN: usize = 50;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_TEXT_LEN: usize = 1_000;
pub const MIN_PASSWORD_LEN: usize = 4;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a product code.
///
/// ```rust
/// use dukkan_core::validation::validate_code;
///
/// assert!(validate_code("P001").is_ok());
/// assert!(validate_code("  ").is_err());
/// assert!(validate_code("P 001").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    required_text("code", code, MAX_CODE_LEN)?;

    if code.trim().chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            "code",
            "must not contain spaces",
        ));
    }

    Ok(())
}

/// Product names may be Arabic, English, or mixed; only presence and
/// length are checked.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required_text("name", name, MAX_NAME_LEN)
}

/// Normalizes a search box entry. Empty means "list everything".
pub fn normalize_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    if query.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// A line quantity: `1..=MAX_ITEM_QUANTITY`.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Number of lines in a cart.
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }
    Ok(())
}

/// Any amount that may be zero but never negative (price, cost, stock).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Checks every field of a product create/update request.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_code(&input.code)?;
    validate_product_name(&input.name)?;
    optional_text("description", input.description.as_deref(), MAX_TEXT_LEN)?;
    optional_text("category", input.category.as_deref(), MAX_NAME_LEN)?;
    validate_non_negative("price", input.price_cents)?;
    validate_non_negative("cost", input.cost_cents)?;
    validate_non_negative("quantity", input.quantity)?;
    Ok(())
}

pub fn validate_customer_input(input: &CustomerInput) -> ValidationResult<()> {
    required_text("name", &input.name, MAX_NAME_LEN)?;
    optional_text("phone", input.phone.as_deref(), 50)?;
    optional_text("address", input.address.as_deref(), MAX_TEXT_LEN)?;

    if let Some(email) = input.email.as_deref().map(str::trim) {
        if !email.is_empty() && !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @"));
        }
    }

    Ok(())
}

pub fn validate_expense_input(input: &ExpenseInput) -> ValidationResult<()> {
    required_text("description", &input.description, MAX_TEXT_LEN)?;
    required_text("category", &input.category, MAX_NAME_LEN)?;
    if input.amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

pub fn validate_username(username: &str) -> ValidationResult<()> {
    required_text("username", username, 50)
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::OutOfRange {
            field: "password length".to_string(),
            min: MIN_PASSWORD_LEN as i64,
            max: 128,
        });
    }
    Ok(())
}

// =============================================================================
// ID Validators
// =============================================================================

/// Validates a UUID string (as generated by the repositories).
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ValidationError::invalid_format("id", "not a valid UUID"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, name: &str, price: i64) -> ProductInput {
        ProductInput {
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            price_cents: price,
            cost_cents: 0,
            quantity: 0,
            category: None,
            image_path: None,
        }
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("P001").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code(&"X".repeat(51)).is_err());
        assert!(validate_code("A B").is_err());
    }

    #[test]
    fn test_product_name_accepts_arabic() {
        assert!(validate_product_name("لابتوب HP").is_ok());
        assert!(validate_product_name("   ").is_err());
    }

    #[test]
    fn test_validate_product_input() {
        assert!(validate_product_input(&product("P001", "Laptop", 299_999)).is_ok());
        assert!(validate_product_input(&product("P001", "Laptop", 0)).is_ok());

        let err = validate_product_input(&product("P001", "Laptop", -1)).unwrap_err();
        assert!(matches!(err, ValidationError::Negative { ref field } if field == "price"));

        let mut neg_stock = product("P001", "Laptop", 100);
        neg_stock.quantity = -3;
        assert!(validate_product_input(&neg_stock).is_err());

        assert!(validate_product_input(&product("", "Laptop", 1)).is_err());
        assert!(validate_product_input(&product("P1", "", 1)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(MAX_ITEM_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_quantity(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(MAX_CART_ITEMS).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS + 1).is_err());
    }

    #[test]
    fn test_validate_customer() {
        let ok = CustomerInput {
            name: "Sara".to_string(),
            phone: Some("0500000000".to_string()),
            email: Some("sara@example.com".to_string()),
            address: None,
        };
        assert!(validate_customer_input(&ok).is_ok());

        let bad_email = CustomerInput {
            email: Some("sara.example.com".to_string()),
            ..ok.clone()
        };
        assert!(validate_customer_input(&bad_email).is_err());

        let no_name = CustomerInput {
            name: " ".to_string(),
            ..ok
        };
        assert!(validate_customer_input(&no_name).is_err());
    }

    #[test]
    fn test_validate_expense() {
        let input = ExpenseInput {
            description: "Rent".to_string(),
            amount_cents: 150_000,
            category: "rent".to_string(),
        };
        assert!(validate_expense_input(&input).is_ok());
        assert!(validate_expense_input(&ExpenseInput {
            amount_cents: 0,
            ..input
        })
        .is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("abc").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
