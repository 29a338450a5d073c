//! # API Error Type
//!
//! Unified error type for bridge operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Dukkan POS                             │
//! │                                                                         │
//! │  UI                          Rust Backend                               │
//! │  ──                          ────────────                               │
//! │                                                                         │
//! │  {"op":"createSale","args":{...}}                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                          (logged, generic message)    │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Domain Error? ──── CoreError::InsufficientStock ── ApiError ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄────────────────────────────────────────────────────────────────────  │
//! │                                                                         │
//! │  {"ok":false,"error":{"code":"INSUFFICIENT_STOCK","message":"..."}}     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use dukkan_core::{CoreError, ValidationError};
use dukkan_db::DbError;

/// Result type for bridge commands.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned from a bridge operation.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 0c4d..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed, including cart and discount rules
    ValidationError,

    /// Duplicate code/username, or a delete blocked by sale history
    ConflictError,

    /// A cart line exceeds on-hand stock at commit
    InsufficientStock,

    /// Wrong username or password
    InvalidCredentials,

    /// Resource not found
    NotFound,

    /// Database operation failed
    StorageError,

    /// Operation requires a logged-in user
    Unauthenticated,

    /// Logged-in user's role may not perform the operation
    PermissionDenied,

    /// Request line was not a well-formed operation
    BadRequest,

    /// Response could not be produced
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthenticated() -> Self {
        ApiError::new(ErrorCode::Unauthenticated, "Login required")
    }

    pub fn permission_denied(action: impl std::fmt::Debug) -> Self {
        ApiError::new(
            ErrorCode::PermissionDenied,
            format!("Not allowed: {:?}", action),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
///
/// Storage failures are logged in full and reported with a generic message.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ConflictError,
                format!("{} '{}' already exists", field, value),
            ),
            err @ DbError::InUse { .. } => ApiError::new(ErrorCode::ConflictError, err.to_string()),
            DbError::ForeignKeyViolation { message } => {
                warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::Domain(core) => ApiError::from(core),
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::StorageError, "Database is busy")
            }
            DbError::Hashing(e) => {
                error!("Credential hashing failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database operation failed")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            err @ CoreError::InsufficientStock { .. } => {
                let shortfall = err.shortfall().unwrap_or_default();
                ApiError::new(
                    ErrorCode::InsufficientStock,
                    format!("{} (short by {})", err, shortfall),
                )
            }
            err @ CoreError::InvalidCredentials => {
                ApiError::new(ErrorCode::InvalidCredentials, err.to_string())
            }
            CoreError::Validation(e) => ApiError::from(e),
            err @ (CoreError::EmptyCart | CoreError::InvalidDiscount { .. }) => {
                ApiError::validation(err.to_string())
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}
