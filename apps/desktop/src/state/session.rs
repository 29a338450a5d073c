//! # Session State
//!
//! Remembers who is logged in for the lifetime of the host process. There is
//! no expiry; `logout` or a restart ends the session.
//!
//! ```text
//! login ok ──► Some(AuthenticatedUser) ──► require(action) ──► can(role, action)
//!                     │                           │
//!                  logout                     None → UNAUTHENTICATED
//!                     ▼                       false → PERMISSION_DENIED
//!                   None
//! ```

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use dukkan_core::{can, Action, AuthenticatedUser};

#[derive(Debug, Default)]
pub struct SessionState {
    current: RwLock<Option<AuthenticatedUser>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<AuthenticatedUser> {
        self.current.read().await.clone()
    }

    pub async fn set(&self, user: AuthenticatedUser) {
        *self.current.write().await = Some(user);
    }

    /// Forgets the logged-in user, returning who it was.
    pub async fn clear(&self) -> Option<AuthenticatedUser> {
        self.current.write().await.take()
    }

    /// The logged-in user, provided their role allows `action`.
    ///
    /// ## Errors
    /// * `UNAUTHENTICATED` - Nobody is logged in
    /// * `PERMISSION_DENIED` - The role may not perform `action`
    pub async fn require(&self, action: Action) -> ApiResult<AuthenticatedUser> {
        let user = self.current().await.ok_or_else(ApiError::unauthenticated)?;

        if !can(user.role, action) {
            warn!(user_id = %user.id, role = user.role.as_str(), ?action, "Permission denied");
            return Err(ApiError::permission_denied(action));
        }

        debug!(user_id = %user.id, ?action, "Permission granted");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use dukkan_core::Role;

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            id: "u-1".to_string(),
            username: "sam".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_require_without_login() {
        let session = SessionState::new();
        let err = session.require(Action::ViewCatalog).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }

    #[tokio::test]
    async fn test_cashier_gate() {
        let session = SessionState::new();
        session.set(user(Role::Cashier)).await;

        assert!(session.require(Action::RecordSale).await.is_ok());
        let err = session.require(Action::ManageProducts).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_clear() {
        let session = SessionState::new();
        session.set(user(Role::Admin)).await;

        let previous = session.clear().await;
        assert_eq!(previous.map(|u| u.username), Some("sam".to_string()));
        assert!(session.current().await.is_none());
        assert!(session.clear().await.is_none());
    }
}
