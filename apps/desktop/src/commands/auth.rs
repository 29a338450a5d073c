//! # Auth Commands
//!
//! Login establishes the session every other command checks. Passwords pass
//! through these functions but are never logged or echoed back.

use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::AppState;
use dukkan_core::{Action, AuthenticatedUser, Role};

#[derive(Clone, Deserialize)]
pub struct LoginArgs {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginArgs")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct AddUserArgs {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Cashier
}

impl fmt::Debug for AddUserArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddUserArgs")
            .field("username", &self.username)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

/// Verifies credentials and makes the user current.
///
/// A failed login leaves any existing session untouched.
pub async fn login(state: &AppState, args: LoginArgs) -> ApiResult<AuthenticatedUser> {
    debug!(username = %args.username, "login command");

    let user = state
        .db
        .inner()
        .users()
        .authenticate(&args.username, &args.password)
        .await?;

    state.session.set(user.clone()).await;
    Ok(user)
}

pub async fn logout(state: &AppState) -> ApiResult<()> {
    if let Some(user) = state.session.clear().await {
        info!(user_id = %user.id, "Logged out");
    }
    Ok(())
}

/// The logged-in user, or `null`.
pub async fn current_user(state: &AppState) -> ApiResult<Option<AuthenticatedUser>> {
    Ok(state.session.current().await)
}

/// Creates an operator account (admins only).
pub async fn add_user(state: &AppState, args: AddUserArgs) -> ApiResult<AuthenticatedUser> {
    state.session.require(Action::ManageUsers).await?;
    debug!(username = %args.username, role = args.role.as_str(), "add_user command");

    let user = state
        .db
        .inner()
        .users()
        .create(&args.username, &args.password, args.role)
        .await?;
    Ok(AuthenticatedUser::from(&user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{state, state_as};

    fn creds(username: &str, password: &str) -> LoginArgs {
        LoginArgs {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_logout_cycle() {
        let state = state().await;
        assert!(current_user(&state).await.unwrap().is_none());

        let user = login(&state, creds("admin", "password")).await.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(current_user(&state).await.unwrap(), Some(user));

        logout(&state).await.unwrap();
        assert!(current_user(&state).await.unwrap().is_none());
        // logging out twice is harmless
        logout(&state).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_login_keeps_session() {
        let state = state_as(Role::Cashier).await;

        let wrong = login(&state, creds("admin", "guess")).await.unwrap_err();
        let unknown = login(&state, creds("nobody", "guess")).await.unwrap_err();
        assert_eq!(wrong, unknown);
        assert_eq!(wrong.code, ErrorCode::InvalidCredentials);

        let current = current_user(&state).await.unwrap().unwrap();
        assert_eq!(current.username, "cashier");
    }

    #[tokio::test]
    async fn test_add_user_admin_only() {
        let state = state_as(Role::Admin).await;
        let created = add_user(
            &state,
            AddUserArgs {
                username: "layla".to_string(),
                password: "secret".to_string(),
                role: Role::Cashier,
            },
        )
        .await
        .unwrap();
        assert_eq!(created.role, Role::Cashier);

        login(&state, creds("layla", "secret")).await.unwrap();
        let err = add_user(
            &state,
            AddUserArgs {
                username: "omar".to_string(),
                password: "secret".to_string(),
                role: Role::Admin,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", creds("admin", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
