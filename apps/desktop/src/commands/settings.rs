//! # Settings Commands
//!
//! Reads come from the host's snapshot; updates go to the database first and
//! the snapshot is replaced with what was stored.

use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::AppState;
use dukkan_core::{Action, Settings, SettingsPatch};

pub async fn get_settings(state: &AppState) -> ApiResult<Settings> {
    state.session.require(Action::ReadSettings).await?;
    debug!("get_settings command");

    Ok(state.settings.get().await)
}

/// Applies the provided keys and returns the full refreshed settings.
///
/// An empty patch changes nothing and returns the stored settings.
pub async fn update_settings(state: &AppState, patch: SettingsPatch) -> ApiResult<Settings> {
    let user = state.session.require(Action::UpdateSettings).await?;
    debug!(empty = patch.is_empty(), "update_settings command");

    let updated = state.db.inner().settings().update(&patch).await?;
    state.settings.replace(updated.clone()).await;

    info!(user_id = %user.id, "Settings snapshot refreshed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::state_as;
    use dukkan_core::{Role, Theme};

    #[tokio::test]
    async fn test_update_refreshes_snapshot() {
        let state = state_as(Role::Admin).await;
        assert_eq!(get_settings(&state).await.unwrap().tax_rate.bps(), 1_500);

        let updated = update_settings(
            &state,
            SettingsPatch {
                tax_rate: Some("5".to_string()),
                theme: Some(Theme::Dark),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.tax_rate.bps(), 500);

        let snapshot = get_settings(&state).await.unwrap();
        assert_eq!(snapshot, updated);
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_snapshot() {
        let state = state_as(Role::Admin).await;
        let before = get_settings(&state).await.unwrap();

        let err = update_settings(
            &state,
            SettingsPatch {
                language: Some("fr".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_settings(&state).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_cashier_reads_only() {
        let state = state_as(Role::Cashier).await;
        assert!(get_settings(&state).await.is_ok());

        let err = update_settings(&state, SettingsPatch::default()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }
}
