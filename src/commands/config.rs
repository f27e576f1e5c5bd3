//! Configuration command handlers

use tracing::{error, info};

use crate::core::AppConfig;
use crate::AppState;

/// Get current application configuration
pub async fn get_config(state: &AppState) -> Result<AppConfig, String> {
    info!("⚙️ Getting application configuration");

    let config = state.config.read().await;
    Ok(config.clone())
}

/// Validate, persist and apply a new configuration.
///
/// The picker keeps the endpoint it was started with; a new endpoint takes
/// effect the next time the application starts.
pub async fn update_config(state: &AppState, new_config: AppConfig) -> Result<(), String> {
    info!("🔧 Updating application configuration");

    let result = new_config.validate().and_then(|_| new_config.save());
    match result {
        Ok(()) => {
            *state.config.write().await = new_config;
            info!("✅ Configuration updated successfully");
            Ok(())
        }
        Err(e) => {
            error!("❌ Failed to update configuration: {}", e);
            Err(e.to_string())
        }
    }
}

/// Reset configuration to default values
pub async fn reset_config(state: &AppState) -> Result<AppConfig, String> {
    info!("🔄 Resetting configuration to defaults");

    match AppConfig::reset() {
        Ok(config) => {
            *state.config.write().await = config.clone();
            info!("✅ Configuration reset successfully");
            Ok(config)
        }
        Err(e) => {
            error!("❌ Failed to reset configuration: {}", e);
            Err(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DetachedPresenter;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_config_returns_running_values() {
        let mut config = AppConfig::default();
        config.submit.post_url = Some("/geocode/".to_string());
        let state = AppState::with_presenter(config, Arc::new(DetachedPresenter)).unwrap();

        let current = get_config(&state).await.unwrap();
        assert_eq!(current.submit.post_url.as_deref(), Some("/geocode/"));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_config() {
        let state =
            AppState::with_presenter(AppConfig::default(), Arc::new(DetachedPresenter)).unwrap();
        let mut invalid = AppConfig::default();
        invalid.intake.preview_rows = 5000;

        assert!(update_config(&state, invalid).await.is_err());
        assert_eq!(get_config(&state).await.unwrap().intake.preview_rows, 10);
    }
}
