//! Submission command handlers
//!
//! One-shot helpers that drive the picker runtime end to end: load a file,
//! choose columns, submit and wait for the outcome notification.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

use crate::commands::import::load_file;
use crate::core::models::{AppError, AppResult, CsvDocument, PickerNotification};
use crate::AppState;

/// Everything needed to geocode a file without interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeRequest {
    pub file_path: String,
    /// Columns to send, in order
    pub columns: Vec<String>,
    pub match_all: bool,
}

/// Result of a successful submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeSummary {
    pub document: CsvDocument,
    pub location: Option<String>,
}

/// Load, pick and submit a file, then wait for the server's answer
pub async fn geocode_file(
    state: &AppState,
    request: GeocodeRequest,
) -> Result<GeocodeSummary, String> {
    info!(
        "🌍 Geocoding {} with columns {:?}",
        request.file_path, request.columns
    );

    match geocode_file_impl(state, request).await {
        Ok(summary) => {
            info!(
                "✅ Received {} bytes of geocoded CSV",
                summary.document.content.len()
            );
            Ok(summary)
        }
        Err(e) => {
            error!("❌ Geocoding failed: {}", e);
            Err(e)
        }
    }
}

async fn geocode_file_impl(
    state: &AppState,
    request: GeocodeRequest,
) -> Result<GeocodeSummary, String> {
    let timeout = state.wait_timeout().await;
    let mut events = state.picker.subscribe();

    load_file(state, request.file_path.clone()).await?;
    wait_for_load(&mut events, timeout)
        .await
        .map_err(|e| e.to_string())?;

    for column in &request.columns {
        state
            .picker
            .drop_on_chosen(column.as_str())
            .await
            .map_err(|e| e.to_string())?;
    }
    state
        .picker
        .set_match_all(request.match_all)
        .await
        .map_err(|e| e.to_string())?;

    submit_and_wait(state).await
}

/// Submit whatever is currently chosen and wait for the outcome
pub async fn submit_and_wait(state: &AppState) -> Result<GeocodeSummary, String> {
    let timeout = state.wait_timeout().await;
    let mut events = state.picker.subscribe();

    state.picker.submit().await.map_err(|e| e.to_string())?;
    wait_for_submission(&mut events, timeout)
        .await
        .map_err(|e| e.to_string())
}

/// Wait for the next load outcome; returns the parsed headers
pub async fn wait_for_load(
    events: &mut broadcast::Receiver<PickerNotification>,
    timeout: Duration,
) -> AppResult<Vec<String>> {
    loop {
        match next_notification(events, timeout).await? {
            PickerNotification::Loaded { headers, .. } => return Ok(headers),
            PickerNotification::LoadAborted { reason, .. } => {
                return Err(AppError::Parse(format!("File not loaded: {}", reason)))
            }
            _ => continue,
        }
    }
}

/// Wait for the next submission outcome
pub async fn wait_for_submission(
    events: &mut broadcast::Receiver<PickerNotification>,
    timeout: Duration,
) -> AppResult<GeocodeSummary> {
    loop {
        match next_notification(events, timeout).await? {
            PickerNotification::SubmitSucceeded {
                document, location, ..
            } => return Ok(GeocodeSummary { document, location }),
            PickerNotification::SubmitFailed { message, .. } => {
                return Err(AppError::Submit(message))
            }
            _ => continue,
        }
    }
}

async fn next_notification(
    events: &mut broadcast::Receiver<PickerNotification>,
    timeout: Duration,
) -> AppResult<PickerNotification> {
    loop {
        match tokio::time::timeout(timeout, events.recv()).await {
            Ok(Ok(notification)) => return Ok(notification),
            Ok(Err(RecvError::Lagged(skipped))) => {
                warn!("Missed {} picker notifications", skipped);
            }
            Ok(Err(RecvError::Closed)) => {
                return Err(AppError::System("Picker runtime stopped".into()))
            }
            Err(_) => {
                return Err(AppError::System(format!(
                    "No answer after {} seconds",
                    timeout.as_secs()
                )))
            }
        }
    }
}
