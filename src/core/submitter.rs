//! HTTP submission of the chosen columns
//!
//! The request is a multipart form with three kinds of fields:
//! `data` (the raw file), one `columns` entry per chosen column in order, and
//! `match_all` as `"true"` or `"false"`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::core::models::{AppResult, SubmissionPayload, SubmitResponse, UPLOAD_MIME};

/// Sends a submission payload to the geocoding endpoint
#[async_trait]
pub trait HttpSubmitter: Send + Sync {
    async fn submit(&self, endpoint: &Url, payload: SubmissionPayload)
        -> AppResult<SubmitResponse>;
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitterConfig {
    /// Request timeout in seconds
    pub timeout: u64,
    pub user_agent: String,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            timeout: crate::utils::network::DEFAULT_TIMEOUT.as_secs(),
            user_agent: crate::utils::network::get_user_agent().to_string(),
        }
    }
}

/// `reqwest` backed submitter
#[derive(Debug, Clone)]
pub struct ReqwestSubmitter {
    client: Client,
}

impl ReqwestSubmitter {
    pub fn new(config: SubmitterConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent)
            .build()?;
        Ok(Self { client })
    }
}

/// Build the multipart form for a payload
pub fn build_form(payload: SubmissionPayload) -> AppResult<Form> {
    let fields = payload.text_fields();
    let file_part = Part::bytes(payload.data)
        .file_name(payload.file_name)
        .mime_str(UPLOAD_MIME)?;

    let mut form = Form::new().part("data", file_part);
    for (name, value) in fields {
        form = form.text(name, value);
    }
    Ok(form)
}

#[async_trait]
impl HttpSubmitter for ReqwestSubmitter {
    async fn submit(
        &self,
        endpoint: &Url,
        payload: SubmissionPayload,
    ) -> AppResult<SubmitResponse> {
        info!(
            "📤 Submitting {} ({} bytes, {} columns) to {}",
            payload.file_name,
            payload.data.len(),
            payload.columns.len(),
            endpoint
        );

        let form = build_form(payload)?;
        let response = self
            .client
            .post(endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Received HTTP {} with {} bytes", status, body.len());

        Ok(SubmitResponse { status, body })
    }
}
