//! API client for the analysis service.
//!
//! One endpoint: `POST {base}/api/v1/upload/analyze` with a multipart body.
//! Visualization images are plain GETs against `{base}/{path}`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::SubmissionError;
use crate::models::{AnalysisResponse, ErrorBody};
use crate::state::SelectedFile;
use crate::validator::file_extension;

pub const ANALYZE_PATH: &str = "/api/v1/upload/analyze";

/// The analysis service as seen by the session runtime.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Upload `file` for analysis. Issues exactly one request.
    async fn analyze(
        &self,
        file: &SelectedFile,
        recipient_email: Option<&str>,
    ) -> std::result::Result<AnalysisResponse, SubmissionError>;

    /// Check that a visualization image at `url` loads.
    async fn probe_asset(&self, url: &str) -> std::result::Result<(), SubmissionError>;
}

/// `reqwest`-backed service client.
#[derive(Clone)]
pub struct HttpAnalysisService {
    client: Client,
    base_url: String,
}

impl HttpAnalysisService {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.request_base().trim_end_matches('/').to_string(),
        })
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.base_url, ANALYZE_PATH)
    }

    /// Same-origin asset paths are relative to the page; anchor them.
    fn absolute(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(
        &self,
        file: &SelectedFile,
        recipient_email: Option<&str>,
    ) -> std::result::Result<AnalysisResponse, SubmissionError> {
        let url = self.analyze_url();
        info!(
            "Submitting {} ({} bytes) to {}",
            file.name, file.byte_size, url
        );

        let mut part = Part::bytes(file.raw_content.clone()).file_name(file.name.clone());
        if let Some(mime) = content_type_for(&file.name) {
            part = part.mime_str(mime).map_err(transport)?;
        }
        let mut form = Form::new().part("file", part);
        if let Some(email) = recipient_email {
            debug!("Including recipient_email field");
            form = form.text("recipient_email", email.to_string());
        }

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?;
        debug!("Analysis response: HTTP {} ({} bytes)", status, body.len());

        interpret_response(status, &body)
    }

    async fn probe_asset(&self, url: &str) -> std::result::Result<(), SubmissionError> {
        let response = self
            .client
            .get(self.absolute(url))
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SubmissionError::Server {
                status: status.as_u16(),
                detail: None,
            })
        }
    }
}

fn transport(err: reqwest::Error) -> SubmissionError {
    warn!("Request failed: {}", err);
    SubmissionError::Transport {
        reason: err.to_string(),
    }
}

fn content_type_for(name: &str) -> Option<&'static str> {
    match file_extension(name)?.as_str() {
        "pdf" => Some("application/pdf"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// Map an HTTP status and raw body to the submission outcome.
///
/// Non-2xx: the `detail` field if the body parses, else `Server error: N`.
/// 2xx: the body must carry an `analysis` object, otherwise the response
/// is malformed and nothing is rendered.
pub fn interpret_response(
    status: u16,
    body: &[u8],
) -> std::result::Result<AnalysisResponse, SubmissionError> {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message());
        warn!("Analysis failed: HTTP {} detail={:?}", status, detail);
        return Err(SubmissionError::Server { status, detail });
    }

    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| SubmissionError::MalformedResponse {
            reason: format!("body is not JSON: {}", e),
        })?;

    if !value.get("analysis").is_some_and(|a| a.is_object()) {
        return Err(SubmissionError::MalformedResponse {
            reason: "missing analysis object".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| SubmissionError::MalformedResponse {
        reason: e.to_string(),
    })
}
