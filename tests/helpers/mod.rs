//! Scripted analysis service for driving a `Session` without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use audit_agent_client::models::{AnalysisResponse, AnalysisResult, FraudFlag, Severity};
use audit_agent_client::state::SelectedFile;
use audit_agent_client::{AnalysisService, SubmissionError};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// One scripted reply: wait `delay`, then return `result`.
pub struct Reply {
    pub delay: Duration,
    pub result: Result<AnalysisResponse, SubmissionError>,
}

impl Reply {
    pub fn ok(response: AnalysisResponse) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(response),
        }
    }

    pub fn err(error: SubmissionError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A single recorded `analyze` call.
#[derive(Debug, Clone)]
pub struct Call {
    pub file_name: String,
    pub recipient_email: Option<String>,
}

#[derive(Default)]
pub struct ScriptedService {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
    broken_assets: Vec<String>,
}

impl ScriptedService {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Asset URLs containing any of these fragments fail to load.
    pub fn with_broken_assets(mut self, fragments: &[&str]) -> Self {
        self.broken_assets = fragments.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisService for ScriptedService {
    async fn analyze(
        &self,
        file: &SelectedFile,
        recipient_email: Option<&str>,
    ) -> Result<AnalysisResponse, SubmissionError> {
        self.calls.lock().unwrap().push(Call {
            file_name: file.name.clone(),
            recipient_email: recipient_email.map(str::to_string),
        });
        let reply = self.replies.lock().unwrap().pop_front();
        let Some(reply) = reply else {
            return Err(SubmissionError::Transport {
                reason: "no scripted reply".to_string(),
            });
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }

    async fn probe_asset(&self, url: &str) -> Result<(), SubmissionError> {
        if self.broken_assets.iter().any(|f| url.contains(f.as_str())) {
            Err(SubmissionError::Server {
                status: 404,
                detail: None,
            })
        } else {
            Ok(())
        }
    }
}

pub fn flag(category: &str, severity: Severity, confidence: f64, amount: Option<f64>) -> FraudFlag {
    FraudFlag {
        category: category.to_string(),
        severity,
        description: format!("{} detected", category),
        evidence: "line 12".to_string(),
        confidence,
        amount_involved: amount,
    }
}

pub fn response(summary: &str) -> AnalysisResponse {
    AnalysisResponse::from_analysis(AnalysisResult {
        risk_level: Severity::Low,
        summary: summary.to_string(),
        ..AnalysisResult::default()
    })
}
