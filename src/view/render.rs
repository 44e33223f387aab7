//! Pure mapping from application state to view fragments.
//!
//! Nothing here performs IO or touches state. Each optional results region
//! is decided independently from its own data.

use serde::Serialize;
use std::collections::BTreeSet;

use super::format::{
    asset_url, confidence_percent, format_category, format_currency, format_file_size,
    format_timestamp,
};
use crate::models::{AnalysisResponse, EmailDelivery, FraudFlag, Severity};
use crate::state::{AppState, Screen, StepTimer, LOADING_STEPS};

/// Stagger between consecutive flag cards.
pub const FLAG_REVEAL_STEP_MS: u64 = 100;

const DEFAULT_EMAIL_NOTICE: &str = "Email sent successfully";

// =============================================================================
// FRAGMENTS
// =============================================================================

/// Exactly one view, with everything needed to draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewFragments {
    Upload(UploadView),
    Loading(LoadingView),
    Results(ResultsView),
    Error(ErrorView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadView {
    /// Name and size of the selected file; `None` shows the intake prompt.
    pub selected: Option<FileSummary>,
    pub submit_enabled: bool,
    pub recipient_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingView {
    pub file_name: Option<String>,
    pub steps: Vec<StepIndicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepIndicator {
    pub label: &'static str,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Done,
    Active,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub risk_badge: Badge,
    pub summary: String,
    pub stats: StatTiles,
    pub flags: Option<Vec<FlagCard>>,
    pub visualizations: Option<Vec<VisualizationTile>>,
    pub recommendations: Option<Vec<String>>,
    pub email_notice: Option<String>,
    pub document: Option<DocumentInfo>,
    pub analyzed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub label: &'static str,
    pub class: String,
}

impl Badge {
    fn new(prefix: &str, severity: Severity) -> Self {
        Self {
            label: severity.label(),
            class: format!("{}-{}", prefix, severity.slug()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatTiles {
    pub flag_count: usize,
    pub flagged_amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagCard {
    pub category: String,
    pub severity: Badge,
    pub description: String,
    pub evidence: String,
    pub confidence_percent: u8,
    pub amount: Option<String>,
    pub reveal_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationTile {
    pub label: String,
    pub title: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub size: Option<String>,
    pub extracted_characters: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorView {
    pub message: String,
    pub can_retry: bool,
}

// =============================================================================
// RENDER
// =============================================================================

pub fn render(state: &AppState) -> ViewFragments {
    match &state.screen {
        Screen::Upload => ViewFragments::Upload(UploadView {
            selected: state.selection.selected().map(|file| FileSummary {
                name: file.name.clone(),
                size: format_file_size(file.byte_size),
            }),
            submit_enabled: state.selection.submit_enabled(),
            recipient_email: state.recipient_email.clone(),
        }),
        Screen::Loading { .. } => ViewFragments::Loading(LoadingView {
            file_name: state.selection.selected().map(|file| file.name.clone()),
            steps: render_steps(state.step_timer),
        }),
        Screen::Results {
            response,
            hidden_visualizations,
        } => ViewFragments::Results(render_results(
            response,
            state.base_url(),
            hidden_visualizations,
        )),
        Screen::Error { message } => ViewFragments::Error(ErrorView {
            message: message.clone(),
            can_retry: true,
        }),
    }
}

fn render_steps(timer: Option<StepTimer>) -> Vec<StepIndicator> {
    let active = timer.map(|t| t.step).unwrap_or(0);
    LOADING_STEPS
        .into_iter()
        .enumerate()
        .map(|(i, label)| StepIndicator {
            label,
            status: match i.cmp(&active) {
                std::cmp::Ordering::Less => StepStatus::Done,
                std::cmp::Ordering::Equal => StepStatus::Active,
                std::cmp::Ordering::Greater => StepStatus::Pending,
            },
        })
        .collect()
}

/// Build the results fragment from a well-formed response.
pub fn render_results(
    response: &AnalysisResponse,
    base_url: &str,
    hidden_visualizations: &BTreeSet<String>,
) -> ResultsView {
    let analysis = &response.analysis;

    let flags = (!analysis.flags.is_empty()).then(|| {
        analysis
            .flags
            .iter()
            .enumerate()
            .map(|(index, flag)| render_flag(index, flag))
            .collect()
    });

    let visible: Vec<VisualizationTile> = analysis
        .visualizations
        .iter()
        .filter(|(label, _)| !hidden_visualizations.contains(label))
        .map(|(label, path)| VisualizationTile {
            label: label.clone(),
            title: format_category(label),
            src: asset_url(base_url, path),
        })
        .collect();

    let recommendations =
        (!analysis.recommendations.is_empty()).then(|| analysis.recommendations.clone());

    ResultsView {
        risk_badge: Badge::new("risk", analysis.risk_level),
        summary: analysis.summary.clone(),
        stats: StatTiles {
            flag_count: analysis.flags.len(),
            flagged_amount: format_currency(analysis.flagged_amount()),
        },
        flags,
        visualizations: (!visible.is_empty()).then_some(visible),
        recommendations,
        email_notice: analysis.email_delivery.as_ref().and_then(email_notice),
        document: document_info(response),
        analyzed_at: analysis.timestamp.as_deref().and_then(format_timestamp),
    }
}

fn render_flag(index: usize, flag: &FraudFlag) -> FlagCard {
    FlagCard {
        category: format_category(&flag.category),
        severity: Badge::new("severity", flag.severity),
        description: flag.description.clone(),
        evidence: flag.evidence.clone(),
        confidence_percent: confidence_percent(flag.confidence),
        amount: flag.amount_involved.map(format_currency),
        reveal_delay_ms: index as u64 * FLAG_REVEAL_STEP_MS,
    }
}

fn email_notice(delivery: &EmailDelivery) -> Option<String> {
    if !delivery.success {
        return None;
    }
    let message = delivery
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_EMAIL_NOTICE);
    Some(message.to_string())
}

fn document_info(response: &AnalysisResponse) -> Option<DocumentInfo> {
    let info = DocumentInfo {
        file_name: response.filename.clone(),
        file_type: response.file_type.clone(),
        size: response.file_size_bytes.map(format_file_size),
        extracted_characters: response.extracted_text_length,
    };
    let any = info.file_name.is_some()
        || info.file_type.is_some()
        || info.size.is_some()
        || info.extracted_characters.is_some();
    any.then_some(info)
}
