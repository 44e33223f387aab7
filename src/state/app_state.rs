//! Application State
//!
//! The view-state coordinator as an explicit state struct with one pure
//! dispatch function.
//!
//! ## Structure
//!
//! - **Screen**: the visible view plus the data only that view owns
//! - **AppEvent**: what happened (user gesture, network completion, timer tick)
//! - **AppCommand**: side effects for the runtime to perform
//! - **AppState::handle_event**: the only place state changes
//!
//! Every transition goes through `enter`, which cancels the step timer
//! before anything else so no periodic callback outlives the Loading view.

use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CandidateFile, SelectedFile, SelectionStore, StepTimer, ViewState};
use crate::config::ClientConfig;
use crate::error::SubmissionError;
use crate::models::AnalysisResponse;
use crate::validator;
use crate::view::format::asset_url;

// =============================================================================
// SCREEN - one variant per view, carrying that view's data
// =============================================================================

/// The visible view.
///
/// Using an enum makes "two views at once" and "results without data"
/// unrepresentable.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Screen {
    #[default]
    Upload,

    /// Waiting on the request identified by `token`.
    Loading { token: u64 },

    Results {
        response: Box<AnalysisResponse>,
        /// Visualization labels whose image failed to load.
        hidden_visualizations: BTreeSet<String>,
    },

    Error { message: String },
}

impl Screen {
    pub fn view_state(&self) -> ViewState {
        match self {
            Screen::Upload => ViewState::Upload,
            Screen::Loading { .. } => ViewState::Loading,
            Screen::Results { .. } => ViewState::Results,
            Screen::Error { .. } => ViewState::Error,
        }
    }
}

// =============================================================================
// APP EVENT - everything that can happen
// =============================================================================

#[derive(Debug, Clone)]
pub enum AppEvent {
    // -------------------------------------------------------------------------
    // Intake
    // -------------------------------------------------------------------------
    /// File picker closed. `None` when cancelled.
    FilePicked(Option<CandidateFile>),

    /// Files dropped on the intake area. Only the first is considered.
    FilesDropped(Vec<CandidateFile>),

    ClearSelection,

    EmailChanged(String),

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------
    Submit,

    AnalysisCompleted {
        token: u64,
        result: Result<AnalysisResponse, SubmissionError>,
    },

    // -------------------------------------------------------------------------
    // Presentation
    // -------------------------------------------------------------------------
    StepTick { timer: u64 },

    VisualizationFailed { label: String },

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------
    NewAnalysis,

    Retry,
}

// =============================================================================
// APP COMMAND - side effects
// =============================================================================

/// Commands are emitted by `handle_event` and executed by the runtime.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Issue the analysis request. The completion must echo `token`.
    SubmitAnalysis {
        token: u64,
        file: SelectedFile,
        recipient_email: Option<String>,
    },

    StartStepTimer { timer: u64, period: Duration },

    /// Cancel a step timer. Never left to expire on its own.
    StopStepTimer { timer: u64 },

    /// Load a visualization image; report `VisualizationFailed` on error.
    ProbeVisualization { label: String, url: String },
}

// =============================================================================
// APP STATE
// =============================================================================

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub selection: SelectionStore,
    pub recipient_email: String,
    pub step_timer: Option<StepTimer>,
    base_url: String,
    step_period: Duration,
    next_token: u64,
    next_timer: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl AppState {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            screen: Screen::Upload,
            selection: SelectionStore::new(),
            recipient_email: String::new(),
            step_timer: None,
            base_url: config.base_url.clone(),
            step_period: config.step_period,
            next_token: 0,
            next_timer: 0,
        }
    }

    pub fn view(&self) -> ViewState {
        self.screen.view_state()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Recipient for the report email: trimmed, `None` when blank.
    pub fn recipient(&self) -> Option<String> {
        let trimmed = self.recipient_email.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Token of the request currently awaited, if any.
    pub fn in_flight(&self) -> Option<u64> {
        match self.screen {
            Screen::Loading { token } => Some(token),
            _ => None,
        }
    }

    /// Apply one event. Returns the side effects to run, in order.
    pub fn handle_event(&mut self, event: AppEvent) -> Vec<AppCommand> {
        let mut commands = Vec::new();

        match event {
            AppEvent::FilePicked(candidate) => self.intake(candidate.as_ref(), &mut commands),

            AppEvent::FilesDropped(files) => {
                if files.len() > 1 {
                    debug!("{} files dropped, using the first", files.len());
                }
                self.intake(files.first(), &mut commands);
            }

            AppEvent::ClearSelection => {
                if self.view() == ViewState::Loading {
                    debug!("Ignoring clear while a request is in flight");
                } else {
                    self.selection.clear();
                }
            }

            AppEvent::EmailChanged(email) => self.recipient_email = email,

            AppEvent::Submit => self.submit(&mut commands),

            AppEvent::AnalysisCompleted { token, result } => {
                self.complete(token, result, &mut commands)
            }

            AppEvent::StepTick { timer } => match self.step_timer.as_mut() {
                Some(active) if active.id == timer => active.advance(),
                _ => debug!("Dropping tick from stale timer {}", timer),
            },

            AppEvent::VisualizationFailed { label } => {
                if let Screen::Results {
                    hidden_visualizations,
                    ..
                } = &mut self.screen
                {
                    warn!("Visualization '{}' failed to load, hiding it", label);
                    hidden_visualizations.insert(label);
                }
            }

            AppEvent::NewAnalysis => {
                if matches!(self.view(), ViewState::Results | ViewState::Error) {
                    self.selection.clear();
                    self.recipient_email.clear();
                    self.enter(Screen::Upload, &mut commands);
                }
            }

            AppEvent::Retry => {
                if self.view() == ViewState::Error {
                    self.enter(Screen::Upload, &mut commands);
                }
            }
        }

        commands
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Switch screens. Cancels the step timer first, unconditionally.
    fn enter(&mut self, screen: Screen, commands: &mut Vec<AppCommand>) {
        if let Some(timer) = self.step_timer.take() {
            commands.push(AppCommand::StopStepTimer { timer: timer.id });
        }
        if let Some(token) = self.in_flight() {
            if !matches!(screen, Screen::Loading { .. }) {
                debug!("Leaving Loading, request {} will be ignored", token);
            }
        }
        debug!("View {:?} -> {:?}", self.view(), screen.view_state());
        self.screen = screen;
    }

    fn fail(&mut self, error: SubmissionError, commands: &mut Vec<AppCommand>) {
        warn!("Analysis attempt failed ({}): {}", error.kind(), error);
        self.enter(
            Screen::Error {
                message: error.to_string(),
            },
            commands,
        );
    }

    fn intake(&mut self, candidate: Option<&CandidateFile>, commands: &mut Vec<AppCommand>) {
        match validator::validate(candidate) {
            Ok(None) => {}
            Ok(Some(file)) => {
                if self.view() == ViewState::Loading {
                    debug!("Ignoring '{}' while a request is in flight", file.name);
                    return;
                }
                info!("Selected {} ({} bytes)", file.name, file.byte_size);
                self.selection.set(file);
            }
            Err(err) => self.fail(err.into(), commands),
        }
    }

    fn submit(&mut self, commands: &mut Vec<AppCommand>) {
        if self.view() != ViewState::Upload {
            debug!("Submit ignored outside the upload view");
            return;
        }
        let Some(file) = self.selection.selected().cloned() else {
            return;
        };

        self.next_token += 1;
        let token = self.next_token;
        self.enter(Screen::Loading { token }, commands);

        self.next_timer += 1;
        let timer = StepTimer {
            id: self.next_timer,
            step: 0,
        };
        self.step_timer = Some(timer);
        commands.push(AppCommand::StartStepTimer {
            timer: timer.id,
            period: self.step_period,
        });

        commands.push(AppCommand::SubmitAnalysis {
            token,
            file,
            recipient_email: self.recipient(),
        });
    }

    fn complete(
        &mut self,
        token: u64,
        result: Result<AnalysisResponse, SubmissionError>,
        commands: &mut Vec<AppCommand>,
    ) {
        if self.in_flight() != Some(token) {
            debug!("Discarding stale response for request {}", token);
            return;
        }

        match result {
            Ok(response) => {
                info!(
                    "Analysis complete: risk={} flags={}",
                    response.analysis.risk_level.label(),
                    response.analysis.flags.len()
                );
                self.selection.clear();
                let probes: Vec<AppCommand> = response
                    .analysis
                    .visualizations
                    .iter()
                    .map(|(label, path)| AppCommand::ProbeVisualization {
                        label: label.clone(),
                        url: asset_url(&self.base_url, path),
                    })
                    .collect();
                self.enter(
                    Screen::Results {
                        response: Box::new(response),
                        hidden_visualizations: BTreeSet::new(),
                    },
                    commands,
                );
                commands.extend(probes);
            }
            Err(err) => self.fail(err, commands),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, Severity};
    use crate::validator::MAX_FILE_SIZE_BYTES;
    use proptest::prelude::*;

    fn pdf() -> CandidateFile {
        CandidateFile::new("report.pdf", b"%PDF-1.4".to_vec())
    }

    fn state_with_selection() -> AppState {
        let mut state = AppState::default();
        state.handle_event(AppEvent::FilePicked(Some(pdf())));
        state
    }

    fn ok_response() -> AnalysisResponse {
        AnalysisResponse::from_analysis(AnalysisResult {
            risk_level: Severity::High,
            summary: "x".to_string(),
            ..AnalysisResult::default()
        })
    }

    fn submit(state: &mut AppState) -> (u64, u64) {
        let commands = state.handle_event(AppEvent::Submit);
        let timer = commands.iter().find_map(|c| match c {
            AppCommand::StartStepTimer { timer, .. } => Some(*timer),
            _ => None,
        });
        let token = commands.iter().find_map(|c| match c {
            AppCommand::SubmitAnalysis { token, .. } => Some(*token),
            _ => None,
        });
        (token.unwrap(), timer.unwrap())
    }

    #[test]
    fn test_initial_state() {
        let state = AppState::default();
        assert_eq!(state.view(), ViewState::Upload);
        assert!(!state.selection.submit_enabled());
        assert!(state.step_timer.is_none());
    }

    #[test]
    fn test_cancelled_picker_is_noop() {
        let mut state = AppState::default();
        let commands = state.handle_event(AppEvent::FilePicked(None));
        assert!(commands.is_empty());
        assert_eq!(state.view(), ViewState::Upload);

        state.handle_event(AppEvent::FilesDropped(Vec::new()));
        assert_eq!(state.view(), ViewState::Upload);
    }

    #[test]
    fn test_rejection_goes_to_error_without_touching_selection() {
        let mut state = state_with_selection();
        let commands = state.handle_event(AppEvent::FilePicked(Some(CandidateFile::new(
            "virus.exe",
            vec![1, 2, 3],
        ))));
        assert!(commands.is_empty());
        assert_eq!(
            state.screen,
            Screen::Error {
                message: "Invalid file type. Please upload a PDF, DOCX, or TXT file.".to_string()
            }
        );
        assert_eq!(state.selection.selected().unwrap().name, "report.pdf");
    }

    #[test]
    fn test_oversize_drop_rejected() {
        let mut state = AppState::default();
        state.handle_event(AppEvent::FilesDropped(vec![CandidateFile {
            name: "big.txt".to_string(),
            byte_size: MAX_FILE_SIZE_BYTES + 1,
            content: Vec::new(),
        }]));
        assert_eq!(state.view(), ViewState::Error);
        assert!(!state.selection.submit_enabled());
    }

    #[test]
    fn test_drop_uses_first_file() {
        let mut state = AppState::default();
        state.handle_event(AppEvent::FilesDropped(vec![
            CandidateFile::new("first.docx", vec![1]),
            CandidateFile::new("second.exe", vec![2]),
        ]));
        assert_eq!(state.view(), ViewState::Upload);
        assert_eq!(state.selection.selected().unwrap().name, "first.docx");
    }

    #[test]
    fn test_submit_without_selection_is_noop() {
        let mut state = AppState::default();
        assert!(state.handle_event(AppEvent::Submit).is_empty());
        assert_eq!(state.view(), ViewState::Upload);
    }

    #[test]
    fn test_submit_enters_loading_and_starts_timer() {
        let mut state = state_with_selection();
        state.handle_event(AppEvent::EmailChanged("  auditor@example.com ".to_string()));
        let commands = state.handle_event(AppEvent::Submit);

        assert_eq!(state.view(), ViewState::Loading);
        assert_eq!(commands.len(), 2);
        assert!(matches!(
            commands[0],
            AppCommand::StartStepTimer { period, .. } if period == Duration::from_secs(2)
        ));
        match &commands[1] {
            AppCommand::SubmitAnalysis {
                file,
                recipient_email,
                ..
            } => {
                assert_eq!(file.name, "report.pdf");
                assert_eq!(recipient_email.as_deref(), Some("auditor@example.com"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_blank_email_omitted() {
        let mut state = state_with_selection();
        state.handle_event(AppEvent::EmailChanged("   ".to_string()));
        let commands = state.handle_event(AppEvent::Submit);
        assert!(commands.iter().any(|c| matches!(
            c,
            AppCommand::SubmitAnalysis {
                recipient_email: None,
                ..
            }
        )));
    }

    #[test]
    fn test_success_stops_timer_and_clears_selection() {
        let mut state = state_with_selection();
        let (token, timer) = submit(&mut state);

        let commands = state.handle_event(AppEvent::AnalysisCompleted {
            token,
            result: Ok(ok_response()),
        });

        assert_eq!(state.view(), ViewState::Results);
        assert!(state.step_timer.is_none());
        assert!(!state.selection.submit_enabled());
        assert!(matches!(
            commands[0],
            AppCommand::StopStepTimer { timer: t } if t == timer
        ));
    }

    #[test]
    fn test_success_probes_visualizations() {
        let mut state = state_with_selection();
        let (token, _) = submit(&mut state);
        let mut response = ok_response();
        response.analysis.visualizations =
            vec![("dashboard".to_string(), "visualizations\\dash.png".to_string())];

        let commands = state.handle_event(AppEvent::AnalysisCompleted {
            token,
            result: Ok(response),
        });
        assert!(commands.iter().any(|c| matches!(
            c,
            AppCommand::ProbeVisualization { label, url }
                if label == "dashboard" && url == "http://localhost:8000/visualizations/dash.png"
        )));

        state.handle_event(AppEvent::VisualizationFailed {
            label: "dashboard".to_string(),
        });
        match &state.screen {
            Screen::Results {
                hidden_visualizations,
                ..
            } => assert!(hidden_visualizations.contains("dashboard")),
            other => panic!("unexpected screen {:?}", other),
        }
    }

    #[test]
    fn test_failure_keeps_selection_for_retry() {
        let mut state = state_with_selection();
        let (token, _) = submit(&mut state);

        state.handle_event(AppEvent::AnalysisCompleted {
            token,
            result: Err(SubmissionError::Server {
                status: 400,
                detail: Some("corrupt pdf".to_string()),
            }),
        });
        assert_eq!(
            state.screen,
            Screen::Error {
                message: "corrupt pdf".to_string()
            }
        );
        assert!(state.step_timer.is_none());

        state.handle_event(AppEvent::Retry);
        assert_eq!(state.view(), ViewState::Upload);
        assert!(state.selection.submit_enabled());
    }

    #[test]
    fn test_new_analysis_resets_upload() {
        let mut state = state_with_selection();
        state.handle_event(AppEvent::EmailChanged("a@b.co".to_string()));
        let (token, _) = submit(&mut state);
        state.handle_event(AppEvent::AnalysisCompleted {
            token,
            result: Ok(ok_response()),
        });

        state.handle_event(AppEvent::NewAnalysis);
        assert_eq!(state.view(), ViewState::Upload);
        assert!(!state.selection.submit_enabled());
        assert!(state.recipient_email.is_empty());
    }

    #[test]
    fn test_retry_only_from_error() {
        let mut state = state_with_selection();
        let (token, _) = submit(&mut state);
        state.handle_event(AppEvent::Retry);
        assert_eq!(state.in_flight(), Some(token));
    }

    #[test]
    fn test_stale_response_ignored() {
        let mut state = state_with_selection();
        let (first, _) = submit(&mut state);

        // A rejected drop during Loading abandons the request.
        state.handle_event(AppEvent::FilesDropped(vec![CandidateFile::new("x.png", vec![])]));
        assert_eq!(state.view(), ViewState::Error);
        state.handle_event(AppEvent::Retry);
        let (second, _) = submit(&mut state);
        assert_ne!(first, second);

        state.handle_event(AppEvent::AnalysisCompleted {
            token: first,
            result: Ok(ok_response()),
        });
        assert_eq!(state.in_flight(), Some(second));

        state.handle_event(AppEvent::AnalysisCompleted {
            token: second,
            result: Err(SubmissionError::Transport {
                reason: "connection reset".to_string(),
            }),
        });
        assert_eq!(
            state.screen,
            Screen::Error {
                message: "Failed to analyze document. Please try again.".to_string()
            }
        );
    }

    #[test]
    fn test_ticks_from_stale_timer_dropped() {
        let mut state = state_with_selection();
        let (_, timer) = submit(&mut state);

        state.handle_event(AppEvent::StepTick { timer });
        assert_eq!(state.step_timer.map(|t| t.step), Some(1));

        state.handle_event(AppEvent::StepTick { timer: timer + 10 });
        assert_eq!(state.step_timer.map(|t| t.step), Some(1));
    }

    #[test]
    fn test_intake_ignored_while_loading() {
        let mut state = state_with_selection();
        submit(&mut state);
        state.handle_event(AppEvent::FilePicked(Some(CandidateFile::new(
            "other.txt",
            vec![1],
        ))));
        assert_eq!(state.view(), ViewState::Loading);
        assert_eq!(state.selection.selected().unwrap().name, "report.pdf");
    }

    fn arb_event() -> impl Strategy<Value = AppEvent> {
        prop_oneof![
            Just(AppEvent::FilePicked(Some(CandidateFile::new("a.pdf", vec![1])))),
            Just(AppEvent::FilePicked(Some(CandidateFile::new("a.zip", vec![1])))),
            Just(AppEvent::FilePicked(None)),
            Just(AppEvent::ClearSelection),
            Just(AppEvent::Submit),
            Just(AppEvent::NewAnalysis),
            Just(AppEvent::Retry),
            (0u64..4).prop_map(|timer| AppEvent::StepTick { timer }),
            (0u64..4).prop_map(|token| AppEvent::AnalysisCompleted {
                token,
                result: Ok(ok_response()),
            }),
            (0u64..4).prop_map(|token| AppEvent::AnalysisCompleted {
                token,
                result: Err(SubmissionError::Server { status: 500, detail: None }),
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_timer_lives_only_in_loading(events in proptest::collection::vec(arb_event(), 0..40)) {
            let mut state = AppState::default();
            let mut live_timers = BTreeSet::new();
            for event in events {
                for command in state.handle_event(event) {
                    match command {
                        AppCommand::StartStepTimer { timer, .. } => { live_timers.insert(timer); }
                        AppCommand::StopStepTimer { timer } => { live_timers.remove(&timer); }
                        _ => {}
                    }
                }
                let loading = state.view() == ViewState::Loading;
                prop_assert_eq!(state.step_timer.is_some(), loading);
                prop_assert_eq!(state.in_flight().is_some(), loading);
                prop_assert_eq!(live_timers.len(), usize::from(loading));
            }
        }
    }
}
