//! Audit Agent client - document fraud-analysis front end.
//!
//! A headless rendition of the browser client for the Audit Agent service:
//! a user picks or drops a PDF/DOCX/TXT file, submits it, and sees a
//! fraud-risk report.
//!
//! # Architecture
//!
//! - **Validator**: type and size policy applied before a file is selected
//! - **State**: selection store plus the Upload/Loading/Results/Error
//!   coordinator, driven by `AppEvent`s through one dispatch function
//! - **API**: the multipart upload contract and its error taxonomy
//! - **View**: pure `render(&AppState) -> ViewFragments`
//! - **Runtime**: executes commands (requests, timers, image probes) on tokio
//!
//! # Examples
//!
//! ```ignore
//! use audit_agent_client::{ClientConfig, HttpAnalysisService, Session, AppEvent, CandidateFile};
//!
//! let config = ClientConfig::default();
//! let mut session = Session::new(&config, HttpAnalysisService::new(&config)?);
//! session.dispatch(AppEvent::FilePicked(Some(CandidateFile::from_path(path).await?)));
//! session.dispatch(AppEvent::Submit);
//! let fragments = session.run_until_settled().await;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod runtime;
pub mod state;
pub mod validator;
pub mod view;

pub use api::{AnalysisService, HttpAnalysisService};
pub use config::ClientConfig;
pub use error::{SubmissionError, ValidationError};
pub use runtime::Session;
pub use state::{AppEvent, AppState, CandidateFile, ViewState};
pub use view::{render, ViewFragments};
