//! Core state types.

use serde::Serialize;
use std::path::Path;

use crate::validator::MAX_FILE_SIZE_BYTES;

/// Labels of the loading step indicator, cycled in order.
pub const LOADING_STEPS: [&str; 4] = [
    "Uploading document",
    "Extracting text",
    "Detecting fraud patterns",
    "Generating report",
];

/// A file offered by the picker or a drop, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub byte_size: u64,
    pub content: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            byte_size: content.len() as u64,
            content,
        }
    }

    /// Read a file from disk the way the picker hands one over.
    ///
    /// Files over the size limit keep their reported size but no content;
    /// validation rejects them without the bytes ever being loaded.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let byte_size = tokio::fs::metadata(path).await?.len();
        if byte_size > MAX_FILE_SIZE_BYTES {
            return Ok(Self {
                name,
                byte_size,
                content: Vec::new(),
            });
        }

        let content = tokio::fs::read(path).await?;
        Ok(Self::new(name, content))
    }
}

/// The single accepted file. Only the validator creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub byte_size: u64,
    pub raw_content: Vec<u8>,
}

/// Which of the four mutually exclusive views is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Upload,
    Loading,
    Results,
    Error,
}

/// Live loading-step timer. `id` is unique per start so ticks from a
/// cancelled timer can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTimer {
    pub id: u64,
    pub step: usize,
}

impl StepTimer {
    pub fn advance(&mut self) {
        self.step = (self.step + 1) % LOADING_STEPS.len();
    }
}
