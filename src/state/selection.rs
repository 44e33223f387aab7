//! Selection store - holds at most one validated file.

use super::SelectedFile;

#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    selected: Option<SelectedFile>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection. Callers pass only validator output.
    pub fn set(&mut self, file: SelectedFile) {
        self.selected = Some(file);
    }

    /// Drop the selection, returning intake to its initial prompt.
    pub fn clear(&mut self) -> Option<SelectedFile> {
        self.selected.take()
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn submit_enabled(&self) -> bool {
        self.selected.is_some()
    }
}
