//! File selection collaborator

use std::path::PathBuf;

/// Asks the user for a file. Blocks until a path is chosen or the user
/// cancels, which is reported as `None`.
pub trait FileBrowser {
    fn pick_file(&mut self, title: &str, extensions: &[&str]) -> Option<PathBuf>;
}

/// Answers every request with a path fixed up front, e.g. from a CLI flag
#[derive(Debug, Clone, Default)]
pub struct FixedPathBrowser {
    path: Option<PathBuf>,
}

impl FixedPathBrowser {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl FileBrowser for FixedPathBrowser {
    fn pick_file(&mut self, _title: &str, _extensions: &[&str]) -> Option<PathBuf> {
        self.path.clone()
    }
}
