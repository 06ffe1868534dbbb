use std::fmt;
use std::path::{Path, PathBuf};

use medrec_model::{Diagnostic, Severity};

/// What a command produced: text for stdout plus the diagnostics collected
/// while reading the input files.
#[derive(Debug, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub diagnostics: Vec<FileDiagnostic>,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<FileDiagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.diagnostic.severity == severity)
            .count()
    }
}

/// A diagnostic and the file it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiagnostic {
    pub path: PathBuf,
    pub diagnostic: Diagnostic,
}

impl FileDiagnostic {
    pub fn collect(path: &Path, diagnostics: Vec<Diagnostic>) -> Vec<FileDiagnostic> {
        diagnostics
            .into_iter()
            .map(|diagnostic| FileDiagnostic {
                path: path.to_path_buf(),
                diagnostic,
            })
            .collect()
    }
}

impl fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.diagnostic)
    }
}
