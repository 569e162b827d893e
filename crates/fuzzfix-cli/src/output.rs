//! Diagnostic and summary reporting on stderr
//!
//! Everything here goes to stderr so that stdout carries only the
//! rewritten source (or the diff / change set).

use colored::*;
use fuzzfix_core::{Diagnostic, Severity};
use std::path::{Path, PathBuf};

/// Summary of one rewrite run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub changes_applied: usize,
    pub warnings: usize,
    /// File the result was written to; `None` means stdout
    pub written_to: Option<PathBuf>,
}

/// Prints user-facing messages on stderr
pub struct Reporter {
    use_colors: bool,
}

impl Reporter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn severity_label(&self, severity: Severity) -> String {
        let label = severity.to_string();
        if !self.use_colors {
            return label;
        }
        match severity {
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
        }
    }

    pub fn print_diagnostic(&self, diagnostic: &Diagnostic) {
        let label = self.severity_label(diagnostic.severity);
        let header = match &diagnostic.rule_id {
            Some(rule) => format!("{}[{}]", label, rule),
            None => label,
        };
        let arrow = if self.use_colors {
            "-->".blue().bold().to_string()
        } else {
            "-->".to_string()
        };
        eprintln!("{}: {}", header, diagnostic.message);
        eprintln!("  {} {}", arrow, diagnostic.location);
    }

    pub fn print_diagnostics(&self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.print_diagnostic(diagnostic);
        }
    }

    pub fn print_error(&self, error: &anyhow::Error) {
        let label = self.severity_label(Severity::Error);
        eprintln!("{}: {:#}", label, error);
    }

    /// The output file could not be written; the result went to stdout
    pub fn print_fallback(&self, path: &Path, error: &std::io::Error) {
        let label = self.severity_label(Severity::Warning);
        eprintln!(
            "{}: cannot write '{}' ({}), writing to stdout instead",
            label,
            path.display(),
            error
        );
    }

    pub fn print_summary(&self, summary: &RunSummary) {
        let message = format!("Successfully applied {} changes!", summary.changes_applied);
        if self.use_colors {
            eprintln!("{}", message.green().bold());
        } else {
            eprintln!("{}", message);
        }

        if summary.warnings > 0 {
            let skipped = format!("{} site(s) skipped", summary.warnings);
            if self.use_colors {
                eprintln!("{}", skipped.yellow());
            } else {
                eprintln!("{}", skipped);
            }
        }
        if let Some(path) = &summary.written_to {
            eprintln!("Wrote {}", path.display());
        }
    }
}
