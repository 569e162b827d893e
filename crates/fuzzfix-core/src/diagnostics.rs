//! Source locations and diagnostics reported to the user

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::cst::ParseError;

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A site was skipped; the run continues
    Warning,
    /// The unit cannot be rewritten
    Error,
}

/// Location information for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
    /// Byte offset in the file
    pub offset: usize,
    /// Length of the span in bytes
    pub length: usize,
}

impl Location {
    /// Create a new location
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize, span: Range<usize>) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            offset: span.start,
            length: span.end.saturating_sub(span.start),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Maps byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset at which each line starts
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// 1-based line and character column of a byte offset
    pub fn line_col(&self, text: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(text.len());
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        let column = text
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count());
        (line + 1, column + 1)
    }

    /// Build a location for a byte span
    pub fn location(&self, file: &Path, text: &str, span: Range<usize>) -> Location {
        let (line, column) = self.line_col(text, span.start);
        Location::new(file, line, column, span)
    }
}

/// A message for the user with its source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    /// Rule that produced the diagnostic, if any
    pub rule_id: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, location: Location) -> Self {
        Self {
            severity,
            message: message.into(),
            location,
            rule_id: None,
        }
    }

    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    /// Convert parse errors into error diagnostics
    pub fn from_parse_errors(file: &Path, text: &str, errors: &[ParseError]) -> Vec<Self> {
        let index = LineIndex::new(text);
        errors
            .iter()
            .map(|err| {
                Self::new(
                    Severity::Error,
                    err.message.clone(),
                    index.location(file, text, err.span.clone()),
                )
            })
            .collect()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.rule_id {
            Some(rule) => write!(f, "{}[{}]: {}", self.severity, rule, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }
        write!(f, "\n  --> {}", self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_c;

    #[test]
    fn test_line_col() {
        let text = "ab\ncdé\nf";
        let index = LineIndex::new(text);
        assert_eq!(index.line_col(text, 0), (1, 1));
        assert_eq!(index.line_col(text, 3), (2, 1));
        assert_eq!(index.line_col(text, 7), (2, 4));
        assert_eq!(index.line_col(text, 8), (3, 1));
    }

    #[test]
    fn test_parse_error_diagnostics() {
        let text = "int f() {\n  g(a];\n}\n";
        let parse = parse_c(text);
        let diagnostics = Diagnostic::from_parse_errors(Path::new("a.c"), text, parse.errors());
        assert!(!diagnostics.is_empty());
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].location.line, 2);
        assert_eq!(diagnostics[0].location.column, 6);
        assert!(diagnostics[0].to_string().starts_with("error: "));
    }
}
