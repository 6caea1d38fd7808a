//! User-friendly diagnostic messages.
//!
//! Used by the CLI to print model errors with context lines and suggested
//! fixes.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when the event log cannot be read.
    pub const UNREADABLE_LOG: &str = "Pass a JSON-lines file with one build event per line";

    /// Suggestion when the model could not be built.
    pub const MODEL_FAILED: &str = "Run `logmodel check <log>` to list every problem";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    /// ANSI style for the severity label.
    fn style(self) -> &'static str {
        match self {
            Severity::Error => "1;31",
            Severity::Warning => "1;33",
            Severity::Note => "1;36",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A problem found in a build log, ready to print.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    /// Error class shown next to the severity, e.g. `error[lookup]`
    pub kind: Option<String>,
    /// Explanation lines printed as `= ...`
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
    /// Log file the problem was found in
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            kind: None,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format for terminal output, with ANSI colors when `color` is set.
    pub fn format(&self, color: bool) -> String {
        let label = match &self.kind {
            Some(kind) => format!("{}[{}]", self.severity, kind),
            None => self.severity.to_string(),
        };
        let mut output = format!("{}: {}\n", paint(&label, self.severity.style(), color), self.message);

        if let Some(path) = &self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }
        for line in &self.context {
            output.push_str(&format!("  = {}\n", line));
        }

        if !self.suggestions.is_empty() {
            output.push_str(&format!("\n{}: consider:\n", paint("help", "1;32", color)));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

fn paint(text: &str, style: &str, color: bool) -> String {
    if color {
        format!("\x1b[{}m{}\x1b[0m", style, text)
    } else {
        text.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("project 4 was already started")
            .with_location("build.jsonl")
            .with_context("the log registers the same context id twice")
            .with_suggestion("Check whether two builds were recorded into one log");

        let output = diag.format(false);
        assert!(output.contains("error: project 4 was already started"));
        assert!(output.contains("--> build.jsonl"));
        assert!(output.contains("= the log registers"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Check whether"));
    }

    #[test]
    fn test_kind_shown_next_to_severity() {
        let output = Diagnostic::error("project 42 was never started")
            .with_kind("lookup")
            .format(false);
        assert_eq!(output, "error[lookup]: project 42 was never started\n");

        let colored = Diagnostic::note("1 event(s) arrived late").format(true);
        assert!(colored.starts_with("\x1b[1;36mnote\x1b[0m: 1 event(s)"));
    }

    #[test]
    fn test_warning_without_suggestions() {
        let output = Diagnostic::warning("log ended before the build finished").format(false);
        assert_eq!(output, "warning: log ended before the build finished\n");
    }
}
