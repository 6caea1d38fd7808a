//! Messages and diagnostics.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Importance;

/// Severity of a logged diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Classification and location of an error or warning.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<Arc<str>>,
    pub subcategory: Option<Arc<str>>,
    /// Source file the diagnostic points at
    pub file: Option<Arc<str>>,
    pub project_file: Option<Arc<str>>,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Diagnostic {
    /// `file(line,column)` in the style of MSBuild's console logger.
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_deref()?;
        if self.line == 0 {
            return Some(file.to_string());
        }
        if self.column == 0 {
            return Some(format!("{}({})", file, self.line));
        }
        Some(format!("{}({},{})", file, self.line, self.column))
    }
}

/// A logged message. Errors and warnings carry a [`Diagnostic`].
///
/// Messages order by timestamp, then text, then the remaining fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Message {
    pub timestamp: DateTime<Utc>,
    pub text: Arc<str>,
    pub importance: Importance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl Message {
    pub fn is_error(&self) -> bool {
        matches!(&self.diagnostic, Some(d) if d.severity == Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(&self.diagnostic, Some(d) if d.severity == Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(line: u32, column: u32) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            code: Some(Arc::from("CS0103")),
            subcategory: None,
            file: Some(Arc::from("Program.cs")),
            project_file: None,
            line,
            column,
            end_line: 0,
            end_column: 0,
        }
    }

    #[test]
    fn test_location_formatting() {
        assert_eq!(diagnostic(12, 5).location().as_deref(), Some("Program.cs(12,5)"));
        assert_eq!(diagnostic(12, 0).location().as_deref(), Some("Program.cs(12)"));
        assert_eq!(diagnostic(0, 0).location().as_deref(), Some("Program.cs"));
    }
}
