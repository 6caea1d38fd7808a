//! Message and diagnostic records.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::{Diagnostic, Message, Severity};
use crate::events::{DiagnosticFields, Importance};
use crate::util::StringInterner;

#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub severity: Severity,
    pub code: Option<Arc<str>>,
    pub subcategory: Option<Arc<str>>,
    pub file: Option<Arc<str>>,
    pub project_file: Option<Arc<str>>,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl DiagnosticInfo {
    pub fn new(severity: Severity, fields: &DiagnosticFields, strings: &StringInterner) -> Self {
        DiagnosticInfo {
            severity,
            code: strings.intern_opt(fields.code.as_deref()),
            subcategory: strings.intern_opt(fields.subcategory.as_deref()),
            file: strings.intern_opt(fields.file.as_deref()),
            project_file: strings.intern_opt(fields.project_file.as_deref()),
            line: fields.line,
            column: fields.column,
            end_line: fields.end_line,
            end_column: fields.end_column,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic {
            severity: self.severity,
            code: self.code,
            subcategory: self.subcategory,
            file: self.file,
            project_file: self.project_file,
            line: self.line,
            column: self.column,
            end_line: self.end_line,
            end_column: self.end_column,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageInfo {
    pub timestamp: DateTime<Utc>,
    pub text: Arc<str>,
    pub importance: Importance,
    pub diagnostic: Option<DiagnosticInfo>,
}

impl MessageInfo {
    pub fn new(timestamp: DateTime<Utc>, text: Arc<str>, importance: Importance) -> Self {
        MessageInfo {
            timestamp,
            text,
            importance,
            diagnostic: None,
        }
    }

    pub fn diagnostic(timestamp: DateTime<Utc>, text: Arc<str>, diagnostic: DiagnosticInfo) -> Self {
        MessageInfo {
            timestamp,
            text,
            importance: Importance::High,
            diagnostic: Some(diagnostic),
        }
    }

    pub fn into_message(self) -> Message {
        Message {
            timestamp: self.timestamp,
            text: self.text,
            importance: self.importance,
            diagnostic: self.diagnostic.map(DiagnosticInfo::into_diagnostic),
        }
    }
}
