//! Evaluation snapshots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Message;

/// All evaluated projects reported under one evaluation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: i32,
    pub messages: Vec<Message>,
    pub evaluated_projects: Vec<EvaluatedProject>,
}

/// One project evaluation. `end` is `None` if the log never finished it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedProject {
    pub name: Arc<str>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub messages: Vec<Message>,
}

impl EvaluatedProject {
    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }
}
