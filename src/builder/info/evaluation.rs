//! Evaluation records.
//!
//! MSBuild has been seen reusing evaluation ids for unrelated evaluations,
//! so an evaluation id is treated as a container that may hold several
//! evaluations of the same project at once. A finished event completes the
//! first in-progress evaluation with a matching name.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::MessageInfo;
use crate::builder::errors::ModelError;

#[derive(Debug)]
pub struct EvaluatedProjectInfo {
    pub name: Arc<str>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub messages: Vec<MessageInfo>,
}

impl EvaluatedProjectInfo {
    pub fn new(name: Arc<str>, start: DateTime<Utc>) -> Self {
        EvaluatedProjectInfo {
            name,
            start,
            end: None,
            messages: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct EvaluationInfo {
    pub id: i32,
    pub messages: Vec<MessageInfo>,
    pub in_progress: Vec<EvaluatedProjectInfo>,
    pub completed: Vec<EvaluatedProjectInfo>,
}

impl EvaluationInfo {
    pub fn new(id: i32) -> Self {
        EvaluationInfo {
            id,
            messages: Vec::new(),
            in_progress: Vec::new(),
            completed: Vec::new(),
        }
    }

    pub fn start_project(&mut self, project: EvaluatedProjectInfo) {
        self.in_progress.push(project);
    }

    /// Complete the first in-progress evaluation named `name`.
    pub fn finish_project(&mut self, name: &str, end: DateTime<Utc>) -> Result<(), ModelError> {
        let index = self
            .in_progress
            .iter()
            .position(|p| &*p.name == name)
            .ok_or_else(|| ModelError::EvaluatedProjectNotFound {
                evaluation_id: self.id,
                name: name.to_string(),
            })?;

        let mut project = self.in_progress.remove(index);
        project.end = Some(end);
        self.completed.push(project);
        Ok(())
    }

    /// Attach a message to the in-progress evaluation of `project_file`, or
    /// to the evaluation itself.
    pub fn add_message(&mut self, message: MessageInfo, project_file: Option<&str>) {
        let target = match project_file {
            Some(file) => self.in_progress.iter_mut().find(|p| &*p.name == file),
            None => None,
        };
        match target {
            Some(project) => project.messages.push(message),
            None => self.messages.push(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Importance;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_reused_id_finishes_first_started() {
        let mut eval = EvaluationInfo::new(5);
        eval.start_project(EvaluatedProjectInfo::new(Arc::from("A"), at(0)));
        eval.start_project(EvaluatedProjectInfo::new(Arc::from("A"), at(1)));

        eval.finish_project("A", at(2)).unwrap();

        assert_eq!(eval.completed.len(), 1);
        assert_eq!(eval.completed[0].start, at(0));
        assert_eq!(eval.completed[0].end, Some(at(2)));
        assert_eq!(eval.in_progress.len(), 1);
        assert_eq!(eval.in_progress[0].start, at(1));
    }

    #[test]
    fn test_finish_without_start_fails() {
        let mut eval = EvaluationInfo::new(5);
        eval.start_project(EvaluatedProjectInfo::new(Arc::from("A"), at(0)));

        let err = eval.finish_project("B", at(1)).unwrap_err();
        assert_eq!(
            err,
            ModelError::EvaluatedProjectNotFound {
                evaluation_id: 5,
                name: "B".to_string()
            }
        );
        assert_eq!(eval.in_progress.len(), 1);
    }

    #[test]
    fn test_message_routed_to_matching_project() {
        let mut eval = EvaluationInfo::new(1);
        eval.start_project(EvaluatedProjectInfo::new(Arc::from("A"), at(0)));

        let msg = || MessageInfo::new(at(1), Arc::from("m"), Importance::Low);
        eval.add_message(msg(), Some("A"));
        eval.add_message(msg(), Some("B"));
        eval.add_message(msg(), None);

        assert_eq!(eval.in_progress[0].messages.len(), 1);
        assert_eq!(eval.messages.len(), 2);
    }
}
