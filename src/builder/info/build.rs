//! Build record.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::MessageInfo;
use crate::core::Outcome;

#[derive(Debug)]
pub struct BuildInfo {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub result: Option<Outcome>,
    pub environment: BTreeMap<Arc<str>, Arc<str>>,
    pub messages: Vec<MessageInfo>,
}

impl BuildInfo {
    pub fn new(start: DateTime<Utc>, environment: BTreeMap<Arc<str>, Arc<str>>) -> Self {
        BuildInfo {
            start,
            end: None,
            result: None,
            environment,
            messages: Vec::new(),
        }
    }

    pub fn finish(&mut self, end: DateTime<Utc>, succeeded: bool) {
        self.end = Some(end);
        self.result = Some(Outcome::from_succeeded(succeeded));
    }
}
