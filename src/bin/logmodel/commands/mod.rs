//! Command implementations

pub mod check;
pub mod completions;
pub mod show;
pub mod summary;

use std::io::IsTerminal;
use std::path::Path;

use crate::Session;
use logmodel::builder::ModelFailure;
use logmodel::core::Log;
use logmodel::ops::{read_events, replay, ReplayOptions};
use logmodel::util::diagnostic::{emit, suggestions, Diagnostic};

/// Read and replay a log. An unreadable log is reported and exits with
/// status 1.
pub fn load(log: &Path, session: &Session) -> Result<Log, ModelFailure> {
    let events = match read_events(log) {
        Ok(events) => events,
        Err(e) => {
            let diag = Diagnostic::error(format!("{:#}", e))
                .with_location(log)
                .with_suggestion(suggestions::UNREADABLE_LOG);
            emit(&diag, session.color);
            std::process::exit(1);
        }
    };

    let options = ReplayOptions {
        progress: !session.verbose && std::io::stderr().is_terminal(),
    };
    replay(events, &options)
}

/// Warn about a failed model and return the recovered snapshot.
///
/// Exits with status 1 instead when `strict`.
pub fn recover(failure: ModelFailure, strict: bool, session: &Session) -> Log {
    let diag = Diagnostic::warning(failure.to_string())
        .with_context("the model below is incomplete")
        .with_suggestion(suggestions::MODEL_FAILED);
    emit(&diag, session.color);

    if strict {
        std::process::exit(1);
    }
    failure.recovered.map(|log| *log).unwrap_or_default()
}
