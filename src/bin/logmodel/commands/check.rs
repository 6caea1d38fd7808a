//! `logmodel check` command

use anyhow::Result;
use tracing::debug;

use crate::cli::CheckArgs;
use crate::Session;
use logmodel::builder::ErrorCategory;
use logmodel::util::diagnostic::Diagnostic;

pub fn execute(args: CheckArgs, session: &Session) -> Result<()> {
    let failure = match super::load(&args.log, session) {
        Ok(log) => {
            let projects = log.build.as_ref().map_or(0, |b| b.projects().len());
            println!(
                "ok: {} project(s), {} evaluation(s), no problems found",
                projects,
                log.evaluations.len()
            );
            return Ok(());
        }
        Err(failure) => failure,
    };

    for error in &failure.errors {
        debug!(category = ?error.category(), "{}", error);
        print!("{}", error.to_diagnostic().format(session.color));
    }

    let terminal = failure
        .errors
        .iter()
        .filter(|e| e.category() == ErrorCategory::Terminal)
        .count();
    if terminal > 0 {
        let note = Diagnostic::note(format!(
            "{} event(s) arrived after the build finished",
            terminal
        ));
        print!("{}", note.format(session.color));
    }
    println!("{}", failure);

    std::process::exit(1);
}
