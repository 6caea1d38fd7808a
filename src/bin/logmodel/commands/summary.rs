//! `logmodel summary` command

use anyhow::{Context, Result};

use crate::cli::SummaryArgs;
use crate::Session;
use logmodel::ops::{render_summary, summarize};

pub fn execute(args: SummaryArgs, session: &Session) -> Result<()> {
    let strict = !args.lenient && session.config.strict();

    let log = match super::load(&args.log, session) {
        Ok(log) => log,
        Err(failure) => super::recover(failure, strict, session),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&summarize(&log))
            .context("failed to serialize summary")?;
        println!("{}", json);
    } else {
        print!("{}", render_summary(&log));
    }

    Ok(())
}
