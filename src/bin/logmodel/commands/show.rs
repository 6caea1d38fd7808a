//! `logmodel show` command

use anyhow::{Context, Result};

use crate::cli::ShowArgs;
use crate::Session;
use logmodel::ops::{render_tree, RenderOptions};
use logmodel::util::config::OutputFormat;

pub fn execute(args: ShowArgs, session: &Session) -> Result<()> {
    let config = &session.config;
    let format = match &args.format {
        Some(format) => format.parse::<OutputFormat>()?,
        None => config.format(),
    };
    let strict = !args.lenient && config.strict();

    let log = match super::load(&args.log, session) {
        Ok(log) => log,
        Err(failure) => super::recover(failure, strict, session),
    };

    match format {
        OutputFormat::Tree => {
            let options = RenderOptions {
                show_messages: args.messages || config.show_messages(),
            };
            print!("{}", render_tree(&log, &options));
        }
        OutputFormat::Json => {
            let json = if args.pretty || config.pretty() {
                serde_json::to_string_pretty(&log)
            } else {
                serde_json::to_string(&log)
            }
            .context("failed to serialize log model")?;
            println!("{}", json);
        }
    }

    Ok(())
}
