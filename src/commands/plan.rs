//! Implementation of the `fanout plan` command.
//!
//! A dry run: validates the batch, builds every command, and prints them
//! shell-quoted, one per line, without spawning anything.

use crate::cli::PlanArgs;
use crate::error::Result;
use crate::runner::{Batch, RunOptions};
use crate::template::Template;

/// Execute the `fanout plan` command.
pub fn cmd_plan(args: PlanArgs) -> Result<()> {
    let template = Template::parse(&args.template)?;
    let entries = super::gather_entries(&args.values, args.subs_file.as_deref())?;

    let options = RunOptions {
        autorun: false,
        ..RunOptions::default()
    };
    let batch = Batch::new(&template, &entries, options)?;

    for command in batch.built_commands() {
        println!("{}", command);
    }

    Ok(())
}
