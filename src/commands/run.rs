//! Implementation of the `fanout run` command.
//!
//! Parses the template, gathers the substitution batch, and hands both to
//! the runner. With `--log-file`, the whole run is wrapped in a logged
//! scope so the log records entry and exit even when the batch fails.

use crate::cli::RunArgs;
use crate::error::Result;
use crate::events::EventLog;
use crate::runner::{Batch, RunOptions};
use crate::scope;
use crate::template::Template;
use std::sync::Arc;

/// Execute the `fanout run` command.
pub fn cmd_run(args: RunArgs) -> Result<()> {
    let template = Template::parse(&args.template)?;
    let entries = super::gather_entries(&args.values, args.subs_file.as_deref())?;

    let mut options = RunOptions {
        check_rc: !args.no_check_rc,
        stdout: args.stdout.clone(),
        autorun: false,
        max_in_flight: args.max_procs,
        ..RunOptions::default()
    };

    match &args.log_file {
        Some(path) => {
            let log = EventLog::new(path);
            options.log = Arc::new(log.clone());
            let mut batch = Batch::new(&template, &entries, options)?;
            scope::run_logged(&log, "fanout run", || batch.run())
        }
        None => {
            let mut batch = Batch::new(&template, &entries, options)?;
            batch.run()
        }
    }
}
