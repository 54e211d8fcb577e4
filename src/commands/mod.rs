//! CLI subcommand handlers.
//!
//! Each handler returns `anyhow::Result`; [`crate::cli::run`] reports the
//! failure and picks the exit code from the underlying
//! [`Error`](crate::Error), so handlers only add context.

pub mod completions;
pub mod page;
pub mod search;
pub mod setup;
pub mod space;
pub mod validate;
pub mod version;

use crate::cli::Cli;
use crate::client::{ConfluenceClient, resolve_client};
use crate::output::OutputMode;

/// Resolve configuration and connect, honoring `--env-file`.
pub(crate) fn connect(cli: &Cli) -> crate::Result<ConfluenceClient> {
  resolve_client(cli.config.env_file.as_deref())
}

pub(crate) fn output_mode(cli: &Cli) -> OutputMode {
  OutputMode::from_flags(cli.output.json, cli.behavior.quiet)
}
