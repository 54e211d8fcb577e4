//! `confluence validate`: check configuration and connectivity.

use anyhow::{Context, Result};
use serde::Serialize;

use super::output_mode;
use crate::cli::Cli;
use crate::client::{ConfluenceApi, ConfluenceClient};
use crate::color::ColorScheme;
use crate::config::ConfigResolver;
use crate::output::{self, OutputMode};

#[derive(Debug, Serialize)]
struct ValidationReport<'a> {
  url: &'a str,
  auth_mode: &'a str,
  deployment: String,
  api_root: String,
  connected: bool,
}

/// Resolve configuration, connect, and make one lightweight API call.
///
/// Each failure surfaces as its own [`Error`](crate::Error) variant so the
/// exit code tells configuration, connection, and CAPTCHA problems apart.
pub(crate) async fn handle_validate_command(cli: &Cli, colors: &ColorScheme) -> Result<()> {
  let mode = output_mode(cli);
  let config = ConfigResolver::default().resolve(cli.config.env_file.as_deref())?;
  let url = config.url().unwrap_or("Not configured");

  if mode == OutputMode::Human {
    println!("{} {}", colors.info("→"), colors.info("Validating Confluence connection"));
    println!("  {}: {}", colors.emphasis("URL"), colors.link(url));
    println!("  {}: {}", colors.emphasis("Auth mode"), config.auth_mode());
    println!("  {}: {}", colors.emphasis("Deployment"), config.deployment());
    println!("\n{} {}", colors.info("→"), colors.info("Connecting..."));
  }

  let client = ConfluenceClient::build(&config)?;
  client.list_spaces(1, None).await.context("API call failed")?;

  match mode {
    OutputMode::Json => {
      let report = ValidationReport {
        url,
        auth_mode: client.auth_mode().label(),
        deployment: client.deployment().to_string(),
        api_root: client.api_root(),
        connected: true,
      };
      println!("{}", output::to_json(&report)?);
    }
    OutputMode::Quiet => {}
    OutputMode::Human => {
      println!("\n{} Connected to {}", colors.success("✓"), colors.link(url));
    }
  }

  Ok(())
}
