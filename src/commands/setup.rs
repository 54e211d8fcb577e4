//! `confluence setup`: interactive credential setup.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::config::{AuthMode, Config, ConfigKey, ENV_FILE_NAME, write_env_file};

const API_TOKEN_URL: &str = "https://id.atlassian.com/manage-profile/security/api-tokens";

/// Credentials collected by the prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SetupCredentials {
  Cloud { username: String, api_token: String },
  PersonalToken { token: String },
}

impl SetupCredentials {
  fn auth_mode(&self) -> AuthMode {
    match self {
      Self::Cloud { .. } => AuthMode::Cloud,
      Self::PersonalToken { .. } => AuthMode::PersonalToken,
    }
  }
}

/// Configuration to write for the collected answers.
///
/// `CONFLUENCE_CLOUD` is always written so the deployment does not depend
/// on host-name detection later.
pub(crate) fn setup_config(url: &str, credentials: &SetupCredentials) -> Config {
  let mut config = Config::new();
  config.set(ConfigKey::Url.var_name(), url.trim().trim_end_matches('/'));

  match credentials {
    SetupCredentials::Cloud { username, api_token } => {
      config.set(ConfigKey::Username.var_name(), username.trim());
      config.set(ConfigKey::ApiToken.var_name(), api_token.trim());
      config.set(ConfigKey::Cloud.var_name(), "true");
    }
    SetupCredentials::PersonalToken { token } => {
      config.set(ConfigKey::PersonalToken.var_name(), token.trim());
      config.set(ConfigKey::Cloud.var_name(), "false");
    }
  }

  config
}

/// Target file: `--env-file` when given, otherwise `~/.env.confluence`.
fn setup_path(cli: &Cli) -> Result<PathBuf> {
  if let Some(path) = &cli.config.env_file {
    return Ok(path.clone());
  }
  dirs::home_dir()
    .map(|home| home.join(ENV_FILE_NAME))
    .ok_or_else(|| anyhow!("Could not determine home directory; pass --env-file"))
}

fn validate_url(input: &str) -> Result<(), String> {
  let trimmed = input.trim();
  if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
    Ok(())
  } else {
    Err("URL must start with http:// or https://".to_string())
  }
}

pub(crate) fn handle_setup_command(cli: &Cli, colors: &ColorScheme) -> Result<()> {
  let theme = ColorfulTheme::default();
  let path = setup_path(cli)?;
  let rule = "=".repeat(60);

  println!("{rule}");
  println!("{}", colors.emphasis("Confluence Credential Setup"));
  println!("{rule}");

  println!("\n{}", colors.emphasis("Step 1: Confluence URL"));
  println!(
    "  {}",
    colors.dimmed("Example: https://wiki.example.com or https://company.atlassian.net/wiki")
  );
  let url: String = Input::with_theme(&theme)
    .with_prompt("Confluence URL")
    .validate_with(|input: &String| validate_url(input))
    .interact_text()
    .context("Failed to read URL")?;

  println!("\n{}", colors.emphasis("Step 2: Authentication Type"));
  let choice = Select::with_theme(&theme)
    .with_prompt("Authentication type")
    .items(&[
      "Cloud (Atlassian Cloud) - email + API token",
      "Server/Data Center (self-hosted) - Personal Access Token",
    ])
    .default(0)
    .interact()
    .context("Failed to read authentication type")?;

  let credentials = if choice == 0 {
    println!("\n{}", colors.emphasis("Step 3: Cloud Credentials"));
    println!("  Get your API token from: {}", colors.link(API_TOKEN_URL));
    let username: String = Input::with_theme(&theme)
      .with_prompt("Email address")
      .interact_text()
      .context("Failed to read email address")?;
    let api_token = Password::with_theme(&theme)
      .with_prompt("API token")
      .interact()
      .context("Failed to read API token")?;
    SetupCredentials::Cloud { username, api_token }
  } else {
    println!("\n{}", colors.emphasis("Step 3: Personal Access Token"));
    println!("  Create one in Confluence: Profile → Personal Access Tokens → Create token");
    let token = Password::with_theme(&theme)
      .with_prompt("Personal Access Token")
      .interact()
      .context("Failed to read Personal Access Token")?;
    SetupCredentials::PersonalToken { token }
  };

  if path.exists() {
    let overwrite = Confirm::with_theme(&theme)
      .with_prompt(format!("{} exists. Overwrite?", path.display()))
      .default(false)
      .interact()
      .context("Failed to read confirmation")?;
    if !overwrite {
      println!("{} Setup cancelled; nothing written.", colors.warning("⚠"));
      return Ok(());
    }
  }

  let config = setup_config(&url, &credentials);
  println!("\nWriting configuration to: {}", colors.path(path.display()));
  write_env_file(&path, &config).context("Failed to write configuration")?;

  println!("\n{} Configuration saved ({})", colors.success("✓"), credentials.auth_mode());
  println!("\n{}", colors.emphasis("Next steps:"));
  println!("  1. Test your connection: {}", colors.code("confluence validate -v"));
  println!("  2. Get a page: {}", colors.code("confluence page get --id PAGE_ID"));

  Ok(())
}
