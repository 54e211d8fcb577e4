//! Error taxonomy shared by configuration resolution, client bootstrap, and
//! the REST operations issued through a bootstrapped client.
//!
//! The first four variants are the failures a command can hit before doing
//! any real work. They are kept structurally distinct so the command layer
//! can map each one to its own exit code and remediation text.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::client::{CaptchaChallenge, SessionError};
use crate::config::AuthMode;

/// Convenience alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the Confluence client library.
#[derive(Debug, Error)]
pub enum Error {
  /// An explicitly requested environment file does not exist.
  #[error("Environment file not found: {}", .path.display())]
  ConfigNotFound { path: PathBuf },

  /// The merged configuration violates one or more rules.
  #[error("Configuration errors:\n  {}", .violations.join("\n  "))]
  InvalidConfig { violations: Vec<String> },

  /// The authenticated session could not be constructed.
  #[error("{}", connection_message(.url, .mode, .source))]
  Connection {
    url: String,
    mode: AuthMode,
    #[source]
    source: SessionError,
  },

  /// Confluence refused the request until a CAPTCHA is solved in a browser.
  #[error("{}", .0.message())]
  CaptchaRequired(CaptchaChallenge),

  /// The API answered with a non-success status.
  #[error("Confluence API returned error {status}: {body}")]
  Api { status: StatusCode, body: String },

  /// The request never produced a response.
  #[error("HTTP request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The response body was not the JSON shape we expected.
  #[error("Failed to parse response from Confluence API: {0}")]
  Decode(#[from] serde_json::Error),

  /// A request URL could not be built from the configured base URL.
  #[error("Invalid Confluence URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Process exit code the CLI uses for this failure.
  pub fn exit_code(&self) -> i32 {
    match self {
      Self::ConfigNotFound { .. } | Self::InvalidConfig { .. } => 3,
      Self::Connection { .. } => 2,
      Self::CaptchaRequired(_) => 5,
      Self::Api { .. } | Self::Http(_) | Self::Decode(_) | Self::InvalidUrl(_) | Self::Io(_) => 1,
    }
  }

  /// Login URL to visit when the failure is a CAPTCHA challenge.
  pub fn captcha_login_url(&self) -> Option<&str> {
    match self {
      Self::CaptchaRequired(challenge) => Some(&challenge.login_url),
      _ => None,
    }
  }
}

/// Configuration keys worth re-checking when the session cannot be built.
///
/// Only the keys relevant to `mode` are listed.
pub fn connection_hints(mode: AuthMode) -> &'static [&'static str] {
  match mode {
    AuthMode::PersonalToken => &[
      "CONFLUENCE_URL is correct",
      "CONFLUENCE_PERSONAL_TOKEN is a valid Personal Access Token",
    ],
    AuthMode::Cloud => &[
      "CONFLUENCE_URL is correct",
      "CONFLUENCE_USERNAME is your email (Cloud) or username (Server/DC)",
      "CONFLUENCE_API_TOKEN is valid",
    ],
  }
}

fn connection_message(url: &str, mode: &AuthMode, reason: &SessionError) -> String {
  let mut message = format!("Failed to connect to Confluence at {url}\n\n  Error: {reason}\n\n  Please verify:");
  for hint in connection_hints(*mode) {
    message.push_str("\n    - ");
    message.push_str(hint);
  }
  message
}
