//! Turning a resolved configuration into an authenticated client.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use super::guard::CaptchaGuard;
use super::transport::{ApiRequest, ApiResponse, Credentials, HttpTransport, SessionError, Transport};
use crate::config::{AuthMode, Config, ConfigKey, ConfigResolver, Deployment, validate};
use crate::error::{Error, Result};

/// Authenticated handle to one Confluence instance.
///
/// Owned by a single command invocation. Every request passes through a
/// [`CaptchaGuard`], regardless of which inner transport is used.
pub struct ConfluenceClient {
  base_url: String,
  auth_mode: AuthMode,
  deployment: Deployment,
  transport: CaptchaGuard<Box<dyn Transport>>,
}

impl ConfluenceClient {
  /// Build an authenticated client from a resolved configuration.
  ///
  /// # Arguments
  /// * `config` - Merged configuration, usually from [`ConfigResolver::resolve`]
  ///
  /// # Returns
  /// A client whose auth mode and deployment are derived from `config`.
  ///
  /// # Errors
  /// Returns [`Error::InvalidConfig`] when `config` breaks any validation
  /// rule, and [`Error::Connection`] with hints for the configured
  /// [`AuthMode`] when the HTTP session cannot be constructed.
  pub fn build(config: &Config) -> Result<Self> {
    Self::build_with_timeout(config, None)
  }

  /// Same as [`ConfluenceClient::build`] with an explicit request timeout.
  ///
  /// # Arguments
  /// * `config` - Merged configuration
  /// * `timeout` - Per-request timeout; `None` keeps reqwest's default
  ///
  /// # Errors
  /// See [`ConfluenceClient::build`].
  pub fn build_with_timeout(config: &Config, timeout: Option<Duration>) -> Result<Self> {
    let violations = validate(config);
    if !violations.is_empty() {
      return Err(Error::InvalidConfig { violations });
    }

    let auth_mode = config.auth_mode();
    let base_url = config.url().unwrap_or_default().trim_end_matches('/').to_string();
    let deployment = config.deployment();

    let connection_error = |source: SessionError| Error::Connection {
      url: base_url.clone(),
      mode: auth_mode,
      source,
    };

    let credentials = credentials_for(config, auth_mode).map_err(&connection_error)?;
    let http = HttpTransport::new(&credentials, timeout).map_err(&connection_error)?;

    info!("Connecting to {base_url} ({deployment}, {auth_mode})");
    Ok(Self::with_transport(base_url, auth_mode, deployment, Box::new(http)))
  }

  /// Wrap an arbitrary transport; the CAPTCHA guard is still installed.
  ///
  /// # Arguments
  /// * `base_url` - Instance URL; a trailing `/` is dropped
  /// * `auth_mode` - Reported by [`ConfluenceClient::auth_mode`]
  /// * `deployment` - Decides the REST root, see [`ConfluenceClient::api_root`]
  /// * `transport` - Inner transport, placed behind a [`CaptchaGuard`]
  pub fn with_transport(
    base_url: impl Into<String>,
    auth_mode: AuthMode,
    deployment: Deployment,
    transport: Box<dyn Transport>,
  ) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Self {
      transport: CaptchaGuard::new(transport, base_url.clone()),
      base_url,
      auth_mode,
      deployment,
    }
  }

  /// Instance URL without a trailing `/`.
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn auth_mode(&self) -> AuthMode {
    self.auth_mode
  }

  pub fn deployment(&self) -> Deployment {
    self.deployment
  }

  /// Root of the REST API.
  ///
  /// Cloud instances serve Confluence under `/wiki`; it is appended when the
  /// configured URL does not already include it.
  pub fn api_root(&self) -> String {
    if self.deployment.is_cloud() && !self.base_url.contains("/wiki") {
      format!("{}/wiki/rest/api", self.base_url)
    } else {
      format!("{}/rest/api", self.base_url)
    }
  }

  /// Send a request through the guarded transport.
  ///
  /// # Errors
  /// Returns [`Error::CaptchaRequired`] when the response carries a CAPTCHA
  /// denial, whatever its status, and [`Error::Http`] when no response was
  /// received. Non-success statuses are returned as-is.
  pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
    self.transport.send(request).await
  }
}

/// Resolve configuration and build a client in one step.
///
/// This is the entry point commands use. The explicit path, when given,
/// must exist and is the only file consulted.
///
/// # Errors
/// Any error of [`ConfigResolver::resolve`] or [`ConfluenceClient::build`].
pub fn resolve_client(explicit: Option<&Path>) -> Result<ConfluenceClient> {
  let config = ConfigResolver::default().resolve(explicit)?;
  ConfluenceClient::build(&config)
}

fn credentials_for(config: &Config, mode: AuthMode) -> std::result::Result<Credentials, SessionError> {
  let value = |key: ConfigKey| {
    config
      .non_empty(key)
      .map(str::to_string)
      .ok_or(SessionError::MissingCredential(key))
  };

  let credentials = match mode {
    AuthMode::PersonalToken => Credentials::Bearer {
      token: value(ConfigKey::PersonalToken)?,
    },
    AuthMode::Cloud => Credentials::Basic {
      username: value(ConfigKey::Username)?,
      api_token: value(ConfigKey::ApiToken)?,
    },
  };

  debug!("Using {:?}", credentials);
  Ok(credentials)
}
