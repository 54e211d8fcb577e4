//! Request/response plumbing behind [`ConfluenceClient`](super::ConfluenceClient).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{Method, StatusCode};
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{AuthMode, ConfigKey};
use crate::error::{Error, Result};

/// An outgoing API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
  pub method: Method,
  pub url: String,
  pub headers: HeaderMap,
  pub body: Option<serde_json::Value>,
}

impl ApiRequest {
  pub fn new(method: Method, url: impl Into<String>) -> Self {
    Self {
      method,
      url: url.into(),
      headers: HeaderMap::new(),
      body: None,
    }
  }

  pub fn get(url: impl Into<String>) -> Self {
    Self::new(Method::GET, url)
  }

  pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
    Self::new(Method::POST, url).with_body(body)
  }

  pub fn put(url: impl Into<String>, body: serde_json::Value) -> Self {
    Self::new(Method::PUT, url).with_body(body)
  }

  pub fn with_body(mut self, body: serde_json::Value) -> Self {
    self.body = Some(body);
    self
  }
}

/// A fully buffered API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
  pub status: StatusCode,
  pub headers: HeaderMap,
  pub body: String,
}

impl ApiResponse {
  pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
    Self {
      status,
      headers: HeaderMap::new(),
      body: body.into(),
    }
  }

  /// Convert a non-success status into [`Error::Api`].
  pub fn error_for_status(self) -> Result<Self> {
    if self.status.is_success() {
      Ok(self)
    } else {
      let body = if self.body.is_empty() {
        String::from("(no error details)")
      } else {
        self.body
      };
      Err(Error::Api {
        status: self.status,
        body,
      })
    }
  }

  /// Decode the body as JSON.
  pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
    Ok(serde_json::from_str(&self.body)?)
  }
}

/// Capability to deliver one request and return its response.
///
/// Implementations are composed as decorators; see
/// [`CaptchaGuard`](super::CaptchaGuard).
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
    (**self).send(request).await
  }
}

/// Credentials for one of the two supported schemes.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
  /// Username and API token, sent as HTTP Basic.
  Basic { username: String, api_token: String },
  /// Personal Access Token, sent as a bearer token.
  Bearer { token: String },
}

impl Credentials {
  pub fn auth_mode(&self) -> AuthMode {
    match self {
      Self::Basic { .. } => AuthMode::Cloud,
      Self::Bearer { .. } => AuthMode::PersonalToken,
    }
  }

  /// Value for the `Authorization` header.
  pub fn header_value(&self) -> String {
    match self {
      Self::Basic { username, api_token } => {
        let credentials = format!("{username}:{api_token}");
        format!("Basic {}", BASE64.encode(credentials.as_bytes()))
      }
      Self::Bearer { token } => format!("Bearer {token}"),
    }
  }
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Basic { username, .. } => f
        .debug_struct("Basic")
        .field("username", username)
        .field("api_token", &"********")
        .finish(),
      Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"********").finish(),
    }
  }
}

/// Why an HTTP session could not be set up.
///
/// Carried as the source of [`Error::Connection`].
#[derive(Debug, Error)]
pub enum SessionError {
  #[error("{0} is not set")]
  MissingCredential(ConfigKey),

  #[error("credentials contain characters not allowed in an HTTP header: {0}")]
  InvalidHeader(#[from] InvalidHeaderValue),

  #[error("failed to create HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

/// reqwest-backed transport that attaches credentials to every request.
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
  authorization: HeaderValue,
}

impl HttpTransport {
  /// Build the HTTP session.
  ///
  /// # Arguments
  /// * `credentials` - Sent as the `Authorization` header on every request
  /// * `timeout` - Per-request timeout; `None` keeps reqwest's default
  ///
  /// # Errors
  /// Returns [`SessionError::InvalidHeader`] when the credentials cannot be
  /// encoded as a header value and [`SessionError::Client`] when the
  /// underlying client cannot be constructed. Callers add remediation
  /// context.
  pub fn new(credentials: &Credentials, timeout: Option<Duration>) -> std::result::Result<Self, SessionError> {
    let mut authorization = HeaderValue::from_str(&credentials.header_value())?;
    authorization.set_sensitive(true);

    let mut builder = reqwest::Client::builder().user_agent(format!(
      "confluence-cli/{} ({})",
      env!("CARGO_PKG_VERSION"),
      env!("TARGET")
    ));
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    Ok(Self { client, authorization })
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
    debug!("{} {}", request.method, request.url);

    let mut builder = self
      .client
      .request(request.method, &request.url)
      .headers(request.headers)
      .header(AUTHORIZATION, self.authorization.clone())
      .header(ACCEPT, "application/json");

    if let Some(body) = request.body {
      builder = builder.json(&body);
    }

    let response = builder.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;

    trace!("{status} ({} bytes)", body.len());
    Ok(ApiResponse { status, headers, body })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_basic_header_value() {
    let creds = Credentials::Basic {
      username: "user@example.com".to_string(),
      api_token: "test-token".to_string(),
    };

    let header = creds.header_value();
    let encoded = header.strip_prefix("Basic ").unwrap();
    let decoded = String::from_utf8(BASE64.decode(encoded.as_bytes()).unwrap()).unwrap();
    assert_eq!(decoded, "user@example.com:test-token");
    assert_eq!(creds.auth_mode(), AuthMode::Cloud);
  }

  #[test]
  fn test_bearer_header_value() {
    let creds = Credentials::Bearer {
      token: "pat-123".to_string(),
    };
    assert_eq!(creds.header_value(), "Bearer pat-123");
    assert_eq!(creds.auth_mode(), AuthMode::PersonalToken);
  }

  #[test]
  fn test_credentials_debug_masks_secrets() {
    let creds = Credentials::Basic {
      username: "user".to_string(),
      api_token: "super-secret".to_string(),
    };
    let debug = format!("{creds:?}");
    assert!(debug.contains("user"));
    assert!(!debug.contains("super-secret"));

    let creds = Credentials::Bearer {
      token: "super-secret".to_string(),
    };
    assert!(!format!("{creds:?}").contains("super-secret"));
  }

  #[test]
  fn test_http_transport_rejects_control_characters() {
    let creds = Credentials::Bearer {
      token: "bad\ntoken".to_string(),
    };
    let err = HttpTransport::new(&creds, None).err().unwrap();
    assert!(matches!(err, SessionError::InvalidHeader(_)));
    assert!(err.to_string().contains("not allowed in an HTTP header"));
    assert!(std::error::Error::source(&err).is_some());
  }

  #[test]
  fn test_http_transport_builds() {
    let creds = Credentials::Bearer {
      token: "pat".to_string(),
    };
    assert!(HttpTransport::new(&creds, Some(Duration::from_secs(5))).is_ok());
  }

  #[test]
  fn test_error_for_status_passes_success() {
    let response = ApiResponse::new(StatusCode::OK, "{}");
    assert!(response.error_for_status().is_ok());
  }

  #[test]
  fn test_error_for_status_wraps_failure() {
    let response = ApiResponse::new(StatusCode::NOT_FOUND, "");
    match response.error_for_status() {
      Err(Error::Api { status, body }) => {
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "(no error details)");
      }
      other => panic!("unexpected result: {other:?}"),
    }
  }
}
