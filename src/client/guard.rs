//! CAPTCHA detection wrapped around every request.
//!
//! After too many failed logins Confluence Server/Data Center starts denying
//! API calls until a human solves a CAPTCHA in the browser. The denial is
//! only visible in a response header, so without inspection it looks like a
//! plain 401. [`CaptchaGuard`] turns it into a distinct error.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::warn;

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::{Error, Result};

/// Header carrying the reason an authentication attempt was denied.
pub const DENIED_REASON_HEADER: &str = "X-Authentication-Denied-Reason";

const CAPTCHA_MARKER: &str = "CAPTCHA_CHALLENGE";
const LOGIN_URL_MARKER: &str = "; login-url=";

/// A CAPTCHA denial together with where to resolve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaChallenge {
  /// Interactive login page where the CAPTCHA can be completed.
  pub login_url: String,
}

impl CaptchaChallenge {
  /// Explanation and remediation steps for the user.
  pub fn message(&self) -> String {
    format!(
      "CAPTCHA challenge detected!\n\n  \
       Confluence requires you to solve a CAPTCHA before API access is allowed.\n\n  \
       To resolve:\n    \
       1. Open {} in your web browser\n    \
       2. Log in and complete the CAPTCHA challenge\n    \
       3. Retry this command\n\n  \
       This typically happens after several failed login attempts.",
      self.login_url
    )
  }
}

/// Inspect response headers for a CAPTCHA denial.
///
/// The login URL is taken from a `; login-url=` segment of the header value.
/// When the segment is missing, `{base_url}/login.action` is assumed; that
/// fallback is a guess and has not been confirmed against a real server.
pub fn detect_captcha(headers: &HeaderMap, base_url: &str) -> Option<CaptchaChallenge> {
  let value = headers.get(DENIED_REASON_HEADER)?;
  let value = String::from_utf8_lossy(value.as_bytes());

  if !value.contains(CAPTCHA_MARKER) {
    return None;
  }

  let login_url = match value.split_once(LOGIN_URL_MARKER) {
    Some((_, url)) => url.trim().to_string(),
    None => format!("{}/login.action", base_url.trim_end_matches('/')),
  };

  Some(CaptchaChallenge { login_url })
}

/// Transport decorator that fails any response carrying a CAPTCHA denial.
pub struct CaptchaGuard<T> {
  inner: T,
  base_url: String,
}

impl<T: Transport> CaptchaGuard<T> {
  pub fn new(inner: T, base_url: impl Into<String>) -> Self {
    Self {
      inner,
      base_url: base_url.into(),
    }
  }

  /// Check a response that has already been received.
  pub fn inspect(&self, response: ApiResponse) -> Result<ApiResponse> {
    match detect_captcha(&response.headers, &self.base_url) {
      Some(challenge) => {
        warn!("CAPTCHA challenge detected, login at {}", challenge.login_url);
        Err(Error::CaptchaRequired(challenge))
      }
      None => Ok(response),
    }
  }
}

#[async_trait]
impl<T: Transport> Transport for CaptchaGuard<T> {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
    let response = self.inner.send(request).await?;
    self.inspect(response)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use reqwest::header::HeaderValue;
  use reqwest::{Method, StatusCode};

  use super::*;

  fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(DENIED_REASON_HEADER, HeaderValue::from_str(value).unwrap());
    headers
  }

  #[test]
  fn test_detect_captcha_with_login_url() {
    let headers = headers_with("CAPTCHA_CHALLENGE; login-url=https://wiki.example.com/login.action");
    let challenge = detect_captcha(&headers, "https://ignored.example.com").unwrap();
    assert_eq!(challenge.login_url, "https://wiki.example.com/login.action");
  }

  #[test]
  fn test_detect_captcha_trims_login_url() {
    let headers = headers_with("CAPTCHA_CHALLENGE; login-url=  https://wiki.example.com/login.action  ");
    let challenge = detect_captcha(&headers, "https://ignored.example.com").unwrap();
    assert_eq!(challenge.login_url, "https://wiki.example.com/login.action");
  }

  #[test]
  fn test_detect_captcha_without_login_url_uses_base() {
    let headers = headers_with("CAPTCHA_CHALLENGE");
    let challenge = detect_captcha(&headers, "https://wiki.example.com").unwrap();
    assert_eq!(challenge.login_url, "https://wiki.example.com/login.action");
  }

  #[test]
  fn test_detect_captcha_other_reason() {
    let headers = headers_with("OTHER_REASON");
    assert!(detect_captcha(&headers, "https://wiki.example.com").is_none());
  }

  #[test]
  fn test_detect_captcha_header_absent() {
    assert!(detect_captcha(&HeaderMap::new(), "https://wiki.example.com").is_none());
  }

  #[test]
  fn test_detect_captcha_header_name_case_insensitive() {
    let mut headers = HeaderMap::new();
    headers.insert(
      "x-authentication-denied-reason",
      HeaderValue::from_static("CAPTCHA_CHALLENGE"),
    );
    assert!(detect_captcha(&headers, "https://wiki.example.com").is_some());
  }

  #[test]
  fn test_captcha_message_contains_remediation() {
    let challenge = CaptchaChallenge {
      login_url: "https://wiki.example.com/login.action".to_string(),
    };
    insta::assert_snapshot!(challenge.message(), @r"
    CAPTCHA challenge detected!

      Confluence requires you to solve a CAPTCHA before API access is allowed.

      To resolve:
        1. Open https://wiki.example.com/login.action in your web browser
        2. Log in and complete the CAPTCHA challenge
        3. Retry this command

      This typically happens after several failed login attempts.
    ");
  }

  /// Replays a fixed response and counts calls.
  struct Canned {
    headers: HeaderMap,
    calls: AtomicUsize,
  }

  #[async_trait]
  impl Transport for Canned {
    async fn send(&self, _request: ApiRequest) -> Result<ApiResponse> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(ApiResponse {
        status: StatusCode::UNAUTHORIZED,
        headers: self.headers.clone(),
        body: String::new(),
      })
    }
  }

  #[tokio::test]
  async fn test_guard_raises_on_every_call() {
    let guard = CaptchaGuard::new(
      Canned {
        headers: headers_with("CAPTCHA_CHALLENGE"),
        calls: AtomicUsize::new(0),
      },
      "https://wiki.example.com",
    );

    for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
      let request = ApiRequest::new(method.clone(), "https://wiki.example.com/rest/api/content");
      let err = guard.send(request).await.unwrap_err();
      assert!(matches!(err, Error::CaptchaRequired(_)), "{method} was not guarded");
    }
    assert_eq!(guard.inner.calls.load(Ordering::SeqCst), 4);
  }

  #[tokio::test]
  async fn test_guard_passes_through_unmodified() {
    let guard = CaptchaGuard::new(
      Canned {
        headers: headers_with("OTHER_REASON"),
        calls: AtomicUsize::new(0),
      },
      "https://wiki.example.com",
    );

    let response = guard
      .send(ApiRequest::new(Method::DELETE, "https://wiki.example.com/x"))
      .await
      .unwrap();
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers.get(DENIED_REASON_HEADER).unwrap(), "OTHER_REASON");
  }
}
