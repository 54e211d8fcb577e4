//! In-memory transport for exercising the client without a network.
//!
//! Responses are matched on method and URL path. Every request is recorded
//! so tests can assert on what was sent.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use confluence_cli::Result;
use confluence_cli::client::{ApiRequest, ApiResponse, DENIED_REASON_HEADER, Transport};
use reqwest::header::HeaderValue;
use reqwest::{Method, StatusCode};
use url::Url;

struct Route {
  method: Method,
  path: String,
  status: StatusCode,
  body: String,
}

/// Requests seen by a [`FakeTransport`], shared with the test.
pub type RequestLog = Arc<Mutex<Vec<ApiRequest>>>;

#[derive(Default)]
pub struct FakeTransport {
  routes: Vec<Route>,
  denied_reason: Option<String>,
  log: RequestLog,
}

impl FakeTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answer `method path` with `status` and a JSON body.
  pub fn route(mut self, method: Method, path: &str, status: StatusCode, body: serde_json::Value) -> Self {
    self.routes.push(Route {
      method,
      path: path.to_string(),
      status,
      body: body.to_string(),
    });
    self
  }

  pub fn get(self, path: &str, body: serde_json::Value) -> Self {
    self.route(Method::GET, path, StatusCode::OK, body)
  }

  /// Attach `X-Authentication-Denied-Reason: value` to every response.
  pub fn with_denied_reason(mut self, value: &str) -> Self {
    self.denied_reason = Some(value.to_string());
    self
  }

  pub fn log(&self) -> RequestLog {
    Arc::clone(&self.log)
  }
}

#[async_trait]
impl Transport for FakeTransport {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
    let path = Url::parse(&request.url)?.path().to_string();

    let mut response = self
      .routes
      .iter()
      .find(|route| route.method == request.method && route.path == path)
      .map(|route| ApiResponse::new(route.status, route.body.clone()))
      .unwrap_or_else(|| ApiResponse::new(StatusCode::NOT_FOUND, r#"{"message":"No route"}"#));

    if let Some(reason) = &self.denied_reason {
      response
        .headers
        .insert(DENIED_REASON_HEADER, HeaderValue::from_str(reason).unwrap());
    }

    self.log.lock().unwrap().push(request);
    Ok(response)
  }
}
