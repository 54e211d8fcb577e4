//! Authenticated access to the Confluence REST API.
//!
//! A [`ConfluenceClient`] is built from a resolved [`Config`](crate::config::Config).
//! Every request it issues goes through a [`Transport`]; the transport chain
//! always ends in a [`CaptchaGuard`] so CAPTCHA denials surface as
//! [`Error::CaptchaRequired`](crate::Error::CaptchaRequired) on any call.

pub mod api;
mod bootstrap;
mod guard;
pub mod models;
mod transport;

pub use api::{ConfluenceApi, DEFAULT_PAGE_EXPAND, DEFAULT_SPACE_EXPAND, NewPage, SpaceType, text_query};
pub use bootstrap::{ConfluenceClient, resolve_client};
pub use guard::{CaptchaChallenge, CaptchaGuard, DENIED_REASON_HEADER, detect_captcha};
pub use transport::{ApiRequest, ApiResponse, Credentials, HttpTransport, SessionError, Transport};
