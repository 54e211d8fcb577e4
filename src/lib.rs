//! Confluence command-line client library
//!
//! Resolves connection settings from `.env.confluence` files and the
//! environment, bootstraps an authenticated client that detects CAPTCHA
//! lockouts, and exposes the page, space, and search operations the
//! `confluence` binary is built on.

pub mod cli;
pub mod client;
pub mod color;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use client::{ConfluenceApi, ConfluenceClient, resolve_client};
pub use config::{Config, ConfigResolver};
pub use error::{Error, Result};
