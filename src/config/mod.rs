//! Configuration resolution for Confluence access.
//!
//! Settings live in small `KEY=value` files (`.env.confluence`) with process
//! environment variables as a gap-filling fallback. Two credential schemes are
//! supported:
//!
//! ```text
//! # Atlassian Cloud
//! CONFLUENCE_URL=https://your-instance.atlassian.net
//! CONFLUENCE_USERNAME=your.email@example.com
//! CONFLUENCE_API_TOKEN=your-api-token
//!
//! # Server / Data Center
//! CONFLUENCE_URL=https://wiki.internal.example.com
//! CONFLUENCE_PERSONAL_TOKEN=your-personal-access-token
//! ```
//!
//! Cloud API tokens are created at
//! <https://id.atlassian.com/manage-profile/security/api-tokens>.

mod env_file;
mod resolver;
mod types;

pub use env_file::{load_env_file, parse_env_file, write_env_file};
pub use resolver::{ConfigResolver, default_search_paths, validate};
pub use types::{AuthMode, Config, ConfigKey, ConfigSource, Deployment, SourceKind, detect_deployment};

/// File name used for both the per-user and the project-shared defaults.
pub const ENV_FILE_NAME: &str = ".env.confluence";
