//! Merging configuration sources by precedence and validating the result.
//!
//! Precedence, highest first:
//! 1. an explicit file (`--env-file`), which must exist and is used alone;
//! 2. the ordered list of default files (home, then project);
//! 3. process environment variables, which only fill keys still unset.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Config, ConfigKey, ConfigSource, ENV_FILE_NAME, SourceKind, load_env_file};
use crate::error::{Error, Result};

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Default files consulted when no explicit path is given, highest priority
/// first: `~/.env.confluence`, then `.env.confluence` in the working
/// directory.
pub fn default_search_paths() -> Vec<ConfigSource> {
  let mut sources = Vec::with_capacity(2);
  if let Some(home) = dirs::home_dir() {
    sources.push(ConfigSource::new(SourceKind::Home, home.join(ENV_FILE_NAME)));
  }
  sources.push(ConfigSource::new(SourceKind::Project, PathBuf::from(ENV_FILE_NAME)));
  sources
}

/// Resolves a [`Config`] from files and the environment.
pub struct ConfigResolver {
  search_paths: Vec<ConfigSource>,
  env: EnvLookup,
}

impl Default for ConfigResolver {
  fn default() -> Self {
    Self::new(default_search_paths())
  }
}

impl ConfigResolver {
  /// Create a resolver over an explicit, ordered list of default files.
  ///
  /// Earlier entries take priority over later ones.
  pub fn new(search_paths: Vec<ConfigSource>) -> Self {
    Self {
      search_paths,
      env: Box::new(|name| std::env::var(name).ok()),
    }
  }

  /// Replace the process environment with `lookup`.
  pub fn with_env<F>(mut self, lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
  {
    self.env = Box::new(lookup);
    self
  }

  /// Default files this resolver consults, in priority order.
  pub fn search_paths(&self) -> &[ConfigSource] {
    &self.search_paths
  }

  /// Merge all sources without validating the result.
  ///
  /// # Errors
  /// Returns [`Error::ConfigNotFound`] when `explicit` is given but missing,
  /// or [`Error::Io`] when a file exists but cannot be read.
  pub fn load(&self, explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
      Some(path) => {
        if !path.exists() {
          return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
          });
        }
        debug!("Using explicit configuration file {}", path.display());
        load_env_file(path)?
      }
      None => self.load_defaults()?,
    };

    for key in ConfigKey::ALL {
      let name = key.var_name();
      if config.contains_var(name) {
        continue;
      }
      if let Some(value) = (self.env)(name) {
        debug!("{name} taken from environment");
        config.insert_if_absent(name, value);
      }
    }

    Ok(config)
  }

  /// Merge all sources and validate the result.
  ///
  /// # Errors
  /// In addition to the errors of [`ConfigResolver::load`], returns
  /// [`Error::InvalidConfig`] listing every violated rule.
  pub fn resolve(&self, explicit: Option<&Path>) -> Result<Config> {
    let config = self.load(explicit)?;

    let violations = validate(&config);
    if !violations.is_empty() {
      return Err(Error::InvalidConfig { violations });
    }

    debug!(
      "Configuration resolved: auth mode {:?}, deployment {:?}",
      config.auth_mode(),
      config.deployment()
    );
    Ok(config)
  }

  fn load_defaults(&self) -> Result<Config> {
    let mut merged = Config::new();

    for source in &self.search_paths {
      let file_config = load_env_file(&source.path)?;
      for (name, value) in file_config.iter() {
        if merged.insert_if_absent(name, value) {
          debug!("{name} taken from {:?} file {}", source.kind, source.path.display());
        }
      }
    }

    Ok(merged)
  }
}

/// Check `config` for completeness.
///
/// Returns every violated rule in a fixed order; an empty list means the
/// configuration is usable.
pub fn validate(config: &Config) -> Vec<String> {
  let mut violations = Vec::new();

  match config.url() {
    None => violations.push(format!("Missing required variable: {}", ConfigKey::Url)),
    Some(url) => {
      if !url.starts_with("http://") && !url.starts_with("https://") {
        violations.push(format!("{} must start with http:// or https://: {url}", ConfigKey::Url));
      }
    }
  }

  let has_cloud_auth =
    config.non_empty(ConfigKey::Username).is_some() && config.non_empty(ConfigKey::ApiToken).is_some();
  let has_server_auth = config.non_empty(ConfigKey::PersonalToken).is_some();

  if !has_cloud_auth && !has_server_auth {
    violations.push(format!(
      "Missing authentication credentials. Provide either:\n    - {} + {} (for Cloud)\n    - {} (for Server/DC)",
      ConfigKey::Username,
      ConfigKey::ApiToken,
      ConfigKey::PersonalToken
    ));
  }

  violations
}
