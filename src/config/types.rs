//! Strongly typed view over the raw `KEY=value` configuration map.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use url::Url;

/// Recognized configuration variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
  Url,
  Username,
  ApiToken,
  PersonalToken,
  Cloud,
}

impl ConfigKey {
  /// Every recognized key, in the order they are consulted and written.
  pub const ALL: [ConfigKey; 5] = [
    ConfigKey::Url,
    ConfigKey::Username,
    ConfigKey::ApiToken,
    ConfigKey::PersonalToken,
    ConfigKey::Cloud,
  ];

  /// Variable name used in files and in the process environment.
  pub fn var_name(self) -> &'static str {
    match self {
      Self::Url => "CONFLUENCE_URL",
      Self::Username => "CONFLUENCE_USERNAME",
      Self::ApiToken => "CONFLUENCE_API_TOKEN",
      Self::PersonalToken => "CONFLUENCE_PERSONAL_TOKEN",
      Self::Cloud => "CONFLUENCE_CLOUD",
    }
  }
}

impl fmt::Display for ConfigKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.var_name())
  }
}

/// Credential scheme selected for a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
  /// Username (email) plus API token sent as HTTP Basic credentials.
  Cloud,
  /// Personal Access Token sent as a bearer credential.
  PersonalToken,
}

impl AuthMode {
  /// Human-readable label for status output.
  pub fn label(self) -> &'static str {
    match self {
      Self::Cloud => "Cloud (username + API token)",
      Self::PersonalToken => "Personal Access Token",
    }
  }
}

impl fmt::Display for AuthMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Hosting model of the Confluence instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
  /// Atlassian Cloud (`*.atlassian.net`).
  Cloud,
  /// Self-hosted Server or Data Center.
  Server,
}

impl Deployment {
  pub fn is_cloud(self) -> bool {
    matches!(self, Self::Cloud)
  }
}

impl fmt::Display for Deployment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Cloud => f.write_str("Cloud"),
      Self::Server => f.write_str("Server/Data Center"),
    }
  }
}

/// Where a configuration file sits in the lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
  /// Path passed with `--env-file`; the only source when present.
  Explicit,
  /// Per-user default in the home directory.
  Home,
  /// Shared default for the current project.
  Project,
}

/// A configuration file candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
  pub kind: SourceKind,
  pub path: PathBuf,
}

impl ConfigSource {
  pub fn new(kind: SourceKind, path: impl Into<PathBuf>) -> Self {
    Self {
      kind,
      path: path.into(),
    }
  }
}

/// Merged configuration values, keyed by variable name.
///
/// Values are never mutated once resolution finishes. Keys outside
/// [`ConfigKey::ALL`] are carried along untouched so a written file reads
/// back to the same mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
  values: BTreeMap<String, String>,
}

impl Config {
  /// Create an empty configuration.
  pub fn new() -> Self {
    Self::default()
  }

  /// Raw value for a recognized key, empty strings included.
  pub fn get(&self, key: ConfigKey) -> Option<&str> {
    self.get_var(key.var_name())
  }

  /// Raw value for any variable name.
  pub fn get_var(&self, name: &str) -> Option<&str> {
    self.values.get(name).map(String::as_str)
  }

  /// Value for `key` only when it is present and non-empty.
  pub fn non_empty(&self, key: ConfigKey) -> Option<&str> {
    self.get(key).filter(|value| !value.is_empty())
  }

  pub fn contains_var(&self, name: &str) -> bool {
    self.values.contains_key(name)
  }

  /// Set `name` unless an earlier source already did.
  ///
  /// Returns `true` when the value was stored.
  pub fn insert_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
    let name = name.into();
    if self.values.contains_key(&name) {
      return false;
    }
    self.values.insert(name, value.into());
    true
  }

  /// Set `name`, replacing any existing value.
  pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.values.insert(name.into(), value.into());
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  /// Iterate over `(name, value)` pairs in name order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Base URL of the instance, if configured.
  pub fn url(&self) -> Option<&str> {
    self.non_empty(ConfigKey::Url)
  }

  /// Credential scheme implied by the configured values.
  ///
  /// A non-empty personal token always wins over the cloud pair.
  pub fn auth_mode(&self) -> AuthMode {
    if self.non_empty(ConfigKey::PersonalToken).is_some() {
      AuthMode::PersonalToken
    } else {
      AuthMode::Cloud
    }
  }

  /// Explicit `CONFLUENCE_CLOUD` setting, if the key is present at all.
  pub fn cloud_override(&self) -> Option<bool> {
    self
      .get(ConfigKey::Cloud)
      .map(|value| value.trim().eq_ignore_ascii_case("true"))
  }

  /// Deployment type: the explicit flag when set, otherwise inferred from the
  /// URL host.
  pub fn deployment(&self) -> Deployment {
    match self.cloud_override() {
      Some(true) => Deployment::Cloud,
      Some(false) => Deployment::Server,
      None => self.url().map(detect_deployment).unwrap_or(Deployment::Server),
    }
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Config {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut config = Config::new();
    for (key, value) in iter {
      config.set(key, value);
    }
    config
  }
}

/// Infer the deployment type from the host of `url`.
///
/// Hosts equal to `atlassian.net` or under `.atlassian.net` are Cloud; any
/// other host, or a URL that does not parse, is treated as self-hosted.
pub fn detect_deployment(url: &str) -> Deployment {
  let Ok(parsed) = Url::parse(url.trim()) else {
    return Deployment::Server;
  };

  match parsed.host_str() {
    Some(host) => {
      let host = host.to_ascii_lowercase();
      if host == "atlassian.net" || host.ends_with(".atlassian.net") {
        Deployment::Cloud
      } else {
        Deployment::Server
      }
    }
    None => Deployment::Server,
  }
}
