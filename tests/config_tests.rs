//! Configuration resolution feeding client bootstrap.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use confluence_cli::client::ConfluenceClient;
use confluence_cli::config::{
  AuthMode, Config, ConfigResolver, ConfigSource, Deployment, SourceKind, write_env_file,
};
use confluence_cli::{Error, resolve_client};

fn resolver(home: &Path, project: &Path, env: &[(&str, &str)]) -> ConfigResolver {
  let env: HashMap<String, String> = env.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
  ConfigResolver::new(vec![
    ConfigSource::new(SourceKind::Home, home),
    ConfigSource::new(SourceKind::Project, project),
  ])
  .with_env(move |name| env.get(name).cloned())
}

#[test]
fn test_layered_sources_build_personal_token_client() {
  let dir = tempfile::tempdir().unwrap();
  let home = dir.path().join("home.env");
  let project = dir.path().join("project.env");
  fs::write(&home, "CONFLUENCE_URL=https://wiki.example.com\n").unwrap();
  fs::write(
    &project,
    "CONFLUENCE_URL=https://ignored.example.com\nCONFLUENCE_PERSONAL_TOKEN='project-pat'\n",
  )
  .unwrap();

  let config = resolver(&home, &project, &[("CONFLUENCE_USERNAME", "env-user")])
    .resolve(None)
    .unwrap();

  assert_eq!(config.url(), Some("https://wiki.example.com"));
  assert_eq!(config.get_var("CONFLUENCE_PERSONAL_TOKEN"), Some("project-pat"));
  assert_eq!(config.get_var("CONFLUENCE_USERNAME"), Some("env-user"));

  let client = ConfluenceClient::build(&config).unwrap();
  assert_eq!(client.auth_mode(), AuthMode::PersonalToken);
  assert_eq!(client.deployment(), Deployment::Server);
  assert_eq!(client.api_root(), "https://wiki.example.com/rest/api");
}

#[test]
fn test_setup_output_resolves_as_explicit_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join(".env.confluence");

  let written: Config = [
    ("CONFLUENCE_URL", "https://example.atlassian.net/wiki"),
    ("CONFLUENCE_USERNAME", "me@example.com"),
    ("CONFLUENCE_API_TOKEN", "cloud-token"),
    ("CONFLUENCE_CLOUD", "true"),
  ]
  .into_iter()
  .collect();
  write_env_file(&path, &written).unwrap();

  let config = ConfigResolver::new(vec![])
    .with_env(|_| None)
    .resolve(Some(&path))
    .unwrap();
  let client = ConfluenceClient::build(&config).unwrap();

  assert_eq!(client.auth_mode(), AuthMode::Cloud);
  assert_eq!(client.deployment(), Deployment::Cloud);
  assert_eq!(client.base_url(), "https://example.atlassian.net/wiki");
  assert_eq!(client.api_root(), "https://example.atlassian.net/wiki/rest/api");
}

#[test]
fn test_explicit_file_must_exist() {
  let dir = tempfile::tempdir().unwrap();
  let missing = dir.path().join("nope.env");

  let err = resolve_client(Some(&missing)).err().unwrap();

  assert!(matches!(err, Error::ConfigNotFound { ref path } if path == &missing));
  assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_invalid_file_reports_all_violations() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("bad.env");
  fs::write(&path, "# only a comment\nCONFLUENCE_URL=wiki.example.com\n").unwrap();

  let err = ConfigResolver::new(vec![])
    .with_env(|_| None)
    .resolve(Some(&path))
    .unwrap_err();

  match &err {
    Error::InvalidConfig { violations } => {
      assert_eq!(violations.len(), 2);
      assert!(violations[0].starts_with("CONFLUENCE_URL must start with http:// or https://"));
      assert!(violations[1].starts_with("Missing authentication credentials"));
    }
    other => panic!("expected invalid config, got {other:?}"),
  }
  assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_empty_environment_and_no_files() {
  let dir = tempfile::tempdir().unwrap();

  let err = resolver(&dir.path().join("a"), &dir.path().join("b"), &[])
    .resolve(None)
    .unwrap_err();

  let message = err.to_string();
  assert!(message.starts_with("Configuration errors:"));
  assert!(message.contains("Missing required variable: CONFLUENCE_URL"));
}
