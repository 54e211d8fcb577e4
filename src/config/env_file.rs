//! Reading and writing `.env.confluence` files.
//!
//! The format is deliberately tiny: one `KEY=value` pair per line, `#`
//! comments, blank lines ignored. Values may be wrapped in one layer of
//! single or double quotes.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use super::{Config, ConfigKey};
use crate::error::Result;

/// Parse the contents of an env file.
///
/// Lines without `=` are skipped rather than rejected. Only the first `=`
/// splits key from value, so values may themselves contain `=`.
pub fn parse_env_file(contents: &str) -> Config {
  let mut config = Config::new();

  for line in contents.lines() {
    let line = line.trim();

    if line.is_empty() || line.starts_with('#') {
      continue;
    }

    let Some((key, value)) = line.split_once('=') else {
      continue;
    };

    config.set(key.trim(), unquote(value.trim()));
  }

  config
}

/// Strip at most one quote character from each end of `value`.
fn unquote(value: &str) -> &str {
  let value = value.strip_prefix(['"', '\'']).unwrap_or(value);
  value.strip_suffix(['"', '\'']).unwrap_or(value)
}

/// Load an env file from disk.
///
/// A missing file yields an empty configuration; any other I/O failure is
/// returned to the caller.
pub fn load_env_file(path: &Path) -> Result<Config> {
  match fs::read_to_string(path) {
    Ok(contents) => {
      let config = parse_env_file(&contents);
      debug!("Loaded {} value(s) from {}", config.len(), path.display());
      Ok(config)
    }
    Err(err) if err.kind() == io::ErrorKind::NotFound => {
      debug!("No configuration file at {}", path.display());
      Ok(Config::new())
    }
    Err(err) => Err(err.into()),
  }
}

/// Write `config` to `path` in env-file format.
///
/// Recognized keys come first in their canonical order, followed by any
/// other keys. On Unix the file is readable and writable by its owner only.
pub fn write_env_file(path: &Path, config: &Config) -> Result<()> {
  let mut contents = String::from("# Confluence configuration\n");

  for key in ConfigKey::ALL {
    if let Some(value) = config.get(key) {
      contents.push_str(&format!("{}={value}\n", key.var_name()));
    }
  }

  for (name, value) in config.iter() {
    if ConfigKey::ALL.iter().any(|key| key.var_name() == name) {
      continue;
    }
    contents.push_str(&format!("{name}={value}\n"));
  }

  let mut options = OpenOptions::new();
  options.write(true).create(true).truncate(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
  }

  let mut file = options.open(path)?;

  // `mode` only applies on creation; tighten an existing file before any
  // secret is written to it.
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
  }

  file.write_all(contents.as_bytes())?;

  debug!("Wrote {} value(s) to {}", config.len(), path.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_env_file_basic() {
    let content = r#"
# comment lines start with '#'
CONFLUENCE_URL=https://wiki.example.com
CONFLUENCE_USERNAME=user@example.com
CONFLUENCE_API_TOKEN=secret
CONFLUENCE_CLOUD=true
"#;

    let cfg = parse_env_file(content);
    assert_eq!(cfg.len(), 4);
    assert_eq!(cfg.get(ConfigKey::Url), Some("https://wiki.example.com"));
    assert_eq!(cfg.get(ConfigKey::Username), Some("user@example.com"));
    assert_eq!(cfg.get(ConfigKey::ApiToken), Some("secret"));
    assert_eq!(cfg.get(ConfigKey::Cloud), Some("true"));
  }

  #[test]
  fn test_parse_env_file_empty() {
    assert!(parse_env_file("").is_empty());
    assert!(parse_env_file("   \n\t\n").is_empty());
  }

  #[test]
  fn test_parse_env_file_only_comments() {
    let content = "# one\n    # indented\n#CONFLUENCE_URL=https://commented.out\n";
    assert!(parse_env_file(content).is_empty());
  }

  #[test]
  fn test_parse_env_file_skips_lines_without_equals() {
    let content = "CONFLUENCE_URL=https://wiki.example.com\nexport\ngarbage line\n";
    let cfg = parse_env_file(content);
    assert_eq!(cfg.len(), 1);
  }

  #[test]
  fn test_parse_env_file_trims_key_and_value() {
    let cfg = parse_env_file("  CONFLUENCE_URL  =   https://wiki.example.com   ");
    assert_eq!(cfg.get(ConfigKey::Url), Some("https://wiki.example.com"));
  }

  #[test]
  fn test_parse_env_file_splits_on_first_equals() {
    let cfg = parse_env_file("CONFLUENCE_API_TOKEN=abc=def==");
    assert_eq!(cfg.get(ConfigKey::ApiToken), Some("abc=def=="));
  }

  #[test]
  fn test_parse_env_file_strips_one_layer_of_quotes() {
    let content = "A=\"double\"\nB='single'\nC=\"'nested'\"\nD=''\nE=\"\"inner\"\"";
    let cfg = parse_env_file(content);
    assert_eq!(cfg.get_var("A"), Some("double"));
    assert_eq!(cfg.get_var("B"), Some("single"));
    assert_eq!(cfg.get_var("C"), Some("'nested'"));
    assert_eq!(cfg.get_var("D"), Some(""));
    assert_eq!(cfg.get_var("E"), Some("\"inner\""));
  }

  #[test]
  fn test_parse_env_file_later_duplicate_wins_within_file() {
    let cfg = parse_env_file("CONFLUENCE_URL=https://one\nCONFLUENCE_URL=https://two");
    assert_eq!(cfg.url(), Some("https://two"));
  }

  #[test]
  fn test_parse_env_file_keeps_empty_values() {
    let cfg = parse_env_file("CONFLUENCE_PERSONAL_TOKEN=");
    assert_eq!(cfg.get(ConfigKey::PersonalToken), Some(""));
  }

  #[test]
  fn test_load_env_file_missing_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_env_file(&dir.path().join("absent.env")).unwrap();
    assert!(cfg.is_empty());
  }

  #[test]
  fn test_load_env_file_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_env_file(dir.path());
    assert!(matches!(result, Err(crate::Error::Io(_))));
  }

  #[test]
  fn test_write_then_load_reproduces_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env.confluence");

    let original: Config = [
      ("CONFLUENCE_URL", "https://wiki.internal.example.com"),
      ("CONFLUENCE_PERSONAL_TOKEN", "s3cr3t=="),
      ("CONFLUENCE_CLOUD", "false"),
      ("EXTRA_SETTING", "kept"),
    ]
    .into_iter()
    .collect();

    write_env_file(&path, &original).unwrap();
    let reloaded = load_env_file(&path).unwrap();

    assert_eq!(reloaded, original);
  }

  #[test]
  fn test_write_env_file_canonical_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.env");

    let cfg: Config = [
      ("CONFLUENCE_CLOUD", "true"),
      ("CONFLUENCE_API_TOKEN", "tok"),
      ("CONFLUENCE_URL", "https://example.atlassian.net"),
      ("CONFLUENCE_USERNAME", "me@example.com"),
    ]
    .into_iter()
    .collect();

    write_env_file(&path, &cfg).unwrap();
    let written = fs::read_to_string(&path).unwrap();

    insta::assert_snapshot!(written, @r"
    # Confluence configuration
    CONFLUENCE_URL=https://example.atlassian.net
    CONFLUENCE_USERNAME=me@example.com
    CONFLUENCE_API_TOKEN=tok
    CONFLUENCE_CLOUD=true
    ");
  }

  #[cfg(unix)]
  #[test]
  fn test_write_env_file_tightens_world_readable_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.env");
    fs::write(&path, "CONFLUENCE_PERSONAL_TOKEN=old\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o666)).unwrap();

    let cfg: Config = [("CONFLUENCE_PERSONAL_TOKEN", "new")].into_iter().collect();
    write_env_file(&path, &cfg).unwrap();

    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
    assert_eq!(load_env_file(&path).unwrap().get(ConfigKey::PersonalToken), Some("new"));
  }

  #[cfg(unix)]
  #[test]
  fn test_write_env_file_owner_only_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("secret.env");
    fs::write(&path, "OLD=1\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    let cfg: Config = [("CONFLUENCE_PERSONAL_TOKEN", "pat")].into_iter().collect();
    write_env_file(&path, &cfg).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
  }
}
