//! Data transfer objects returned by the Confluence REST API.
//!
//! Only the fields the CLI reads are typed. Everything is optional where
//! Confluence omits the field unless it was requested through `expand`.

use serde::{Deserialize, Serialize};

/// Confluence page metadata and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
  /// Unique numeric identifier assigned by Confluence.
  pub id: String,
  pub title: String,
  #[serde(rename = "type", default)]
  /// Content type (typically `"page"` or `"blogpost"`).
  pub page_type: String,
  #[serde(default)]
  pub status: String,
  /// Present when `body.storage` or `body.view` was expanded.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<PageBody>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub space: Option<Space>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version: Option<Version>,
  #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
  pub links: Option<Links>,
}

impl Page {
  /// Storage-format markup, falling back to the rendered view.
  pub fn content(&self) -> Option<&str> {
    let body = self.body.as_ref()?;
    body
      .storage
      .as_ref()
      .filter(|s| !s.value.is_empty())
      .or(body.view.as_ref())
      .map(|s| s.value.as_str())
  }

  pub fn space_key(&self) -> Option<&str> {
    self.space.as_ref().map(|s| s.key.as_str())
  }

  pub fn version_number(&self) -> Option<u64> {
    self.version.as_ref().map(|v| v.number)
  }
}

/// Page body in the representations that were expanded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageBody {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub storage: Option<StorageFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub view: Option<StorageFormat>,
}

/// One body representation (`storage` XHTML or rendered `view` HTML).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageFormat {
  pub value: String,
  pub representation: String,
}

impl StorageFormat {
  pub fn storage(value: impl Into<String>) -> Self {
    Self {
      value: value.into(),
      representation: "storage".to_string(),
    }
  }
}

/// Content version. Updates must send `number + 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
  pub number: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub when: Option<String>,
}

/// Space information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
  /// Short key that uniquely identifies the space.
  pub key: String,
  #[serde(default)]
  pub name: String,
  #[serde(rename = "type", default)]
  /// `"global"` or `"personal"`.
  pub space_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<SpaceDescription>,
  #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
  pub links: Option<Links>,
}

impl Space {
  /// Plain-text description, if one was expanded and is non-empty.
  pub fn description_text(&self) -> Option<&str> {
    self
      .description
      .as_ref()
      .and_then(|d| d.plain.as_ref())
      .map(|p| p.value.as_str())
      .filter(|v| !v.is_empty())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceDescription {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plain: Option<StorageFormat>,
}

/// Hyperlinks attached to a resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
  #[serde(rename = "webui", default, skip_serializing_if = "Option::is_none")]
  /// Path to the resource within the web UI, relative to `base`.
  pub web_ui: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub base: Option<String>,
  #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
  pub self_link: Option<String>,
}

impl Links {
  /// Absolute web UI address when both halves are known.
  pub fn web_url(&self) -> Option<String> {
    match (&self.base, &self.web_ui) {
      (Some(base), Some(web_ui)) => Some(format!("{base}{web_ui}")),
      _ => None,
    }
  }
}

/// Paginated list envelope used by most collection endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentList<T> {
  pub results: Vec<T>,
  #[serde(default)]
  pub start: u64,
  #[serde(default)]
  pub limit: u64,
  #[serde(default)]
  pub size: u64,
}

/// One hit from a CQL search.
///
/// `/rest/api/search` nests the content under `content`; `/rest/api/content/search`
/// returns the content itself. Both shapes decode here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content: Option<Page>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default)]
  pub title: String,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub content_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub space: Option<Space>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub excerpt: Option<String>,
}

impl SearchResult {
  pub fn id(&self) -> &str {
    self
      .content
      .as_ref()
      .map(|c| c.id.as_str())
      .or(self.id.as_deref())
      .unwrap_or_default()
  }

  pub fn title(&self) -> &str {
    match &self.content {
      Some(content) => &content.title,
      None => &self.title,
    }
  }

  pub fn space_key(&self) -> &str {
    self
      .content
      .as_ref()
      .and_then(Page::space_key)
      .or(self.space.as_ref().map(|s| s.key.as_str()))
      .unwrap_or_default()
  }

  pub fn content_type(&self) -> &str {
    self
      .content
      .as_ref()
      .map(|c| c.page_type.as_str())
      .or(self.content_type.as_deref())
      .unwrap_or_default()
  }
}
