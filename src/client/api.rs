//! Typed Confluence REST operations.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::bootstrap::ConfluenceClient;
use super::models::{ContentList, Page, SearchResult, Space};
use super::transport::ApiRequest;
use crate::error::{Error, Result};

/// Default `expand` for page reads: body, space, and version.
pub const DEFAULT_PAGE_EXPAND: &str = "body.storage,body.view,space,version";

/// Default `expand` for space reads.
pub const DEFAULT_SPACE_EXPAND: &str = "description.plain,homepage";

/// Space classification filter for [`ConfluenceApi::list_spaces`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceType {
  Global,
  Personal,
}

impl SpaceType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Global => "global",
      Self::Personal => "personal",
    }
  }
}

impl fmt::Display for SpaceType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A page to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
  pub space_key: String,
  pub title: String,
  /// Storage-format body.
  pub body: String,
  pub parent_id: Option<String>,
}

impl NewPage {
  fn to_json(&self) -> serde_json::Value {
    let mut payload = json!({
      "type": "page",
      "title": self.title,
      "space": { "key": self.space_key },
      "body": {
        "storage": { "value": self.body, "representation": "storage" }
      }
    });
    if let Some(parent) = &self.parent_id {
      payload["ancestors"] = json!([{ "id": parent }]);
    }
    payload
  }
}

/// CQL for a plain full-text search, optionally limited to one space.
///
/// Double quotes inside `text` are escaped so the phrase stays one literal.
pub fn text_query(text: &str, space: Option<&str>) -> String {
  let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
  let cql = format!("text ~ \"{escaped}\"");
  match space {
    Some(space) if !space.is_empty() => format!("space = {space} AND {cql}"),
    _ => cql,
  }
}

/// Confluence operations used by the commands (enables testing with fake
/// implementations).
///
/// Every call on [`ConfluenceClient`] goes through its CAPTCHA guard, so any
/// method can fail with [`Error::CaptchaRequired`].
#[async_trait]
pub trait ConfluenceApi: Send + Sync {
  /// Fetch a page by ID.
  ///
  /// # Arguments
  /// * `page_id` - Numeric content ID
  /// * `expand` - Comma-separated expansions, e.g. [`DEFAULT_PAGE_EXPAND`]
  ///
  /// # Errors
  /// Returns [`Error::Api`] for a non-success status (404 for an unknown
  /// ID) and [`Error::Decode`] when the body is not a page.
  async fn get_page(&self, page_id: &str, expand: &str) -> Result<Page>;

  /// Look a page up by space key and exact title.
  ///
  /// # Returns
  /// `None` when no page in the space has that title.
  async fn find_page_by_title(&self, space_key: &str, title: &str, expand: &str) -> Result<Option<Page>>;

  /// Create a page, under `page.parent_id` when set.
  ///
  /// # Returns
  /// The created page as reported by Confluence, including its new ID.
  ///
  /// # Errors
  /// Returns [`Error::Api`] when Confluence rejects the page, for example
  /// a duplicate title in the space.
  async fn create_page(&self, page: &NewPage) -> Result<Page>;

  /// Replace the title and/or body of an existing page.
  ///
  /// The current version is read first and the update is sent as the next
  /// version. A field left as `None` keeps its current value.
  ///
  /// # Errors
  /// Returns [`Error::Api`] when either request fails; a 409 means the page
  /// changed between the read and the write.
  async fn update_page(&self, page_id: &str, title: Option<&str>, body: Option<&str>) -> Result<Page>;

  /// Direct children of a page.
  async fn get_child_pages(&self, page_id: &str, limit: u32) -> Result<Vec<Page>>;

  /// List spaces visible to the authenticated user.
  ///
  /// # Arguments
  /// * `limit` - Maximum number of spaces to return
  /// * `space_type` - Restrict to global or personal spaces; `None` for all
  async fn list_spaces(&self, limit: u32, space_type: Option<SpaceType>) -> Result<Vec<Space>>;

  async fn get_space(&self, space_key: &str, expand: &str) -> Result<Space>;

  /// Run a CQL query.
  ///
  /// # Arguments
  /// * `cql` - Query text, see [`text_query`] for plain full-text search
  /// * `limit` - Maximum number of results
  /// * `expand` - Optional expansions applied to each result's content
  ///
  /// # Errors
  /// Returns [`Error::Api`] with status 400 for malformed CQL.
  async fn search(&self, cql: &str, limit: u32, expand: Option<&str>) -> Result<Vec<SearchResult>>;
}

impl ConfluenceClient {
  /// Absolute URL for `segments` below the REST root, with `query` appended.
  ///
  /// Segments are percent-encoded, so IDs and keys can be passed verbatim.
  fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String> {
    let mut url = Url::parse(&self.api_root())?;
    url
      .path_segments_mut()
      .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
      .pop_if_empty()
      .extend(segments);
    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url.into())
  }

  async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
    let response = self.send(request).await?.error_for_status()?;
    response.json()
  }
}

#[async_trait]
impl ConfluenceApi for ConfluenceClient {
  async fn get_page(&self, page_id: &str, expand: &str) -> Result<Page> {
    let url = self.endpoint(&["content", page_id], &[("expand", expand)])?;
    self.fetch(ApiRequest::get(url)).await
  }

  async fn find_page_by_title(&self, space_key: &str, title: &str, expand: &str) -> Result<Option<Page>> {
    let url = self.endpoint(
      &["content"],
      &[
        ("type", "page"),
        ("spaceKey", space_key),
        ("title", title),
        ("expand", expand),
        ("limit", "1"),
      ],
    )?;
    let list: ContentList<Page> = self.fetch(ApiRequest::get(url)).await?;
    debug!("Title lookup in {space_key} returned {} result(s)", list.results.len());
    Ok(list.results.into_iter().next())
  }

  async fn create_page(&self, page: &NewPage) -> Result<Page> {
    let url = self.endpoint(&["content"], &[])?;
    self.fetch(ApiRequest::post(url, page.to_json())).await
  }

  async fn update_page(&self, page_id: &str, title: Option<&str>, body: Option<&str>) -> Result<Page> {
    let current = self.get_page(page_id, "version,body.storage").await?;
    let next_version = current.version_number().unwrap_or(0) + 1;
    let current_body = current
      .body
      .as_ref()
      .and_then(|b| b.storage.as_ref())
      .map(|s| s.value.as_str())
      .unwrap_or_default();

    let payload = json!({
      "id": page_id,
      "type": "page",
      "title": title.unwrap_or(current.title.as_str()),
      "version": { "number": next_version },
      "body": {
        "storage": { "value": body.unwrap_or(current_body), "representation": "storage" }
      }
    });

    debug!("Updating page {page_id} to version {next_version}");
    let url = self.endpoint(&["content", page_id], &[])?;
    self.fetch(ApiRequest::put(url, payload)).await
  }

  async fn get_child_pages(&self, page_id: &str, limit: u32) -> Result<Vec<Page>> {
    let limit = limit.to_string();
    let url = self.endpoint(
      &["content", page_id, "child", "page"],
      &[("start", "0"), ("limit", limit.as_str())],
    )?;
    let list: ContentList<Page> = self.fetch(ApiRequest::get(url)).await?;
    Ok(list.results)
  }

  async fn list_spaces(&self, limit: u32, space_type: Option<SpaceType>) -> Result<Vec<Space>> {
    let limit = limit.to_string();
    let mut query = vec![("start", "0"), ("limit", limit.as_str())];
    if let Some(space_type) = space_type {
      query.push(("type", space_type.as_str()));
    }
    let url = self.endpoint(&["space"], &query)?;
    let list: ContentList<Space> = self.fetch(ApiRequest::get(url)).await?;
    Ok(list.results)
  }

  async fn get_space(&self, space_key: &str, expand: &str) -> Result<Space> {
    let url = self.endpoint(&["space", space_key], &[("expand", expand)])?;
    self.fetch(ApiRequest::get(url)).await
  }

  async fn search(&self, cql: &str, limit: u32, expand: Option<&str>) -> Result<Vec<SearchResult>> {
    let limit = limit.to_string();
    let mut query = vec![("cql", cql), ("limit", limit.as_str())];
    if let Some(expand) = expand {
      query.push(("expand", expand));
    }
    let url = self.endpoint(&["search"], &query)?;
    let list: ContentList<SearchResult> = self.fetch(ApiRequest::get(url)).await?;
    Ok(list.results)
  }
}
