//! `confluence page` subcommands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::{connect, output_mode};
use crate::cli::{BodyFormat, BodyInput, Cli, PageCommand};
use crate::client::models::Page;
use crate::client::{ConfluenceApi, DEFAULT_PAGE_EXPAND, NewPage};
use crate::color::ColorScheme;
use crate::output::{self, OutputMode};

/// Body used when a page is created without one.
const EMPTY_BODY: &str = "<p></p>";

const RULE_WIDTH: usize = 60;

/// Dispatch `confluence page ...`.
pub(crate) async fn handle_page_command(command: &PageCommand, cli: &Cli, colors: &ColorScheme) -> Result<()> {
  let mode = output_mode(cli);

  match command {
    PageCommand::Get {
      id,
      space,
      title,
      format,
      expand,
    } => {
      let client = connect(cli)?;
      let expand = expand.as_deref().unwrap_or(DEFAULT_PAGE_EXPAND);
      let page = fetch_page(&client, id.as_deref(), space.as_deref(), title.as_deref(), expand).await?;

      match mode {
        OutputMode::Json => println!("{}", output::to_json(&page)?),
        OutputMode::Quiet => println!("{}", page.id),
        OutputMode::Human => println!("{}", render_page(&page, *format, colors)),
      }
    }

    PageCommand::Create {
      space,
      title,
      body,
      parent_id,
      dry_run,
    } => {
      let new_page = NewPage {
        space_key: space.clone(),
        title: title.clone(),
        body: read_body(body)?.unwrap_or_else(|| EMPTY_BODY.to_string()),
        parent_id: parent_id.clone(),
      };

      if *dry_run {
        println!("{}", render_create_preview(&new_page, colors));
        return Ok(());
      }

      let client = connect(cli)?;
      let created = client
        .create_page(&new_page)
        .await
        .context("Failed to create page")?;

      match mode {
        OutputMode::Json => println!("{}", output::to_json(&created)?),
        OutputMode::Quiet => println!("{}", created.id),
        OutputMode::Human => {
          println!("{} Created page: {}", colors.success("✓"), colors.emphasis(&created.title));
          println!("  ID: {}", colors.number(&created.id));
          if let Some(url) = created.links.as_ref().and_then(|l| l.web_url()) {
            println!("  URL: {}", colors.link(url));
          }
        }
      }
    }

    PageCommand::Update {
      page_id,
      title,
      body,
      dry_run,
    } => {
      let body = read_body(body)?;

      if *dry_run {
        println!(
          "{}",
          render_update_preview(page_id, title.as_deref(), body.as_deref(), colors)
        );
        return Ok(());
      }

      let client = connect(cli)?;
      let updated = client
        .update_page(page_id, title.as_deref(), body.as_deref())
        .await
        .context("Failed to update page")?;

      match mode {
        OutputMode::Json => println!("{}", output::to_json(&updated)?),
        OutputMode::Quiet => println!("{page_id}"),
        OutputMode::Human => {
          println!("{} Updated page {}", colors.success("✓"), colors.number(page_id));
          if title.is_some() {
            println!("  {} title", colors.success("✓"));
          }
          if body.is_some() {
            println!("  {} body", colors.success("✓"));
          }
          if let Some(version) = updated.version_number() {
            println!("  Version: {}", colors.number(version));
          }
        }
      }
    }

    PageCommand::Children { page_id, limit } => {
      let client = connect(cli)?;
      let children = client
        .get_child_pages(page_id, *limit)
        .await
        .context("Failed to get children")?;

      match mode {
        OutputMode::Json => println!("{}", output::to_json(&children)?),
        OutputMode::Quiet => {
          for child in &children {
            println!("{}", child.id);
          }
        }
        OutputMode::Human => println!("{}", render_children(page_id, &children, colors)),
      }
    }
  }

  Ok(())
}

/// Look a page up by ID, or by space and title.
pub(crate) async fn fetch_page(
  api: &dyn ConfluenceApi,
  id: Option<&str>,
  space: Option<&str>,
  title: Option<&str>,
  expand: &str,
) -> Result<Page> {
  match (id, space, title) {
    (Some(id), _, _) => api.get_page(id, expand).await.context("Failed to get page"),
    (None, Some(space), Some(title)) => api
      .find_page_by_title(space, title, expand)
      .await
      .context("Failed to get page")?
      .with_context(|| format!("Page not found: {title} in space {space}")),
    _ => bail!("Must provide either --id or both --space and --title"),
  }
}

/// Inline body, or the contents of `--body-file`.
fn read_body(input: &BodyInput) -> Result<Option<String>> {
  match (&input.body, &input.body_file) {
    (Some(body), _) => Ok(Some(body.clone())),
    (None, Some(path)) => read_body_file(path).map(Some),
    (None, None) => Ok(None),
  }
}

fn read_body_file(path: &Path) -> Result<String> {
  fs::read_to_string(path).with_context(|| format!("Failed to read body file {}", path.display()))
}

fn render_page(page: &Page, format: BodyFormat, colors: &ColorScheme) -> String {
  let heavy = "=".repeat(RULE_WIDTH);
  let light = "-".repeat(RULE_WIDTH);
  let version = page
    .version_number()
    .map_or_else(|| "?".to_string(), |v| v.to_string());

  let mut out = vec![
    heavy.clone(),
    colors.emphasis(&page.title),
    heavy,
    format!(
      "ID: {} | Space: {} | Version: {}",
      page.id,
      page.space_key().unwrap_or("Unknown"),
      version
    ),
  ];

  if let Some(content) = page.content() {
    let body = match format {
      BodyFormat::Storage => content.to_string(),
      BodyFormat::Text => output::html_to_text(content),
    };
    out.extend([String::new(), light.clone(), "CONTENT".to_string(), light.clone(), String::new(), body]);
  }

  if let Some(url) = page.links.as_ref().and_then(|l| l.web_url()) {
    out.extend([String::new(), light, format!("URL: {}", colors.link(url))]);
  }

  out.join("\n")
}

fn render_children(page_id: &str, children: &[Page], colors: &ColorScheme) -> String {
  if children.is_empty() {
    return "No child pages found".to_string();
  }

  let mut out = vec![format!("Child pages of {page_id}:"), "-".repeat(RULE_WIDTH)];
  for child in children {
    out.push(format!("  {}: {}", colors.number(&child.id), child.title));
  }
  out.push(String::new());
  out.push(output::count_footer(children.len(), "page"));
  out.join("\n")
}

fn render_create_preview(page: &NewPage, colors: &ColorScheme) -> String {
  [
    format!("{} DRY RUN - No changes will be made", colors.warning("⚠")),
    String::new(),
    "Would create page:".to_string(),
    format!("  Space: {}", page.space_key),
    format!("  Title: {}", page.title),
    format!(
      "  Parent ID: {}",
      page.parent_id.as_deref().unwrap_or("None (root level)")
    ),
    format!("  Body length: {} chars", page.body.chars().count()),
  ]
  .join("\n")
}

fn render_update_preview(page_id: &str, title: Option<&str>, body: Option<&str>, colors: &ColorScheme) -> String {
  let mut out = vec![
    format!("{} DRY RUN - No changes will be made", colors.warning("⚠")),
    String::new(),
    format!("Would update page {page_id}:"),
  ];
  if let Some(title) = title {
    out.push(format!("  New title: {title}"));
  }
  if let Some(body) = body {
    out.push(format!("  New body length: {} chars", body.chars().count()));
  }
  out.join("\n")
}
