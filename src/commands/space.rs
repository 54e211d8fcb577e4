//! `confluence space` subcommands.

use anyhow::{Context, Result};

use super::{connect, output_mode};
use crate::cli::{Cli, SpaceCommand};
use crate::client::models::Space;
use crate::client::{ConfluenceApi, DEFAULT_SPACE_EXPAND};
use crate::color::ColorScheme;
use crate::output::{self, OutputMode};

const DESCRIPTION_WIDTH: usize = 200;

pub(crate) async fn handle_space_command(command: &SpaceCommand, cli: &Cli, colors: &ColorScheme) -> Result<()> {
  let mode = output_mode(cli);
  let client = connect(cli)?;

  match command {
    SpaceCommand::List { limit, space_type } => {
      let spaces = client
        .list_spaces(*limit, space_type.as_space_type())
        .await
        .context("Failed to list spaces")?;

      match mode {
        OutputMode::Json => println!("{}", output::to_json(&spaces)?),
        OutputMode::Quiet => {
          for space in &spaces {
            println!("{}", space.key);
          }
        }
        OutputMode::Human => println!("{}", render_space_table(&spaces)),
      }
    }

    SpaceCommand::Get { key, expand } => {
      let expand = expand.as_deref().unwrap_or(DEFAULT_SPACE_EXPAND);
      let space = client
        .get_space(key, expand)
        .await
        .context("Failed to get space")?;

      match mode {
        OutputMode::Json => println!("{}", output::to_json(&space)?),
        OutputMode::Quiet => println!("{}", space.key),
        OutputMode::Human => println!("{}", render_space(&space, colors)),
      }
    }
  }

  Ok(())
}

fn render_space_table(spaces: &[Space]) -> String {
  if spaces.is_empty() {
    return "No spaces found".to_string();
  }

  let rows: Vec<Vec<String>> = spaces
    .iter()
    .map(|s| vec![s.key.clone(), output::truncate(&s.name, 40), s.space_type.clone()])
    .collect();

  format!(
    "{}\n\n{}",
    output::format_table(&["key", "name", "type"], &rows),
    output::count_footer(spaces.len(), "space")
  )
}

fn render_space(space: &Space, colors: &ColorScheme) -> String {
  let rule = "=".repeat(60);
  let name = if space.name.is_empty() { "Unknown" } else { &space.name };

  let mut out = vec![
    rule.clone(),
    colors.emphasis(name),
    rule,
    format!("Key: {}", space.key),
    format!("Type: {}", space.space_type),
  ];

  if let Some(description) = space.description_text() {
    out.push(String::new());
    out.push(format!("Description: {}", output::truncate(description, DESCRIPTION_WIDTH)));
  }

  if let Some(url) = space.links.as_ref().and_then(|l| l.web_url()) {
    out.push(String::new());
    out.push(format!("URL: {}", colors.link(url)));
  }

  out.join("\n")
}
