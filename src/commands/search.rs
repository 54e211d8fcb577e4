//! `confluence search` subcommands.

use anyhow::{Context, Result};
use tracing::debug;

use super::{connect, output_mode};
use crate::cli::{Cli, SearchCommand};
use crate::client::models::SearchResult;
use crate::client::{ConfluenceApi, text_query};
use crate::output::{self, OutputMode};

pub(crate) async fn handle_search_command(command: &SearchCommand, cli: &Cli) -> Result<()> {
  let (cql, limit, expand) = match command {
    SearchCommand::Query { cql, limit, expand } => (cql.clone(), *limit, expand.as_deref()),
    SearchCommand::Text { text, space, limit } => (text_query(text, space.as_deref()), *limit, None),
  };
  debug!("CQL: {cql}");

  let client = connect(cli)?;
  let results = client
    .search(&cql, limit, expand)
    .await
    .context("Search failed")?;

  match output_mode(cli) {
    OutputMode::Json => println!("{}", output::to_json(&results)?),
    OutputMode::Quiet => {
      for result in &results {
        println!("{}", result.id());
      }
    }
    OutputMode::Human => println!("{}", render_results(&results)),
  }

  Ok(())
}

fn render_results(results: &[SearchResult]) -> String {
  if results.is_empty() {
    return "No results found".to_string();
  }

  let rows: Vec<Vec<String>> = results
    .iter()
    .map(|r| {
      vec![
        r.id().to_string(),
        output::truncate(r.title(), 50),
        r.space_key().to_string(),
        r.content_type().to_string(),
      ]
    })
    .collect();

  format!(
    "{}\n\n{}",
    output::format_table(&["id", "title", "space", "type"], &rows),
    found_footer(results.len())
  )
}

fn found_footer(count: usize) -> String {
  let suffix = if count == 1 { "" } else { "s" };
  format!("({count} result{suffix} found)")
}
