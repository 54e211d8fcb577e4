//! Rendering helpers shared by the command handlers.

use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
  /// Colored, human-readable text.
  Human,
  /// Pretty-printed JSON of the API payload.
  Json,
  /// Identifiers only, one per line.
  Quiet,
}

impl OutputMode {
  /// `--json` wins over `--quiet`.
  pub fn from_flags(json: bool, quiet: bool) -> Self {
    if json {
      Self::Json
    } else if quiet {
      Self::Quiet
    } else {
      Self::Human
    }
  }
}

/// Pretty-printed JSON for `value`.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
  serde_json::to_string_pretty(value)
}

/// Render rows as a plain-text table.
///
/// Columns are separated by ` | ` and the header is underlined with a
/// `-+-` rule. Widths are measured in terminal cells, so wide characters
/// line up. Trailing padding is trimmed from each line.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
  if rows.is_empty() {
    return "(no data)".to_string();
  }

  let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
  for row in rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.width());
    }
  }

  let mut lines = Vec::with_capacity(rows.len() + 2);
  lines.push(render_row(headers, &widths));
  lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
  for row in rows {
    lines.push(render_row(row, &widths));
  }

  lines.join("\n")
}

fn render_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
  let line = cells
    .iter()
    .zip(widths)
    .map(|(cell, width)| pad(cell.as_ref(), *width))
    .collect::<Vec<_>>()
    .join(" | ");
  line.trim_end().to_string()
}

fn pad(cell: &str, width: usize) -> String {
  let fill = width.saturating_sub(cell.width());
  format!("{cell}{}", " ".repeat(fill))
}

/// Cut `text` to at most `max_width` terminal cells.
pub fn truncate(text: &str, max_width: usize) -> String {
  let mut used = 0;
  let mut out = String::new();
  for ch in text.chars() {
    let w = ch.width().unwrap_or(0);
    if used + w > max_width {
      break;
    }
    used += w;
    out.push(ch);
  }
  out
}

/// Strip markup from storage-format or view HTML.
///
/// Tags are dropped, the common entities are decoded, and runs of blank
/// lines collapse to a single blank line.
pub fn html_to_text(html: &str) -> String {
  let mut stripped = String::with_capacity(html.len());
  let mut in_tag = false;
  for ch in html.chars() {
    match ch {
      '<' => in_tag = true,
      '>' if in_tag => in_tag = false,
      _ if !in_tag => stripped.push(ch),
      _ => {}
    }
  }

  let decoded = stripped
    .replace("&nbsp;", " ")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&amp;", "&");

  let mut out = String::with_capacity(decoded.len());
  let mut previous_blank = false;
  for line in decoded.lines() {
    let blank = line.trim().is_empty();
    if blank && previous_blank {
      continue;
    }
    if !out.is_empty() {
      out.push('\n');
    }
    if !blank {
      out.push_str(line);
    }
    previous_blank = blank;
  }

  out.trim().to_string()
}

/// `(N things)` footer, pluralized.
pub fn count_footer(count: usize, noun: &str) -> String {
  let suffix = if count == 1 { "" } else { "s" };
  format!("({count} {noun}{suffix})")
}
