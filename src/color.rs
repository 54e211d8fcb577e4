//! Semantic terminal colors honoring `--color`.

use std::fmt::Display;
use std::io::IsTerminal;

use owo_colors::{OwoColorize, Style};

use crate::cli::ColorOption;

/// Semantic styles used by the command handlers.
///
/// Every message also carries a symbol (✓, ✗, ⚠, →) so nothing depends on
/// color alone.
pub struct ColorScheme {
  enabled: bool,
}

impl ColorScheme {
  /// `auto` enables colors only when stdout and stderr are both terminals.
  pub fn new(color_option: ColorOption) -> Self {
    let enabled = match color_option {
      ColorOption::Always => true,
      ColorOption::Never => false,
      ColorOption::Auto => std::io::stdout().is_terminal() && std::io::stderr().is_terminal(),
    };

    Self { enabled }
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  fn paint<T: Display>(&self, text: T, style: Style) -> String {
    if self.enabled {
      text.style(style).to_string()
    } else {
      text.to_string()
    }
  }

  /// Successful outcomes and the ✓ marker.
  pub fn success<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().green())
  }

  /// Failures and the ✗ marker.
  pub fn error<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_red().bold())
  }

  /// Warnings such as dry-run notices.
  pub fn warning<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().yellow())
  }

  /// Progress steps and hints.
  pub fn info<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().cyan())
  }

  /// Labels and titles.
  pub fn emphasis<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_white().bold())
  }

  /// URLs.
  pub fn link<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().blue().underline())
  }

  /// File paths.
  pub fn path<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().magenta())
  }

  /// IDs, versions, and counts.
  pub fn number<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_blue())
  }

  /// Commands the user can run.
  pub fn code<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_green())
  }

  /// Secondary detail.
  pub fn dimmed<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().dimmed())
  }
}
