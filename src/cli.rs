//! Command-line interface definitions for confluence-cli.
//!
//! Every subcommand shares the global `--env-file`, `--json`, `--quiet`,
//! `--verbose`, and `--color` options. [`run`] parses arguments, sets up
//! logging, dispatches, and turns failures into exit codes.

use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::client::SpaceType;
use crate::color::ColorScheme;
use crate::commands;
use crate::error::Error;

/// Exit code for arguments that fail to parse or do not make sense together.
pub const EXIT_INVALID_ARGS: i32 = 4;

/// confluence - work with Confluence from the command line
#[derive(Debug, Parser)]
#[command(
  name = "confluence",
  version,
  about = "Read, create, and search Confluence content",
  long_about = "A command-line client for Confluence Cloud and Server/Data Center.\n\
                Credentials are read from ~/.env.confluence, ./.env.confluence, or the environment.",
  styles = get_clap_styles()
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,

  /// Configuration options
  #[command(flatten)]
  pub config: ConfigOptions,

  /// Output options
  #[command(flatten)]
  pub output: OutputOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Check the configuration and test the connection
  Validate,

  /// Interactively write an environment file with credentials
  Setup,

  /// Get, create, and update pages
  Page {
    #[command(subcommand)]
    command: PageCommand,
  },

  /// List and inspect spaces
  Space {
    #[command(subcommand)]
    command: SpaceCommand,
  },

  /// Search content with CQL
  Search {
    #[command(subcommand)]
    command: SearchCommand,
  },

  /// Display version and build information
  Version {
    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

#[derive(Debug, Subcommand)]
pub enum PageCommand {
  /// Print a page, found by ID or by space key and title
  Get {
    /// Page ID
    #[arg(long, conflicts_with_all = ["space", "title"])]
    id: Option<String>,

    /// Space key (used with --title)
    #[arg(long, requires = "title")]
    space: Option<String>,

    /// Page title (used with --space)
    #[arg(long, requires = "space")]
    title: Option<String>,

    /// How to print the page body
    #[arg(long, value_enum, default_value = "text")]
    format: BodyFormat,

    /// Fields to expand (default: body.storage,body.view,space,version)
    #[arg(short, long)]
    expand: Option<String>,
  },

  /// Create a new page
  Create {
    /// Space key
    #[arg(long)]
    space: String,

    /// Page title
    #[arg(long)]
    title: String,

    #[command(flatten)]
    body: BodyInput,

    /// Parent page ID
    #[arg(long, value_name = "ID")]
    parent_id: Option<String>,

    /// Show what would be created without calling the API
    #[arg(long)]
    dry_run: bool,
  },

  /// Update the title and/or body of a page
  Update {
    /// Page ID
    page_id: String,

    /// New title
    #[arg(long)]
    title: Option<String>,

    #[command(flatten)]
    body: BodyInput,

    /// Show what would be updated without calling the API
    #[arg(long)]
    dry_run: bool,
  },

  /// List direct child pages
  Children {
    /// Parent page ID
    page_id: String,

    /// Maximum pages to return
    #[arg(short = 'n', long, default_value_t = 100)]
    limit: u32,
  },
}

/// Page body given inline or from a file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BodyInput {
  /// Body content in storage format (XHTML)
  #[arg(long, conflicts_with = "body_file")]
  pub body: Option<String>,

  /// File containing the body in storage format
  #[arg(long, value_name = "PATH")]
  pub body_file: Option<PathBuf>,
}

impl BodyInput {
  pub fn is_empty(&self) -> bool {
    self.body.is_none() && self.body_file.is_none()
  }
}

#[derive(Debug, Subcommand)]
pub enum SpaceCommand {
  /// List spaces
  List {
    /// Maximum spaces to return
    #[arg(short = 'n', long, default_value_t = 100)]
    limit: u32,

    /// Filter by space type
    #[arg(long = "type", value_enum, default_value = "all")]
    space_type: SpaceTypeFilter,
  },

  /// Show details for one space
  Get {
    /// Space key (e.g. DEV)
    key: String,

    /// Fields to expand (default: description.plain,homepage)
    #[arg(short, long)]
    expand: Option<String>,
  },
}

#[derive(Debug, Subcommand)]
pub enum SearchCommand {
  /// Run a raw CQL query
  Query {
    /// CQL query, e.g. "space = DEV AND text ~ 'design'"
    cql: String,

    /// Maximum results to return
    #[arg(short = 'n', long, default_value_t = 25)]
    limit: u32,

    /// Fields to expand
    #[arg(short, long)]
    expand: Option<String>,
  },

  /// Full-text search, optionally limited to one space
  Text {
    text: String,

    /// Limit to a specific space
    #[arg(short, long)]
    space: Option<String>,

    /// Maximum results to return
    #[arg(short = 'n', long, default_value_t = 25)]
    limit: u32,
  },
}

/// Page body rendering for `page get`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BodyFormat {
  /// Raw storage-format markup
  Storage,
  /// Markup stripped to plain text
  Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpaceTypeFilter {
  Global,
  Personal,
  All,
}

impl SpaceTypeFilter {
  pub fn as_space_type(self) -> Option<SpaceType> {
    match self {
      Self::Global => Some(SpaceType::Global),
      Self::Personal => Some(SpaceType::Personal),
      Self::All => None,
    }
  }
}

/// Shell types for completion generation
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Powershell,
  Elvish,
}

/// Configuration options
#[derive(Debug, clap::Args)]
pub struct ConfigOptions {
  /// Environment file to use instead of the default search paths
  #[arg(long, global = true, value_name = "PATH")]
  pub env_file: Option<PathBuf>,
}

/// Output options
#[derive(Debug, clap::Args)]
pub struct OutputOptions {
  /// Print results as JSON
  #[arg(long, global = true)]
  pub json: bool,
}

/// Behavior options
#[derive(Debug, clap::Args)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Minimal output (IDs and keys only); suppresses logging except errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, global = true, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

impl Cli {
  /// Validate combinations clap cannot express.
  pub fn validate(&self) -> Result<(), String> {
    match &self.command {
      Command::Page {
        command: PageCommand::Get { id, space, title, .. },
      } => {
        if id.is_none() && (space.is_none() || title.is_none()) {
          return Err("Must provide either --id or both --space and --title".to_string());
        }
      }
      Command::Page {
        command: PageCommand::Update { title, body, .. },
      } => {
        if title.is_none() && body.is_empty() {
          return Err("Must provide --title, --body, or --body-file".to_string());
        }
      }
      _ => {}
    }
    Ok(())
  }
}

/// Parse CLI arguments, initialize logging, and dispatch to the chosen
/// command. Exits the process with the failure's exit code on error.
pub async fn run() {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      let code = parse_error_exit_code(&err);
      let _ = err.print();
      process::exit(code);
    }
  };

  init_tracing(&cli.behavior);

  let colors = ColorScheme::new(cli.behavior.color);

  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(EXIT_INVALID_ARGS);
  }

  if let Err(err) = dispatch(&cli, &colors).await {
    report_error(&err, &colors);
    process::exit(exit_code(&err));
  }
}

async fn dispatch(cli: &Cli, colors: &ColorScheme) -> anyhow::Result<()> {
  match &cli.command {
    Command::Validate => commands::validate::handle_validate_command(cli, colors).await,
    Command::Setup => commands::setup::handle_setup_command(cli, colors),
    Command::Page { command } => commands::page::handle_page_command(command, cli, colors).await,
    Command::Space { command } => commands::space::handle_space_command(command, cli, colors).await,
    Command::Search { command } => commands::search::handle_search_command(command, cli).await,
    Command::Version { short } => {
      commands::version::handle_version_command(cli.output.json, *short, colors);
      Ok(())
    }
    Command::Completions { shell } => {
      commands::completions::handle_completions_command(*shell);
      Ok(())
    }
  }
}

/// Exit code for a command line clap rejected.
///
/// `--help` and `--version` succeed; every other parse failure uses
/// [`EXIT_INVALID_ARGS`] rather than clap's own code 2, which belongs to
/// connection failures here.
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
  match err.kind() {
    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
    _ => EXIT_INVALID_ARGS,
  }
}

/// Exit code for a failed command.
///
/// Library errors carry their own code; anything else is a generic failure.
pub fn exit_code(err: &anyhow::Error) -> i32 {
  err.downcast_ref::<Error>().map_or(1, Error::exit_code)
}

/// Context messages down to the first library error, joined with `: `.
///
/// Library errors already include their cause in their own message.
fn error_message(err: &anyhow::Error) -> String {
  let mut parts = Vec::new();
  for cause in err.chain() {
    parts.push(cause.to_string());
    if cause.is::<Error>() {
      break;
    }
  }
  parts.join(": ")
}

fn report_error(err: &anyhow::Error, colors: &ColorScheme) {
  eprintln!("{} {}", colors.error("✗"), colors.error(error_message(err)));

  match err.downcast_ref::<Error>() {
    Some(Error::ConfigNotFound { .. } | Error::InvalidConfig { .. }) => {
      eprintln!(
        "\n{} Run {} to configure credentials.",
        colors.info("ℹ"),
        colors.code("confluence setup")
      );
    }
    Some(Error::CaptchaRequired(challenge)) => {
      eprintln!("\n{}: {}", colors.emphasis("Login URL"), colors.link(&challenge.login_url));
    }
    _ => {}
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}
