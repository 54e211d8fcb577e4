//! confluence - work with Confluence pages, spaces, and search
//!
//! This is the main entry point for the CLI application.

#[tokio::main(flavor = "current_thread")]
async fn main() {
  confluence_cli::cli::run().await;
}
