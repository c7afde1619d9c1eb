//! Command-line interface for wingman.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **score**: Score the compatibility of two goal bios
//! - **taxonomy**: Inspect the goal-category keyword taxonomy
//! - **serve**: Start the HTTP API server
//!
//! ## Usage
//!
//! ```text
//! # Score two bios against each other
//! wingman score "run a marathon this year" "train for a 10k, eat healthy"
//!
//! # JSON output for scripting
//! wingman score "learn rust" "ship a side project" --format json
//!
//! # Deterministic scoring (no jitter, fixed neutral score)
//! wingman score "learn rust" "ship a side project" --seed 42
//!
//! # List the scoring categories
//! wingman taxonomy
//!
//! # Start the API server
//! wingman serve --port 8080
//! ```

use clap::{Parser, Subcommand};

pub mod score;
pub mod taxonomy;

#[derive(Parser)]
#[command(name = "wingman")]
#[command(version)]
#[command(about = "Match accountability partners by weekly-goal compatibility")]
#[command(
    long_about = "wingman pairs people who hold each other accountable for weekly goals.\n\nIt scores how compatible two goal bios are, ranks the best available partners for a user, and manages the full partnership lifecycle: requests, accept/reject, unmatch, and email invitations for people who have not registered yet."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score the compatibility of two goal bios
    Score(score::ScoreArgs),

    /// Inspect the goal-category keyword taxonomy
    Taxonomy(taxonomy::TaxonomyArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    /// Base URL used when building invitation registration links
    #[arg(long, default_value = "http://localhost:3000")]
    pub frontend_url: String,

    /// HTTP endpoint invitation emails are posted to; logs the link when unset
    #[arg(long)]
    pub email_endpoint: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
