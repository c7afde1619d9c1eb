use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod email;
mod matching;
mod partnership;
mod utils;
mod web;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("wingman=debug,info")
    } else {
        EnvFilter::new("wingman=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Score(args) => {
            cli::score::run(&args, cli.format, cli.verbose)?;
        }
        cli::Commands::Taxonomy(args) => {
            cli::taxonomy::run(&args, cli.format)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args)?;
        }
    }

    Ok(())
}
