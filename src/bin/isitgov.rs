#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::{Parser, Subcommand};
use isitgov::lens::utils::OutputFormat;
use isitgov::IsitgovConfig;
use tracing::Level;

mod commands;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.isitgov/isitgov.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// registry source (URL or file path), overrides the configured source_url
    #[clap(long, global = true)]
    source: Option<String>,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    /// Output format for lookup results
    #[clap(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve lookups over HTTP, refreshing the registry periodically
    Serve(commands::serve::ServeArgs),

    /// Look up one or more domains in the current registry
    Lookup(commands::lookup::LookupArgs),

    /// List registrations matching filters
    List(commands::list::ListArgs),

    /// Show the effective configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut config = match IsitgovConfig::new(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(source) = cli.source {
        config.source_url = source;
    }

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(&config, args),
        Commands::Lookup(args) => commands::lookup::run(&config, args, cli.format),
        Commands::List(args) => commands::list::run(&config, args, cli.format),
        Commands::Config => commands::config::run(&config, cli.format),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
