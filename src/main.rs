// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays machine-readable
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Some(Commands::Check {
            image,
            partitions,
            inspector,
            catalog,
            output,
        }) => commands::cmd_check(&image, &partitions, &inspector, catalog.as_deref(), output),
        Some(Commands::Inspect {
            image,
            inspector,
            output,
        }) => commands::cmd_inspect(&image, &inspector, output),
        Some(Commands::Features { partitions, output }) => {
            commands::cmd_features(&partitions, output)
        }
        Some(Commands::Catalog { catalog, output }) => {
            commands::cmd_catalog(catalog.as_deref(), output)
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "cloudfit", &mut std::io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("cloudfit v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'cloudfit --help' for usage information");
            Ok(())
        }
    }
}
