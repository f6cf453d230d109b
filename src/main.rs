mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use statement_finder::config;
use statement_finder::errors::FinderError;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
    }
    tracing::debug!(build = %build_info(), "statement-finder starting");

    let result = match cli.command {
        cli::Commands::Find(args) => cli::find::handle_find(args, cli.quiet).await,
        cli::Commands::Validate(args) => handle_validate(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let exit_code = match &e {
            FinderError::Config(_) | FinderError::Yaml(_) => 2,
            FinderError::BaseDirectory { .. } => 3,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), FinderError> {
    let config = config::parse_config(&args.config).await?;
    println!("statement-finder {}", build_info());
    println!("Configuration is valid: {}", args.config.display());
    println!("  base_directory:   {}", config.base_directory.display());
    println!("  output_directory: {}", config.output_directory.display());
    println!("  log_file:         {}", config.log_file.display());
    match config.workers {
        Some(n) => println!("  workers:          {}", n),
        None => println!("  workers:          auto"),
    }
    Ok(())
}

fn build_info() -> String {
    format!(
        "{} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_HASH").unwrap_or("unknown"),
        env!("BUILD_TIMESTAMP"),
    )
}
