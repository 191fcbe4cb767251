//! Glean CLI - Pull structured facts out of contract documents with a local LLM.

use anyhow::Context;
use clap::Parser;
use glean_cli::commands;
use glean_cli::repl;
use glean_cli::{load_document, Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config from the given path or ~/.glean/config.toml
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    let file_config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(file_config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && file_config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    // Flags and environment override the file
    let mut config = file_config.clone();
    if let Some(url) = cli.ollama_url {
        config.llm.base_url = url;
    }
    if let Some(model) = cli.model {
        config.llm.model = model;
    }

    match cli.command {
        Command::Config(args) => {
            let mut file_config = file_config;
            commands::execute_config(args, &mut file_config, &config_path, &formatter).await?;
        }
        Command::Process(args) => {
            config.validate()?;
            commands::execute_process(args, &config, &formatter).await?;
        }
        Command::Extract(args) => {
            config.validate()?;
            commands::execute_extract(args, &config, &formatter).await?;
        }
        Command::Ask(args) => {
            config.validate()?;
            commands::execute_ask(args, &config, &formatter).await?;
        }
        Command::Chunks(args) => {
            commands::execute_chunks(args, &config, &formatter).await?;
        }
        Command::Chat(args) => {
            config.validate()?;
            let loaded = load_document(&args.input)?;
            let (service, id) =
                commands::open_document(config.provider(), &config.service_config(), &loaded).await?;
            repl::run_chat(&service, &id, config.settings.history_size, &formatter).await?;
        }
    }

    Ok(())
}

/// Log to stderr; `GLEAN_LOG` sets the filter, `--verbose` forces debug.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("GLEAN_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
