use clap::Parser;
use oda_cli::cli::dispatcher::Dispatcher;
use oda_cli::cli::main_types::Cli;
use oda_cli::storage::config::{CONFIG_FILE_NAME, Config};
use oda_cli::utils::logging::VerboseLogger;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    VerboseLogger::init(cli.verbose);

    let config_path = cli
        .config_dir
        .as_ref()
        .map(|dir| PathBuf::from(dir).join(CONFIG_FILE_NAME));

    if let Some(dir) = &cli.config_dir {
        log::debug!("using config directory: {}", dir);
    }

    let config = match Config::load(config_path.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading config: {}", err);
            std::process::exit(1);
        }
    };

    let mut dispatcher = Dispatcher::new(config, config_path, cli.profile, cli.api_url);

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        log::debug!("command failed ({:?}): {}", e.severity(), e);
        eprintln!("Error: {}", e.display_friendly());
        if let Some(hint) = e.troubleshooting_hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}
