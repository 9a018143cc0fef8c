use std::io;
use std::path::PathBuf;

use crate::api::client::QueryClient;
use crate::cli::command_handlers::{ConfigHandler, QueryHandler, QueryOptions, ShellHandler};
use crate::cli::main_types::Commands;
use crate::core::services::{ConfigService, EffectiveSettings};
use crate::display::DisplayOptions;
use crate::error::AppError;
use crate::storage::config::Config;
use crate::utils::validation::validate_limit;

pub struct Dispatcher {
    config_service: ConfigService,
    config_path: Option<PathBuf>,
    profile_name: String,
    api_url: Option<String>,
}

impl Dispatcher {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        profile: Option<String>,
        api_url: Option<String>,
    ) -> Self {
        let profile_name = config.resolve_profile_name(profile.as_deref());
        log::debug!("using profile: {}", profile_name);

        Self {
            config_service: ConfigService::new(config),
            config_path,
            profile_name,
            api_url,
        }
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub async fn dispatch(&mut self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Query {
                question,
                limit,
                offset,
                pages,
                format,
            } => {
                let settings = self.settings()?;
                let limit = match limit {
                    Some(limit) => validate_limit(limit)?,
                    None => settings.default_limit,
                };
                let client = self.client(&settings)?;
                let display = DisplayOptions::from_env().with_format(format);
                let options = QueryOptions {
                    question,
                    limit,
                    offset,
                    pages,
                };

                QueryHandler::new()
                    .handle(client, options, &display, &mut io::stdout().lock())
                    .await
            }
            Commands::Shell { limit } => {
                let settings = self.settings()?;
                let limit = match limit {
                    Some(limit) => validate_limit(limit)?,
                    None => settings.default_limit,
                };
                let client = self.client(&settings)?;
                let display = DisplayOptions::from_env();

                ShellHandler::new()
                    .handle(
                        client,
                        limit,
                        &display,
                        io::stdin().lock(),
                        &mut io::stdout().lock(),
                    )
                    .await
            }
            Commands::Config { command } => ConfigHandler::new().handle(
                command,
                &mut self.config_service,
                &self.profile_name,
                self.api_url.as_deref(),
                self.config_path.clone(),
                &mut io::stdout().lock(),
            ),
        }
    }

    fn settings(&self) -> Result<EffectiveSettings, AppError> {
        let settings = self
            .config_service
            .effective_settings(&self.profile_name, self.api_url.as_deref())?;
        log::debug!(
            "api_url={} default_limit={} timeout={}s",
            settings.api_url,
            settings.default_limit,
            settings.timeout_seconds
        );
        Ok(settings)
    }

    fn client(&self, settings: &EffectiveSettings) -> Result<QueryClient, AppError> {
        QueryClient::with_timeout(settings.api_url.clone(), settings.timeout_seconds)
            .map_err(AppError::from)
    }
}
