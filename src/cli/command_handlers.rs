use std::io::{BufRead, Write};
use std::num::NonZeroU32;

use crate::cli::main_types::ConfigCommands;
use crate::cli::shell::ShellSession;
use crate::core::panel::{PanelAction, PanelState};
use crate::core::services::{ConfigService, FetchOutcome, QueryBackend, QueryService};
use crate::display::{DisplayOptions, LoadingIndicator, OutputFormat, TableDisplay};
use crate::error::{AppError, CliError, DisplayError, FALLBACK_ERROR_MESSAGE};
use crate::map_display_error;

/// Arguments of a one-shot `query` run, already validated.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub question: String,
    pub limit: NonZeroU32,
    pub offset: u64,
    pub pages: u32,
}

#[derive(Default)]
pub struct QueryHandler;

impl QueryHandler {
    pub fn new() -> Self {
        Self
    }

    /// Fetch the first page, then follow `next_offset` until `pages` pages were
    /// printed or the server reports no further page.
    pub async fn handle<B: QueryBackend, W: Write>(
        &self,
        backend: B,
        options: QueryOptions,
        display: &DisplayOptions,
        out: &mut W,
    ) -> Result<(), AppError> {
        if options.question.trim().is_empty() {
            return Err(CliError::InvalidArguments("question cannot be empty".to_string()).into());
        }
        if options.pages == 0 {
            return Err(
                CliError::InvalidArguments("pages must be a positive integer".to_string()).into(),
            );
        }

        log::debug!(
            "query: {:?} (limit {}, offset {}, pages {})",
            options.question,
            options.limit,
            options.offset,
            options.pages
        );

        let panel = PanelState::with_input(options.question, options.limit);
        let mut service = QueryService::new(backend, panel);
        let table = TableDisplay::new().with_colors(display.use_colors());

        let first = if options.offset == 0 {
            PanelAction::Submit
        } else {
            PanelAction::RequestStarted {
                offset: options.offset,
            }
        };

        let mut outcome = {
            let _indicator = LoadingIndicator::start(display.show_progress, "Querying...");
            service.dispatch(first).await
        };

        for page in 1..=options.pages {
            if outcome != Some(FetchOutcome::Loaded) {
                if let Some(api_error) = service.take_last_error() {
                    return Err(api_error.into());
                }
                let message = service
                    .panel()
                    .error()
                    .unwrap_or(FALLBACK_ERROR_MESSAGE)
                    .to_string();
                return Err(CliError::QueryFailed(message).into());
            }

            self.print_page(service.panel(), &table, display.format, out)?;

            if page == options.pages {
                break;
            }
            if !service.panel().can_load_more() {
                log::debug!("no next_offset after page {}; stopping", page);
                break;
            }

            let _indicator = LoadingIndicator::start(display.show_progress, "Loading more...");
            outcome = service.load_more().await;
        }

        Ok(())
    }

    fn print_page<W: Write>(
        &self,
        panel: &PanelState,
        table: &TableDisplay,
        format: OutputFormat,
        out: &mut W,
    ) -> Result<(), AppError> {
        let text = match format {
            OutputFormat::Json => serde_json::to_string_pretty(&panel.page())
                .map_err(|e| DisplayError::TableFormat(e.to_string()))?,
            OutputFormat::Table => {
                let rendered = table.render_panel(panel)?;
                if panel.results().is_empty() {
                    if rendered.is_empty() {
                        "No results.".to_string()
                    } else {
                        format!("{}\nNo results.", rendered)
                    }
                } else {
                    rendered
                }
            }
        };

        map_display_error!(writeln!(out, "{}", text), "write page")?;
        Ok(())
    }
}

#[derive(Default)]
pub struct ShellHandler;

impl ShellHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle<B: QueryBackend, R: BufRead, W: Write>(
        &self,
        backend: B,
        limit: NonZeroU32,
        display: &DisplayOptions,
        input: R,
        out: &mut W,
    ) -> Result<(), AppError> {
        let service = QueryService::new(backend, PanelState::with_input("", limit));
        let table = TableDisplay::new().with_colors(display.use_colors());
        let mut session = ShellSession::new(service, table, display.show_progress);
        session.run(input, out).await
    }
}

#[derive(Default)]
pub struct ConfigHandler;

impl ConfigHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle<W: Write>(
        &self,
        command: ConfigCommands,
        config_service: &mut ConfigService,
        profile: &str,
        api_url_override: Option<&str>,
        config_path: Option<std::path::PathBuf>,
        out: &mut W,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                log::debug!("showing configuration for profile '{}'", profile);
                let settings = config_service.effective_settings(profile, api_url_override)?;

                let mut lines = vec![
                    "Current Configuration:".to_string(),
                    "=====================".to_string(),
                    format!(
                        "Default Profile: {}",
                        config_service
                            .config()
                            .default_profile
                            .as_deref()
                            .unwrap_or("(none)")
                    ),
                    format!("Active Profile: {}", profile),
                    format!("  api_url: {}", settings.api_url),
                    format!("  default_limit: {}", settings.default_limit),
                    format!("  timeout_seconds: {}", settings.timeout_seconds),
                    String::new(),
                    "Profiles:".to_string(),
                ];

                let profiles = config_service.list_profiles();
                if profiles.is_empty() {
                    lines.push("  No profiles configured".to_string());
                }
                for (name, stored) in profiles {
                    lines.push(format!("  [{}]", name));
                    if let Some(url) = &stored.api_url {
                        lines.push(format!("    api_url: {}", url));
                    }
                    if let Some(limit) = stored.default_limit {
                        lines.push(format!("    default_limit: {}", limit));
                    }
                    if let Some(secs) = stored.timeout_seconds {
                        lines.push(format!("    timeout_seconds: {}", secs));
                    }
                }

                map_display_error!(writeln!(out, "{}", lines.join("\n")), "write config")?;
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                log::debug!("setting {} = {} on profile '{}'", key, value, profile);
                config_service.set_profile_field(profile, &key, &value)?;
                config_service.save_config(config_path)?;

                map_display_error!(
                    writeln!(out, "Set {} = {} on profile '{}'", key, value, profile),
                    "write confirmation"
                )?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{QueryRequest, QueryResponse};
    use crate::error::ApiError;
    use crate::storage::config::Config;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<QueryResponse, ApiError>>>,
        seen: Mutex<Vec<QueryRequest>>,
    }

    impl ScriptedBackend {
        fn with(replies: Vec<Result<QueryResponse, ApiError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn offsets(&self) -> Vec<u64> {
            self.seen.lock().unwrap().iter().map(|r| r.offset).collect()
        }
    }

    #[async_trait]
    impl QueryBackend for ScriptedBackend {
        async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }
    }

    fn page(value: serde_json::Value) -> Result<QueryResponse, ApiError> {
        Ok(serde_json::from_value(value).unwrap())
    }

    fn options(question: &str, offset: u64, pages: u32) -> QueryOptions {
        QueryOptions {
            question: question.to_string(),
            limit: NonZeroU32::new(2).unwrap(),
            offset,
            pages,
        }
    }

    fn plain(format: OutputFormat) -> DisplayOptions {
        DisplayOptions::new()
            .with_format(format)
            .with_no_color(true)
            .with_progress(false)
    }

    #[tokio::test]
    async fn test_query_follows_pages_until_exhausted() {
        let backend = ScriptedBackend::with(vec![
            page(json!({"results": [{"id": 1}, {"id": 2}], "pagination": {"next_offset": 2}})),
            page(json!({"results": [{"id": 3}], "pagination": {"next_offset": null}})),
        ]);

        let mut out = Vec::new();
        QueryHandler::new()
            .handle(
                Arc::clone(&backend),
                options("list", 0, 5),
                &plain(OutputFormat::Table),
                &mut out,
            )
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Rows 1-2 (offset 0) | Load more: next offset 2"));
        assert!(out.contains("Rows 3-3 (offset 2)"));
        assert_eq!(backend.offsets(), vec![0, 2]);
    }

    #[tokio::test]
    async fn test_query_starts_at_requested_offset() {
        let backend = ScriptedBackend::with(vec![page(
            json!({"results": [{"id": 9}], "pagination": {"next_offset": 10}}),
        )]);

        let mut out = Vec::new();
        QueryHandler::new()
            .handle(
                Arc::clone(&backend),
                options("list", 8, 1),
                &plain(OutputFormat::Json),
                &mut out,
            )
            .await
            .unwrap();

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["results"], json!([{"id": 9}]));
        assert_eq!(printed["pagination"]["next_offset"], json!(10));
        assert_eq!(backend.offsets(), vec![8]);
    }

    #[tokio::test]
    async fn test_query_failure_carries_server_detail() {
        let backend = ScriptedBackend::with(vec![Err(ApiError::Http {
            status: 400,
            endpoint: "/query".to_string(),
            message: "Missing 'question' in request body".to_string(),
        })]);

        let mut out = Vec::new();
        let err = QueryHandler::new()
            .handle(backend, options("x", 0, 1), &plain(OutputFormat::Table), &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.display_friendly(), "Missing 'question' in request body");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_query_transport_failure_offers_hint() {
        let backend = ScriptedBackend::with(vec![Err(ApiError::Transport {
            endpoint: "/query".to_string(),
            message: "connection refused".to_string(),
        })]);

        let mut out = Vec::new();
        let err = QueryHandler::new()
            .handle(backend, options("x", 0, 1), &plain(OutputFormat::Table), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Api(ApiError::Transport { .. })));
        assert!(
            err.troubleshooting_hint()
                .is_some_and(|hint| hint.starts_with("Check that the query service"))
        );
    }

    #[tokio::test]
    async fn test_query_rejects_blank_question_and_zero_pages() {
        let backend = ScriptedBackend::with(Vec::new());
        let handler = QueryHandler::new();
        let display = plain(OutputFormat::Table);
        let mut out = Vec::new();

        let err = handler
            .handle(Arc::clone(&backend), options("  ", 0, 1), &display, &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cli(CliError::InvalidArguments(_))));

        let err = handler
            .handle(Arc::clone(&backend), options("list", 0, 0), &display, &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cli(CliError::InvalidArguments(_))));
        assert!(backend.offsets().is_empty());
    }

    #[tokio::test]
    async fn test_query_empty_page_prints_plan_and_notice() {
        let backend = ScriptedBackend::with(vec![page(
            json!({"plan": {"op": "count"}, "results": [], "pagination": null}),
        )]);

        let mut out = Vec::new();
        QueryHandler::new()
            .handle(backend, options("count", 0, 1), &plain(OutputFormat::Table), &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Plan:"));
        assert!(out.contains("\"op\": \"count\""));
        assert!(out.contains("No results."));
        assert!(!out.contains("Rows"));
    }

    #[tokio::test]
    async fn test_shell_handler_runs_session() {
        let backend = ScriptedBackend::with(vec![page(
            json!({"results": [{"id": 1}], "pagination": {"next_offset": null}}),
        )]);

        let mut out = Vec::new();
        ShellHandler::new()
            .handle(
                Arc::clone(&backend),
                NonZeroU32::new(3).unwrap(),
                &plain(OutputFormat::Table),
                "list\n:q\n".as_bytes(),
                &mut out,
            )
            .await
            .unwrap();

        assert_eq!(backend.seen.lock().unwrap()[0].limit, 3);
    }

    #[test]
    fn test_config_set_then_show() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut service = ConfigService::new(Config::default());
        let handler = ConfigHandler::new();

        let mut out = Vec::new();
        handler
            .handle(
                ConfigCommands::Set {
                    key: "default_limit".to_string(),
                    value: "10".to_string(),
                },
                &mut service,
                "default",
                None,
                Some(path.clone()),
                &mut out,
            )
            .unwrap();
        assert!(path.exists());

        let mut reloaded = ConfigService::new(Config::load(Some(path)).unwrap());
        let mut out = Vec::new();
        handler
            .handle(
                ConfigCommands::Show,
                &mut reloaded,
                "default",
                Some("http://override.test"),
                None,
                &mut out,
            )
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Default Profile: default"));
        assert!(out.contains("api_url: http://override.test"));
        assert!(out.contains("default_limit: 10"));
    }

    #[test]
    fn test_config_set_unknown_key() {
        let mut service = ConfigService::new(Config::default());
        let mut out = Vec::new();
        let err = ConfigHandler::new()
            .handle(
                ConfigCommands::Set {
                    key: "colour".to_string(),
                    value: "blue".to_string(),
                },
                &mut service,
                "default",
                None,
                None,
                &mut out,
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
