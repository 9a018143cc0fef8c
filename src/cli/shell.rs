//! Line-based interactive session.
//!
//! Any line that is not a `:command` is a new question. `:more` fetches the
//! next page, replacing the one on screen.

use std::io::{BufRead, Write};
use std::num::NonZeroU32;

use crate::core::panel::PanelAction;
use crate::core::services::{QueryBackend, QueryService};
use crate::display::{LoadingIndicator, TableDisplay};
use crate::error::{AppError, CliError};
use crate::map_display_error;
use crate::utils::validation::validate_limit;

const PROMPT: &str = "oda> ";

const HELP: &str = "\
Type a question and press Enter to run it.
  :more, :m       load the next page
  :limit <n>      rows per page from the next request on
  :help, :h       show this help
  :quit, :q       leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Ask(String),
    More,
    Limit(NonZeroU32),
    Help,
    Quit,
    Empty,
}

pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();

    if line.is_empty() {
        return Ok(ShellCommand::Empty);
    }

    let Some(command) = line.strip_prefix(':') else {
        return Ok(ShellCommand::Ask(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "more" | "m" => Ok(ShellCommand::More),
        "help" | "h" => Ok(ShellCommand::Help),
        "quit" | "q" | "exit" => Ok(ShellCommand::Quit),
        "limit" => {
            let value = parts
                .next()
                .ok_or_else(|| "usage: :limit <n>".to_string())?;
            let limit = value
                .parse::<u32>()
                .map_err(|_| format!("not a number: {}", value))?;
            validate_limit(limit)
                .map(ShellCommand::Limit)
                .map_err(|e| e.display_friendly())
        }
        other => Err(format!("unknown command ':{}' (try :help)", other)),
    }
}

pub struct ShellSession<B> {
    service: QueryService<B>,
    table: TableDisplay,
    show_progress: bool,
}

impl<B: QueryBackend> ShellSession<B> {
    pub fn new(service: QueryService<B>, table: TableDisplay, show_progress: bool) -> Self {
        Self {
            service,
            table,
            show_progress,
        }
    }

    pub fn service(&self) -> &QueryService<B> {
        &self.service
    }

    /// Read commands until `:quit` or end of input.
    pub async fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<(), AppError> {
        map_display_error!(writeln!(out, "{}", HELP), "write help")?;
        self.prompt(out)?;

        for line in input.lines() {
            let line = line.map_err(|e| CliError::Input(e.to_string()))?;

            match parse_line(&line) {
                Ok(command) => {
                    if !self.execute(command, out).await? {
                        return Ok(());
                    }
                }
                Err(message) => {
                    map_display_error!(writeln!(out, "{}", message), "write message")?;
                }
            }

            self.prompt(out)?;
        }

        map_display_error!(writeln!(out), "write newline")?;
        Ok(())
    }

    /// Run one command. Returns `false` when the session should end.
    pub async fn execute<W: Write>(
        &mut self,
        command: ShellCommand,
        out: &mut W,
    ) -> Result<bool, AppError> {
        match command {
            ShellCommand::Empty => {}
            ShellCommand::Quit => return Ok(false),
            ShellCommand::Help => {
                map_display_error!(writeln!(out, "{}", HELP), "write help")?;
            }
            ShellCommand::Limit(limit) => {
                self.service.dispatch(PanelAction::SetLimit(limit)).await;
                map_display_error!(
                    writeln!(out, "Rows per page: {}", limit),
                    "write message"
                )?;
            }
            ShellCommand::Ask(question) => {
                let indicator = LoadingIndicator::start(self.show_progress, "Querying...");
                self.service.submit(question).await;
                drop(indicator);
                self.render(out)?;
            }
            ShellCommand::More => {
                if !self.service.panel().can_load_more() {
                    map_display_error!(writeln!(out, "No more pages."), "write message")?;
                    return Ok(true);
                }
                let indicator = LoadingIndicator::start(self.show_progress, "Loading more...");
                let outcome = self.service.load_more().await;
                drop(indicator);
                log::debug!("load more finished: {:?}", outcome);
                self.render(out)?;
            }
        }

        Ok(true)
    }

    fn render<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        let panel = self.service.panel();
        let rendered = self.table.render_panel(panel)?;

        if rendered.is_empty() {
            map_display_error!(writeln!(out, "No results."), "write results")?;
        } else {
            map_display_error!(writeln!(out, "{}", rendered), "write results")?;
        }

        if panel.can_load_more() {
            map_display_error!(
                writeln!(out, "Type :more for the next page."),
                "write hint"
            )?;
        }

        Ok(())
    }

    fn prompt<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        map_display_error!(write!(out, "{}", PROMPT), "write prompt")?;
        map_display_error!(out.flush(), "flush prompt")?;
        Ok(())
    }
}
