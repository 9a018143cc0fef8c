/// How a fetched page is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plan block plus a results table
    #[default]
    Table,
    /// The raw response body as pretty JSON
    Json,
}

/// Struct to manage display options
#[derive(Debug, Clone, Default)]
pub struct DisplayOptions {
    pub format: OutputFormat,
    /// Disable the use of colors
    pub no_color: bool,
    /// Show the spinner while a request is in flight
    pub show_progress: bool,
}

impl DisplayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Options for the current terminal: `NO_COLOR` and TTY detection.
    pub fn from_env() -> Self {
        let is_tty = is_stdout_tty();
        Self {
            format: OutputFormat::Table,
            no_color: std::env::var("NO_COLOR").is_ok() || !is_tty,
            show_progress: is_tty,
        }
    }

    pub fn use_colors(&self) -> bool {
        !self.no_color
    }
}

pub fn is_stdout_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}
