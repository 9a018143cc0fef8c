//! Loading indicator shown while a query is in flight

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const SPINNER_UPDATE_INTERVAL_MS: u64 = 100;
const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Terminal columns taken by one spinner frame: glyph, space, message.
fn line_width(message: &str) -> usize {
    message.width() + 2
}

/// Spinner drawn on stderr from a background thread
pub struct ProgressSpinner {
    message: String,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ProgressSpinner {
    pub fn new(message: String) -> Self {
        Self {
            message,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        self.running.store(true, Ordering::Relaxed);
        let running = Arc::clone(&self.running);
        let message = self.message.clone();

        let handle = thread::spawn(move || {
            let mut index = 0;

            while running.load(Ordering::Relaxed) {
                eprint!("\r{} {}", SPINNER_CHARS[index], message);
                let _ = io::stderr().flush();

                index = (index + 1) % SPINNER_CHARS.len();
                thread::sleep(Duration::from_millis(SPINNER_UPDATE_INTERVAL_MS));
            }

            eprint!("\r{:<width$}\r", "", width = line_width(&message));
            let _ = io::stderr().flush();
        });

        self.handle = Some(handle);
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs a spinner for as long as the returned guard lives. Disabled guards draw nothing.
pub struct LoadingIndicator {
    spinner: Option<ProgressSpinner>,
}

impl LoadingIndicator {
    pub fn start(enabled: bool, message: &str) -> Self {
        let spinner = enabled.then(|| {
            let mut spinner = ProgressSpinner::new(message.to_string());
            spinner.start();
            spinner
        });
        Self { spinner }
    }

    pub fn is_active(&self) -> bool {
        self.spinner.as_ref().is_some_and(ProgressSpinner::is_running)
    }
}
