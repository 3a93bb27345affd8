use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Where the pipeline is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Receives human-readable status text at each pipeline step boundary.
pub trait StatusListener: Send + Sync {
    fn on_status(&self, status: PipelineStatus, message: &str);
}

/// Logs status changes and nothing else.
pub struct LogListener;

impl StatusListener for LogListener {
    fn on_status(&self, status: PipelineStatus, message: &str) {
        info!("[{}] {}", status, message);
    }
}

/// Terminal spinner showing the current step.
pub struct SpinnerListener {
    spinner: ProgressBar,
}

impl SpinnerListener {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { spinner }
    }
}

impl Default for SpinnerListener {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusListener for SpinnerListener {
    fn on_status(&self, status: PipelineStatus, message: &str) {
        info!("[{}] {}", status, message);
        match status {
            PipelineStatus::Processing => {
                self.spinner.enable_steady_tick(Duration::from_millis(100));
                self.spinner.set_message(message.to_string());
            }
            PipelineStatus::Success => self.spinner.finish_with_message(message.to_string()),
            PipelineStatus::Error => self.spinner.abandon_with_message(message.to_string()),
            PipelineStatus::Idle => self.spinner.set_message(message.to_string()),
        }
    }
}
