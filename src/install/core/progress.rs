//! Installation progress reporting

use std::fmt;

/// Progress notification emitted by the install collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Percentage complete, 0 to 100
    pub progress: u8,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(progress: u8, message: impl Into<String>) -> Self {
        Self {
            progress: progress.min(100),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Installing {}/100: {}", self.progress, self.message)
    }
}

/// Synchronous receiver of progress events
///
/// Invoked from inside the install call on the only thread of execution, so
/// implementations must return promptly.
pub trait ProgressSink {
    fn on_progress(&mut self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent),
{
    fn on_progress(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink writing every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_progress(&mut self, event: &ProgressEvent) {
        log::info!("{event}");
    }
}
