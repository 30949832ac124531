//! Activity log and busy/progress state surfaced to the user.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::info;

/// One immutable, timestamped log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.at.format("%H:%M:%S"), self.message)
    }
}

#[derive(Debug, Default)]
struct StatusState {
    busy: bool,
    progress: u8,
    entries: Vec<LogEntry>,
}

/// Point-in-time copy of the reporter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub busy: bool,
    /// Encoding progress percentage, 0-100.
    pub progress: u8,
    pub entries: Vec<LogEntry>,
}

impl StatusSnapshot {
    /// Label of the export control.
    pub fn button_label(&self) -> String {
        match (self.busy, self.progress) {
            (false, _) => "Record GIF (3s)".to_string(),
            (true, 0) => "Recording... ".to_string(),
            (true, pct) => format!("Recording... {pct}%"),
        }
    }

    /// Lines of the log panel, in insertion order.
    pub fn panel_lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

/// Shared status reporter.
///
/// Cloning is cheap; every clone observes the same state. The log only
/// grows, except for the reset performed when a new session begins.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    state: Arc<Mutex<StatusState>>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StatusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin a capture session.
    ///
    /// Returns `None` when a session is already active. Otherwise clears
    /// the log, resets progress, and marks the reporter busy until the
    /// returned guard is dropped.
    pub fn begin_session(&self) -> Option<SessionGuard> {
        let mut state = self.lock();
        if state.busy {
            return None;
        }
        state.busy = true;
        state.progress = 0;
        state.entries.clear();
        Some(SessionGuard {
            reporter: self.clone(),
        })
    }

    /// Append an entry to the log.
    pub fn append(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.lock().entries.push(LogEntry {
            at: Utc::now(),
            message,
        });
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn progress(&self) -> u8 {
        self.lock().progress
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let state = self.lock();
        StatusSnapshot {
            busy: state.busy,
            progress: state.progress,
            entries: state.entries.clone(),
        }
    }

    fn set_progress(&self, percent: u8) {
        let mut state = self.lock();
        state.progress = state.progress.max(percent.min(100));
    }

    fn end_session(&self) {
        let mut state = self.lock();
        state.busy = false;
        state.progress = 0;
    }
}

/// Convert an encoder fraction to a whole percentage.
pub fn percent_of(fraction: f32) -> u8 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Marks an active session; dropping it clears busy and progress.
#[derive(Debug)]
pub struct SessionGuard {
    reporter: StatusReporter,
}

impl SessionGuard {
    pub fn log(&self, message: impl Into<String>) {
        self.reporter.append(message);
    }

    /// Record encoder progress. Progress never moves backwards within a
    /// session.
    pub fn report_progress(&self, fraction: f32) -> u8 {
        let percent = percent_of(fraction);
        self.reporter.set_progress(percent);
        percent
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.reporter.end_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_resets_log() {
        let reporter = StatusReporter::new();
        reporter.append("left over");

        let session = reporter.begin_session().unwrap();
        assert!(reporter.snapshot().entries.is_empty());
        session.log("Starting recording...");
        assert!(reporter.is_busy());
        drop(session);

        let snapshot = reporter.snapshot();
        assert!(!snapshot.busy);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].message, "Starting recording...");
    }

    #[test]
    fn test_only_one_session() {
        let reporter = StatusReporter::new();
        let session = reporter.begin_session().unwrap();
        session.log("first");
        assert!(reporter.begin_session().is_none());
        // Rejected attempt must not have cleared the log.
        assert_eq!(reporter.snapshot().entries.len(), 1);
        drop(session);
        assert!(reporter.begin_session().is_some());
    }

    #[test]
    fn test_progress_rounds_and_never_decreases() {
        let reporter = StatusReporter::new();
        let session = reporter.begin_session().unwrap();
        assert_eq!(session.report_progress(0.124), 12);
        assert_eq!(session.report_progress(0.5), 50);
        session.report_progress(0.3);
        assert_eq!(reporter.progress(), 50);
        drop(session);
        assert_eq!(reporter.progress(), 0);
    }

    #[test]
    fn test_entries_ordered_by_time() {
        let reporter = StatusReporter::new();
        for i in 0..20 {
            reporter.append(format!("entry {i}"));
        }
        let entries = reporter.snapshot().entries;
        assert!(entries.windows(2).all(|w| w[0].at <= w[1].at));
        assert_eq!(entries[7].message, "entry 7");
    }

    #[test]
    fn test_button_label_and_panel() {
        let reporter = StatusReporter::new();
        assert_eq!(reporter.snapshot().button_label(), "Record GIF (3s)");

        let session = reporter.begin_session().unwrap();
        assert_eq!(reporter.snapshot().button_label(), "Recording... ");
        session.report_progress(0.42);
        assert_eq!(reporter.snapshot().button_label(), "Recording... 42%");

        session.log("Export complete");
        let line = &reporter.snapshot().panel_lines()[0];
        assert!(line.ends_with(" - Export complete"));
        assert_eq!(line.len(), "HH:MM:SS - Export complete".len());
    }
}
