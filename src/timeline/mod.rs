//! Timeline position shared by the continuous animator and the capture
//! pipeline.
//!
//! The position lives in a single slot guarded by a mode flag. In
//! [`TimelineMode::FreeRunning`] only [`Timeline::tick`] moves it; once an
//! [`ExportLease`] is taken the slot is export-controlled and only the lease
//! can write it. Dropping the lease hands control back to the animator.

mod animator;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use animator::ContinuousAnimator;

use crate::compute::wrap_degrees;

/// Who currently owns writes to the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineMode {
    FreeRunning,
    ExportControlled,
}

#[derive(Debug)]
struct TimelineState {
    position: f64,
    mode: TimelineMode,
    ticks: u64,
}

/// Single-owner timeline slot.
#[derive(Debug)]
pub struct Timeline {
    state: Mutex<TimelineState>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TimelineState {
                position: 0.0,
                mode: TimelineMode::FreeRunning,
                ticks: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current position in degrees, always within `[0, 360)`.
    pub fn position(&self) -> f64 {
        self.lock().position
    }

    pub fn mode(&self) -> TimelineMode {
        self.lock().mode
    }

    /// Number of animator ticks applied so far.
    pub fn ticks(&self) -> u64 {
        self.lock().ticks
    }

    /// Advance one degree. Ignored while export-controlled.
    ///
    /// Returns whether the tick was applied.
    pub fn tick(&self) -> bool {
        let mut state = self.lock();
        if state.mode != TimelineMode::FreeRunning {
            return false;
        }
        state.position = wrap_degrees(state.position + 1.0);
        state.ticks += 1;
        true
    }

    /// Take exclusive write control for an export.
    pub fn acquire_export(&self) -> Result<ExportLease<'_>, TimelineError> {
        let mut state = self.lock();
        if state.mode == TimelineMode::ExportControlled {
            return Err(TimelineError::AlreadyControlled);
        }
        state.mode = TimelineMode::ExportControlled;
        Ok(ExportLease { timeline: self })
    }
}

/// Exclusive write access to a [`Timeline`] during an export.
#[derive(Debug)]
pub struct ExportLease<'a> {
    timeline: &'a Timeline,
}

impl ExportLease<'_> {
    /// Set an exact position. Values wrap into `[0, 360)`.
    pub fn set(&self, position: f64) {
        self.timeline.lock().position = wrap_degrees(position);
    }

    pub fn position(&self) -> f64 {
        self.timeline.position()
    }
}

impl Drop for ExportLease<'_> {
    fn drop(&mut self) {
        self.timeline.lock().mode = TimelineMode::FreeRunning;
    }
}

/// Timeline ownership errors.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Timeline is already under export control")]
    AlreadyControlled,
}
