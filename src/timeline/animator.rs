//! Continuous animator - advances the timeline once per display refresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use super::Timeline;

/// Free-running tick loop on a dedicated thread.
///
/// Stopping (or dropping) the animator wakes the thread and joins it, so
/// no tick can land after [`ContinuousAnimator::stop`] returns.
pub struct ContinuousAnimator {
    stopped: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ContinuousAnimator {
    /// Start ticking `timeline` every `interval`.
    pub fn start(timeline: Arc<Timeline>, interval: Duration) -> std::io::Result<Self> {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);

        let handle = thread::Builder::new()
            .name("scene-animator".to_string())
            .spawn(move || {
                debug!("Animator started ({:?} per tick)", interval);
                loop {
                    thread::park_timeout(interval);
                    if flag.load(Ordering::Acquire) {
                        break;
                    }
                    timeline.tick();
                }
                debug!("Animator stopped after {} ticks", timeline.ticks());
            })?;

        Ok(Self {
            stopped,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.stopped.load(Ordering::Acquire)
    }

    /// Cancel the tick loop and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("Animator thread panicked");
            }
        }
    }
}

impl Drop for ContinuousAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}
