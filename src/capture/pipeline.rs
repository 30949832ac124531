//! Capture pipeline - drives one export from first snapshot to download.
//!
//! Timing is best-effort: after each position change the pipeline waits a
//! fixed delay before the next snapshot instead of waiting on a render
//! acknowledgment. Both delays come from [`ExportConfig`].

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::download::DownloadSink;
use super::status::{SessionGuard, StatusReporter};
use super::target::{CaptureTarget, SnapshotError, Snapshotter};
use crate::animation::{EncodeError, EncodedGif, EncoderSettings, FrameOptions, GifRecorder};
use crate::schema::{ConfigError, ExportConfig};
use crate::timeline::TimelineError;

/// Cooperative cancellation flag for an export.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn check(&self) -> Result<(), CaptureError> {
        if self.is_cancelled() {
            Err(CaptureError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Outcome of a completed export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Where the download sink stored the GIF.
    pub path: PathBuf,
    pub gif: EncodedGif,
    /// Timeline position at each snapshot, in capture order.
    pub positions: Vec<f64>,
    pub elapsed: Duration,
}

/// Orchestrates capture sessions against one mounted target.
pub struct CapturePipeline {
    config: ExportConfig,
    target: Weak<dyn CaptureTarget>,
    status: StatusReporter,
}

impl CapturePipeline {
    /// Attach a pipeline to `target`.
    ///
    /// Only a weak reference is kept; once the target is dropped every
    /// export is a no-op.
    pub fn new<T: CaptureTarget + 'static>(
        target: &Arc<T>,
        config: ExportConfig,
        status: StatusReporter,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let target: Weak<T> = Arc::downgrade(target);
        Ok(Self {
            config,
            target,
            status,
        })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// Capture one full cycle, encode it, and deliver the GIF.
    ///
    /// Returns `Ok(None)` without side effects when the target is no
    /// longer mounted or another session is already running. Failures and
    /// cancellation end the session with an `Export failed` log entry and
    /// leave the reporter idle.
    pub fn run_export(
        &self,
        snapshotter: &mut dyn Snapshotter,
        sink: &mut dyn DownloadSink,
        cancel: &CancelToken,
    ) -> Result<Option<ExportReport>, CaptureError> {
        let Some(target) = self.target.upgrade() else {
            debug!("Capture target unmounted, skipping export");
            return Ok(None);
        };
        let Some(session) = self.status.begin_session() else {
            debug!("Export already in progress, ignoring request");
            return Ok(None);
        };

        let started = Instant::now();
        match self.export(target.as_ref(), &session, snapshotter, sink, cancel) {
            Ok((path, gif, positions)) => {
                session.log("Export complete");
                Ok(Some(ExportReport {
                    path,
                    gif,
                    positions,
                    elapsed: started.elapsed(),
                }))
            }
            Err(e) => {
                warn!("Export of {} aborted: {}", target.scene().name, e);
                session.log(format!("Export failed: {e}"));
                Err(e)
            }
        }
    }

    fn export(
        &self,
        target: &dyn CaptureTarget,
        session: &SessionGuard,
        snapshotter: &mut dyn Snapshotter,
        sink: &mut dyn DownloadSink,
        cancel: &CancelToken,
    ) -> Result<(PathBuf, EncodedGif, Vec<f64>), CaptureError> {
        let config = &self.config;
        session.log("Starting recording...");
        let (view_width, view_height) = target.viewport();
        session.log(format!("Container size: {view_width}x{view_height}"));
        let (out_width, out_height) = config.output_size();
        session.log(format!("Target GIF size: {out_width}x{out_height}"));

        let mut recorder = GifRecorder::new(EncoderSettings::from_export(config))?;
        session.log("GIF encoder initialized");

        let positions = self.capture_frames(target, session, snapshotter, &mut recorder, cancel)?;

        session.log("Frame capture complete, starting render...");
        let job = recorder.render()?;
        let encoder_cancel = job.cancel_handle();
        let encoded = job.wait(|fraction| {
            if cancel.is_cancelled() {
                encoder_cancel.store(true, Ordering::Relaxed);
            }
            let percent = session.report_progress(fraction);
            session.log(format!("Encoding progress: {percent}%"));
        });
        let gif = match encoded {
            Err(EncodeError::Cancelled) => return Err(CaptureError::Cancelled),
            other => other?,
        };
        cancel.check()?;
        session.log(format!("GIF generated: {:.2}KB", gif.size_kb()));

        let filename = &target.scene().filename;
        let path = sink
            .deliver(filename, &gif.bytes)
            .map_err(|source| CaptureError::Delivery {
                filename: filename.clone(),
                source,
            })?;
        Ok((path, gif, positions))
    }

    /// Run the step loop under exclusive timeline control.
    ///
    /// Frame `i` is captured at `position_for_step(i)`; the position for
    /// the next step is written only after the current snapshot was taken.
    fn capture_frames(
        &self,
        target: &dyn CaptureTarget,
        session: &SessionGuard,
        snapshotter: &mut dyn Snapshotter,
        recorder: &mut GifRecorder,
        cancel: &CancelToken,
    ) -> Result<Vec<f64>, CaptureError> {
        let config = &self.config;
        let options = config.snapshot_options();
        let frame_options = FrameOptions {
            delay_ms: config.frame_delay_ms,
        };
        let mut positions = Vec::with_capacity(config.frame_count() as usize);

        session.log(format!(
            "Starting frame capture ({} frames at {}ms delay)",
            config.steps, config.frame_delay_ms
        ));

        let lease = target.timeline().acquire_export()?;
        lease.set(config.position_for_step(0));
        thread::sleep(config.settle_delay());

        for step in 0..=config.steps {
            cancel.check()?;
            if step % config.log_every == 0 {
                session.log(format!("Capturing frame {step}/{}", config.steps));
            }

            let position = lease.position();
            let frame = snapshotter.snapshot(target, &options)?;
            session.log(format!(
                "Frame {step} size: {}x{}",
                frame.width(),
                frame.height()
            ));
            recorder.add_frame(frame, frame_options)?;
            positions.push(position);

            if step < config.steps {
                lease.set(config.position_for_step(step + 1));
            }
            thread::sleep(config.step_wait());
        }

        Ok(positions)
    }
}

/// Export failures.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error(transparent)]
    Timeline(#[from] TimelineError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("Failed to save {filename}: {source}")]
    Delivery {
        filename: String,
        #[source]
        source: io::Error,
    },
    #[error("Export cancelled")]
    Cancelled,
}
