//! Capture module - export sessions, status reporting, and delivery.
//!
//! A [`CapturePipeline`] takes exclusive control of a mounted scene's
//! timeline, walks it through one full cycle while a [`Snapshotter`] turns
//! each step into a bitmap, hands the frames to the GIF recorder, and
//! delivers the result through a [`DownloadSink`]. Progress and lifecycle
//! events land in a [`StatusReporter`].

mod download;
mod pipeline;
mod status;
mod target;

pub use download::{DownloadSink, FileDownload, MemoryDownload};
pub use pipeline::{CancelToken, CaptureError, CapturePipeline, ExportReport};
pub use status::{LogEntry, SessionGuard, StatusReporter, StatusSnapshot, percent_of};
pub use target::{CaptureTarget, SnapshotError, Snapshotter};
