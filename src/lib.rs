//! Orbit capture - orbiting sprite scenes with seamless looping GIF export.
//!
//! A scene is a large center sprite plus sprites moving on circular
//! orbits. Mounting a scene on a [`Stage`] starts a continuous animator
//! that advances the timeline one degree per display refresh. Exporting
//! hands the timeline to a [`CapturePipeline`], which captures one full
//! 360 degree cycle (72 steps plus a closing frame identical to the first)
//! and encodes it into a GIF that loops without a visible seam.
//!
//! # Architecture
//!
//! - `schema`: Configuration and scene description types
//! - `compute`: Motion model and software rasterizer
//! - `stage`: Mounted scene that owns the timeline and its animator
//! - `timeline`: Single-owner timeline slot and the continuous animator
//! - `animation`: GIF recorder, format helpers, and playback
//! - `capture`: Export pipeline, status reporting, and delivery
//!
//! # Example
//!
//! ```rust,no_run
//! use orbit_capture::{
//!     capture::{CancelToken, CapturePipeline, FileDownload, StatusReporter},
//!     compute::SoftwareRasterizer,
//!     schema::{AnimatorConfig, ExportConfig, SceneKind},
//!     Stage,
//! };
//!
//! let stage = Stage::mount(SceneKind::FingerScene.spec(), (400, 400), &AnimatorConfig::default())?;
//! let status = StatusReporter::new();
//! let pipeline = CapturePipeline::new(&stage, ExportConfig::default(), status.clone())?;
//!
//! let report = pipeline.run_export(
//!     &mut SoftwareRasterizer::new(),
//!     &mut FileDownload::new("."),
//!     &CancelToken::new(),
//! )?;
//! if let Some(report) = report {
//!     println!("Saved {} frames to {}", report.gif.frame_count, report.path.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod animation;
pub mod capture;
pub mod compute;
pub mod schema;
pub mod stage;
pub mod timeline;

// Re-export commonly used types
pub use capture::{CancelToken, CapturePipeline, StatusReporter};
pub use schema::{ExportConfig, SceneKind, SceneSpec};
pub use stage::Stage;
