//! Capture seams: the view being captured and the collaborator that
//! turns it into a bitmap.

use image::RgbaImage;

use crate::schema::{SceneSpec, SnapshotOptions};
use crate::timeline::Timeline;

/// A mounted, renderable scene that can be captured.
pub trait CaptureTarget: Send + Sync {
    /// Scene being shown.
    fn scene(&self) -> &SceneSpec;

    /// Timeline driving the scene.
    fn timeline(&self) -> &Timeline;

    /// On-screen size of the view in pixels. Snapshots ignore it and
    /// always render at the configured output size.
    fn viewport(&self) -> (u32, u32);
}

/// Renders the current state of a capture target into a bitmap.
///
/// Implementations may reuse the returned buffer on the next call, so
/// callers that keep frames must copy them.
pub trait Snapshotter {
    fn snapshot(
        &mut self,
        target: &dyn CaptureTarget,
        options: &SnapshotOptions,
    ) -> Result<&RgbaImage, SnapshotError>;
}

/// Snapshot failures.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot output {width}x{height} is empty")]
    EmptyOutput { width: u32, height: u32 },
    #[error("Snapshot failed: {0}")]
    Render(String),
}
