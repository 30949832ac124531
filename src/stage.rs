//! Stage - a mounted scene with its own timeline and animator.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use log::info;

use crate::capture::CaptureTarget;
use crate::schema::{AnimatorConfig, SceneSpec};
use crate::timeline::{ContinuousAnimator, Timeline};

/// A scene mounted into a viewport.
///
/// Mounting starts the continuous animator; dropping the stage unmounts
/// it and cancels the animator. Capture pipelines hold only a weak
/// reference, so exports against an unmounted stage become no-ops.
pub struct Stage {
    scene: SceneSpec,
    timeline: Arc<Timeline>,
    viewport: (u32, u32),
    animator: Mutex<Option<ContinuousAnimator>>,
}

impl Stage {
    /// Mount `scene` and start animating it.
    ///
    /// Fails with `InvalidInput` when the animator config does not validate.
    pub fn mount(
        scene: SceneSpec,
        viewport: (u32, u32),
        config: &AnimatorConfig,
    ) -> io::Result<Arc<Self>> {
        config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let timeline = Arc::new(Timeline::new());
        let animator = ContinuousAnimator::start(Arc::clone(&timeline), config.tick_interval())?;
        info!(
            "Mounted {} ({} sprites, {}x{})",
            scene.name,
            scene.sprite_count(),
            viewport.0,
            viewport.1
        );
        Ok(Arc::new(Self {
            scene,
            timeline,
            viewport,
            animator: Mutex::new(Some(animator)),
        }))
    }

    /// Mount without an animator; the timeline only moves when driven
    /// explicitly.
    pub fn mount_static(scene: SceneSpec, viewport: (u32, u32)) -> Arc<Self> {
        Arc::new(Self {
            scene,
            timeline: Arc::new(Timeline::new()),
            viewport,
            animator: Mutex::new(None),
        })
    }

    pub fn is_animating(&self) -> bool {
        self.animator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(ContinuousAnimator::is_running)
    }

    /// Stop the animator without dropping the stage.
    pub fn freeze(&self) {
        if let Some(mut animator) = self
            .animator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            animator.stop();
        }
    }
}

impl CaptureTarget for Stage {
    fn scene(&self) -> &SceneSpec {
        &self.scene
    }

    fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        self.freeze();
        info!("Unmounted {}", self.scene.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::finger_scene;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_unmount_stops_position_changes() {
        let config = AnimatorConfig { refresh_hz: 1000.0 };
        let stage = Stage::mount(finger_scene(), (400, 400), &config).unwrap();
        let timeline = Arc::clone(&stage.timeline);
        assert!(stage.is_animating());

        let deadline = Instant::now() + Duration::from_secs(5);
        while timeline.ticks() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(timeline.ticks() > 0);

        drop(stage);
        let frozen = timeline.position();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(timeline.position(), frozen);
    }

    #[test]
    fn test_static_stage_does_not_animate() {
        let stage = Stage::mount_static(finger_scene(), (400, 400));
        assert!(!stage.is_animating());
        thread::sleep(Duration::from_millis(5));
        assert_eq!(stage.timeline().ticks(), 0);
        assert_eq!(stage.viewport(), (400, 400));
    }

    #[test]
    fn test_mount_rejects_unusable_refresh_rate() {
        for refresh_hz in [0.0, -60.0, f64::NAN, 1e-300] {
            let config = AnimatorConfig { refresh_hz };
            let err = Stage::mount(finger_scene(), (400, 400), &config).err().unwrap();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }
    }
}
