//! Configuration types for scene animation and GIF export.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Largest dimension a GIF logical screen can describe.
pub const MAX_GIF_DIMENSION: u32 = u16::MAX as u32;

fn default_refresh_hz() -> f64 {
    60.0
}

/// An opaque sRGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Scene background used by both built-in scenes.
    pub const SCENE_BACKGROUND: Rgb = Rgb(0x1a, 0x1a, 0x1a);

    pub fn to_rgba(self) -> [u8; 4] {
        [self.0, self.1, self.2, 255]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Settings for the continuously running scene animator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimatorConfig {
    /// Display refresh rate; the timeline advances one degree per refresh.
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: f64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            refresh_hz: default_refresh_hz(),
        }
    }
}

impl AnimatorConfig {
    /// Interval between two animator ticks. Only meaningful after
    /// [`Self::validate`].
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.refresh_hz).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let interval = Duration::try_from_secs_f64(1.0 / self.refresh_hz);
        if !self.refresh_hz.is_finite() || self.refresh_hz <= 0.0 || interval.is_err() {
            return Err(ConfigError::InvalidRefreshRate(self.refresh_hz));
        }
        Ok(())
    }
}

/// GIF encoder tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Worker threads used to quantize frames in parallel.
    pub workers: usize,
    /// NeuQuant sampling speed, 1 (best palette) to 30 (fastest).
    pub speed: i32,
    /// Error-diffusion dithering. The quantizer only supports `false`.
    pub dither: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            speed: 30,
            dither: false,
        }
    }
}

/// Tuning handed to the snapshot collaborator on every capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Pixel density multiplier.
    pub scale: f32,
    /// Timeout for loading external images; `None` disables it.
    pub image_timeout_ms: Option<u64>,
    /// Allow loading cross-origin images.
    pub allow_cross_origin: bool,
    /// Let the collaborator emit its own diagnostics.
    pub logging: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            image_timeout_ms: None,
            allow_cross_origin: true,
            logging: false,
        }
    }
}

/// Fully resolved options for a single snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOptions {
    pub background: Rgb,
    pub width: u32,
    pub height: u32,
    pub scale: f32,
    pub image_timeout: Option<Duration>,
    pub allow_cross_origin: bool,
    pub logging: bool,
}

impl SnapshotOptions {
    /// Output pixel size: the logical size multiplied by `scale`.
    pub fn output_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.scale).round() as u32,
            (self.height as f32 * self.scale).round() as u32,
        )
    }
}

/// Convert a millisecond count to a [`Duration`], rejecting negative,
/// non-finite, and overflowing values.
fn millis_to_duration(ms: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(ms / 1000.0).ok()
}

/// Top-level export configuration.
///
/// The defaults reproduce the fixed capture loop: a 400x400 GIF of
/// 72 steps plus a closing frame at 24 fps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Background painted behind the scene and used for GIF compositing.
    pub background: Rgb,
    /// Angular steps per cycle; one extra closing frame is captured.
    pub steps: u32,
    /// Display delay of every frame in the GIF.
    pub frame_delay_ms: f64,
    /// Wait after each position change before the next snapshot.
    pub step_wait_ms: f64,
    /// Wait after forcing position zero, before the first capture.
    pub settle_delay_ms: f64,
    /// Log a capture milestone every N steps.
    pub log_every: u32,
    /// Encoder tuning.
    pub encoder: EncoderConfig,
    /// Snapshot collaborator tuning.
    pub snapshot: SnapshotConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            background: Rgb::SCENE_BACKGROUND,
            steps: 72,
            frame_delay_ms: 1000.0 / 24.0,
            step_wait_ms: 1000.0 / 24.0,
            settle_delay_ms: 50.0,
            log_every: 12,
            encoder: EncoderConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Total frames captured per export (steps plus the closing frame).
    #[inline]
    pub fn frame_count(&self) -> u32 {
        self.steps + 1
    }

    /// Timeline position for capture step `step`.
    ///
    /// The last step lands on exactly 360 degrees, which the timeline
    /// wraps back to zero so the loop closes on the opening frame.
    #[inline]
    pub fn position_for_step(&self, step: u32) -> f64 {
        (step as f64 * 360.0) / self.steps as f64
    }

    /// Wait between capture steps. Only meaningful after [`Self::validate`].
    pub fn step_wait(&self) -> Duration {
        millis_to_duration(self.step_wait_ms).unwrap_or_default()
    }

    /// Wait before the first capture. Only meaningful after [`Self::validate`].
    pub fn settle_delay(&self) -> Duration {
        millis_to_duration(self.settle_delay_ms).unwrap_or_default()
    }

    /// Pixel size of every snapshot and of the encoded GIF.
    pub fn output_size(&self) -> (u32, u32) {
        self.snapshot_options().output_size()
    }

    /// Resolve the options passed to the snapshot collaborator.
    pub fn snapshot_options(&self) -> SnapshotOptions {
        SnapshotOptions {
            background: self.background,
            width: self.width,
            height: self.height,
            scale: self.snapshot.scale,
            image_timeout: self.snapshot.image_timeout_ms.map(Duration::from_millis),
            allow_cross_origin: self.snapshot.allow_cross_origin,
            logging: self.snapshot.logging,
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_GIF_DIMENSION
            || self.height > MAX_GIF_DIMENSION
        {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.steps == 0 {
            return Err(ConfigError::InvalidSteps);
        }
        if self.log_every == 0 {
            return Err(ConfigError::InvalidLogInterval);
        }
        for (name, value) in [
            ("frame_delay_ms", self.frame_delay_ms),
            ("step_wait_ms", self.step_wait_ms),
            ("settle_delay_ms", self.settle_delay_ms),
        ] {
            if millis_to_duration(value).is_none() {
                return Err(ConfigError::InvalidDelay { name, value });
            }
        }
        if self.encoder.workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if !(1..=30).contains(&self.encoder.speed) {
            return Err(ConfigError::InvalidSpeed(self.encoder.speed));
        }
        if self.encoder.dither {
            return Err(ConfigError::DitheringUnsupported);
        }
        if !self.snapshot.scale.is_finite() || self.snapshot.scale <= 0.0 {
            return Err(ConfigError::InvalidScale(self.snapshot.scale));
        }
        let (width, height) = self.output_size();
        if width == 0 || height == 0 || width > MAX_GIF_DIMENSION || height > MAX_GIF_DIMENSION {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Output dimensions {width}x{height} must be between 1 and 65535")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Step count must be non-zero")]
    InvalidSteps,
    #[error("Log interval must be non-zero")]
    InvalidLogInterval,
    #[error("{name} must be a finite, non-negative, representable number of milliseconds (got {value})")]
    InvalidDelay { name: &'static str, value: f64 },
    #[error("Encoder needs at least one worker")]
    InvalidWorkers,
    #[error("Encoder speed must be within 1..=30 (got {0})")]
    InvalidSpeed(i32),
    #[error("Dithering is not supported by the quantizer")]
    DitheringUnsupported,
    #[error("Snapshot scale must be positive (got {0})")]
    InvalidScale(f32),
    #[error("Refresh rate must be positive (got {0})")]
    InvalidRefreshRate(f64),
    #[error("Invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_capture_loop() {
        let config = ExportConfig::default();
        assert_eq!(config.frame_count(), 73);
        assert!((config.frame_delay_ms - 41.666_666).abs() < 1e-3);
        assert_eq!(config.step_wait_ms, config.frame_delay_ms);
        assert_eq!(config.output_size(), (400, 400));
        assert_eq!(config.settle_delay(), Duration::from_millis(50));
        assert_eq!(config.encoder.workers, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_step_positions_close_the_loop() {
        let config = ExportConfig::default();
        for step in 0..=config.steps {
            assert_eq!(config.position_for_step(step), step as f64 * 5.0);
        }
        assert_eq!(config.position_for_step(0), 0.0);
        assert_eq!(config.position_for_step(72), 360.0);
    }

    #[test]
    fn test_color_roundtrip_through_json() {
        let config = ExportConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"#1a1a1a\""));
        let parsed: ExportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.background, Rgb::SCENE_BACKGROUND);
    }

    #[test]
    fn test_rejects_bad_colors() {
        assert!("1a1a1a".parse::<Rgb>().is_err());
        assert!("#1a1a".parse::<Rgb>().is_err());
        assert!("#zz1a1a".parse::<Rgb>().is_err());
        assert_eq!("#FF0080".parse::<Rgb>().unwrap(), Rgb(255, 0, 128));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ExportConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));

        config = ExportConfig::default();
        config.encoder.dither = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DitheringUnsupported)
        ));

        config = ExportConfig::default();
        config.frame_delay_ms = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDelay { name: "frame_delay_ms", .. })
        ));

        config = ExportConfig::default();
        config.encoder.speed = 31;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSpeed(31))));

        // Values Duration cannot hold are rejected up front.
        for (name, huge) in [
            ("frame_delay_ms", ExportConfig { frame_delay_ms: 1e30, ..Default::default() }),
            ("step_wait_ms", ExportConfig { step_wait_ms: 1e30, ..Default::default() }),
            ("settle_delay_ms", ExportConfig { settle_delay_ms: -1.0, ..Default::default() }),
        ] {
            match huge.validate() {
                Err(ConfigError::InvalidDelay { name: got, .. }) => assert_eq!(got, name),
                other => panic!("expected InvalidDelay for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_scale_sets_output_size() {
        let mut config = ExportConfig {
            width: 48,
            height: 32,
            ..Default::default()
        };
        config.snapshot.scale = 2.0;
        assert!(config.validate().is_ok());
        assert_eq!(config.output_size(), (96, 64));
        assert_eq!(config.snapshot_options().output_size(), (96, 64));

        config.snapshot.scale = 0.001;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { width: 0, height: 0 })
        ));

        config.snapshot.scale = 4096.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_partial_json_uses_nested_defaults() {
        let json = r##"{
            "width": 64, "height": 64, "background": "#000000",
            "steps": 8, "frame_delay_ms": 0.0, "settle_delay_ms": 0.0, "log_every": 4
        }"##;
        let config: ExportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.encoder.workers, 4);
        assert_eq!(config.snapshot.image_timeout_ms, None);
        assert!(config.validate().is_ok());

        let config: ExportConfig = serde_json::from_str(r#"{"steps": 36}"#).unwrap();
        assert_eq!(config.frame_count(), 37);
        assert_eq!(config.width, 400);
        assert_eq!(config.background, Rgb::SCENE_BACKGROUND);
    }

    #[test]
    fn test_animator_interval() {
        let config = AnimatorConfig { refresh_hz: 50.0 };
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
        assert!(AnimatorConfig { refresh_hz: 0.0 }.validate().is_err());
        assert!(matches!(
            AnimatorConfig { refresh_hz: 1e-300 }.validate(),
            Err(ConfigError::InvalidRefreshRate(_))
        ));
        assert_eq!(
            AnimatorConfig { refresh_hz: 1e-300 }.tick_interval(),
            Duration::ZERO
        );
    }
}
