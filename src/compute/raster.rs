//! CPU rasterizer - paints a scene snapshot into an RGBA buffer.
//!
//! Glyphs are drawn as anti-aliased discs in the glyph's color, with a
//! darker notch on the rim showing the sprite's rotation. Blur is
//! approximated by widening the anti-aliased edge.

use image::{Rgba, RgbaImage};
use log::debug;

use crate::capture::{CaptureTarget, SnapshotError, Snapshotter};
use crate::schema::{SceneSpec, SnapshotOptions};

use super::motion::{PlacedSprite, layout_scene};

/// Notch radius relative to the sprite radius.
const NOTCH_RADIUS: f64 = 0.25;
/// Distance of the notch center from the sprite center, relative to the radius.
const NOTCH_DISTANCE: f64 = 0.6;

/// Software snapshotter with a reusable canvas.
pub struct SoftwareRasterizer {
    canvas: RgbaImage,
    frames_rendered: u64,
}

impl Default for SoftwareRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareRasterizer {
    pub fn new() -> Self {
        Self {
            canvas: RgbaImage::new(0, 0),
            frames_rendered: 0,
        }
    }

    /// Number of snapshots produced so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Render `scene` at `position` into the reusable canvas.
    pub fn render(
        &mut self,
        scene: &SceneSpec,
        position: f64,
        options: &SnapshotOptions,
    ) -> Result<&RgbaImage, SnapshotError> {
        let (width, height) = options.output_size();
        if width == 0 || height == 0 {
            return Err(SnapshotError::EmptyOutput { width, height });
        }

        if self.canvas.dimensions() != (width, height) {
            self.canvas = RgbaImage::new(width, height);
        }
        let background = Rgba(options.background.to_rgba());
        for pixel in self.canvas.pixels_mut() {
            *pixel = background;
        }

        let origin = (width as f64 / 2.0, height as f64 / 2.0);
        let density = options.scale as f64;
        for sprite in layout_scene(scene, position) {
            paint_sprite(&mut self.canvas, origin, density, &sprite);
        }

        self.frames_rendered += 1;
        if options.logging {
            debug!(
                "Rendered {} sprites at {:.2} deg into {}x{}",
                scene.sprite_count(),
                position,
                width,
                height
            );
        }
        Ok(&self.canvas)
    }
}

impl Snapshotter for SoftwareRasterizer {
    fn snapshot(
        &mut self,
        target: &dyn CaptureTarget,
        options: &SnapshotOptions,
    ) -> Result<&RgbaImage, SnapshotError> {
        let position = target.timeline().position();
        self.render(target.scene(), position, options)
    }
}

fn paint_sprite(canvas: &mut RgbaImage, origin: (f64, f64), density: f64, sprite: &PlacedSprite) {
    let t = &sprite.transform;
    let cx = origin.0 + t.x * density;
    let cy = origin.1 + t.y * density;
    let radius = sprite.size * t.scale * density / 2.0;
    if radius <= 0.0 {
        return;
    }
    let edge = 1.0 + sprite.blur * 2.0 * density;

    // Clockwise from twelve o'clock, matching screen-space rotation.
    let (sin, cos) = t.rotation.to_radians().sin_cos();
    let notch = (
        cx + sin * radius * NOTCH_DISTANCE,
        cy - cos * radius * NOTCH_DISTANCE,
    );
    let notch_radius = radius * NOTCH_RADIUS;

    let color = sprite.glyph.color();
    let shade = color.map(|c| (c as f64 * 0.55) as u8);

    let reach = radius + edge;
    let (width, height) = canvas.dimensions();
    let x0 = (cx - reach).floor().max(0.0) as u32;
    let y0 = (cy - reach).floor().max(0.0) as u32;
    let x1 = ((cx + reach).ceil().max(0.0) as u32).min(width);
    let y1 = ((cy + reach).ceil().max(0.0) as u32).min(height);

    for y in y0..y1 {
        for x in x0..x1 {
            let px = x as f64 + 0.5;
            let py = y as f64 + 0.5;
            let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            let coverage = ((radius - d) / edge + 0.5).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            let in_notch = ((px - notch.0).powi(2) + (py - notch.1).powi(2)).sqrt() < notch_radius;
            let src = if in_notch { shade } else { color };
            let alpha = coverage * sprite.opacity as f64;
            blend(canvas.get_pixel_mut(x, y), src, alpha);
        }
    }
}

#[inline]
fn blend(dst: &mut Rgba<u8>, src: [u8; 3], alpha: f64) {
    for (d, s) in dst.0.iter_mut().zip(src) {
        *d = (*d as f64 * (1.0 - alpha) + s as f64 * alpha).round() as u8;
    }
    dst.0[3] = 255;
}
