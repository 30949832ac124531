//! Motion model - maps a timeline position to sprite transforms.
//!
//! Every function here is pure: the same position and descriptor always
//! produce the same transform, whether the position came from the
//! continuous animator or from the capture pipeline.

use crate::schema::{CenterSprite, Glyph, OrbitDescriptor, SceneSpec};

/// Convert a timeline position in degrees to radians.
#[inline]
pub fn radians_of(position: f64) -> f64 {
    position.to_radians()
}

/// Wrap a position into `[0, 360)`.
#[inline]
pub fn wrap_degrees(position: f64) -> f64 {
    let wrapped = position.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Placement of one sprite relative to the scene center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteTransform {
    /// Horizontal offset in pixels.
    pub x: f64,
    /// Vertical offset in pixels (positive is down).
    pub y: f64,
    pub scale: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

/// Center sprite transform: pinned at the origin, breathing scale.
pub fn center_transform(position: f64, sprite: &CenterSprite) -> SpriteTransform {
    SpriteTransform {
        x: 0.0,
        y: 0.0,
        scale: 0.9 + 0.1 * radians_of(position).sin(),
        rotation: position * sprite.spin,
    }
}

/// Orbiting sprite transform.
pub fn orbit_transform(position: f64, orbit: &OrbitDescriptor) -> SpriteTransform {
    let angle = position * orbit.speed * orbit.direction.sign() + orbit.offset;
    SpriteTransform {
        x: orbit.radius * angle.cos(),
        y: orbit.radius * angle.sin(),
        scale: 0.8 + 0.2 * (radians_of(position) + orbit.offset).sin(),
        rotation: position * orbit.spin,
    }
}

/// A sprite ready to be painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedSprite {
    pub glyph: Glyph,
    /// Unscaled visual size in pixels.
    pub size: f64,
    pub opacity: f32,
    /// Edge softness in pixels.
    pub blur: f64,
    pub transform: SpriteTransform,
}

/// Lay out every sprite of `scene` at `position`, in paint order.
pub fn layout_scene(scene: &SceneSpec, position: f64) -> Vec<PlacedSprite> {
    let mut sprites = Vec::with_capacity(scene.sprite_count());

    let center = center_transform(position, &scene.center);
    sprites.push(PlacedSprite {
        glyph: scene.center.glyph,
        size: scene.center.size,
        opacity: 1.0,
        blur: (1.0 - center.scale) * scene.center.blur,
        transform: center,
    });

    sprites.extend(scene.orbits.iter().map(|orbit| {
        let transform = orbit_transform(position, orbit);
        PlacedSprite {
            glyph: orbit.glyph,
            size: orbit.size,
            opacity: orbit.opacity,
            blur: (1.0 - transform.scale) * orbit.blur,
            transform,
        }
    }));

    sprites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Direction, finger_scene, spinning_emojis};
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn heart(offset: f64) -> OrbitDescriptor {
        OrbitDescriptor {
            speed: 0.2,
            radius: 140.0,
            offset,
            size: 40.0,
            glyph: Glyph::Heart,
            direction: Direction::Forward,
            spin: 0.0,
            opacity: 0.9,
            blur: 0.5,
        }
    }

    #[test]
    fn test_orbit_at_origin_uses_offset() {
        let t = orbit_transform(0.0, &heart(PI / 2.0));
        assert!(t.x.abs() < 1e-9);
        assert!((t.y - 140.0).abs() < 1e-9);
        assert!((t.scale - 1.0).abs() < 1e-12);
        assert_eq!(t.rotation, 0.0);
    }

    #[test]
    fn test_reverse_direction_mirrors_angle() {
        let mut orbit = heart(0.0);
        let forward = orbit_transform(10.0, &orbit);
        orbit.direction = Direction::Reverse;
        let reverse = orbit_transform(10.0, &orbit);
        assert!((forward.x - reverse.x).abs() < 1e-9);
        assert!((forward.y + reverse.y).abs() < 1e-9);
    }

    #[test]
    fn test_center_scale_and_rotation() {
        let scene = spinning_emojis();
        let t = center_transform(90.0, &scene.center);
        assert!((t.scale - 1.0).abs() < 1e-12);
        assert_eq!(t.rotation, 180.0);
        let t = center_transform(270.0, &scene.center);
        assert!((t.scale - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_inner_ring_spins_three_times() {
        let scene = finger_scene();
        let t = orbit_transform(10.0, &scene.orbits[0]);
        assert_eq!(t.rotation, 30.0);
    }

    #[test]
    fn test_layout_paint_order() {
        let scene = finger_scene();
        let sprites = layout_scene(&scene, 45.0);
        assert_eq!(sprites.len(), 13);
        assert_eq!(sprites[0].glyph, Glyph::Cactus);
        assert_eq!(sprites[1].glyph, Glyph::Tumbleweed);
        assert_eq!(sprites[0].opacity, 1.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(361.0), 1.0);
        assert_eq!(wrap_degrees(-1.0), 359.0);
        assert_eq!(wrap_degrees(-1e-20), 0.0);
    }

    proptest! {
        #[test]
        fn prop_layout_is_deterministic(position in 0.0f64..360.0) {
            let scene = finger_scene();
            prop_assert_eq!(layout_scene(&scene, position), layout_scene(&scene, position));
        }

        #[test]
        fn prop_orbit_stays_on_radius(position in 0.0f64..360.0, offset in 0.0f64..(2.0 * PI)) {
            let t = orbit_transform(position, &heart(offset));
            let r = (t.x * t.x + t.y * t.y).sqrt();
            prop_assert!((r - 140.0).abs() < 1e-6);
            prop_assert!(t.scale >= 0.6 - 1e-12 && t.scale <= 1.0 + 1e-12);
        }

        #[test]
        fn prop_wrap_in_range(position in -10_000.0f64..10_000.0) {
            let wrapped = wrap_degrees(position);
            prop_assert!((0.0..360.0).contains(&wrapped));
        }
    }
}
