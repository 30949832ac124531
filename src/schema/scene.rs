//! Scene catalogue: glyphs, orbit descriptors, and the built-in scenes.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Sprite glyph identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Glyph {
    Sun,
    Heart,
    Cactus,
    Lizard,
    Scorpion,
    Tumbleweed,
}

impl Glyph {
    /// Emoji the glyph stands for.
    pub fn symbol(self) -> &'static str {
        match self {
            Glyph::Sun => "🌞",
            Glyph::Heart => "❤️",
            Glyph::Cactus => "🌵",
            Glyph::Lizard => "🦎",
            Glyph::Scorpion => "🦂",
            Glyph::Tumbleweed => "🌾",
        }
    }

    /// Dominant color used by the software rasterizer.
    pub fn color(self) -> [u8; 3] {
        match self {
            Glyph::Sun => [0xff, 0xc8, 0x2e],
            Glyph::Heart => [0xe6, 0x23, 0x3c],
            Glyph::Cactus => [0x3f, 0xa3, 0x4d],
            Glyph::Lizard => [0x8c, 0xc8, 0x3c],
            Glyph::Scorpion => [0xb4, 0x5a, 0x28],
            Glyph::Tumbleweed => [0xd2, 0xb4, 0x78],
        }
    }
}

/// Orbit direction sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }

    /// Alternate direction by index parity, starting forward.
    pub fn alternating(index: usize) -> Self {
        if index % 2 == 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }
}

/// Fixed motion parameters for one orbiting sprite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitDescriptor {
    /// Angular speed multiplier (radians per timeline degree).
    pub speed: f64,
    /// Orbit radius in pixels.
    pub radius: f64,
    /// Phase offset in radians.
    pub offset: f64,
    /// Visual size in pixels.
    pub size: f64,
    pub glyph: Glyph,
    #[serde(default)]
    pub direction: Direction,
    /// Rotation in degrees per timeline degree (0 = no spin).
    #[serde(default)]
    pub spin: f64,
    pub opacity: f32,
    /// Blur factor applied to `1 - scale`.
    pub blur: f64,
}

/// The large sprite pinned to the scene center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterSprite {
    pub glyph: Glyph,
    /// Visual size in pixels.
    pub size: f64,
    /// Rotation in degrees per timeline degree.
    pub spin: f64,
    /// Blur factor applied to `1 - scale`.
    pub blur: f64,
}

/// Complete description of one scene.
///
/// Sprites are painted in order: center first, then every orbit
/// descriptor in sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSpec {
    /// Human readable scene name.
    pub name: String,
    /// Filename the exported GIF is delivered under.
    pub filename: String,
    pub center: CenterSprite,
    pub orbits: Vec<OrbitDescriptor>,
}

impl SceneSpec {
    /// Number of sprites including the center sprite.
    pub fn sprite_count(&self) -> usize {
        self.orbits.len() + 1
    }
}

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SceneKind {
    /// Sun surrounded by a ring of hearts.
    SpinningEmojis,
    /// Cactus with tumbleweeds and a desert ring.
    #[default]
    FingerScene,
}

impl SceneKind {
    pub fn spec(self) -> SceneSpec {
        match self {
            SceneKind::SpinningEmojis => spinning_emojis(),
            SceneKind::FingerScene => finger_scene(),
        }
    }
}

fn center(glyph: Glyph) -> CenterSprite {
    CenterSprite {
        glyph,
        size: 200.0,
        spin: 2.0,
        blur: 0.3,
    }
}

/// Sun with eight hearts evenly spaced on a 140px orbit.
pub fn spinning_emojis() -> SceneSpec {
    let hearts = (0..8)
        .map(|i| OrbitDescriptor {
            speed: 0.2,
            radius: 140.0,
            offset: i as f64 * PI / 4.0,
            size: 40.0,
            glyph: Glyph::Heart,
            direction: Direction::Forward,
            spin: 0.0,
            opacity: 0.9,
            blur: 0.5,
        })
        .collect();

    SceneSpec {
        name: "Spinning emojis".to_string(),
        filename: "spinning-emojis.gif".to_string(),
        center: center(Glyph::Sun),
        orbits: hearts,
    }
}

/// Inner ring of tumbleweeds spinning against the outer desert ring.
fn tumbleweed_orbit(index: usize, total: usize) -> OrbitDescriptor {
    OrbitDescriptor {
        speed: -0.5 - index as f64 * 0.1,
        radius: 70.0,
        offset: index as f64 * 2.0 * PI / total as f64,
        size: 25.0,
        glyph: Glyph::Tumbleweed,
        direction: Direction::Forward,
        spin: 3.0,
        opacity: 0.7,
        blur: 0.3,
    }
}

/// Outer ring: each element a little faster than the previous one,
/// alternating direction.
fn desert_orbit(index: usize, total: usize) -> OrbitDescriptor {
    const GLYPHS: [Glyph; 4] = [Glyph::Cactus, Glyph::Lizard, Glyph::Scorpion, Glyph::Sun];
    OrbitDescriptor {
        speed: 0.2 + index as f64 * 0.1,
        radius: 140.0,
        offset: index as f64 * 2.0 * PI / total as f64,
        size: 40.0,
        glyph: GLYPHS[index % GLYPHS.len()],
        direction: Direction::alternating(index),
        spin: 0.0,
        opacity: 0.9,
        blur: 0.5,
    }
}

/// Cactus with four tumbleweeds and eight desert elements.
pub fn finger_scene() -> SceneSpec {
    let tumbleweeds = (0..4).map(|i| tumbleweed_orbit(i, 4));
    let desert = (0..8).map(|i| desert_orbit(i, 8));

    SceneSpec {
        name: "Finger scene".to_string(),
        filename: "finger-animation.gif".to_string(),
        center: center(Glyph::Cactus),
        orbits: tumbleweeds.chain(desert).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinning_emojis_layout() {
        let scene = spinning_emojis();
        assert_eq!(scene.sprite_count(), 9);
        assert_eq!(scene.filename, "spinning-emojis.gif");
        assert!(scene.orbits.iter().all(|o| o.glyph == Glyph::Heart));
        assert!((scene.orbits[2].offset - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_finger_scene_layout() {
        let scene = finger_scene();
        assert_eq!(scene.sprite_count(), 13);
        assert_eq!(scene.filename, "finger-animation.gif");

        let (inner, outer) = scene.orbits.split_at(4);
        assert!(inner.iter().all(|o| o.radius == 70.0 && o.spin == 3.0));
        assert!((inner[3].speed - -0.8).abs() < 1e-12);

        assert_eq!(outer[1].direction, Direction::Reverse);
        assert_eq!(outer[2].direction, Direction::Forward);
        assert_eq!(outer[3].glyph, Glyph::Sun);
        assert_eq!(outer[5].glyph, Glyph::Lizard);
        assert!((outer[7].speed - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_scene_json_roundtrip() {
        let scene = SceneKind::FingerScene.spec();
        let json = serde_json::to_string(&scene).unwrap();
        let parsed: SceneSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scene);
    }
}
