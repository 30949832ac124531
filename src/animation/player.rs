//! Animation player for reading back exported GIFs.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::time::Duration;

use image::RgbaImage;

use super::format::{LoopCount, centis_to_millis, read_loop_count};

/// One decoded, fully composited frame.
#[derive(Debug, Clone)]
pub struct PlayerFrame {
    pub image: RgbaImage,
    /// Display delay in GIF centiseconds.
    pub delay_centis: u16,
}

/// Decoded GIF animation.
///
/// Usage:
/// ```ignore
/// let player = AnimationPlayer::open("finger-animation.gif")?;
/// println!("{} frames, loops: {:?}", player.frame_count(), player.loop_count());
/// for frame in player.frames() {
///     // frame.image is the full canvas after this frame
/// }
/// ```
pub struct AnimationPlayer {
    width: u32,
    height: u32,
    loop_count: LoopCount,
    frames: Vec<PlayerFrame>,
}

impl AnimationPlayer {
    /// Open a GIF file for playback.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut bytes = Vec::new();
        BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Decode an in-memory GIF.
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        let invalid = |e: gif::DecodingError| io::Error::new(io::ErrorKind::InvalidData, e);

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options.read_info(bytes).map_err(invalid)?;

        let width = decoder.width() as u32;
        let height = decoder.height() as u32;
        let mut canvas = RgbaImage::new(width, height);
        let mut frames = Vec::new();

        while let Some(frame) = decoder.read_next_frame().map_err(invalid)? {
            let (left, top) = (frame.left as u32, frame.top as u32);
            let frame_width = frame.width as u32;
            for (i, px) in frame.buffer.chunks_exact(4).enumerate() {
                let x = left + i as u32 % frame_width;
                let y = top + i as u32 / frame_width;
                // Transparent pixels leave the previous frame visible.
                if px[3] == 0 || x >= width || y >= height {
                    continue;
                }
                canvas.get_pixel_mut(x, y).0.copy_from_slice(px);
            }
            frames.push(PlayerFrame {
                image: canvas.clone(),
                delay_centis: frame.delay,
            });
        }

        Ok(Self {
            width,
            height,
            loop_count: read_loop_count(bytes)?,
            frames,
        })
    }

    /// Logical screen size.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    /// Per-frame delays in milliseconds.
    pub fn delays_ms(&self) -> Vec<u32> {
        self.frames
            .iter()
            .map(|f| centis_to_millis(f.delay_centis))
            .collect()
    }

    /// Time for one pass through every frame.
    pub fn cycle_duration(&self) -> Duration {
        Duration::from_millis(self.delays_ms().iter().map(|&d| d as u64).sum())
    }

    /// Read a specific frame by index.
    pub fn read_frame(&self, index: usize) -> io::Result<&PlayerFrame> {
        self.frames.get(index).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Frame index {} out of range ({} frames)",
                    index,
                    self.frames.len()
                ),
            )
        })
    }

    /// Iterate over all frames.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = &PlayerFrame> {
        self.frames.iter()
    }
}
