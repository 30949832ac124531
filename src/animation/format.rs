//! GIF format helpers shared by the recorder and the player.

use std::io;

use crate::schema::Rgb;

/// Application extension identifier carrying the loop count.
pub const NETSCAPE_LOOP_ID: &[u8; 11] = b"NETSCAPE2.0";

/// Convert a frame delay in milliseconds to GIF centiseconds.
///
/// GIF stores delays in hundredths of a second; the delay is rounded to
/// the nearest unit and saturates at `u16::MAX`.
pub fn delay_to_centis(delay_ms: f64) -> u16 {
    (delay_ms / 10.0).round().clamp(0.0, u16::MAX as f64) as u16
}

/// Convert GIF centiseconds back to milliseconds.
pub fn centis_to_millis(centis: u16) -> u32 {
    centis as u32 * 10
}

/// Composite straight-alpha RGBA pixels onto an opaque background, in place.
pub fn flatten_onto(pixels: &mut [u8], background: Rgb) {
    let bg = [background.0, background.1, background.2];
    for px in pixels.chunks_exact_mut(4) {
        let alpha = px[3] as u32;
        if alpha == 255 {
            continue;
        }
        for (c, b) in px[..3].iter_mut().zip(bg) {
            *c = ((*c as u32 * alpha + b as u32 * (255 - alpha) + 127) / 255) as u8;
        }
        px[3] = 255;
    }
}

/// Loop setting found in a GIF stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCount {
    /// No NETSCAPE extension: play once.
    Once,
    /// Loop forever.
    Infinite,
    /// Repeat a fixed number of times after the first play.
    Finite(u16),
}

/// Scan a GIF stream for the NETSCAPE looping extension.
pub fn read_loop_count(bytes: &[u8]) -> io::Result<LoopCount> {
    let Some(at) = bytes
        .windows(NETSCAPE_LOOP_ID.len())
        .position(|w| w == NETSCAPE_LOOP_ID)
    else {
        return Ok(LoopCount::Once);
    };

    // Sub-block: size (3), id (1), loop count (u16 LE)
    let block = &bytes[at + NETSCAPE_LOOP_ID.len()..];
    match block {
        [3, 1, lo, hi, ..] => Ok(match u16::from_le_bytes([*lo, *hi]) {
            0 => LoopCount::Infinite,
            n => LoopCount::Finite(n),
        }),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Malformed NETSCAPE2.0 loop extension",
        )),
    }
}
