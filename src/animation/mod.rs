//! GIF export and playback for captured scene frames.
//!
//! The recorder queues copies of captured frames, then renders them on a
//! background thread: frames are flattened onto the scene background and
//! palette-quantized in parallel on a fixed-size worker pool, then written
//! in submission order as a GIF89a stream that loops forever.
//!
//! ```text
//! GIF89a layout written per export:
//!   Header + logical screen (width, height, no global palette)
//!   NETSCAPE2.0 application extension (loop count 0 = infinite)
//!   Per frame:
//!     Graphic control extension (delay in centiseconds)
//!     Image descriptor + local palette (<= 256 colors)
//!     LZW image data
//!   Trailer
//! ```

mod encoder;
mod format;
mod player;

pub use encoder::{
    EncodeError, EncodeJob, EncodedGif, EncoderEvent, EncoderSettings, FrameOptions, GifRecorder,
};
pub use format::{LoopCount, centis_to_millis, delay_to_centis};
pub use player::{AnimationPlayer, PlayerFrame};
