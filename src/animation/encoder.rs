//! GIF recorder - accumulates captured frames and renders them into a
//! looping GIF on a worker pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use image::RgbaImage;
use log::debug;
use rayon::prelude::*;

use super::format::{delay_to_centis, flatten_onto};
use crate::schema::{EncoderConfig, ExportConfig, Rgb};

/// Per-frame options for [`GifRecorder::add_frame`].
#[derive(Debug, Clone, Copy)]
pub struct FrameOptions {
    /// Display delay in milliseconds.
    pub delay_ms: f64,
}

/// Everything the recorder needs to know about the output.
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    /// Color transparent pixels are composited onto.
    pub background: Rgb,
    pub encoder: EncoderConfig,
}

impl EncoderSettings {
    /// Settings for a GIF of the export's scaled output size.
    pub fn from_export(config: &ExportConfig) -> Self {
        let (width, height) = config.output_size();
        Self {
            width,
            height,
            background: config.background,
            encoder: config.encoder.clone(),
        }
    }
}

struct PendingFrame {
    pixels: Vec<u8>,
    delay_centis: u16,
}

/// Frame accumulator for one export.
///
/// Usage:
/// ```ignore
/// let mut recorder = GifRecorder::new(EncoderSettings::from_export(&config))?;
/// for frame in frames {
///     recorder.add_frame(&frame, FrameOptions { delay_ms: 1000.0 / 24.0 })?;
/// }
/// let gif = recorder.render()?.wait(|fraction| println!("{fraction:.2}"))?;
/// ```
pub struct GifRecorder {
    settings: EncoderSettings,
    width: u16,
    height: u16,
    frames: Vec<PendingFrame>,
}

impl GifRecorder {
    /// Create a new recorder.
    pub fn new(settings: EncoderSettings) -> Result<Self, EncodeError> {
        let width = u16::try_from(settings.width).ok().filter(|w| *w > 0);
        let height = u16::try_from(settings.height).ok().filter(|h| *h > 0);
        let (Some(width), Some(height)) = (width, height) else {
            return Err(EncodeError::InvalidDimensions {
                width: settings.width,
                height: settings.height,
            });
        };
        if settings.encoder.workers == 0 || !(1..=30).contains(&settings.encoder.speed) {
            return Err(EncodeError::InvalidSettings);
        }
        if settings.encoder.dither {
            return Err(EncodeError::DitheringUnsupported);
        }

        Ok(Self {
            settings,
            width,
            height,
            frames: Vec::new(),
        })
    }

    /// Queue a copy of `frame`.
    ///
    /// The pixels are copied so the caller may reuse its buffer for the
    /// next capture.
    pub fn add_frame(&mut self, frame: &RgbaImage, options: FrameOptions) -> Result<(), EncodeError> {
        let (width, height) = frame.dimensions();
        if (width, height) != (self.settings.width, self.settings.height) {
            return Err(EncodeError::FrameSize {
                index: self.frames.len(),
                width,
                height,
                expected_width: self.settings.width,
                expected_height: self.settings.height,
            });
        }
        self.frames.push(PendingFrame {
            pixels: frame.as_raw().clone(),
            delay_centis: delay_to_centis(options.delay_ms),
        });
        Ok(())
    }

    /// Number of frames queued so far.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Start rendering in the background.
    ///
    /// Frames are quantized in parallel on `workers` threads, then written
    /// in submission order. Progress is reported as the fraction of frames
    /// quantized and never decreases.
    pub fn render(self) -> Result<EncodeJob, EncodeError> {
        if self.frames.is_empty() {
            return Err(EncodeError::NoFrames);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.encoder.workers)
            .thread_name(|i| format!("gif-worker-{i}"))
            .build()
            .map_err(|e| EncodeError::WorkerPool(e.to_string()))?;

        let (tx, rx) = unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = thread::Builder::new()
            .name("gif-render".to_string())
            .spawn(move || {
                let result = pool.install(|| self.encode(&tx, &flag));
                let _ = tx.send(EncoderEvent::Finished(result));
            })
            .map_err(|e| EncodeError::WorkerPool(e.to_string()))?;

        Ok(EncodeJob {
            events: rx,
            cancelled,
            handle: Some(handle),
        })
    }

    fn encode(self, tx: &Sender<EncoderEvent>, cancelled: &AtomicBool) -> Result<EncodedGif, EncodeError> {
        let total = self.frames.len();
        let (width, height) = (self.width, self.height);
        let speed = self.settings.encoder.speed;
        let background = self.settings.background;
        let processed = Mutex::new(0usize);

        let quantized = self
            .frames
            .into_par_iter()
            .map(|mut pending| {
                if cancelled.load(Ordering::Relaxed) {
                    return Err(EncodeError::Cancelled);
                }
                flatten_onto(&mut pending.pixels, background);
                let mut frame = gif::Frame::from_rgba_speed(width, height, &mut pending.pixels, speed);
                frame.delay = pending.delay_centis;

                // Count and report under one lock so fractions arrive in order.
                let mut count = processed.lock().unwrap_or_else(PoisonError::into_inner);
                *count += 1;
                let _ = tx.send(EncoderEvent::Progress(*count as f32 / total as f32));
                Ok(frame)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut bytes = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut bytes, width, height, &[])?;
            encoder.set_repeat(gif::Repeat::Infinite)?;
            for frame in &quantized {
                encoder.write_frame(frame)?;
            }
        }
        debug!("Encoded {} frames into {} bytes", total, bytes.len());

        Ok(EncodedGif {
            bytes,
            frame_count: total,
            width: width as u32,
            height: height as u32,
        })
    }
}

/// Events emitted by a running [`EncodeJob`].
#[derive(Debug)]
pub enum EncoderEvent {
    /// Fraction of frames processed, in `0..=1`.
    Progress(f32),
    /// Terminal result. Always the last event.
    Finished(Result<EncodedGif, EncodeError>),
}

/// Handle to a background render.
pub struct EncodeJob {
    events: Receiver<EncoderEvent>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EncodeJob {
    /// Ask the workers to stop; the job finishes with [`EncodeError::Cancelled`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Block until the render finishes, forwarding progress fractions.
    pub fn wait(mut self, mut on_progress: impl FnMut(f32)) -> Result<EncodedGif, EncodeError> {
        let outcome = loop {
            match self.events.recv() {
                Ok(EncoderEvent::Progress(fraction)) => on_progress(fraction),
                Ok(EncoderEvent::Finished(result)) => break result,
                Err(_) => break Err(EncodeError::WorkerLost),
            }
        };
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                return Err(EncodeError::WorkerLost);
            }
        }
        outcome
    }
}

/// A finished GIF held in memory.
#[derive(Debug, Clone)]
pub struct EncodedGif {
    pub bytes: Vec<u8>,
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
}

impl EncodedGif {
    /// Size in kibibytes.
    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

/// Encoder failures.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("GIF dimensions {width}x{height} must be between 1 and 65535")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Encoder needs at least one worker and a speed within 1..=30")]
    InvalidSettings,
    #[error("Dithering is not supported by the quantizer")]
    DitheringUnsupported,
    #[error(
        "Frame {index} is {width}x{height}, expected {expected_width}x{expected_height}"
    )]
    FrameSize {
        index: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error("No frames to encode")]
    NoFrames,
    #[error("Failed to start encoder workers: {0}")]
    WorkerPool(String),
    #[error("Encoder worker exited without a result")]
    WorkerLost,
    #[error("Encoding cancelled")]
    Cancelled,
    #[error("GIF encoding failed: {0}")]
    Gif(#[from] gif::EncodingError),
}
