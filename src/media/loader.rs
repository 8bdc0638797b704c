//! Background clip loader and the media element it feeds.
//!
//! Each attachment spawns one named loader thread that decodes the source
//! with the `image` crate and reports over a channel:
//!
//! - `FirstFrame` as soon as frame zero is decoded (ends the skeleton)
//! - `Complete` with the full frame list
//! - `Failed` with a user-visible message on any open/decode error
//!
//! Detaching drops the element: the receiver closes, a cancel flag is
//! raised, and the decoded frames are freed. The loader observes the flag
//! between frames and bails out; anything it already sent is simply never
//! received. Late outcomes for a detached element are therefore harmless by
//! construction - there is no one left to deliver them to.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, RgbaImage};
use log::{debug, info, trace};

use crate::core::lifecycle::PlaybackEvent;
use crate::media::clip::{Clip, ClipError, ClipFrame, DEFAULT_FRAME_DELAY, Playhead};

/// Message from the loader thread to the owning element.
#[derive(Debug)]
pub enum LoaderMsg {
    /// Frame zero, delivered eagerly while the rest still decodes.
    FirstFrame(ClipFrame),
    /// All frames, including frame zero.
    Complete(Clip),
    /// Open/decode failure; message is user-visible.
    Failed(String),
}

/// An attached media element: one loader thread, one channel, the decoded
/// frames, and the playback clock.
///
/// Exists only while the lifecycle is `Attaching` or `Ready`; dropping it is
/// the resource-release guarantee.
#[derive(Debug)]
pub struct ClipElement {
    rx: Receiver<LoaderMsg>,
    cancel: Arc<AtomicBool>,
    source: PathBuf,
    clip: Option<Clip>,
    playhead: Playhead,
}

impl ClipElement {
    /// Attach to a source and start loading in the background.
    pub fn attach(source: &Path) -> Self {
        let (tx, rx) = unbounded();
        let cancel = Arc::new(AtomicBool::new(false));

        info!("attaching media element: {}", source.display());
        let thread_source = source.to_path_buf();
        let thread_cancel = Arc::clone(&cancel);
        thread::Builder::new()
            .name("clipview-loader".to_string())
            .spawn(move || {
                trace!("loader started: {}", thread_source.display());
                if let Err(err) = decode_clip(&thread_source, &tx, &thread_cancel) {
                    let _ = tx.send(LoaderMsg::Failed(err.to_string()));
                }
                trace!("loader finished: {}", thread_source.display());
            })
            .expect("Failed to spawn loader thread");

        Self {
            rx,
            cancel,
            source: source.to_path_buf(),
            clip: None,
            playhead: Playhead::new(),
        }
    }

    /// Drain loader messages. Non-blocking; call once per paint pass.
    ///
    /// Returns the lifecycle events the messages translate to.
    pub fn poll(&mut self) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(LoaderMsg::FirstFrame(frame)) => {
                    debug!("first frame ready: {}", self.source.display());
                    self.clip = Some(Clip {
                        frames: vec![frame],
                    });
                    events.push(PlaybackEvent::FirstFrameLoaded);
                }
                Ok(LoaderMsg::Complete(clip)) => {
                    debug!(
                        "clip complete: {} ({} frames)",
                        self.source.display(),
                        clip.frame_count()
                    );
                    self.clip = Some(clip);
                }
                Ok(LoaderMsg::Failed(message)) => {
                    self.clip = None;
                    events.push(PlaybackEvent::LoadFailed(message));
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Advance the playback clock. Returns true if the visible frame changed.
    pub fn tick(&mut self) -> bool {
        match &self.clip {
            Some(clip) => self.playhead.tick(clip),
            None => false,
        }
    }

    /// Currently visible frame, if the first frame has arrived.
    pub fn current_frame(&self) -> Option<(usize, &ClipFrame)> {
        let clip = self.clip.as_ref()?;
        let index = self.playhead.current(clip);
        clip.frames.get(index).map(|frame| (index, frame))
    }

    /// Delay until the next frame is due (drives repaint scheduling).
    pub fn current_delay(&self) -> std::time::Duration {
        self.clip
            .as_ref()
            .map(|clip| self.playhead.current_delay(clip))
            .unwrap_or(DEFAULT_FRAME_DELAY)
    }

    pub fn frame_count(&self) -> usize {
        self.clip.as_ref().map(Clip::frame_count).unwrap_or(0)
    }

    /// Pixel dimensions once known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.clip.as_ref().and_then(Clip::dimensions)
    }
}

impl Drop for ClipElement {
    fn drop(&mut self) {
        // Receiver closes with self; the flag lets an in-flight decode stop
        // between frames instead of finishing into a dead channel.
        self.cancel.store(true, Ordering::Relaxed);
        info!("detached media element: {}", self.source.display());
    }
}

/// One-shot background poster decode.
///
/// Posters are the lazy placeholder, so they are wanted in every phase,
/// including `Idle` - but never at the cost of a paint-pass hitch. The
/// decode runs on its own short-lived thread; a missing or undecodable
/// poster is not an error, just no fallback art.
#[derive(Debug)]
pub struct PosterLoader {
    rx: Receiver<Option<RgbaImage>>,
}

impl PosterLoader {
    pub fn load(poster: &Path) -> Self {
        let (tx, rx) = unbounded();
        let path = poster.to_path_buf();
        thread::Builder::new()
            .name("clipview-poster".to_string())
            .spawn(move || {
                let image = match image::open(&path) {
                    Ok(img) => Some(img.to_rgba8()),
                    Err(err) => {
                        debug!("no poster at {}: {}", path.display(), err);
                        None
                    }
                };
                let _ = tx.send(image);
            })
            .expect("Failed to spawn poster thread");
        Self { rx }
    }

    /// Non-blocking; `Some(outcome)` once the decode finished.
    pub fn poll(&self) -> Option<Option<RgbaImage>> {
        self.rx.try_recv().ok()
    }
}

fn open_reader(source: &Path) -> Result<BufReader<File>, ClipError> {
    let file = File::open(source)
        .map_err(|e| ClipError::Open(format!("{}: {}", source.display(), e)))?;
    Ok(BufReader::new(file))
}

fn decode_clip(
    source: &Path,
    tx: &Sender<LoaderMsg>,
    cancel: &AtomicBool,
) -> Result<(), ClipError> {
    let ext = source
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "gif" => {
            let decoder = GifDecoder::new(open_reader(source)?)
                .map_err(|e| ClipError::Decode(e.to_string()))?;
            collect_animated(decoder.into_frames(), tx, cancel)
        }
        "webp" => {
            let decoder = WebPDecoder::new(open_reader(source)?)
                .map_err(|e| ClipError::Decode(e.to_string()))?;
            if decoder.has_animation() {
                collect_animated(decoder.into_frames(), tx, cancel)
            } else {
                let image = DynamicImage::from_decoder(decoder)
                    .map_err(|e| ClipError::Decode(e.to_string()))?;
                send_still(image.to_rgba8(), tx)
            }
        }
        "png" | "apng" => {
            let decoder = PngDecoder::new(open_reader(source)?)
                .map_err(|e| ClipError::Decode(e.to_string()))?;
            if decoder
                .is_apng()
                .map_err(|e| ClipError::Decode(e.to_string()))?
            {
                let apng = decoder
                    .apng()
                    .map_err(|e| ClipError::Decode(e.to_string()))?;
                collect_animated(apng.into_frames(), tx, cancel)
            } else {
                let image = DynamicImage::from_decoder(decoder)
                    .map_err(|e| ClipError::Decode(e.to_string()))?;
                send_still(image.to_rgba8(), tx)
            }
        }
        // True video containers need a video decoder; out of scope here.
        "mp4" | "mov" | "webm" | "mkv" | "avi" => Err(ClipError::UnsupportedFormat(format!(
            "{} is a video container; re-encode the clip as gif/webp/apng",
            ext
        ))),
        _ => {
            // Any other decodable still image becomes a single-frame clip
            let format = image::ImageFormat::from_path(source).map_err(|_| {
                ClipError::UnsupportedFormat(format!(
                    "unrecognized clip format: {}",
                    source.display()
                ))
            })?;
            let image = image::load(open_reader(source)?, format)
                .map_err(|e| ClipError::Decode(e.to_string()))?;
            send_still(image.to_rgba8(), tx)
        }
    }
}

/// Decode an animation frame by frame, delivering frame zero eagerly.
fn collect_animated(
    frames: image::Frames<'_>,
    tx: &Sender<LoaderMsg>,
    cancel: &AtomicBool,
) -> Result<(), ClipError> {
    let mut decoded: Vec<ClipFrame> = Vec::new();

    for frame in frames {
        if cancel.load(Ordering::Relaxed) {
            trace!("loader cancelled mid-decode, discarding {} frames", decoded.len());
            return Ok(());
        }

        let frame = frame.map_err(|e| ClipError::Decode(e.to_string()))?;
        let (numer, denom) = frame.delay().numer_denom_ms();
        let delay_ms = if denom == 0 { 0 } else { numer / denom };
        let clip_frame = ClipFrame::new(
            frame.into_buffer(),
            std::time::Duration::from_millis(u64::from(delay_ms)),
        );

        if decoded.is_empty() {
            let _ = tx.send(LoaderMsg::FirstFrame(clip_frame.clone()));
        }
        decoded.push(clip_frame);
    }

    if decoded.is_empty() {
        return Err(ClipError::Decode("clip contains no frames".to_string()));
    }
    let _ = tx.send(LoaderMsg::Complete(Clip { frames: decoded }));
    Ok(())
}

/// Deliver a still image as a single-frame clip.
fn send_still(image: RgbaImage, tx: &Sender<LoaderMsg>) -> Result<(), ClipError> {
    let frame = ClipFrame::new(image, DEFAULT_FRAME_DELAY);
    let _ = tx.send(LoaderMsg::FirstFrame(frame.clone()));
    let _ = tx.send(LoaderMsg::Complete(Clip {
        frames: vec![frame],
    }));
    Ok(())
}
