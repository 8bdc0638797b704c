//! Playback lifecycle state machine.
//!
//! **Architecture**: two independent asynchronous event sources - viewport
//! visibility edges and media loader outcomes - push into a single reducer
//! (`Lifecycle::handle`). The reducer owns all per-instance playback state
//! and answers with a `Command` telling the component what to do with its
//! media element. No flags live outside the phase enum, so any interleaving
//! of the two sources converges to a consistent state.
//!
//! # Phases
//!
//! - `Idle`: not in view, nothing attached
//! - `Attaching`: in view, element attached, waiting for the first frame
//! - `Ready`: first frame decoded, playing on loop
//! - `Errored`: load failed; terminal for this viewport visit
//!
//! Exit-from-view detaches eagerly from any phase. Detaching frees the
//! decoded frame buffers, not merely pausing playback - with many clips on
//! one long page this is what bounds memory. Re-entry always restarts from
//! `Attaching`; a prior error is retried implicitly by the exit/re-enter
//! cycle (scroll is the retry button).
//!
//! **Used by**: `ClipView` (wires tracker and element to the reducer)

use std::path::{Path, PathBuf};

use log::{trace, warn};

/// Playback phase of one clip instance.
///
/// `loaded` and `errored` from the data model are projections of this enum,
/// so they can never both hold at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Attaching,
    Ready,
    Errored,
}

/// Event from either async source, reduced by [`Lifecycle::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Container entered the trigger margin of the viewport.
    EnteredView,
    /// Container left the trigger margin of the viewport.
    ExitedView,
    /// The media element decoded its first frame.
    FirstFrameLoaded,
    /// The media element failed to load; message is user-visible.
    LoadFailed(String),
}

/// What the component should do with its media element after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Attach the element and start loading `source`.
    Attach,
    /// Drop the element and release its decoded buffers immediately.
    Detach,
}

/// Owner of one clip's playback state.
///
/// `source` and `poster` are immutable for the component's lifetime; the
/// poster is derived (or overridden) once at construction and never
/// recomputed. A changed source requires a new instance.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    phase: Phase,
    source: PathBuf,
    poster: PathBuf,
    last_error: Option<String>,
}

impl Lifecycle {
    /// New lifecycle in `Idle`, nothing attached.
    pub fn new(source: PathBuf, poster: PathBuf) -> Self {
        Self {
            phase: Phase::Idle,
            source,
            poster,
            last_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn poster(&self) -> &Path {
        &self.poster
    }

    /// User-visible message while `Errored`, `None` otherwise.
    pub fn error_message(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the media element should currently exist.
    pub fn is_attached(&self) -> bool {
        matches!(self.phase, Phase::Attaching | Phase::Ready)
    }

    /// Reduce one event into the state machine.
    ///
    /// Duplicate `EnteredView` events while already attached are no-ops (no
    /// re-attachment), and loader outcomes arriving after a detach are
    /// discarded - a late callback for an element that no longer exists is
    /// harmless by construction.
    pub fn handle(&mut self, event: PlaybackEvent) -> Option<Command> {
        match (self.phase, event) {
            (Phase::Idle, PlaybackEvent::EnteredView) => {
                trace!("{}: Idle -> Attaching", self.source.display());
                self.phase = Phase::Attaching;
                Some(Command::Attach)
            }
            (Phase::Idle, PlaybackEvent::ExitedView) => None,
            (_, PlaybackEvent::ExitedView) => {
                trace!("{}: {:?} -> Idle (detach)", self.source.display(), self.phase);
                self.phase = Phase::Idle;
                self.last_error = None;
                Some(Command::Detach)
            }
            (Phase::Attaching, PlaybackEvent::FirstFrameLoaded) => {
                trace!("{}: Attaching -> Ready", self.source.display());
                self.phase = Phase::Ready;
                None
            }
            (Phase::Attaching, PlaybackEvent::LoadFailed(message)) => {
                warn!("{}: load failed: {}", self.source.display(), message);
                self.phase = Phase::Errored;
                self.last_error = Some(message);
                // The resource is attached iff in view and not errored, so a
                // failed element is released right away too.
                Some(Command::Detach)
            }
            // Duplicate enters while attached or errored, and stale loader
            // outcomes outside Attaching.
            (_, event) => {
                trace!(
                    "{}: ignoring {:?} in {:?}",
                    self.source.display(),
                    event,
                    self.phase
                );
                None
            }
        }
    }
}
