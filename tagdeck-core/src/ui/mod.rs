//! Handshake between the supervisor and the render thread.
//!
//! The supervisor never touches a rendering primitive. It sends one
//! [`AnimationRequest`] at a time and blocks on a completion channel until
//! the render thread reports that one full cycle has been drawn. Stopping
//! joins the thread after its renderer has torn down.

mod clock;
mod render;
mod thread;

use nix::errno::Errno;
use tagdeck_model::AnimationRequest;
use thiserror::Error;

pub use clock::{AnimationClock, Sample};
pub use render::{Frame, HeadlessRenderer, RenderError, Renderer};
pub use thread::RenderThread;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("unable to mask signals around render thread creation")]
    SignalMask(#[source] Errno),

    #[error("unable to spawn render thread")]
    Spawn(#[source] std::io::Error),

    #[error("renderer failed to initialise: {0}")]
    Init(String),

    #[error("render thread exited while the supervisor was waiting on it")]
    Disconnected,

    #[error("render thread panicked")]
    Panicked,

    #[error("render thread completed {actual} while {expected} was in flight")]
    UnexpectedCompletion {
        expected: AnimationRequest,
        actual: AnimationRequest,
    },
}

/// What the orchestrator needs from the UI. Every call blocks until the
/// render thread has finished with it.
#[cfg_attr(test, mockall::automock)]
pub trait Stage {
    /// Plays one full cycle of `request`.
    fn play(&mut self, request: AnimationRequest) -> Result<(), UiError>;

    /// Stops the render thread and waits for it to exit. Later calls, and
    /// later [`Stage::play`] calls, are no-ops.
    fn stop(&mut self) -> Result<(), UiError>;
}
