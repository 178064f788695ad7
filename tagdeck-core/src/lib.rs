//! Supervisor core for the tagdeck kiosk.
//!
//! The supervisor owns two child processes (the tag scanner and the active
//! app) and one render thread. Scan events arrive on a fixed-frame pipe
//! ([`channel`]), each one drives a transition ([`orchestrator`]) that blocks
//! on the render thread ([`ui`]) before the old app is signalled and the new
//! one spawned ([`process`]). Every unexpected condition ends in
//! [`fatal::shutdown`], which takes the whole process group down with it.

#![allow(missing_docs)]

pub mod channel;
pub mod error;
pub mod fatal;
pub mod orchestrator;
pub mod process;
pub mod signals;
pub mod supervisor;
pub mod ui;

pub use channel::{ChannelError, ScanChannel};
pub use error::SupervisorError;
pub use orchestrator::{Orchestrator, Transition};
pub use supervisor::Supervisor;
pub use ui::{HeadlessRenderer, RenderThread, Renderer, Stage, UiError};

/// Process exit status used by every fatal path.
pub const EXIT_FATAL: i32 = 1;
