//! Core data model definitions shared across tagdeck crates.
//!
//! Everything here is pure data: a scanned tag, the app it binds to, and the
//! animation the render thread is asked to play. No I/O happens in this crate
//! apart from the existence probe on [`AppBinding`].

#![allow(missing_docs)]

pub mod animation;
pub mod binding;
pub mod error;
pub mod tag;

pub use animation::AnimationRequest;
pub use binding::AppBinding;
pub use error::ModelError;
pub use tag::{FRAME_LEN, HEX_LEN, TagId};
