//! Configuration for the tagdeck supervisor.
//!
//! The supervisor has no configuration file and reads no environment (other
//! than `RUST_LOG` for log verbosity). Every path and timing is a fixed
//! constant from [`constants`]; [`SupervisorArgs`] exists so a developer or
//! test harness can point the binary at a different scanner or app root
//! without rebuilding.

pub mod args;
pub mod constants;
pub mod error;
pub mod models;

pub use args::SupervisorArgs;
pub use error::ConfigError;
pub use models::{AnimationTimings, SupervisorConfig};
