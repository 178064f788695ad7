//! Configuration validation errors.

use std::path::PathBuf;

use thiserror::Error;

/// Rejections from [`SupervisorConfig::validate`].
///
/// [`SupervisorConfig::validate`]: crate::SupervisorConfig::validate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Paths handed to child processes must not depend on the supervisor's
    /// working directory.
    #[error("{name} must be an absolute path, got {}", path.display())]
    RelativePath {
        /// Which setting was rejected.
        name: &'static str,
        /// The offending value.
        path: PathBuf,
    },
    /// A zero-length animation would complete before a single frame is drawn.
    #[error("{name} must be longer than zero")]
    ZeroDuration {
        /// Which setting was rejected.
        name: &'static str,
    },
}
