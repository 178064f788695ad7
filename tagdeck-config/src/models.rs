//! Supervisor configuration models.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_APP_ROOT, DEFAULT_FADEOUT_ANIMATION, DEFAULT_FAILURE_ANIMATION,
    DEFAULT_FRAME_INTERVAL, DEFAULT_INTERPRETER, DEFAULT_SCANNER_SCRIPT,
    DEFAULT_SUCCESS_ANIMATION,
};
use crate::error::ConfigError;

/// How long one full cycle of each transition animation lasts, and how often
/// the render thread draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTimings {
    /// Length of the "tag recognised" animation.
    pub success: Duration,
    /// Length of the "no app for this tag" animation.
    pub failure: Duration,
    /// Length of the fade to black played before the UI hands the display
    /// to the new app.
    pub fadeout: Duration,
    /// Target time between frames. The supervisor is blocked for the whole
    /// animation, so this only affects smoothness, never ordering.
    pub frame_interval: Duration,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            success: DEFAULT_SUCCESS_ANIMATION,
            failure: DEFAULT_FAILURE_ANIMATION,
            fadeout: DEFAULT_FADEOUT_ANIMATION,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

/// Everything the supervisor needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Interpreter binary the scanner script is run with.
    pub interpreter: PathBuf,
    /// Scanner script, passed to the interpreter followed by the scan pipe's
    /// write descriptor number.
    pub scanner_script: PathBuf,
    /// Root of the per-tag app directories (`<app_root>/<HEX>/<HEX>.sh`).
    pub app_root: PathBuf,
    /// Transition animation timings.
    pub animations: AnimationTimings,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            scanner_script: PathBuf::from(DEFAULT_SCANNER_SCRIPT),
            app_root: PathBuf::from(DEFAULT_APP_ROOT),
            animations: AnimationTimings::default(),
        }
    }
}

impl SupervisorConfig {
    /// Reject settings that would make the supervisor misbehave after it has
    /// already spawned children.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_absolute("interpreter", &self.interpreter)?;
        require_absolute("scanner script", &self.scanner_script)?;
        require_absolute("app root", &self.app_root)?;

        let timings = &self.animations;
        require_nonzero("success animation", timings.success)?;
        require_nonzero("failure animation", timings.failure)?;
        require_nonzero("fadeout animation", timings.fadeout)?;
        require_nonzero("frame interval", timings.frame_interval)?;

        if !self.app_root.is_dir() {
            // Not fatal: every scan will simply resolve to "no app".
            tracing::warn!(
                path = %self.app_root.display(),
                "app root does not exist; every tag will be rejected"
            );
        }

        Ok(())
    }
}

fn require_absolute(name: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::RelativePath {
            name,
            path: path.to_path_buf(),
        })
    }
}

fn require_nonzero(name: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value.is_zero() {
        Err(ConfigError::ZeroDuration { name })
    } else {
        Ok(())
    }
}
