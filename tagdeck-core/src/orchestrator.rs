//! Decides whether, and how, to switch the visible app.

use std::path::PathBuf;

use nix::unistd::Pid;
use tagdeck_model::{AnimationRequest, AppBinding, TagId};
use tracing::info;

use crate::error::SupervisorError;
use crate::process::AppLauncher;
use crate::ui::Stage;

/// Outcome of one [`Orchestrator::launch_app`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No app is bound to the tag; only the failure animation played.
    Rejected,
    /// A new app is running. `replaced` is the app that was signalled.
    Launched { pid: Pid, replaced: Option<Pid> },
}

/// Owns the UI stage, the launcher and the current app. One transition runs
/// at a time: `launch_app` returns only after the whole sequence is done.
#[derive(Debug)]
pub struct Orchestrator<S, L> {
    app_root: PathBuf,
    stage: S,
    launcher: L,
    current_app: Option<Pid>,
}

impl<S: Stage, L: AppLauncher> Orchestrator<S, L> {
    pub fn new(app_root: impl Into<PathBuf>, stage: S, launcher: L) -> Self {
        Self {
            app_root: app_root.into(),
            stage,
            launcher,
            current_app: None,
        }
    }

    /// Pid of the app currently on screen, if one has been launched and has
    /// not exited on its own.
    pub fn current_app(&self) -> Option<Pid> {
        self.current_app
    }

    /// Resolves `tag` and, if an app is bound to it, replaces the running
    /// app.
    ///
    /// The order is fixed: success animation, fade-out, UI stop, SIGTERM to
    /// the old app, spawn of the new one. The old app is never signalled
    /// before the UI has fully faded, and the new app is never spawned
    /// before the old one was signalled. An unbound tag plays the failure
    /// animation and changes nothing else.
    pub fn launch_app(
        &mut self,
        tag: TagId,
    ) -> Result<Transition, SupervisorError> {
        let binding = AppBinding::resolve(&self.app_root, tag);

        if !binding.exists() {
            info!(
                %tag,
                script = %binding.script().display(),
                "no app bound to tag"
            );
            self.stage.play(AnimationRequest::Failure)?;
            return Ok(Transition::Rejected);
        }

        info!(%tag, script = %binding.script().display(), "tag resolved");
        self.stage.play(AnimationRequest::Success)?;
        self.stage.play(AnimationRequest::Fadeout)?;
        self.stage.stop()?;

        let replaced = self.current_app.take();
        if let Some(old) = replaced {
            self.launcher.terminate(old)?;
        }

        let pid = self.launcher.spawn(&binding)?;
        self.current_app = Some(pid);
        Ok(Transition::Launched { pid, replaced })
    }

    /// Called by the reap loop for every collected child. Forgets the
    /// current app if it exited on its own, so its pid is never signalled
    /// after being recycled.
    pub fn child_reaped(&mut self, pid: Pid) {
        if self.current_app == Some(pid) {
            info!(%pid, "app exited");
            self.current_app = None;
        }
    }
}
