use std::io;
use std::path::PathBuf;

use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use tagdeck_config::ConfigError;
use thiserror::Error;

use crate::channel::ChannelError;
use crate::ui::UiError;

/// Every way the supervisor can fail. None of them are recoverable: the
/// control loop returns the first one it meets and the caller hands it to
/// [`fatal::shutdown`](crate::fatal::shutdown).
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    #[error("setup failed: unable to {step}")]
    Setup {
        step: &'static str,
        #[source]
        source: Errno,
    },

    #[error("unable to spawn scanner {}", path.display())]
    ScannerSpawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("scanner (pid {pid}) died unexpectedly: {status:?}")]
    ScannerExited { pid: Pid, status: WaitStatus },

    /// A reap failed for a reason other than "no children left". This points
    /// at a logic bug rather than an environmental problem.
    #[error("internal error while reaping children")]
    Reap(#[source] Errno),

    #[error("internal error while waiting for events")]
    Poll(#[source] Errno),

    #[error("internal error while draining the signal pipe")]
    SignalPipe(#[source] io::Error),

    #[error("unable to launch app {}", path.display())]
    AppLaunch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to terminate app (pid {pid})")]
    TerminateApp {
        pid: Pid,
        #[source]
        source: Errno,
    },

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Ui(#[from] UiError),
}

impl SupervisorError {
    pub(crate) fn setup(step: &'static str) -> impl FnOnce(Errno) -> Self {
        move |source| SupervisorError::Setup { step, source }
    }
}
