//! The control loop.

use std::convert::Infallible;
use std::os::fd::AsFd;
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use nix::unistd::Pid;
use tagdeck_config::SupervisorConfig;
use tracing::{debug, info};

use crate::channel::{ChannelError, ScanChannel};
use crate::error::SupervisorError;
use crate::orchestrator::{Orchestrator, Transition};
use crate::process::{self, AppLauncher, ShellLauncher};
use crate::signals::{self, SignalPipe};
use crate::ui::{RenderThread, Renderer, Stage};

/// Everything the main thread owns while running. Nothing here is touched
/// from signal handler context; the handler only writes to the self-pipe.
#[derive(Debug)]
pub struct Supervisor<S = RenderThread, L = ShellLauncher> {
    scanner: Pid,
    scan: ScanChannel,
    signals: SignalPipe,
    orchestrator: Orchestrator<S, L>,
}

/// How long a closed scan pipe waits for the scanner's exit status before
/// the close is reported as a protocol failure.
const SCANNER_EXIT_GRACE: Duration = Duration::from_millis(500);

struct Ready {
    signal: bool,
    scan: bool,
}

impl Supervisor {
    /// Runs the startup sequence: pipes, signal handlers, scanner, render
    /// thread. Child-exit stays blocked from before the handlers are
    /// installed until everything is in place, so a scanner that dies
    /// immediately is still noticed by the control loop.
    ///
    /// The caller must already lead its own process group.
    pub fn start<R>(
        config: &SupervisorConfig,
        renderer: R,
    ) -> Result<Self, SupervisorError>
    where
        R: Renderer + Send + 'static,
    {
        config.validate()?;

        let signals =
            SignalPipe::open().map_err(SupervisorError::setup("create self-pipe"))?;
        let (scan, scanner_end) = ScanChannel::open()
            .map_err(SupervisorError::setup("create scan pipe"))?;

        let previous = signals::block_child_exit()
            .map_err(SupervisorError::setup("block SIGCHLD"))?;
        signals::install_handlers()
            .map_err(SupervisorError::setup("install signal handlers"))?;

        let scanner = process::spawn_scanner(
            &config.interpreter,
            &config.scanner_script,
            scanner_end,
        )?;
        let stage = RenderThread::start(renderer, config.animations)?;

        signals::restore_mask(&previous)
            .map_err(SupervisorError::setup("unblock SIGCHLD"))?;

        Ok(Self {
            scanner,
            scan,
            signals,
            orchestrator: Orchestrator::new(
                &config.app_root,
                stage,
                ShellLauncher::default(),
            ),
        })
    }
}

impl<S: Stage, L: AppLauncher> Supervisor<S, L> {
    /// Serves scan events until something goes wrong. There is no clean
    /// exit: the only way out is an error for the fatal path.
    pub fn run(mut self) -> Result<Infallible, SupervisorError> {
        info!(scanner = %self.scanner, "supervisor running");
        loop {
            let ready = self.wait()?;

            if ready.signal {
                let pending =
                    self.signals.drain().map_err(SupervisorError::SignalPipe)?;
                debug!(pending, "child exit notification");
                for pid in process::reap_children(self.scanner)? {
                    self.orchestrator.child_reaped(pid);
                }
            }

            if ready.scan {
                let tag = match self.scan.read_event() {
                    Ok(tag) => tag,
                    Err(ChannelError::Closed { received }) => {
                        return Err(self.scan_closed(received));
                    }
                    Err(err) => return Err(err.into()),
                };
                info!(%tag, "tag scanned");
                match self.orchestrator.launch_app(tag)? {
                    Transition::Rejected => {}
                    Transition::Launched { pid, replaced } => {
                        info!(%tag, %pid, ?replaced, "transition complete");
                    }
                }
            }
        }
    }

    /// The scanner closes the pipe as it exits, before its exit status is
    /// reapable. A scanner that is gone is reported as dead; one that is
    /// still running has broken the protocol.
    fn scan_closed(&self, received: usize) -> SupervisorError {
        match process::wait_for_exit(self.scanner, SCANNER_EXIT_GRACE) {
            Ok(Some(status)) => SupervisorError::ScannerExited {
                pid: self.scanner,
                status,
            },
            Ok(None) => ChannelError::Closed { received }.into(),
            Err(err) => err,
        }
    }

    fn wait(&self) -> Result<Ready, SupervisorError> {
        loop {
            let mut fds = [
                PollFd::new(self.signals.as_fd(), PollFlags::POLLIN),
                PollFd::new(self.scan.as_fd(), PollFlags::POLLIN),
            ];
            match poll(&mut fds, PollTimeout::NONE) {
                Ok(_) => {
                    let ready = |fd: &PollFd| {
                        fd.revents().is_some_and(|events| !events.is_empty())
                    };
                    return Ok(Ready {
                        signal: ready(&fds[0]),
                        scan: ready(&fds[1]),
                    });
                }
                Err(Errno::EINTR) => continue,
                Err(source) => return Err(SupervisorError::Poll(source)),
            }
        }
    }
}
