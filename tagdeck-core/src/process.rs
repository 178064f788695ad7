//! Spawning, signalling and reaping the scanner and app processes.

use std::io;
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{Pid, getpgrp, getpid, setpgid};
use tagdeck_config::constants::APP_SHELL;
use tagdeck_model::AppBinding;
use tracing::{debug, info};

use crate::error::SupervisorError;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Makes this process the leader of a new process group unless it already
/// leads one, so the fatal broadcast reaches only this process tree.
pub fn lead_process_group() -> Result<Pid, Errno> {
    let pid = getpid();
    if getpgrp() != pid {
        setpgid(Pid::from_raw(0), Pid::from_raw(0))?;
    }
    Ok(getpgrp())
}

/// Starts `<interpreter> <script> <write-fd>`.
///
/// `write_end` is handed to the scanner and closed in this process once the
/// child exists. Launch failures in the child (missing interpreter, failed
/// exec) come back as the spawn error.
pub fn spawn_scanner(
    interpreter: &Path,
    script: &Path,
    write_end: OwnedFd,
) -> Result<Pid, SupervisorError> {
    let fd = write_end.as_raw_fd();
    let mut command = Command::new(interpreter);
    command.arg(script).arg(fd.to_string());

    // SAFETY: fcntl(2) is async-signal-safe and touches only the inherited
    // descriptor table of the forked child.
    unsafe {
        command.pre_exec(move || {
            if libc::fcntl(fd, libc::F_SETFD, 0) == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let child =
        command
            .spawn()
            .map_err(|source| SupervisorError::ScannerSpawn {
                path: interpreter.to_path_buf(),
                source,
            })?;
    drop(write_end);

    let pid = Pid::from_raw(child.id() as i32);
    info!(%pid, script = %script.display(), "scanner started");
    Ok(pid)
}

/// How the orchestrator replaces apps. Split out so the transition order can
/// be verified without forking.
#[cfg_attr(test, mockall::automock)]
pub trait AppLauncher {
    /// Asks a running app to exit. Does not wait; the reap loop collects it.
    fn terminate(&mut self, pid: Pid) -> Result<(), SupervisorError>;

    /// Starts the app described by `binding` from its own directory.
    fn spawn(&mut self, binding: &AppBinding) -> Result<Pid, SupervisorError>;
}

/// Runs app scripts through the system shell.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    shell: PathBuf,
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self {
            shell: PathBuf::from(APP_SHELL),
        }
    }
}

impl AppLauncher for ShellLauncher {
    fn terminate(&mut self, pid: Pid) -> Result<(), SupervisorError> {
        match kill(pid, Signal::SIGTERM) {
            Ok(()) => {
                info!(%pid, "sent SIGTERM to previous app");
                Ok(())
            }
            // Already exited and reaped.
            Err(Errno::ESRCH) => {
                debug!(%pid, "previous app already gone");
                Ok(())
            }
            Err(source) => Err(SupervisorError::TerminateApp { pid, source }),
        }
    }

    fn spawn(&mut self, binding: &AppBinding) -> Result<Pid, SupervisorError> {
        let child = Command::new(&self.shell)
            .arg0("sh")
            .arg(binding.script())
            .current_dir(binding.dir())
            .spawn()
            .map_err(|source| SupervisorError::AppLaunch {
                path: binding.script().to_path_buf(),
                source,
            })?;

        let pid = Pid::from_raw(child.id() as i32);
        info!(
            %pid,
            tag = %binding.tag(),
            dir = %binding.dir().display(),
            "app started"
        );
        Ok(pid)
    }
}

/// Collects every exited child without blocking.
///
/// Returns the pids reaped. The scanner exiting, for any reason, is an error;
/// so is any wait failure other than "no children left".
pub fn reap_children(scanner: Pid) -> Result<Vec<Pid>, SupervisorError> {
    let mut reaped = Vec::new();
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
            Ok(status) => {
                let Some(pid) = status.pid() else { continue };
                if pid == scanner {
                    return Err(SupervisorError::ScannerExited { pid, status });
                }
                debug!(%pid, ?status, "reaped child");
                reaped.push(pid);
            }
            Err(Errno::EINTR) => continue,
            Err(source) => return Err(SupervisorError::Reap(source)),
        }
    }
    Ok(reaped)
}

/// Reaps `pid` if it exits within `grace`, polling without blocking.
///
/// An exiting process closes its descriptors before it becomes reapable, so
/// the scan pipe reports end-of-file slightly ahead of the scanner's exit
/// status. Returns `None` if `pid` is still running once `grace` has passed.
pub fn wait_for_exit(
    pid: Pid,
    grace: Duration,
) -> Result<Option<WaitStatus>, SupervisorError> {
    let deadline = Instant::now() + grace;
    loop {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {}
            Ok(status) => return Ok(Some(status)),
            Err(Errno::EINTR) => continue,
            Err(source) => return Err(SupervisorError::Reap(source)),
        }

        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(EXIT_POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tagdeck_model::TagId;

    #[test]
    fn exited_child_is_reaped_within_grace() {
        let child = Command::new(APP_SHELL)
            .args(["-c", "exit 3"])
            .spawn()
            .unwrap();
        let pid = Pid::from_raw(child.id() as i32);

        let status = wait_for_exit(pid, Duration::from_secs(5)).unwrap();
        assert_eq!(status, Some(WaitStatus::Exited(pid, 3)));
    }

    #[test]
    fn running_child_outlives_grace() {
        let child = Command::new(APP_SHELL)
            .args(["-c", "exec sleep 30"])
            .spawn()
            .unwrap();
        let pid = Pid::from_raw(child.id() as i32);

        let started = Instant::now();
        assert_eq!(wait_for_exit(pid, Duration::from_millis(50)).unwrap(), None);
        assert!(started.elapsed() >= Duration::from_millis(50));

        kill(pid, Signal::SIGKILL).unwrap();
        assert!(matches!(
            wait_for(pid),
            WaitStatus::Signaled(_, Signal::SIGKILL, _)
        ));
    }

    fn wait_for(pid: Pid) -> WaitStatus {
        loop {
            match waitpid(pid, None) {
                Err(Errno::EINTR) => continue,
                other => return other.unwrap(),
            }
        }
    }

    #[test]
    fn app_runs_from_its_own_directory() {
        let root = tempfile::tempdir().unwrap();
        let binding = AppBinding::resolve(root.path(), TagId([1, 2, 3, 4]));
        fs::create_dir_all(binding.dir()).unwrap();
        fs::write(binding.script(), "pwd > cwd.txt\n").unwrap();

        let pid = ShellLauncher::default().spawn(&binding).unwrap();
        assert_eq!(wait_for(pid), WaitStatus::Exited(pid, 0));

        let cwd = fs::read_to_string(binding.dir().join("cwd.txt")).unwrap();
        assert_eq!(
            fs::canonicalize(cwd.trim()).unwrap(),
            fs::canonicalize(binding.dir()).unwrap()
        );
    }

    #[test]
    fn missing_app_directory_is_a_launch_error() {
        let root = tempfile::tempdir().unwrap();
        let binding = AppBinding::resolve(root.path(), TagId([9, 9, 9, 9]));
        let err = ShellLauncher::default().spawn(&binding).unwrap_err();
        assert!(matches!(err, SupervisorError::AppLaunch { .. }));
    }

    #[test]
    fn terminating_a_vanished_app_is_not_fatal() {
        let root = tempfile::tempdir().unwrap();
        let binding = AppBinding::resolve(root.path(), TagId([5, 5, 5, 5]));
        fs::create_dir_all(binding.dir()).unwrap();
        fs::write(binding.script(), "exit 0\n").unwrap();

        let mut launcher = ShellLauncher::default();
        let pid = launcher.spawn(&binding).unwrap();
        wait_for(pid);
        launcher.terminate(pid).unwrap();
    }
}
