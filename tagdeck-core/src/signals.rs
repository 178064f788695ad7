//! Signal plumbing.
//!
//! Child-exit is the only signal with work to do, and that work (reaping,
//! deciding whether the scanner died) happens in ordinary control flow: the
//! handler writes one byte to a self-pipe and the control loop wakes up on
//! it. Terminate and interrupt go straight to the async-signal-safe fatal
//! path so they take effect even while the control loop is blocked on the
//! render thread.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::sync::atomic::{AtomicI32, Ordering};

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::{
    SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal, sigaction,
    sigprocmask,
};
use nix::unistd::pipe2;

use crate::fatal;

/// Write end of the self-pipe, or -1 when none is open. Read from signal
/// handler context, so it must stay a plain atomic.
static WAKE_FD: AtomicI32 = AtomicI32::new(-1);

const TERMINATION_MESSAGE: &[u8] =
    b"tagdeckd received termination signal, shutting down process group\n";

/// Self-pipe the child-exit handler writes to.
#[derive(Debug)]
pub struct SignalPipe {
    read: File,
    _write: OwnedFd,
}

impl SignalPipe {
    pub fn open() -> Result<Self, Errno> {
        let (read, write) = pipe2(OFlag::O_CLOEXEC | OFlag::O_NONBLOCK)?;
        WAKE_FD.store(write.as_raw_fd(), Ordering::SeqCst);
        Ok(Self {
            read: File::from(read),
            _write: write,
        })
    }

    /// Empties the pipe. Returns how many wake-ups were pending; several
    /// child exits may have collapsed into one byte or spread over many.
    pub fn drain(&mut self) -> io::Result<usize> {
        let mut pending = 0;
        let mut buf = [0u8; 64];
        loop {
            match self.read.read(&mut buf) {
                Ok(0) => return Ok(pending),
                Ok(count) => pending += count,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(pending);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }
}

impl AsFd for SignalPipe {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.read.as_fd()
    }
}

impl Drop for SignalPipe {
    fn drop(&mut self) {
        WAKE_FD.store(-1, Ordering::SeqCst);
    }
}

extern "C" fn on_child_exit(_signal: libc::c_int) {
    let saved = Errno::last_raw();
    let fd = WAKE_FD.load(Ordering::SeqCst);
    if fd >= 0 {
        let token = [libc::SIGCHLD as u8];
        // A full pipe already holds a pending wake-up, so a failed write
        // loses nothing.
        unsafe {
            libc::write(fd, token.as_ptr().cast(), token.len());
        }
    }
    Errno::set_raw(saved);
}

extern "C" fn on_termination(_signal: libc::c_int) {
    fatal::shutdown_signal_safe(TERMINATION_MESSAGE);
}

fn set_of(signals: &[Signal]) -> SigSet {
    let mut set = SigSet::empty();
    for signal in signals {
        set.add(*signal);
    }
    set
}

/// Signals that must not run their handlers while the fatal path is tearing
/// the process group down.
pub(crate) fn shutdown_set() -> SigSet {
    set_of(&[Signal::SIGCHLD, Signal::SIGTERM, Signal::SIGINT])
}

/// Blocks child-exit on the calling thread and returns the previous mask.
/// Must precede [`install_handlers`] and every fork that the handler needs
/// to know about.
pub fn block_child_exit() -> Result<SigSet, Errno> {
    let mut previous = SigSet::empty();
    sigprocmask(
        SigmaskHow::SIG_BLOCK,
        Some(&set_of(&[Signal::SIGCHLD])),
        Some(&mut previous),
    )?;
    Ok(previous)
}

pub fn restore_mask(previous: &SigSet) -> Result<(), Errno> {
    sigprocmask(SigmaskHow::SIG_SETMASK, Some(previous), None)
}

/// Installs the child-exit, terminate and interrupt handlers.
pub fn install_handlers() -> Result<(), Errno> {
    let child_exit = SigAction::new(
        SigHandler::Handler(on_child_exit),
        SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP,
        SigSet::empty(),
    );
    let termination = SigAction::new(
        SigHandler::Handler(on_termination),
        SaFlags::empty(),
        shutdown_set(),
    );

    // SAFETY: both handlers only call async-signal-safe functions.
    unsafe {
        sigaction(Signal::SIGCHLD, &child_exit)?;
        sigaction(Signal::SIGTERM, &termination)?;
        sigaction(Signal::SIGINT, &termination)?;
    }
    Ok(())
}

/// Blocks every blockable signal on the calling thread, returning the mask
/// to restore. Threads spawned while it is in effect inherit it and never
/// intercept process-directed signals.
pub fn block_all_on_thread() -> Result<SigSet, Errno> {
    SigSet::all().thread_swap_mask(SigmaskHow::SIG_SETMASK)
}

pub fn restore_thread_mask(previous: &SigSet) -> Result<(), Errno> {
    previous.thread_set_mask()
}
