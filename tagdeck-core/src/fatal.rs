//! The single shutdown path every failure converges on.
//!
//! Both variants do the same thing in the same order: block the signals
//! whose handlers would re-enter this path, report, send SIGTERM to the whole
//! process group, wait until every descendant has exited, and exit with
//! [`EXIT_FATAL`]. There is no way back to normal operation.

use std::error::Error;

use nix::errno::Errno;
use nix::sys::signal::{SigmaskHow, Signal, killpg, sigprocmask};
use nix::sys::wait::wait;
use nix::unistd::getpgrp;
use tracing::error;

use crate::EXIT_FATAL;
use crate::signals::shutdown_set;

/// Fatal path for ordinary control flow. Logs the error with its full
/// source chain.
pub fn shutdown(err: &dyn Error) -> ! {
    block_reentry();

    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    error!(error = %chain, "fatal error, terminating process group");

    terminate_group();
    std::process::exit(EXIT_FATAL)
}

/// Fatal path for signal handlers. Only async-signal-safe calls: no
/// allocation, no formatting, one raw `write` of a static message.
pub fn shutdown_signal_safe(message: &'static [u8]) -> ! {
    block_reentry();

    // SAFETY: write(2) and _exit(2) are async-signal-safe and `message` is
    // a static buffer.
    unsafe {
        libc::write(
            libc::STDERR_FILENO,
            message.as_ptr().cast(),
            message.len(),
        );
    }

    terminate_group();
    unsafe { libc::_exit(EXIT_FATAL) }
}

fn block_reentry() {
    let _ = sigprocmask(SigmaskHow::SIG_BLOCK, Some(&shutdown_set()), None);
}

/// Signals the whole process group, this process included (its SIGTERM stays
/// pending behind the mask), then reaps until no children remain.
fn terminate_group() {
    let _ = killpg(getpgrp(), Signal::SIGTERM);
    loop {
        match wait() {
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(_) => break,
        }
    }
}
