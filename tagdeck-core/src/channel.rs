//! Scan event channel: a one-way pipe carrying fixed 4-byte frames from the
//! scanner process to the supervisor.
//!
//! There is no framing beyond the frame size. The scanner must never close
//! its end while the supervisor runs, so end-of-file is a protocol failure
//! no matter how many bytes of the current frame have arrived.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use tagdeck_model::{FRAME_LEN, TagId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("scan pipe read failed")]
    Read(#[source] io::Error),

    #[error(
        "scan pipe write end closed prematurely ({received} of {len} bytes received)",
        len = FRAME_LEN
    )]
    Closed { received: usize },
}

/// Supervisor side of the scan pipe.
#[derive(Debug)]
pub struct ScanChannel {
    pipe: File,
}

impl ScanChannel {
    /// Creates the pipe. Returns the supervisor's read end and the write end
    /// destined for the scanner. Both ends are close-on-exec; the scanner
    /// spawn clears the flag on its own copy only.
    pub fn open() -> Result<(Self, OwnedFd), Errno> {
        let (read, write) = pipe2(OFlag::O_CLOEXEC)?;
        Ok((
            Self {
                pipe: File::from(read),
            },
            write,
        ))
    }

    /// Blocks until one full frame has arrived.
    pub fn read_event(&mut self) -> Result<TagId, ChannelError> {
        read_frame(&mut self.pipe)
    }
}

impl AsFd for ScanChannel {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.pipe.as_fd()
    }
}

/// Accumulates exactly [`FRAME_LEN`] bytes from `reader`.
///
/// Interrupted reads are restarted. Any other read error, and end-of-file
/// before the frame is complete, are returned as errors.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<TagId, ChannelError> {
    let mut frame = [0u8; FRAME_LEN];
    let mut received = 0;

    while received < FRAME_LEN {
        match reader.read(&mut frame[received..]) {
            Ok(0) => return Err(ChannelError::Closed { received }),
            Ok(count) => received += count,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(ChannelError::Read(err)),
        }
    }

    Ok(TagId::from(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Write;

    /// Replays a scripted sequence of read results.
    struct Scripted {
        steps: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Scripted {
        fn new(steps: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                steps: steps.into(),
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.pop_front() {
                None => Ok(0),
                Some(Err(err)) => Err(err),
                Some(Ok(bytes)) => {
                    assert!(bytes.len() <= buf.len(), "read past frame end");
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
            }
        }
    }

    #[test]
    fn reads_a_whole_frame() {
        let mut input: &[u8] = &[0x01, 0x02, 0x03, 0x04];
        let tag = read_frame(&mut input).unwrap();
        assert_eq!(tag.to_hex(), "01020304");
    }

    #[test]
    fn accumulates_short_reads() {
        let mut reader = Scripted::new(vec![
            Ok(vec![0xDE]),
            Ok(vec![0xAD, 0xBE]),
            Ok(vec![0xEF]),
        ]);
        assert_eq!(read_frame(&mut reader).unwrap().to_hex(), "DEADBEEF");
    }

    #[test]
    fn restarts_interrupted_reads() {
        let mut reader = Scripted::new(vec![
            Ok(vec![0x10, 0x20]),
            Err(io::ErrorKind::Interrupted.into()),
            Err(io::ErrorKind::Interrupted.into()),
            Ok(vec![0x30, 0x40]),
        ]);
        assert_eq!(read_frame(&mut reader).unwrap().to_hex(), "10203040");
    }

    #[test]
    fn eof_mid_frame_is_premature_close() {
        let mut reader = Scripted::new(vec![Ok(vec![0x01, 0x02])]);
        match read_frame(&mut reader) {
            Err(ChannelError::Closed { received }) => assert_eq!(received, 2),
            other => panic!("expected premature close, got {other:?}"),
        }
    }

    #[test]
    fn eof_before_any_byte_is_premature_close() {
        let mut input: &[u8] = &[];
        assert!(matches!(
            read_frame(&mut input),
            Err(ChannelError::Closed { received: 0 })
        ));
    }

    #[test]
    fn other_errors_are_not_retried() {
        let mut reader = Scripted::new(vec![
            Err(io::Error::from_raw_os_error(libc::EIO)),
            Ok(vec![0x01, 0x02, 0x03, 0x04]),
        ]);
        assert!(matches!(read_frame(&mut reader), Err(ChannelError::Read(_))));
    }

    #[test]
    fn frames_arrive_in_order_over_a_real_pipe() {
        let (mut channel, write) = ScanChannel::open().unwrap();
        let mut writer = File::from(write);
        writer.write_all(&[0xAA, 0xBB, 0xCC, 0xDD, 0x00, 0x11]).unwrap();
        writer.write_all(&[0x22, 0x33]).unwrap();
        drop(writer);

        assert_eq!(channel.read_event().unwrap().to_hex(), "AABBCCDD");
        assert_eq!(channel.read_event().unwrap().to_hex(), "00112233");
        assert!(matches!(
            channel.read_event(),
            Err(ChannelError::Closed { received: 0 })
        ));
    }
}
