//! `std::io` glue for the transport side of a [`ByteRing`].
//!
//! A full ring surfaces as [`io::ErrorKind::WouldBlock`] with the
//! [`CapacityExceeded`] as its inner error, which is what a non-blocking
//! socket loop already treats as "stop reading for now".

use std::io;

use tracing::{debug, warn};

use crate::{ByteRing, CapacityExceeded};

fn would_block(requested: usize) -> io::Error {
    debug!(requested, "ring full, pausing transport");
    io::Error::new(
        io::ErrorKind::WouldBlock,
        CapacityExceeded { requested, free: 0 },
    )
}

impl ByteRing {
    /// Reads from `src` straight into free storage with a single `read` call
    /// and returns how many bytes arrived. `Ok(0)` means `src` reached end of
    /// stream.
    ///
    /// Only the contiguous free run at the write cursor is offered to `src`,
    /// so a call right before the end of storage may return fewer bytes than
    /// [`free_space`](Self::free_space); call again to fill the rest.
    ///
    /// # Errors
    ///
    /// [`io::ErrorKind::WouldBlock`] if the ring is full,
    /// [`io::ErrorKind::InvalidData`] if `src` claims to have read more bytes
    /// than it was offered (nothing is committed), otherwise whatever `src`
    /// returns.
    pub fn fill_from<R: io::Read + ?Sized>(&mut self, src: &mut R) -> io::Result<usize> {
        let run = self.free_run_mut();
        if run.is_empty() {
            return Err(would_block(1));
        }
        let offered = run.len();
        let count = src.read(run)?;
        if count > offered {
            warn!(count, offered, "reader overreported its read");
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "reader returned more bytes than the buffer holds",
            ));
        }
        self.commit_write(count);
        Ok(count)
    }

    /// Writes every live byte to `dst` and commits what was written.
    ///
    /// This is the outbound path. A speculative read still in flight is
    /// rewound first, so bytes it consumed are sent rather than silently
    /// committed.
    ///
    /// # Errors
    ///
    /// Whatever `dst` returns. Bytes written before the error stay committed.
    pub fn drain_into<W: io::Write + ?Sized>(&mut self, dst: &mut W) -> io::Result<usize> {
        if self.readable_space() != self.used_space() {
            debug!(
                rewound = self.used_space() - self.readable_space(),
                "drain_into rewinding an uncommitted read"
            );
            self.reset_read();
        }
        let mut drained = 0;
        while self.readable_space() > 0 {
            let (head, _) = self.readable_slices();
            let written = match dst.write(head) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) if n > head.len() => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "writer accepted more bytes than it was given",
                    ));
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.advance_read_pos(written);
            self.commit_read();
            drained += written;
        }
        Ok(drained)
    }
}

/// Accepts as much of each buffer as fits, like a socket send buffer.
impl io::Write for ByteRing {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let count = buf.len().min(self.free_space());
        if count == 0 {
            return Err(would_block(buf.len()));
        }
        ByteRing::write(self, &buf[..count]).map_err(io::Error::other)?;
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
