use alloc::{boxed::Box, vec};
use core::fmt;

use bstr::BString;
use tracing::{debug, trace};

use crate::{CapacityExceeded, RingOptions, cursor::Cursors};

/// A fixed-size circular byte store with a transactional read side.
///
/// Bytes are appended with [`write`](Self::write) and consumed through the
/// [`WireRead`](crate::WireRead) readers. Reads are speculative until
/// [`commit_read`](Self::commit_read) releases them; until then
/// [`reset_read`](Self::reset_read) rewinds the read cursor so a half-decoded
/// frame can be retried once more bytes arrive.
///
/// One byte of storage is reserved so that a full ring never looks empty:
/// a ring of `size` bytes holds at most `size - 1` live bytes.
///
/// ```rust
/// use txring::{ByteRing, WireRead};
///
/// let mut ring = ByteRing::new(16);
/// ring.write(&[0x00, 0x2a, 0x01]).unwrap();
///
/// assert_eq!(ring.read_be_i16(), Ok(42));
/// assert!(ring.read_be_i16().is_err()); // only one byte left
/// ring.reset_read();
/// assert_eq!(ring.readable_space(), 3);
/// ```
pub struct ByteRing {
    storage: Box<[u8]>,
    cursors: Cursors,
    #[cfg(any(test, feature = "fuzzing"))]
    verify_cursors: bool,
}

impl ByteRing {
    /// Creates a ring with `size` bytes of storage, `size - 1` of them usable.
    ///
    /// # Panics
    ///
    /// Panics if `size == 0`.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_options(RingOptions {
            size,
            ..Default::default()
        })
    }

    /// Creates a ring that can hold exactly `capacity` live bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == usize::MAX`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let size = capacity
            .checked_add(1)
            .expect("ring capacity overflows usize");
        Self::new(size)
    }

    /// Creates a ring from explicit options.
    ///
    /// # Panics
    ///
    /// Panics if `options.size == 0`.
    #[must_use]
    pub fn with_options(options: RingOptions) -> Self {
        assert!(options.size > 0, "ring storage size must be at least 1");
        trace!(size = options.size, "ring allocated");
        Self {
            storage: vec![0u8; options.size].into_boxed_slice(),
            cursors: Cursors::new(options.size),
            #[cfg(any(test, feature = "fuzzing"))]
            verify_cursors: options.verify_cursors,
        }
    }

    /// Maximum number of live bytes the ring can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len() - 1
    }

    /// Bytes [`write`](Self::write) can currently accept.
    #[must_use]
    pub fn free_space(&self) -> usize {
        self.cursors.free()
    }

    /// Live bytes, including those read but not yet committed.
    ///
    /// Always equal to `capacity() - free_space()`.
    #[must_use]
    pub fn used_space(&self) -> usize {
        self.capacity() - self.free_space()
    }

    /// Bytes available to the next read.
    ///
    /// Smaller than [`used_space`](Self::used_space) by however many bytes
    /// the in-flight read transaction has already consumed.
    #[must_use]
    pub fn readable_space(&self) -> usize {
        self.cursors.readable()
    }

    /// Whether a read of `count` bytes would succeed.
    #[must_use]
    pub fn can_read_bytes(&self, count: usize) -> bool {
        count <= self.readable_space()
    }

    /// Whether a write of `count` bytes would succeed.
    #[must_use]
    pub fn can_write_bytes(&self, count: usize) -> bool {
        count <= self.free_space()
    }

    /// Whether the ring holds no live bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursors.live() == 0
    }

    /// A copy of the current cursor triple.
    #[must_use]
    pub fn cursors(&self) -> Cursors {
        self.cursors
    }

    /// Appends `bytes`, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExceeded`] without writing anything if `bytes` is
    /// longer than [`free_space`](Self::free_space).
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), CapacityExceeded> {
        let free = self.free_space();
        if bytes.len() > free {
            debug!(requested = bytes.len(), free, "ring write rejected");
            return Err(CapacityExceeded {
                requested: bytes.len(),
                free,
            });
        }

        let start = self.cursors.write();
        let first = bytes.len().min(self.storage.len() - start);
        let (head, tail) = bytes.split_at(first);
        self.storage[start..start + first].copy_from_slice(head);
        self.storage[..tail.len()].copy_from_slice(tail);

        self.cursors.advance_write(bytes.len());
        self.verify();
        Ok(())
    }

    /// Permanently consumes everything read so far.
    ///
    /// The released bytes become free space and can no longer be recovered by
    /// [`reset_read`](Self::reset_read).
    pub fn commit_read(&mut self) {
        let released = self.cursors.commit_read();
        trace!(released, "ring read committed");
        self.verify();
    }

    /// Rewinds the read cursor to the last commit point, discarding every
    /// read made since.
    pub fn reset_read(&mut self) {
        let rewound = self.cursors.reset_read();
        trace!(rewound, "ring read rolled back");
        self.verify();
    }

    /// Moves the read cursor forward by `count` bytes without copying them.
    ///
    /// Prefer [`WireRead::skip_read`](crate::WireRead::skip_read), which
    /// reports short data instead of panicking.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds [`readable_space`](Self::readable_space).
    pub fn advance_read_pos(&mut self, count: usize) {
        let readable = self.readable_space();
        assert!(
            count <= readable,
            "cannot advance read position by {count}, only {readable} readable"
        );
        self.cursors.advance_read(count);
        self.verify();
    }

    /// Copies out the bytes the in-flight read transaction has consumed, that
    /// is everything between the commit point and the read cursor.
    ///
    /// No cursor moves.
    #[must_use]
    pub fn read_again(&self) -> BString {
        let mut out = vec![0u8; self.cursors.consumed()];
        self.copy_out(self.cursors.commit(), &mut out);
        BString::from(out)
    }

    /// Drops every live byte and rewinds all cursors to the start of storage.
    pub fn clear(&mut self) {
        self.cursors.clear();
    }

    /// Copies `dst.len()` bytes starting at storage offset `start`, wrapping
    /// at the end of storage.
    pub(crate) fn copy_out(&self, start: usize, dst: &mut [u8]) {
        let first = dst.len().min(self.storage.len() - start);
        let (head, tail) = dst.split_at_mut(first);
        head.copy_from_slice(&self.storage[start..start + first]);
        tail.copy_from_slice(&self.storage[..tail.len()]);
    }

    /// Readable bytes as up to two slices in stream order.
    #[cfg_attr(not(feature = "std"), allow(dead_code))]
    pub(crate) fn readable_slices(&self) -> (&[u8], &[u8]) {
        let start = self.cursors.read();
        let readable = self.cursors.readable();
        let first = readable.min(self.storage.len() - start);
        (
            &self.storage[start..start + first],
            &self.storage[..readable - first],
        )
    }

    /// The contiguous free run that starts at the write cursor.
    #[cfg_attr(not(feature = "std"), allow(dead_code))]
    pub(crate) fn free_run_mut(&mut self) -> &mut [u8] {
        let start = self.cursors.write();
        let len = self.cursors.free().min(self.storage.len() - start);
        &mut self.storage[start..start + len]
    }

    /// Marks `count` bytes placed by [`free_run_mut`](Self::free_run_mut) as
    /// written.
    #[cfg_attr(not(feature = "std"), allow(dead_code))]
    pub(crate) fn commit_write(&mut self, count: usize) {
        self.cursors.advance_write(count);
        self.verify();
    }

    pub(crate) fn cursors_mut(&mut self) -> &mut Cursors {
        &mut self.cursors
    }

    #[inline]
    pub(crate) fn verify(&self) {
        #[cfg(any(test, feature = "fuzzing"))]
        if self.verify_cursors {
            self.cursors.check_valid();
        }
        debug_assert!(self.cursors.is_valid(), "{:?}", self.cursors);
    }
}

impl Default for ByteRing {
    fn default() -> Self {
        Self::with_options(RingOptions::default())
    }
}

impl fmt::Debug for ByteRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteRing")
            .field("capacity", &self.capacity())
            .field("cursors", &self.cursors)
            .finish_non_exhaustive()
    }
}
