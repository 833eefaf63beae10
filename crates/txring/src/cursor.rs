//! Circular cursor arithmetic for [`ByteRing`](crate::ByteRing).
//!
//! The three offsets live together in [`Cursors`] so that every update goes
//! through [`Cursors::advance`] and every consistency question is answered by
//! one helper. Distances are measured forward, modulo the storage length:
//!
//! ```text
//!  commit ──consumed──▶ read ──readable──▶ write ──free + 1──▶ commit
//! ```
//!
//! Invariants
//! - `write`, `read` and `commit` are all `< len`.
//! - `consumed + readable == live`, i.e. `read` lies on the arc from `commit`
//!   to `write` (inclusive at both ends).
//! - `live < len`: one byte is always left free, so `write == commit` means
//!   "empty" and never "full".

/// The write cursor, read cursor and commit point of a ring of `len` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursors {
    len: usize,
    write: usize,
    read: usize,
    commit: usize,
}

impl Cursors {
    /// Cursors for an empty ring whose storage is `len` bytes long.
    pub(crate) fn new(len: usize) -> Self {
        debug_assert!(len > 0);
        Self {
            len,
            write: 0,
            read: 0,
            commit: 0,
        }
    }

    /// Offset of the next byte to be written.
    #[must_use]
    pub fn write(&self) -> usize {
        self.write
    }

    /// Offset of the next byte to be read.
    #[must_use]
    pub fn read(&self) -> usize {
        self.read
    }

    /// Offset up to which bytes are permanently consumed.
    #[must_use]
    pub fn commit(&self) -> usize {
        self.commit
    }

    /// Storage length the offsets wrap around.
    #[must_use]
    pub fn storage_len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn advance(&self, pos: usize, count: usize) -> usize {
        debug_assert!(pos < self.len && count < self.len);
        let end = pos + count;
        if end >= self.len { end - self.len } else { end }
    }

    /// Forward distance from `from` to `to`.
    #[inline]
    fn distance(&self, from: usize, to: usize) -> usize {
        if to >= from {
            to - from
        } else {
            self.len - from + to
        }
    }

    /// Bytes in `[commit, write)`.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.distance(self.commit, self.write)
    }

    /// Bytes in `[read, write)`.
    #[inline]
    pub(crate) fn readable(&self) -> usize {
        self.distance(self.read, self.write)
    }

    /// Bytes in `[commit, read)`.
    #[inline]
    pub(crate) fn consumed(&self) -> usize {
        self.distance(self.commit, self.read)
    }

    /// Bytes a write may still append.
    #[inline]
    pub(crate) fn free(&self) -> usize {
        self.len - 1 - self.live()
    }

    /// Offset `offset` bytes past the read cursor.
    #[inline]
    pub(crate) fn read_at(&self, offset: usize) -> usize {
        self.advance(self.read, offset)
    }

    pub(crate) fn advance_write(&mut self, count: usize) {
        debug_assert!(count <= self.free());
        self.write = self.advance(self.write, count);
    }

    pub(crate) fn advance_read(&mut self, count: usize) {
        debug_assert!(count <= self.readable());
        self.read = self.advance(self.read, count);
    }

    /// Moves the commit point up to the read cursor, returning how many bytes
    /// were released.
    pub(crate) fn commit_read(&mut self) -> usize {
        let released = self.consumed();
        self.commit = self.read;
        released
    }

    /// Moves the read cursor back to the commit point, returning how many
    /// bytes were rewound.
    pub(crate) fn reset_read(&mut self) -> usize {
        let rewound = self.consumed();
        self.read = self.commit;
        rewound
    }

    pub(crate) fn clear(&mut self) {
        self.write = 0;
        self.read = 0;
        self.commit = 0;
    }

    /// Whether every invariant listed in the module docs holds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.write < self.len
            && self.read < self.len
            && self.commit < self.len
            && self.consumed() + self.readable() == self.live()
            && self.live() < self.len
    }

    /// Panics with the offending triple if an invariant is broken.
    #[track_caller]
    pub(crate) fn check_valid(&self) {
        assert!(self.is_valid(), "ring cursors out of order: {self:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::Cursors;

    fn at(len: usize, commit: usize, read: usize, write: usize) -> Cursors {
        Cursors {
            len,
            write,
            read,
            commit,
        }
    }

    #[test]
    fn empty_ring_has_everything_free() {
        let c = Cursors::new(8);
        assert_eq!(c.live(), 0);
        assert_eq!(c.readable(), 0);
        assert_eq!(c.free(), 7);
        assert!(c.is_valid());
    }

    #[test]
    fn distances_wrap() {
        let c = at(8, 6, 7, 2);
        assert_eq!(c.live(), 4);
        assert_eq!(c.consumed(), 1);
        assert_eq!(c.readable(), 3);
        assert_eq!(c.free(), 3);
        assert!(c.is_valid());
    }

    #[test]
    fn full_is_one_short_of_the_commit_point() {
        let c = at(8, 3, 3, 2);
        assert_eq!(c.live(), 7);
        assert_eq!(c.free(), 0);
        assert!(c.is_valid());
    }

    #[test]
    fn advance_lands_on_zero_at_the_end() {
        let c = Cursors::new(8);
        assert_eq!(c.advance(5, 3), 0);
        assert_eq!(c.advance(5, 2), 7);
        assert_eq!(c.advance(7, 7), 6);
    }

    #[test]
    fn read_past_write_is_invalid() {
        // read sits outside the commit..write arc
        assert!(!at(8, 2, 6, 4).is_valid());
        assert!(!at(8, 0, 0, 8).is_valid());
    }

    #[test]
    #[should_panic(expected = "ring cursors out of order")]
    fn check_valid_panics_on_broken_triple() {
        at(8, 2, 1, 4).check_valid();
    }

    #[test]
    fn commit_and_reset_report_moved_bytes() {
        let mut c = at(8, 6, 1, 3);
        assert_eq!(c.reset_read(), 3);
        assert_eq!(c.read(), 6);
        c.advance_read(2);
        assert_eq!(c.commit_read(), 2);
        assert_eq!(c.commit(), 0);
        assert_eq!(c.free(), 4);
    }
}
