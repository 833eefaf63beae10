//! Speculative frame decoding on top of the commit / reset cursors.
//!
//! A [`ReadTransaction`] is the only way the decoder layer needs to touch the
//! cursors: it reads through [`WireRead`], commits explicitly, and rolls back
//! on drop. [`ByteRing::try_decode`] wraps the whole attempt for types that
//! implement [`Decode`].

use alloc::vec::Vec;
use core::cell::Cell;

use tracing::trace;

use crate::{ByteRing, CapacityExceeded, Incomplete, InsufficientData, WireRead, WireWrite};

/// A frame that can be decoded from wire fields.
///
/// Reads inside `decode` may run out of data at any point; propagating the
/// [`InsufficientData`] with `?` is enough for [`ByteRing::try_decode`] to
/// roll the attempt back and report "not yet". A short read the decoder
/// handles itself (an optional trailing field, say) does not count.
pub trait Decode: Sized {
    /// Error for malformed content; must absorb short reads and say which
    /// errors came from one.
    type Error: From<InsufficientData> + Incomplete;

    /// Decodes one frame from `reader`.
    ///
    /// # Errors
    ///
    /// Whatever the frame format rejects, or a converted
    /// [`InsufficientData`] when the frame is incomplete.
    fn decode<R: WireRead + ?Sized>(reader: &mut R) -> Result<Self, Self::Error>;
}

/// A frame that can be encoded to wire fields.
pub trait Encode {
    /// Appends the encoded frame to `writer`.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if `writer` runs out of space.
    fn encode<W: WireWrite + ?Sized>(&self, writer: &mut W) -> Result<(), CapacityExceeded>;
}

/// A speculative read over a [`ByteRing`].
///
/// Dropping the transaction without calling [`commit`](Self::commit) rewinds
/// the ring's read cursor to its commit point. The rollback covers every read
/// since the last commit, including any made before the transaction began.
#[must_use = "dropping a transaction rolls it back"]
pub struct ReadTransaction<'a> {
    ring: &'a mut ByteRing,
    starved: Cell<bool>,
    committed: bool,
}

impl ReadTransaction<'_> {
    /// Makes every read of this transaction permanent.
    pub fn commit(mut self) {
        self.ring.commit_read();
        self.committed = true;
    }

    /// Discards every read of this transaction. Same as dropping it.
    pub fn rollback(self) {}

    /// Whether any read inside this transaction ran out of data, including
    /// reads whose failure the caller recovered from.
    #[must_use]
    pub fn starved(&self) -> bool {
        self.starved.get()
    }

    /// Bytes read since the ring's last commit.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.ring.used_space() - self.ring.readable_space()
    }

    fn note<T>(&self, result: Result<T, InsufficientData>) -> Result<T, InsufficientData> {
        if result.is_err() {
            self.starved.set(true);
        }
        result
    }
}

impl Drop for ReadTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.ring.reset_read();
        }
    }
}

impl WireRead for ReadTransaction<'_> {
    fn readable_space(&self) -> usize {
        self.ring.readable_space()
    }

    fn require(&self, needed: usize) -> Result<(), InsufficientData> {
        self.note(self.ring.require(needed))
    }

    fn peek_into(&self, offset: usize, dst: &mut [u8]) -> Result<(), InsufficientData> {
        self.note(self.ring.peek_into(offset, dst))
    }

    fn skip_read(&mut self, count: usize) -> Result<(), InsufficientData> {
        let result = self.ring.skip_read(count);
        self.note(result)
    }
}

impl ByteRing {
    /// Starts a speculative read.
    pub fn begin_read(&mut self) -> ReadTransaction<'_> {
        ReadTransaction {
            ring: self,
            starved: Cell::new(false),
            committed: false,
        }
    }

    /// Tries to decode one `T`.
    ///
    /// Returns `Ok(Some(frame))` and commits when the frame decodes,
    /// `Ok(None)` and rolls back when `decode` fails with an error that
    /// [`is_incomplete`](Incomplete::is_incomplete).
    ///
    /// ```rust
    /// use txring::{ByteRing, Decode, InsufficientData, WireRead};
    ///
    /// struct Ping(i32);
    ///
    /// impl Decode for Ping {
    ///     type Error = InsufficientData;
    ///
    ///     fn decode<R: WireRead + ?Sized>(r: &mut R) -> Result<Self, Self::Error> {
    ///         Ok(Ping(r.read_be_i32()?))
    ///     }
    /// }
    ///
    /// let mut ring = ByteRing::new(16);
    /// ring.write(&[0, 0]).unwrap();
    /// assert!(ring.try_decode::<Ping>().unwrap().is_none());
    /// ring.write(&[0, 7]).unwrap();
    /// assert_eq!(ring.try_decode::<Ping>().unwrap().map(|p| p.0), Some(7));
    /// assert!(ring.is_empty());
    /// ```
    ///
    /// # Errors
    ///
    /// Any error from [`Decode::decode`] that is not incomplete; the attempt
    /// is rolled back first.
    pub fn try_decode<T: Decode>(&mut self) -> Result<Option<T>, T::Error> {
        let mut tx = self.begin_read();
        match T::decode(&mut tx) {
            Ok(frame) => {
                tx.commit();
                Ok(Some(frame))
            }
            Err(err) if err.is_incomplete() => {
                trace!(readable = tx.readable_space(), "frame incomplete");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Decodes every complete `T` currently buffered, leaving a trailing
    /// partial frame in place.
    ///
    /// # Errors
    ///
    /// The first error from [`Decode::decode`] that is not incomplete. Frames decoded
    /// before it stay committed and are dropped with the error.
    pub fn decode_available<T: Decode>(&mut self) -> Result<Vec<T>, T::Error> {
        let mut frames = Vec::new();
        while let Some(frame) = self.try_decode::<T>()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Encodes `frame` and appends it in one all-or-nothing write.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if the encoded frame does not fit.
    pub fn write_frame<T: Encode + ?Sized>(&mut self, frame: &T) -> Result<(), CapacityExceeded> {
        let mut scratch = Vec::new();
        frame.encode(&mut scratch)?;
        self.write(&scratch)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec::Vec};

    use thiserror::Error;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Chat {
        channel: i16,
        text: String,
    }

    #[derive(Debug, Error, PartialEq)]
    enum ChatError {
        #[error(transparent)]
        Short(#[from] InsufficientData),
        #[error("negative channel {0}")]
        BadChannel(i16),
    }

    impl Incomplete for ChatError {
        fn is_incomplete(&self) -> bool {
            matches!(self, ChatError::Short(_))
        }
    }

    /// A tagged frame whose trailing `i32` is optional.
    #[derive(Debug, PartialEq)]
    struct Tagged {
        extra: Option<i32>,
    }

    impl Decode for Tagged {
        type Error = ChatError;

        fn decode<R: WireRead + ?Sized>(reader: &mut R) -> Result<Self, Self::Error> {
            let tag = reader.read_byte()?;
            let extra = reader.read_be_i32().ok();
            if tag != 1 {
                return Err(ChatError::BadChannel(i16::from(tag)));
            }
            Ok(Tagged { extra })
        }
    }

    impl Decode for Chat {
        type Error = ChatError;

        fn decode<R: WireRead + ?Sized>(reader: &mut R) -> Result<Self, Self::Error> {
            let channel = reader.read_be_i16()?;
            if channel < 0 {
                return Err(ChatError::BadChannel(channel));
            }
            let text = reader.read_be_utf16_string16()?;
            Ok(Chat { channel, text })
        }
    }

    impl Encode for Chat {
        fn encode<W: WireWrite + ?Sized>(&self, w: &mut W) -> Result<(), CapacityExceeded> {
            w.write_be_i16(self.channel)?;
            w.write_be_utf16_string16(&self.text)
        }
    }

    fn chat(channel: i16, text: &str) -> Chat {
        Chat {
            channel,
            text: text.into(),
        }
    }

    fn encoded(frame: &Chat) -> Vec<u8> {
        let mut out = Vec::new();
        frame.encode(&mut out).unwrap();
        out
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let mut ring = ByteRing::new(16);
        ring.write(&[1, 2, 3]).unwrap();
        {
            let mut tx = ring.begin_read();
            assert_eq!(tx.read_be_i16(), Ok(0x0102));
            assert_eq!(tx.consumed(), 2);
            assert!(!tx.starved());
        }
        assert_eq!(ring.readable_space(), 3);
    }

    #[test]
    fn committed_transaction_sticks() {
        let mut ring = ByteRing::new(16);
        ring.write(&[1, 2, 3]).unwrap();
        let mut tx = ring.begin_read();
        tx.skip_read(2).unwrap();
        tx.commit();
        ring.reset_read();
        assert_eq!(ring.read_all(), [3].as_slice());
    }

    #[test]
    fn short_read_marks_starved() {
        let mut ring = ByteRing::new(16);
        ring.write(&[1]).unwrap();
        let mut tx = ring.begin_read();
        assert!(tx.read_be_i32().is_err());
        assert!(tx.starved());
        tx.rollback();
        assert_eq!(ring.readable_space(), 1);
    }

    #[test]
    fn try_decode_waits_for_the_whole_frame() {
        let bytes = encoded(&chat(3, "hi"));
        let mut ring = ByteRing::new(32);

        for (i, byte) in bytes.iter().enumerate() {
            assert_eq!(ring.try_decode::<Chat>(), Ok(None), "after {i} bytes");
            assert_eq!(ring.readable_space(), i);
            ring.write(&[*byte]).unwrap();
        }
        assert_eq!(ring.try_decode::<Chat>(), Ok(Some(chat(3, "hi"))));
        assert!(ring.is_empty());
    }

    #[test]
    fn try_decode_propagates_content_errors_after_rollback() {
        let mut ring = ByteRing::new(32);
        ring.write_frame(&chat(-4, "x")).unwrap();
        assert_eq!(ring.try_decode::<Chat>(), Err(ChatError::BadChannel(-4)));
        assert_eq!(ring.readable_space(), 6);
    }

    #[test]
    fn recovered_short_read_does_not_hide_content_errors() {
        let mut ring = ByteRing::new(16);
        ring.write(&[9]).unwrap();
        assert_eq!(ring.try_decode::<Tagged>(), Err(ChatError::BadChannel(9)));
        assert_eq!(ring.readable_space(), 1);
        assert_eq!(
            ring.decode_available::<Tagged>(),
            Err(ChatError::BadChannel(9))
        );
    }

    #[test]
    fn optional_field_absent_still_decodes() {
        let mut ring = ByteRing::new(16);
        ring.write(&[1]).unwrap();
        assert_eq!(ring.try_decode::<Tagged>(), Ok(Some(Tagged { extra: None })));
        assert!(ring.is_empty());

        ring.write(&[1, 0, 0, 0, 5]).unwrap();
        assert_eq!(
            ring.try_decode::<Tagged>(),
            Ok(Some(Tagged { extra: Some(5) }))
        );
    }

    #[test]
    fn decode_available_leaves_partial_tail() {
        let mut ring = ByteRing::new(64);
        ring.write_frame(&chat(1, "a")).unwrap();
        ring.write_frame(&chat(2, "bc")).unwrap();
        let third = encoded(&chat(3, "def"));
        ring.write(&third[..5]).unwrap();

        let frames = ring.decode_available::<Chat>().unwrap();
        assert_eq!(frames, [chat(1, "a"), chat(2, "bc")]);
        assert_eq!(ring.readable_space(), 5);

        ring.write(&third[5..]).unwrap();
        assert_eq!(ring.decode_available::<Chat>().unwrap(), [chat(3, "def")]);
    }

    #[test]
    fn write_frame_is_all_or_nothing() {
        let mut ring = ByteRing::new(8);
        assert!(ring.write_frame(&chat(1, "toolong")).is_err());
        assert!(ring.is_empty());
    }

    #[test]
    fn decode_runs_on_plain_slices() {
        let bytes = encoded(&chat(9, "\u{1d11e}"));
        let mut reader = bytes.as_slice();
        assert_eq!(Chat::decode(&mut reader), Ok(chat(9, "\u{1d11e}")));
        assert!(reader.is_empty());
    }
}
