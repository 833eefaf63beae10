//! Typed readers for big-endian wire fields.
//!
//! [`WireRead`] needs three primitives (how much is readable, a
//! non-consuming copy, and a checked skip) and builds every field reader on
//! top of them. Each reader checks that the *whole* field is readable before
//! it consumes anything, so a failed read never moves a cursor, including the
//! length-prefixed readers whose prefix alone would have fit.

use alloc::{string::String, vec};

use bstr::BString;

use crate::{ByteRing, InsufficientData, utf16};

/// Most bytes a VarInt can use to carry 32 bits.
const VAR_INT_MAX_BYTES: usize = 5;

/// A source of wire bytes that can be decoded field by field.
///
/// Implemented by [`ByteRing`], by [`ReadTransaction`](crate::ReadTransaction)
/// and by plain byte slices, so a [`Decode`](crate::Decode) impl runs
/// unchanged against any of them.
pub trait WireRead {
    /// Bytes available to the next read.
    fn readable_space(&self) -> usize;

    /// Copies `dst.len()` bytes starting `offset` bytes past the read cursor,
    /// without consuming anything.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than `offset + dst.len()` bytes are
    /// readable.
    fn peek_into(&self, offset: usize, dst: &mut [u8]) -> Result<(), InsufficientData>;

    /// Consumes `count` bytes without copying them.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than `count` bytes are readable; nothing
    /// is consumed.
    fn skip_read(&mut self, count: usize) -> Result<(), InsufficientData>;

    /// Fails unless at least `needed` bytes are readable.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] describing the shortfall.
    fn require(&self, needed: usize) -> Result<(), InsufficientData> {
        let available = self.readable_space();
        if needed > available {
            return Err(InsufficientData { needed, available });
        }
        Ok(())
    }

    /// Whether a read of `count` bytes would succeed.
    fn can_read_bytes(&self, count: usize) -> bool {
        count <= self.readable_space()
    }

    /// Fills `dst` from the stream.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if `dst` is longer than what is readable.
    fn read_buf(&mut self, dst: &mut [u8]) -> Result<(), InsufficientData> {
        self.peek_into(0, dst)?;
        self.skip_read(dst.len())
    }

    /// Reads exactly `N` bytes.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than `N` bytes are readable.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], InsufficientData> {
        let mut buf = [0u8; N];
        self.read_buf(&mut buf)?;
        Ok(buf)
    }

    /// Reads one signed byte.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if the stream is drained.
    fn read_char(&mut self) -> Result<i8, InsufficientData> {
        self.read_array().map(i8::from_be_bytes)
    }

    /// Reads one unsigned byte.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if the stream is drained.
    fn read_byte(&mut self) -> Result<u8, InsufficientData> {
        self.read_array().map(u8::from_be_bytes)
    }

    /// Reads one byte; any non-zero value is `true`.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if the stream is drained.
    fn read_bool(&mut self) -> Result<bool, InsufficientData> {
        self.read_byte().map(|b| b != 0)
    }

    /// Reads a big-endian `i16`.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than 2 bytes are readable.
    fn read_be_i16(&mut self) -> Result<i16, InsufficientData> {
        self.read_array().map(i16::from_be_bytes)
    }

    /// Reads a big-endian `u16`.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than 2 bytes are readable.
    fn read_be_u16(&mut self) -> Result<u16, InsufficientData> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// Reads a big-endian `i32`.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than 4 bytes are readable.
    fn read_be_i32(&mut self) -> Result<i32, InsufficientData> {
        self.read_array().map(i32::from_be_bytes)
    }

    /// Reads a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than 4 bytes are readable.
    fn read_be_u32(&mut self) -> Result<u32, InsufficientData> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Reads a big-endian `i64`.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than 8 bytes are readable.
    fn read_be_i64(&mut self) -> Result<i64, InsufficientData> {
        self.read_array().map(i64::from_be_bytes)
    }

    /// Reads a big-endian IEEE 754 `f32`.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than 4 bytes are readable.
    fn read_be_f32(&mut self) -> Result<f32, InsufficientData> {
        self.read_array().map(f32::from_be_bytes)
    }

    /// Reads a big-endian IEEE 754 `f64`.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than 8 bytes are readable.
    fn read_be_f64(&mut self) -> Result<f64, InsufficientData> {
        self.read_array().map(f64::from_be_bytes)
    }

    /// Reads `count` raw bytes.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than `count` bytes are readable.
    fn read_string(&mut self, count: usize) -> Result<BString, InsufficientData> {
        self.require(count)?;
        let mut out = vec![0u8; count];
        self.read_buf(&mut out)?;
        Ok(BString::from(out))
    }

    /// Reads `units` big-endian UTF-16 code units and transcodes them to
    /// UTF-8. Unpaired surrogates become U+FFFD.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if fewer than `2 * units` bytes are readable.
    fn read_utf16_string(&mut self, units: usize) -> Result<String, InsufficientData> {
        let raw = self.read_string(units.saturating_mul(2))?;
        Ok(utf16::decode_be(&raw))
    }

    /// Reads a string sent as a big-endian `u16` code unit count followed by
    /// that many big-endian UTF-16 code units.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if the prefix or the payload is incomplete; in
    /// either case nothing, not even the prefix, is consumed.
    fn read_be_utf16_string16(&mut self) -> Result<String, InsufficientData> {
        let mut prefix = [0u8; 2];
        self.peek_into(0, &mut prefix)?;
        let units = usize::from(u16::from_be_bytes(prefix));
        self.require(2 + units * 2)?;
        self.skip_read(2)?;
        self.read_utf16_string(units)
    }

    /// Decodes the VarInt that starts `offset` bytes past the read cursor,
    /// returning its value and encoded length without consuming it.
    ///
    /// Groups past the fifth still count towards the length but their bits
    /// are discarded.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if the stream ends before a byte without the
    /// continuation bit.
    fn peek_var_u32(&self, offset: usize) -> Result<(u32, usize), InsufficientData> {
        let mut value = 0u32;
        let mut len = 0;
        loop {
            let mut byte = [0u8];
            self.peek_into(offset + len, &mut byte)?;
            let [byte] = byte;
            if len < VAR_INT_MAX_BYTES {
                value |= u32::from(byte & 0x7f) << (7 * len);
            }
            len += 1;
            if byte & 0x80 == 0 {
                return Ok((value, len));
            }
        }
    }

    /// Reads an unsigned VarInt.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if the VarInt is incomplete; nothing is consumed.
    fn read_var_u32(&mut self) -> Result<u32, InsufficientData> {
        let (value, len) = self.peek_var_u32(0)?;
        self.skip_read(len)?;
        Ok(value)
    }

    /// Reads a VarInt and reinterprets its bits as a signed integer.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if the VarInt is incomplete; nothing is consumed.
    #[allow(clippy::cast_possible_wrap)]
    fn read_var_i32(&mut self) -> Result<i32, InsufficientData> {
        self.read_var_u32().map(|v| v as i32)
    }

    /// Reads a VarInt byte length followed by that many raw bytes. The bytes
    /// are expected to be UTF-8 but are not validated here.
    ///
    /// # Errors
    ///
    /// [`InsufficientData`] if the length or the payload is incomplete;
    /// nothing is consumed.
    fn read_var_utf8_string(&mut self) -> Result<BString, InsufficientData> {
        let (len, prefix) = self.peek_var_u32(0)?;
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        self.require(prefix.saturating_add(len))?;
        self.skip_read(prefix)?;
        self.read_string(len)
    }

    /// Drains every readable byte.
    fn read_all(&mut self) -> BString {
        let count = self.readable_space();
        self.read_string(count).unwrap_or_default()
    }
}

impl WireRead for ByteRing {
    fn readable_space(&self) -> usize {
        ByteRing::readable_space(self)
    }

    fn peek_into(&self, offset: usize, dst: &mut [u8]) -> Result<(), InsufficientData> {
        self.require(offset.saturating_add(dst.len()))?;
        self.copy_out(self.cursors().read_at(offset), dst);
        Ok(())
    }

    fn skip_read(&mut self, count: usize) -> Result<(), InsufficientData> {
        self.require(count)?;
        self.cursors_mut().advance_read(count);
        self.verify();
        Ok(())
    }
}

/// Reading from a slice consumes it from the front; there is nothing to roll
/// back to.
impl WireRead for &[u8] {
    fn readable_space(&self) -> usize {
        self.len()
    }

    fn peek_into(&self, offset: usize, dst: &mut [u8]) -> Result<(), InsufficientData> {
        self.require(offset.saturating_add(dst.len()))?;
        dst.copy_from_slice(&self[offset..offset + dst.len()]);
        Ok(())
    }

    fn skip_read(&mut self, count: usize) -> Result<(), InsufficientData> {
        self.require(count)?;
        *self = &self[count..];
        Ok(())
    }
}
