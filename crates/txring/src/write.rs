//! Typed writers, the mirror image of [`WireRead`](crate::WireRead).
//!
//! A field that is made of several parts (a length prefix and a payload) is
//! checked against the free space as a whole before any part is appended, so
//! every writer is all-or-nothing.

use alloc::vec::Vec;

use crate::{ByteRing, CapacityExceeded, utf16};

/// A sink for wire bytes with a bounded amount of free space.
///
/// Implemented by [`ByteRing`] and by `Vec<u8>` (which never runs out), so an
/// [`Encode`](crate::Encode) impl can build a frame in scratch memory or
/// straight into a ring.
pub trait WireWrite {
    /// Bytes that can currently be appended.
    fn free_space(&self) -> usize;

    /// Appends `bytes`, all or nothing.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if `bytes` does not fit; nothing is written.
    fn write_buf(&mut self, bytes: &[u8]) -> Result<(), CapacityExceeded>;

    /// Fails unless `needed` bytes can be appended.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] describing the shortfall.
    fn reserve(&self, needed: usize) -> Result<(), CapacityExceeded> {
        let free = self.free_space();
        if needed > free {
            return Err(CapacityExceeded {
                requested: needed,
                free,
            });
        }
        Ok(())
    }

    /// Whether a write of `count` bytes would succeed.
    fn can_write_bytes(&self, count: usize) -> bool {
        count <= self.free_space()
    }

    /// Writes one signed byte.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if the sink is full.
    fn write_char(&mut self, value: i8) -> Result<(), CapacityExceeded> {
        self.write_buf(&value.to_be_bytes())
    }

    /// Writes one unsigned byte.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if the sink is full.
    fn write_byte(&mut self, value: u8) -> Result<(), CapacityExceeded> {
        self.write_buf(&[value])
    }

    /// Writes `1` for `true` and `0` for `false`.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if the sink is full.
    fn write_bool(&mut self, value: bool) -> Result<(), CapacityExceeded> {
        self.write_byte(u8::from(value))
    }

    /// Writes a big-endian `i16`.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if fewer than 2 bytes are free.
    fn write_be_i16(&mut self, value: i16) -> Result<(), CapacityExceeded> {
        self.write_buf(&value.to_be_bytes())
    }

    /// Writes a big-endian `u16`.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if fewer than 2 bytes are free.
    fn write_be_u16(&mut self, value: u16) -> Result<(), CapacityExceeded> {
        self.write_buf(&value.to_be_bytes())
    }

    /// Writes a big-endian `i32`.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if fewer than 4 bytes are free.
    fn write_be_i32(&mut self, value: i32) -> Result<(), CapacityExceeded> {
        self.write_buf(&value.to_be_bytes())
    }

    /// Writes a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if fewer than 4 bytes are free.
    fn write_be_u32(&mut self, value: u32) -> Result<(), CapacityExceeded> {
        self.write_buf(&value.to_be_bytes())
    }

    /// Writes a big-endian `i64`.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if fewer than 8 bytes are free.
    fn write_be_i64(&mut self, value: i64) -> Result<(), CapacityExceeded> {
        self.write_buf(&value.to_be_bytes())
    }

    /// Writes a big-endian IEEE 754 `f32`.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if fewer than 4 bytes are free.
    fn write_be_f32(&mut self, value: f32) -> Result<(), CapacityExceeded> {
        self.write_buf(&value.to_be_bytes())
    }

    /// Writes a big-endian IEEE 754 `f64`.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if fewer than 8 bytes are free.
    fn write_be_f64(&mut self, value: f64) -> Result<(), CapacityExceeded> {
        self.write_buf(&value.to_be_bytes())
    }

    /// Writes an unsigned VarInt.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if the encoding does not fit.
    fn write_var_u32(&mut self, value: u32) -> Result<(), CapacityExceeded> {
        let mut buf = [0u8; 5];
        let len = encode_var_u32(value, &mut buf);
        self.write_buf(&buf[..len])
    }

    /// Writes the bits of `value` as an unsigned VarInt.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if the encoding does not fit.
    #[allow(clippy::cast_sign_loss)]
    fn write_var_i32(&mut self, value: i32) -> Result<(), CapacityExceeded> {
        self.write_var_u32(value as u32)
    }

    /// Writes a VarInt byte length followed by `bytes`.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if prefix and payload together do not fit;
    /// nothing is written.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is longer than `u32::MAX`.
    fn write_var_utf8_string(&mut self, bytes: &[u8]) -> Result<(), CapacityExceeded> {
        let len = u32::try_from(bytes.len()).expect("string longer than u32::MAX bytes");
        let mut prefix = [0u8; 5];
        let prefix_len = encode_var_u32(len, &mut prefix);
        self.reserve(prefix_len + bytes.len())?;
        self.write_buf(&prefix[..prefix_len])?;
        self.write_buf(bytes)
    }

    /// Writes `text` as a big-endian `u16` code unit count followed by the
    /// big-endian UTF-16 code units.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`] if the encoded string does not fit; nothing is
    /// written.
    ///
    /// # Panics
    ///
    /// Panics if `text` encodes to more than `u16::MAX` code units.
    fn write_be_utf16_string16(&mut self, text: &str) -> Result<(), CapacityExceeded> {
        let units = u16::try_from(utf16::encoded_units(text))
            .expect("string longer than u16::MAX UTF-16 code units");
        self.reserve(2 + usize::from(units) * 2)?;

        let mut raw = Vec::with_capacity(2 + usize::from(units) * 2);
        raw.extend_from_slice(&units.to_be_bytes());
        utf16::encode_be(text, &mut raw);
        self.write_buf(&raw)
    }
}

/// Encodes `value` into `buf` as 7-bit groups, least significant first,
/// returning the number of bytes used.
fn encode_var_u32(mut value: u32, buf: &mut [u8; 5]) -> usize {
    let mut len = 0;
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let group = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf[len] = group;
            return len + 1;
        }
        buf[len] = group | 0x80;
        len += 1;
    }
}

impl WireWrite for ByteRing {
    fn free_space(&self) -> usize {
        ByteRing::free_space(self)
    }

    fn write_buf(&mut self, bytes: &[u8]) -> Result<(), CapacityExceeded> {
        self.write(bytes)
    }
}

impl WireWrite for Vec<u8> {
    fn free_space(&self) -> usize {
        isize::MAX.unsigned_abs() - self.len()
    }

    fn write_buf(&mut self, bytes: &[u8]) -> Result<(), CapacityExceeded> {
        WireWrite::reserve(self, bytes.len())?;
        self.extend_from_slice(bytes);
        Ok(())
    }
}
