use thiserror::Error;

/// A read asked for more bytes than are currently readable.
///
/// This is the normal outcome of decoding a frame that has only partially
/// arrived. Returning it never moves a cursor, so the caller can roll back and
/// retry once more bytes have been written.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("insufficient data: needed {needed} bytes, {available} readable")]
pub struct InsufficientData {
    /// Bytes the read required.
    pub needed: usize,
    /// Bytes that were readable when the read was attempted.
    pub available: usize,
}

/// A write did not fit into the free space of the ring.
///
/// Nothing was written. The producer is outrunning the consumer (or the frame
/// is larger than the ring) and must apply backpressure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("capacity exceeded: requested {requested} bytes, {free} free")]
pub struct CapacityExceeded {
    /// Bytes the write tried to append.
    pub requested: usize,
    /// Free bytes when the write was attempted.
    pub free: usize,
}

/// Either failure a ring operation can report.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// See [`InsufficientData`].
    #[error(transparent)]
    InsufficientData(#[from] InsufficientData),
    /// See [`CapacityExceeded`].
    #[error(transparent)]
    CapacityExceeded(#[from] CapacityExceeded),
}

impl RingError {
    /// Whether this error only means "try again after more bytes arrive".
    #[must_use]
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, RingError::InsufficientData(_))
    }
}

/// Tells a frame that has not fully arrived apart from a malformed one.
///
/// [`ByteRing::try_decode`](crate::ByteRing::try_decode) asks the error a
/// decoder returned, not whether some read along the way ran short, so a
/// decoder may probe optional fields and still report content errors.
pub trait Incomplete {
    /// Whether this error only means "try again after more bytes arrive".
    fn is_incomplete(&self) -> bool;
}

impl Incomplete for InsufficientData {
    fn is_incomplete(&self) -> bool {
        true
    }
}

impl Incomplete for RingError {
    fn is_incomplete(&self) -> bool {
        self.is_insufficient_data()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_both_sides() {
        let err = InsufficientData {
            needed: 4,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: needed 4 bytes, 1 readable"
        );

        let err = RingError::from(CapacityExceeded {
            requested: 9,
            free: 0,
        });
        assert_eq!(err.to_string(), "capacity exceeded: requested 9 bytes, 0 free");
        assert!(!err.is_insufficient_data());
        assert!(!err.is_incomplete());
        assert!(RingError::from(InsufficientData {
            needed: 1,
            available: 0
        })
        .is_incomplete());
    }
}
