/// Storage size used by [`RingOptions::default`]: 32 KiB usable plus the
/// sentinel byte.
pub const DEFAULT_SIZE: usize = 32 * 1024 + 1;

/// Configuration for a [`ByteRing`](crate::ByteRing).
///
/// # Examples
///
/// ```rust
/// use txring::{ByteRing, RingOptions};
///
/// let ring = ByteRing::with_options(RingOptions {
///     size: 1024,
///     ..Default::default()
/// });
/// assert_eq!(ring.capacity(), 1023);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RingOptions {
    /// Total storage size in bytes, including the one sentinel byte that
    /// keeps "full" distinguishable from "empty".
    ///
    /// The ring can hold `size - 1` live bytes. Must be at least 1.
    ///
    /// # Default
    ///
    /// [`DEFAULT_SIZE`]
    pub size: usize,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Run the full cursor consistency check after every mutating operation,
    /// in release builds too.
    ///
    /// # Default
    ///
    /// `false`
    pub verify_cursors: bool,
}

impl Default for RingOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            #[cfg(any(test, feature = "fuzzing"))]
            verify_cursors: false,
        }
    }
}
