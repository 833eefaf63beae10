//! A transactional byte ring buffer for decoding chunked network streams.
//!
//! Bytes arrive from the transport in bursts of any size and are appended with
//! [`ByteRing::write`]. The protocol decoder reads typed fields through
//! [`WireRead`]; every read is speculative until [`ByteRing::commit_read`]
//! makes it permanent, and [`ByteRing::reset_read`] rewinds to the last commit
//! when a frame turns out to be incomplete. Nothing is lost or duplicated by
//! an abandoned attempt.
//!
//! ```rust
//! use txring::{ByteRing, WireRead};
//!
//! let mut ring = ByteRing::new(16);
//!
//! // A string frame, split across two transport reads.
//! ring.write(&[0x00, 0x02, 0x00, b'o']).unwrap();
//! assert!(ring.read_be_utf16_string16().is_err());
//! ring.reset_read();
//!
//! ring.write(&[0x00, b'k']).unwrap();
//! assert_eq!(ring.read_be_utf16_string16().unwrap(), "ok");
//! ring.commit_read();
//! assert!(ring.is_empty());
//! ```
//!
//! Multi-byte scalars are big-endian on the wire. Strings are a big-endian
//! `u16` count of UTF-16 code units followed by big-endian UTF-16; unpaired
//! surrogates decode to U+FFFD rather than failing.
//!
//! The ring is single-producer, single-consumer and has no internal locking.

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod cursor;
mod error;
#[cfg(feature = "std")]
mod io;
mod options;
mod read;
mod ring;
mod transaction;
mod utf16;
mod write;


pub use bstr::BString;
pub use cursor::Cursors;
pub use error::{CapacityExceeded, Incomplete, InsufficientData, RingError};
pub use options::{DEFAULT_SIZE, RingOptions};
pub use read::WireRead;
pub use ring::ByteRing;
pub use transaction::{Decode, Encode, ReadTransaction};
pub use write::WireWrite;
