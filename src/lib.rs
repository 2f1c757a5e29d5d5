//! Reads and writes fixed- and variable-width primitive values and encoded text over abstract
//! byte sources and sinks.
//!
//! * [`bits`] holds the pure conversions: byte folding in either order, sign extension,
//!   truncating serialization and IEEE-754 bit reinterpretation.
//! * [`Reader`] derives every typed getter from two primitives, a strict read that fails on a
//!   shortfall and a probing read that reports "no data" instead. [`StreamReader`] pulls from a
//!   [`ByteSource`]; [`MemoryReader`] reads a fixed buffer through a locked cursor.
//! * [`Writer`] serializes values and submits them to a [`ByteSink`], returning whether the
//!   sink accepted them.
//!
//! ```
//! use binary_codec::{Encoding, MemoryReader, Reader, Writer};
//!
//! let mut w = Writer::new();
//! w.write_u16_be(0x0102);
//! w.write_string_zt("hi", Encoding::Utf8).unwrap();
//!
//! let mut r = MemoryReader::new(w.into_inner());
//! assert_eq!(r.read_u16_be(), Ok(0x0102));
//! assert_eq!(r.read_string_zt(Encoding::Utf8).unwrap(), "hi");
//! assert_eq!(r.remaining(), 0);
//! ```

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(missing_docs)]

pub mod bits;
mod error;
pub mod io;
mod reader;
mod text;
mod writer;


pub use bits::{BitWidth, Endian};
pub use error::{ReaderError, WriterError};
pub use io::{ByteSink, ByteSource};
pub use reader::{MemoryReader, Reader, StreamReader};
pub use text::Encoding;
pub use writer::Writer;
