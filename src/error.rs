use thiserror::Error;

use crate::text::Encoding;

/// Error type for [`Reader`](crate::Reader) operations.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum ReaderError {
    /// A strict read could not obtain the exact number of bytes requested.
    ///
    /// For [`MemoryReader`](crate::MemoryReader) the cursor is left where it was. For
    /// [`StreamReader`](crate::StreamReader) any bytes pulled before the shortfall was detected
    /// are discarded.
    #[error("end of data: needed {needed} bytes but only {available} available")]
    EndOfData {
        /// Bytes requested.
        needed: usize,
        /// Bytes the backend could supply.
        available: usize,
    },

    /// A variable-width read was requested with a width that is not a multiple of 8 in `8..=64`.
    /// No bytes are consumed.
    #[error("invalid bit width {0}: must be a multiple of 8 between 8 and 64")]
    InvalidWidth(u32),

    /// The bytes read are not well-formed for the requested text encoding.
    #[error("malformed {0:?} text")]
    InvalidText(Encoding),
}

/// Error type for the `write_*` methods of [`Writer`](crate::Writer) that validate their input.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum WriterError {
    /// A variable-width write was requested with a width that is not a multiple of 8 in
    /// `8..=64`. Nothing is submitted to the sink.
    #[error("invalid bit width {0}: must be a multiple of 8 between 8 and 64")]
    InvalidWidth(u32),

    /// The value does not fit in the requested width.
    #[error("value {value} does not fit in {width} bits")]
    OutOfRange {
        /// The rejected value, as written by the caller.
        value: i128,
        /// Requested width in bits.
        width: u32,
    },

    /// The text contains characters the selected encoding cannot represent.
    #[error("text cannot be encoded as {0:?}")]
    Unencodable(Encoding),
}
