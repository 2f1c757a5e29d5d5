use zerocopy::byteorder::{BE, LE, U16};
use zerocopy::{FromBytes, IntoBytes};

use crate::bits::BitWidth;
use crate::error::{ReaderError, WriterError};

/// Selects a text codec.
///
/// Each encoding has a fixed code-unit size. A code unit whose bytes are all zero is the
/// terminator used by zero-terminated strings.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Encoding {
    /// UTF-8, 1-byte code units.
    Utf8,
    /// UTF-16, big-endian 2-byte code units.
    Utf16Be,
    /// UTF-16, little-endian 2-byte code units.
    Utf16Le,
    /// 7-bit ASCII, 1-byte code units. Bytes `0x80..=0xff` are malformed.
    Ascii,
}

impl Encoding {
    /// Size of one code unit, in bytes.
    pub const fn code_unit_size(self) -> usize {
        match self {
            Self::Utf8 | Self::Ascii => 1,
            Self::Utf16Be | Self::Utf16Le => 2,
        }
    }

    /// Size of one code unit, as a width.
    pub const fn code_unit_width(self) -> BitWidth {
        match self {
            Self::Utf8 | Self::Ascii => BitWidth::W8,
            Self::Utf16Be | Self::Utf16Le => BitWidth::W16,
        }
    }

    /// Decodes `bytes` into a `String`.
    ///
    /// Malformed input is an error; nothing is replaced with U+FFFD.
    pub fn decode(self, bytes: &[u8]) -> Result<String, ReaderError> {
        let invalid = || ReaderError::InvalidText(self);
        match self {
            Self::Utf8 => core::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|_| invalid()),
            Self::Ascii => {
                if bytes.is_ascii() {
                    // ASCII is a subset of UTF-8, so this cannot fail.
                    core::str::from_utf8(bytes)
                        .map(str::to_owned)
                        .map_err(|_| invalid())
                } else {
                    Err(invalid())
                }
            }
            Self::Utf16Be => {
                let units = <[U16<BE>]>::ref_from_bytes(bytes).map_err(|_| invalid())?;
                char::decode_utf16(units.iter().map(|c| c.get()))
                    .collect::<Result<String, _>>()
                    .map_err(|_| invalid())
            }
            Self::Utf16Le => {
                let units = <[U16<LE>]>::ref_from_bytes(bytes).map_err(|_| invalid())?;
                char::decode_utf16(units.iter().map(|c| c.get()))
                    .collect::<Result<String, _>>()
                    .map_err(|_| invalid())
            }
        }
    }

    /// Encodes `text`. The output has no length prefix and no terminator.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, WriterError> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Ascii => {
                if text.is_ascii() {
                    Ok(text.as_bytes().to_vec())
                } else {
                    Err(WriterError::Unencodable(self))
                }
            }
            Self::Utf16Be => {
                let units: Vec<U16<BE>> = text.encode_utf16().map(U16::new).collect();
                Ok(units.as_bytes().to_vec())
            }
            Self::Utf16Le => {
                let units: Vec<U16<LE>> = text.encode_utf16().map(U16::new).collect();
                Ok(units.as_bytes().to_vec())
            }
        }
    }
}
