use crate::bits::{self, Endian};
use crate::error::WriterError;
use crate::io::ByteSink;
use crate::text::Encoding;

pub type Result<T> = core::result::Result<T, WriterError>;

/// Encodes typed values and submits them to a [`ByteSink`].
///
/// Every `write_*` call serializes one value and submits its bytes to the sink in a single
/// call. The returned `bool` is the sink's answer: `true` if it accepted the bytes. There is
/// no retry and no partial-write handling here; that belongs to the sink.
///
/// Floats are written as the bytes of their IEEE-754 bit pattern.
pub struct Writer<S> {
    /// The output sink.
    pub out: S,
}

impl<S: ByteSink> Writer<S> {
    /// Constructor
    pub fn wrap(out: S) -> Self {
        Self { out }
    }

    /// Extracts the inner sink
    pub fn into_inner(self) -> S {
        self.out
    }

    /// Accesses the inner sink
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.out
    }

    /// Submits `bytes` verbatim.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> bool {
        self.out.submit(bytes)
    }

    /// Writes a single `u8` value
    pub fn write_u8(&mut self, value: u8) -> bool {
        self.write_bytes(&[value])
    }

    /// Writes a single `i8` value
    pub fn write_i8(&mut self, value: i8) -> bool {
        self.write_bytes(&[value as u8])
    }

    /// Writes a `bool` value. True is encoded as 1. False is encoded as 0.
    pub fn write_bool(&mut self, value: bool) -> bool {
        self.write_u8(value as u8)
    }

    fn write_fixed(&mut self, value: u64, byte_count: usize, endian: Endian) -> bool {
        let mut scratch = [0u8; 8];
        let bytes = bits::serialize(value, byte_count, endian, &mut scratch);
        self.out.submit(bytes)
    }

    /// Writes a `u16` in big-endian byte order
    pub fn write_u16_be(&mut self, value: u16) -> bool {
        self.write_fixed(value as u64, 2, Endian::Big)
    }

    /// Writes a `u16` in little-endian byte order
    pub fn write_u16_le(&mut self, value: u16) -> bool {
        self.write_fixed(value as u64, 2, Endian::Little)
    }

    /// Writes a `u32` in big-endian byte order
    pub fn write_u32_be(&mut self, value: u32) -> bool {
        self.write_fixed(value as u64, 4, Endian::Big)
    }

    /// Writes a `u32` in little-endian byte order
    pub fn write_u32_le(&mut self, value: u32) -> bool {
        self.write_fixed(value as u64, 4, Endian::Little)
    }

    /// Writes a `u64` in big-endian byte order
    pub fn write_u64_be(&mut self, value: u64) -> bool {
        self.write_fixed(value, 8, Endian::Big)
    }

    /// Writes a `u64` in little-endian byte order
    pub fn write_u64_le(&mut self, value: u64) -> bool {
        self.write_fixed(value, 8, Endian::Little)
    }

    /// Writes an `i16` in big-endian byte order
    pub fn write_i16_be(&mut self, value: i16) -> bool {
        self.write_u16_be(value as u16)
    }

    /// Writes an `i16` in little-endian byte order
    pub fn write_i16_le(&mut self, value: i16) -> bool {
        self.write_u16_le(value as u16)
    }

    /// Writes an `i32` in big-endian byte order
    pub fn write_i32_be(&mut self, value: i32) -> bool {
        self.write_u32_be(value as u32)
    }

    /// Writes an `i32` in little-endian byte order
    pub fn write_i32_le(&mut self, value: i32) -> bool {
        self.write_u32_le(value as u32)
    }

    /// Writes an `i64` in big-endian byte order
    pub fn write_i64_be(&mut self, value: i64) -> bool {
        self.write_u64_be(value as u64)
    }

    /// Writes an `i64` in little-endian byte order
    pub fn write_i64_le(&mut self, value: i64) -> bool {
        self.write_u64_le(value as u64)
    }

    /// Writes an `f32` as its 4-byte big-endian bit pattern.
    pub fn write_f32_be(&mut self, value: f32) -> bool {
        self.write_i32_be(bits::f32_to_bits(value))
    }

    /// Writes an `f32` as its 4-byte little-endian bit pattern.
    pub fn write_f32_le(&mut self, value: f32) -> bool {
        self.write_i32_le(bits::f32_to_bits(value))
    }

    /// Writes an `f64` as its 8-byte big-endian bit pattern.
    pub fn write_f64_be(&mut self, value: f64) -> bool {
        self.write_i64_be(bits::f64_to_bits(value))
    }

    /// Writes an `f64` as its 8-byte little-endian bit pattern.
    pub fn write_f64_le(&mut self, value: f64) -> bool {
        self.write_i64_le(bits::f64_to_bits(value))
    }

    /// Writes an unsigned integer `width` bits wide.
    ///
    /// Fails without touching the sink if `width` is not a multiple of 8 in `8..=64`, or if
    /// `value` does not fit in `width` bits.
    pub fn write_uint(&mut self, value: u64, width: u32, endian: Endian) -> Result<bool> {
        let checked = bits::writer_width(width)?;
        if !bits::fits_unsigned(value, checked) {
            return Err(WriterError::OutOfRange {
                value: value as i128,
                width,
            });
        }
        Ok(self.write_fixed(value, checked.bytes(), endian))
    }

    /// Writes a two's-complement integer `width` bits wide.
    ///
    /// Fails without touching the sink if `width` is not a multiple of 8 in `8..=64`, or if
    /// `value` is outside the signed range of `width` bits.
    pub fn write_int(&mut self, value: i64, width: u32, endian: Endian) -> Result<bool> {
        let checked = bits::writer_width(width)?;
        if !bits::fits_signed(value, checked) {
            return Err(WriterError::OutOfRange {
                value: value as i128,
                width,
            });
        }
        // Truncating the sign extension leaves exactly the two's-complement encoding.
        Ok(self.write_fixed(value as u64, checked.bytes(), endian))
    }

    /// Writes a big-endian unsigned integer `width` bits wide.
    pub fn write_uint_be(&mut self, value: u64, width: u32) -> Result<bool> {
        self.write_uint(value, width, Endian::Big)
    }

    /// Writes a little-endian unsigned integer `width` bits wide.
    pub fn write_uint_le(&mut self, value: u64, width: u32) -> Result<bool> {
        self.write_uint(value, width, Endian::Little)
    }

    /// Writes a big-endian signed integer `width` bits wide.
    pub fn write_int_be(&mut self, value: i64, width: u32) -> Result<bool> {
        self.write_int(value, width, Endian::Big)
    }

    /// Writes a little-endian signed integer `width` bits wide.
    pub fn write_int_le(&mut self, value: i64, width: u32) -> Result<bool> {
        self.write_int(value, width, Endian::Little)
    }

    /// Encodes `text` and submits the bytes verbatim. No length prefix and no terminator are
    /// written.
    pub fn write_string(&mut self, text: &str, encoding: Encoding) -> Result<bool> {
        let bytes = encoding.encode(text)?;
        Ok(self.write_bytes(&bytes))
    }

    /// Encodes `text` followed by one all-zero code unit, as a single submission.
    ///
    /// This is the inverse of [`Reader::read_string_zt`](crate::Reader::read_string_zt) as long
    /// as `text` contains no NUL characters.
    pub fn write_string_zt(&mut self, text: &str, encoding: Encoding) -> Result<bool> {
        let mut bytes = encoding.encode(text)?;
        bytes.resize(bytes.len() + encoding.code_unit_size(), 0);
        Ok(self.write_bytes(&bytes))
    }
}

impl Writer<Vec<u8>> {
    /// Creates a new `Writer` over a `Vec<u8>`
    pub fn new() -> Self {
        Self { out: Vec::new() }
    }

    /// Creates a new `Writer` over a `Vec<u8>` with the given capacity.
    pub fn with_capacity(len: usize) -> Self {
        Self {
            out: Vec::with_capacity(len),
        }
    }
}

impl Default for Writer<Vec<u8>> {
    fn default() -> Self {
        Self::new()
    }
}
