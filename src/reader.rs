use parking_lot::Mutex;

use crate::bits::{self, BitWidth, Endian};
use crate::error::ReaderError;
use crate::io::ByteSource;
use crate::text::Encoding;

pub type Result<T> = core::result::Result<T, ReaderError>;

/// Decodes typed values from a byte backend.
///
/// An implementation supplies exactly two primitives, [`Reader::strict_read`] and
/// [`Reader::probe_read`]. Every typed getter is provided on top of them.
///
/// Multi-byte values are available in both byte orders. Methods with a `_be` suffix read
/// big-endian values and methods with a `_le` suffix read little-endian values. Floats are
/// decoded by reinterpreting the integer bit pattern, never by numeric conversion.
pub trait Reader {
    /// Fills all of `buf`, or fails with [`ReaderError::EndOfData`] if the backend cannot
    /// supply that many bytes. Never returns a short read.
    fn strict_read(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Fills all of `buf` and returns `true`, or returns `false` if the backend cannot supply
    /// that many bytes.
    ///
    /// This exists for terminator scanning, where running out of data is a normal way for a
    /// value to end. General callers should use [`Reader::strict_read`] or the typed getters.
    fn probe_read(&mut self, buf: &mut [u8]) -> bool;

    /// Number of bytes the backend can still supply, if it knows.
    ///
    /// Backends that cannot tell ahead of time return `None`.
    fn available(&self) -> Option<usize> {
        None
    }

    /// Reads `len` bytes into a new vector.
    ///
    /// A length beyond what the backend reports as [`Reader::available`] fails before anything
    /// is allocated. Otherwise the vector grows in bounded chunks, so a huge `len` against a
    /// short stream fails with [`ReaderError::EndOfData`] instead of exhausting memory.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        if let Some(available) = self.available() {
            if len > available {
                log::trace!("refusing {len}-byte read, {available} available");
                return Err(ReaderError::EndOfData {
                    needed: len,
                    available,
                });
            }
            let mut buf = vec![0u8; len];
            self.strict_read(&mut buf)?;
            return Ok(buf);
        }

        let mut buf = Vec::with_capacity(len.min(READ_CHUNK));
        while buf.len() < len {
            let start = buf.len();
            let end = start + (len - start).min(READ_CHUNK);
            buf.resize(end, 0);
            self.strict_read(&mut buf[start..]).map_err(|e| match e {
                ReaderError::EndOfData { available, .. } => ReaderError::EndOfData {
                    needed: len,
                    available: start + available,
                },
                other => other,
            })?;
        }
        Ok(buf)
    }

    /// Reads a small array of bytes, with a constant length.
    #[inline(always)]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.strict_read(&mut buf)?;
        Ok(buf)
    }

    /// Reads a single `u8` value.
    #[inline(always)]
    fn read_u8(&mut self) -> Result<u8> {
        self.read_array::<1>().map(|[b]| b)
    }

    /// Reads a single `i8` value.
    #[inline(always)]
    fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Reads a `bool`. Any non-zero byte is `true`.
    #[inline(always)]
    fn read_bool(&mut self) -> Result<bool> {
        self.read_u8().map(|b| b != 0)
    }

    /// Reads a `u16` in big-endian byte order.
    #[inline(always)]
    fn read_u16_be(&mut self) -> Result<u16> {
        Ok(bits::bytes_to_uint_be(&self.read_array::<2>()?) as u16)
    }

    /// Reads a `u16` in little-endian byte order.
    #[inline(always)]
    fn read_u16_le(&mut self) -> Result<u16> {
        Ok(bits::bytes_to_uint_le(&self.read_array::<2>()?) as u16)
    }

    /// Reads a `u32` in big-endian byte order.
    #[inline(always)]
    fn read_u32_be(&mut self) -> Result<u32> {
        Ok(bits::bytes_to_uint_be(&self.read_array::<4>()?) as u32)
    }

    /// Reads a `u32` in little-endian byte order.
    #[inline(always)]
    fn read_u32_le(&mut self) -> Result<u32> {
        Ok(bits::bytes_to_uint_le(&self.read_array::<4>()?) as u32)
    }

    /// Reads a `u64` in big-endian byte order.
    #[inline(always)]
    fn read_u64_be(&mut self) -> Result<u64> {
        Ok(bits::bytes_to_uint_be(&self.read_array::<8>()?))
    }

    /// Reads a `u64` in little-endian byte order.
    #[inline(always)]
    fn read_u64_le(&mut self) -> Result<u64> {
        Ok(bits::bytes_to_uint_le(&self.read_array::<8>()?))
    }

    /// Reads an `i16` in big-endian byte order.
    #[inline(always)]
    fn read_i16_be(&mut self) -> Result<i16> {
        self.read_u16_be().map(|v| v as i16)
    }

    /// Reads an `i16` in little-endian byte order.
    #[inline(always)]
    fn read_i16_le(&mut self) -> Result<i16> {
        self.read_u16_le().map(|v| v as i16)
    }

    /// Reads an `i32` in big-endian byte order.
    #[inline(always)]
    fn read_i32_be(&mut self) -> Result<i32> {
        self.read_u32_be().map(|v| v as i32)
    }

    /// Reads an `i32` in little-endian byte order.
    #[inline(always)]
    fn read_i32_le(&mut self) -> Result<i32> {
        self.read_u32_le().map(|v| v as i32)
    }

    /// Reads an `i64` in big-endian byte order.
    #[inline(always)]
    fn read_i64_be(&mut self) -> Result<i64> {
        self.read_u64_be().map(|v| v as i64)
    }

    /// Reads an `i64` in little-endian byte order.
    #[inline(always)]
    fn read_i64_le(&mut self) -> Result<i64> {
        self.read_u64_le().map(|v| v as i64)
    }

    /// Reads an `f32` from its big-endian bit pattern.
    #[inline(always)]
    fn read_f32_be(&mut self) -> Result<f32> {
        self.read_i32_be().map(bits::bits_to_f32)
    }

    /// Reads an `f32` from its little-endian bit pattern.
    #[inline(always)]
    fn read_f32_le(&mut self) -> Result<f32> {
        self.read_i32_le().map(bits::bits_to_f32)
    }

    /// Reads an `f64` from its big-endian bit pattern.
    #[inline(always)]
    fn read_f64_be(&mut self) -> Result<f64> {
        self.read_i64_be().map(bits::bits_to_f64)
    }

    /// Reads an `f64` from its little-endian bit pattern.
    #[inline(always)]
    fn read_f64_le(&mut self) -> Result<f64> {
        self.read_i64_le().map(bits::bits_to_f64)
    }

    /// Reads an unsigned integer that is `width` bits wide.
    ///
    /// `width` must be a multiple of 8 in `8..=64`. Any other width fails with
    /// [`ReaderError::InvalidWidth`] before a byte is read.
    fn read_uint(&mut self, width: u32, endian: Endian) -> Result<u64> {
        let width = bits::reader_width(width)?;
        read_folded(self, width, endian)
    }

    /// Reads a two's-complement integer that is `width` bits wide and sign-extends it.
    ///
    /// Width rules are the same as for [`Reader::read_uint`].
    fn read_int(&mut self, width: u32, endian: Endian) -> Result<i64> {
        let width = bits::reader_width(width)?;
        let value = read_folded(self, width, endian)?;
        Ok(bits::to_signed(value, width))
    }

    /// Reads a big-endian unsigned integer that is `width` bits wide.
    fn read_uint_be(&mut self, width: u32) -> Result<u64> {
        self.read_uint(width, Endian::Big)
    }

    /// Reads a little-endian unsigned integer that is `width` bits wide.
    fn read_uint_le(&mut self, width: u32) -> Result<u64> {
        self.read_uint(width, Endian::Little)
    }

    /// Reads a big-endian signed integer that is `width` bits wide.
    fn read_int_be(&mut self, width: u32) -> Result<i64> {
        self.read_int(width, Endian::Big)
    }

    /// Reads a little-endian signed integer that is `width` bits wide.
    fn read_int_le(&mut self, width: u32) -> Result<i64> {
        self.read_int(width, Endian::Little)
    }

    /// Reads a string of exactly `units` code units.
    ///
    /// Reads `units * encoding.code_unit_size()` bytes and decodes them. Malformed text fails
    /// with [`ReaderError::InvalidText`]; the bytes have been consumed at that point. A byte
    /// count that overflows `usize` fails with [`ReaderError::EndOfData`] and `needed` set to
    /// `usize::MAX`.
    fn read_string(&mut self, encoding: Encoding, units: usize) -> Result<String> {
        let len = units
            .checked_mul(encoding.code_unit_size())
            .ok_or_else(|| ReaderError::EndOfData {
                needed: usize::MAX,
                available: self.available().unwrap_or(0),
            })?;
        let bytes = self.read_bytes(len)?;
        encoding.decode(&bytes)
    }

    /// Reads code units of `unit` width until one is all zeros or the backend runs out.
    ///
    /// Returns the bytes of every unit before the terminator, in read order. The terminator is
    /// consumed but not returned. Running out of data ends the scan the same way a terminator
    /// does, without an error; a trailing partial unit is not part of the result.
    fn read_bytes_zt(&mut self, unit: BitWidth) -> Vec<u8> {
        let mut out = Vec::new();
        let mut block = [0u8; 8];
        let block = &mut block[..unit.bytes()];
        loop {
            if !self.probe_read(block) {
                log::trace!("source ran out after {} bytes of terminated data", out.len());
                break;
            }
            if block.iter().all(|&b| b == 0) {
                break;
            }
            out.extend_from_slice(block);
        }
        out
    }

    /// Reads a zero-terminated string.
    ///
    /// Scans code units of the encoding's width as [`Reader::read_bytes_zt`] does, then
    /// decodes everything before the terminator.
    fn read_string_zt(&mut self, encoding: Encoding) -> Result<String> {
        let bytes = self.read_bytes_zt(encoding.code_unit_width());
        encoding.decode(&bytes)
    }

    /// Reads a zero-terminated 8-bit string without assuming any encoding.
    ///
    /// The caller must handle validating the contents, if necessary.
    #[cfg(feature = "bstr")]
    fn read_bstring_zt(&mut self) -> bstr::BString {
        bstr::BString::from(self.read_bytes_zt(BitWidth::W8))
    }
}

/// Largest allocation `read_bytes` makes ahead of data it has not seen yet.
const READ_CHUNK: usize = 64 * 1024;

fn read_folded<R: Reader + ?Sized>(
    reader: &mut R,
    width: BitWidth,
    endian: Endian,
) -> Result<u64> {
    let mut buf = [0u8; 8];
    let buf = &mut buf[..width.bytes()];
    reader.strict_read(buf)?;
    Ok(bits::bytes_to_uint(buf, endian))
}

/// A [`Reader`] over a pull-based [`ByteSource`].
///
/// Each strict or probing read issues one `fill` request for exactly the bytes needed.
/// [`Reader::read_bytes`] splits lengths above 64 KiB into several such reads. If the source
/// delivers fewer, a strict read fails and a probing read reports no data; in both cases the
/// bytes that did arrive are discarded. There is no internal buffering and no resumption of
/// short reads.
///
/// A `StreamReader` is a single-consumer type: it needs `&mut self` for every read.
pub struct StreamReader<S> {
    source: S,
    bytes_read: u64,
}

impl<S: ByteSource> StreamReader<S> {
    /// Binds a reader to `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            bytes_read: 0,
        }
    }

    /// Total bytes pulled from the source, including any discarded by short reads.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Accesses the source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Accesses the source mutably.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Extracts the source.
    pub fn into_inner(self) -> S {
        self.source
    }

    fn pull(&mut self, buf: &mut [u8]) -> usize {
        let n = self.source.fill(buf);
        self.bytes_read += n as u64;
        n
    }
}

impl<S: ByteSource> Reader for StreamReader<S> {
    fn strict_read(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = self.pull(buf);
        if n < buf.len() {
            log::trace!("stream short: wanted {} bytes, got {n}", buf.len());
            return Err(ReaderError::EndOfData {
                needed: buf.len(),
                available: n,
            });
        }
        Ok(())
    }

    fn probe_read(&mut self, buf: &mut [u8]) -> bool {
        self.pull(buf) == buf.len()
    }
}

/// A [`Reader`] over a fixed in-memory buffer.
///
/// The cursor is guarded by a lock, so a `MemoryReader` can be shared between threads and read
/// through `&MemoryReader`. Concurrent reads receive disjoint byte ranges; together they cover
/// the buffer in cursor order without gaps or repeats. A read that cannot be satisfied leaves
/// the cursor unchanged.
pub struct MemoryReader<B> {
    data: B,
    cursor: Mutex<usize>,
}

impl<B: AsRef<[u8]>> MemoryReader<B> {
    /// Binds a reader to `data`, with the cursor at the start.
    pub fn new(data: B) -> Self {
        Self {
            data,
            cursor: Mutex::new(0),
        }
    }

    /// Total length of the buffer.
    pub fn len(&self) -> usize {
        self.data.as_ref().len()
    }

    /// Returns `true` if the buffer holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cursor offset.
    pub fn position(&self) -> usize {
        *self.cursor.lock()
    }

    /// Bytes between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.len() - self.position()
    }

    /// Extracts the buffer.
    pub fn into_inner(self) -> B {
        self.data
    }

    /// Copies the next `buf.len()` bytes into `buf` and advances the cursor, as one step.
    /// Returns the number of bytes that were available if that is too few.
    fn take(&self, buf: &mut [u8]) -> core::result::Result<(), usize> {
        let data = self.data.as_ref();
        let mut cursor = self.cursor.lock();
        let available = data.len() - *cursor;
        if buf.len() > available {
            return Err(available);
        }
        let end = *cursor + buf.len();
        buf.copy_from_slice(&data[*cursor..end]);
        *cursor = end;
        Ok(())
    }
}

impl<B: AsRef<[u8]>> Reader for &MemoryReader<B> {
    fn strict_read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.take(buf).map_err(|available| {
            log::trace!("buffer short: wanted {} bytes, {available} left", buf.len());
            ReaderError::EndOfData {
                needed: buf.len(),
                available,
            }
        })
    }

    fn probe_read(&mut self, buf: &mut [u8]) -> bool {
        self.take(buf).is_ok()
    }

    fn available(&self) -> Option<usize> {
        Some(self.remaining())
    }
}

impl<B: AsRef<[u8]>> Reader for MemoryReader<B> {
    fn strict_read(&mut self, buf: &mut [u8]) -> Result<()> {
        Reader::strict_read(&mut &*self, buf)
    }

    fn probe_read(&mut self, buf: &mut [u8]) -> bool {
        Reader::probe_read(&mut &*self, buf)
    }

    fn available(&self) -> Option<usize> {
        Some(self.remaining())
    }
}
