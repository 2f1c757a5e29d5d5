//! Pure conversions between byte sequences and integers or floats.
//!
//! Nothing in this module performs I/O or keeps state. Readers and writers layer on top of it.

use crate::error::{ReaderError, WriterError};

/// Byte order of a multi-byte value.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Endian {
    /// Most-significant byte first.
    Big,
    /// Least-significant byte first.
    Little,
}

/// The width, in bits, of a variable-width integer. Always a multiple of 8 in `8..=64`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct BitWidth(u32);

impl BitWidth {
    /// 8 bits
    pub const W8: BitWidth = BitWidth(8);
    /// 16 bits
    pub const W16: BitWidth = BitWidth(16);
    /// 32 bits
    pub const W32: BitWidth = BitWidth(32);
    /// 64 bits
    pub const W64: BitWidth = BitWidth(64);

    /// Validates `bits`. Widths that are not a multiple of 8, or that fall outside `8..=64`,
    /// return `None`; nothing is rounded or truncated.
    pub const fn new(bits: u32) -> Option<Self> {
        if bits >= 8 && bits <= 64 && bits % 8 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Number of bits.
    #[inline(always)]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Number of bytes (`bits / 8`).
    #[inline(always)]
    pub const fn bytes(self) -> usize {
        (self.0 / 8) as usize
    }

    /// Largest unsigned value representable in this width.
    #[inline(always)]
    pub const fn max_unsigned(self) -> u64 {
        u64::MAX >> (64 - self.0)
    }
}

impl TryFrom<u32> for BitWidth {
    type Error = u32;

    fn try_from(bits: u32) -> Result<Self, u32> {
        Self::new(bits).ok_or(bits)
    }
}

pub(crate) fn reader_width(bits: u32) -> Result<BitWidth, ReaderError> {
    BitWidth::new(bits).ok_or_else(|| {
        log::debug!("rejecting read of {bits}-bit integer");
        ReaderError::InvalidWidth(bits)
    })
}

pub(crate) fn writer_width(bits: u32) -> Result<BitWidth, WriterError> {
    BitWidth::new(bits).ok_or_else(|| {
        log::debug!("rejecting write of {bits}-bit integer");
        WriterError::InvalidWidth(bits)
    })
}

/// Folds `bytes` into an integer, first byte most significant.
///
/// `bytes` must hold 1 to 8 bytes. Longer inputs are a caller error; only the last 8 bytes
/// contribute to the result.
#[inline]
pub fn bytes_to_uint_be(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Folds `bytes` into an integer, first byte least significant.
///
/// `bytes` must hold 1 to 8 bytes. Longer inputs are a caller error; only the first 8 bytes
/// contribute to the result.
#[inline]
pub fn bytes_to_uint_le(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);
    bytes.iter().rev().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Folds `bytes` into an integer using the given byte order.
#[inline]
pub fn bytes_to_uint(bytes: &[u8], endian: Endian) -> u64 {
    match endian {
        Endian::Big => bytes_to_uint_be(bytes),
        Endian::Little => bytes_to_uint_le(bytes),
    }
}

/// Returns `true` if bit `width - 1` of `value` is set.
///
/// Both fold directions leave the most-significant byte of the encoded value in bits
/// `width - 8 .. width`, so the same predicate applies whichever byte order was decoded.
/// That is why neither this nor [`to_signed`] takes an [`Endian`] argument.
#[inline]
pub fn is_negative(value: u64, width: BitWidth) -> bool {
    (value >> (width.bits() - 1)) & 1 != 0
}

/// Sign-extends the low `width` bits of `value`.
///
/// When the sign bit is set the result is `value - 2^width`, otherwise `value`. Bits above
/// `width` must be clear.
#[inline]
pub fn to_signed(value: u64, width: BitWidth) -> i64 {
    if width.bits() == 64 || !is_negative(value, width) {
        value as i64
    } else {
        (value as i128 - (1i128 << width.bits())) as i64
    }
}

/// Returns `true` if `value` is representable as an unsigned integer of `width` bits.
#[inline]
pub fn fits_unsigned(value: u64, width: BitWidth) -> bool {
    value <= width.max_unsigned()
}

/// Returns `true` if `value` is representable as a two's-complement integer of `width` bits.
#[inline]
pub fn fits_signed(value: i64, width: BitWidth) -> bool {
    let half = 1i128 << (width.bits() - 1);
    (-half..half).contains(&(value as i128))
}

/// Writes the low `byte_count * 8` bits of `value` into `out`, most-significant byte first.
///
/// Bits of `value` above `byte_count * 8` are discarded without an error. Returns the slice of
/// `out` that was written. `byte_count` must be at most 8.
#[inline]
pub fn serialize_be(value: u64, byte_count: usize, out: &mut [u8; 8]) -> &[u8] {
    let all = value.to_be_bytes();
    out[..byte_count].copy_from_slice(&all[8 - byte_count..]);
    &out[..byte_count]
}

/// Writes the low `byte_count * 8` bits of `value` into `out`, least-significant byte first.
///
/// Bits of `value` above `byte_count * 8` are discarded without an error. Returns the slice of
/// `out` that was written. `byte_count` must be at most 8.
#[inline]
pub fn serialize_le(value: u64, byte_count: usize, out: &mut [u8; 8]) -> &[u8] {
    let all = value.to_le_bytes();
    out[..byte_count].copy_from_slice(&all[..byte_count]);
    &out[..byte_count]
}

/// Serializes using the given byte order. See [`serialize_be`] and [`serialize_le`].
#[inline]
pub fn serialize(value: u64, byte_count: usize, endian: Endian, out: &mut [u8; 8]) -> &[u8] {
    match endian {
        Endian::Big => serialize_be(value, byte_count, out),
        Endian::Little => serialize_le(value, byte_count, out),
    }
}

/// Reinterprets a 32-bit pattern as an IEEE-754 single. Not a numeric conversion.
#[inline(always)]
pub fn bits_to_f32(bits: i32) -> f32 {
    f32::from_bits(bits as u32)
}

/// Returns the IEEE-754 bit pattern of `value`.
#[inline(always)]
pub fn f32_to_bits(value: f32) -> i32 {
    value.to_bits() as i32
}

/// Reinterprets a 64-bit pattern as an IEEE-754 double. Not a numeric conversion.
#[inline(always)]
pub fn bits_to_f64(bits: i64) -> f64 {
    f64::from_bits(bits as u64)
}

/// Returns the IEEE-754 bit pattern of `value`.
#[inline(always)]
pub fn f64_to_bits(value: f64) -> i64 {
    value.to_bits() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(bits: u32) -> BitWidth {
        BitWidth::new(bits).unwrap()
    }

    #[test]
    fn width_validation() {
        for bits in [8, 16, 24, 32, 40, 48, 56, 64] {
            assert_eq!(BitWidth::new(bits).map(BitWidth::bytes), Some(bits as usize / 8));
        }
        for bits in [0, 1, 7, 12, 63, 65, 72, u32::MAX] {
            assert_eq!(BitWidth::new(bits), None, "bits = {bits}");
            assert_eq!(BitWidth::try_from(bits), Err(bits));
        }
    }

    #[test]
    fn fold_orders() {
        assert_eq!(bytes_to_uint_be(&[0x12, 0x34, 0x56]), 0x123456);
        assert_eq!(bytes_to_uint_le(&[0x12, 0x34, 0x56]), 0x563412);
        assert_eq!(bytes_to_uint_be(&[0xff; 8]), u64::MAX);
        assert_eq!(bytes_to_uint_le(&[0x80]), 0x80);
    }

    #[test]
    fn endian_mirror() {
        let samples = hex::decode("0123456789abcdeffe").unwrap();
        for len in 1..=8 {
            for start in 0..=samples.len() - len {
                let b = &samples[start..start + len];
                let mut r = b.to_vec();
                r.reverse();
                assert_eq!(bytes_to_uint_be(b), bytes_to_uint_le(&r), "bytes = {b:02x?}");
            }
        }
    }

    #[test]
    fn sign_extension() {
        for bits in (8..=64).step_by(8) {
            let width = w(bits);
            let top = 1u64 << (bits - 1);
            assert_eq!(to_signed(top, width), -(1i128 << (bits - 1)) as i64);
            assert_eq!(to_signed(width.max_unsigned(), width), -1);
            assert_eq!(to_signed(top - 1, width), (top - 1) as i64);
            assert_eq!(to_signed(0, width), 0);
        }
        assert_eq!(to_signed(0xfffe, w(16)), -2);
        assert_eq!(to_signed(0x80_0000, w(24)), -8_388_608);
        assert_eq!(to_signed(0x7f_ffff, w(24)), 8_388_607);
    }

    #[test]
    fn both_fold_orders_agree_on_sign() {
        let be = bytes_to_uint_be(&[0x80, 0x00, 0x01]);
        let le = bytes_to_uint_le(&[0x01, 0x00, 0x80]);
        assert!(is_negative(be, w(24)));
        assert_eq!(to_signed(be, w(24)), to_signed(le, w(24)));
    }

    #[test]
    fn serialize_truncates() {
        let mut out = [0u8; 8];
        assert_eq!(serialize_be(0x0102_0304, 2, &mut out), [0x03, 0x04]);
        assert_eq!(serialize_le(0x0102_0304, 3, &mut out), [0x04, 0x03, 0x02]);
        assert_eq!(serialize(u64::MAX, 1, Endian::Big, &mut out), [0xff]);
        assert_eq!(serialize(0x1122, 8, Endian::Big, &mut out), [0, 0, 0, 0, 0, 0, 0x11, 0x22]);
    }

    #[test]
    fn range_checks() {
        assert!(fits_unsigned(255, w(8)));
        assert!(!fits_unsigned(256, w(8)));
        assert!(fits_unsigned(u64::MAX, w(64)));
        assert!(fits_signed(-128, w(8)));
        assert!(!fits_signed(-129, w(8)));
        assert!(!fits_signed(128, w(8)));
        assert!(fits_signed(i64::MIN, w(64)));
        assert!(fits_signed(i64::MAX, w(64)));
    }

    #[test]
    fn float_bits_are_exact() {
        let singles = [
            0.0f32,
            -0.0,
            1.5,
            f32::MIN_POSITIVE,
            f32::from_bits(1), // smallest subnormal
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::MAX,
        ];
        for x in singles {
            assert_eq!(bits_to_f32(f32_to_bits(x)).to_bits(), x.to_bits());
        }
        for pattern in [0x7fc0_0000u32, 0x7f80_0001, 0xffc0_1234] {
            assert_eq!(f32_to_bits(bits_to_f32(pattern as i32)) as u32, pattern);
        }

        let doubles = [0.0f64, -0.0, -2.25, f64::from_bits(1), f64::INFINITY, f64::MIN];
        for x in doubles {
            assert_eq!(bits_to_f64(f64_to_bits(x)).to_bits(), x.to_bits());
        }
        let nan = 0x7ff0_0000_0000_0001u64;
        assert_eq!(f64_to_bits(bits_to_f64(nan as i64)) as u64, nan);

        // A bit cast, not a numeric cast.
        assert_eq!(f32_to_bits(1.0), 0x3f80_0000);
        assert_eq!(bits_to_f64(0x4000_0000_0000_0000), 2.0);
    }
}
