//! IEEE 754 80-bit extended precision floating point utilities.

const EXPONENT_BIAS: i32 = 16383;
const EXPONENT_MAX: u16 = 0x7fff;

/// Decodes an 80-bit extended precision float from its big-endian bytes.
///
/// Byte layout: sign bit and 15-bit exponent in the first two bytes, then a
/// 64-bit mantissa with an explicit integer bit.
///
/// # Example
///
/// ```
/// use chunkstream::decode_f80;
///
/// assert_eq!(decode_f80([0x3f, 0xff, 0x80, 0, 0, 0, 0, 0, 0, 0]), 1.0);
/// assert_eq!(decode_f80([0x40, 0x0e, 0xac, 0x44, 0, 0, 0, 0, 0, 0]), 44100.0);
/// assert!(decode_f80([0x7f, 0xff, 0, 0, 0, 0, 0, 0, 0, 0]).is_infinite());
/// assert!(decode_f80([0x7f, 0xff, 0xff, 0, 0, 0, 0, 0, 0, 0]).is_nan());
/// ```
pub fn decode_f80(bytes: [u8; 10]) -> f64 {
    let sign = if bytes[0] & 0x80 != 0 { -1.0 } else { 1.0 };
    let exponent = u16::from_be_bytes([bytes[0] & 0x7f, bytes[1]]);
    let hi = u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);
    let lo = u32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);

    if exponent == 0 && hi == 0 && lo == 0 {
        return 0.0;
    }

    if exponent == EXPONENT_MAX {
        if hi == 0 && lo == 0 {
            return sign * f64::INFINITY;
        }
        return f64::NAN;
    }

    if hi == 0 && lo == 0 {
        return sign * 0.0;
    }

    // Mantissa in [0, 2). The power of two is applied in two halves so that
    // subnormal results are not flushed to zero by an intermediate underflow.
    let mantissa = hi as f64 * pow2(-31) + lo as f64 * pow2(-63);
    let exponent = exponent as i32 - EXPONENT_BIAS;
    let half = exponent / 2;
    sign * mantissa * pow2(half) * pow2(exponent - half)
}

/// Encodes `value` as big-endian 80-bit extended precision bytes.
///
/// Every finite `f64` is exactly representable, so decoding the result gives
/// back `value`. NaN is written as a quiet NaN.
///
/// # Example
///
/// ```
/// use chunkstream::{decode_f80, encode_f80};
///
/// assert_eq!(encode_f80(1.0), [0x3f, 0xff, 0x80, 0, 0, 0, 0, 0, 0, 0]);
/// assert_eq!(decode_f80(encode_f80(-2.5)), -2.5);
/// ```
pub fn encode_f80(value: f64) -> [u8; 10] {
    let sign: u16 = if value.is_sign_negative() { 0x8000 } else { 0 };

    let (exponent, mantissa) = if value.is_nan() {
        (EXPONENT_MAX, 0xc000_0000_0000_0000)
    } else if value.is_infinite() {
        (EXPONENT_MAX, 0)
    } else if value == 0.0 {
        (0, 0)
    } else {
        let bits = value.abs().to_bits();
        let raw_exponent = (bits >> 52) as i32;
        let fraction = bits & ((1 << 52) - 1);
        if raw_exponent == 0 {
            // Subnormal doubles are normal in the wider format.
            let shift = fraction.leading_zeros() as i32;
            let exponent = -1022 - (shift - 11) + EXPONENT_BIAS;
            (exponent as u16, fraction << shift)
        } else {
            let exponent = raw_exponent - 1023 + EXPONENT_BIAS;
            (exponent as u16, (1 << 63) | (fraction << 11))
        }
    };

    let mut out = [0u8; 10];
    out[..2].copy_from_slice(&(sign | exponent).to_be_bytes());
    out[2..].copy_from_slice(&u64::to_be_bytes(mantissa));
    out
}

/// Exact power of two, saturating to infinity or zero outside the `f64` range.
fn pow2(exponent: i32) -> f64 {
    match exponent {
        1024.. => f64::INFINITY,
        -1022..=1023 => f64::from_bits(((exponent + 1023) as u64) << 52),
        -1074..=-1023 => f64::from_bits(1u64 << (exponent + 1074)),
        _ => 0.0,
    }
}
