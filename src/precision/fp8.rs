/// 8-bit float: `[sign:1][exponent:4][mantissa:3]`, bias 7.
///
/// Exponent field 0 is subnormal (`m/8 * 2^-6`), field 15 is infinity
/// (mantissa 0) or NaN. Encoding never fails: out-of-range magnitudes
/// saturate to the largest finite code and tiny magnitudes flush to a
/// signed zero.

pub const BIAS: i32 = 7;
/// Magnitudes below this flush to signed zero
pub const FLUSH_THRESHOLD: f64 = 0.01;

pub const SIGN_BIT: u8 = 0x80;
pub const ZERO: u8 = 0x00;
pub const INFINITY: u8 = 0x78;
pub const NAN: u8 = 0x7F;
/// 1.875 * 2^7 = 240.0
pub const MAX_FINITE: u8 = 0x77;

const MAX_EXPONENT_FIELD: i32 = 14;
const MANTISSA_STEPS: f64 = 8.0;

pub fn encode(value: f64) -> u8 {
    if value.is_nan() {
        return NAN;
    }

    let sign = if value.is_sign_negative() { SIGN_BIT } else { 0 };
    let magnitude = value.abs();

    if magnitude.is_infinite() {
        return sign | INFINITY;
    }
    if magnitude < FLUSH_THRESHOLD {
        return sign;
    }

    let unbiased = magnitude.log2().floor() as i32;
    let mut exponent = unbiased + BIAS;
    let mut mantissa;

    if exponent <= 0 {
        exponent = 0;
        mantissa = (magnitude / 2f64.powi(1 - BIAS) * MANTISSA_STEPS).round_ties_even() as i32;
    } else {
        let fraction = magnitude / 2f64.powi(unbiased) - 1.0;
        mantissa = (fraction * MANTISSA_STEPS).round_ties_even() as i32;
    }
    mantissa = mantissa.clamp(0, 8);

    // Rounding overflow carries into the exponent
    if mantissa == 8 {
        mantissa = 0;
        exponent += 1;
    }

    if exponent > MAX_EXPONENT_FIELD {
        return sign | MAX_FINITE;
    }

    sign | ((exponent as u8) << 3) | (mantissa as u8 & 0x07)
}

pub fn decode(code: u8) -> f64 {
    let negative = code & SIGN_BIT != 0;
    let exponent = ((code >> 3) & 0x0F) as i32;
    let mantissa = (code & 0x07) as f64;

    let magnitude = match exponent {
        0 => mantissa / MANTISSA_STEPS * 2f64.powi(1 - BIAS),
        15 if mantissa == 0.0 => f64::INFINITY,
        15 => return f64::NAN,
        e => (1.0 + mantissa / MANTISSA_STEPS) * 2f64.powi(e - BIAS),
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Finite codes that survive an encode/decode round trip: the signed zeros
/// and every finite code whose magnitude is not flushed.
pub fn is_canonical(code: u8) -> bool {
    let exponent = (code >> 3) & 0x0F;
    if exponent == 15 {
        return false;
    }
    let magnitude = decode(code).abs();
    magnitude == 0.0 && code & 0x7F == 0 || magnitude >= FLUSH_THRESHOLD
}
