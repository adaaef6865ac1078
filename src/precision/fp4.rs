/// 4-bit format: `[sign:1][magnitude:3]`.
///
/// Only magnitude indices 0..=3 are produced by the encoder, selecting
/// {0.0, 0.5, 1.0, 1.5} by half-step thresholds. Indices 4..=7 are
/// accepted on decode and saturate to 1.5.

pub const SIGN_BIT: u8 = 0x8;
pub const ZERO: u8 = 0x0;

const MAGNITUDES: [f64; 4] = [0.0, 0.5, 1.0, 1.5];
const THRESHOLDS: [f64; 3] = [0.25, 0.75, 1.25];

pub fn encode(value: f64) -> u8 {
    if value.is_nan() {
        return ZERO;
    }

    let sign = if value.is_sign_negative() { SIGN_BIT } else { 0 };
    let magnitude = value.abs();
    let index = THRESHOLDS.iter().take_while(|&&t| magnitude >= t).count();

    sign | index as u8
}

pub fn decode(code: u8) -> f64 {
    let index = ((code & 0x7) as usize).min(MAGNITUDES.len() - 1);
    let magnitude = MAGNITUDES[index];

    if code & SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    }
}

pub fn is_canonical(code: u8) -> bool {
    code <= 0xF && (code & 0x7) < MAGNITUDES.len() as u8
}
