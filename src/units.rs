//! Length units used by DrawingML.

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Convert inches to EMU, rounding to the nearest unit.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// Convert EMU to inches.
pub fn to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}
