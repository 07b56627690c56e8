/// Constant factor for float conversion to integer.
/// Masses are stored with 9 decimal places.
pub const MASS_CONVERT_FACTOR: f64 = 1000000000.0;

/// Largest mass (Dalton) accepted for precursors and modification deltas.
/// Keeps every sum of masses and deltas far from the 64 bit limits.
pub const MAX_MASS: f64 = 1000000.0;

/// Converts a mass (Dalton) into the internal integer representation.
/// The mass is rounded to the nearest representable value.
/// Values beyond the 64 bit range saturate.
///
/// # Arguments
///
/// * `mass` - Mass in Dalton
///
pub fn to_int(mass: f64) -> i64 {
    (mass * MASS_CONVERT_FACTOR).round() as i64
}

/// Converts a mass (Dalton) from the internal integer representation to float.
///
/// # Arguments
///
/// * `mass` - Mass in Dalton
///
pub fn to_float(mass: i64) -> f64 {
    mass as f64 / MASS_CONVERT_FACTOR
}
