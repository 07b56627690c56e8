// std imports
use std::fmt::Display;

// internal imports
use crate::mass::convert::to_float as mass_to_float;

/// Parts per million
const PPM_FACTOR: i128 = 1_000_000;

/// Integer mass window around a precursor mass.
/// Limits are inclusive.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrecursorRange {
    lower_limit: i64,
    upper_limit: i64,
}

impl PrecursorRange {
    /// Creates a new range from a mass and independent lower and upper tolerances,
    /// `limit = round(mass -/+ mass * ppm / 1_000_000)`.
    /// Limits saturate at the 64 bit bounds.
    ///
    /// # Arguments
    /// * `mass` - Mass as integer
    /// * `lower_tolerance_ppm` - Lower tolerance in ppm
    /// * `upper_tolerance_ppm` - Upper tolerance in ppm
    ///
    pub fn new(mass: i64, lower_tolerance_ppm: u32, upper_tolerance_ppm: u32) -> Self {
        Self {
            lower_limit: mass.saturating_sub(ppm_of(mass, lower_tolerance_ppm)),
            upper_limit: mass.saturating_add(ppm_of(mass, upper_tolerance_ppm)),
        }
    }

    pub fn get_lower_limit(&self) -> i64 {
        self.lower_limit
    }

    pub fn get_upper_limit(&self) -> i64 {
        self.upper_limit
    }

    /// True if the mass is within the limits
    ///
    pub fn contains(&self, mass: i64) -> bool {
        self.lower_limit <= mass && mass <= self.upper_limit
    }
}

/// Calculates `round(mass * ppm / 1_000_000)`, rounding half away from zero.
/// 128 bit arithmetic, as the product easily exceeds 64 bit for masses with 9 decimal places.
///
fn ppm_of(mass: i64, ppm: u32) -> i64 {
    let product = mass as i128 * ppm as i128;
    let half = PPM_FACTOR / 2;
    let rounded = if product >= 0 {
        (product + half) / PPM_FACTOR
    } else {
        (product - half) / PPM_FACTOR
    };
    i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX })
}

impl Display for PrecursorRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} Da",
            mass_to_float(self.lower_limit),
            mass_to_float(self.upper_limit)
        )
    }
}
