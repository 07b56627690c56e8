/// Module for mass conversion. Conversion is necessary as all masses are compared
/// and stored as integer to avoid floating point drift.
pub mod convert;
