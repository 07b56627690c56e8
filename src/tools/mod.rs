/// Additional macros, e.g. for easy creation of collections
#[macro_use]
pub mod macros;
/// Serialization helpers
pub mod serde;
