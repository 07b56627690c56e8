// 3rd party imports
use serde::Serializer;

// internal imports
use crate::mass::convert::to_float as mass_to_float;

/// Serialize a mass to a float value
/// can be used with serde as `#[serde(serialize_with = "serialize_mass_to_float")]`
///
/// # Arguments
/// * `value` - Mass as integer
/// * `serializer` - Serializer
///
pub fn serialize_mass_to_float<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(mass_to_float(*value))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Wrapper {
        #[serde(serialize_with = "serialize_mass_to_float")]
        mass: i64,
    }

    #[test]
    fn test_serialize() {
        let wrapper = Wrapper {
            mass: 859495068024,
        };
        assert_eq!(
            serde_json::to_string(&wrapper).unwrap(),
            r#"{"mass":859.495068024}"#
        );
    }
}
