// std imports
use std::str::FromStr;

// 3rd party imports
use itertools::Itertools;
use serde_json::{Map, Value};

// internal imports
use crate::database::peptide_table::{OrderBy, OrderColumn, OrderDirection};
use crate::entities::modification::{Modification, Position};
use crate::functions::modification_collection::ModificationCollection;
use crate::functions::peptide_search::SearchParameters;
use crate::mass::convert::{to_int as mass_to_int, MAX_MASS};

const LOWER_PRECURSOR_TOLERANCE_PPM: &str = "lower_precursor_tolerance_ppm";
const UPPER_PRECURSOR_TOLERANCE_PPM: &str = "upper_precursor_tolerance_ppm";
const VARIABLE_MODIFICATION_MAXIMUM: &str = "variable_modification_maximum";

/// Returns the attribute, `null` is treated as missing
///
fn attribute<'a>(body: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    body.get(name).filter(|value| !value.is_null())
}

/// Validates a required non negative integer attribute
///
fn required_unsigned(
    body: &Map<String, Value>,
    name: &str,
    max: u64,
    errors: &mut Vec<String>,
) -> Option<u64> {
    let value = match attribute(body, name) {
        Some(value) => value,
        None => {
            errors.push(format!("you have to specify {}", name));
            return None;
        }
    };
    if let Some(value) = value.as_u64() {
        if value > max {
            errors.push(format!("'{}' must be less or equals {}", name, max));
            return None;
        }
        return Some(value);
    }
    if value.is_i64() {
        errors.push(format!("'{}' must be greater or equals 0", name));
    } else {
        errors.push(format!("'{}' has to be int", name));
    }
    None
}

/// Validates an optional non negative integer attribute
///
fn optional_unsigned(body: &Map<String, Value>, name: &str, errors: &mut Vec<String>) -> Option<u64> {
    let value = attribute(body, name)?;
    if let Some(value) = value.as_u64() {
        return Some(value);
    }
    if value.is_i64() {
        errors.push(format!("{} must be greater or equals 0", name));
    } else {
        errors.push(format!("{} has to be of type int", name));
    }
    None
}

/// Creates a modification from its JSON representation
/// `{"amino_acid": "C", "position": "anywhere", "is_static": true, "delta": 57.021464}`
///
/// # Arguments
/// * `idx` - Index in the modification list, used for the accession
/// * `attributes` - JSON object
///
fn parse_modification(idx: usize, attributes: &Map<String, Value>) -> Result<Modification, String> {
    let accession = format!("onlinemod:{}", idx);

    let amino_acid = match attributes.get("amino_acid").and_then(Value::as_str) {
        Some(code) if code.chars().count() == 1 => code.chars().next(),
        _ => None,
    }
    .ok_or_else(|| "'amino_acid' has to be a one letter code".to_string())?;

    let position = attributes
        .get("position")
        .and_then(Value::as_str)
        .ok_or_else(|| "'position' has to be a string".to_string())
        .and_then(|position| Position::from_str(position).map_err(|err| err.to_string()))?;

    let is_static = attributes
        .get("is_static")
        .and_then(Value::as_bool)
        .ok_or_else(|| "'is_static' has to be a boolean".to_string())?;

    let delta = attributes
        .get("delta")
        .and_then(Value::as_f64)
        .ok_or_else(|| "'delta' has to be a number".to_string())?;
    if !delta.is_finite() || delta.abs() > MAX_MASS {
        return Err(format!(
            "'delta' has to be between -{} and {} Da",
            MAX_MASS, MAX_MASS
        ));
    }

    Modification::new(
        &accession,
        &accession,
        amino_acid,
        position,
        is_static,
        mass_to_int(delta),
    )
    .map_err(|err| err.to_string())
}

/// Validates the body of a peptide search request and converts it into search parameters.
/// All problems are collected and returned at once.
///
/// # Arguments
/// * `body` - Request body
///
pub fn parse_search_request(body: &Value) -> Result<SearchParameters, Vec<String>> {
    let body = match body.as_object() {
        Some(body) => body,
        None => return Err(vec!["request body has to be a JSON object".to_string()]),
    };
    let mut errors: Vec<String> = Vec::new();

    let include_count = attribute(body, "include_count")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let order_column = attribute(body, "order_by").and_then(|order_by| {
        let order_column = order_by
            .as_str()
            .and_then(|order_by| OrderColumn::from_str(order_by).ok());
        if order_column.is_none() {
            errors.push(format!(
                "'order_by' must be a string with one of following values: {}",
                OrderColumn::ALL.iter().join(", ")
            ));
        }
        order_column
    });

    let order_direction = match attribute(body, "order_direction") {
        Some(order_direction) => {
            match order_direction
                .as_str()
                .and_then(|order_direction| OrderDirection::from_str(order_direction).ok())
            {
                Some(order_direction) => order_direction,
                None => {
                    errors.push(format!(
                        "'order_direction' must be a string with one of following values: {}",
                        OrderDirection::ALL
                            .iter()
                            .map(|direction| direction.as_str())
                            .join(", ")
                    ));
                    OrderDirection::default()
                }
            }
        }
        None => OrderDirection::default(),
    };

    let lower_tolerance_ppm = required_unsigned(
        body,
        LOWER_PRECURSOR_TOLERANCE_PPM,
        u32::MAX as u64,
        &mut errors,
    );
    let upper_tolerance_ppm = required_unsigned(
        body,
        UPPER_PRECURSOR_TOLERANCE_PPM,
        u32::MAX as u64,
        &mut errors,
    );
    let max_variable_modifications = required_unsigned(
        body,
        VARIABLE_MODIFICATION_MAXIMUM,
        u32::MAX as u64,
        &mut errors,
    );

    let mut modifications: Vec<Modification> = Vec::new();
    if let Some(modification_list) = attribute(body, "modifications") {
        match modification_list.as_array() {
            Some(modification_list) => {
                for (idx, modification) in modification_list.iter().enumerate() {
                    match modification.as_object() {
                        Some(attributes) => match parse_modification(idx, attributes) {
                            Ok(modification) => modifications.push(modification),
                            Err(err) => errors.push(format!(
                                "modification {} is not valid: {}",
                                modification, err
                            )),
                        },
                        None => errors.push(format!(
                            "modifications {} has to be of type dict",
                            modification
                        )),
                    }
                }
            }
            None => errors.push("modifications has to be of type list".to_string()),
        }
    }

    let modifications = match ModificationCollection::new(modifications) {
        Ok(modifications) => Some(modifications),
        Err(err) => {
            errors.push(err.to_string());
            None
        }
    };

    let precursor = match attribute(body, "precursor") {
        Some(precursor) => match precursor.as_f64() {
            Some(precursor) if precursor.is_finite() && precursor > 0.0 && precursor <= MAX_MASS => {
                Some(mass_to_int(precursor))
            }
            Some(_) => {
                errors.push(format!("precursor has to be between 0 and {} Da", MAX_MASS));
                None
            }
            None => {
                errors.push("precursor has to be a int/float".to_string());
                None
            }
        },
        None => {
            errors.push("you have to specify a precursor".to_string());
            None
        }
    };

    let taxonomy_id = attribute(body, "taxonomy_id").and_then(|taxonomy_id| {
        if taxonomy_id.as_i64().is_none() {
            errors.push("taxonomy_id has to be of type int".to_string());
        }
        taxonomy_id.as_i64()
    });

    let proteome_id = attribute(body, "proteome_id").and_then(|proteome_id| {
        if !proteome_id.is_string() {
            errors.push("proteome_id has to be of type string".to_string());
        }
        proteome_id.as_str().map(String::from)
    });

    let is_reviewed = attribute(body, "is_reviewed").and_then(|is_reviewed| {
        if !is_reviewed.is_boolean() {
            errors.push("is_reviewed has to be of type boolean".to_string());
        }
        is_reviewed.as_bool()
    });

    let limit = optional_unsigned(body, "limit", &mut errors);
    let offset = optional_unsigned(body, "offset", &mut errors).unwrap_or(0);

    match (
        precursor,
        lower_tolerance_ppm,
        upper_tolerance_ppm,
        max_variable_modifications,
        modifications,
    ) {
        (
            Some(precursor),
            Some(lower_tolerance_ppm),
            Some(upper_tolerance_ppm),
            Some(max_variable_modifications),
            Some(modifications),
        ) if errors.is_empty() => Ok(SearchParameters {
            precursor,
            lower_tolerance_ppm: lower_tolerance_ppm as u32,
            upper_tolerance_ppm: upper_tolerance_ppm as u32,
            max_variable_modifications: max_variable_modifications as usize,
            modifications,
            taxonomy_id,
            proteome_id,
            is_reviewed,
            order_by: order_column.map(|column| OrderBy {
                column,
                direction: order_direction,
            }),
            offset,
            limit,
            include_count,
        }),
        _ => Err(errors),
    }
}
