// std imports
use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;

// internal imports
use crate::entities::peptide_row::{Column, PeptideRow, RowValue, ScalarValue};
use crate::functions::modification_combination::ModificationCondition;

/// Comparison between a condition value and a row value
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    /// Row value equals the scalar
    Equal,
    /// Row value is greater than or equal to the scalar
    GreaterOrEqual,
    /// Scalar is an element of the row's array
    In,
    /// Any element of the row's array is in the condition's set
    Any,
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Equal => write!(f, "="),
            Operator::GreaterOrEqual => write!(f, ">="),
            Operator::In => write!(f, "IN"),
            Operator::Any => write!(f, "ANY"),
        }
    }
}

/// Expected value of a column condition.
/// Sets are built once per search, so each row check is a hash lookup per array element.
///
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionValue {
    Scalar(ScalarValue),
    IntegerSet(HashSet<i64>),
    TextSet(HashSet<String>),
}

/// Condition on a metadata column of the peptide row, e.g. taxonomy or review status
///
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnCondition {
    operator: Operator,
    value: ConditionValue,
}

impl ColumnCondition {
    /// Row value has to be equal to the given value
    ///
    pub fn equal(value: ScalarValue) -> Self {
        Self {
            operator: Operator::Equal,
            value: ConditionValue::Scalar(value),
        }
    }

    /// Row array has to contain the given value
    ///
    pub fn contains(value: ScalarValue) -> Self {
        Self {
            operator: Operator::In,
            value: ConditionValue::Scalar(value),
        }
    }

    /// Row array has to share at least one element with the given set
    ///
    pub fn any_of_integers(values: HashSet<i64>) -> Self {
        Self {
            operator: Operator::Any,
            value: ConditionValue::IntegerSet(values),
        }
    }

    pub fn any_of_texts(values: HashSet<String>) -> Self {
        Self {
            operator: Operator::Any,
            value: ConditionValue::TextSet(values),
        }
    }

    pub fn get_operator(&self) -> Operator {
        self.operator
    }

    pub fn get_value(&self) -> &ConditionValue {
        &self.value
    }

    /// Checks the row value against this condition.
    /// Mismatching types never pass.
    ///
    pub fn check(&self, row_value: RowValue<'_>) -> bool {
        match (&self.value, row_value) {
            (ConditionValue::Scalar(expected), _) => {
                check_scalar(self.operator, expected, row_value)
            }
            (ConditionValue::IntegerSet(expected), RowValue::IntegerArray(values)) => {
                self.operator == Operator::Any
                    && values.iter().any(|value| expected.contains(value))
            }
            (ConditionValue::TextSet(expected), RowValue::TextArray(values)) => {
                self.operator == Operator::Any
                    && values.iter().any(|value| expected.contains(value))
            }
            _ => false,
        }
    }
}

/// Compares a scalar with a row value.
///
/// # Arguments
/// * `operator` - `Equal`, `GreaterOrEqual` or `In`, `Any` needs a set and never passes
/// * `expected` - Scalar of the condition
/// * `row_value` - Value of the row
///
pub fn check_scalar(operator: Operator, expected: &ScalarValue, row_value: RowValue<'_>) -> bool {
    match operator {
        Operator::Equal => RowValue::from(expected) == row_value,
        Operator::GreaterOrEqual => match (expected, row_value) {
            (ScalarValue::Integer(expected), RowValue::Integer(value)) => value >= *expected,
            (ScalarValue::Text(expected), RowValue::Text(value)) => value >= expected.as_str(),
            _ => false,
        },
        Operator::In => match (expected, row_value) {
            (ScalarValue::Integer(expected), RowValue::IntegerArray(values)) => {
                values.contains(expected)
            }
            (ScalarValue::Text(expected), RowValue::TextArray(values)) => {
                values.iter().any(|value| value == expected)
            }
            _ => false,
        },
        Operator::Any => false,
    }
}

/// Checks if a row passes all metadata conditions of the search and all modification
/// conditions of the current combination. Columns without condition always pass,
/// conditions on columns missing in the row always fail.
///
/// # Arguments
/// * `row` - Peptide row
/// * `metadata_conditions` - Conditions on metadata columns
/// * `modification_conditions` - Conditions of the modification combination
///
pub fn check_row(
    row: &PeptideRow,
    metadata_conditions: &[(Column, ColumnCondition)],
    modification_conditions: &BTreeMap<Column, ModificationCondition>,
) -> bool {
    metadata_conditions.iter().all(|(column, condition)| {
        row.value(column)
            .map(|value| condition.check(value))
            .unwrap_or(false)
    }) && modification_conditions.iter().all(|(column, condition)| {
        row.value(column)
            .map(|value| condition.check(value))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn row() -> PeptideRow {
        PeptideRow::new(
            1234567890,
            "MCGLAMK".to_string(),
            1,
            7,
            false,
            true,
            vec![1, 5, 9],
            vec![5],
            vec!["UP000005640".to_string(), "UP000000589".to_string()],
        )
        .with_modification_column(Column::AminoAcidCount('M'), ScalarValue::Integer(2))
        .with_modification_column(Column::NTerminus, ScalarValue::Residue('M'))
    }

    #[test]
    fn test_any_overlap() {
        let row = row();
        let overlapping = ColumnCondition::any_of_integers(collection!(5, 7));
        let disjoint = ColumnCondition::any_of_integers(collection!(2, 3));
        assert!(check_row(
            &row,
            &[(Column::TaxonomyIds, overlapping)],
            &BTreeMap::new()
        ));
        assert!(!check_row(
            &row,
            &[(Column::TaxonomyIds, disjoint)],
            &BTreeMap::new()
        ));
        assert!(
            ColumnCondition::any_of_texts(collection!("UP000000589".to_string()))
                .check(row.value(&Column::ProteomeIds).unwrap())
        );
    }

    #[test]
    fn test_contains() {
        let row = row();
        let proteome_ids = row.value(&Column::ProteomeIds).unwrap();
        assert!(ColumnCondition::contains(ScalarValue::Text("UP000005640".to_string()))
            .check(proteome_ids));
        assert!(!ColumnCondition::contains(ScalarValue::Text("UP000002311".to_string()))
            .check(proteome_ids));
        assert!(ColumnCondition::contains(ScalarValue::Integer(9))
            .check(row.value(&Column::TaxonomyIds).unwrap()));
    }

    #[test]
    fn test_equal_and_greater_or_equal() {
        let row = row();
        assert!(ColumnCondition::equal(ScalarValue::Boolean(true))
            .check(row.value(&Column::IsTrembl).unwrap()));
        assert!(!ColumnCondition::equal(ScalarValue::Boolean(true))
            .check(row.value(&Column::IsSwissProt).unwrap()));

        let modification_conditions: BTreeMap<Column, ModificationCondition> = collection!(
            Column::AminoAcidCount('M') => ModificationCondition::greater_or_equal(ScalarValue::Integer(2)),
            Column::NTerminus => ModificationCondition::equal(ScalarValue::Residue('M'))
        );
        assert!(check_row(&row, &[], &modification_conditions));

        let modification_conditions: BTreeMap<Column, ModificationCondition> = collection!(
            Column::AminoAcidCount('M') => ModificationCondition::equal(ScalarValue::Integer(1))
        );
        assert!(!check_row(&row, &[], &modification_conditions));
    }

    #[test]
    fn test_type_mismatch_and_missing_column() {
        let row = row();
        // scalar compared to array
        assert!(!ColumnCondition::equal(ScalarValue::Integer(5))
            .check(row.value(&Column::TaxonomyIds).unwrap()));
        // set compared to scalar
        assert!(!ColumnCondition::any_of_integers(collection!(7))
            .check(row.value(&Column::Length).unwrap()));
        // c_count was not selected
        let modification_conditions: BTreeMap<Column, ModificationCondition> = collection!(
            Column::AminoAcidCount('C') => ModificationCondition::greater_or_equal(ScalarValue::Integer(0))
        );
        assert!(!check_row(&row, &[], &modification_conditions));
    }

    #[test]
    fn test_no_conditions() {
        assert!(check_row(&row(), &[], &BTreeMap::new()));
    }
}
