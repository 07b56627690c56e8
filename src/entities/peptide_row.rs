// std imports
use std::borrow::Cow;
use std::fmt::Display;

/// Columns of the peptide table which are used for searching
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Mass,
    Sequence,
    NumberOfMissedCleavages,
    Length,
    IsSwissProt,
    IsTrembl,
    TaxonomyIds,
    UniqueTaxonomyIds,
    ProteomeIds,
    /// Number of occurrences of the amino acid (upper case one letter code)
    AminoAcidCount(char),
    NTerminus,
    CTerminus,
}

/// Columns every search query selects
pub const DEFAULT_COLUMNS: [Column; 9] = [
    Column::Mass,
    Column::Sequence,
    Column::NumberOfMissedCleavages,
    Column::Length,
    Column::IsSwissProt,
    Column::IsTrembl,
    Column::TaxonomyIds,
    Column::UniqueTaxonomyIds,
    Column::ProteomeIds,
];

impl Column {
    /// Column name in the database
    ///
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Column::Mass => Cow::Borrowed("mass"),
            Column::Sequence => Cow::Borrowed("sequence"),
            Column::NumberOfMissedCleavages => Cow::Borrowed("number_of_missed_cleavages"),
            Column::Length => Cow::Borrowed("length"),
            Column::IsSwissProt => Cow::Borrowed("is_swiss_prot"),
            Column::IsTrembl => Cow::Borrowed("is_trembl"),
            Column::TaxonomyIds => Cow::Borrowed("taxonomy_ids"),
            Column::UniqueTaxonomyIds => Cow::Borrowed("unique_taxonomy_ids"),
            Column::ProteomeIds => Cow::Borrowed("proteome_ids"),
            Column::AminoAcidCount(one_letter_code) => {
                Cow::Owned(format!("{}_count", one_letter_code.to_ascii_lowercase()))
            }
            Column::NTerminus => Cow::Borrowed("n_terminus"),
            Column::CTerminus => Cow::Borrowed("c_terminus"),
        }
    }

    /// True for columns which are only selected if a modification combination needs them
    ///
    pub fn is_modification_column(&self) -> bool {
        matches!(
            self,
            Column::AminoAcidCount(_) | Column::NTerminus | Column::CTerminus
        )
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Value of modification specific columns
///
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarValue {
    Integer(i64),
    Boolean(bool),
    Residue(char),
    Text(String),
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Integer(value) => write!(f, "{value}"),
            ScalarValue::Boolean(value) => write!(f, "{value}"),
            ScalarValue::Residue(value) => write!(f, "'{value}'"),
            ScalarValue::Text(value) => write!(f, "\"{value}\""),
        }
    }
}

/// Borrowed view of a single column of a row
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RowValue<'a> {
    Integer(i64),
    Boolean(bool),
    Residue(char),
    Text(&'a str),
    IntegerArray(&'a [i64]),
    TextArray(&'a [String]),
}

impl<'a> From<&'a ScalarValue> for RowValue<'a> {
    fn from(value: &'a ScalarValue) -> Self {
        match value {
            ScalarValue::Integer(value) => RowValue::Integer(*value),
            ScalarValue::Boolean(value) => RowValue::Boolean(*value),
            ScalarValue::Residue(value) => RowValue::Residue(*value),
            ScalarValue::Text(value) => RowValue::Text(value),
        }
    }
}

/// Peptide as delivered by the row source.
/// Contains the default columns and the modification columns requested
/// for the active modification combination.
///
#[derive(Clone, Debug, PartialEq)]
pub struct PeptideRow {
    mass: i64,
    sequence: String,
    number_of_missed_cleavages: i16,
    length: i16,
    is_swiss_prot: bool,
    is_trembl: bool,
    taxonomy_ids: Vec<i64>,
    unique_taxonomy_ids: Vec<i64>,
    proteome_ids: Vec<String>,
    modification_columns: Vec<(Column, ScalarValue)>,
}

impl PeptideRow {
    /// Creates a new peptide row without modification columns
    ///
    /// # Arguments
    /// * `mass` - The mass
    /// * `sequence` - The sequence
    /// * `number_of_missed_cleavages` - The number of missed cleavages
    /// * `is_swiss_prot` - True if the peptide is contained in a Swiss-Prot protein
    /// * `is_trembl` - True if the peptide is contained in a TrEMBL protein
    /// * `taxonomy_ids` - The taxonomy IDs
    /// * `unique_taxonomy_ids` - Taxonomy IDs where the peptide is only contained in one protein
    /// * `proteome_ids` - The proteome IDs
    ///
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mass: i64,
        sequence: String,
        number_of_missed_cleavages: i16,
        length: i16,
        is_swiss_prot: bool,
        is_trembl: bool,
        taxonomy_ids: Vec<i64>,
        unique_taxonomy_ids: Vec<i64>,
        proteome_ids: Vec<String>,
    ) -> Self {
        Self {
            mass,
            sequence,
            number_of_missed_cleavages,
            length,
            is_swiss_prot,
            is_trembl,
            taxonomy_ids,
            unique_taxonomy_ids,
            proteome_ids,
            modification_columns: Vec::new(),
        }
    }

    /// Adds the value of a modification column, e.g. `c_count` or `n_terminus`
    ///
    pub fn add_modification_column(&mut self, column: Column, value: ScalarValue) {
        self.modification_columns.push((column, value));
    }

    /// Builder variant of `add_modification_column`
    ///
    pub fn with_modification_column(mut self, column: Column, value: ScalarValue) -> Self {
        self.add_modification_column(column, value);
        self
    }

    pub fn get_mass(&self) -> i64 {
        self.mass
    }

    pub fn get_sequence(&self) -> &str {
        &self.sequence
    }

    pub fn get_number_of_missed_cleavages(&self) -> i16 {
        self.number_of_missed_cleavages
    }

    pub fn get_length(&self) -> i16 {
        self.length
    }

    pub fn get_is_swiss_prot(&self) -> bool {
        self.is_swiss_prot
    }

    pub fn get_is_trembl(&self) -> bool {
        self.is_trembl
    }

    pub fn get_taxonomy_ids(&self) -> &[i64] {
        &self.taxonomy_ids
    }

    pub fn get_unique_taxonomy_ids(&self) -> &[i64] {
        &self.unique_taxonomy_ids
    }

    pub fn get_proteome_ids(&self) -> &[String] {
        &self.proteome_ids
    }

    /// Returns the value of the given column, `None` if the column was not selected.
    ///
    pub fn value(&self, column: &Column) -> Option<RowValue<'_>> {
        let value = match column {
            Column::Mass => RowValue::Integer(self.mass),
            Column::Sequence => RowValue::Text(&self.sequence),
            Column::NumberOfMissedCleavages => {
                RowValue::Integer(self.number_of_missed_cleavages as i64)
            }
            Column::Length => RowValue::Integer(self.length as i64),
            Column::IsSwissProt => RowValue::Boolean(self.is_swiss_prot),
            Column::IsTrembl => RowValue::Boolean(self.is_trembl),
            Column::TaxonomyIds => RowValue::IntegerArray(&self.taxonomy_ids),
            Column::UniqueTaxonomyIds => RowValue::IntegerArray(&self.unique_taxonomy_ids),
            Column::ProteomeIds => RowValue::TextArray(&self.proteome_ids),
            Column::AminoAcidCount(_) | Column::NTerminus | Column::CTerminus => {
                return self
                    .modification_columns
                    .iter()
                    .find(|(selected_column, _)| selected_column == column)
                    .map(|(_, value)| value.into());
            }
        };
        Some(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_column_names() {
        assert_eq!(Column::AminoAcidCount('C').name(), "c_count");
        assert_eq!(Column::NTerminus.name(), "n_terminus");
        assert_eq!(
            DEFAULT_COLUMNS.iter().map(|column| column.name()).collect::<Vec<_>>(),
            vec![
                "mass",
                "sequence",
                "number_of_missed_cleavages",
                "length",
                "is_swiss_prot",
                "is_trembl",
                "taxonomy_ids",
                "unique_taxonomy_ids",
                "proteome_ids"
            ]
        );
        assert!(DEFAULT_COLUMNS
            .iter()
            .all(|column| !column.is_modification_column()));
    }

    #[test]
    fn test_row_values() {
        let row = PeptideRow::new(
            859495068024,
            "MFCQLAK".to_string(),
            0,
            7,
            true,
            false,
            vec![9606],
            vec![],
            vec!["UP000005640".to_string()],
        )
        .with_modification_column(Column::AminoAcidCount('C'), ScalarValue::Integer(1));

        assert_eq!(row.value(&Column::Length), Some(RowValue::Integer(7)));
        assert_eq!(row.value(&Column::IsTrembl), Some(RowValue::Boolean(false)));
        assert_eq!(
            row.value(&Column::TaxonomyIds),
            Some(RowValue::IntegerArray(&[9606]))
        );
        assert_eq!(
            row.value(&Column::AminoAcidCount('C')),
            Some(RowValue::Integer(1))
        );
        // not selected
        assert_eq!(row.value(&Column::AminoAcidCount('M')), None);
        assert_eq!(row.value(&Column::NTerminus), None);
    }
}
