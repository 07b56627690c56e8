// std imports
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// internal imports
use crate::entities::modification::{Modification, Position};
use crate::entities::peptide_row::{Column, RowValue, ScalarValue};
use crate::functions::column_condition::{check_scalar, Operator};
use crate::functions::modification_collection::ModificationCollection;
use crate::functions::precursor_range::PrecursorRange;
use crate::mass::convert::{to_int as mass_to_int, MAX_MASS};

/// Condition a modification combination puts on a residue composition column,
/// e.g. `c_count = 2` or `n_terminus = 'M'`
///
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModificationCondition {
    operator: Operator,
    value: ScalarValue,
}

impl ModificationCondition {
    pub fn equal(value: ScalarValue) -> Self {
        Self {
            operator: Operator::Equal,
            value,
        }
    }

    pub fn greater_or_equal(value: ScalarValue) -> Self {
        Self {
            operator: Operator::GreaterOrEqual,
            value,
        }
    }

    pub fn get_operator(&self) -> Operator {
        self.operator
    }

    pub fn get_value(&self) -> &ScalarValue {
        &self.value
    }

    /// Checks the value of the row column
    ///
    pub fn check(&self, row_value: RowValue<'_>) -> bool {
        check_scalar(self.operator, &self.value, row_value)
    }
}

impl Display for ModificationCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.operator, self.value)
    }
}

/// One selection of modifications with the resulting precursor range for the unmodified peptide
/// and the conditions a peptide has to satisfy to carry the selection.
///
/// Equality and hashing only consider the precursor range and the column conditions.
///
#[derive(Clone, Debug)]
pub struct ModificationCombination {
    precursor_range: PrecursorRange,
    column_conditions: BTreeMap<Column, ModificationCondition>,
    /// Applied modifications and how often they are applied
    modifications: Vec<(Arc<Modification>, usize)>,
}

impl ModificationCombination {
    /// Combination without any modification
    ///
    /// # Arguments
    /// * `precursor` - Precursor mass as integer
    /// * `lower_tolerance_ppm` - Lower tolerance in ppm
    /// * `upper_tolerance_ppm` - Upper tolerance in ppm
    ///
    pub fn unmodified(precursor: i64, lower_tolerance_ppm: u32, upper_tolerance_ppm: u32) -> Self {
        Self {
            precursor_range: PrecursorRange::new(
                precursor,
                lower_tolerance_ppm,
                upper_tolerance_ppm,
            ),
            column_conditions: BTreeMap::new(),
            modifications: Vec::new(),
        }
    }

    pub fn get_precursor_range(&self) -> &PrecursorRange {
        &self.precursor_range
    }

    pub fn get_column_conditions(&self) -> &BTreeMap<Column, ModificationCondition> {
        &self.column_conditions
    }

    pub fn get_modifications(&self) -> &[(Arc<Modification>, usize)] {
        &self.modifications
    }

    /// Summed mass delta of all applied modifications
    ///
    pub fn get_total_delta(&self) -> i64 {
        let total_delta = total_delta(&self.modifications);
        i64::try_from(total_delta).unwrap_or(if total_delta < 0 {
            i64::MIN
        } else {
            i64::MAX
        })
    }

    /// Columns the row source has to deliver additionally to the default columns
    ///
    pub fn get_required_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_conditions.keys()
    }
}

impl PartialEq for ModificationCombination {
    fn eq(&self, other: &Self) -> bool {
        self.precursor_range == other.precursor_range
            && self.column_conditions == other.column_conditions
    }
}

impl Eq for ModificationCombination {}

impl Hash for ModificationCombination {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.precursor_range.hash(state);
        self.column_conditions.hash(state);
    }
}

impl Display for ModificationCombination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let conditions = self
            .column_conditions
            .iter()
            .map(|(column, condition)| format!("{} {}", column, condition))
            .collect::<Vec<String>>();
        write!(
            f,
            "ModificationCombination ({}; {})",
            self.precursor_range,
            conditions.join(", ")
        )
    }
}

/// Summed mass delta of the given modifications and their application counts
///
fn total_delta(modifications: &[(Arc<Modification>, usize)]) -> i128 {
    modifications
        .iter()
        .map(|(modification, count)| modification.get_delta() as i128 * *count as i128)
        .sum()
}

/// Lazy enumeration of all modification combinations.
///
/// Static modifications are part of every combination and each is applied exactly once.
/// A static anywhere modification on amino acid `C` therefore results in the condition `c_count = 1`,
/// peptides without or with several `C` are not found when static modifications are given.
///
/// Variable modifications are applied so the total number of variable applications
/// never exceeds the maximum. Anywhere modifications may be applied multiple times,
/// a terminus carries at most one of its variable modifications.
/// A terminal modification on a specific amino acid requires the terminus to be that amino acid
/// and counts as one occurrence of it, e.g. `n_terminus = 'Q'` and `q_count >= 1`.
///
/// The unmodified mass `precursor - deltas` has to stay within `(0, MAX_MASS]`.
/// Combinations outside are skipped and applications of further modifications are not tried
/// once no completion can get back into the window.
///
/// Combinations with identical precursor range and column conditions are only yielded once.
///
/// An empty modification collection yields nothing, use `ModificationCombination::unmodified` in that case.
///
pub struct ModificationCombinationList {
    precursor: i64,
    lower_tolerance_ppm: u32,
    upper_tolerance_ppm: u32,
    max_variable_modifications: usize,
    static_modifications: Vec<Arc<Modification>>,
    variable_anywhere: Vec<Arc<Modification>>,
    variable_n_terminus: Vec<Arc<Modification>>,
    variable_c_terminus: Vec<Arc<Modification>>,
    /// One digit per variable anywhere modification (number of applications)
    /// followed by the N- and C-terminus digit (0 = none, i = i-th terminal modification)
    digits: Vec<usize>,
    /// Number of variable applications of the current digits
    variable_count: usize,
    /// Mass delta of the current digits
    variable_delta: i128,
    static_delta: i128,
    /// Largest positive delta and largest absolute negative delta of all variable modifications
    max_positive_delta: i128,
    max_negative_delta: i128,
    max_mass: i128,
    is_exhausted: bool,
    already_yielded: HashSet<(PrecursorRange, BTreeMap<Column, ModificationCondition>)>,
}

impl ModificationCombinationList {
    /// Creates a new enumeration
    ///
    /// # Arguments
    /// * `modifications` - Validated modifications
    /// * `precursor` - Precursor mass as integer
    /// * `lower_tolerance_ppm` - Lower tolerance in ppm
    /// * `upper_tolerance_ppm` - Upper tolerance in ppm
    /// * `max_variable_modifications` - Maximum number of variable modification applications
    ///
    pub fn new(
        modifications: &ModificationCollection,
        precursor: i64,
        lower_tolerance_ppm: u32,
        upper_tolerance_ppm: u32,
        max_variable_modifications: usize,
    ) -> Self {
        let variable_by_position = |position: Position| {
            modifications
                .get_variable_modifications()
                .iter()
                .filter(|modification| modification.get_position() == position)
                .cloned()
                .collect::<Vec<_>>()
        };
        let variable_anywhere = variable_by_position(Position::Anywhere);
        let variable_deltas = modifications
            .get_variable_modifications()
            .iter()
            .map(|modification| modification.get_delta() as i128);

        Self {
            precursor,
            lower_tolerance_ppm,
            upper_tolerance_ppm,
            max_variable_modifications,
            static_modifications: modifications.get_static_modifications().to_vec(),
            digits: vec![0; variable_anywhere.len() + 2],
            variable_anywhere,
            variable_n_terminus: variable_by_position(Position::NTerminus),
            variable_c_terminus: variable_by_position(Position::CTerminus),
            variable_count: 0,
            variable_delta: 0,
            static_delta: modifications
                .get_static_modifications()
                .iter()
                .map(|modification| modification.get_delta() as i128)
                .sum(),
            max_positive_delta: variable_deltas.clone().max().unwrap_or(0).max(0),
            max_negative_delta: variable_deltas.map(|delta| -delta).max().unwrap_or(0).max(0),
            max_mass: mass_to_int(MAX_MASS) as i128,
            is_exhausted: modifications.is_empty(),
            already_yielded: HashSet::new(),
        }
    }

    fn terminal_modifications(&self, digit: usize) -> &[Arc<Modification>] {
        if digit == self.variable_anywhere.len() {
            &self.variable_n_terminus
        } else {
            &self.variable_c_terminus
        }
    }

    fn is_terminal_digit(&self, digit: usize) -> bool {
        digit >= self.variable_anywhere.len()
    }

    /// Mass delta of the digit at the given value
    ///
    fn digit_delta(&self, digit: usize, value: usize) -> i128 {
        if self.is_terminal_digit(digit) {
            match value {
                0 => 0,
                choice => self.terminal_modifications(digit)[choice - 1].get_delta() as i128,
            }
        } else {
            self.variable_anywhere[digit].get_delta() as i128 * value as i128
        }
    }

    /// Unmodified mass for the given variable delta
    ///
    fn unmodified_mass(&self, variable_delta: i128) -> i128 {
        self.precursor as i128 - self.static_delta - variable_delta
    }

    /// True if the state or any state reachable with the remaining variable applications
    /// may have an unmodified mass within `(0, max_mass]`.
    /// Applying more of a modification only moves the bounds further away,
    /// so a failing state stays failing for higher digit values.
    ///
    fn is_reachable(&self, variable_delta: i128, variable_count: usize) -> bool {
        let mass = self.unmodified_mass(variable_delta);
        let remaining = self.max_variable_modifications.saturating_sub(variable_count) as i128;
        mass + remaining * self.max_negative_delta > 0
            && mass - remaining * self.max_positive_delta <= self.max_mass
    }

    fn is_within_mass_window(&self) -> bool {
        let mass = self.unmodified_mass(self.variable_delta);
        mass > 0 && mass <= self.max_mass
    }

    /// Next value the digit can take, if any.
    /// A terminal digit skips choices which cannot reach the mass window.
    ///
    fn next_value(&self, digit: usize) -> Option<usize> {
        let current = self.digits[digit];
        let without_digit = self.variable_delta - self.digit_delta(digit, current);
        if self.is_terminal_digit(digit) {
            // switching between terminal modifications does not change the variable count
            let count = self.variable_count + usize::from(current == 0);
            if count > self.max_variable_modifications {
                return None;
            }
            (current + 1..=self.terminal_modifications(digit).len()).find(|choice| {
                self.is_reachable(without_digit + self.digit_delta(digit, *choice), count)
            })
        } else {
            let count = self.variable_count + 1;
            if count > self.max_variable_modifications
                || !self.is_reachable(without_digit + self.digit_delta(digit, current + 1), count)
            {
                return None;
            }
            Some(current + 1)
        }
    }

    fn set(&mut self, digit: usize, value: usize) {
        let current = self.digits[digit];
        if self.is_terminal_digit(digit) {
            self.variable_count = self.variable_count - current.min(1) + value.min(1);
        } else {
            self.variable_count = self.variable_count - current + value;
        }
        self.variable_delta += self.digit_delta(digit, value) - self.digit_delta(digit, current);
        self.digits[digit] = value;
    }

    /// Moves the digits to the next state. Returns false if all states were visited.
    ///
    fn advance(&mut self) -> bool {
        for digit in 0..self.digits.len() {
            if let Some(value) = self.next_value(digit) {
                self.set(digit, value);
                return true;
            }
            self.set(digit, 0);
        }
        false
    }

    /// Builds the combination for the current digits
    ///
    fn current_combination(&self) -> ModificationCombination {
        let mut modifications: Vec<(Arc<Modification>, usize)> = self
            .static_modifications
            .iter()
            .map(|modification| (modification.clone(), 1))
            .collect();

        for (modification, count) in self.variable_anywhere.iter().zip(self.digits.iter()) {
            if *count > 0 {
                modifications.push((modification.clone(), *count));
            }
        }

        let n_terminus_choice = self.digits[self.variable_anywhere.len()];
        if n_terminus_choice > 0 {
            modifications.push((self.variable_n_terminus[n_terminus_choice - 1].clone(), 1));
        }
        let c_terminus_choice = self.digits[self.variable_anywhere.len() + 1];
        if c_terminus_choice > 0 {
            modifications.push((self.variable_c_terminus[c_terminus_choice - 1].clone(), 1));
        }

        let mut static_counts: HashMap<char, i64> = HashMap::new();
        let mut minimum_counts: HashMap<char, i64> = HashMap::new();
        let mut column_conditions: BTreeMap<Column, ModificationCondition> = BTreeMap::new();
        for (modification, count) in modifications.iter() {
            let amino_acid = modification.get_amino_acid();
            let terminus_column = match modification.get_position() {
                Position::Anywhere => {
                    let counts = if modification.is_static() {
                        &mut static_counts
                    } else {
                        &mut minimum_counts
                    };
                    *counts.entry(amino_acid.get_one_letter_code()).or_insert(0) += *count as i64;
                    continue;
                }
                Position::NTerminus => Column::NTerminus,
                Position::CTerminus => Column::CTerminus,
            };
            // wildcards only shift the mass
            if !amino_acid.is_wildcard() {
                column_conditions.insert(
                    terminus_column,
                    ModificationCondition::equal(ScalarValue::Residue(
                        amino_acid.get_one_letter_code(),
                    )),
                );
                *minimum_counts
                    .entry(amino_acid.get_one_letter_code())
                    .or_insert(0) += 1;
            }
        }
        for (one_letter_code, count) in static_counts {
            column_conditions.insert(
                Column::AminoAcidCount(one_letter_code),
                ModificationCondition::equal(ScalarValue::Integer(count)),
            );
        }
        for (one_letter_code, count) in minimum_counts {
            column_conditions.insert(
                Column::AminoAcidCount(one_letter_code),
                ModificationCondition::greater_or_equal(ScalarValue::Integer(count)),
            );
        }

        let unmodified_mass = self.unmodified_mass(self.variable_delta);

        ModificationCombination {
            precursor_range: PrecursorRange::new(
                i64::try_from(unmodified_mass).unwrap_or(if unmodified_mass < 0 {
                    i64::MIN
                } else {
                    i64::MAX
                }),
                self.lower_tolerance_ppm,
                self.upper_tolerance_ppm,
            ),
            column_conditions,
            modifications,
        }
    }
}

impl Iterator for ModificationCombinationList {
    type Item = ModificationCombination;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.is_exhausted {
            if !self.is_within_mass_window() {
                self.is_exhausted = !self.advance();
                continue;
            }
            let combination = self.current_combination();
            self.is_exhausted = !self.advance();
            if self.already_yielded.insert((
                combination.precursor_range,
                combination.column_conditions.clone(),
            )) {
                return Some(combination);
            }
        }
        None
    }
}
