// std imports
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;

// 3rd party imports
use thiserror::Error;

// internal imports
use crate::entities::modification::{Modification, Position};

/// Errors which might occur during modification collection validation
#[derive(Debug, Error, PartialEq)]
pub enum ModificationCollectionError {
    #[error("Amino acid {0} on {1} is static and variable modified at the same time.")]
    ConflictingStaticStatus(char, Position),
    #[error("Amino acid {0} on {1} is statically modified twice or more.")]
    StaticallyModifiedTwiceOrMore(char, Position),
    #[error("{0} is already statically modified.")]
    TerminusAlreadyStaticallyModified(Position),
    #[error("Amino acid {0} is statically modified anywhere and cannot be modified on {1}.")]
    AlreadyStaticallyModified(char, Position),
}

/// Validated and deduplicated collection of modifications.
/// Rules:
/// * Static modifications are applied to every peptide, variable ones optionally
/// * A (amino acid, position) pair cannot be targeted by a static and a variable modification
/// * A (amino acid, position) pair cannot be targeted by two static modifications
/// * A statically modified terminus cannot be targeted by variable modifications
/// * An amino acid with a static anywhere modification cannot be targeted by terminal modifications
///
#[derive(Clone, Debug)]
pub struct ModificationCollection {
    static_modifications: Vec<Arc<Modification>>,
    variable_modifications: Vec<Arc<Modification>>,
}

impl ModificationCollection {
    /// Creates a new collection, dropping exact duplicates, and checks its validity.
    ///
    /// # Arguments
    /// * `modifications` - Modifications to collect
    ///
    pub fn new(modifications: Vec<Modification>) -> Result<Self, ModificationCollectionError> {
        let mut static_modifications: Vec<Arc<Modification>> = Vec::new();
        let mut variable_modifications: Vec<Arc<Modification>> = Vec::new();

        // Drop modifications which only differ by accession and name
        let mut seen: HashSet<(char, Position, bool, i64)> = HashSet::new();
        for modification in modifications {
            let (amino_acid, position) = modification.get_target();
            if !seen.insert((
                amino_acid,
                position,
                modification.is_static(),
                modification.get_delta(),
            )) {
                continue;
            }
            if modification.is_static() {
                static_modifications.push(Arc::new(modification));
            } else {
                variable_modifications.push(Arc::new(modification));
            }
        }

        let mut static_targets: HashSet<(char, Position)> =
            HashSet::with_capacity(static_modifications.len());
        for modification in static_modifications.iter() {
            let target = modification.get_target();
            if !static_targets.insert(target) {
                return Err(ModificationCollectionError::StaticallyModifiedTwiceOrMore(
                    target.0, target.1,
                ));
            }
            // Wildcard and residue specific static modifications on the same terminus
            if modification.get_position().is_terminal()
                && static_modifications.iter().any(|other| {
                    other.get_position() == modification.get_position()
                        && other.get_target() != target
                })
            {
                return Err(ModificationCollectionError::StaticallyModifiedTwiceOrMore(
                    target.0, target.1,
                ));
            }
        }

        for modification in static_modifications
            .iter()
            .chain(variable_modifications.iter())
            .filter(|modification| modification.get_position().is_terminal())
        {
            let (amino_acid, position) = modification.get_target();
            if static_targets.contains(&(amino_acid, Position::Anywhere)) {
                return Err(ModificationCollectionError::AlreadyStaticallyModified(
                    amino_acid, position,
                ));
            }
        }

        for modification in variable_modifications.iter() {
            let target = modification.get_target();
            if static_targets.contains(&target) {
                return Err(ModificationCollectionError::ConflictingStaticStatus(
                    target.0, target.1,
                ));
            }
            let position = modification.get_position();
            if position.is_terminal()
                && static_targets
                    .iter()
                    .any(|(_, static_position)| *static_position == position)
            {
                return Err(ModificationCollectionError::TerminusAlreadyStaticallyModified(
                    position,
                ));
            }
        }

        Ok(Self {
            static_modifications,
            variable_modifications,
        })
    }

    pub fn get_static_modifications(&self) -> &[Arc<Modification>] {
        &self.static_modifications
    }

    pub fn get_variable_modifications(&self) -> &[Arc<Modification>] {
        &self.variable_modifications
    }

    pub fn len(&self) -> usize {
        self.static_modifications.len() + self.variable_modifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Display for ModificationCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let modifications = self
            .static_modifications
            .iter()
            .chain(self.variable_modifications.iter())
            .map(|modification| modification.to_string())
            .collect::<Vec<String>>();

        write!(
            f,
            "ModificationCollection (static: {}, variable: {}):\n\t{}",
            self.static_modifications.len(),
            self.variable_modifications.len(),
            modifications.join("\n\t")
        )
    }
}
