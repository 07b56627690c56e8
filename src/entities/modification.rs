// std imports
use std::fmt::Display;
use std::str::FromStr;

// 3rd party imports
use thiserror::Error;

// internal imports
use crate::chemistry::amino_acid::AminoAcid;
use crate::mass::convert::to_float as mass_to_float;

/// Errors which might occur when a modification is created
#[derive(Debug, Error, PartialEq)]
pub enum ModificationError {
    #[error("unknown amino acid '{0}'")]
    UnknownAminoAcid(String),
    #[error("unknown position '{0}', expected one of: anywhere, n_terminus, c_terminus")]
    UnknownPosition(String),
    #[error("wildcard amino acid is only allowed on n_terminus or c_terminus")]
    WildcardAnywhere,
}

/// Where a modification is attached to the peptide
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    Anywhere,
    NTerminus,
    CTerminus,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Anywhere => "anywhere",
            Position::NTerminus => "n_terminus",
            Position::CTerminus => "c_terminus",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Position::Anywhere)
    }
}

impl FromStr for Position {
    type Err = ModificationError;

    fn from_str(position: &str) -> Result<Self, Self::Err> {
        match position.trim().to_lowercase().as_str() {
            "anywhere" => Ok(Position::Anywhere),
            "n_terminus" => Ok(Position::NTerminus),
            "c_terminus" => Ok(Position::CTerminus),
            _ => Err(ModificationError::UnknownPosition(position.to_string())),
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chemical modification of a single amino acid with a fixed mass delta.
/// Static modifications are always applied, variable ones optionally.
///
#[derive(Clone, Debug)]
pub struct Modification {
    accession: String,
    name: String,
    amino_acid: &'static AminoAcid,
    position: Position,
    is_static: bool,
    /// Mass delta as integer
    delta: i64,
}

impl Modification {
    /// Creates a new modification
    ///
    /// # Arguments
    /// * `accession` - Unique identifier
    /// * `name` - Name
    /// * `amino_acid` - One letter code of the targeted amino acid, `X` targets any amino acid on a terminus
    /// * `position` - Position
    /// * `is_static` - True if the modification is applied to every occurrence
    /// * `delta` - Mass delta as integer
    ///
    pub fn new(
        accession: &str,
        name: &str,
        amino_acid: char,
        position: Position,
        is_static: bool,
        delta: i64,
    ) -> Result<Self, ModificationError> {
        let amino_acid = AminoAcid::get_by_one_letter_code(amino_acid)
            .map_err(|_| ModificationError::UnknownAminoAcid(amino_acid.to_string()))?;
        if amino_acid.is_wildcard() && !position.is_terminal() {
            return Err(ModificationError::WildcardAnywhere);
        }
        Ok(Self {
            accession: accession.to_string(),
            name: name.to_string(),
            amino_acid,
            position,
            is_static,
            delta,
        })
    }

    pub fn get_accession(&self) -> &str {
        &self.accession
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_amino_acid(&self) -> &'static AminoAcid {
        self.amino_acid
    }

    pub fn get_position(&self) -> Position {
        self.position
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_variable(&self) -> bool {
        !self.is_static
    }

    pub fn get_delta(&self) -> i64 {
        self.delta
    }

    /// Returns the attachment rule as (one letter code, position).
    ///
    pub fn get_target(&self) -> (char, Position) {
        (self.amino_acid.get_one_letter_code(), self.position)
    }
}

impl Display for Modification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {:+}, {}, {}",
            self.accession,
            self.amino_acid.get_one_letter_code(),
            mass_to_float(self.delta),
            if self.is_static { "static" } else { "variable" },
            self.position
        )
    }
}
