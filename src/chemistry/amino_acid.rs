/// Module containing amino acid information

// std imports
use std::collections::HashMap;

// 3rd party imports
use anyhow::{bail, Result};

/// One letter code which stands for any amino acid
pub const WILDCARD_ONE_LETTER_CODE: char = 'X';

#[derive(Debug, PartialEq, Eq)]
pub struct AminoAcid {
    name: &'static str,
    one_letter_code: char,
    three_letter_code: &'static str,
}

impl AminoAcid {
    /// Returns the amino acid for the given one letter code (case insensitive)
    ///
    /// # Arguments
    /// * `one_letter_code` - One letter code of the amino acid
    ///
    pub fn get_by_one_letter_code(one_letter_code: char) -> Result<&'static Self> {
        match ONE_LETTER_CODE_LOOKUP.get(&one_letter_code.to_ascii_uppercase()) {
            Some(amino_acid) => Ok(amino_acid),
            None => bail!("Unknown one letter code: {}", one_letter_code),
        }
    }

    pub fn get_all() -> &'static [&'static AminoAcid; 26] {
        &ALL
    }

    pub fn get_name(&self) -> &'static str {
        self.name
    }

    pub fn get_one_letter_code(&self) -> char {
        self.one_letter_code
    }

    pub fn get_three_letter_code(&self) -> &'static str {
        self.three_letter_code
    }

    /// True if this is the placeholder for any amino acid
    ///
    pub fn is_wildcard(&self) -> bool {
        self.one_letter_code == WILDCARD_ONE_LETTER_CODE
    }
}

// Standard amino acids
pub const ALANINE: AminoAcid = AminoAcid { name: "Alanine", one_letter_code: 'A', three_letter_code: "Ala" };
pub const CYSTEINE: AminoAcid = AminoAcid { name: "Cysteine", one_letter_code: 'C', three_letter_code: "Cys" };
pub const ASPARTIC_ACID: AminoAcid = AminoAcid { name: "Aspartic acid", one_letter_code: 'D', three_letter_code: "Asp" };
pub const GLUTAMIC_ACID: AminoAcid = AminoAcid { name: "Glutamic acid", one_letter_code: 'E', three_letter_code: "Glu" };
pub const PHENYLALANINE: AminoAcid = AminoAcid { name: "Phenylalanine", one_letter_code: 'F', three_letter_code: "Phe" };
pub const GLYCINE: AminoAcid = AminoAcid { name: "Glycine", one_letter_code: 'G', three_letter_code: "Gly" };
pub const HISTIDINE: AminoAcid = AminoAcid { name: "Histidine", one_letter_code: 'H', three_letter_code: "His" };
pub const ISOLEUCINE: AminoAcid = AminoAcid { name: "Isoleucine", one_letter_code: 'I', three_letter_code: "Ile" };
pub const LYSINE: AminoAcid = AminoAcid { name: "Lysine", one_letter_code: 'K', three_letter_code: "Lys" };
pub const LEUCINE: AminoAcid = AminoAcid { name: "Leucine", one_letter_code: 'L', three_letter_code: "Leu" };
pub const METHIONINE: AminoAcid = AminoAcid { name: "Methionine", one_letter_code: 'M', three_letter_code: "Met" };
pub const ASPARAGINE: AminoAcid = AminoAcid { name: "Asparagine", one_letter_code: 'N', three_letter_code: "Asn" };
pub const PYRROLYSINE: AminoAcid = AminoAcid { name: "Pyrrolysine", one_letter_code: 'O', three_letter_code: "Pyl" };
pub const PROLINE: AminoAcid = AminoAcid { name: "Proline", one_letter_code: 'P', three_letter_code: "Pro" };
pub const GLUTAMINE: AminoAcid = AminoAcid { name: "Glutamine", one_letter_code: 'Q', three_letter_code: "Gln" };
pub const ARGININE: AminoAcid = AminoAcid { name: "Arginine", one_letter_code: 'R', three_letter_code: "Arg" };
pub const SERINE: AminoAcid = AminoAcid { name: "Serine", one_letter_code: 'S', three_letter_code: "Ser" };
pub const THREONINE: AminoAcid = AminoAcid { name: "Threonine", one_letter_code: 'T', three_letter_code: "Thr" };
pub const SELENOCYSTEINE: AminoAcid = AminoAcid { name: "Selenocysteine", one_letter_code: 'U', three_letter_code: "SeC" };
pub const VALINE: AminoAcid = AminoAcid { name: "Valine", one_letter_code: 'V', three_letter_code: "Val" };
pub const TRYPTOPHAN: AminoAcid = AminoAcid { name: "Tryptophan", one_letter_code: 'W', three_letter_code: "Trp" };
pub const TYROSINE: AminoAcid = AminoAcid { name: "Tyrosine", one_letter_code: 'Y', three_letter_code: "Tyr" };
// Ambigous amino acids
pub const ASPARAGINE_OR_ASPARTIC_ACID: AminoAcid = AminoAcid { name: "Asparagine or aspartic acid", one_letter_code: 'B', three_letter_code: "Asx" };
pub const ISOLEUCINE_OR_LEUCINE: AminoAcid = AminoAcid { name: "Isoleucine or Leucine", one_letter_code: 'J', three_letter_code: "Xle" };
pub const GLUTAMINE_OR_GLUTAMIC_ACID: AminoAcid = AminoAcid { name: "Glutamine or glutamic acid", one_letter_code: 'Z', three_letter_code: "Glx" };
// Special amino acids
//// Used as wildcard for modifications which target a terminus regardless of the residue
pub const UNKNOWN: AminoAcid = AminoAcid { name: "Unknown Amino Acid", one_letter_code: WILDCARD_ONE_LETTER_CODE, three_letter_code: "Xaa" };

const ALL: [&AminoAcid; 26] = [
    &ALANINE,
    &CYSTEINE,
    &ASPARTIC_ACID,
    &GLUTAMIC_ACID,
    &PHENYLALANINE,
    &GLYCINE,
    &HISTIDINE,
    &ISOLEUCINE,
    &LYSINE,
    &LEUCINE,
    &METHIONINE,
    &ASPARAGINE,
    &PYRROLYSINE,
    &PROLINE,
    &GLUTAMINE,
    &ARGININE,
    &SERINE,
    &THREONINE,
    &SELENOCYSTEINE,
    &VALINE,
    &TRYPTOPHAN,
    &TYROSINE,
    &ASPARAGINE_OR_ASPARTIC_ACID,
    &ISOLEUCINE_OR_LEUCINE,
    &GLUTAMINE_OR_GLUTAMIC_ACID,
    &UNKNOWN,
];

lazy_static! {
    static ref ONE_LETTER_CODE_LOOKUP: HashMap<char, &'static AminoAcid> = ALL
        .iter()
        .map(|amino_acid| (amino_acid.one_letter_code, *amino_acid))
        .collect();
}
