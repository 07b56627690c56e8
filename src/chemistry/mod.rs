/// Amino acid one letter codes used for validating modifications
pub mod amino_acid;
