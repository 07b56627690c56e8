/// Chemical modifications
pub mod modification;
/// Peptide rows as delivered by the database
pub mod peptide_row;
