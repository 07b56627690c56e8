/// Database client
pub mod client;

/// Peptide row sources and the PostgreSQL peptide table
pub mod peptide_table;

/// Errors when working with the database
pub mod errors;
