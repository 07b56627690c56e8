/// Conditions on peptide row columns and the row evaluator
pub mod column_condition;
/// Validated collection of static and variable modifications
pub mod modification_collection;
/// Enumeration of modification combinations
pub mod modification_combination;
/// JSON, NDJSON and FASTA encoding of search results
pub mod output_format;
/// Streaming peptide search
pub mod peptide_search;
/// Mass ranges based on ppm tolerances
pub mod precursor_range;
