// # Create absolute path to readme ti increase compatible for different build targets
//  https://gist.github.com/JakeHartnell/2c1fa387f185f5dc46c9429470a2e2be
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Readme.md"))]

// 3rd party imports
#[macro_use]
extern crate lazy_static;

// Internal imports including macros
/// Contains mass related functions
pub mod mass;
/// Contains handy functions
#[macro_use]
pub mod tools;

/// Chemistry related information, e.g. amino acids
pub mod chemistry;
/// Functions to access the peptide database
pub mod database;
/// Contains different entities, e.g. modifications and peptide rows
pub mod entities;
/// Peptide search, from modification combinations to the encoded output
pub mod functions;
/// Web API
pub mod web;
