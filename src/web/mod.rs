/// Shared state of the web server
pub mod app_state;
/// Fallback for unknown routes
pub mod error_controller;
/// Controller for peptide searches
pub mod peptide_controller;
/// Validation of peptide search requests
pub mod search_request;
/// Web server definition
pub mod server;
/// Error type which converts into JSON error responses
pub mod web_error;
