/// Client error
pub mod client_error;
