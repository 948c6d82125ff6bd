//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.

pub mod mime;
pub mod path;
pub mod response;

// Re-export commonly used types
pub use response::{build_file_response, build_json_response, build_text_response};
