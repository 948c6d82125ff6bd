//! Request handler module
//!
//! Responsible for request routing dispatch and business logic processing:
//! static file serving and the image directory listing.

pub mod error;
pub mod images;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
