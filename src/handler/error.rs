//! Request failure taxonomy
//!
//! Every failure maps to exactly one status code and one plain-text body.

use std::io;
use std::path::PathBuf;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::http;

#[derive(Debug, Error)]
pub enum ServeError {
    /// Resolved path does not exist after index-file rewriting
    #[error("File {path} not found!")]
    NotFound { path: String },

    /// Path exists but reading it failed
    #[error("Error reading file: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Request path has a malformed percent-escape or is not UTF-8 once decoded
    #[error("Bad request path: {raw}")]
    BadPath { raw: String },
}

impl ServeError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ReadFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadPath { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        http::build_text_response(self.status(), self.to_string())
    }
}
