//! Static file serving module
//!
//! Resolves request paths under the server root, rewrites directory requests
//! to the index file, and loads the file with its content type.

use crate::config::AppState;
use crate::handler::error::ServeError;
use crate::http::{self, mime, path};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::PathBuf;
use tokio::fs;

/// Serve the file a decoded request path resolves to
pub async fn serve_path(state: &AppState, request_path: &str) -> Response<Full<Bytes>> {
    match load_file(state, request_path).await {
        Ok((content, content_type)) => http::build_file_response(content, content_type),
        Err(e) => {
            if let ServeError::ReadFailure { path, source } = &e {
                logger::log_error(&format!(
                    "Failed to read file '{}': {source}",
                    path.display()
                ));
            }
            e.into_response()
        }
    }
}

/// Map a decoded request path to the file that should be served
///
/// Directories resolve to their index file. A trailing `/` on anything that is
/// not a directory is missing. The path must exist; whether it is readable is
/// left to [`load_file`].
pub async fn resolve_path(state: &AppState, request_path: &str) -> Result<PathBuf, ServeError> {
    let not_found = || ServeError::NotFound {
        path: request_path.to_string(),
    };

    let mut file_path = path::join_request_path(&state.root, request_path);

    if state.config.content.confine_to_root && !path::is_within(&file_path, &state.root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            file_path.display()
        ));
        return Err(not_found());
    }

    match fs::metadata(&file_path).await {
        Ok(meta) if meta.is_dir() => file_path.push(&state.config.content.index_file),
        Ok(_) if request_path.ends_with('/') => return Err(not_found()),
        _ => {}
    }

    // Any metadata failure counts as missing
    if fs::metadata(&file_path).await.is_err() {
        return Err(not_found());
    }

    Ok(file_path)
}

/// Resolve and read a file fully into memory
pub async fn load_file(
    state: &AppState,
    request_path: &str,
) -> Result<(Bytes, &'static str), ServeError> {
    let file_path = resolve_path(state, request_path).await?;

    let content = fs::read(&file_path)
        .await
        .map_err(|source| ServeError::ReadFailure {
            path: file_path.clone(),
            source,
        })?;

    Ok((Bytes::from(content), mime::content_type_for(&file_path)))
}
