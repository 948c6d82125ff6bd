//! Image directory listing
//!
//! Scans the image directory on every request and reports the files whose
//! extension is on the allow-list.

use crate::config::AppState;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::path::Path;
use tokio::fs;

/// One entry of the image listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDescriptor {
    pub name: String,
    pub url: String,
    /// Same as `url`; no thumbnails are generated
    pub thumbnail: String,
}

impl ImageDescriptor {
    pub fn new(file_name: &str, url_prefix: &str) -> Self {
        let url = format!("{}/{file_name}", url_prefix.trim_end_matches('/'));
        Self {
            name: file_name.to_string(),
            thumbnail: url.clone(),
            url,
        }
    }
}

/// Whether the lowercased extension of `file_name` is in `allowed`
pub fn has_image_extension(file_name: &str, allowed: &[String]) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            allowed.iter().any(|a| *a == ext)
        })
}

/// Answer the image listing endpoint
pub async fn serve_image_list(state: &AppState) -> Response<Full<Bytes>> {
    let content = &state.config.content;
    let images = list_images(
        &state.images_dir(),
        &content.images_url_prefix(),
        &content.image_extensions,
    )
    .await;
    logger::log_info(&format!(
        "[Images] Returned list of {} images",
        images.len()
    ));
    http::build_json_response(StatusCode::OK, &images)
}

/// List images in `dir` in directory-scan order.
///
/// A directory that cannot be read yields an empty list.
pub async fn list_images(dir: &Path, url_prefix: &str, allowed: &[String]) -> Vec<ImageDescriptor> {
    match scan_directory(dir, url_prefix, allowed).await {
        Ok(images) => images,
        Err(e) => {
            logger::log_error(&format!(
                "Error reading images directory '{}': {e}",
                dir.display()
            ));
            Vec::new()
        }
    }
}

async fn scan_directory(
    dir: &Path,
    url_prefix: &str,
    allowed: &[String],
) -> std::io::Result<Vec<ImageDescriptor>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut images = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            logger::log_warning(&format!(
                "Skipping image with non UTF-8 name: {}",
                file_name.to_string_lossy()
            ));
            continue;
        };
        if has_image_extension(name, allowed) {
            images.push(ImageDescriptor::new(name, url_prefix));
        }
    }

    Ok(images)
}
