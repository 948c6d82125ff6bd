//! Request path handling
//!
//! Percent-decoding of request paths and lexical joining onto a base directory.

use std::path::{Path, PathBuf};

const RESERVED: &[u8] = b";/?:@&=+$,#";

/// Percent-decode a URL path.
///
/// Escapes of URI-reserved characters (`; / ? : @ & = + $ , #`) are kept
/// verbatim, so `%2F` never becomes a segment separator and `%23` stays part
/// of a file name. Returns `None` for a truncated or non-hex escape, or when
/// the decoded bytes are not valid UTF-8.
pub fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            let byte = (hi << 4) | lo;
            if RESERVED.contains(&byte) {
                decoded.extend_from_slice(&bytes[i..i + 3]);
            } else {
                decoded.push(byte);
            }
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(decoded).ok()
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Join a decoded request path onto `base`, normalizing lexically.
///
/// Empty and `.` segments are skipped; `..` removes the previous component,
/// including components of `base` itself. The result is not confined to
/// `base`: see [`is_within`].
pub fn join_request_path(base: &Path, request_path: &str) -> PathBuf {
    let mut joined = base.to_path_buf();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                joined.pop();
            }
            name => joined.push(name),
        }
    }
    joined
}

/// Whether `path` lies at or below `root` (lexical comparison)
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}
