//! Backend target resolution.
//!
//! A rewrite in front of the relay may pass the intended backend path in the
//! `__proxy_path` query parameter. Otherwise the path is whatever follows the
//! mount prefix. The parameter itself is never forwarded; all other query
//! segments are forwarded exactly as received.

use axum::http::Uri;
use url::{form_urlencoded, Url};

use crate::error::RelayResult;

/// Query parameter carrying an explicit backend path.
pub const PATH_OVERRIDE_PARAM: &str = "__proxy_path";

/// Build the backend URL for an inbound request URI.
pub fn resolve_target(backend: &Url, mount_prefix: &str, uri: &Uri) -> RelayResult<Url> {
    let mut override_path = None;
    let mut kept = Vec::new();

    for segment in uri.query().unwrap_or("").split('&').filter(|s| !s.is_empty()) {
        match form_urlencoded::parse(segment.as_bytes()).next() {
            Some((key, value)) if key == PATH_OVERRIDE_PARAM => {
                if override_path.is_none() {
                    override_path = Some(value.into_owned());
                }
            }
            _ => kept.push(segment),
        }
    }

    let path = match override_path.filter(|p| !p.is_empty()) {
        Some(path) => path,
        None => strip_prefix(uri.path(), mount_prefix).to_string(),
    };

    let mut target = format!("{}{}", backend.as_str().trim_end_matches('/'), normalize_path(&path));
    if !kept.is_empty() {
        target.push('?');
        target.push_str(&kept.join("&"));
    }

    Ok(Url::parse(&target)?)
}

/// Whether `path` is the mount prefix itself or below it.
pub fn is_under_prefix(path: &str, mount_prefix: &str) -> bool {
    match path.strip_prefix(mount_prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn strip_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if is_under_prefix(path, prefix) {
        &path[prefix.len()..]
    } else {
        path
    }
}

/// Make `path` start with exactly one `/`; an empty path stays empty.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
