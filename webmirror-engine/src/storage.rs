use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use url::Url;

/// Derive the on-disk relative path for a URL from its path component.
///
/// Empty and trailing-slash paths default to an `index` segment, and the
/// default extension is appended when the final segment carries none.
/// The same URL always maps to the same path, so presence on disk doubles
/// as the durable "already mirrored" marker.
pub fn local_path_for(url: &Url, default_ext: &str) -> String {
    let mut path = url.path().trim_start_matches('/').to_string();
    if path.is_empty() || path.ends_with('/') {
        path.push_str("index");
    }
    if !default_ext.is_empty() && filename_extension(&path).is_none() {
        path.push('.');
        path.push_str(default_ext);
    }
    path
}

fn filename_extension(path: &str) -> Option<&str> {
    let filename = path.rsplit('/').next().unwrap_or(path);
    match filename.rfind('.') {
        Some(idx) if idx > 0 => Some(&filename[idx + 1..]),
        _ => None,
    }
}

/// Relative path from the directory containing `from` to `to`, both
/// given relative to the mirror root. Rewritten attributes use this so
/// they resolve from the referencing document rather than the root.
pub fn relative_from(from: &str, to: &str) -> String {
    let from_dirs: Vec<&str> = match from.rfind('/') {
        Some(idx) => from[..idx].split('/').collect(),
        None => Vec::new(),
    };
    let to_parts: Vec<&str> = to.split('/').collect();

    let mut common = 0;
    while common < from_dirs.len()
        && common + 1 < to_parts.len()
        && from_dirs[common] == to_parts[common]
    {
        common += 1;
    }

    let mut rel = String::new();
    for _ in common..from_dirs.len() {
        rel.push_str("../");
    }
    rel.push_str(&to_parts[common..].join("/"));
    rel
}

/// Persist one fetched body under the mirror root, creating parent
/// directories as needed.
pub fn save_bytes(root: &Path, rel: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let target = root.join(rel);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, bytes)?;
    Ok(target)
}
