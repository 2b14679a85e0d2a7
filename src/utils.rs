use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
    }
    Ok(())
}

/// Find the largest char boundary in `s` that is <= `max_bytes`.
/// Safe for slicing: `&s[..find_char_boundary(s, max_bytes)]` never panics.
pub fn find_char_boundary(s: &str, max_bytes: usize) -> usize {
    if max_bytes >= s.len() {
        return s.len();
    }
    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }
    boundary
}

/// Cut `s` down to at most `max_bytes` bytes, appending `...` when shortened.
/// Newlines are flattened so a table cell stays on one line.
pub fn truncate_cell(s: &str, max_bytes: usize) -> String {
    let flat = s.replace(['\r', '\n'], " ");
    if flat.len() <= max_bytes {
        return flat;
    }
    let end = find_char_boundary(&flat, max_bytes);
    format!("{}...", &flat[..end])
}
