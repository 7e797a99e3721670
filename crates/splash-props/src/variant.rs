use std::path::{Path, PathBuf};

use splash_model::VariantFile;
use tracing::{debug, info, warn};

use crate::{PropsError, PropsResult};

/// Outcome of [`rename_variant`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantReport {
    /// Regular files visited.
    pub files_scanned: usize,
    /// Files that contained the old token and were rewritten.
    pub files_rewritten: Vec<PathBuf>,
    /// Total occurrences replaced across all files.
    pub replacements: usize,
    /// `(from, to)` when the variant file was renamed.
    pub renamed: Option<(PathBuf, PathBuf)>,
    /// Variant file that was expected but absent. Not an error.
    pub missing: Option<PathBuf>,
}

/// Swap variant `old` for `new` inside `dir`.
///
/// 1. Every occurrence of `old` in every regular file under `dir` (recursive,
///    symlinks not followed) becomes `new`. The match is a raw substring
///    match, so `old` is also replaced inside longer words.
/// 2. `dir/<base>.<old>` is renamed to `dir/<base>.<new>`.
///
/// Any I/O failure in step 1 aborts with an error. A missing variant file in
/// step 2 is only reported through [`VariantReport::missing`].
pub fn rename_variant(dir: &Path, base: &str, old: &str, new: &str) -> PropsResult<VariantReport> {
    if old.is_empty() {
        return Err(PropsError::InvalidToken(old.to_string()));
    }
    let from = VariantFile::new(base, old)?;
    let to = from.with_token(new)?;
    if !dir.is_dir() {
        return Err(PropsError::NotFound(dir.to_path_buf()));
    }

    let mut report = VariantReport::default();
    if old == new {
        debug!(dir = ?dir, token = old, "variant unchanged; nothing to do");
        return Ok(report);
    }

    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();
    for path in files {
        report.files_scanned += 1;
        let bytes = std::fs::read(&path).map_err(|e| PropsError::io(&path, e))?;
        if let Some((rewritten, count)) = replace_all(&bytes, old.as_bytes(), new.as_bytes()) {
            std::fs::write(&path, rewritten).map_err(|e| PropsError::io(&path, e))?;
            debug!(path = ?path, count, "substituted variant token");
            report.replacements += count;
            report.files_rewritten.push(path);
        }
    }

    let from_path = dir.join(from.file_name());
    let to_path = dir.join(to.file_name());
    if from_path.is_file() {
        std::fs::rename(&from_path, &to_path).map_err(|e| PropsError::io(&from_path, e))?;
        info!(from = ?from_path, to = ?to_path, "variant file renamed");
        report.renamed = Some((from_path, to_path));
    } else {
        warn!(path = ?from_path, "variant file not found; contents substituted, nothing renamed");
        report.missing = Some(from_path);
    }
    Ok(report)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> PropsResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| PropsError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| PropsError::io(dir, e))?;
        let path = entry.path();
        let kind = entry.file_type().map_err(|e| PropsError::io(&path, e))?;
        if kind.is_dir() {
            collect_files(&path, out)?;
        } else if kind.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Replace every non-overlapping `from` with `to`, scanning left to right.
///
/// Returns `None` when `from` does not occur.
fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> Option<(Vec<u8>, usize)> {
    let mut out = Vec::new();
    let mut count = 0;
    let mut rest = haystack;
    while let Some(pos) = rest.windows(from.len()).position(|w| w == from) {
        if count == 0 {
            out.reserve(haystack.len());
        }
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(to);
        rest = &rest[pos + from.len()..];
        count += 1;
    }
    if count == 0 {
        return None;
    }
    out.extend_from_slice(rest);
    Some((out, count))
}
