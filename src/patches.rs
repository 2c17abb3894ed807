//! Patch discovery and ordering.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Default suffix of patch files.
pub const PATCH_SUFFIX: &str = ".patch";

/// A patch on disk, ordered bootstrap-first.
///
/// Basenames shaped `<digits>-<rest>` are bootstrap patches. They sort ahead of every other
/// patch, by the numeric value of the prefix; the rest sort by basename. Ties fall back to
/// the basename and then the full path so the order never depends on directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatchFile {
    path: PathBuf,
    name: String,
}

impl PatchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_bootstrap(&self) -> bool {
        bootstrap_prefix(&self.name).is_some()
    }
}

impl fmt::Display for PatchFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl Ord for PatchFile {
    fn cmp(&self, other: &Self) -> Ordering {
        let key = match (bootstrap_prefix(&self.name), bootstrap_prefix(&other.name)) {
            (Some(a), Some(b)) => compare_digits(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        key.then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for PatchFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Leading digits of a `<digits>-...` basename.
fn bootstrap_prefix(name: &str) -> Option<&str> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && name.as_bytes().get(digits) == Some(&b'-') {
        Some(&name[..digits])
    } else {
        None
    }
}

/// Numeric comparison of two ASCII digit strings of any length.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// True when the basename of `name` starts with `<digits>-`.
pub fn is_bootstrap_patch(name: impl AsRef<Path>) -> bool {
    name.as_ref()
        .file_name()
        .map(|n| bootstrap_prefix(&n.to_string_lossy()).is_some())
        .unwrap_or(false)
}

/// Every file under `dir` (recursively) whose name ends with `suffix`, in patch order.
pub fn list_patches(dir: &Path, suffix: &str) -> Result<Vec<PatchFile>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            out.push(PatchFile::new(entry.into_path()));
        }
    }
    out.sort();
    Ok(out)
}
