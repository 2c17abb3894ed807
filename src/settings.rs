//! Environment-provided defaults. CLI flags override anything read here.

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::color::{parse_color_mode, ColorMode};
use crate::engine::{DEFAULT_CHECKPOINT_TAG, DEFAULT_FUZZ};
use crate::source::DEFAULT_SOURCE_PREFIX;

pub const FUZZ_ENV: &str = "SAFE_PATCH_FUZZ";
pub const CHECKPOINT_TAG_ENV: &str = "SAFE_PATCH_CHECKPOINT_TAG";
pub const SOURCE_PREFIX_ENV: &str = "SAFE_PATCH_SOURCE_PREFIX";
pub const COLOR_ENV: &str = "SAFE_PATCH_COLOR";
pub const PATCHES_DIR_ENV: &str = "SAFE_PATCH_PATCHES_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub fuzz: u32,
    pub checkpoint_tag: String,
    pub source_prefix: String,
    pub color: Option<ColorMode>,
    /// Batch patches directory; `None` means `patches` under the root.
    pub patches_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fuzz: DEFAULT_FUZZ,
            checkpoint_tag: DEFAULT_CHECKPOINT_TAG.to_string(),
            source_prefix: DEFAULT_SOURCE_PREFIX.to_string(),
            color: None,
            patches_dir: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Build settings from an arbitrary key lookup; invalid values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut s = Settings::default();
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get(FUZZ_ENV) {
            match v.parse::<u32>() {
                Ok(n) => s.fuzz = n,
                Err(_) => warn!(key = FUZZ_ENV, value = %v, "ignoring non-numeric fuzz"),
            }
        }
        if let Some(v) = get(CHECKPOINT_TAG_ENV) {
            s.checkpoint_tag = v;
        }
        if let Some(v) = get(SOURCE_PREFIX_ENV) {
            s.source_prefix = v;
        }
        if let Some(v) = get(COLOR_ENV) {
            s.color = parse_color_mode(&v);
        }
        if let Some(v) = get(PATCHES_DIR_ENV) {
            s.patches_dir = Some(PathBuf::from(v));
        }
        s
    }
}
