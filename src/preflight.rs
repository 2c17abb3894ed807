use std::path::PathBuf;

use anyhow::anyhow;

use crate::errors::PatchResult;

/// Tools every run shells out to.
pub const REQUIRED_TOOLS: &[&str] = &["git", "patch"];

/// Locate each tool on `PATH`; the first missing one is an execution error naming it.
pub fn ensure_tools(tools: &[&str]) -> PatchResult<Vec<PathBuf>> {
    let mut found = Vec::with_capacity(tools.len());
    for tool in tools {
        let path = which::which(tool)
            .map_err(|_| anyhow!("{tool} is required and was not found in PATH"))?;
        tracing::debug!(tool, path = %path.display(), "found tool");
        found.push(path);
    }
    Ok(found)
}
