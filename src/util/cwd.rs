//! Scoped working-directory change.
use std::env;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Changes the process working directory and restores the previous one on drop,
/// including on early returns and unwinding.
#[derive(Debug)]
pub struct TempCwd {
    previous: PathBuf,
    current: PathBuf,
}

impl TempCwd {
    pub fn enter(path: &Path) -> io::Result<Self> {
        let previous = env::current_dir()?;
        let target = if path.is_absolute() {
            path.to_path_buf()
        } else {
            previous.join(path)
        };
        if !target.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist.", target.display()),
            ));
        }
        env::set_current_dir(&target)?;
        Ok(Self {
            previous,
            current: target,
        })
    }

    pub fn path(&self) -> &Path {
        &self.current
    }

    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for TempCwd {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(
                previous = %self.previous.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The working directory is process-global, so everything lives in one test.
    #[test]
    fn enter_and_restore_on_every_path() {
        let start = env::current_dir().expect("cwd");
        let td = tempfile::tempdir().expect("tmpdir");
        let target = td.path().canonicalize().expect("canon");

        {
            let guard = TempCwd::enter(&target).expect("enter");
            assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), target);
            assert_eq!(guard.previous(), start.as_path());
        }
        assert_eq!(env::current_dir().unwrap(), start);

        fn fails_midway(dir: &Path) -> io::Result<()> {
            let _guard = TempCwd::enter(dir)?;
            Err(io::Error::other("boom"))
        }
        assert!(fails_midway(&target).is_err());
        assert_eq!(env::current_dir().unwrap(), start);

        let missing = target.join("nope");
        let err = TempCwd::enter(&missing).expect_err("missing dir");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(env::current_dir().unwrap(), start);
    }
}
