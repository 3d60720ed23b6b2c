//! Project root resolution.

use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::bootstrap::BootstrapError;

/// Absolute directory the launcher lives in.
///
/// Only constructed through the resolve functions, so the wrapped path is
/// always absolute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProjectRoot(PathBuf);

impl ProjectRoot {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl Deref for ProjectRoot {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ProjectRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ProjectRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Directory containing the running launcher executable.
pub fn resolve_root() -> Result<ProjectRoot, BootstrapError> {
    let exe = std::env::current_exe().map_err(BootstrapError::CurrentExe)?;
    resolve_root_from(&exe)
}

/// Absolute parent directory of `launcher`.
///
/// Relative paths are anchored at the current directory. Symlinks and `..`
/// components are left as they are.
pub fn resolve_root_from(launcher: &Path) -> Result<ProjectRoot, BootstrapError> {
    let absolute = std::path::absolute(launcher).map_err(|source| BootstrapError::Absolute {
        path: launcher.to_path_buf(),
        source,
    })?;
    let parent = absolute
        .parent()
        .ok_or_else(|| BootstrapError::NoParent(absolute.clone()))?;
    Ok(ProjectRoot(parent.to_path_buf()))
}

/// Use an explicitly chosen directory as the root.
pub fn root_from_dir(dir: &Path) -> Result<ProjectRoot, BootstrapError> {
    let absolute = std::path::absolute(dir).map_err(|source| BootstrapError::Absolute {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(ProjectRoot(absolute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_parent_of_launcher() {
        let root = resolve_root_from(Path::new("/srv/app/run")).unwrap();
        assert_eq!(root.as_path(), Path::new("/srv/app"));
        assert!(root.is_absolute());
    }

    #[test]
    fn test_relative_launcher_is_anchored_at_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let root = resolve_root_from(Path::new("tools/run")).unwrap();
        assert_eq!(root.as_path(), cwd.join("tools"));
    }

    #[test]
    fn test_bare_file_name_resolves_to_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let root = resolve_root_from(Path::new("run")).unwrap();
        assert_eq!(root.as_path(), cwd);
    }

    #[test]
    fn test_filesystem_root_has_no_parent() {
        assert!(matches!(
            resolve_root_from(Path::new("/")),
            Err(BootstrapError::NoParent(_))
        ));
    }

    #[test]
    fn test_running_executable_resolves() {
        let root = resolve_root().unwrap();
        let exe = std::env::current_exe().unwrap();
        assert_eq!(Some(root.as_path()), exe.parent());
    }

    #[test]
    fn test_explicit_dir_is_made_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let root = root_from_dir(Path::new("deploy")).unwrap();
        assert_eq!(root.as_path(), cwd.join("deploy"));
    }
}
