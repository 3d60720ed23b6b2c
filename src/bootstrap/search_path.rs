//! Ordered module search path.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::bootstrap::root::ProjectRoot;
use crate::server::AppReference;

/// Directories consulted, in order, when locating the application module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchPath {
    entries: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a platform path list (`a:b:c` on unix), dropping empty entries.
    pub fn from_env_value(value: &OsStr) -> Self {
        let entries = std::env::split_paths(value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        Self { entries }
    }

    /// Search path inherited from `var` in the launcher's environment.
    pub fn inherited(var: &str) -> Self {
        std::env::var_os(var)
            .map(|value| Self::from_env_value(&value))
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|p| p == path)
    }

    /// Prepend `root` unless it is already present. Returns whether it was inserted.
    pub fn ensure(&mut self, root: &ProjectRoot) -> bool {
        if self.contains(root.as_path()) {
            return false;
        }
        self.entries.insert(0, root.as_path().to_path_buf());
        true
    }

    /// First location under any entry that holds the module of `app`.
    pub fn locate_module(&self, app: &AppReference) -> Option<PathBuf> {
        let candidates = app.module_candidates();
        self.entries.iter().find_map(|entry| {
            let [file, package, namespace] = &candidates;
            let file = entry.join(file);
            if file.is_file() {
                return Some(file);
            }
            let package = entry.join(package);
            if package.is_file() {
                return Some(package);
            }
            let namespace = entry.join(namespace);
            namespace.is_dir().then_some(namespace)
        })
    }
}

/// Put `root` at the front of `search_path` exactly once.
pub fn ensure_on_search_path(search_path: &mut SearchPath, root: &ProjectRoot) -> bool {
    let inserted = search_path.ensure(root);
    if inserted {
        tracing::debug!(root = %root, "Added project root to search path");
    }
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::root::resolve_root_from;
    use std::fs;

    fn root(path: &str) -> ProjectRoot {
        resolve_root_from(&Path::new(path).join("run")).unwrap()
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let root = root("/srv/app");
        let mut path = SearchPath::from_env_value(OsStr::new("/opt/lib"));

        assert!(ensure_on_search_path(&mut path, &root));
        assert!(!ensure_on_search_path(&mut path, &root));

        assert_eq!(
            path.entries(),
            &[PathBuf::from("/srv/app"), PathBuf::from("/opt/lib")]
        );
    }

    #[test]
    fn test_ensure_keeps_existing_position() {
        let root = root("/srv/app");
        let mut path = SearchPath::from_env_value(OsStr::new("/opt/lib:/srv/app"));

        assert!(!path.ensure(&root));
        assert_eq!(path.entries().len(), 2);
        assert_eq!(path.entries()[1], PathBuf::from("/srv/app"));
    }

    #[test]
    fn test_from_env_value_skips_empty_entries() {
        let path = SearchPath::from_env_value(OsStr::new("/a::/b:"));
        assert_eq!(path.entries(), &[PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn test_locate_module_file_and_package() {
        let dir = tempfile::tempdir().unwrap();
        let root = resolve_root_from(&dir.path().join("run")).unwrap();
        let mut path = SearchPath::new();
        path.ensure(&root);

        let app: AppReference = "backend.main:app".parse().unwrap();
        assert_eq!(path.locate_module(&app), None);

        fs::create_dir_all(dir.path().join("backend/main")).unwrap();
        assert_eq!(path.locate_module(&app), Some(dir.path().join("backend/main")));

        fs::write(dir.path().join("backend/main/__init__.py"), "").unwrap();
        assert_eq!(
            path.locate_module(&app),
            Some(dir.path().join("backend/main/__init__.py"))
        );

        fs::write(dir.path().join("backend/main.py"), "app = None\n").unwrap();
        assert_eq!(path.locate_module(&app), Some(dir.path().join("backend/main.py")));
    }
}
