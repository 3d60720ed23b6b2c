//! Decides which file changes warrant a restart.

use std::path::{Component, Path};

use glob_match::glob_match;

/// Include/exclude globs applied to changed paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl WatchFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// `path` is relative to the watched directory it was reported under.
    ///
    /// Excludes apply to every component, so an excluded directory hides
    /// everything below it. Includes apply to the file name only.
    pub fn matches(&self, path: &Path) -> bool {
        let mut file_name = None;
        for component in path.components() {
            if let Component::Normal(name) = component {
                let Some(name) = name.to_str() else {
                    return false;
                };
                if self.exclude.iter().any(|p| glob_match(p, name)) {
                    return false;
                }
                file_name = Some(name);
            }
        }

        match file_name {
            Some(name) => self.include.iter().any(|p| glob_match(p, name)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReloadConfig;

    fn default_filter() -> WatchFilter {
        let config = ReloadConfig::default();
        WatchFilter::new(config.include, config.exclude)
    }

    #[test]
    fn test_python_sources_trigger() {
        let filter = default_filter();
        assert!(filter.matches(Path::new("main.py")));
        assert!(filter.matches(Path::new("routers/jobs.py")));
    }

    #[test]
    fn test_non_matching_extensions_ignored() {
        let filter = default_filter();
        assert!(!filter.matches(Path::new("notes.txt")));
        assert!(!filter.matches(Path::new("main.pyc")));
    }

    #[test]
    fn test_excluded_components_hide_children() {
        let filter = default_filter();
        assert!(!filter.matches(Path::new("__pycache__/main.py")));
        assert!(!filter.matches(Path::new(".venv/lib/site.py")));
        assert!(!filter.matches(Path::new(".main.py.swp")));
        assert!(!filter.matches(Path::new("~main.py")));
    }

    #[test]
    fn test_custom_patterns() {
        let filter = WatchFilter::new(
            vec!["*.py".into(), "*.{toml,yaml}".into()],
            vec!["fixtures".into()],
        );
        assert!(filter.matches(Path::new("settings.yaml")));
        assert!(filter.matches(Path::new("pyproject.toml")));
        assert!(!filter.matches(Path::new("fixtures/seed.py")));
    }

    #[test]
    fn test_empty_path_never_matches() {
        assert!(!default_filter().matches(Path::new("")));
    }
}
