//! Dotted application references (`package.module:attribute`).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a string is not a usable application reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppReferenceError {
    #[error("{0:?} is missing the ':' separating module and attribute")]
    MissingSeparator(String),

    #[error("{0:?} has an empty module path")]
    EmptyModule(String),

    #[error("{0:?} has an empty attribute")]
    EmptyAttribute(String),

    #[error("{reference:?} contains invalid identifier {segment:?}")]
    InvalidIdentifier { reference: String, segment: String },
}

/// An application object addressed by module path and attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppReference {
    module: String,
    attribute: String,
}

impl AppReference {
    /// Dotted module path, e.g. `backend.main`.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Attribute inside the module, e.g. `app`.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Relative locations the module may live at under a search-path entry,
    /// in lookup order: a source file, a regular package, a namespace package.
    pub fn module_candidates(&self) -> [PathBuf; 3] {
        let base: PathBuf = self.module.split('.').collect();
        [
            base.with_extension("py"),
            base.join("__init__.py"),
            base,
        ]
    }
}

impl FromStr for AppReference {
    type Err = AppReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, attribute) = s
            .split_once(':')
            .ok_or_else(|| AppReferenceError::MissingSeparator(s.to_string()))?;

        if module.is_empty() {
            return Err(AppReferenceError::EmptyModule(s.to_string()));
        }
        if attribute.is_empty() {
            return Err(AppReferenceError::EmptyAttribute(s.to_string()));
        }

        // The attribute may itself be dotted (`module:factory.app`).
        for segment in module.split('.').chain(attribute.split('.')) {
            if !is_identifier(segment) {
                return Err(AppReferenceError::InvalidIdentifier {
                    reference: s.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self {
            module: module.to_string(),
            attribute: attribute.to_string(),
        })
    }
}

impl fmt::Display for AppReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.attribute)
    }
}

impl Serialize for AppReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}
