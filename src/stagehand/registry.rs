//! Environment name resolution.
//!
//! The engine never knows where environments live; it asks a registry. The
//! registry is read-only for the engine's lifetime: the set of environments
//! is fixed at construction and resolution never mutates it.

use std::path::PathBuf;

/// Read-only lookup from environment name to its root directory.
pub trait EnvRegistry {
    /// Resolve a name to its absolute root path, or `None` if unknown.
    fn resolve(&self, name: &str) -> Option<PathBuf>;

    /// All known environment names, in registration order.
    fn names(&self) -> Vec<String>;
}

/// A fixed, ordered name → path table.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    environments: Vec<(String, PathBuf)>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.environments.push((name.into(), path.into()));
        self
    }

    pub fn from_pairs(pairs: Vec<(String, PathBuf)>) -> Self {
        Self {
            environments: pairs,
        }
    }
}

impl EnvRegistry for StaticRegistry {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.environments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
    }

    fn names(&self) -> Vec<String> {
        self.environments.iter().map(|(n, _)| n.clone()).collect()
    }
}
