//! External dependency classification.

use indexmap::{IndexMap, IndexSet};
use satchel_config::BuildConfig;

/// How the bundle treats one import specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Code is pulled into the artifact.
    Bundle,
    /// Left as a runtime dependency; `global` names the host variable that
    /// provides it to script-tag consumers.
    External { global: Option<String> },
}

impl Classification {
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External { .. })
    }
}

/// Decides bundle vs external for every import of a build.
///
/// Built once per build and shared by every output format, so all artifacts
/// agree on the external set.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    externals: IndexSet<String>,
    globals: IndexMap<String, String>,
}

impl Classifier {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            externals: config.externals().clone(),
            globals: config.globals().clone(),
        }
    }

    /// Classify `specifier`.
    ///
    /// Exact matches and package subpaths (`vue/dist/x` when `vue` is
    /// external) are external. Globals attach only on exact matches.
    pub fn classify(&self, specifier: &str) -> Classification {
        if self.externals.contains(specifier) {
            return Classification::External {
                global: self.globals.get(specifier).cloned(),
            };
        }
        let is_subpath = self.externals.iter().any(|ext| {
            specifier
                .strip_prefix(ext.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        });
        if is_subpath {
            Classification::External { global: None }
        } else {
            Classification::Bundle
        }
    }

    pub fn externals(&self) -> &IndexSet<String> {
        &self.externals
    }

    pub fn global_for(&self, specifier: &str) -> Option<&str> {
        self.globals.get(specifier).map(String::as_str)
    }
}

/// Global variable name to assume for an external with no configured mapping.
pub use satchel_config::validation::guess_global_name;
