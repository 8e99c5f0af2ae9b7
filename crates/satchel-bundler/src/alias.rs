//! Import prefix aliases.
//!
//! An alias maps a symbolic prefix such as `@` to an absolute directory, so
//! `@/components/chart` reads `<root>/src/components/chart` regardless of the
//! importing file or the process working directory.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

/// Resolves aliased specifiers to filesystem paths.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    /// Sorted longest prefix first so nested prefixes win.
    entries: Vec<(String, PathBuf)>,
}

impl AliasResolver {
    pub fn new(aliases: &IndexMap<String, PathBuf>) -> Self {
        let mut entries: Vec<(String, PathBuf)> = aliases
            .iter()
            .map(|(prefix, dir)| (prefix.clone(), dir.clone()))
            .collect();
        // Stable sort keeps declaration order among equal lengths.
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { entries }
    }

    /// Rewrite `specifier` when it starts with a configured prefix.
    ///
    /// A prefix matches when the specifier equals it or continues with `/`.
    /// Returns `None` for specifiers no alias applies to.
    pub fn resolve(&self, specifier: &str) -> Option<PathBuf> {
        self.entries.iter().find_map(|(prefix, root)| {
            let rest = specifier.strip_prefix(prefix.as_str())?;
            if rest.is_empty() {
                return Some(root.clone());
            }
            let rest = rest.strip_prefix('/')?;
            Some(path_clean::clean(root.join(rest)))
        })
    }

    /// Whether any alias applies to `specifier`.
    pub fn matches(&self, specifier: &str) -> bool {
        self.resolve(specifier).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured prefixes and their targets, longest prefix first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(p, d)| (p.as_str(), d.as_path()))
    }
}
