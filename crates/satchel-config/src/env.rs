//! Process environment snapshot.
//!
//! A build reads environment variables exactly once. Everything downstream
//! works from the captured [`Environment`], so two builds given the same
//! snapshot see the same values.

use indexmap::IndexMap;

/// Immutable view of environment variables taken at a single point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: IndexMap<String, String>,
}

impl Environment {
    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn capture() -> Self {
        let mut vars: IndexMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        vars.sort_keys();
        tracing::debug!(count = vars.len(), "captured process environment");
        Self { vars }
    }

    /// An environment with no variables set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an environment from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns the first variable in `names` that is set to a non-empty value.
    pub fn first_of<'a>(&'a self, names: &[&str]) -> Option<&'a str> {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .find(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_of_skips_unset_and_empty() {
        let env = Environment::from_pairs([("A", ""), ("B", "2"), ("C", "3")]);
        assert_eq!(env.first_of(&["Z", "A", "B", "C"]), Some("2"));
        assert_eq!(env.first_of(&["Z"]), None);
    }

    #[test]
    fn empty_environment_has_no_values() {
        let env = Environment::empty();
        assert!(env.is_empty());
        assert_eq!(env.get("PATH"), None);
    }
}
