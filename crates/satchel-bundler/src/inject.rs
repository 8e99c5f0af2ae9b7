//! Compile-time constant injection.
//!
//! Define values are computed once per build from the environment snapshot
//! and substituted into every bundled module before any other transform.

use std::borrow::Cow;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use satchel_config::validation::{check_define_value, is_identifier_char};
use satchel_config::{
    ConfigError, DefineSource, Environment, FALLBACK_VERSION, PackageField, PackageManifest,
    VERSION_ENV_VARS,
};

/// Replacement text used when an environment-backed define has no value.
const UNDEFINED: &str = "undefined";

/// Resolved define tokens and their replacement text.
#[derive(Debug, Clone)]
pub struct DefineTable {
    /// Longest token first.
    entries: Vec<(String, String)>,
    pattern: Option<Regex>,
}

impl DefineTable {
    /// Compute every define value from `env` and the manifest under `root`.
    ///
    /// This is the only place a build reads define inputs; the table is
    /// immutable afterwards.
    pub fn capture(
        defines: &IndexMap<String, DefineSource>,
        env: &Environment,
        root: &Path,
    ) -> Result<Self, ConfigError> {
        let mut manifest_version: Option<Option<String>> = None;
        let mut values = IndexMap::with_capacity(defines.len());

        for (token, source) in defines {
            let text = match source {
                DefineSource::Literal(value) => value.to_string(),
                DefineSource::Env { env: var, default } => match env.get(var) {
                    Some(value) => serde_json::Value::from(value).to_string(),
                    None => default
                        .as_ref()
                        .map_or_else(|| UNDEFINED.to_string(), |v| v.to_string()),
                },
                DefineSource::Package {
                    package: PackageField::Version,
                } => {
                    let version = match env.first_of(&VERSION_ENV_VARS) {
                        Some(v) => v.to_string(),
                        None => manifest_version
                            .get_or_insert_with(|| read_manifest_version(root))
                            .clone()
                            .unwrap_or_else(|| FALLBACK_VERSION.to_string()),
                    };
                    serde_json::Value::from(version).to_string()
                }
            };
            tracing::debug!(token = %token, value = %text, "captured define");
            values.insert(token.clone(), text);
        }

        for (token, text) in &values {
            check_define_value(token, text, values.keys().map(String::as_str))?;
        }

        Ok(Self::from_entries(values))
    }

    /// Build a table from already-serialized replacement text.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut entries: Vec<(String, String)> = entries.into_iter().collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let pattern = (!entries.is_empty()).then(|| {
            let alternation = entries
                .iter()
                .map(|(token, _)| regex::escape(token))
                .collect::<Vec<_>>()
                .join("|");
            // Escaped literal alternation; always a valid pattern.
            Regex::new(&alternation)
        });

        Self {
            pattern: pattern.and_then(Result::ok),
            entries,
        }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            pattern: None,
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every define token in `source` with its value.
    ///
    /// Tokens only match on identifier boundaries: never after an identifier
    /// character or `.`, never before an identifier character. Text is
    /// borrowed back unchanged when nothing matches.
    pub fn substitute<'s>(&self, source: &'s str) -> Cow<'s, str> {
        let Some(pattern) = &self.pattern else {
            return Cow::Borrowed(source);
        };

        let mut out: Option<String> = None;
        let mut copied = 0;
        let mut pos = 0;

        while let Some(m) = pattern.find_at(source, pos) {
            let start = m.start();
            match self.token_at(source, start) {
                Some((token, value)) => {
                    let buf = out.get_or_insert_with(|| String::with_capacity(source.len()));
                    buf.push_str(&source[copied..start]);
                    buf.push_str(value);
                    copied = start + token.len();
                    pos = copied;
                }
                None => {
                    pos = start + source[start..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }

        match out {
            Some(mut buf) => {
                buf.push_str(&source[copied..]);
                Cow::Owned(buf)
            }
            None => Cow::Borrowed(source),
        }
    }

    /// Longest token starting at `start` that sits on identifier boundaries.
    fn token_at(&self, source: &str, start: usize) -> Option<(&str, &str)> {
        let before = source[..start].chars().next_back();
        if before.is_some_and(|c| is_identifier_char(c) || c == '.') {
            return None;
        }
        self.entries.iter().find_map(|(token, value)| {
            let rest = source[start..].strip_prefix(token.as_str())?;
            if rest.chars().next().is_some_and(is_identifier_char) {
                return None;
            }
            Some((token.as_str(), value.as_str()))
        })
    }
}

fn read_manifest_version(root: &Path) -> Option<String> {
    match PackageManifest::read(root) {
        Ok(manifest) => manifest.and_then(|m| m.version),
        Err(err) => {
            tracing::warn!(error = %err, "could not read package.json version");
            None
        }
    }
}
