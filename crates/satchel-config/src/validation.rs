//! Pluggable config validation strategies
//!
//! Separates filesystem validation from schema validation, so a config can be
//! checked for consistency before anything on disk is touched.

use std::collections::BTreeMap;

use crate::config::BuildConfig;
use crate::define::DefineSource;
use crate::error::{ConfigError, Result};

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &BuildConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// Runs on every [`BuildConfig`] at construction.
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &BuildConfig) -> Result<()> {
        validate_package_name(config.package_name())?;
        validate_formats(config)?;

        for external in config.externals() {
            if external.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: "external specifiers cannot be empty".to_string(),
                    hint: Some("Remove empty strings from the 'external' array".to_string()),
                });
            }
        }

        for (specifier, global) in config.globals() {
            if !config.externals().contains(specifier) {
                return Err(ConfigError::GlobalWithoutExternal {
                    specifier: specifier.clone(),
                    global: global.clone(),
                });
            }
            validate_global_name(&format!("globals.{specifier}"), global)?;
        }

        if config.formats().iter().any(|f| f.exposes_global()) {
            validate_global_name("globalName", config.global_name())?;
        }

        for prefix in config.aliases().keys() {
            validate_alias_prefix(prefix)?;
        }

        validate_defines(config)
    }
}

/// Filesystem validator
///
/// Checks that the entry module is a readable file and that the output
/// directory is usable. Runs schema validation first.
pub struct FsValidator;

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &BuildConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        let entry = config.entry_path();
        if !entry.exists() {
            return Err(ConfigError::EntryNotFound {
                path: entry.to_path_buf(),
            });
        }
        if !entry.is_file() || std::fs::File::open(entry).is_err() {
            return Err(ConfigError::EntryNotFile {
                path: entry.to_path_buf(),
            });
        }

        let out_dir = config.out_dir();
        if out_dir.exists() && !out_dir.is_dir() {
            return Err(ConfigError::OutDirIsFile {
                path: out_dir.to_path_buf(),
            });
        }

        for (prefix, dir) in config.aliases() {
            if !dir.is_dir() {
                tracing::warn!(prefix, dir = %dir.display(), "alias target directory does not exist");
            }
        }

        Ok(())
    }
}

/// Convenience function for schema-only validation
pub fn validate_schema(config: &BuildConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Convenience function for filesystem validation
pub fn validate_fs(config: &BuildConfig) -> Result<()> {
    FsValidator.validate(config)
}

/// Characters allowed after the first character of a JavaScript identifier.
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_char),
        _ => false,
    }
}

/// `a`, `a.b.c`: identifiers joined by dots.
pub fn is_identifier_path(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(is_identifier)
}

/// Validate global name follows JavaScript identifier rules (dotted paths allowed).
pub fn validate_global_name(field: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ConfigError::InvalidIdentifier {
            field: field.to_string(),
            value: String::new(),
            hint: "Global name cannot be empty".to_string(),
        });
    }

    for segment in name.split('.') {
        let Some(first) = segment.chars().next() else {
            return Err(ConfigError::InvalidIdentifier {
                field: field.to_string(),
                value: name.to_string(),
                hint: "Empty segment in dotted global name".to_string(),
            });
        };
        if !is_identifier_start(first) {
            return Err(ConfigError::InvalidIdentifier {
                field: field.to_string(),
                value: name.to_string(),
                hint: format!("Must start with letter, underscore, or dollar sign (got '{first}')"),
            });
        }
        if let Some(c) = segment.chars().find(|c| !is_identifier_char(*c)) {
            return Err(ConfigError::InvalidIdentifier {
                field: field.to_string(),
                value: name.to_string(),
                hint: format!("Invalid character '{c}' in identifier; set `globalName` explicitly"),
            });
        }
    }

    Ok(())
}

/// Identifier a module specifier or package name is known by as a global.
///
/// Follows the usual convention: last path segment, extension dropped,
/// dashes and dots camel-cased, illegal characters removed.
pub fn guess_global_name(specifier: &str) -> String {
    let base = specifier
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or(specifier);
    let base = base
        .rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && matches!(*ext, "js" | "mjs" | "cjs" | "ts"))
        .map_or(base, |(stem, _)| stem);

    let mut out = String::with_capacity(base.len());
    let mut upper_next = false;
    for c in base.chars() {
        if c == '-' || c == '.' {
            upper_next = !out.is_empty();
        } else if is_identifier_char(c) {
            if upper_next {
                out.extend(c.to_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        }
    }
    if !out.starts_with(is_identifier_start) {
        out.insert(0, '_');
    }
    out
}

/// Whether `token` occurs in `text` on identifier boundaries.
///
/// The character before a match may not be an identifier character or `.`,
/// the one after may not be an identifier character.
pub fn contains_token(text: &str, token: &str) -> bool {
    text.match_indices(token).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + token.len()..].chars().next();
        !before.is_some_and(|c| is_identifier_char(c) || c == '.')
            && !after.is_some_and(is_identifier_char)
    })
}

/// Reject a define value whose serialized form would be rewritten again.
pub fn check_define_value<'a>(
    token: &str,
    serialized: &str,
    tokens: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    for other in tokens {
        if contains_token(serialized, other) {
            return Err(ConfigError::DefineSelfReference {
                token: token.to_string(),
                contains: other.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_package_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
    {
        return Err(ConfigError::InvalidValue {
            field: "name".to_string(),
            hint: Some(format!(
                "'{name}' cannot be used as an output file name; use letters, digits, '-', '_' or '.'"
            )),
        });
    }
    Ok(())
}

fn validate_formats(config: &BuildConfig) -> Result<()> {
    if config.formats().is_empty() {
        return Err(ConfigError::SchemaValidation {
            message: "no output formats requested".to_string(),
            hint: Some("Set `formats`, e.g. [\"es\", \"umd\"]".to_string()),
        });
    }

    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for format in config.formats() {
        seen.entry(format.file_name(config.package_name()))
            .or_default()
            .push(format.to_string());
    }
    if let Some((file_name, formats)) = seen.into_iter().find(|(_, f)| f.len() > 1) {
        return Err(ConfigError::FilenameCollision {
            file_name,
            formats: formats.join(", "),
        });
    }
    Ok(())
}

fn validate_alias_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(ConfigError::InvalidAlias {
            prefix: prefix.to_string(),
            hint: "prefix cannot be empty".to_string(),
        });
    }
    if prefix.ends_with('/') {
        return Err(ConfigError::InvalidAlias {
            prefix: prefix.to_string(),
            hint: "prefix must not end with '/'".to_string(),
        });
    }
    if prefix.starts_with('.') || prefix.starts_with('/') {
        return Err(ConfigError::InvalidAlias {
            prefix: prefix.to_string(),
            hint: "relative and absolute paths cannot be aliased".to_string(),
        });
    }
    Ok(())
}

/// Words a define value can serialize to; tokens may not begin with them.
const LITERAL_WORDS: [&str; 4] = ["true", "false", "null", "undefined"];

fn validate_defines(config: &BuildConfig) -> Result<()> {
    let defines = config.defines();
    for token in defines.keys() {
        if !is_identifier_path(token) {
            return Err(ConfigError::InvalidIdentifier {
                field: "define".to_string(),
                value: token.clone(),
                hint: "Define tokens are identifiers or dotted paths like process.env.NODE_ENV"
                    .to_string(),
            });
        }
        let head = token.split('.').next().unwrap_or(token);
        if LITERAL_WORDS.contains(&head) {
            return Err(ConfigError::InvalidIdentifier {
                field: "define".to_string(),
                value: token.clone(),
                hint: format!("'{head}' is a literal and cannot start a define token"),
            });
        }
    }

    let tokens = || defines.keys().map(String::as_str);
    for (token, source) in defines {
        let value = match source {
            DefineSource::Literal(value) => Some(value),
            DefineSource::Env { default, .. } => default.as_ref(),
            DefineSource::Package { .. } => None,
        };
        if let Some(value) = value {
            check_define_value(token, &value.to_string(), tokens())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;
    use tempfile::TempDir;

    fn builder() -> crate::BuildConfigBuilder {
        BuildConfig::builder("/proj", "src/index.ts", "lib")
    }

    #[test]
    fn schema_validator_accepts_valid_config() {
        let config = builder()
            .external("vue")
            .global("vue", "Vue")
            .build()
            .unwrap();
        assert!(validate_schema(&config).is_ok());
    }

    #[test]
    fn duplicate_formats_collide() {
        let err = builder()
            .formats([OutputFormat::Es, OutputFormat::Umd, OutputFormat::Es])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FilenameCollision { ref file_name, .. } if file_name == "lib.js"));
    }

    #[test]
    fn empty_formats_rejected() {
        let err = builder().formats([]).build().unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn explicit_global_name_must_be_identifier() {
        let err = BuildConfig::builder("/proj", "index.ts", "my-lib")
            .global_name("my-lib")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentifier { ref field, .. } if field == "globalName"));

        // ES-only builds never need a global
        assert!(
            BuildConfig::builder("/proj", "index.ts", "my-lib")
                .global_name("my-lib")
                .formats([OutputFormat::Es])
                .build()
                .is_ok()
        );
        assert!(
            BuildConfig::builder("/proj", "index.ts", "my-lib")
                .global_name("Acme.MyLib")
                .build()
                .is_ok()
        );
    }

    #[test]
    fn default_umd_build_accepts_hyphenated_package() {
        let config = BuildConfig::builder("/proj", "index.ts", "my-lib")
            .build()
            .unwrap();
        assert_eq!(config.global_name(), "myLib");
    }

    #[test]
    fn guessed_globals_are_identifiers() {
        assert_eq!(guess_global_name("pg-explain"), "pgExplain");
        assert_eq!(guess_global_name("@vue/shared"), "shared");
        assert_eq!(guess_global_name("--"), "_");
        for name in ["3d-lib", "a..b", "x.mjs", "@scope/-lead"] {
            assert!(is_identifier(&guess_global_name(name)), "{name}");
        }
    }

    #[test]
    fn invalid_global_mapping_rejected() {
        let err = builder()
            .external("vue")
            .global("vue", "not a global")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentifier { ref field, .. } if field == "globals.vue"));
    }

    #[test]
    fn alias_prefix_rules() {
        assert!(matches!(
            builder().alias("", "src").build(),
            Err(ConfigError::InvalidAlias { .. })
        ));
        assert!(matches!(
            builder().alias("@/", "src").build(),
            Err(ConfigError::InvalidAlias { .. })
        ));
        assert!(matches!(
            builder().alias("./x", "src").build(),
            Err(ConfigError::InvalidAlias { .. })
        ));
        assert!(builder().alias("~lib", "src").build().is_ok());
    }

    #[test]
    fn define_value_containing_token_rejected() {
        let err = builder()
            .define("__A__", DefineSource::literal("__A__ again"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DefineSelfReference { .. }));

        let err = builder()
            .define("__MODE__", DefineSource::literal("process.env.NODE_ENV"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DefineSelfReference { ref contains, .. } if contains == "process.env.NODE_ENV"));
    }

    #[test]
    fn define_value_with_token_substring_accepted() {
        let config = builder()
            .define("__A__", DefineSource::literal("x__A__y"))
            .build();
        assert!(config.is_ok());
    }

    #[test]
    fn invalid_define_token_rejected() {
        let err = builder()
            .define("not-valid", DefineSource::literal(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentifier { .. }));

        let err = builder()
            .define("undefined.x", DefineSource::literal(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentifier { .. }));
    }

    #[test]
    fn contains_token_respects_boundaries() {
        assert!(contains_token("a + __V__;", "__V__"));
        assert!(!contains_token("a.__V__", "__V__"));
        assert!(!contains_token("x__V__", "__V__"));
        assert!(!contains_token("__V__x", "__V__"));
        assert!(contains_token("\"__V__\"", "__V__"));
    }

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("$vue_2"));
        assert!(!is_identifier("2vue"));
        assert!(is_identifier_path("process.env.NODE_ENV"));
        assert!(!is_identifier_path("process..env"));
    }

    #[test]
    fn fs_validator_reports_missing_entry() {
        let dir = TempDir::new().unwrap();
        let config = BuildConfig::builder(dir.path(), "src/index.ts", "lib")
            .build()
            .unwrap();
        assert!(matches!(
            validate_fs(&config),
            Err(ConfigError::EntryNotFound { .. })
        ));
    }

    #[test]
    fn fs_validator_rejects_directory_entry() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/index.ts")).unwrap();
        let config = BuildConfig::builder(dir.path(), "src/index.ts", "lib")
            .build()
            .unwrap();
        assert!(matches!(
            validate_fs(&config),
            Err(ConfigError::EntryNotFile { .. })
        ));
    }

    #[test]
    fn fs_validator_rejects_file_out_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.ts"), "export {}").unwrap();
        std::fs::write(dir.path().join("dist"), "").unwrap();
        let config = BuildConfig::builder(dir.path(), "index.ts", "lib")
            .build()
            .unwrap();
        assert!(matches!(
            validate_fs(&config),
            Err(ConfigError::OutDirIsFile { .. })
        ));
    }
}
