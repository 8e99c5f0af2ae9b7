//! Compile-time constant declarations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token replaced with the library version.
pub const APP_VERSION_TOKEN: &str = "__APP_VERSION__";

/// Token replaced with the build mode.
pub const NODE_ENV_TOKEN: &str = "process.env.NODE_ENV";

/// Environment variables consulted, in order, for the library version.
pub const VERSION_ENV_VARS: [&str; 2] = ["APP_VERSION", "npm_package_version"];

/// Version used when no source provides one.
pub const FALLBACK_VERSION: &str = "0.0.0";

/// Where the value of a define token comes from.
///
/// In configuration files:
///
/// ```toml
/// [define]
/// __DEV__ = false
/// "process.env.NODE_ENV" = { env = "NODE_ENV", default = "development" }
/// __APP_VERSION__ = { package = "version" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefineSource {
    /// Read from an environment variable, falling back to `default`.
    Env {
        env: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    /// Read from the project manifest.
    Package { package: PackageField },
    /// A fixed JSON value.
    Literal(Value),
}

/// Manifest fields that can back a define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageField {
    /// `version`, overridden by `APP_VERSION` or `npm_package_version`.
    Version,
}

impl DefineSource {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn env(var: impl Into<String>, default: Option<Value>) -> Self {
        Self::Env {
            env: var.into(),
            default,
        }
    }

    pub fn package_version() -> Self {
        Self::Package {
            package: PackageField::Version,
        }
    }
}

/// Defines present in every build unless the configuration replaces them.
pub fn default_defines() -> IndexMap<String, DefineSource> {
    IndexMap::from([
        (
            APP_VERSION_TOKEN.to_string(),
            DefineSource::package_version(),
        ),
        (
            NODE_ENV_TOKEN.to_string(),
            DefineSource::env("NODE_ENV", Some(Value::from("development"))),
        ),
    ])
}

/// Parse a command-line `TOKEN=VALUE` pair.
///
/// The value is read as JSON when it parses, otherwise it is taken as a string.
pub fn parse_define(s: &str) -> Result<(String, DefineSource), String> {
    let (token, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid define '{s}': expected TOKEN=VALUE"))?;
    let token = token.trim();
    if token.is_empty() {
        return Err(format!("invalid define '{s}': token cannot be empty"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((token.to_string(), DefineSource::Literal(value)))
}
