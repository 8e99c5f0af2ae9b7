//! `package.json` fields the build consults.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ConfigError, Result};

pub const MANIFEST_FILE: &str = "package.json";

/// Key under which a `package.json` may carry satchel settings.
pub const MANIFEST_CONFIG_KEY: &str = "satchel";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub satchel: Option<Value>,
}

impl PackageManifest {
    /// Read `<root>/package.json`, returning `None` when it does not exist.
    pub fn read(root: &Path) -> Result<Option<Self>> {
        let path = root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let manifest = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
            field: MANIFEST_FILE.to_string(),
            hint: Some(format!("Invalid JSON: {e}")),
        })?;
        Ok(Some(manifest))
    }

    /// Package name without its npm scope, usable as a file name.
    pub fn bare_name(&self) -> Option<&str> {
        let name = self.name.as_deref()?.trim();
        let bare = name.rsplit('/').next().unwrap_or(name);
        (!bare.is_empty()).then_some(bare)
    }

    /// The settings object under the `satchel` key, when present and not null.
    pub fn config_section(&self) -> Option<&Value> {
        self.satchel.as_ref().filter(|v| !v.is_null())
    }
}
