//! File-based config discovery and layered loading
//!
//! Settings are merged from, lowest to highest priority: built-in defaults,
//! the discovered (or explicit) config file, `SATCHEL_*` environment
//! variables, and whatever the caller merges on top (command-line flags).

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format as _, Json, Serialized, Toml};

use crate::config::LibraryConfig;
use crate::error::{ConfigError, Result};
use crate::manifest::{MANIFEST_FILE, PackageManifest};

pub const TOML_CONFIG_FILE: &str = "satchel.toml";
pub const JSON_CONFIG_FILE: &str = "satchel.config.json";

/// Prefix for environment overrides, e.g. `SATCHEL_OUTDIR=lib`.
pub const ENV_PREFIX: &str = "SATCHEL_";

/// Settings that may be overridden from the environment. Keys are matched
/// case-insensitively after the prefix is removed.
const ENV_KEYS: &[&str] = &[
    "entry",
    "name",
    "globalname",
    "formats",
    "outdir",
    "platform",
    "sourcemap",
    "minify",
    "banner",
];

/// Where a configuration file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Toml(PathBuf),
    Json(PathBuf),
    /// The `satchel` field of a `package.json`
    Manifest(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Toml(p) | Self::Json(p) | Self::Manifest(p) => p,
        }
    }

    fn from_path(path: &Path) -> Self {
        let path = path.to_path_buf();
        if path.file_name().is_some_and(|n| n == MANIFEST_FILE) {
            Self::Manifest(path)
        } else if path.extension().is_some_and(|e| e == "json") {
            Self::Json(path)
        } else {
            Self::Toml(path)
        }
    }
}

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use satchel_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load(None).unwrap();
/// let build = config.into_build_config(discovery.root()).unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. satchel.toml
    /// 2. satchel.config.json
    /// 3. package.json (satchel field)
    pub fn find(&self) -> Option<ConfigSource> {
        let toml_path = self.root.join(TOML_CONFIG_FILE);
        if toml_path.is_file() {
            return Some(ConfigSource::Toml(toml_path));
        }

        let json_path = self.root.join(JSON_CONFIG_FILE);
        if json_path.is_file() {
            return Some(ConfigSource::Json(json_path));
        }

        match PackageManifest::read(&self.root) {
            Ok(Some(manifest)) if manifest.config_section().is_some() => {
                Some(ConfigSource::Manifest(self.root.join(MANIFEST_FILE)))
            }
            _ => None,
        }
    }

    /// Defaults, config file and environment, ready for callers to merge
    /// their own overrides on top.
    ///
    /// An explicit path must exist; otherwise discovery is used and a missing
    /// file is not an error.
    pub fn figment(&self, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(LibraryConfig::default()));

        let source = match explicit {
            Some(path) => {
                let path = self.root.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(ConfigSource::from_path(&path))
            }
            None => self.find(),
        };

        match &source {
            Some(ConfigSource::Toml(path)) => figment = figment.merge(Toml::file(path)),
            Some(ConfigSource::Json(path)) => figment = figment.merge(Json::file(path)),
            Some(ConfigSource::Manifest(path)) => {
                let root = path.parent().unwrap_or(&self.root);
                if let Some(section) = PackageManifest::read(root)?
                    .as_ref()
                    .and_then(PackageManifest::config_section)
                {
                    figment = figment.merge(Serialized::defaults(section.clone()));
                }
            }
            None => {}
        }
        if let Some(source) = &source {
            tracing::debug!(path = %source.path().display(), "loading configuration file");
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .filter(|key| ENV_KEYS.iter().any(|k| key.as_str().eq_ignore_ascii_case(k))),
        );

        Ok(figment)
    }

    /// Load config from defaults, file and environment.
    pub fn load(&self, explicit: Option<&Path>) -> Result<LibraryConfig> {
        extract(self.figment(explicit)?)
    }
}

/// Extract a [`LibraryConfig`] from a fully merged figment.
pub fn extract(figment: Figment) -> Result<LibraryConfig> {
    Ok(figment.extract()?)
}

/// Discover and load config from `root` (convenience function)
pub fn discover(root: impl AsRef<Path>) -> Result<LibraryConfig> {
    ConfigDiscovery::new(root).load(None)
}
