//! Library build settings.
//!
//! [`LibraryConfig`] is the serde model read from files, environment and
//! command line. [`BuildConfig`] is the validated, immutable value a build runs
//! from: every path absolute, every default applied.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::define::{DefineSource, default_defines};
use crate::error::{ConfigError, Result};
use crate::format::{OutputFormat, Platform};
use crate::manifest::PackageManifest;
use crate::validation::{ConfigValidator, SchemaValidator, guess_global_name};

/// Declarative library settings as written by users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LibraryConfig {
    /// Entry module, relative to the project root.
    #[serde(default = "default_entry")]
    pub entry: PathBuf,

    /// Base name for output files. Defaults to the unscoped `package.json` name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Global the UMD and IIFE builds assign the library's exports to.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "globalname")]
    pub global_name: Option<String>,

    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,

    #[serde(default = "default_out_dir", alias = "outdir")]
    pub out_dir: PathBuf,

    /// Specifiers the host provides; never bundled.
    #[serde(default)]
    pub external: Vec<String>,

    /// External specifier to global variable, for script-tag consumers.
    #[serde(default)]
    pub globals: IndexMap<String, String>,

    /// Import prefix to directory, relative to the project root.
    #[serde(default)]
    pub alias: IndexMap<String, PathBuf>,

    #[serde(default)]
    pub define: IndexMap<String, DefineSource>,

    #[serde(default)]
    pub platform: Platform,

    #[serde(default)]
    pub sourcemap: bool,

    #[serde(default)]
    pub minify: bool,

    /// Comment placed at the top of the entry module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

pub(crate) fn default_entry() -> PathBuf {
    PathBuf::from("src/index.ts")
}

pub(crate) fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Es, OutputFormat::Umd]
}

pub(crate) fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

/// Alias every project gets unless it maps `@` itself.
pub const DEFAULT_ALIAS: (&str, &str) = ("@", "src");

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            name: None,
            global_name: None,
            formats: default_formats(),
            out_dir: default_out_dir(),
            external: Vec::new(),
            globals: IndexMap::new(),
            alias: IndexMap::new(),
            define: IndexMap::new(),
            platform: Platform::default(),
            sourcemap: false,
            minify: false,
            banner: None,
        }
    }
}

impl LibraryConfig {
    /// Resolve against `root` into a validated [`BuildConfig`].
    ///
    /// Applies the `@` to `src` alias and the default defines where the
    /// configuration does not set them.
    pub fn into_build_config(self, root: impl AsRef<Path>) -> Result<BuildConfig> {
        let root = absolute_root(root.as_ref())?;

        let name = match self.name {
            Some(name) => name,
            None => PackageManifest::read(&root)?
                .as_ref()
                .and_then(|m| m.bare_name().map(str::to_string))
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "name".to_string(),
                    hint: Some(
                        "Set `name`, or add a \"name\" field to package.json".to_string(),
                    ),
                })?,
        };

        let mut builder = BuildConfig::builder(&root, self.entry, name)
            .formats(self.formats)
            .out_dir(self.out_dir)
            .platform(self.platform)
            .sourcemap(self.sourcemap)
            .minify(self.minify)
            .externals(self.external);

        if let Some(global_name) = self.global_name {
            builder = builder.global_name(global_name);
        }
        if let Some(banner) = self.banner {
            builder = builder.banner(banner);
        }
        for (specifier, global) in self.globals {
            builder = builder.global(specifier, global);
        }
        for (prefix, dir) in self.alias {
            builder = builder.alias(prefix, dir);
        }
        if !builder.aliases.contains_key(DEFAULT_ALIAS.0) {
            builder = builder.alias(DEFAULT_ALIAS.0, DEFAULT_ALIAS.1);
        }
        for (token, source) in self.define {
            builder = builder.define(token, source);
        }

        builder.build()
    }
}

fn absolute_root(root: &Path) -> Result<PathBuf> {
    Ok(path_clean::clean(std::path::absolute(root)?))
}

/// Validated, immutable build settings.
///
/// Construct with [`BuildConfig::builder`] or [`LibraryConfig::into_build_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    root: PathBuf,
    entry: PathBuf,
    package_name: String,
    global_name: String,
    externals: IndexSet<String>,
    globals: IndexMap<String, String>,
    aliases: IndexMap<String, PathBuf>,
    defines: IndexMap<String, DefineSource>,
    formats: Vec<OutputFormat>,
    out_dir: PathBuf,
    platform: Platform,
    sourcemap: bool,
    minify: bool,
    banner: Option<String>,
}

impl BuildConfig {
    pub fn builder(
        root: impl AsRef<Path>,
        entry: impl Into<PathBuf>,
        package_name: impl Into<String>,
    ) -> BuildConfigBuilder {
        BuildConfigBuilder::new(root.as_ref(), entry.into(), package_name.into())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the entry module.
    pub fn entry_path(&self) -> &Path {
        &self.entry
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Global exposed by UMD and IIFE builds.
    ///
    /// Unless configured, the package name camel-cased into an identifier
    /// (`pg-explain` becomes `pgExplain`).
    pub fn global_name(&self) -> &str {
        &self.global_name
    }

    pub fn externals(&self) -> &IndexSet<String> {
        &self.externals
    }

    pub fn globals(&self) -> &IndexMap<String, String> {
        &self.globals
    }

    pub fn aliases(&self) -> &IndexMap<String, PathBuf> {
        &self.aliases
    }

    pub fn defines(&self) -> &IndexMap<String, DefineSource> {
        &self.defines
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    /// Absolute output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn sourcemap(&self) -> bool {
        self.sourcemap
    }

    pub fn minify(&self) -> bool {
        self.minify
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }
}

/// Builder for [`BuildConfig`]. Relative paths resolve against the root.
#[derive(Debug, Clone)]
pub struct BuildConfigBuilder {
    root: PathBuf,
    entry: PathBuf,
    package_name: String,
    global_name: Option<String>,
    externals: IndexSet<String>,
    globals: IndexMap<String, String>,
    aliases: IndexMap<String, PathBuf>,
    defines: IndexMap<String, DefineSource>,
    formats: Vec<OutputFormat>,
    out_dir: PathBuf,
    platform: Platform,
    sourcemap: bool,
    minify: bool,
    banner: Option<String>,
}

impl BuildConfigBuilder {
    fn new(root: &Path, entry: PathBuf, package_name: String) -> Self {
        Self {
            root: root.to_path_buf(),
            entry,
            package_name,
            global_name: None,
            externals: IndexSet::new(),
            globals: IndexMap::new(),
            aliases: IndexMap::new(),
            defines: default_defines(),
            formats: default_formats(),
            out_dir: default_out_dir(),
            platform: Platform::default(),
            sourcemap: false,
            minify: false,
            banner: None,
        }
    }

    pub fn global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = Some(name.into());
        self
    }

    pub fn external(mut self, specifier: impl Into<String>) -> Self {
        self.externals.insert(specifier.into());
        self
    }

    pub fn externals<I, S>(mut self, specifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.externals.extend(specifiers.into_iter().map(Into::into));
        self
    }

    /// Map an external specifier to the global variable that provides it.
    pub fn global(mut self, specifier: impl Into<String>, global: impl Into<String>) -> Self {
        self.globals.insert(specifier.into(), global.into());
        self
    }

    pub fn alias(mut self, prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.aliases.insert(prefix.into(), dir.into());
        self
    }

    /// Add or replace a define token.
    pub fn define(mut self, token: impl Into<String>, source: DefineSource) -> Self {
        self.defines.insert(token.into(), source);
        self
    }

    /// Drop every define, including the defaults.
    pub fn clear_defines(mut self) -> Self {
        self.defines.clear();
        self
    }

    pub fn formats(mut self, formats: impl IntoIterator<Item = OutputFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn sourcemap(mut self, enabled: bool) -> Self {
        self.sourcemap = enabled;
        self
    }

    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify = enabled;
        self
    }

    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Normalize paths and run schema validation.
    pub fn build(self) -> Result<BuildConfig> {
        let root = absolute_root(&self.root)?;
        let resolve = |p: &Path| path_clean::clean(root.join(p));

        let config = BuildConfig {
            entry: resolve(&self.entry),
            out_dir: resolve(&self.out_dir),
            aliases: self
                .aliases
                .iter()
                .map(|(prefix, dir)| (prefix.clone(), resolve(dir)))
                .collect(),
            global_name: self
                .global_name
                .unwrap_or_else(|| guess_global_name(&self.package_name)),
            package_name: self.package_name,
            externals: self.externals,
            globals: self.globals,
            defines: self.defines,
            formats: self.formats,
            platform: self.platform,
            sourcemap: self.sourcemap,
            minify: self.minify,
            banner: self.banner,
            root,
        };

        SchemaValidator.validate(&config)?;
        Ok(config)
    }
}
