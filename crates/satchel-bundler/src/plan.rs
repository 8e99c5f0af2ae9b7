//! Entry & output planning.
//!
//! Every requested format maps to exactly one artifact: a file name derived
//! from the package name, the module format the engine emits, and the
//! wrapper applied to the engine output.

use indexmap::IndexMap;
use satchel_config::{BuildConfig, ConfigError, OutputFormat};

use crate::engine::EngineFormat;

/// Template applied around the engine's CommonJS body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleWrapper {
    /// Engine output is the artifact.
    None,
    /// CommonJS, AMD or browser-global loader.
    Universal,
    /// Self-executing script that only assigns a global.
    Iife,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedArtifact {
    pub format: OutputFormat,
    pub file_name: String,
    pub engine_format: EngineFormat,
    pub wrapper: ModuleWrapper,
}

impl PlannedArtifact {
    pub fn for_format(format: OutputFormat, package_name: &str) -> Self {
        let (engine_format, wrapper) = match format {
            OutputFormat::Es => (EngineFormat::Esm, ModuleWrapper::None),
            OutputFormat::Cjs => (EngineFormat::Cjs, ModuleWrapper::None),
            OutputFormat::Umd => (EngineFormat::Cjs, ModuleWrapper::Universal),
            OutputFormat::Iife => (EngineFormat::Cjs, ModuleWrapper::Iife),
        };
        Self {
            format,
            file_name: format.file_name(package_name),
            engine_format,
            wrapper,
        }
    }
}

/// Artifacts for every requested format, in request order.
pub fn plan(config: &BuildConfig) -> Result<Vec<PlannedArtifact>, ConfigError> {
    let mut planned: IndexMap<String, PlannedArtifact> = IndexMap::new();

    for &format in config.formats() {
        let artifact = PlannedArtifact::for_format(format, config.package_name());
        if let Some(existing) = planned.get(&artifact.file_name) {
            return Err(ConfigError::FilenameCollision {
                file_name: artifact.file_name,
                formats: format!("{}, {}", existing.format, format),
            });
        }
        planned.insert(artifact.file_name.clone(), artifact);
    }

    tracing::debug!(
        artifacts = ?planned.keys().collect::<Vec<_>>(),
        "planned output"
    );
    Ok(planned.into_values().collect())
}
