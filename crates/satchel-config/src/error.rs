//! Error types for configuration validation and loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Filesystem validation errors
    #[error("entry module not found: {}", path.display())]
    EntryNotFound { path: PathBuf },

    #[error("entry path is not a readable file: {}", path.display())]
    EntryNotFile { path: PathBuf },

    #[error("output directory collides with an existing file: {}", path.display())]
    OutDirIsFile { path: PathBuf },

    // Schema validation errors (no filesystem checks)
    #[error("global \"{global}\" is mapped for \"{specifier}\", which is not declared external")]
    GlobalWithoutExternal { specifier: String, global: String },

    #[error("output file \"{file_name}\" would be produced more than once ({formats})")]
    FilenameCollision { file_name: String, formats: String },

    #[error("invalid identifier for {field}: \"{value}\"")]
    InvalidIdentifier {
        field: String,
        value: String,
        hint: String,
    },

    #[error("invalid alias \"{prefix}\": {hint}")]
    InvalidAlias { prefix: String, hint: String },

    #[error("define value for \"{token}\" contains the define token \"{contains}\"")]
    DefineSelfReference { token: String, contains: String },

    #[error("invalid config value for {field}")]
    InvalidValue { field: String, hint: Option<String> },

    #[error("schema validation failed: {message}")]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    // Config parsing/loading errors
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Suggested fix shown alongside the error, when one is known.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::EntryNotFound { .. } => {
                Some("Check the `entry` setting; relative paths are resolved from the project root".into())
            }
            Self::EntryNotFile { .. } => Some("The entry must point at a single module file".into()),
            Self::OutDirIsFile { .. } => Some("Choose a different `outDir` or remove the file".into()),
            Self::GlobalWithoutExternal { specifier, .. } => Some(format!(
                "Add \"{specifier}\" to `external`, or remove it from `globals`"
            )),
            Self::FilenameCollision { .. } => {
                Some("List each output format once in `formats`".into())
            }
            Self::InvalidIdentifier { hint, .. } => Some(hint.clone()),
            Self::InvalidAlias { .. } => {
                Some("Alias prefixes look like \"@\" or \"~lib\" and map to a directory".into())
            }
            Self::DefineSelfReference { .. } => Some(
                "Define values are substituted once; they cannot contain another define token".into(),
            ),
            Self::InvalidValue { hint, .. } | Self::SchemaValidation { hint, .. } => hint.clone(),
            Self::NotFound { .. } => Some("Pass an existing file to --config".into()),
            Self::Load(_) => Some("Check the configuration file syntax and field types".into()),
            Self::Io(_) => None,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}
