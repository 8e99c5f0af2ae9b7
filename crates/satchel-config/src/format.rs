use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Distribution format of a single output artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Native ES module (`import`/`export`)
    #[serde(alias = "esm")]
    Es,
    /// Universal script: CommonJS, AMD, or a browser global
    Umd,
    /// CommonJS module
    Cjs,
    /// Self-executing script that only exposes a browser global
    Iife,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Es, Self::Umd, Self::Cjs, Self::Iife];

    /// Output file name for a library called `base`.
    pub fn file_name(self, base: &str) -> String {
        match self {
            Self::Es => format!("{base}.js"),
            Self::Umd => format!("{base}.umd.js"),
            Self::Cjs => format!("{base}.cjs"),
            Self::Iife => format!("{base}.iife.js"),
        }
    }

    /// Whether consumers reach this artifact through a global variable.
    pub fn exposes_global(self) -> bool {
        matches!(self, Self::Umd | Self::Iife)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::Umd => "umd",
            Self::Cjs => "cjs",
            Self::Iife => "iife",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" | "esm" => Ok(Self::Es),
            "umd" => Ok(Self::Umd),
            "cjs" | "commonjs" => Ok(Self::Cjs),
            "iife" => Ok(Self::Iife),
            other => Err(format!(
                "unknown format '{other}' (expected one of: es, umd, cjs, iife)"
            )),
        }
    }
}

/// Runtime the library targets; drives resolution conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Browser,
    Node,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browser => f.write_str("browser"),
            Self::Node => f.write_str("node"),
        }
    }
}
