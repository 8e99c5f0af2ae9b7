use clap::ValueEnum;
use satchel_config::{OutputFormat, Platform};

/// Output format for one artifact
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum Format {
    /// ECMAScript module (`<name>.js`)
    #[value(name = "es", alias = "esm")]
    Es,

    /// Universal script for CommonJS, AMD and script tags (`<name>.umd.js`)
    #[value(name = "umd")]
    Umd,

    /// CommonJS module (`<name>.cjs`)
    #[value(name = "cjs")]
    Cjs,

    /// Script that only assigns a global (`<name>.iife.js`)
    #[value(name = "iife")]
    Iife,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Es => OutputFormat::Es,
            Format::Umd => OutputFormat::Umd,
            Format::Cjs => OutputFormat::Cjs,
            Format::Iife => OutputFormat::Iife,
        }
    }
}

/// Runtime the library targets
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum PlatformArg {
    /// Browser conditions; Node built-ins are not available
    #[value(name = "browser")]
    Browser,

    /// Node conditions; built-in modules stay external
    #[value(name = "node")]
    Node,
}

impl From<PlatformArg> for Platform {
    fn from(platform: PlatformArg) -> Self {
        match platform {
            PlatformArg::Browser => Platform::Browser,
            PlatformArg::Node => Platform::Node,
        }
    }
}
