//! Emission engine seam.
//!
//! The pipeline hands the engine a finished [`ModuleGraph`]; the engine owns
//! tree-shaking, type stripping and code generation and returns one chunk
//! per request.

mod plugin;
mod rolldown;

pub use self::plugin::GraphServePlugin;
pub use self::rolldown::RolldownEngine;

use std::sync::Arc;

use crate::Result;
use crate::graph::ModuleGraph;

/// Module format the engine emits before any wrapper is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineFormat {
    Esm,
    Cjs,
}

/// One emission request.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub format: EngineFormat,
    /// Specifiers the engine must leave as imports.
    pub externals: Vec<String>,
    pub sourcemap: bool,
    pub minify: bool,
}

/// Engine output for a single request.
#[derive(Debug, Clone, Default)]
pub struct RenderedChunk {
    pub code: String,
    /// JSON source map, when requested.
    pub map: Option<String>,
}

pub trait BundleEngine: Send + Sync {
    /// Render the whole graph as a single chunk.
    async fn render(&self, graph: &Arc<ModuleGraph>, request: &RenderRequest)
    -> Result<RenderedChunk>;
}
