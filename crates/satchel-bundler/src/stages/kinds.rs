use super::{StagePhase, TransformStage};
use crate::graph::{ModuleGraph, ModuleKind};
use crate::{Error, Result};

/// Rejects modules the engine has no loader for.
///
/// Runs in [`StagePhase::Verify`], so `Source` stages get a chance to convert
/// them first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleKindStage;

impl TransformStage for ModuleKindStage {
    fn name(&self) -> &str {
        "module-kinds"
    }

    fn phase(&self) -> StagePhase {
        StagePhase::Verify
    }

    fn transform(&self, graph: ModuleGraph) -> Result<ModuleGraph> {
        if let Some(node) = graph
            .modules()
            .find(|node| matches!(node.kind, ModuleKind::Other(_)))
        {
            let ext = match &node.kind {
                ModuleKind::Other(ext) if !ext.is_empty() => format!(".{ext}"),
                _ => "(no extension)".to_string(),
            };
            return Err(Error::transform(
                Some(node.path.clone()),
                format!("unsupported module type {ext}"),
            ));
        }
        Ok(graph)
    }
}
