//! Transform stages with execution phases.
//!
//! Stages run between graph construction and emission, in phase order, and
//! each one takes the whole graph by value and returns it.

mod cycles;
mod kinds;

pub use cycles::{CycleCheckStage, find_cycles};
pub use kinds::ModuleKindStage;

use std::ops::RangeBounds;
use std::sync::Arc;

use crate::Result;
use crate::graph::ModuleGraph;

/// Stage execution phases.
///
/// Stages run in phase order (lower numbers first); insertion order breaks
/// ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StagePhase {
    /// Source-level conversions, e.g. turning a custom module kind into script.
    ///
    /// The pipeline scans converted modules afterwards and runs this phase
    /// again while that adds modules, so stages here must leave already
    /// converted modules alone.
    Source = 0,

    /// Rewrites of script modules.
    Transform = 20,

    /// Checks that the graph can be emitted.
    Verify = 50,

    /// Read-only inspection after every rewrite.
    Analyze = 100,
}

/// A named `graph -> graph` step.
pub trait TransformStage: Send + Sync {
    fn name(&self) -> &str;

    /// Defaults to [`StagePhase::Transform`].
    fn phase(&self) -> StagePhase {
        StagePhase::Transform
    }

    fn transform(&self, graph: ModuleGraph) -> Result<ModuleGraph>;
}

/// Stage registry that runs stages in phase order.
#[derive(Clone, Default)]
pub struct StageRegistry {
    stages: Vec<(StagePhase, Arc<dyn TransformStage>)>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in stages.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.add(ModuleKindStage);
        registry.add(CycleCheckStage);
        registry
    }

    pub fn add<S: TransformStage + 'static>(&mut self, stage: S) {
        self.add_shared(Arc::new(stage));
    }

    pub fn add_shared(&mut self, stage: Arc<dyn TransformStage>) {
        let phase = stage.phase();
        self.stages.push((phase, stage));
    }

    /// Stage names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.ordered().map(|stage| stage.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage over `graph`. The first failure stops the chain.
    pub fn run(&self, graph: ModuleGraph) -> Result<ModuleGraph> {
        self.run_phases(graph, ..)
    }

    /// Run the stages whose phase falls in `phases`.
    pub fn run_phases(
        &self,
        mut graph: ModuleGraph,
        phases: impl RangeBounds<StagePhase>,
    ) -> Result<ModuleGraph> {
        for stage in self.ordered().filter(|stage| phases.contains(&stage.phase())) {
            let _span = tracing::debug_span!("stage", name = stage.name()).entered();
            graph = stage.transform(graph)?;
        }
        Ok(graph)
    }

    fn ordered(&self) -> impl Iterator<Item = &Arc<dyn TransformStage>> {
        let mut ordered: Vec<_> = self.stages.iter().collect();
        // Stable: equal phases keep insertion order.
        ordered.sort_by_key(|(phase, _)| *phase);
        ordered.into_iter().map(|(_, stage)| stage)
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
