use std::path::PathBuf;

use super::{StagePhase, TransformStage};
use crate::Result;
use crate::graph::ModuleGraph;

/// Warns once per import cycle among bundled modules. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleCheckStage;

impl TransformStage for CycleCheckStage {
    fn name(&self) -> &str {
        "cycle-check"
    }

    fn phase(&self) -> StagePhase {
        StagePhase::Analyze
    }

    fn transform(&self, graph: ModuleGraph) -> Result<ModuleGraph> {
        for cycle in find_cycles(&graph) {
            let path = cycle
                .iter()
                .chain(cycle.first())
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            tracing::warn!(cycle = %path, "circular import");
        }
        Ok(graph)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    OnStack,
    Done,
}

/// Import cycles reachable in `graph`, each as the module paths along it.
///
/// Depth-first over bundled edges in source order; each back edge yields one
/// cycle, so the result is deterministic for a given graph.
pub fn find_cycles(graph: &ModuleGraph) -> Vec<Vec<PathBuf>> {
    let adjacency: Vec<Vec<usize>> = graph
        .modules()
        .map(|node| node.dependencies().map(|id| id.index()).collect())
        .collect();
    let mut marks = vec![Mark::New; adjacency.len()];
    let mut cycles = Vec::new();

    for start in 0..adjacency.len() {
        if marks[start] != Mark::New {
            continue;
        }
        marks[start] = Mark::OnStack;
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            let Some(&dep) = adjacency[node].get(cursor) else {
                marks[node] = Mark::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;
            match marks[dep] {
                Mark::New => {
                    marks[dep] = Mark::OnStack;
                    stack.push((dep, 0));
                }
                Mark::OnStack => {
                    let from = stack.iter().position(|(n, _)| *n == dep).unwrap_or(0);
                    cycles.push(stack[from..].iter().map(|(n, _)| *n).collect::<Vec<_>>());
                }
                Mark::Done => {}
            }
        }
    }

    let paths: Vec<&PathBuf> = graph.modules().map(|node| &node.path).collect();
    cycles
        .into_iter()
        .map(|cycle| cycle.into_iter().map(|i| paths[i].clone()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ImportKind, ImportRecord, ImportTarget, ModuleId};

    fn link(graph: &mut ModuleGraph, from: ModuleId, to: ModuleId) {
        graph.module_mut(from).unwrap().imports.push(ImportRecord {
            specifier: format!("./{to}"),
            kind: ImportKind::Static,
            target: ImportTarget::Module(to),
        });
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let mut graph = ModuleGraph::new("/p/index.ts", String::new());
        let a = graph.add_module("/p/a.ts".into(), String::new());
        let b = graph.add_module("/p/b.ts".into(), String::new());
        let entry = graph.entry_id();
        link(&mut graph, entry, a);
        link(&mut graph, entry, b);
        link(&mut graph, a, b);
        assert!(find_cycles(&graph).is_empty());
    }

    #[test]
    fn reports_each_cycle_in_order() {
        let mut graph = ModuleGraph::new("/p/index.ts", String::new());
        let a = graph.add_module("/p/a.ts".into(), String::new());
        let b = graph.add_module("/p/b.ts".into(), String::new());
        let entry = graph.entry_id();
        link(&mut graph, entry, a);
        link(&mut graph, a, b);
        link(&mut graph, b, a);
        link(&mut graph, b, b);

        let cycles = find_cycles(&graph);
        assert_eq!(
            cycles,
            vec![
                vec![PathBuf::from("/p/a.ts"), PathBuf::from("/p/b.ts")],
                vec![PathBuf::from("/p/b.ts")],
            ]
        );
    }

    #[test]
    fn stage_never_fails() {
        let mut graph = ModuleGraph::new("/p/index.ts", String::new());
        let entry = graph.entry_id();
        link(&mut graph, entry, entry);
        assert!(CycleCheckStage.transform(graph).is_ok());
    }
}
