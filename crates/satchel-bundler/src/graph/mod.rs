//! Module graph owned by the pipeline.
//!
//! The graph holds every module reachable from the entry with its source
//! already constant-injected, plus a classified edge for every import. The
//! engine consumes it as-is: resolution decisions are made here, once.

mod builder;
mod scan;

pub use builder::GraphBuilder;
pub(crate) use scan::scan_imports;

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

/// Index of a module in discovery order. The entry is always `ModuleId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source language of a module, from its extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Js,
    Jsx,
    Ts,
    Tsx,
    Json,
    /// No built-in handling; a stage must convert it before emission.
    Other(String),
}

impl ModuleKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("js" | "mjs" | "cjs") => Self::Js,
            Some("jsx") => Self::Jsx,
            Some("ts" | "mts" | "cts") => Self::Ts,
            Some("tsx") => Self::Tsx,
            Some("json") => Self::Json,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other(String::new()),
        }
    }

    /// Whether imports can be scanned from this module.
    pub fn is_script(&self) -> bool {
        matches!(self, Self::Js | Self::Jsx | Self::Ts | Self::Tsx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import x from "y"`
    Static,
    /// `export * from "y"`, `export { x } from "y"`
    ReExport,
    /// `import("y")`
    Dynamic,
    /// `require("y")`
    Require,
}

/// Where an import edge leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// Bundled module.
    Module(ModuleId),
    /// Host-provided dependency, with the global that provides it (if mapped).
    External { global: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub specifier: String,
    pub kind: ImportKind,
    pub target: ImportTarget,
}

#[derive(Debug, Clone)]
pub struct ModuleNode {
    pub id: ModuleId,
    /// Absolute path; also the module id handed to the engine.
    pub path: PathBuf,
    /// Source after constant injection and stages.
    pub source: String,
    pub kind: ModuleKind,
    pub imports: Vec<ImportRecord>,
}

impl ModuleNode {
    /// Bundled modules this one depends on, in source order.
    pub fn dependencies(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.imports.iter().filter_map(|import| match import.target {
            ImportTarget::Module(id) => Some(id),
            ImportTarget::External { .. } => None,
        })
    }
}

/// Counts reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub modules: usize,
    pub externals: usize,
    pub imports: usize,
}

/// All modules reachable from the entry, in discovery order.
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    modules: IndexMap<PathBuf, ModuleNode>,
}

impl ModuleGraph {
    /// Graph containing only the entry module.
    pub fn new(entry: impl Into<PathBuf>, source: String) -> Self {
        let mut graph = Self {
            modules: IndexMap::new(),
        };
        graph.add_module(entry.into(), source);
        graph
    }

    /// Insert a module, returning its id. Re-adding a path returns the existing id.
    pub fn add_module(&mut self, path: PathBuf, source: String) -> ModuleId {
        if let Some(index) = self.modules.get_index_of(&path) {
            return ModuleId(index as u32);
        }
        let id = ModuleId(self.modules.len() as u32);
        let kind = ModuleKind::from_path(&path);
        self.modules.insert(
            path.clone(),
            ModuleNode {
                id,
                path,
                source,
                kind,
                imports: Vec::new(),
            },
        );
        id
    }

    pub fn entry(&self) -> &ModuleNode {
        &self.modules[0]
    }

    pub fn entry_id(&self) -> ModuleId {
        ModuleId(0)
    }

    pub fn module(&self, id: ModuleId) -> Option<&ModuleNode> {
        self.modules.get_index(id.index()).map(|(_, node)| node)
    }

    pub fn module_mut(&mut self, id: ModuleId) -> Option<&mut ModuleNode> {
        self.modules.get_index_mut(id.index()).map(|(_, node)| node)
    }

    pub fn by_path(&self, path: &Path) -> Option<&ModuleNode> {
        self.modules.get(path)
    }

    pub fn id_of(&self, path: &Path) -> Option<ModuleId> {
        self.modules.get_index_of(path).map(|i| ModuleId(i as u32))
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleNode> {
        self.modules.values()
    }

    pub fn modules_mut(&mut self) -> impl Iterator<Item = &mut ModuleNode> {
        self.modules.values_mut()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Target of `specifier` as imported from `importer`, if that import was seen.
    pub fn resolve_import(&self, importer: &Path, specifier: &str) -> Option<&ImportTarget> {
        self.by_path(importer)?
            .imports
            .iter()
            .find(|import| import.specifier == specifier)
            .map(|import| &import.target)
    }

    /// Every external specifier with its global, in first-seen order.
    pub fn externals(&self) -> IndexMap<&str, Option<&str>> {
        let mut externals = IndexMap::new();
        for node in self.modules() {
            for import in &node.imports {
                if let ImportTarget::External { global } = &import.target {
                    externals
                        .entry(import.specifier.as_str())
                        .or_insert(global.as_deref());
                }
            }
        }
        externals
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            modules: self.len(),
            externals: self.externals().len(),
            imports: self.modules().map(|n| n.imports.len()).sum(),
        }
    }
}
