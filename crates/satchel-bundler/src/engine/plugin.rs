//! Rolldown plugin serving the prebuilt module graph.
//!
//! Resolution and loading were already done while building the graph, so
//! this plugin answers `resolve_id` from recorded import edges and `load`
//! from injected sources. Rolldown never reads the filesystem for bundled
//! modules, and a specifier the graph does not record fails the build.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

use crate::graph::{ImportTarget, ModuleGraph, ModuleKind};

#[derive(Debug, Clone)]
pub struct GraphServePlugin {
    graph: Arc<ModuleGraph>,
}

impl GraphServePlugin {
    pub fn new(graph: Arc<ModuleGraph>) -> Self {
        Self { graph }
    }

    fn lookup(&self, importer: Option<&str>, specifier: &str) -> Option<HookResolveIdOutput> {
        let Some(importer) = importer else {
            // Entry request: the input item is the entry's absolute path.
            let entry = self.graph.entry();
            return (Path::new(specifier) == entry.path).then(|| HookResolveIdOutput {
                id: entry.path.to_string_lossy().into_owned().into(),
                external: Some(ResolvedExternal::Bool(false)),
                ..Default::default()
            });
        };

        match self.graph.resolve_import(Path::new(importer), specifier)? {
            ImportTarget::Module(id) => {
                let node = self.graph.module(*id)?;
                Some(HookResolveIdOutput {
                    id: node.path.to_string_lossy().into_owned().into(),
                    external: Some(ResolvedExternal::Bool(false)),
                    ..Default::default()
                })
            }
            ImportTarget::External { .. } => Some(HookResolveIdOutput {
                id: specifier.to_string().into(),
                external: Some(ResolvedExternal::Bool(true)),
                ..Default::default()
            }),
        }
    }
}

impl Plugin for GraphServePlugin {
    fn name(&self) -> Cow<'static, str> {
        "satchel-graph".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let resolved = self
            .lookup(args.importer.as_deref(), args.specifier)
            .ok_or_else(|| unrecorded(args.importer.as_deref(), args.specifier));
        async move { resolved.map(Some) }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let graph = Arc::clone(&self.graph);

        async move {
            let Some(node) = graph.by_path(Path::new(&id)) else {
                return Ok(None);
            };
            let Some(module_type) = module_type(&node.kind) else {
                anyhow::bail!("no loader for module {id}");
            };
            Ok(Some(HookLoadOutput {
                code: node.source.clone().into(),
                module_type: Some(module_type),
                ..Default::default()
            }))
        }
    }
}

/// Worded like the engine's own resolve failures so both map to the same error.
fn unrecorded(importer: Option<&str>, specifier: &str) -> anyhow::Error {
    tracing::debug!(specifier, importer, "specifier not in module graph");
    anyhow::anyhow!(
        "Could not resolve '{specifier}' in {}: import is not in the module graph",
        importer.unwrap_or("(entry)")
    )
}

fn module_type(kind: &ModuleKind) -> Option<ModuleType> {
    match kind {
        ModuleKind::Tsx => Some(ModuleType::Tsx),
        ModuleKind::Ts => Some(ModuleType::Ts),
        ModuleKind::Jsx => Some(ModuleType::Jsx),
        ModuleKind::Json => Some(ModuleType::Json),
        ModuleKind::Js => Some(ModuleType::Js),
        ModuleKind::Other(_) => None,
    }
}
