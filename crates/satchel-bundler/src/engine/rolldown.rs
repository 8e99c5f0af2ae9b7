use std::path::PathBuf;
use std::sync::Arc;

use rolldown::{
    BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem, IsExternal,
    OutputFormat as RolldownFormat, Platform as RolldownPlatform, RawMinifyOptions, SourceMapType,
};
use rolldown_common::Output;
use satchel_config::Platform;

use super::{BundleEngine, EngineFormat, GraphServePlugin, RenderRequest, RenderedChunk};
use crate::graph::ModuleGraph;
use crate::{Error, Result, diagnostics};

/// [`BundleEngine`] backed by Rolldown.
///
/// Each render is an independent Rolldown run over the same graph, served by
/// [`GraphServePlugin`].
#[derive(Debug, Clone)]
pub struct RolldownEngine {
    cwd: PathBuf,
    platform: Platform,
}

impl RolldownEngine {
    pub fn new(cwd: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            cwd: cwd.into(),
            platform,
        }
    }

    fn options(&self, graph: &ModuleGraph, request: &RenderRequest) -> BundlerOptions {
        BundlerOptions {
            input: Some(vec![InputItem {
                name: Some("index".to_string()),
                import: graph.entry().path.to_string_lossy().into_owned(),
            }]),
            cwd: Some(self.cwd.clone()),
            format: Some(match request.format {
                EngineFormat::Esm => RolldownFormat::Esm,
                EngineFormat::Cjs => RolldownFormat::Cjs,
            }),
            platform: Some(match self.platform {
                Platform::Browser => RolldownPlatform::Browser,
                Platform::Node => RolldownPlatform::Node,
            }),
            external: Some(IsExternal::from(request.externals.clone())),
            sourcemap: request.sourcemap.then_some(SourceMapType::File),
            minify: request.minify.then(|| RawMinifyOptions::from(true)),
            // Library artifacts are single files.
            inline_dynamic_imports: Some(true),
            ..Default::default()
        }
    }
}

impl BundleEngine for RolldownEngine {
    async fn render(
        &self,
        graph: &Arc<ModuleGraph>,
        request: &RenderRequest,
    ) -> Result<RenderedChunk> {
        let plugin = Arc::new(GraphServePlugin::new(Arc::clone(graph)));
        let mut bundler = RolldownBundlerBuilder::default()
            .with_options(self.options(graph, request))
            .with_plugins(vec![plugin])
            .build()
            .map_err(|e| diagnostics::from_engine_error(&e, graph))?;

        let bundle = bundler
            .generate()
            .await
            .map_err(|e| diagnostics::from_engine_error(&e, graph))?;

        let mut chunks = bundle.assets.iter().filter_map(|output| match output {
            Output::Chunk(chunk) => Some(chunk),
            _ => None,
        });
        let Some(chunk) = chunks.next() else {
            return Err(Error::transform(None, "engine produced no output chunk"));
        };
        if chunks.next().is_some() {
            return Err(Error::transform(
                None,
                "engine split the library into several chunks",
            ));
        }

        tracing::debug!(
            format = ?request.format,
            file = %chunk.filename,
            bytes = chunk.code.len(),
            "rendered chunk"
        );

        Ok(RenderedChunk {
            code: chunk.code.to_string(),
            map: chunk.map.as_ref().map(|m| m.to_json_string()),
        })
    }
}
