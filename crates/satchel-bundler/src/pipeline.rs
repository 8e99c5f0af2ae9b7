//! Build orchestration.
//!
//! A build runs validate → capture defines → build graph (resolution,
//! classification and injection happen per module as it is loaded) →
//! source stages → scan converted modules → remaining stages → render and
//! wrap each planned artifact → write. Any failure ends the build with
//! nothing written.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexSet;
use satchel_config::{BuildConfig, Environment, OutputFormat, validate_fs};

use crate::alias::AliasResolver;
use crate::classify::Classifier;
use crate::engine::{BundleEngine, RenderRequest, RolldownEngine};
use crate::graph::{GraphBuilder, GraphStats, ModuleGraph};
use crate::inject::DefineTable;
use crate::plan::{ModuleWrapper, plan};
use crate::stages::{StagePhase, StageRegistry, TransformStage};
use crate::wrapper::{WrapperContext, finish};
use crate::writer::{PendingFile, write_atomic};
use crate::Result;

/// One produced file.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    pub format: OutputFormat,
    pub file_name: String,
    pub wrapper: ModuleWrapper,
    pub code: String,
    pub map: Option<String>,
    /// Final location, once written.
    pub path: Option<PathBuf>,
}

impl OutputArtifact {
    pub fn map_file_name(&self) -> Option<String> {
        self.map.as_ref().map(|_| format!("{}.map", self.file_name))
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// In requested format order.
    pub artifacts: Vec<OutputArtifact>,
    pub graph_stats: GraphStats,
}

impl BuildOutcome {
    pub fn artifact(&self, format: OutputFormat) -> Option<&OutputArtifact> {
        self.artifacts.iter().find(|a| a.format == format)
    }
}

/// Configurable build over one [`BuildConfig`].
pub struct Pipeline<'c, E = RolldownEngine> {
    config: &'c BuildConfig,
    environment: Option<Environment>,
    stages: StageRegistry,
    engine: E,
    write: bool,
}

impl<'c> Pipeline<'c> {
    /// Pipeline with the built-in stages and the Rolldown engine.
    pub fn new(config: &'c BuildConfig) -> Self {
        Self {
            config,
            environment: None,
            stages: StageRegistry::with_builtins(),
            engine: RolldownEngine::new(config.root(), config.platform()),
            write: true,
        }
    }
}

impl<'c, E: BundleEngine> Pipeline<'c, E> {
    /// Use `environment` instead of capturing the process environment.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn stage<S: TransformStage + 'static>(mut self, stage: S) -> Self {
        self.stages.add(stage);
        self
    }

    pub fn engine<F: BundleEngine>(self, engine: F) -> Pipeline<'c, F> {
        Pipeline {
            config: self.config,
            environment: self.environment,
            stages: self.stages,
            engine,
            write: self.write,
        }
    }

    /// When `false`, artifacts are produced but not written.
    pub fn write_output(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    #[tracing::instrument(skip_all, fields(library = %self.config.package_name()))]
    pub async fn build(self) -> Result<BuildOutcome> {
        let config = self.config;

        validate_fs(config)?;
        let planned = plan(config)?;

        let environment = self.environment.unwrap_or_else(Environment::capture);
        let defines = DefineTable::capture(config.defines(), &environment, config.root())?;
        drop(environment);

        let aliases = AliasResolver::new(config.aliases());
        let classifier = Classifier::new(config);
        let builder = GraphBuilder::new(config, &aliases, &classifier, &defines);
        let mut graph = builder.build(config.entry_path())?;
        loop {
            graph = self.stages.run_phases(graph, ..=StagePhase::Source)?;
            if builder.complete(&mut graph)? == 0 {
                break;
            }
        }
        let graph = Arc::new(self.stages.run_phases(graph, StagePhase::Transform..)?);
        let graph_stats = graph.stats();

        let context = WrapperContext::new(config, &graph);
        let externals = engine_externals(config, &graph);

        let mut artifacts = Vec::with_capacity(planned.len());
        for planned in planned {
            let request = RenderRequest {
                format: planned.engine_format,
                externals: externals.clone(),
                sourcemap: config.sourcemap(),
                minify: config.minify(),
            };
            let chunk = self.engine.render(&graph, &request).await?;
            let finished = finish(
                &context,
                planned.wrapper,
                config.banner(),
                &planned.file_name,
                chunk,
            )?;
            artifacts.push(OutputArtifact {
                format: planned.format,
                file_name: planned.file_name,
                wrapper: planned.wrapper,
                code: finished.code,
                map: finished.map,
                path: None,
            });
        }

        if self.write {
            write_all(config, &mut artifacts)?;
        }

        tracing::info!(
            artifacts = artifacts.len(),
            modules = graph_stats.modules,
            externals = graph_stats.externals,
            "build complete"
        );
        Ok(BuildOutcome {
            artifacts,
            graph_stats,
        })
    }
}

/// Build `config` with the process environment and default stages.
pub async fn build(config: &BuildConfig) -> Result<BuildOutcome> {
    Pipeline::new(config).build().await
}

/// Configured externals plus every external specifier actually imported.
fn engine_externals(config: &BuildConfig, graph: &ModuleGraph) -> Vec<String> {
    let mut externals: IndexSet<String> = config.externals().iter().cloned().collect();
    externals.extend(graph.externals().keys().map(|s| s.to_string()));
    externals.into_iter().collect()
}

fn write_all(config: &BuildConfig, artifacts: &mut [OutputArtifact]) -> Result<()> {
    let map_names: Vec<Option<String>> = artifacts.iter().map(OutputArtifact::map_file_name).collect();
    let mut files = Vec::with_capacity(artifacts.len() * 2);
    for (artifact, map_name) in artifacts.iter().zip(&map_names) {
        files.push(PendingFile {
            file_name: &artifact.file_name,
            contents: artifact.code.as_bytes(),
        });
        if let (Some(map_name), Some(map)) = (map_name, &artifact.map) {
            files.push(PendingFile {
                file_name: map_name,
                contents: map.as_bytes(),
            });
        }
    }

    let paths = write_atomic(config.out_dir(), &files)?;
    let mut paths = paths.into_iter();
    for artifact in artifacts.iter_mut() {
        artifact.path = paths.next();
        if artifact.map.is_some() {
            paths.next();
        }
    }
    Ok(())
}
