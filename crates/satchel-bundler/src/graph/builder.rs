use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use oxc_resolver::{ResolveError, ResolveOptions, Resolver};
use satchel_config::{BuildConfig, ConfigError, Platform};

use super::{ImportRecord, ImportTarget, ModuleGraph, ModuleId, ModuleKind, scan_imports};
use crate::alias::AliasResolver;
use crate::classify::{Classification, Classifier};
use crate::inject::DefineTable;
use crate::{Error, Result};

/// Extensions probed for extensionless specifiers, in priority order.
const EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".mts", ".js", ".jsx", ".mjs", ".cjs", ".json",
];

/// Walks imports from the entry and builds a [`ModuleGraph`].
///
/// Every specifier is classified first (externals never touch the
/// filesystem), then alias-rewritten, then resolved node-style. Sources are
/// constant-injected as they are loaded.
pub struct GraphBuilder<'a> {
    root: &'a Path,
    aliases: &'a AliasResolver,
    classifier: &'a Classifier,
    defines: &'a DefineTable,
    resolver: Resolver,
}

enum Resolved {
    File(PathBuf),
    External { global: Option<String> },
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        config: &'a BuildConfig,
        aliases: &'a AliasResolver,
        classifier: &'a Classifier,
        defines: &'a DefineTable,
    ) -> Self {
        Self {
            root: config.root(),
            aliases,
            classifier,
            defines,
            resolver: Resolver::new(resolve_options(config.platform())),
        }
    }

    pub fn build(&self, entry: &Path) -> Result<ModuleGraph> {
        let source = fs::read_to_string(entry).map_err(|_| {
            Error::Config(ConfigError::EntryNotFile {
                path: entry.to_path_buf(),
            })
        })?;
        let mut graph = ModuleGraph::new(entry, self.inject(entry, source));
        let mut queue = VecDeque::from([graph.entry_id()]);
        self.drain(&mut graph, &mut queue)?;

        tracing::debug!(
            modules = graph.len(),
            externals = graph.externals().len(),
            "module graph built"
        );
        Ok(graph)
    }

    /// Scan modules that became script after the graph was built.
    ///
    /// Every script module without recorded imports is injected again and
    /// scanned, and whatever it imports is loaded as during [`build`]. Returns
    /// the number of modules added.
    ///
    /// [`build`]: GraphBuilder::build
    pub fn complete(&self, graph: &mut ModuleGraph) -> Result<usize> {
        let before = graph.len();
        let mut queue: VecDeque<ModuleId> = graph
            .modules()
            .filter(|node| node.kind.is_script() && node.imports.is_empty())
            .map(|node| node.id)
            .collect();
        for &id in &queue {
            if let Some(node) = graph.module_mut(id) {
                let source = std::mem::take(&mut node.source);
                node.source = self.inject(&node.path, source);
            }
        }
        self.drain(graph, &mut queue)?;

        let added = graph.len() - before;
        if added > 0 {
            tracing::debug!(added, modules = graph.len(), "module graph completed");
        }
        Ok(added)
    }

    /// Scan queued modules, resolving and queueing their imports in turn.
    fn drain(&self, graph: &mut ModuleGraph, queue: &mut VecDeque<ModuleId>) -> Result<()> {
        while let Some(id) = queue.pop_front() {
            let Some(node) = graph.module(id) else {
                continue;
            };
            if !node.kind.is_script() {
                continue;
            }
            let importer = node.path.clone();
            let scanned = scan_imports(&importer, &node.kind, &node.source).map_err(|message| {
                Error::Transform {
                    module: Some(importer.clone()),
                    line: None,
                    column: None,
                    message,
                }
            })?;

            let mut records = Vec::with_capacity(scanned.len());
            for import in scanned {
                let target = match self.resolve(&importer, &import.specifier)? {
                    Resolved::External { global } => ImportTarget::External { global },
                    Resolved::File(path) => {
                        ImportTarget::Module(self.visit(graph, queue, path, &importer, &import.specifier)?)
                    }
                };
                records.push(ImportRecord {
                    specifier: import.specifier,
                    kind: import.kind,
                    target,
                });
            }

            if let Some(node) = graph.module_mut(id) {
                node.imports = records;
            }
        }
        Ok(())
    }

    /// Add `path` to the graph if unseen, queueing it for scanning.
    fn visit(
        &self,
        graph: &mut ModuleGraph,
        queue: &mut VecDeque<ModuleId>,
        path: PathBuf,
        importer: &Path,
        specifier: &str,
    ) -> Result<ModuleId> {
        if let Some(id) = graph.id_of(&path) {
            return Ok(id);
        }
        let source = fs::read_to_string(&path).map_err(|e| Error::Resolution {
            specifier: specifier.to_string(),
            importer: importer.to_path_buf(),
            reason: format!("failed to read {}: {e}", path.display()),
        })?;
        let source = self.inject(&path, source);
        let id = graph.add_module(path, source);
        queue.push_back(id);
        Ok(id)
    }

    fn inject(&self, path: &Path, source: String) -> String {
        if ModuleKind::from_path(path) == ModuleKind::Json {
            return source;
        }
        match self.defines.substitute(&source) {
            std::borrow::Cow::Borrowed(_) => source,
            std::borrow::Cow::Owned(replaced) => replaced,
        }
    }

    fn resolve(&self, importer: &Path, specifier: &str) -> Result<Resolved> {
        if is_remote(specifier) {
            return Ok(Resolved::External { global: None });
        }
        if let Classification::External { global } = self.classifier.classify(specifier) {
            return Ok(Resolved::External { global });
        }

        let (dir, request) = match self.aliases.resolve(specifier) {
            Some(path) => (self.root, path.to_string_lossy().into_owned()),
            None => (importer.parent().unwrap_or(self.root), specifier.to_string()),
        };

        match self.resolver.resolve(dir, &request) {
            Ok(resolution) => Ok(Resolved::File(path_clean::clean(resolution.full_path()))),
            Err(ResolveError::Builtin { .. }) => Ok(Resolved::External { global: None }),
            Err(err) => Err(Error::Resolution {
                specifier: specifier.to_string(),
                importer: importer.to_path_buf(),
                reason: err.to_string(),
            }),
        }
    }
}

#[inline]
fn is_remote(specifier: &str) -> bool {
    specifier.starts_with("http://")
        || specifier.starts_with("https://")
        || specifier.starts_with("//")
        || specifier.trim_start().starts_with("data:")
}

fn resolve_options(platform: Platform) -> ResolveOptions {
    let (conditions, main_fields): (&[&str], &[&str]) = match platform {
        Platform::Browser => (
            &["import", "module", "browser", "default"],
            &["browser", "module", "main"],
        ),
        Platform::Node => (&["import", "module", "node", "default"], &["module", "main"]),
    };
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    ResolveOptions {
        condition_names: strings(conditions),
        main_fields: strings(main_fields),
        alias_fields: match platform {
            Platform::Browser => vec![vec!["browser".to_string()]],
            Platform::Node => vec![],
        },
        extensions: strings(EXTENSIONS),
        extension_alias: vec![
            (".js".to_string(), strings(&[".ts", ".tsx", ".js"])),
            (".mjs".to_string(), strings(&[".mts", ".mjs"])),
        ],
        builtin_modules: platform == Platform::Node,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ImportKind;
    use satchel_config::Environment;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(files: &[(&str, &str)]) -> Self {
            let dir = TempDir::new().unwrap();
            for (path, content) in files {
                let full = dir.path().join(path);
                fs::create_dir_all(full.parent().unwrap()).unwrap();
                fs::write(full, content).unwrap();
            }
            Self { dir }
        }

        fn config(&self) -> satchel_config::BuildConfigBuilder {
            BuildConfig::builder(self.dir.path(), "src/index.ts", "lib")
                .alias("@", "src")
                .external("framework-x")
                .global("framework-x", "FrameworkX")
        }

        fn build(&self, config: BuildConfig, env: &Environment) -> Result<ModuleGraph> {
            let aliases = AliasResolver::new(config.aliases());
            let classifier = Classifier::new(&config);
            let defines = DefineTable::capture(config.defines(), env, config.root())?;
            GraphBuilder::new(&config, &aliases, &classifier, &defines).build(config.entry_path())
        }
    }

    #[test]
    fn follows_relative_alias_and_external_imports() {
        let fx = Fixture::new(&[
            (
                "src/index.ts",
                "import { h } from 'framework-x';\nimport { a } from './a';\nimport b from '@/components/b';\nexport { h, a, b };",
            ),
            ("src/a.ts", "export const a = 1;"),
            ("src/components/b.ts", "export default 2;"),
        ]);
        let graph = fx.build(fx.config().build().unwrap(), &Environment::empty()).unwrap();

        assert_eq!(graph.len(), 3);
        let entry = graph.entry();
        assert_eq!(
            entry.imports[0].target,
            ImportTarget::External {
                global: Some("FrameworkX".into())
            }
        );
        let b = graph.by_path(&fx.dir.path().join("src/components/b.ts")).unwrap();
        assert_eq!(entry.imports[2].target, ImportTarget::Module(b.id));
    }

    #[test]
    fn js_extension_resolves_to_typescript_source() {
        let fx = Fixture::new(&[
            ("src/index.ts", "export * from './util.js';"),
            ("src/util.ts", "export const x = 1;"),
        ]);
        let graph = fx.build(fx.config().build().unwrap(), &Environment::empty()).unwrap();
        assert_eq!(graph.entry().imports[0].kind, ImportKind::ReExport);
        assert!(graph.by_path(&fx.dir.path().join("src/util.ts")).is_some());
    }

    #[test]
    fn sources_are_injected_once_loaded() {
        let fx = Fixture::new(&[
            ("src/index.ts", "export { v } from './v';"),
            ("src/v.ts", "export const v = __APP_VERSION__;"),
        ]);
        let env = Environment::from_pairs([("APP_VERSION", "1.2.3")]);
        let graph = fx.build(fx.config().build().unwrap(), &env).unwrap();
        let v = graph.by_path(&fx.dir.path().join("src/v.ts")).unwrap();
        assert_eq!(v.source, "export const v = \"1.2.3\";");
    }

    #[test]
    fn shared_dependency_is_one_node() {
        let fx = Fixture::new(&[
            ("src/index.ts", "import './a'; import './b';"),
            ("src/a.ts", "import './shared';"),
            ("src/b.ts", "import './shared';"),
            ("src/shared.ts", "export {};"),
        ]);
        let graph = fx.build(fx.config().build().unwrap(), &Environment::empty()).unwrap();
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn unresolvable_import_names_importer() {
        let fx = Fixture::new(&[("src/index.ts", "import './missing';")]);
        let err = fx
            .build(fx.config().build().unwrap(), &Environment::empty())
            .unwrap_err();
        match err {
            Error::Resolution {
                specifier, importer, ..
            } => {
                assert_eq!(specifier, "./missing");
                assert_eq!(importer, fx.dir.path().join("src/index.ts"));
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[test]
    fn syntax_error_is_transform_error() {
        let fx = Fixture::new(&[("src/index.ts", "export const = ;")]);
        let err = fx
            .build(fx.config().build().unwrap(), &Environment::empty())
            .unwrap_err();
        assert!(matches!(err, Error::Transform { module: Some(_), .. }));
    }

    #[test]
    fn json_modules_are_leaves() {
        let fx = Fixture::new(&[
            ("src/index.ts", "import data from './data.json'; export default data;"),
            ("src/data.json", "{\"__APP_VERSION__\": 1}"),
        ]);
        let graph = fx.build(fx.config().build().unwrap(), &Environment::empty()).unwrap();
        let data = graph.by_path(&fx.dir.path().join("src/data.json")).unwrap();
        assert!(data.imports.is_empty());
        assert!(data.source.contains("__APP_VERSION__"));
    }

    #[test]
    fn complete_scans_modules_converted_to_script() {
        let fx = Fixture::new(&[
            ("src/index.ts", "import App from './App.vue'; export default App;"),
            ("src/App.vue", "<template/>"),
            ("src/v.ts", "export const v = __APP_VERSION__;"),
        ]);
        let config = fx.config().build().unwrap();
        let env = Environment::from_pairs([("APP_VERSION", "4.5.6")]);
        let aliases = AliasResolver::new(config.aliases());
        let classifier = Classifier::new(&config);
        let defines = DefineTable::capture(config.defines(), &env, config.root()).unwrap();
        let builder = GraphBuilder::new(&config, &aliases, &classifier, &defines);

        let mut graph = builder.build(config.entry_path()).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(builder.complete(&mut graph).unwrap(), 0);

        let app = graph.id_of(&fx.dir.path().join("src/App.vue")).unwrap();
        let node = graph.module_mut(app).unwrap();
        node.kind = ModuleKind::Ts;
        node.source = "import { v } from '@/v'; export default v;".to_string();

        assert_eq!(builder.complete(&mut graph).unwrap(), 1);
        let v = graph.by_path(&fx.dir.path().join("src/v.ts")).unwrap();
        assert_eq!(v.source, "export const v = \"4.5.6\";");
        assert_eq!(
            graph.module(app).unwrap().imports[0].target,
            ImportTarget::Module(v.id)
        );
    }

    #[test]
    fn remote_specifiers_are_external() {
        let fx = Fixture::new(&[("src/index.ts", "import 'https://cdn.example.com/x.js';")]);
        let graph = fx.build(fx.config().build().unwrap(), &Environment::empty()).unwrap();
        assert!(matches!(
            graph.entry().imports[0].target,
            ImportTarget::External { global: None }
        ));
    }
}
