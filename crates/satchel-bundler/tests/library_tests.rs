mod helpers;

use helpers::{framework_config, framework_project, listing, project, read};
use satchel_bundler::{
    BuildConfig, ConfigError, Environment, Error, ErrorKind, ModuleGraph, ModuleKind,
    OutputFormat, Pipeline, StagePhase, TransformStage,
};

fn env(pairs: &[(&str, &str)]) -> Environment {
    Environment::from_pairs(pairs.iter().copied())
}

#[tokio::test]
async fn es_keeps_external_import_and_umd_binds_global() {
    let project = framework_project();
    let config = framework_config(project.path()).build().expect("config");

    let outcome = Pipeline::new(&config)
        .environment(env(&[("APP_VERSION", "1.2.3")]))
        .build()
        .await
        .expect("build");

    let out = config.out_dir();
    assert_eq!(listing(out), ["widgets.js", "widgets.umd.js"]);

    let es = read(out.join("widgets.js"));
    assert!(es.contains("from \"framework-x\""), "es output:\n{es}");
    assert!(!es.contains("FrameworkX"));
    assert!(!es.contains("@/components"));

    let umd = read(out.join("widgets.umd.js"));
    assert!(umd.contains("require(\"framework-x\")"), "umd output:\n{umd}");
    assert!(umd.contains("read(\"FrameworkX\")"));
    assert!(umd.contains(
        "widgets: external dependency \\\"framework-x\\\" expects global \\\"FrameworkX\\\" to be defined before this script is loaded"
    ));
    assert!(umd.contains("\"Widgets\".split(\".\")"));

    assert_eq!(outcome.graph_stats.modules, 2);
    assert_eq!(outcome.graph_stats.externals, 1);
}

#[tokio::test]
async fn identical_inputs_produce_identical_artifacts() {
    let project = framework_project();
    let config = framework_config(project.path())
        .formats(OutputFormat::ALL)
        .build()
        .expect("config");

    let first = Pipeline::new(&config)
        .environment(env(&[("APP_VERSION", "1.0.0")]))
        .build()
        .await
        .expect("first build");
    let second = Pipeline::new(&config)
        .environment(env(&[("APP_VERSION", "1.0.0")]))
        .build()
        .await
        .expect("second build");

    assert_eq!(first.artifacts.len(), 4);
    for (a, b) in first.artifacts.iter().zip(&second.artifacts) {
        assert_eq!(a.file_name, b.file_name);
        assert_eq!(a.code, b.code, "{} differs between builds", a.file_name);
    }
}

#[tokio::test]
async fn app_version_comes_from_environment_then_manifest() {
    let project = framework_project();
    let config = framework_config(project.path())
        .formats([OutputFormat::Es])
        .build()
        .expect("config");

    let outcome = Pipeline::new(&config)
        .environment(env(&[("APP_VERSION", "1.2.3")]))
        .write_output(false)
        .build()
        .await
        .expect("build with version");
    let code = &outcome.artifacts[0].code;
    assert!(code.contains("\"1.2.3\""), "{code}");
    assert!(!code.contains("__APP_VERSION__"));
    assert!(!code.contains("3.1.4"));

    let outcome = Pipeline::new(&config)
        .environment(Environment::empty())
        .write_output(false)
        .build()
        .await
        .expect("build without version");
    let code = &outcome.artifacts[0].code;
    assert!(code.contains("\"3.1.4\""), "{code}");
    assert!(!code.contains("1.2.3"));
}

#[tokio::test]
async fn global_without_external_is_rejected_before_output() {
    let project = framework_project();
    let err = framework_config(project.path())
        .global("other-lib", "Other")
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::GlobalWithoutExternal { ref specifier, .. } if specifier == "other-lib"
    ));
    assert_eq!(Error::from(err).kind(), ErrorKind::Configuration);
    assert!(listing(&project.path().join("dist")).is_empty());
}

#[tokio::test]
async fn missing_entry_is_configuration_error() {
    let project = project(&[("package.json", r#"{ "name": "widgets" }"#)]);
    let config = framework_config(project.path()).build().expect("config");

    let err = Pipeline::new(&config)
        .environment(Environment::empty())
        .build()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("src/index.ts"));
    assert!(!config.out_dir().exists());
}

#[tokio::test]
async fn unsupported_module_type_is_transform_error() {
    let project = project(&[
        ("src/index.ts", "import App from './App.vue';\nexport default App;"),
        ("src/App.vue", "<template><div/></template>"),
    ]);
    let config = framework_config(project.path()).build().expect("config");

    let err = Pipeline::new(&config)
        .environment(Environment::empty())
        .build()
        .await
        .unwrap_err();

    match err {
        Error::Transform { module, message, .. } => {
            assert_eq!(module, Some(project.path().join("src/App.vue")));
            assert!(message.contains(".vue"));
        }
        other => panic!("expected transform error, got {other:?}"),
    }
    assert!(!config.out_dir().exists());
}

/// Keeps the `<script>` block of `.vue` modules and treats it as TypeScript.
struct VueScript;

impl TransformStage for VueScript {
    fn name(&self) -> &str {
        "vue-script"
    }

    fn phase(&self) -> StagePhase {
        StagePhase::Source
    }

    fn transform(&self, mut graph: ModuleGraph) -> satchel_bundler::Result<ModuleGraph> {
        for node in graph.modules_mut() {
            if node.kind != ModuleKind::Other("vue".into()) {
                continue;
            }
            let script = node
                .source
                .split_once("<script lang=\"ts\">")
                .and_then(|(_, rest)| rest.split_once("</script>"))
                .map(|(script, _)| script.to_string())
                .unwrap_or_default();
            node.source = script;
            node.kind = ModuleKind::Ts;
        }
        Ok(graph)
    }
}

#[tokio::test]
async fn converted_modules_have_their_imports_bundled() {
    let project = project(&[
        ("src/index.ts", "export { default as App } from './App.vue';"),
        (
            "src/App.vue",
            "<template><b/></template>\n<script lang=\"ts\">\nimport { v } from '@/v';\nimport Child from './Child.vue';\nexport default { v, Child };\n</script>",
        ),
        (
            "src/Child.vue",
            "<script lang=\"ts\">\nexport default { name: 'child-component' };\n</script>",
        ),
        ("src/v.ts", "export const v: string = __APP_VERSION__;"),
    ]);
    let config = framework_config(project.path())
        .formats([OutputFormat::Es])
        .build()
        .expect("config");

    let outcome = Pipeline::new(&config)
        .environment(env(&[("APP_VERSION", "9.9.9")]))
        .stage(VueScript)
        .write_output(false)
        .build()
        .await
        .expect("build");

    let es = &outcome.artifact(OutputFormat::Es).expect("es").code;
    assert!(!es.contains("@/v"), "{es}");
    assert!(es.contains("\"9.9.9\""), "{es}");
    assert!(es.contains("child-component"), "{es}");
    assert_eq!(outcome.graph_stats.modules, 4);
}

#[tokio::test]
async fn unresolved_import_in_converted_module_fails() {
    let project = project(&[
        ("src/index.ts", "export { default } from './App.vue';"),
        (
            "src/App.vue",
            "<script lang=\"ts\">\nimport { v } from '@/missing';\nexport default v;\n</script>",
        ),
    ]);
    let config = framework_config(project.path()).build().expect("config");

    let err = Pipeline::new(&config)
        .environment(Environment::empty())
        .stage(VueScript)
        .build()
        .await
        .unwrap_err();

    match err {
        Error::Resolution {
            specifier, importer, ..
        } => {
            assert_eq!(specifier, "@/missing");
            assert_eq!(importer, project.path().join("src/App.vue"));
        }
        other => panic!("expected resolution error, got {other:?}"),
    }
    assert!(!config.out_dir().exists());
}

#[tokio::test]
async fn syntax_error_names_the_module() {
    let project = project(&[
        ("src/index.ts", "export * from './broken';"),
        ("src/broken.ts", "export const = 1;"),
    ]);
    let config = framework_config(project.path()).build().expect("config");

    let err = Pipeline::new(&config)
        .environment(Environment::empty())
        .build()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transform);
    assert!(err.to_string().contains("broken.ts"), "{err}");
}

#[tokio::test]
async fn sourcemaps_and_banner_are_written() {
    let project = framework_project();
    let config = framework_config(project.path())
        .formats([OutputFormat::Es, OutputFormat::Iife])
        .sourcemap(true)
        .banner("/*! widgets | MIT */")
        .build()
        .expect("config");

    let outcome = Pipeline::new(&config)
        .environment(Environment::empty())
        .build()
        .await
        .expect("build");

    let out = config.out_dir();
    assert_eq!(
        listing(out),
        ["widgets.iife.js", "widgets.iife.js.map", "widgets.js", "widgets.js.map"]
    );

    let iife = read(out.join("widgets.iife.js"));
    assert!(iife.starts_with("/*! widgets | MIT */\n(function (factory) {"));
    assert!(iife.trim_end().ends_with("//# sourceMappingURL=widgets.iife.js.map"));

    let map: serde_json::Value =
        serde_json::from_str(&read(out.join("widgets.iife.js.map"))).expect("map json");
    assert_eq!(map["file"], "widgets.iife.js");
    assert!(map["mappings"].as_str().unwrap_or_default().starts_with(";;"));

    let es = outcome.artifact(OutputFormat::Es).expect("es artifact");
    assert_eq!(es.path, Some(out.join("widgets.js")));
}

#[tokio::test]
async fn external_subpaths_stay_external() {
    let project = project(&[(
        "src/index.ts",
        "import { jsx } from 'framework-x/jsx-runtime';\nexport const el = jsx('div', {});",
    )]);
    let config = BuildConfig::builder(project.path(), "src/index.ts", "subpath")
        .external("framework-x")
        .formats([OutputFormat::Es, OutputFormat::Umd])
        .build()
        .expect("config");

    let outcome = Pipeline::new(&config)
        .environment(Environment::empty())
        .write_output(false)
        .build()
        .await
        .expect("build");

    let es = &outcome.artifact(OutputFormat::Es).expect("es").code;
    assert!(es.contains("framework-x/jsx-runtime"));
    let umd = &outcome.artifact(OutputFormat::Umd).expect("umd").code;
    assert!(umd.contains("read(\"jsxRuntime\")"), "{umd}");
}
