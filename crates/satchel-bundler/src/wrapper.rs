//! Script wrappers for global-consumable artifacts.
//!
//! The engine renders UMD and IIFE artifacts as CommonJS. The body is placed
//! verbatim inside a factory taking `(module, exports, require)`, and the
//! loader around it decides where those three come from. In the browser
//! global branch every external is read from its global before the body
//! runs, so a missing dependency fails at load time with a message naming
//! both the specifier and the expected global.

use std::fmt::Write as _;

use satchel_config::BuildConfig;
use serde_json::Value;

use crate::classify::guess_global_name;
use crate::engine::RenderedChunk;
use crate::graph::ModuleGraph;
use crate::plan::ModuleWrapper;
use crate::{Error, Result};

const SOURCE_MAP_COMMENT: &str = "//# sourceMappingURL=";

/// An external read from a host global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalBinding {
    pub specifier: String,
    pub global: String,
}

/// Everything a wrapper needs besides the rendered body.
#[derive(Debug, Clone)]
pub struct WrapperContext {
    library: String,
    global_name: String,
    bindings: Vec<GlobalBinding>,
}

/// Final artifact text and its source map.
#[derive(Debug, Clone)]
pub struct Finished {
    pub code: String,
    pub map: Option<String>,
}

impl WrapperContext {
    /// Bindings for every external imported anywhere in `graph`.
    ///
    /// Externals without a configured global get a derived name and a warning.
    pub fn new(config: &BuildConfig, graph: &ModuleGraph) -> Self {
        let bindings = graph
            .externals()
            .into_iter()
            .map(|(specifier, global)| {
                let global = match global {
                    Some(global) => global.to_string(),
                    None => {
                        let guessed = guess_global_name(specifier);
                        tracing::warn!(
                            specifier,
                            global = %guessed,
                            "no global configured for external; guessing"
                        );
                        guessed
                    }
                };
                GlobalBinding {
                    specifier: specifier.to_string(),
                    global,
                }
            })
            .collect();

        Self {
            library: config.package_name().to_string(),
            global_name: config.global_name().to_string(),
            bindings,
        }
    }

    pub fn from_parts(
        library: impl Into<String>,
        global_name: impl Into<String>,
        bindings: Vec<GlobalBinding>,
    ) -> Self {
        Self {
            library: library.into(),
            global_name: global_name.into(),
            bindings,
        }
    }

    pub fn bindings(&self) -> &[GlobalBinding] {
        &self.bindings
    }

    /// Text placed before the engine body. Always ends with a newline.
    fn prelude(&self, wrapper: ModuleWrapper) -> String {
        let mut out = String::new();
        match wrapper {
            ModuleWrapper::None => {}
            ModuleWrapper::Universal => {
                out.push_str("(function (factory) {\n");
                out.push_str(
                    "  if (typeof exports === \"object\" && typeof module !== \"undefined\") {\n",
                );
                out.push_str("    factory(module, exports, require);\n");
                out.push_str("  } else if (typeof define === \"function\" && define.amd) {\n");
                self.amd_branch(&mut out);
                out.push_str("  } else {\n");
                self.global_branch(&mut out, "    ");
                out.push_str("  }\n");
                out.push_str("})(function (module, exports, require) {\n");
            }
            ModuleWrapper::Iife => {
                out.push_str("(function (factory) {\n");
                self.global_branch(&mut out, "  ");
                out.push_str("})(function (module, exports, require) {\n");
            }
        }
        out
    }

    fn epilogue(wrapper: ModuleWrapper) -> &'static str {
        match wrapper {
            ModuleWrapper::None => "",
            ModuleWrapper::Universal | ModuleWrapper::Iife => "});\n",
        }
    }

    fn amd_branch(&self, out: &mut String) {
        let deps = self
            .bindings
            .iter()
            .map(|b| js_string(&b.specifier))
            .collect::<Vec<_>>()
            .join(", ");
        let params = (0..self.bindings.len())
            .map(|i| format!("d{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "    define([{deps}], function ({params}) {{");
        out.push_str("      var deps = {};\n");
        for (i, binding) in self.bindings.iter().enumerate() {
            let _ = writeln!(out, "      deps[{}] = d{i};", js_string(&binding.specifier));
        }
        out.push_str("      var m = { exports: {} };\n");
        out.push_str("      factory(m, m.exports, function (id) { return deps[id]; });\n");
        out.push_str("      return m.exports;\n");
        out.push_str("    });\n");
    }

    fn global_branch(&self, out: &mut String, indent: &str) {
        let library = js_string(&self.library);
        let lines = [
            "var g = typeof globalThis !== \"undefined\" ? globalThis : typeof self !== \"undefined\" ? self : this;".to_string(),
            "function read(path) {".to_string(),
            "  return path.split(\".\").reduce(function (o, k) { return o == null ? undefined : o[k]; }, g);".to_string(),
            "}".to_string(),
            "var deps = {};".to_string(),
        ];
        for line in &lines {
            let _ = writeln!(out, "{indent}{line}");
        }
        for binding in &self.bindings {
            let message = format!(
                "{}: external dependency \"{}\" expects global \"{}\" to be defined before this script is loaded",
                self.library, binding.specifier, binding.global
            );
            let global = js_string(&binding.global);
            let _ = writeln!(
                out,
                "{indent}if (typeof read({global}) === \"undefined\") throw new Error({});",
                js_string(&message)
            );
            let _ = writeln!(
                out,
                "{indent}deps[{}] = read({global});",
                js_string(&binding.specifier)
            );
        }
        let _ = writeln!(out, "{indent}var m = {{ exports: {{}} }};");
        let _ = writeln!(out, "{indent}factory(m, m.exports, function (id) {{");
        let _ = writeln!(
            out,
            "{indent}  if (Object.prototype.hasOwnProperty.call(deps, id)) return deps[id];"
        );
        let _ = writeln!(
            out,
            "{indent}  throw new Error({library} + \": cannot load \\\"\" + id + \"\\\" without a module loader\");"
        );
        let _ = writeln!(out, "{indent}}});");
        let _ = writeln!(out, "{indent}var parts = {}.split(\".\");", js_string(&self.global_name));
        let _ = writeln!(out, "{indent}var target = g;");
        let _ = writeln!(
            out,
            "{indent}for (var i = 0; i < parts.length - 1; i++) target = target[parts[i]] = target[parts[i]] || {{}};"
        );
        let _ = writeln!(out, "{indent}target[parts[parts.length - 1]] = m.exports;");
    }
}

/// Wrap `chunk` and attach the banner, fixing up the source map.
///
/// The engine's own `sourceMappingURL` comment is dropped; when a map is
/// present, a comment pointing at `<file_name>.map` is appended instead.
pub fn finish(
    context: &WrapperContext,
    wrapper: ModuleWrapper,
    banner: Option<&str>,
    file_name: &str,
    chunk: RenderedChunk,
) -> Result<Finished> {
    let mut prelude = String::new();
    if let Some(banner) = banner {
        prelude.push_str(banner.trim_end_matches('\n'));
        prelude.push('\n');
    }
    prelude.push_str(&context.prelude(wrapper));

    let body = strip_source_map_comment(&chunk.code);
    let mut code = String::with_capacity(prelude.len() + body.len() + 64);
    code.push_str(&prelude);
    code.push_str(body);
    if !code.ends_with('\n') {
        code.push('\n');
    }
    code.push_str(WrapperContext::epilogue(wrapper));

    let map = match chunk.map {
        Some(map) => {
            let shifted = shift_source_map(&map, line_count(&prelude), file_name)?;
            let _ = writeln!(code, "{SOURCE_MAP_COMMENT}{file_name}.map");
            Some(shifted)
        }
        None => None,
    };

    Ok(Finished { code, map })
}

fn line_count(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

fn strip_source_map_comment(code: &str) -> &str {
    let trimmed = code.trim_end();
    match trimmed.rfind('\n') {
        Some(pos) if trimmed[pos + 1..].starts_with(SOURCE_MAP_COMMENT) => &trimmed[..=pos],
        None if trimmed.starts_with(SOURCE_MAP_COMMENT) => "",
        _ => code,
    }
}

/// Offset every mapping by `lines` generated lines and point `file` at the artifact.
fn shift_source_map(map: &str, lines: usize, file_name: &str) -> Result<String> {
    let mut value: Value = serde_json::from_str(map)
        .map_err(|e| Error::transform(None, format!("engine produced an invalid source map: {e}")))?;
    let Some(object) = value.as_object_mut() else {
        return Err(Error::transform(None, "engine produced a non-object source map"));
    };

    if lines > 0 {
        let mappings = object
            .get("mappings")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let shifted = format!("{}{mappings}", ";".repeat(lines));
        object.insert("mappings".to_string(), Value::from(shifted));
    }
    object.insert("file".to_string(), Value::from(file_name));

    serde_json::to_string(&value)
        .map_err(|e| Error::transform(None, format!("failed to serialize source map: {e}")))
}

/// JSON string literal, which is also a valid JavaScript string literal.
fn js_string(text: &str) -> String {
    Value::from(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> WrapperContext {
        WrapperContext::from_parts(
            "my-lib",
            "MyLib",
            vec![GlobalBinding {
                specifier: "framework-x".into(),
                global: "FrameworkX".into(),
            }],
        )
    }

    fn chunk(code: &str, map: Option<&str>) -> RenderedChunk {
        RenderedChunk {
            code: code.to_string(),
            map: map.map(str::to_string),
        }
    }

    #[test]
    fn unwrapped_output_is_body_plus_banner() {
        let out = finish(
            &context(),
            ModuleWrapper::None,
            Some("/*! my-lib */"),
            "my-lib.js",
            chunk("export const a = 1;\n", None),
        )
        .unwrap();
        assert_eq!(out.code, "/*! my-lib */\nexport const a = 1;\n");
        assert!(out.map.is_none());
    }

    #[test]
    fn universal_wrapper_checks_globals_before_body() {
        let body = "\"use strict\";\nconst x = require(\"framework-x\");\nexports.a = x.h;\n";
        let out = finish(&context(), ModuleWrapper::Universal, None, "my-lib.umd.js", chunk(body, None))
            .unwrap();

        let check = out
            .code
            .find("expects global \\\"FrameworkX\\\" to be defined before this script is loaded")
            .unwrap();
        let body_at = out.code.find("\"use strict\"").unwrap();
        assert!(check < body_at);
        assert!(out.code.contains("my-lib: external dependency \\\"framework-x\\\""));
        assert!(out.code.contains("define.amd"));
        assert!(out.code.contains("define([\"framework-x\"], function (d0)"));
        assert!(out.code.contains("\"MyLib\".split(\".\")"));
        assert!(out.code.ends_with("});\n"));
    }

    #[test]
    fn iife_has_no_module_loader_branches() {
        let out = finish(&context(), ModuleWrapper::Iife, None, "my-lib.iife.js", chunk("exports.a = 1;", None))
            .unwrap();
        assert!(!out.code.contains("define.amd"));
        assert!(!out.code.contains("typeof module"));
        assert!(out.code.contains("read(\"FrameworkX\")"));
    }

    #[test]
    fn source_map_is_shifted_by_prelude_lines() {
        let map = r#"{"version":3,"sources":["a.ts"],"names":[],"mappings":"AAAA"}"#;
        let code = "exports.a = 1;\n//# sourceMappingURL=index.js.map\n";
        let out = finish(
            &context(),
            ModuleWrapper::Iife,
            Some("// banner"),
            "my-lib.iife.js",
            chunk(code, Some(map)),
        )
        .unwrap();

        let prelude_lines = out.code[..out.code.find("exports.a").unwrap()]
            .matches('\n')
            .count();
        let map: Value = serde_json::from_str(&out.map.unwrap()).unwrap();
        let mappings = map["mappings"].as_str().unwrap();
        assert_eq!(mappings, format!("{}AAAA", ";".repeat(prelude_lines)));
        assert_eq!(map["file"], "my-lib.iife.js");

        assert!(!out.code.contains("index.js.map"));
        assert!(out.code.ends_with("//# sourceMappingURL=my-lib.iife.js.map\n"));
    }

    #[test]
    fn invalid_map_is_a_transform_error() {
        let err = finish(&context(), ModuleWrapper::None, None, "a.js", chunk("x", Some("nope")))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Transform);
    }
}
