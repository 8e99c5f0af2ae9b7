//! Diagnostic extraction from engine errors.
//!
//! Rolldown reports failures as opaque batches. The text is searched for
//! the module that failed and the location inside it so the failure can be
//! reported as a single error: [`Error::Resolution`] when a specifier could
//! not be resolved, [`Error::Transform`] otherwise.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::Error;
use crate::graph::ModuleGraph;

/// Longest message kept from the engine's text.
const MAX_MESSAGE_LEN: usize = 500;

static MESSAGE_FIELD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"message:\s*"((?:[^"\\]|\\.)*)""#).ok());

static UNRESOLVED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"Could not resolve\s+'([^']+)'(?:\s+in\s+([^\s:"']+))?"#).ok());

static ANY_LOCATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\.[cm]?[jt]sx?:(\d+):(\d+)").ok());

/// Diagnostic kind, derived from the engine's wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    ParseError,
    MissingExport,
    UnresolvedImport,
    Plugin,
    Transform,
    Other,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::ParseError => "parse error",
            DiagnosticKind::MissingExport => "missing export",
            DiagnosticKind::UnresolvedImport => "unresolved import",
            DiagnosticKind::Plugin => "plugin error",
            DiagnosticKind::Transform => "transform error",
            DiagnosticKind::Other => "bundler error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDiagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub help: Option<String>,
    /// Specifier and importer named by an unresolved-import failure.
    pub unresolved: Option<(String, Option<PathBuf>)>,
}

impl ExtractedDiagnostic {
    pub fn into_error(self) -> Error {
        let message = match &self.help {
            Some(help) => format!("{}: {} ({help})", self.kind, self.message),
            None => format!("{}: {}", self.kind, self.message),
        };
        match self.unresolved {
            Some((specifier, named)) if self.kind == DiagnosticKind::UnresolvedImport => {
                Error::Resolution {
                    specifier,
                    importer: self.file.or(named).unwrap_or_default(),
                    reason: message,
                }
            }
            _ => Error::Transform {
                module: self.file,
                line: self.line,
                column: self.column,
                message,
            },
        }
    }
}

/// Turn an engine error into the pipeline's terminal error.
pub fn from_engine_error(error: &dyn fmt::Debug, graph: &ModuleGraph) -> Error {
    extract(&format!("{error:?}"), graph).into_error()
}

/// Extract a diagnostic from engine error text.
///
/// The offending module is the first graph module whose path appears in the
/// text; the line and column come from a `path:line:column` reference to it.
pub fn extract(text: &str, graph: &ModuleGraph) -> ExtractedDiagnostic {
    let file = graph
        .modules()
        .map(|node| node.path.as_path())
        .find(|path| text.contains(&*path.to_string_lossy()))
        .map(Path::to_path_buf);

    let (line, column) = match &file {
        Some(path) => location_after(text, &path.to_string_lossy()),
        None => None,
    }
    .or_else(|| any_location(text))
    .map_or((None, None), |(l, c)| (Some(l), Some(c)));

    ExtractedDiagnostic {
        kind: classify(text),
        message: extract_message(text),
        file,
        line,
        column,
        help: extract_help_text(text),
        unresolved: extract_unresolved(text),
    }
}

fn extract_unresolved(text: &str) -> Option<(String, Option<PathBuf>)> {
    let caps = UNRESOLVED.as_ref()?.captures(text)?;
    let importer = caps.get(2).map(|m| PathBuf::from(m.as_str()));
    Some((caps[1].to_string(), importer))
}

fn classify(text: &str) -> DiagnosticKind {
    if text.contains("MissingExport") || text.contains("is not exported") {
        DiagnosticKind::MissingExport
    } else if text.contains("Parse error")
        || text.contains("Syntax")
        || text.contains("Unexpected token")
        || text.contains("Expected")
    {
        DiagnosticKind::ParseError
    } else if text.contains("UnresolvedImport") || text.contains("Could not resolve") {
        DiagnosticKind::UnresolvedImport
    } else if text.contains("Plugin") {
        DiagnosticKind::Plugin
    } else if text.contains("Transform") || text.contains("transform") {
        DiagnosticKind::Transform
    } else {
        DiagnosticKind::Other
    }
}

fn extract_message(text: &str) -> String {
    let message = MESSAGE_FIELD
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("\\\"", "\"").replace("\\n", "\n"))
        .unwrap_or_else(|| {
            text.lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("unknown error")
                .to_string()
        });

    if message.len() > MAX_MESSAGE_LEN {
        let mut end = MAX_MESSAGE_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &message[..end])
    } else {
        message
    }
}

/// `path:line:column` for a known path.
fn location_after(text: &str, path: &str) -> Option<(u32, u32)> {
    let pattern = format!(r"{}:(\d+):(\d+)", regex::escape(path));
    let caps = Regex::new(&pattern).ok()?.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

fn any_location(text: &str) -> Option<(u32, u32)> {
    let caps = ANY_LOCATION.as_ref()?.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

fn extract_help_text(text: &str) -> Option<String> {
    for indicator in ["help: ", "Help: ", "hint: ", "Hint: "] {
        if let Some(pos) = text.find(indicator) {
            let help = text[pos + indicator.len()..]
                .lines()
                .next()
                .unwrap_or("")
                .trim()
                .trim_end_matches(['"', ',']);
            if !help.is_empty() {
                return Some(help.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> ModuleGraph {
        let mut graph = ModuleGraph::new("/proj/src/index.ts", String::new());
        graph.add_module("/proj/src/util.ts".into(), String::new());
        graph
    }

    #[test]
    fn finds_module_and_location() {
        let text = r#"BatchedBuildDiagnostic { diagnostics: [Diagnostic { kind: ParseError, message: "Unexpected token", id: "/proj/src/util.ts", loc: "/proj/src/util.ts:4:12" }] }"#;
        let diag = extract(text, &graph());
        assert_eq!(diag.kind, DiagnosticKind::ParseError);
        assert_eq!(diag.file, Some(PathBuf::from("/proj/src/util.ts")));
        assert_eq!((diag.line, diag.column), (Some(4), Some(12)));
        assert_eq!(diag.message, "Unexpected token");
    }

    #[test]
    fn missing_export_is_classified() {
        let text = r#"MissingExport { message: "\"foo\" is not exported by \"/proj/src/index.ts\"" }"#;
        let diag = extract(text, &graph());
        assert_eq!(diag.kind, DiagnosticKind::MissingExport);
        assert_eq!(diag.file, Some(PathBuf::from("/proj/src/index.ts")));
        assert_eq!(diag.message, "\"foo\" is not exported by \"/proj/src/index.ts\"");
    }

    #[test]
    fn unknown_text_still_produces_transform_error() {
        let err = from_engine_error(&"something odd happened", &graph());
        match err {
            Error::Transform { module, line, message, .. } => {
                assert!(module.is_none());
                assert!(line.is_none());
                assert!(message.contains("something odd happened"));
            }
            other => panic!("expected transform error, got {other:?}"),
        }
    }

    #[test]
    fn long_messages_are_truncated() {
        let text = "x".repeat(MAX_MESSAGE_LEN * 2);
        let diag = extract(&text, &graph());
        assert!(diag.message.len() <= MAX_MESSAGE_LEN + 3);
        assert!(diag.message.ends_with("..."));
    }

    #[test]
    fn unresolved_import_becomes_resolution_error() {
        let text = r#"BatchedBuildDiagnostic { diagnostics: [Diagnostic { message: "Could not resolve '@/v' in /proj/src/util.ts: import is not in the module graph" }] }"#;
        match from_engine_error(&text, &graph()) {
            Error::Resolution {
                specifier,
                importer,
                reason,
            } => {
                assert_eq!(specifier, "@/v");
                assert_eq!(importer, PathBuf::from("/proj/src/util.ts"));
                assert!(reason.contains("not in the module graph"));
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[test]
    fn unresolved_importer_outside_graph_is_taken_from_text() {
        let diag = extract("Could not resolve 'lodash' in src/legacy.js", &graph());
        assert!(diag.file.is_none());
        assert_eq!(
            diag.unresolved,
            Some(("lodash".to_string(), Some(PathBuf::from("src/legacy.js"))))
        );
        assert_eq!(diag.into_error().kind(), crate::ErrorKind::Resolution);
    }

    #[test]
    fn help_is_kept() {
        let text = "Could not resolve './x'\nhelp: check the path";
        let diag = extract(text, &graph());
        assert_eq!(diag.kind, DiagnosticKind::UnresolvedImport);
        assert_eq!(diag.help.as_deref(), Some("check the path"));
    }
}
