use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression,
    ImportDeclaration, ImportExpression,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::SourceType;

use super::{ImportKind, ModuleKind};

/// An import specifier found in module source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScannedImport {
    pub specifier: String,
    pub kind: ImportKind,
}

/// Collect value imports, re-exports, and dynamic imports and `require`
/// calls whose argument is a plain string.
///
/// Type-only imports and exports are skipped; they vanish when types are
/// stripped. Returns the first parse error message on failure.
pub(crate) fn scan_imports(
    path: &Path,
    kind: &ModuleKind,
    source: &str,
) -> Result<Vec<ScannedImport>, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type(path, kind)).parse();

    if let Some(error) = ret.errors.first() {
        return Err(error.to_string());
    }
    if ret.panicked {
        return Err("parser aborted".to_string());
    }

    let mut scanner = ImportScanner::default();
    scanner.visit_program(&ret.program);
    Ok(scanner.found)
}

/// Parse by extension unless a stage changed the module's kind.
fn source_type(path: &Path, kind: &ModuleKind) -> SourceType {
    if ModuleKind::from_path(path) == *kind {
        if let Ok(source_type) = SourceType::from_path(path) {
            return source_type;
        }
    }
    match kind {
        ModuleKind::Ts => SourceType::ts(),
        ModuleKind::Tsx => SourceType::tsx(),
        ModuleKind::Jsx => SourceType::jsx(),
        _ => SourceType::mjs(),
    }
}

#[derive(Default)]
struct ImportScanner {
    found: Vec<ScannedImport>,
}

impl ImportScanner {
    fn push(&mut self, specifier: &str, kind: ImportKind) {
        self.found.push(ScannedImport {
            specifier: specifier.to_string(),
            kind,
        });
    }
}

impl<'a> Visit<'a> for ImportScanner {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        if !it.import_kind.is_type() {
            self.push(it.source.value.as_str(), ImportKind::Static);
        }
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &it.source {
            if !it.export_kind.is_type() {
                self.push(source.value.as_str(), ImportKind::ReExport);
            }
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        if !it.export_kind.is_type() {
            self.push(it.source.value.as_str(), ImportKind::ReExport);
        }
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        match &it.source {
            Expression::StringLiteral(literal) => {
                self.push(literal.value.as_str(), ImportKind::Dynamic);
            }
            Expression::TemplateLiteral(template) => {
                if let Some(quasi) = template.single_quasi() {
                    self.push(quasi.as_str(), ImportKind::Dynamic);
                }
            }
            _ => {}
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if it.callee.is_specific_id("require") {
            if let [Argument::StringLiteral(literal)] = &it.arguments[..] {
                self.push(literal.value.as_str(), ImportKind::Require);
            }
        }
        walk::walk_call_expression(self, it);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specifiers(path: &str, source: &str) -> Vec<(String, ImportKind)> {
        scan_imports(Path::new(path), &ModuleKind::from_path(Path::new(path)), source)
            .unwrap()
            .into_iter()
            .map(|i| (i.specifier, i.kind))
            .collect()
    }

    #[test]
    fn collects_static_reexport_and_dynamic() {
        let found = specifiers(
            "index.ts",
            r#"
import { ref } from 'vue';
import Chart from '@/components/chart';
export * from './util';
export { helper } from './helper';
const lazy = () => import('./lazy');
"#,
        );
        assert_eq!(
            found,
            vec![
                ("vue".to_string(), ImportKind::Static),
                ("@/components/chart".to_string(), ImportKind::Static),
                ("./util".to_string(), ImportKind::ReExport),
                ("./helper".to_string(), ImportKind::ReExport),
                ("./lazy".to_string(), ImportKind::Dynamic),
            ]
        );
    }

    #[test]
    fn skips_type_only_imports() {
        let found = specifiers(
            "index.ts",
            r#"
import type { Plan } from './types';
export type { Node } from './nodes';
import { value } from './value';
"#,
        );
        assert_eq!(found, vec![("./value".to_string(), ImportKind::Static)]);
    }

    #[test]
    fn ignores_computed_dynamic_imports() {
        let found = specifiers("index.js", "const m = (n) => import(`./pages/${n}`);");
        assert!(found.is_empty());
    }

    #[test]
    fn collects_literal_requires() {
        let found = specifiers(
            "index.cjs",
            "const a = require('./a');\nconst b = require(name);\nmodule.exports = { a, b };",
        );
        assert_eq!(found, vec![("./a".to_string(), ImportKind::Require)]);
    }

    #[test]
    fn plain_template_dynamic_import_is_collected() {
        let found = specifiers("index.js", "const m = () => import(`./page`);");
        assert_eq!(found, vec![("./page".to_string(), ImportKind::Dynamic)]);
    }

    #[test]
    fn reports_syntax_errors() {
        assert!(scan_imports(Path::new("broken.ts"), &ModuleKind::Ts, "export const = ;").is_err());
    }

    #[test]
    fn converted_module_parses_as_its_new_kind() {
        let source = "import { v } from '@/v';\nconst n: number = v;\nexport default n;";
        let found = scan_imports(Path::new("App.vue"), &ModuleKind::Ts, source).unwrap();
        assert_eq!(found[0].specifier, "@/v");
    }
}
