//! Shared project fixtures for satchel-bundler integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use satchel_bundler::{BuildConfig, BuildConfigBuilder};
use tempfile::TempDir;

/// A temporary project directory populated with `files`.
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().expect("parent")).expect("create dirs");
        fs::write(&full, content).expect("write fixture");
    }
    dir
}

/// The canonical library: one framework import, an aliased component, a version constant.
pub fn framework_project() -> TempDir {
    project(&[
        (
            "package.json",
            r#"{ "name": "@acme/widgets", "version": "3.1.4" }"#,
        ),
        (
            "src/index.ts",
            r#"
import { h } from 'framework-x';
import { Button } from '@/components/button';

export const version: string = __APP_VERSION__;

export function render(label: string) {
    return h(Button, { label });
}
"#,
        ),
        (
            "src/components/button.ts",
            r#"
import { h } from 'framework-x';

export const Button = (props: { label: string }) => h('button', null, props.label);
"#,
        ),
    ])
}

/// Builder for [`framework_project`] with the framework marked external.
pub fn framework_config(root: &Path) -> BuildConfigBuilder {
    BuildConfig::builder(root, "src/index.ts", "widgets")
        .global_name("Widgets")
        .external("framework-x")
        .global("framework-x", "FrameworkX")
        .alias("@", "src")
}

pub fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("read {}: {e}", path.as_ref().display()))
}

/// Every file name directly under `dir`, sorted.
pub fn listing(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
