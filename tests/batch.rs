//! End-to-end batch runs over real directories.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use remold::cst::{ParserOptions, SyntaxExtension};
use remold::runner::{self, Outcome, RunOptions};
use remold::transforms::builtin_registry;
use remold::{RemoldError, DEFAULT_PATTERN};

fn write_file(dir: &TempDir, rel: &str, content: &str) -> PathBuf {
    let path = dir.path().join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn read(path: &PathBuf) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn react_default_imports_become_namespace_imports() {
    let dir = TempDir::new().unwrap();
    let app = write_file(
        &dir,
        "src/App.jsx",
        "import React from \"react\";\nimport { helper } from \"./util\";\n\nexport default function App() {\n  return React.createElement(\"div\");\n}\n",
    );
    let util = write_file(&dir, "src/util.js", "export const helper = () => 1;\n");

    let registry = builtin_registry().unwrap();
    let result = runner::run(
        &registry,
        "default-to-namespace",
        dir.path(),
        DEFAULT_PATTERN,
        &RunOptions::default(),
    )
    .unwrap();

    assert!(result.is_success());
    assert_eq!(result.modified_count(), 1);
    assert_eq!(result.unchanged_count(), 1);
    assert_eq!(
        read(&app),
        "import * as React from \"react\";\nimport { helper } from \"./util\";\n\nexport default function App() {\n  return React.createElement(\"div\");\n}\n"
    );
    // Non-matching file is byte-identical, not merely equivalent.
    assert_eq!(read(&util), "export const helper = () => 1;\n");
}

#[test]
fn batch_stops_at_first_failure_in_path_order() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.js", "import React from \"react\";\n");
    let b = write_file(&dir, "b.js", "import x from \"oops;\n");
    let c = write_file(&dir, "c.js", "import React from \"react\";\n");

    let registry = builtin_registry().unwrap();
    let result = runner::run(
        &registry,
        "default-to-namespace",
        dir.path(),
        "*.js",
        &RunOptions::default(),
    )
    .unwrap();

    assert!(!result.is_success());
    let failure = result.failure.as_ref().unwrap();
    assert_eq!(failure.path, "b.js");
    assert_eq!(failure.code, 4);

    // Files before the failure are committed; the failing file and the
    // files after it are untouched.
    assert_eq!(read(&a), "import * as React from \"react\";\n");
    assert_eq!(read(&b), "import x from \"oops;\n");
    assert_eq!(read(&c), "import React from \"react\";\n");

    let outcomes: Vec<Outcome> = result.tasks.iter().map(|t| t.outcome).collect();
    assert_eq!(outcomes, vec![Outcome::Modified, Outcome::Failed]);
}

#[test]
fn dry_run_leaves_the_tree_untouched() {
    let dir = TempDir::new().unwrap();
    let app = write_file(&dir, "App.jsx", "import React from \"react\";\n");

    let registry = builtin_registry().unwrap();
    let options = RunOptions {
        dry_run: true,
        ..Default::default()
    };
    let result = runner::run(
        &registry,
        "default-to-namespace",
        dir.path(),
        DEFAULT_PATTERN,
        &options,
    )
    .unwrap();

    assert_eq!(result.modified_count(), 1);
    assert_eq!(
        result.tasks[0].after.as_deref(),
        Some("import * as React from \"react\";\n")
    );
    assert_eq!(read(&app), "import React from \"react\";\n");
}

#[test]
fn unknown_transform_fails_without_touching_any_file() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "a.js", "import React from \"react\";\n");

    let registry = builtin_registry().unwrap();
    let err = runner::run(
        &registry,
        "no-such-transform",
        dir.path(),
        "*.js",
        &RunOptions::default(),
    )
    .unwrap_err();

    match err {
        RemoldError::UnknownTransform { name, known } => {
            assert_eq!(name, "no-such-transform");
            assert_eq!(
                known,
                vec![
                    "default-to-namespace".to_string(),
                    "strip-type-imports".to_string()
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn typescript_sources_need_the_extension_enabled() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "types.ts",
        "import type { Props } from \"./props\";\nconst x: number = 1;\n",
    );

    let registry = builtin_registry().unwrap();

    // Without the extension the parser treats `type` as a default binding
    // and chokes on the `{` that follows it.
    let plain = runner::run(
        &registry,
        "strip-type-imports",
        dir.path(),
        "*.ts",
        &RunOptions::default(),
    )
    .unwrap();
    assert!(!plain.is_success());
    assert_eq!(plain.failure.as_ref().unwrap().code, 4);

    let options = RunOptions {
        parser: ParserOptions::new().with(SyntaxExtension::TypeScript),
        ..Default::default()
    };
    let result = runner::run(&registry, "strip-type-imports", dir.path(), "*.ts", &options).unwrap();
    assert!(result.is_success());
    assert_eq!(result.modified_count(), 1);
    assert_eq!(
        read(&dir.path().join("types.ts")),
        "const x: number = 1;\n"
    );
}

#[test]
fn second_run_is_a_fixpoint() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "a.js", "import React from \"react\";\n");

    let registry = builtin_registry().unwrap();
    let first = runner::run(
        &registry,
        "default-to-namespace",
        dir.path(),
        "*.js",
        &RunOptions::default(),
    )
    .unwrap();
    assert_eq!(first.modified_count(), 1);

    let second = runner::run(
        &registry,
        "default-to-namespace",
        dir.path(),
        "*.js",
        &RunOptions::default(),
    )
    .unwrap();
    assert_eq!(second.modified_count(), 0);
    assert_eq!(second.unchanged_count(), 1);
}
