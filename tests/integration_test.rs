// Integration tests for gendoc

use gendoc::checker::SymbolFlags;
use gendoc::config::CompilerOptions;
use gendoc::{generate, DocEntry, EntryKind, Error, GenerateOptions, Generator, JsonWriter, Program};
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn fixtures_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_gendoc")))
}

// Helper to load a fixture and generate its entries with default options
fn generate_fixture(name: &str) -> gendoc::Result<Vec<DocEntry>> {
    let program = Program::create(&fixtures_path(name), &CompilerOptions::default())?;
    generate(&program, GenerateOptions::default())
}

fn names(entries: &[DocEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}

// ============================================================================
// Generation Tests
// ============================================================================

#[test]
fn test_class_with_documented_method() {
    let entries = generate_fixture("calculator/mod.ts").expect("Generation failed");
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].kind, EntryKind::Class);
    assert_eq!(entries[0].name, "Foo");
    assert_eq!(entries[0].docstr, None);

    let add = &entries[1];
    assert_eq!(add.kind, EntryKind::Method);
    assert_eq!(add.name, "Foo.add");
    assert_eq!(add.typestr.as_deref(), Some("(x: number, y: number) => number"));
    assert_eq!(add.docstr.as_deref(), Some("adds"));
    assert_eq!(add.ret_type.as_deref(), Some("number"));

    let args = add.args.as_ref().expect("method entries carry args");
    let arg_names: Vec<&str> = args.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(arg_names, vec!["x", "y"]);
    assert!(args.iter().all(|a| a.typestr.as_deref() == Some("number")));
}

#[test]
fn test_generic_function() {
    let entries = generate_fixture("generics/mod.ts").expect("Generation failed");
    assert_eq!(entries.len(), 1);

    let identity = &entries[0];
    assert_eq!(identity.name, "identity");
    assert_eq!(identity.typestr.as_deref(), Some("<T>(x: T) => T"));
    assert_eq!(identity.ret_type.as_deref(), Some("T"));
    assert_eq!(identity.docstr.as_deref(), Some("Returns its argument."));

    let args = identity.args.as_ref().unwrap();
    assert_eq!(args[0].typestr.as_deref(), Some("T"));
    assert_eq!(args[0].docstr.as_deref(), Some("the value to hand back"));
}

#[test]
fn test_type_literal_is_discovered_but_not_emitted() {
    let program = Program::create(&fixtures_path("options/mod.ts"), &CompilerOptions::default()).unwrap();
    let mut generator = Generator::new(&program, GenerateOptions::default());
    generator.seed_root().unwrap();
    generator.drain().unwrap();

    assert_eq!(names(generator.entries()), vec!["run"]);
    let run = &generator.entries()[0];
    assert_eq!(run.args.as_ref().unwrap()[0].typestr.as_deref(), Some("Options"));
    assert_eq!(run.ret_type.as_deref(), Some("void"));

    let discovered_literal = generator
        .history()
        .iter()
        .map(|s| program.symbol(*s))
        .any(|s| s.flags.contains(SymbolFlags::TYPE_LITERAL));
    assert!(discovered_literal, "Expected the Options type literal in the visited set");
}

#[test]
fn test_private_field_and_public_getter() {
    let entries = generate_fixture("members/mod.ts").expect("Generation failed");
    assert_eq!(names(&entries), vec!["Counter", "Counter.value"]);

    let value = &entries[1];
    assert_eq!(value.kind, EntryKind::Property);
    assert_eq!(value.typestr.as_deref(), Some("number"));
    assert_eq!(value.docstr.as_deref(), Some("Current value."));
    assert_eq!(value.args, None);
}

#[test]
fn test_cyclic_references_terminate() {
    let entries = generate_fixture("cycle/a.ts").expect("Generation failed");
    assert_eq!(names(&entries), vec!["A", "A.partner", "B", "B.partner"]);
    assert_eq!(entries[1].ret_type.as_deref(), Some("B"));
}

#[test]
fn test_aliases_document_original_once() {
    let entries = generate_fixture("reexport/mod.ts").expect("Generation failed");
    assert_eq!(names(&entries), vec!["Widget", "Widget.render", "helper"]);
    assert_eq!(entries[0].docstr.as_deref(), Some("A widget."));
    assert_eq!(entries[1].docstr.as_deref(), Some("Renders the widget."));
}

#[test]
fn test_classes_precede_their_members() {
    let entries = generate_fixture("reexport/mod.ts").expect("Generation failed");
    for (i, entry) in entries.iter().enumerate() {
        if let Some((class, _)) = entry.name.split_once('.') {
            let class_index = entries
                .iter()
                .position(|e| e.kind == EntryKind::Class && e.name == class)
                .expect("member without its class entry");
            assert!(class_index < i);
        }
    }
}

#[test]
fn test_unsupported_export_fails() {
    let err = generate_fixture("unsupported/mod.ts").unwrap_err();
    assert!(matches!(err, Error::UnsupportedSyntax { ref kind, .. } if kind == "EnumDeclaration"));
}

#[test]
fn test_missing_root_file() {
    let result = Program::create(&fixtures_path("does_not_exist.ts"), &CompilerOptions::default());
    assert!(matches!(result, Err(Error::PathNotFound(_))));
}

#[test]
fn test_absent_fields_not_serialized() {
    let entries = generate_fixture("calculator/mod.ts").unwrap();
    let json = JsonWriter::new(false).render(&entries).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let class = &value[0];
    assert_eq!(class["kind"], "class");
    assert!(class.get("docstr").is_none());
    assert!(class.get("typestr").is_none());
    assert!(class.get("args").is_none());
    assert!(class.get("sourceUrl").is_none());

    let method = &value[1];
    assert_eq!(method["retType"], "number");
    assert!(method["args"][0].get("docstr").is_none());
}

// ============================================================================
// CLI Tests
// ============================================================================

#[test]
fn test_cli_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs").join("api.json");

    cmd()
        .arg("generate")
        .arg(fixtures_path("calculator/mod.ts"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 entries"));

    let written = fs::read_to_string(&out).unwrap();
    let entries: Vec<DocEntry> = serde_json::from_str(&written).unwrap();
    assert_eq!(names(&entries), vec!["Foo", "Foo.add"]);
}

#[test]
fn test_cli_compact_stdout() {
    cmd()
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .arg("generate")
        .arg(fixtures_path("calculator/mod.ts"))
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(r#"[{"kind":"class","name":"Foo"}"#));
}

#[test]
fn test_cli_source_locators() {
    cmd()
        .arg("generate")
        .arg(fixtures_path("calculator/mod.ts"))
        .arg("--compact")
        .arg("--source-locators")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""sourceUrl":"mod.ts#L1-L6""#))
        .stdout(predicate::str::contains(r#""sourceUrl":"mod.ts#L2-L5""#));
}

#[test]
fn test_cli_root_from_config() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.json");
    let config_path = dir.path().join("gendoc.toml");
    let config = format!(
        "[project]\nname = \"fixtures\"\nroot = {:?}\n\n[output]\npath = {:?}\npretty = false\n",
        fixtures_path("generics/mod.ts").to_string_lossy(),
        out.to_string_lossy()
    );
    fs::write(&config_path, config).unwrap();

    cmd()
        .arg("generate")
        .arg("-c")
        .arg(&config_path)
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with(r#"[{"kind":"method","name":"identity""#));
}

#[test]
fn test_cli_missing_root_fails() {
    cmd()
        .arg("generate")
        .arg(fixtures_path("does_not_exist.ts"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Path not found"));
}

#[test]
fn test_cli_without_root_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no root file given"));
}

#[test]
fn test_cli_unsupported_syntax_fails() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.json");

    cmd()
        .arg("generate")
        .arg(fixtures_path("unsupported/mod.ts"))
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported syntax: EnumDeclaration"));

    assert!(!out.exists(), "No partial output on failure");
}

#[test]
fn test_cli_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("gendoc.toml");
    fs::write(&config_path, "[compiler]\nextensions = []\n").unwrap();

    cmd()
        .arg("generate")
        .arg(fixtures_path("calculator/mod.ts"))
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config validation error"));
}

#[test]
fn test_cli_version() {
    cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("gendoc "));
}
