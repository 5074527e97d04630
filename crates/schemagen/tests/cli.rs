//! Integration tests for the schemagen binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SCHEMA: &str = r##"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "definitions": {
    "User": {
      "type": "object",
      "properties": {
        "id": { "type": "integer", "minimum": 1 },
        "address": { "$ref": "#/definitions/Address" }
      },
      "required": ["id"]
    },
    "Address": { "type": "string" },
    "user": { "type": "number" }
  }
}"##;

fn schemagen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_schemagen"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("users.json"), SCHEMA).unwrap();
    dir
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_exits_zero() {
    let dir = TempDir::new().unwrap();
    let output = schemagen(dir.path(), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--schema"), "{stdout}");
    assert!(stdout.contains("--target"), "{stdout}");
}

#[test]
fn usage_errors_exit_one() {
    let dir = TempDir::new().unwrap();
    let output = schemagen(dir.path(), &["-o", "out.ts"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--schema"), "{}", stderr(&output));
}

#[test]
fn generates_the_requested_target_and_its_dependencies() {
    let dir = workspace();
    let output = schemagen(
        dir.path(),
        &["-s", "users.json", "-o", "gen/users.ts", "-t", "#/definitions/User"],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let text = fs::read_to_string(dir.path().join("gen/users.ts")).unwrap();
    assert!(text.starts_with("// Generated by schemagen from users.json. Do not edit.\n"), "{text}");
    assert!(text.contains("from \"./validation-runtime\";"), "{text}");
    assert!(text.contains("export interface User {"), "{text}");
    assert!(text.contains("type Address = string;"), "{text}");
    assert!(text.contains("export function validateUser("), "{text}");
    assert!(text.contains("function validateAddress("), "{text}");
    assert!(!text.contains("validateUser2"), "{text}");
}

#[test]
fn emits_the_runtime_module_on_request() {
    let dir = workspace();
    let output = schemagen(
        dir.path(),
        &[
            "-s",
            "users.json",
            "-o",
            "users.ts",
            "-t",
            "#/definitions/Address",
            "--runtime-import",
            "@acme/runtime",
            "--emit-runtime",
            "runtime.ts",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let text = fs::read_to_string(dir.path().join("users.ts")).unwrap();
    assert!(text.contains("from \"@acme/runtime\";"), "{text}");
    let runtime = fs::read_to_string(dir.path().join("runtime.ts")).unwrap();
    assert!(runtime.contains("export interface ValidationIssue {"), "{runtime}");
    assert!(runtime.contains("\"missing_key\""), "{runtime}");
}

#[test]
fn unwritable_runtime_path_leaves_no_generated_module() {
    let dir = workspace();
    fs::write(dir.path().join("blocker"), "").unwrap();
    let output = schemagen(
        dir.path(),
        &[
            "-s",
            "users.json",
            "-o",
            "users.ts",
            "-t",
            "#/definitions/Address",
            "--emit-runtime",
            "blocker/runtime.ts",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("blocker"), "{}", stderr(&output));
    assert!(!dir.path().join("users.ts").exists());
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 2, "{leftovers:?}");
}

#[test]
fn unresolvable_target_fails_without_writing() {
    let dir = workspace();
    let output = schemagen(
        dir.path(),
        &["-s", "users.json", "-o", "users.ts", "-t", "#/definitions/Nope"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Nope"), "{}", stderr(&output));
    assert!(!dir.path().join("users.ts").exists());
}

#[test]
fn name_collisions_fail_with_a_hint() {
    let dir = workspace();
    let output = schemagen(
        dir.path(),
        &[
            "-s",
            "users.json",
            "-o",
            "users.ts",
            "-t",
            "#/definitions/User",
            "-t",
            "#/definitions/user",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    let message = stderr(&output);
    assert!(message.contains("explicit name"), "{message}");
    assert!(!dir.path().join("users.ts").exists());

    let output = schemagen(
        dir.path(),
        &[
            "-s",
            "users.json",
            "-o",
            "users.ts",
            "-t",
            "#/definitions/User",
            "-t",
            "path=#/definitions/user,name=LegacyUser",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let text = fs::read_to_string(dir.path().join("users.ts")).unwrap();
    assert!(text.contains("export type LegacyUser = number;"), "{text}");
}

#[test]
fn config_file_supplies_defaults() {
    let dir = workspace();
    fs::write(
        dir.path().join("schemagen.toml"),
        r##"
runtime_import = "./rt"
header = "Owned by accounts"

[[targets]]
path = "#/definitions/User"
name = "Account"
"##,
    )
    .unwrap();

    let output = schemagen(dir.path(), &["-s", "users.json", "-o", "a.ts"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = fs::read_to_string(dir.path().join("a.ts")).unwrap();
    assert!(text.contains("// Owned by accounts"), "{text}");
    assert!(text.contains("from \"./rt\";"), "{text}");
    assert!(text.contains("export interface Account {"), "{text}");

    // Flags override the file.
    let output = schemagen(
        dir.path(),
        &[
            "-s",
            "users.json",
            "-o",
            "b.ts",
            "-t",
            "#/definitions/Address",
            "--runtime-import",
            "./other",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let text = fs::read_to_string(dir.path().join("b.ts")).unwrap();
    assert!(text.contains("from \"./other\";"), "{text}");
    assert!(text.contains("export type Address = string;"), "{text}");
    assert!(!text.contains("Account"), "{text}");
}

#[test]
fn invalid_json_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
    let output = schemagen(dir.path(), &["-s", "bad.json", "-o", "out.ts"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to parse bad.json as JSON"), "{}", stderr(&output));
}
