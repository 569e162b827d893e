//! Integration tests for the fuzzfix binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const IF_SOURCE: &str =
    "int main(int x) {\n  if (x + 5 > 1) { return -1; } else { return 0; }\n}\n";

const IF_FORMATTED: &str = "int main(int x) {\n  int __fuzzfix0 = x + 5 > 1;\n  if (__fuzzfix0) { return -1; } else { return 0; }\n}\n";

const FEATURE_SOURCE: &str = "void f() {\n  if (FEATURE) g();\n}\n";

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("fuzzfix").unwrap()
}

fn write_source(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("normalize C branch conditions"))
        .stdout(predicate::str::contains("--emit"));
}

#[test]
fn test_cli_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fuzzfix"));
}

#[test]
fn test_rewrite_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(&temp_dir, "main.c", IF_SOURCE);

    cli()
        .arg(&input)
        .assert()
        .success()
        .stdout(IF_FORMATTED)
        .stderr(predicate::str::contains("Successfully applied 1 changes!"));
}

#[test]
fn test_rewrite_to_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(&temp_dir, "main.c", IF_SOURCE);
    let output = temp_dir.path().join("main.fixed.c");

    cli()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Successfully applied 1 changes!"));

    assert_eq!(fs::read_to_string(&output).unwrap(), IF_FORMATTED);
    // Input is never modified
    assert_eq!(fs::read_to_string(&input).unwrap(), IF_SOURCE);
}

#[test]
fn test_unwritable_output_falls_back_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(&temp_dir, "main.c", IF_SOURCE);
    let output = temp_dir.path().join("missing").join("out.c");

    cli()
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(IF_FORMATTED)
        .stderr(predicate::str::contains("writing to stdout instead"));

    assert!(!output.exists());
}

#[test]
fn test_parse_error_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(&temp_dir, "bad.c", "int main() {\n  if (x {\n}\n");
    let output = temp_dir.path().join("bad.fixed.c");

    cli()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Parse error"));

    assert!(!output.exists());
}

#[test]
fn test_missing_input_fails() {
    let temp_dir = TempDir::new().unwrap();

    cli()
        .arg(temp_dir.path().join("nope.c"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_compiler_args_define_macros() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(&temp_dir, "feature.c", FEATURE_SOURCE);

    cli()
        .arg(&input)
        .assert()
        .success()
        .stdout(FEATURE_SOURCE)
        .stderr(predicate::str::contains("Successfully applied 0 changes!"));

    cli()
        .arg(&input)
        .arg("--no-format")
        .arg("--")
        .arg("-DFEATURE=1")
        .arg("-Iinclude")
        .assert()
        .success()
        .stdout("void f() {\n  int __fuzzfix0 = FEATURE;\nif (__fuzzfix0) g();\n}\n");
}

#[test]
fn test_config_discovered_next_to_input() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("src");
    fs::create_dir(&nested).unwrap();
    fs::write(
        temp_dir.path().join(".fuzzfixrc.json"),
        r#"{
  // comments are allowed
  "rewrite": { "tempPrefix": "cfg_", "tempType": "long" },
}"#,
    )
    .unwrap();
    let input = nested.join("main.c");
    fs::write(&input, IF_SOURCE).unwrap();

    cli()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("long cfg_0 = x + 5 > 1;"));

    // Command-line prefix wins over the file
    cli()
        .arg(&input)
        .arg("--prefix")
        .arg("cli_")
        .assert()
        .success()
        .stdout(predicate::str::contains("long cli_0 = x + 5 > 1;"));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(&temp_dir, "main.c", IF_SOURCE);
    let config = write_source(
        &temp_dir,
        "custom.toml",
        "[rewrite]\ntempPrefix = \"1bad\"\n",
    );

    cli()
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_emit_diff() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(&temp_dir, "main.c", IF_SOURCE);

    cli()
        .arg(&input)
        .arg("--emit")
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("--- "))
        .stdout(predicate::str::contains("+  int __fuzzfix0 = x + 5 > 1;"))
        .stdout(predicate::str::contains("-  if (x + 5 > 1)"));
}

#[test]
fn test_emit_changes_json() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(
        &temp_dir,
        "loop.c",
        "int main(int y) {\n  while (y <= 2) return 0;\n}\n",
    );

    cli()
        .arg(&input)
        .arg("--emit")
        .arg("changes")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"site\": \"while-single\""))
        .stdout(predicate::str::contains("\"tempName\": \"__fuzzfix0\""));
}

#[test]
fn test_no_macro_conditions_flag() {
    let temp_dir = TempDir::new().unwrap();
    let source = "#define gtzero(x) ((x) > 0)\nint f(int c) {\n  if gtzero(c)\n    return 1;\n  return 0;\n}\n";
    let input = write_source(&temp_dir, "macro.c", source);

    cli()
        .arg(&input)
        .arg("--no-macro-conditions")
        .assert()
        .success()
        .stdout(source)
        .stderr(predicate::str::contains("Successfully applied 0 changes!"));
}

#[test]
fn test_crlf_input_keeps_crlf() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(&temp_dir, "dos.c", &IF_SOURCE.replace('\n', "\r\n"));
    let expected = IF_FORMATTED.replace('\n', "\r\n");

    cli()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::diff(expected));

    cli()
        .arg(&input)
        .arg("--no-format")
        .assert()
        .success()
        .stdout("int main(int x) {\r\n  int __fuzzfix0 = x + 5 > 1;\r\nif (__fuzzfix0) { return -1; } else { return 0; }\r\n}\r\n");
}

#[test]
fn test_unknown_rule_in_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(&temp_dir, "main.c", IF_SOURCE);
    let config = write_source(
        &temp_dir,
        "custom.json",
        r#"{ "rewrite": { "rules": { "while-singel": false } } }"#,
    );

    cli()
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unknown rule 'while-singel'"));
}

#[test]
fn test_generate_completion() {
    cli()
        .arg("--generate-completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("fuzzfix"));
}
