//! End-to-end tests for the `ossfuzz-kit project-info` command.

mod common;
use common::prelude::*;

#[test]
fn test_project_info_default_projection() {
    let fixture = TestFixture::new().with_project("libpng", projects::LIBPNG);

    fixture
        .command()
        .arg("project-info")
        .arg("libpng")
        .arg("--no-fallback")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Details for project: libpng\n\nname: libpng\nlanguage: c++\n",
        ))
        .stdout(predicate::str::contains("build_system: -"))
        .stdout(predicate::str::contains("fuzzing_engines: libfuzzer, afl"))
        .stdout(predicate::str::contains("sanitizers: address, memory, undefined"))
        .stdout(predicate::str::contains("architectures: []"))
        .stdout(predicate::str::contains(
            "repo: https://github.com/pnggroup/libpng.git",
        ))
        .stdout(predicate::str::contains("vendor_ccs: -"));
}

#[test]
fn test_project_info_raw() {
    let fixture = TestFixture::new().with_project("zlib", projects::ZLIB);

    fixture
        .command()
        .arg("project-info")
        .arg("zlib")
        .arg("--raw")
        .arg("--no-fallback")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "name: zlib\nlanguage: c\nbuild: make\ncustom_field: 7\n",
        ))
        .stdout(predicate::str::contains("build_system").not());
}

#[test]
fn test_project_info_json() {
    let fixture = TestFixture::new().with_project("zlib", projects::ZLIB);

    let output = fixture
        .command()
        .arg("project-info")
        .arg("zlib")
        .arg("--json")
        .arg("--no-fallback")
        .output()
        .unwrap();

    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["name"], "zlib");
    assert_eq!(info["build_system"], "make");
    assert_eq!(info["sanitizers"], serde_json::json!([]));
    assert!(info["homepage"].is_null());
}

#[test]
fn test_project_info_unknown_project_suggests_similar() {
    let fixture = TestFixture::new().with_project("libpng", projects::LIBPNG);

    fixture
        .command()
        .arg("project-info")
        .arg("libpgn")
        .arg("--no-fallback")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("project.yaml for libpgn"))
        .stderr(predicate::str::contains("remote fallback disabled"))
        .stderr(predicate::str::contains("Did you mean 'libpng'?"));
}

#[test]
fn test_project_info_malformed_descriptor() {
    let fixture = TestFixture::new().with_project("broken", projects::INVALID_YAML);

    fixture
        .command()
        .arg("project-info")
        .arg("broken")
        .arg("--no-fallback")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Malformed project.yaml for broken"));
}

#[test]
fn test_project_info_rejects_path_names() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("project-info")
        .arg("../secrets")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid project name"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn test_project_info_requires_project() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("project-info")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<PROJECT>"));
}
