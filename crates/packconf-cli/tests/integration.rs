//! Integration tests for packconf

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn packconf_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("packconf");
    cmd.env("PACKCONF_CONFIG", fixture("packconf.toml"));
    cmd.env_remove("DEBUG");
    cmd
}

#[test]
fn test_version() {
    packconf_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("packconf"));
}

#[test]
fn test_help() {
    packconf_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Package manifest configuration loader"));
}

#[test]
fn test_invalid_command() {
    packconf_cmd().arg("invalid").assert().failure();
}

#[test]
fn test_scan_prints_declared_libraries() {
    packconf_cmd()
        .args(["scan", "--manifest"])
        .arg(fixture("Package.swift"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ExampleConfig\""))
        .stdout(predicate::str::contains("\"LintConfig\""))
        .stdout(predicate::str::contains("RetiredConfig").not())
        .stdout(predicate::str::contains("\"major\": 4"));
}

#[test]
fn test_scan_uses_configured_marker() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let config_path = temp_dir.path().join("packconf.toml");
    let manifest = temp_dir.path().join("Package.swift");
    let written = fs::write(&config_path, "declaration-marker = \"ToolConfigs\"\n").and_then(|()| {
        fs::write(
            &manifest,
            "let ToolConfigs = [\n    \"CustomConfig\",\n]\n// ToolConfigs are linked when the tool runs\n",
        )
    });
    if written.is_err() {
        return;
    }

    packconf_cmd()
        .env("PACKCONF_CONFIG", &config_path)
        .args(["scan", "--manifest"])
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"CustomConfig\""));
}

#[test]
fn test_scan_unclosed_list_fails() {
    packconf_cmd()
        .args(["scan", "--manifest"])
        .arg(fixture("Unclosed.swift"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("PackageConfigs"));
}

#[test]
fn test_load_without_build_fails_with_hint() {
    packconf_cmd()
        .args(["load", "example", "--manifest"])
        .arg(fixture("Package.swift"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Could not find libExampleConfig to link against",
        ))
        .stderr(predicate::str::contains("swift build --target ExampleConfig"));
}

#[test]
fn test_toolchain_with_missing_compiler() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let config_path = temp_dir.path().join("packconf.toml");
    if fs::write(&config_path, "compiler-path = \"/nonexistent/bin/swiftc\"\n").is_err() {
        return;
    }

    packconf_cmd()
        .env("PACKCONF_CONFIG", &config_path)
        .args(["toolchain", "--manifest"])
        .arg(fixture("Package.swift"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not find the compiler"));
}

#[test]
fn test_config_show() {
    packconf_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:"))
        .stdout(predicate::str::contains("build-dirs: .build/debug,.build/release"));
}

#[test]
fn test_config_set_then_show() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let config_path = temp_dir.path().join("packconf.toml");

    packconf_cmd()
        .env("PACKCONF_CONFIG", &config_path)
        .args(["config", "set", "compiler-name", "swiftc-5"])
        .assert()
        .success();

    packconf_cmd()
        .env("PACKCONF_CONFIG", &config_path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("compiler-name: swiftc-5"));
}

#[test]
fn test_config_set_unknown_key() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    packconf_cmd()
        .env("PACKCONF_CONFIG", temp_dir.path().join("packconf.toml"))
        .args(["config", "set", "no-such-key", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_config_path() {
    packconf_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("packconf.toml"));
}
