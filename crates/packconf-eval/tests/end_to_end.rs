//! End-to-end loading with a runner standing in for the compiler

use packconf_config::platform::shared_library_file_name;
use packconf_config::Config;
use packconf_eval::{
    EvalError, EvaluationOptions, HandoffMode, Invocation, LoadError, Loader, ProcessOutcome,
    ProcessRunner,
};
use packconf_logger::Verbosity;
use packconf_value::{AliasRegistry, Aliased, HandoffError, HANDOFF_ENV};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MANIFEST: &str = r#"// swift-tools-version:4.2
import PackageDescription
import PackageConfig

let package = Package(
    name: "Example",
    dependencies: []
)

let PackageConfigs = [
    "ExampleConfig", // lint settings
]

let config = PackageConfig([
    "example": ExampleConfiguration(value: "example configuration value"),
])
config.write()
"#;

const DOCUMENT: &str = r#"{"example": {"alias": "ExampleConfiguration", "payload": {"value": "example configuration value"}}}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ExampleConfiguration {
    value: String,
}

impl Aliased for ExampleConfiguration {
    const ALIAS: &'static str = "ExampleConfiguration";
}

/// Plays the manifest: writes `document` to the announced handoff path
struct ManifestRunner {
    document: Option<&'static str>,
    exit_code: i32,
    invocations: Vec<Invocation>,
}

impl ManifestRunner {
    fn writing(document: &'static str) -> Self {
        ManifestRunner {
            document: Some(document),
            exit_code: 0,
            invocations: Vec::new(),
        }
    }
}

impl ProcessRunner for ManifestRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ProcessOutcome, EvalError> {
        self.invocations.push(invocation.clone());
        if let Some(document) = self.document {
            if let Some((_, path)) = invocation.env.iter().find(|(key, _)| key == HANDOFF_ENV) {
                // a relative path is seen from the directory the compiler runs in
                let path = match &invocation.current_dir {
                    Some(dir) => dir.join(path),
                    None => PathBuf::from(path),
                };
                let written = path
                    .parent()
                    .map_or(Ok(()), fs::create_dir_all)
                    .and_then(|()| fs::write(&path, document));
                written.map_err(|source| EvalError::Spawn {
                    program: invocation.program.clone(),
                    source,
                })?;
            }
        }
        Ok(ProcessOutcome {
            status: Some(self.exit_code),
            success: self.exit_code == 0,
            stdout: Vec::new(),
            stderr: if self.exit_code == 0 {
                Vec::new()
            } else {
                b"error: manifest crashed".to_vec()
            },
        })
    }
}

struct Fixture {
    _temp_dir: TempDir,
    manifest: PathBuf,
    handoff_dir: PathBuf,
    compiler: PathBuf,
}

fn touch(path: &Path) -> Option<()> {
    fs::create_dir_all(path.parent()?).ok()?;
    fs::write(path, b"").ok()
}

fn fixture(build_libraries: bool) -> Option<Fixture> {
    fixture_in(TempDir::new().ok()?, build_libraries)
}

fn fixture_in(temp_dir: TempDir, build_libraries: bool) -> Option<Fixture> {
    let root = temp_dir.path();

    let compiler = root.join("toolchain/usr/bin/swiftc");
    touch(&compiler)?;
    fs::create_dir_all(root.join("toolchain/usr/lib/swift/pm/4_2")).ok()?;

    let package = root.join("package");
    fs::create_dir_all(&package).ok()?;
    let manifest = package.join("Package.swift");
    fs::write(&manifest, MANIFEST).ok()?;

    if build_libraries {
        let debug = package.join(".build/debug");
        touch(&debug.join(shared_library_file_name("ExampleConfig")))?;
        touch(&debug.join(shared_library_file_name("PackageConfig")))?;
    }

    let handoff_dir = root.join("handoff");
    Some(Fixture {
        manifest,
        handoff_dir,
        compiler,
        _temp_dir: temp_dir,
    })
}

fn options(fixture: &Fixture) -> EvaluationOptions {
    EvaluationOptions {
        manifest_path: fixture.manifest.clone(),
        verbosity: Verbosity::Quiet,
        config: Config {
            compiler_path: Some(fixture.compiler.display().to_string()),
            handoff_dir: Some(fixture.handoff_dir.display().to_string()),
            ..Config::default()
        },
        handoff: HandoffMode::Session,
        optional: false,
    }
}

fn registry() -> AliasRegistry {
    let mut registry = AliasRegistry::new();
    assert!(registry.register::<ExampleConfiguration>().is_ok());
    registry
}

#[test]
fn test_load_example_configuration() {
    let Some(fixture) = fixture(true) else {
        return;
    };
    let mut loader = Loader::with_runner(options(&fixture), ManifestRunner::writing(DOCUMENT));

    let loaded = loader.load::<ExampleConfiguration>("example", &registry());
    assert!(loaded.is_ok(), "load failed: {:?}", loaded.as_ref().err());
    assert_eq!(
        loaded.ok().flatten(),
        Some(ExampleConfiguration {
            value: "example configuration value".to_string()
        })
    );

    let invocations = &loader.runner().invocations;
    assert_eq!(invocations.len(), 1);
    let args = &invocations[0].args;
    assert_eq!(args[0], "--driver-mode=swift");
    assert!(args.iter().any(|a| a == "-lExampleConfig"));
    assert!(args.iter().any(|a| a == "-lPackageConfig"));
    assert!(args.iter().any(|a| a == "-lPackageDescription"));
    let manifest = fs::canonicalize(&fixture.manifest).map(|p| p.display().to_string());
    assert_eq!(args.last(), manifest.ok().as_ref());

    // the per-session handoff file is gone once read
    let leftovers = fs::read_dir(&fixture.handoff_dir).map(|entries| entries.count());
    assert!(leftovers.is_ok_and(|n| n == 0));
}

#[test]
fn test_relative_manifest_path() {
    // a fixture below the test's working directory, addressed relatively
    let Ok(temp_dir) = TempDir::new_in(".") else {
        return;
    };
    let Some(fixture) = fixture_in(temp_dir, true) else {
        return;
    };
    assert!(fixture.manifest.is_relative());
    assert!(fixture.handoff_dir.is_relative());

    let mut loader = Loader::with_runner(options(&fixture), ManifestRunner::writing(DOCUMENT));
    let loaded = loader.load::<ExampleConfiguration>("example", &registry());
    assert!(loaded.is_ok(), "load failed: {:?}", loaded.as_ref().err());

    let invocation = &loader.runner().invocations[0];
    let current_dir = invocation.current_dir.clone().unwrap_or_default();
    assert!(current_dir.is_absolute());

    let manifest = invocation.args.last().map(PathBuf::from).unwrap_or_default();
    assert!(manifest.is_absolute());
    assert!(current_dir.join(&manifest).is_file());

    for pair in invocation.args.windows(2) {
        if pair[0] == "-L" || pair[0] == "-I" {
            assert!(Path::new(&pair[1]).is_absolute(), "relative search dir {}", pair[1]);
        }
    }
    for (key, value) in &invocation.env {
        if key == HANDOFF_ENV {
            assert!(Path::new(value).is_absolute());
        }
    }
}

#[test]
fn test_missing_artifact_fails_before_spawning() {
    let Some(fixture) = fixture(false) else {
        return;
    };
    let mut options = options(&fixture);
    // not even a compiler is needed to report a missing build
    options.config.compiler_path = Some("/nonexistent/bin/swiftc".to_string());
    let mut loader = Loader::with_runner(options, ManifestRunner::writing(DOCUMENT));

    let result = loader.load::<ExampleConfiguration>("example", &registry());
    assert!(matches!(
        result,
        Err(LoadError::Eval(EvalError::ArtifactNotFound { ref name, .. })) if name == "ExampleConfig"
    ));
    assert!(loader.runner().invocations.is_empty());
}

#[test]
fn test_nonzero_exit_is_evaluation_failed() {
    let Some(fixture) = fixture(true) else {
        return;
    };
    let runner = ManifestRunner {
        document: None,
        exit_code: 1,
        invocations: Vec::new(),
    };
    let mut loader = Loader::with_runner(options(&fixture), runner);
    assert!(matches!(
        loader.load_untyped(),
        Err(LoadError::Eval(EvalError::EvaluationFailed { status: Some(1), .. }))
    ));
}

#[test]
fn test_silent_manifest_is_handoff_missing() {
    let Some(fixture) = fixture(true) else {
        return;
    };
    let runner = ManifestRunner {
        document: None,
        exit_code: 0,
        invocations: Vec::new(),
    };
    let mut loader = Loader::with_runner(options(&fixture), runner);
    assert!(matches!(
        loader.load_untyped(),
        Err(LoadError::Handoff(HandoffError::HandoffMissing(_)))
    ));
}

#[test]
fn test_silent_manifest_in_optional_mode() {
    let Some(fixture) = fixture(true) else {
        return;
    };
    let mut options = options(&fixture);
    options.optional = true;
    let runner = ManifestRunner {
        document: None,
        exit_code: 0,
        invocations: Vec::new(),
    };
    let mut loader = Loader::with_runner(options, runner);
    assert!(loader
        .load::<ExampleConfiguration>("example", &registry())
        .is_ok_and(|c| c.is_none()));
}

#[test]
fn test_untyped_document() {
    let Some(fixture) = fixture(true) else {
        return;
    };
    let mut options = options(&fixture);
    options.handoff = HandoffMode::Fixed;
    let mut loader = Loader::with_runner(options, ManifestRunner::writing(r#"{"key": "value"}"#));

    let config = loader.load_untyped();
    assert!(config.is_ok_and(|c| c.get_str("key") == Some("value")));
    // the fixed slot is left in place
    assert!(fixture.handoff_dir.join("package-config.json").is_file());
}

#[test]
fn test_unregistered_alias() {
    let Some(fixture) = fixture(true) else {
        return;
    };
    let mut loader = Loader::with_runner(options(&fixture), ManifestRunner::writing(DOCUMENT));
    let result = loader.load_package_config(&AliasRegistry::new());
    assert!(matches!(
        result,
        Err(LoadError::Codec(packconf_value::CodecError::UnregisteredAlias(ref alias)))
            if alias == "ExampleConfiguration"
    ));
}
