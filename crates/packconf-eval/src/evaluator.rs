//! Running the manifest as a program
//!
//! The manifest is handed to the compiler in interpreter mode with the
//! manifest-support library and every configuration library on its search
//! and link paths. Whatever configuration it produces arrives through the
//! handoff file named in [`HANDOFF_ENV`].

use crate::errors::EvalError;
use crate::locator::Toolchain;
use crate::resolver::LibraryArtifact;
use packconf_logger::{self as logger, Verbosity};
use packconf_value::{HandoffChannel, HANDOFF_ENV};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// One subprocess to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, OsString)>,
    pub current_dir: Option<PathBuf>,
    /// Capture stdout/stderr instead of inheriting them
    pub capture: bool,
}

impl Invocation {
    /// The command line as a single string, for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a subprocess ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code; `None` when terminated by a signal
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl From<Output> for ProcessOutcome {
    fn from(output: Output) -> Self {
        ProcessOutcome {
            status: output.status.code(),
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Runs subprocesses to completion
pub trait ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ProcessOutcome, EvalError>;
}

/// Runs subprocesses with [`std::process::Command`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ProcessOutcome, EvalError> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        for (key, value) in &invocation.env {
            command.env(key, value);
        }
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        let spawn_error = |source| EvalError::Spawn {
            program: invocation.program.clone(),
            source,
        };

        if invocation.capture {
            let output = command
                .stdin(Stdio::null())
                .output()
                .map_err(spawn_error)?;
            Ok(ProcessOutcome::from(output))
        } else {
            let status = command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(spawn_error)?;
            Ok(ProcessOutcome {
                status: status.code(),
                success: status.success(),
                ..ProcessOutcome::default()
            })
        }
    }
}

/// Compiler arguments for evaluating `manifest`.
///
/// The manifest-support flags come first, then one search/link triple per
/// artifact, and the manifest path last.
pub fn build_arguments(
    toolchain: &Toolchain,
    artifacts: &[LibraryArtifact],
    manifest: &Path,
) -> Vec<String> {
    let mut args = vec!["--driver-mode=swift".to_string()];
    args.extend(toolchain.manifest_flags());
    for artifact in artifacts {
        args.extend(artifact.link_arguments());
    }
    args.push("-suppress-warnings".to_string());
    args.push(manifest.display().to_string());
    args
}

pub struct Evaluator<R: ProcessRunner> {
    runner: R,
    verbosity: Verbosity,
}

impl<R: ProcessRunner> Evaluator<R> {
    pub fn new(runner: R, verbosity: Verbosity) -> Self {
        Evaluator { runner, verbosity }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Build the invocation without running it
    pub fn invocation(
        &self,
        toolchain: &Toolchain,
        artifacts: &[LibraryArtifact],
        manifest: &Path,
        channel: &HandoffChannel,
    ) -> Invocation {
        Invocation {
            program: toolchain.compiler.clone(),
            args: build_arguments(toolchain, artifacts, manifest),
            env: vec![(
                HANDOFF_ENV.to_string(),
                channel.path().as_os_str().to_os_string(),
            )],
            current_dir: manifest
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf),
            capture: !self.verbosity.is_verbose(),
        }
    }

    /// Run the manifest and wait for it to exit.
    ///
    /// A nonzero exit is [`EvalError::EvaluationFailed`] carrying the captured
    /// stderr (empty when output was inherited).
    pub fn evaluate(
        &mut self,
        toolchain: &Toolchain,
        artifacts: &[LibraryArtifact],
        manifest: &Path,
        channel: &HandoffChannel,
    ) -> Result<ProcessOutcome, EvalError> {
        let invocation = self.invocation(toolchain, artifacts, manifest, channel);
        let command_line = invocation.command_line();
        logger::debug(&format!("CMD: {}", command_line));

        let outcome = self.runner.run(&invocation)?;
        logger::capture_output(&command_line, outcome.status, &outcome.stdout, &outcome.stderr);

        if !outcome.success {
            return Err(EvalError::EvaluationFailed {
                status: outcome.status,
                stderr: String::from_utf8_lossy(&outcome.stderr).into_owned(),
            });
        }
        Ok(outcome)
    }
}
