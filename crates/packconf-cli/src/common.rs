//! Common types shared by the commands

use clap::{Args, Parser};
use packconf_eval::DEFAULT_MANIFEST;
use packconf_logger::Verbosity;
use std::path::PathBuf;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Effective verbosity; `debug_env` is whether `DEBUG` is set
    pub fn verbosity(&self, debug_env: bool) -> Verbosity {
        Verbosity::resolve(self.quiet, self.verbose, debug_env)
    }
}

/// Selects the manifest a command works on
#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Path to the package manifest
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,
}

impl Default for ManifestArgs {
    fn default() -> Self {
        ManifestArgs {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
        }
    }
}
