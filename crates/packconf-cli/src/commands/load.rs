use crate::config_manager::Config;
use crate::logger::{self, Verbosity};
use crate::ManifestArgs;
use anyhow::{anyhow, Context};
use clap::Args;
use packconf_eval::{EvaluationOptions, HandoffMode, Loader};
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct LoadCommand {
    /// Only print the configuration stored under this name
    pub name: Option<String>,

    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Treat a manifest that writes no configuration as having none
    #[arg(long)]
    pub optional: bool,
}

/// Run the manifest and print the configuration it handed off
pub fn handle_load(cmd: LoadCommand, config: Config, verbosity: Verbosity) -> anyhow::Result<()> {
    let options = EvaluationOptions {
        manifest_path: cmd.manifest.manifest,
        verbosity,
        config,
        handoff: HandoffMode::Session,
        optional: cmd.optional,
    };

    debug!(
        "Loading configuration from {} (optional: {})",
        options.manifest_path.display(),
        options.optional
    );
    let mut loader = Loader::new(options);
    let document = loader.load_configuration::<serde_json::Value>()?;

    let output = match (document, cmd.name) {
        (None, _) => {
            logger::info("The manifest wrote no configuration");
            serde_json::Value::Null
        }
        (Some(document), None) => document,
        (Some(mut document), Some(name)) => match document.get_mut(&name).map(serde_json::Value::take) {
            Some(entry) => entry,
            None if cmd.optional => serde_json::Value::Null,
            None => return Err(anyhow!("No configuration named '{}' in the handoff document", name)),
        },
    };

    let json = serde_json::to_string_pretty(&output).context("Failed to format configuration")?;
    println!("{}", json);
    Ok(())
}
