use crate::config_manager::Config;
use crate::logger;
use crate::ManifestArgs;
use anyhow::Context;
use packconf_manifest::{ManifestDescriptor, ScanOptions};

/// Print what can be learned from the manifest without running it
pub fn handle_scan(args: &ManifestArgs, config: &Config) -> anyhow::Result<()> {
    let descriptor = ManifestDescriptor::read(&args.manifest, &ScanOptions::from(config))?;
    logger::debug(&format!(
        "Found {} declared libraries in {}",
        descriptor.declared_library_names.len(),
        args.manifest.display()
    ));
    let json = serde_json::to_string_pretty(&descriptor).context("Failed to format descriptor")?;
    println!("{}", json);
    Ok(())
}
