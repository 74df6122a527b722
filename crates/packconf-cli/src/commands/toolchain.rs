use crate::config_manager::Config;
use crate::ManifestArgs;
use colored::*;
use packconf_eval::ToolchainLocator;
use packconf_manifest::{ManifestDescriptor, ScanOptions};

/// Print the compiler and manifest-support library a manifest would be run with
pub fn handle_toolchain(args: &ManifestArgs, config: &Config) -> anyhow::Result<()> {
    // Without a manifest the latest installed support library is reported.
    let tools_version = if args.manifest.exists() {
        ManifestDescriptor::read(&args.manifest, &ScanOptions::from(config))?.tools_version
    } else {
        None
    };

    let toolchain = ToolchainLocator::new(config).locate(tools_version)?;

    println!("{}", "Toolchain:".bold().green());
    println!("  {}: {}", "compiler".cyan(), toolchain.compiler.display());
    println!("  {}: {}", "support-dir".cyan(), toolchain.support_dir.display());
    println!("  {}: {}", "version-dir".cyan(), toolchain.version_dir.display());
    if let Some(version) = toolchain.tools_version {
        println!("  {}: {}", "tools-version".cyan(), version);
    }
    println!("  {}: {}", "flags".cyan(), toolchain.manifest_flags().join(" "));
    Ok(())
}
