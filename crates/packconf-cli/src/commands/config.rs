use crate::config_manager::Config;
use crate::logger;
use crate::GlobalOpts;
use anyhow::Context;
use clap::Subcommand;
use colored::*;
use std::fs;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Set a configuration key (`build-dirs` takes a comma-separated list)
    Set { key: String, value: String },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, the CLI will use the config at that path from now on.
    /// If omitted, the CLI will print the current configuration file path.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> anyhow::Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show(opts),
        ConfigAction::Set { key, value } => {
            let mut config = Config::load().context("Failed to load config")?;
            config.set(&key, value.clone())?;
            config.save().context("Failed to save config")?;
            logger::success(&format!("Set {} = {}", key, value));
            Ok(())
        }
        ConfigAction::Path { new_path } => path(new_path),
    }
}

fn show(opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;
    println!("{}", "Configuration:".bold().green());
    if config.is_empty() {
        if opts.verbose > 0 {
            println!("  {}", "(empty)".yellow());
        }
    } else {
        for (key, value) in config.values_iter() {
            println!("  {}: {}", key.cyan(), value);
        }
    }
    Ok(())
}

fn path(new_path: Option<String>) -> anyhow::Result<()> {
    let config_path = Config::path();
    logger::debug(&format!("Reading config from: {}", config_path.display()));
    let pointer_path = Config::pointer_path();

    match new_path {
        Some(p) => {
            if let Some(parent) = pointer_path.parent() {
                fs::create_dir_all(parent).context("Failed to set config path")?;
            }
            fs::write(&pointer_path, p.as_bytes()).context("Failed to set config path")?;
            logger::success(&format!("Config path set to {}", p));
        }
        None => {
            println!("{}", config_path.display());
            if let Ok(contents) = fs::read_to_string(&pointer_path) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    println!("{} {}", "overridden-by".cyan(), trimmed);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut config = Config::default();
        assert!(config.set("no-such-key", "x".to_string()).is_err());
        assert!(config.set("compiler-name", "swiftc".to_string()).is_ok());
    }

    #[test]
    fn test_config_action_default_is_show() {
        let action: Option<ConfigAction> = None;
        assert!(matches!(
            action.unwrap_or(ConfigAction::Show),
            ConfigAction::Show
        ));
    }
}
