//! packconf library - expose the command layer for testing

pub mod commands;
pub mod common;

pub use common::{GlobalOpts, ManifestArgs};
pub use packconf_config as config_manager;
pub use packconf_logger as logger;
