use anyhow::Context;
use clap::{Parser, Subcommand};
use packconf::{
    commands::{
        config::{self, ConfigAction},
        load::{self, LoadCommand},
        scan, toolchain,
    },
    config_manager, logger, GlobalOpts, ManifestArgs,
};
use packconf_eval::LoadError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "packconf")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Package manifest configuration loader",
    long_about = "packconf runs a package manifest and reads the configuration it hands off to tools."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the manifest and print its configuration as JSON
    Load(LoadCommand),
    /// Print the libraries and version a manifest declares, without running it
    Scan {
        #[command(flatten)]
        manifest: ManifestArgs,
    },
    /// Show the compiler and manifest-support library that would be used
    Toolchain {
        #[command(flatten)]
        manifest: ManifestArgs,
    },
    /// Configure packconf
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn init_tracing(verbosity: logger::Verbosity) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity.filter_directive().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_config() -> anyhow::Result<config_manager::Config> {
    config_manager::Config::load().context("Failed to load config")
}

fn report(error: &anyhow::Error) {
    logger::error(&format!("{:#}", error));
    let hint = error
        .downcast_ref::<LoadError>()
        .and_then(LoadError::hint)
        .or_else(|| {
            error
                .downcast_ref::<packconf_eval::EvalError>()
                .and_then(packconf_eval::EvalError::hint)
        });
    if let Some(hint) = hint {
        logger::hint(&hint);
    }
    if logger::get_verbosity().is_verbose() {
        logger::show_log_path();
    }
}

fn main() {
    let cli = Cli::parse();

    let debug_env = std::env::var_os("DEBUG").is_some();
    let verbosity = cli.global.verbosity(debug_env);
    if let Err(e) = logger::init(verbosity) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(verbosity);

    let result = match cli.command {
        Commands::Config { action } => config::handle_config(action, &cli.global),
        Commands::Load(cmd) => load_config().and_then(|cfg| load::handle_load(cmd, cfg, verbosity)),
        Commands::Scan { manifest } => {
            load_config().and_then(|cfg| scan::handle_scan(&manifest, &cfg))
        }
        Commands::Toolchain { manifest } => {
            load_config().and_then(|cfg| toolchain::handle_toolchain(&manifest, &cfg))
        }
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}
