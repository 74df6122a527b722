//! Console and log-file output for the packconf CLI
//!
//! Every message is appended to `~/.config/packconf/packconf.log`; what reaches
//! the console depends on the [`Verbosity`] handed to [`init`]. The verbosity is
//! decided once by the binary and never read from the environment here.

use colored::Colorize;
use indicatif::ProgressBar;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
static VERBOSITY: Mutex<Verbosity> = Mutex::new(Verbosity::Normal);
static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// How chatty the console should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors and warnings only
    Quiet,
    /// Errors, warnings and user-facing results
    #[default]
    Normal,
    /// Diagnostic output (`--verbose` or `DEBUG`)
    Verbose,
    /// Everything, down to trace-level events (`-vv`)
    Trace,
}

impl Verbosity {
    /// Combine the CLI flags with the `DEBUG` switch.
    ///
    /// `--verbose` and `DEBUG` are OR'd together; `--quiet` wins over both.
    pub fn resolve(quiet: bool, verbose: u8, debug_env: bool) -> Self {
        if quiet {
            return Verbosity::Quiet;
        }
        match (verbose, debug_env) {
            (0, false) => Verbosity::Normal,
            (0, true) | (1, _) => Verbosity::Verbose,
            _ => Verbosity::Trace,
        }
    }

    pub fn is_verbose(self) -> bool {
        self >= Verbosity::Verbose
    }

    /// Default `tracing` filter directive for this level
    pub fn filter_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "debug",
            Verbosity::Trace => "trace",
        }
    }
}

/// Get the current verbosity level
pub fn get_verbosity() -> Verbosity {
    VERBOSITY.lock().ok().map(|v| *v).unwrap_or_default()
}

/// Initialize the logger with a verbosity level and the default log file
pub fn init(verbosity: Verbosity) -> Result<(), String> {
    let config_dir = get_config_dir()?;
    init_with_log_dir(verbosity, &config_dir)
}

/// Initialize the logger writing its log file into `log_dir`
pub fn init_with_log_dir(verbosity: Verbosity, log_dir: &std::path::Path) -> Result<(), String> {
    if let Ok(mut v) = VERBOSITY.lock() {
        *v = verbosity;
    }

    fs::create_dir_all(log_dir).map_err(|e| format!("Failed to create log directory: {}", e))?;

    let log_file = log_dir.join("packconf.log");

    // Truncate log file on each run (overwrite instead of append)
    if log_file.exists() {
        let _ = fs::remove_file(&log_file);
    }

    let mut log_file_guard = LOG_FILE
        .lock()
        .map_err(|_| "Log file lock poisoned".to_string())?;
    *log_file_guard = Some(log_file);

    Ok(())
}

/// Get the config directory path
fn get_config_dir() -> Result<PathBuf, String> {
    #[cfg(not(target_os = "windows"))]
    let config_dir = dirs::home_dir()
        .ok_or("Could not determine home directory")?
        .join(".config")
        .join("packconf");

    #[cfg(target_os = "windows")]
    let config_dir = dirs::config_dir()
        .ok_or("Could not determine config directory")?
        .join("packconf");

    Ok(config_dir)
}

fn write_to_log(message: &str) {
    if let Ok(log_file_guard) = LOG_FILE.lock() {
        if let Some(ref log_path) = *log_file_guard {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "[{}] {}", timestamp, message);
            }
        }
    }
}

/// Log an informational message (to console if verbose, always to file)
pub fn info(message: &str) {
    write_to_log(&format!("INFO {}", message));
    if get_verbosity().is_verbose() {
        eprintln!("{}", message);
    }
}

/// Log a debug message (to console if verbose, always to file)
pub fn debug(message: &str) {
    write_to_log(&format!("DEBUG {}", message));
    if get_verbosity().is_verbose() {
        eprintln!("{} {}", "DEBUG:".blue().bold(), message);
    }
}

/// Log a warning message (to both file and console)
pub fn warn(message: &str) {
    write_to_log(&format!("WARN {}", message));
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

/// Log an error message (to both file and console)
pub fn error(message: &str) {
    write_to_log(&format!("ERROR {}", message));
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Print a remedial hint under an error
pub fn hint(message: &str) {
    write_to_log(&format!("HINT {}", message));
    eprintln!("  {} {}", "hint:".cyan().bold(), message);
}

/// Log a success message (to console unless quiet)
pub fn success(message: &str) {
    write_to_log(&format!("SUCCESS {}", message));
    if get_verbosity() > Verbosity::Quiet {
        eprintln!("{} {}", "\u{2714}".green().bold(), message);
    }
}

/// Record captured subprocess output in the log file
pub fn capture_output(command_name: &str, status: Option<i32>, stdout: &[u8], stderr: &[u8]) {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);

    write_to_log(&format!(
        "COMMAND: {} (exit code: {:?})",
        command_name, status
    ));

    if !stdout.is_empty() {
        write_to_log(&format!("  STDOUT:\n{}", stdout));
    }

    if !stderr.is_empty() {
        write_to_log(&format!("  STDERR:\n{}", stderr));
    }
}

/// Get the log file path for display
pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|guard| guard.clone())
}

/// Print the log file path to the user
pub fn show_log_path() {
    if let Some(path) = get_log_path() {
        eprintln!("Log file: {}", path.display());
    } else if let Ok(config_dir) = get_config_dir() {
        eprintln!("Log file: {}", config_dir.join("packconf.log").display());
    } else {
        eprintln!("Log file location not available");
    }
}

/// Start a spinner with the given message (only at normal verbosity)
pub fn spinner_start(message: &str) {
    if get_verbosity() != Verbosity::Normal {
        return;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message.to_string());

    if let Ok(mut spinner_guard) = SPINNER.lock() {
        *spinner_guard = Some(spinner);
    }
}

/// Stop the spinner without any message
pub fn spinner_stop() {
    if let Ok(mut spinner_guard) = SPINNER.lock() {
        if let Some(spinner) = spinner_guard.take() {
            spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_flags_or_debug_env() {
        assert_eq!(Verbosity::resolve(false, 0, false), Verbosity::Normal);
        assert_eq!(Verbosity::resolve(false, 1, false), Verbosity::Verbose);
        assert_eq!(Verbosity::resolve(false, 0, true), Verbosity::Verbose);
        assert_eq!(Verbosity::resolve(false, 1, true), Verbosity::Verbose);
        assert_eq!(Verbosity::resolve(false, 2, false), Verbosity::Trace);
    }

    #[test]
    fn test_quiet_wins() {
        assert_eq!(Verbosity::resolve(true, 2, true), Verbosity::Quiet);
        assert!(!Verbosity::Quiet.is_verbose());
    }

    #[test]
    fn test_log_file_written() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        assert!(init_with_log_dir(Verbosity::Quiet, temp_dir.path()).is_ok());
        debug("evaluating manifest");
        capture_output("swiftc", Some(1), b"", b"boom");

        let content = fs::read_to_string(temp_dir.path().join("packconf.log")).unwrap_or_default();
        assert!(content.contains("DEBUG evaluating manifest"));
        assert!(content.contains("STDERR:\nboom"));
    }
}
