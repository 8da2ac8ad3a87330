//! Recall CLI: inspect and maintain a memoization cache directory.
//!
//! Provides `recall init` to create the cache root, `recall list` and
//! `recall show` to inspect entries, `recall verify` to find corrupt
//! entries, and `recall path` to locate the file behind a key.

#![warn(missing_docs)]

mod init;
mod list;
mod path;
mod show;
mod verify;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use recall_cache::CacheStore;
use recall_config::{load_config, load_config_file, CONFIG_FILE_NAME, DEFAULT_CACHE_ROOT};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "RECALL_LOG";

/// Disk-backed memoization cache tool.
#[derive(Parser, Debug)]
#[command(name = "recall", version, about = "Recall memoization cache tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `recall.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Cache root directory. Overrides the configuration file.
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the cache root directory.
    Init,
    /// List cache entries.
    List(ListArgs),
    /// Decode one entry and print it as JSON.
    Show {
        /// Cache key (the file name without extension).
        key: String,
    },
    /// Decode every entry and report corrupt ones.
    Verify,
    /// Print the entry path for a key.
    Path {
        /// Cache key.
        key: String,
    },
}

/// Arguments for the `recall list` subcommand.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Listing output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// Optional cache root override.
    pub root: Option<String>,
}

impl GlobalArgs {
    /// Resolves the cache root: `--root`, then the config file, then the default.
    ///
    /// Without `--config`, a `recall.toml` in the working directory is used
    /// when present.
    pub fn cache_root(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        if let Some(root) = &self.root {
            return Ok(PathBuf::from(root));
        }

        let config = match &self.config {
            Some(path) => Some(load_config_file(&PathBuf::from(path))?),
            None => {
                let cwd = std::env::current_dir()?;
                if cwd.join(CONFIG_FILE_NAME).is_file() {
                    Some(load_config(&cwd)?)
                } else {
                    None
                }
            }
        };

        let root = config
            .and_then(|c| c.cache_root)
            .unwrap_or_else(|| DEFAULT_CACHE_ROOT.to_string());
        tracing::debug!(root = %root, "resolved cache root");
        Ok(PathBuf::from(root))
    }

    /// Opens the store at the resolved root, which must already exist.
    pub fn open_store(&self) -> Result<CacheStore, Box<dyn std::error::Error>> {
        let root = self.cache_root()?;
        if !root.is_dir() {
            return Err(format!(
                "cache root '{}' does not exist (run `recall init`)",
                root.display()
            )
            .into());
        }
        Ok(CacheStore::open(root)?)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
        root: cli.root,
    };

    let result = match cli.command {
        Command::Init => init::run(&global),
        Command::List(ref args) => list::run(args, &global),
        Command::Show { ref key } => show::run(key, &global),
        Command::Verify => verify::run(&global),
        Command::Path { ref key } => path::run(key, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RECALL_LOG` wins when set; otherwise the level follows the flags.
fn init_logging(quiet: bool, verbose: bool) {
    let fallback = default_log_level(quiet, verbose);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn default_log_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_init() {
        let cli = Cli::parse_from(["recall", "init"]);
        assert!(matches!(cli.command, Command::Init));
        assert!(cli.root.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_list_default() {
        let cli = Cli::parse_from(["recall", "list"]);
        match cli.command {
            Command::List(ref args) => assert_eq!(args.format, ReportFormat::Text),
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn parse_list_json() {
        let cli = Cli::parse_from(["recall", "list", "--format", "json"]);
        match cli.command {
            Command::List(ref args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn parse_show_key() {
        let cli = Cli::parse_from(["recall", "show", "f_x_2_y_3_a1b2c3"]);
        match cli.command {
            Command::Show { key } => assert_eq!(key, "f_x_2_y_3_a1b2c3"),
            _ => panic!("expected Show command"),
        }
    }

    #[test]
    fn parse_path_key() {
        let cli = Cli::parse_from(["recall", "path", "abc"]);
        match cli.command {
            Command::Path { key } => assert_eq!(key, "abc"),
            _ => panic!("expected Path command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["recall", "--quiet", "--root", "/tmp/cache", "verify"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.root.as_deref(), Some("/tmp/cache"));
        assert!(matches!(cli.command, Command::Verify));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["recall", "list", "--verbose", "--config", "my.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("my.toml"));
    }

    #[test]
    fn log_level_follows_flags() {
        assert_eq!(default_log_level(false, false), "warn");
        assert_eq!(default_log_level(false, true), "debug");
        assert_eq!(default_log_level(true, true), "error");
    }

    #[test]
    fn root_flag_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("recall.toml");
        std::fs::write(&config, "[cache]\nroot = \"/from/config\"\n").unwrap();
        let global = GlobalArgs {
            quiet: false,
            config: Some(config.to_string_lossy().into_owned()),
            root: Some("/from/flag".to_string()),
        };
        assert_eq!(global.cache_root().unwrap(), PathBuf::from("/from/flag"));
    }

    #[test]
    fn config_root_used_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("custom.toml");
        std::fs::write(&config, "[cache]\nroot = \"/from/config\"\n").unwrap();
        let global = GlobalArgs {
            quiet: false,
            config: Some(config.to_string_lossy().into_owned()),
            root: None,
        };
        assert_eq!(global.cache_root().unwrap(), PathBuf::from("/from/config"));
    }

    #[test]
    fn config_without_root_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("custom.toml");
        std::fs::write(&config, "[memo]\ncompress = false\n").unwrap();
        let global = GlobalArgs {
            quiet: false,
            config: Some(config.to_string_lossy().into_owned()),
            root: None,
        };
        assert_eq!(global.cache_root().unwrap(), PathBuf::from(DEFAULT_CACHE_ROOT));
    }

    #[test]
    fn missing_config_file_is_error() {
        let global = GlobalArgs {
            quiet: false,
            config: Some("/nonexistent/recall.toml".to_string()),
            root: None,
        };
        assert!(global.cache_root().is_err());
    }

    #[test]
    fn open_store_requires_existing_root() {
        let dir = tempfile::tempdir().unwrap();
        let global = test_support::global_at(&dir.path().join("missing"));
        let err = global.open_store().unwrap_err();
        assert!(err.to_string().contains("recall init"));
    }
}
