//! Command-line interface for tabdeck.
//!
//! The binary registers no view providers. It inspects and maintains the
//! files the engine's host reads at startup: the config file and the saved
//! session. Provider state inside a session is printed, never interpreted.

use crate::session::SessionRecord;
use crate::session::storage;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabdeck_config::{Config, LogLevel};

/// tabdeck - inspect tab engine configuration and saved sessions
#[derive(Parser)]
#[command(name = "tabdeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (off, error, warn, info, debug, trace); overrides TABDECK_LOG and the config file
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    /// Use this config file instead of ~/.config/tabdeck/config.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or remove the saved session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// List the tabs of a saved session
    Show {
        /// Session file (default: the config's session file)
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Also print each tab's provider state as JSON
        #[arg(long)]
        state: bool,
    },
    /// Delete a saved session
    Clear {
        /// Session file (default: the config's session file)
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as YAML
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the config and session file locations
    Path,
}

fn parse_log_level(value: &str) -> std::result::Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| {
        let names: Vec<&str> = LogLevel::all().iter().map(|l| l.display_name()).collect();
        format!("unknown log level '{}' (expected one of: {})", value, names.join(", "))
    })
}

impl Cli {
    /// Config file this invocation reads and writes
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::config_path)
    }

    fn load_config(&self) -> Result<Config> {
        Config::load_from(&self.config_path())
    }
}

/// Run the parsed command line. Returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let config = cli.load_config()?;
    crate::debug::set_level(config.log_level);

    match &cli.command {
        Some(Commands::Session { action }) => match action {
            SessionAction::Show { file, state } => {
                let path = file.clone().unwrap_or_else(|| config.session_path());
                show_session(&path, *state)
            }
            SessionAction::Clear { file } => {
                let path = file.clone().unwrap_or_else(|| config.session_path());
                if storage::clear_session_at(&path)? {
                    println!("Removed {}", path.display());
                } else {
                    println!("No saved session at {}", path.display());
                }
                Ok(0)
            }
        },
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => {
                let yaml = serde_yaml_ng::to_string(&config).context("Failed to serialize config")?;
                print!("{yaml}");
                Ok(0)
            }
            ConfigAction::Init { force } => init_config(&cli.config_path(), *force),
            ConfigAction::Path => {
                println!("config:  {}", cli.config_path().display());
                println!("session: {}", config.session_path().display());
                Ok(0)
            }
        },
        None => {
            let path = config.session_path();
            println!("config:  {}", cli.config_path().display());
            match storage::load_session_from(&path)? {
                Some(record) => println!(
                    "session: {} ({} tabs, saved {})",
                    path.display(),
                    record.tabs.len(),
                    record.saved_at
                ),
                None => println!("session: none"),
            }
            println!(
                "restore on startup: {}",
                if config.session.restore_on_startup { "yes" } else { "no" }
            );
            Ok(0)
        }
    }
}

fn show_session(path: &Path, with_state: bool) -> Result<i32> {
    let Some(record) = storage::load_session_from(path)? else {
        println!("No saved session at {}", path.display());
        return Ok(1);
    };

    println!("Session file: {}", path.display());
    print!("{}", describe_session(&record, with_state)?);
    Ok(0)
}

/// Human-readable listing of a session record
pub fn describe_session(record: &SessionRecord, with_state: bool) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("Saved at: {}\n", record.saved_at));
    out.push_str(&format!("Format version: {}\n", record.version));
    out.push_str(&format!("Tabs: {}\n", record.tabs.len()));

    for (index, entry) in record.tabs.iter().enumerate() {
        let marker = if record.selected_index == Some(index) {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!("  {} {:>2}  {}", marker, index, entry.mode));
        if !entry.monitors.is_empty() {
            let names: Vec<&str> = entry.monitors.keys().map(String::as_str).collect();
            out.push_str(&format!("  [monitors: {}]", names.join(", ")));
        }
        out.push('\n');
        if with_state {
            let state = serde_json::to_string(&entry.state)
                .with_context(|| format!("Failed to render state of entry {}", index))?;
            out.push_str(&format!("        {}\n", state));
        }
    }
    Ok(out)
}

fn init_config(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        println!(
            "Config file {} already exists (use --force to overwrite)",
            path.display()
        );
        return Ok(1);
    }
    Config::default().save_to(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(0)
}
