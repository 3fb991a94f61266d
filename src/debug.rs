//! Logging bridge for tabdeck
//!
//! Routes every `log::info!()`/`log::warn!()`/... call made by the engine
//! and by view providers to one sink: stderr by default, or
//! `<temp dir>/tabdeck_debug.log` when `TABDECK_LOG_FILE` is set.
//!
//! Level precedence: the level passed to [`init_log_bridge`] (CLI
//! `--log-level`), then the `TABDECK_LOG` environment variable, then the
//! config file (applied with [`set_level`] once config has loaded).

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tabdeck_config::LogLevel;

/// Environment variable holding a level name (`off` .. `trace`)
pub const LOG_LEVEL_ENV: &str = "TABDECK_LOG";
/// When set, log lines go to the debug log file instead of stderr
pub const LOG_FILE_ENV: &str = "TABDECK_LOG_FILE";

enum Sink {
    Stderr,
    File(std::fs::File),
}

struct DebugLogger {
    sink: Mutex<Sink>,
}

impl DebugLogger {
    fn new() -> Self {
        let sink = if std::env::var_os(LOG_FILE_ENV).is_some() {
            match OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(log_file_path())
            {
                Ok(mut file) => {
                    let _ = writeln!(
                        file,
                        "{}\ntabdeck debug session started at {}\n{}",
                        "=".repeat(80),
                        get_timestamp(),
                        "=".repeat(80)
                    );
                    Sink::File(file)
                }
                Err(_) => Sink::Stderr,
            }
        } else {
            Sink::Stderr
        };
        Self {
            sink: Mutex::new(sink),
        }
    }

    fn write_line(&self, line: &str) {
        let mut sink = self.sink.lock();
        match &mut *sink {
            Sink::Stderr => {
                let _ = writeln!(std::io::stderr(), "{line}");
            }
            Sink::File(file) => {
                let _ = writeln!(file, "{line}");
                let _ = file.flush();
            }
        }
    }
}

impl Log for DebugLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_line(&format!(
            "[{}] [{:<5}] [{}] {}",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {
        if let Sink::File(file) = &mut *self.sink.lock() {
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<DebugLogger> = OnceLock::new();
static CLI_OVERRIDE: OnceLock<bool> = OnceLock::new();

/// Path of the debug log file used when `TABDECK_LOG_FILE` is set
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("tabdeck_debug.log")
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Level named by `TABDECK_LOG`, if it is set to a known level
fn env_level() -> Option<LogLevel> {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|value| LogLevel::parse(&value))
}

/// Install the logger. Safe to call more than once; later calls only adjust
/// the level.
///
/// `cli_level` is the explicit `--log-level` flag. Without it the level comes
/// from `TABDECK_LOG`, falling back to `info` until [`set_level`] applies the
/// config file's choice.
pub fn init_log_bridge(cli_level: Option<LogLevel>) {
    let logger = LOGGER.get_or_init(DebugLogger::new);
    if log::set_logger(logger).is_err() {
        log::debug!("Log bridge already installed");
    }
    let _ = CLI_OVERRIDE.set(cli_level.is_some());

    let level = cli_level.or_else(env_level).unwrap_or_default();
    log::set_max_level(level.to_level_filter());
}

/// Apply the config file's level unless the CLI or `TABDECK_LOG` chose one
pub fn set_level(config_level: LogLevel) {
    let cli_chose = CLI_OVERRIDE.get().copied().unwrap_or(false);
    if cli_chose || env_level().is_some() {
        return;
    }
    log::set_max_level(config_level.to_level_filter());
}
