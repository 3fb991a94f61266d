use clap::Parser;
use tabdeck::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();

    // CLI --log-level takes precedence, then TABDECK_LOG, then config (applied in cli::run).
    tabdeck::debug::init_log_bridge(cli.log_level);
    log::debug!("Starting tabdeck {}", tabdeck::VERSION);

    match cli::run(cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("tabdeck: error: {e:#}");
            std::process::exit(1);
        }
    }
}
