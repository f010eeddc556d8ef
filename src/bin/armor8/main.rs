//! armor8 - terminal front panel for the ARMor8 synth
//!
//! Run with: cargo run -- [preset file]

mod app;
mod ui;

use std::fs::File;

use armor8::Armor8Config;
use color_eyre::eyre::WrapErr;

use app::Armor8;

const LOG_FILE: &str = "armor8.log";

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // The terminal belongs to the TUI, so logs go to a file.
    let log_file = File::create(LOG_FILE).wrap_err_with(|| format!("failed to create {}", LOG_FILE))?;
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let mut config = Armor8Config::new();
    if let Some(path) = std::env::args().nth(1) {
        config = config.preset_path(path);
    }

    Armor8::new(config).run()
}
