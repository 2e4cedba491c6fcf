//! `ds8r`: drive a Digitimer DS8R through the vendor `DS8R_API` executable.
//!
//! ```bash
//! # one trigger at 2.4 mA, 200 µs
//! ds8r trigger --demand 24 --pulse-width 200
//!
//! # a ladder of levels from a session file
//! ds8r sequence --session levels.json
//!
//! # print what would be sent without touching the device
//! ds8r check --session levels.json
//! ```

mod cli;
mod commands;
mod logging;
#[cfg(test)]
mod tests;

use anyhow::Context;
use ds8r_metrics::TriggerMetrics;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map(|name| logging::parse_level(name))
        .unwrap_or(tracing::Level::INFO);
    logging::init(level)?;
    info!("ds8r v{}", env!("CARGO_PKG_VERSION"));

    let metrics = TriggerMetrics::new().context("failed to register metrics")?;
    let result = commands::dispatch(&matches, &metrics);

    if matches.get_flag("metrics") {
        print!("{}", metrics.render()?);
    }
    result
}
