mod bootstrap;

use anyhow::Result;
use snapshot_core::clients::AllowedClients;
use snapshot_core::report::TracingReporter;
use snapshot_core::settings::{Command, Settings};
use snapshot_data::builder::build_snapshot;
use snapshot_data::merger::clean_snapshot;

fn main() -> Result<()> {
    let settings = Settings::load();
    settings.validate()?;

    bootstrap::setup_logging(&settings)?;

    tracing::info!("tweet-snapshot v{} starting", env!("CARGO_PKG_VERSION"));

    let mut reporter = TracingReporter::new();
    let totals = match &settings.command {
        Command::Build(args) => {
            tracing::info!(
                "building snapshot {} to {} (from tweepy: {})",
                args.from_date,
                args.to_date,
                args.from_tweepy
            );
            build_snapshot(args, &mut reporter)?
        }
        Command::Clean(args) => {
            tracing::info!("cleaning snapshot {} to {}", args.from_date, args.to_date);
            let clients = AllowedClients::default_set();
            clean_snapshot(args, &clients, &mut reporter)?
        }
    };

    tracing::info!(
        "done: {} files treated, {} failed, {} lines read, {} records written, {} lines skipped",
        totals.units_processed,
        totals.units_failed,
        totals.lines_read,
        totals.records_written,
        totals.unparseable
    );

    Ok(())
}
