//! Skyknit CLI: the `skyknit` command.

mod cli;
mod commands;
mod config;
mod logging;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let config = support::load_config_or_exit(cli.config.as_deref());
    logging::init(config.log.filter.as_deref());

    match cli.command {
        Commands::Check {
            bundle,
            data_dir,
            json,
        } => commands::check::run(bundle, data_dir, &config, json),

        Commands::Simulate { ir, json } => commands::simulate::run(ir, json),

        Commands::ValidateManifest {
            manifest,
            data_dir,
            json,
        } => commands::validate_manifest::run(manifest, data_dir, &config, json),

        Commands::Registry { data_dir, json } => commands::registry::run(data_dir, &config, json),

        Commands::SelectCount {
            length_mm,
            spi,
            rpi,
            stitch_repeat,
            hard_constraint,
            tolerance_mm,
            ease,
            precision,
            json,
        } => commands::select_count::run(
            commands::select_count::Args {
                length_mm,
                spi,
                rpi,
                stitch_repeat,
                hard_constraints: hard_constraint,
                tolerance_mm,
                ease,
                precision,
                json,
            },
            &config,
        ),

        Commands::Shaping {
            delta,
            rows,
            stitches_per_action,
            json,
        } => commands::shaping::run(delta, rows, stitches_per_action, json),

        Commands::Tolerance {
            spi,
            rpi,
            ease,
            precision,
            json,
        } => commands::tolerance::run(spi, rpi, ease, precision, &config, json),
    }
}
