//! Main entry point for Cli

#![deny(warnings, missing_docs, trivial_casts, unused_qualifications)]
#![forbid(unsafe_code)]

use axelarnet::cli::command::AxelarnetCli;
use axelarnet::config::load_config;
use axelarnet::run;
use clap::Parser;
use tracing::metadata::LevelFilter;

fn main() {
    let cli = AxelarnetCli::parse();
    let cfg = load_config(cli.config.clone()).unwrap();

    let log_level = if cli.quiet {
        LevelFilter::OFF
    } else if cli.verbose {
        LevelFilter::TRACE
    } else {
        cfg.global.log_level.clone().into()
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    match run(&cli.command, &cfg) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}
