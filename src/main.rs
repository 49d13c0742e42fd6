//! Binary entry point: parses [`cholla_core::cli::Cli`], resolves the
//! parameter source (a built-in preset or a file), builds a
//! [`cholla_core::app::Simulation`], and runs it to completion.
//!
//! Grounded in a prior `main.rs` shape (parse args, build an `App`, run
//! it, exit non-zero with a logged message on failure), generalized from
//! `clap::Clap::parse()` to `clap::Parser::parse()` and from `log`/`env_logger`
//! to `tracing`/`tracing-subscriber`, matching `cli.rs`'s `log_level` flag.

use clap::Parser;
use cholla_core::app::Simulation;
use cholla_core::cli::Cli;

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(log_level).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(err) = run(&cli) {
        tracing::error!(%err, "fatal error, aborting run");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut simulation = Simulation::from_source(&cli.parameter_source, &cli.overrides, cli.strict)?;
    simulation.run()?;
    Ok(())
}
