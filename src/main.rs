use anyhow::{Context, Result};
use clap::Parser;
use dhis2push::{
    config::{Cli, Config},
    run::run,
};
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    // ─── 2) resolve settings ─────────────────────────────────────────
    let cli = Cli::parse();
    let config = Config::load(&cli).context("loading configuration")?;
    info!(
        url = config.server.as_ref().map(|s| s.url.as_str()).unwrap_or("-"),
        file = %config.file.display(),
        org_unit = %config.org_unit,
        period = %config.period,
        data_set = %config.data_set,
        dry_run = cli.dry_run,
        "startup"
    );

    // ─── 3) read, build, then write or submit ────────────────────────
    // read and submission failures are reported but do not change the exit code
    let ok = run(&config, cli.dry_run, cli.output.as_deref())?;
    info!(ok, "finished");
    Ok(())
}
