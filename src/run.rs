// src/run.rs

use anyhow::{Context, Result};
use std::{fs::File, io, path::Path};
use tracing::{error, info, warn};

use crate::{
    config::Config,
    payload::{self, build_payload},
    submit::Submitter,
    table,
};

/// One import run: read the table, build the payload, then either write it
/// out (`dry_run`) or submit it once. Returns whether the run succeeded.
///
/// A table that cannot be read ends the run before any connection is made.
pub fn run(config: &Config, dry_run: bool, output: Option<&Path>) -> Result<bool> {
    // ─── 1) read the table ───────────────────────────────────────────
    let table = match table::read_table(&config.file, config.sheet.as_deref()) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "reading input failed; nothing sent");
            println!("Error reading {}: {}", config.file.display(), e);
            return Ok(false);
        }
    };

    // ─── 2) build payload ────────────────────────────────────────────
    let payload = build_payload(&table, &config.import_target());
    if payload.data_values.is_empty() {
        warn!("no non-empty cells found; payload has no data values");
    }
    info!(values = payload.data_values.len(), "payload built");

    // ─── 3) dry run: write payload and stop ──────────────────────────
    if dry_run {
        match output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("creating {}", path.display()))?;
                payload::write_json(&payload, file)
                    .with_context(|| format!("writing payload to {}", path.display()))?;
                info!(path = %path.display(), "payload written");
            }
            None => payload::write_json(&payload, io::stdout().lock())
                .context("writing payload to stdout")?,
        }
        return Ok(true);
    }

    // ─── 4) submit once ──────────────────────────────────────────────
    let server = config.server()?;
    let submitter = Submitter::new(
        &server.url,
        server.username.as_str(),
        server.password.as_str(),
        server.timeout,
    )
    .context("creating HTTP client")?;

    let sent = submitter.submit(&payload);
    if sent {
        println!("Aggregate data successfully sent to DHIS2!");
    } else {
        println!(
            "Error sending data to DHIS2 at {}; see the log for the server response",
            submitter.endpoint()
        );
    }
    Ok(sent)
}
