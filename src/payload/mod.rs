pub mod build;
pub mod types;

pub use build::{build_payload, build_payload_on, ImportTarget, DEFAULT_CATEGORY_OPTION_COMBO};
pub use types::{DataValue, SubmissionPayload};

use std::io::Write;

/// Write the payload as pretty-printed JSON with a trailing newline.
pub fn write_json<W: Write>(payload: &SubmissionPayload, mut out: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut out, payload)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
