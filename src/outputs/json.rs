//! JSON dump of the run's extracted records.
//!
//! The playlist is the artifact players consume; this file is for the
//! operator. When a page layout shifts and the playlist starts looking
//! wrong, `<basename>_records.json` shows exactly what the extractor
//! recovered, before any playlist formatting.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

use crate::models::EventRecord;

/// Write the deduplicated records as pretty JSON to
/// `<output_dir>/<basename>_records.json`. An empty run still writes an
/// empty array, so "no events today" is distinguishable from "never ran".
#[instrument(level = "info", skip_all, fields(%basename))]
pub async fn write_records(
    records: &[EventRecord],
    output_dir: &Path,
    basename: &str,
) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(output_dir).await?;

    let path = output_dir.join(format!("{basename}_records.json"));
    let json = serde_json::to_string_pretty(records)?;
    fs::write(&path, json).await?;

    info!(path = %path.display(), count = records.len(), "Wrote record dump");
    Ok(path)
}
