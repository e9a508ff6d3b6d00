//! Output rendering and persistence.
//!
//! # Submodules
//!
//! - [`playlist`]: Renders deduplicated records into M3U playlist text
//! - [`history`]: Writes output files with change detection and capped,
//!   timestamped history snapshots
//! - [`json`]: Dumps the run's extracted records as JSON for inspection
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── events.m3u
//! ├── events_records.json
//! └── history/
//!     ├── events_20260806_090000.m3u
//!     └── events_20260806_210000.m3u
//! ```

pub mod history;
pub mod json;
pub mod playlist;
