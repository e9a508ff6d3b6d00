//! Error taxonomy for the scrape pipeline.
//!
//! Two failures are fatal for a source: every mirror was exhausted
//! ([`ScrapeError::AllMirrorsFailed`]), or the fetched document lacks the
//! structural anchor the extractor needs ([`ScrapeError::AnchorMissing`]).
//! Everything softer than that — a mirror timing out, a row missing a
//! date — is handled in place and never surfaces here.

use thiserror::Error;

/// A fatal error while processing one source.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Every configured mirror for a resource failed.
    ///
    /// Individual mirror failures are logged as they happen; this carries
    /// the last one for the error chain.
    #[error("no mirror for `{resource}` returned a usable document ({attempts} attempted)")]
    AllMirrorsFailed {
        resource: String,
        attempts: usize,
        #[source]
        last: Option<MirrorFailure>,
    },

    /// The document parsed, but the expected structural anchor is absent.
    #[error("structural anchor `{selector}` not found in document for `{resource}`")]
    AnchorMissing { resource: String, selector: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a single mirror attempt was skipped.
#[derive(Debug, Error)]
pub enum MirrorFailure {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("response body was empty")]
    EmptyBody,
}
