//! Event extraction from listing-page HTML.
//!
//! The pages this pipeline reads are not ours: layouts shift, tables gain
//! and lose columns, identifiers move between `href`s, `onclick` handlers,
//! and bare text. The extractor therefore anchors on the one stable fact —
//! a playable stream is referenced by a 40-character hex token — and climbs
//! a bounded number of ancestor containers from each occurrence to recover
//! the time, date, competition, and display name printed near it. Every
//! miss degrades to a placeholder; nothing here raises on a malformed row.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

use crate::config::ExtractConfig;
use crate::error::ScrapeError;
use crate::models::{ClockTime, DayMonth, EventRecord};
use crate::utils::clean_label;

/// Content identifiers are exactly 40 lowercase hex characters; word
/// boundaries keep a longer hex run from matching its own prefix.
static CONTENT_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9a-f]{40}\b").unwrap());

/// 24-hour clock, two-digit fields (`21:00`).
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([01]\d|2[0-3]):([0-5]\d)\b").unwrap());

/// Day-month label (`06-08`, also `06/08` and with a trailing year). Range
/// validation happens after the match; `3-2` style scorelines never match.
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-3]\d)[-/]([01]\d)(?:[-/](?:\d{2}|\d{4}))?\b").unwrap());

static HEADING_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

/// Nodes that exist to label a group of rows, as opposed to being rows.
static LABEL_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"caption, [class*="categor"], [class*="competi"], [class*="league"], [class*="sport"]"#,
    )
    .unwrap()
});

/// Competition names recognized in row text when no label node is present.
/// Ordered: multi-word names come before their substrings.
const COMPETITION_KEYWORDS: &[&str] = &[
    "Champions League",
    "Europa League",
    "Conference League",
    "Premier League",
    "Copa del Rey",
    "La Liga",
    "LaLiga",
    "Serie A",
    "Bundesliga",
    "Ligue 1",
    "Eurocopa",
    "Euroliga",
    "Liga ACB",
    "Liga",
    "Copa",
    "Mundial",
    "NBA",
    "NFL",
    "NHL",
    "MLB",
    "MotoGP",
    "Formula 1",
    "ATP",
    "WTA",
    "UFC",
    "Boxeo",
    "Tenis",
    "Baloncesto",
];

/// Extract every event record from a fetched document.
///
/// Fails only when the configured structural anchor is missing entirely —
/// a page with the anchor but no identifiers yields an empty vector, which
/// callers treat as "no events today", not an error.
#[instrument(level = "info", skip_all, fields(%resource))]
pub fn extract_events(
    resource: &str,
    html: &str,
    cfg: &ExtractConfig,
) -> Result<Vec<EventRecord>, ScrapeError> {
    let document = Html::parse_document(html);

    let anchor = Selector::parse(&cfg.anchor_selector).map_err(|e| {
        ScrapeError::Config(format!("bad anchor selector `{}`: {e}", cfg.anchor_selector))
    })?;
    if document.select(&anchor).next().is_none() {
        return Err(ScrapeError::AnchorMissing {
            resource: resource.to_string(),
            selector: cfg.anchor_selector.clone(),
        });
    }

    let mut records = Vec::new();
    for element in document.root_element().descendants().filter_map(ElementRef::wrap) {
        // Only occurrences anchored directly on this element: its own
        // attribute values and its immediate text children. Ancestor text
        // is never re-scanned, so each occurrence is counted once.
        let mut ids: Vec<&str> = Vec::new();
        for (_, value) in element.value().attrs() {
            ids.extend(CONTENT_ID_RE.find_iter(value).map(|m| m.as_str()));
        }
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                ids.extend(CONTENT_ID_RE.find_iter(text).map(|m| m.as_str()));
            }
        }

        for id in ids {
            let record = build_record(element, id.to_string(), cfg);
            debug!(
                content_id = %record.content_id,
                name = %record.name,
                time = %record.time_label(),
                "Extracted event"
            );
            records.push(record);
        }
    }

    info!(count = records.len(), "Extraction complete");
    Ok(records)
}

/// Assemble one record by climbing from the occurrence's anchor element.
fn build_record(anchor: ElementRef<'_>, content_id: String, cfg: &ExtractConfig) -> EventRecord {
    let ancestors: Vec<ElementRef<'_>> = anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(cfg.max_ancestor_depth)
        .collect();

    let time = find_time(&ancestors);
    let date = find_date(&ancestors);
    let category = find_category(&ancestors, cfg);
    let name = find_name(anchor, &ancestors, &category, cfg);

    EventRecord {
        date,
        time,
        category,
        name,
        content_id,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

/// Nearest enclosing text with a clock label.
fn find_time(ancestors: &[ElementRef<'_>]) -> Option<ClockTime> {
    for ancestor in ancestors {
        let text = element_text(*ancestor);
        for caps in TIME_RE.captures_iter(&text) {
            let (Ok(hour), Ok(minute)) = (caps[1].parse::<u8>(), caps[2].parse::<u8>()) else {
                continue;
            };
            return Some(ClockTime { hour, minute });
        }
    }
    None
}

/// Nearest enclosing text with a day-month label. No match means the date
/// stays unknown; it is never defaulted to the current day.
fn find_date(ancestors: &[ElementRef<'_>]) -> Option<DayMonth> {
    for ancestor in ancestors {
        let text = element_text(*ancestor);
        for caps in DATE_RE.captures_iter(&text) {
            let (Ok(day), Ok(month)) = (caps[1].parse::<u8>(), caps[2].parse::<u8>()) else {
                continue;
            };
            if (1..=31).contains(&day) && (1..=12).contains(&month) {
                return Some(DayMonth { month, day });
            }
        }
    }
    None
}

/// Dedicated label nodes win over competition keywords in row text; the
/// configured default is the last resort.
fn find_category(ancestors: &[ElementRef<'_>], cfg: &ExtractConfig) -> String {
    for ancestor in ancestors {
        for label in ancestor.select(&LABEL_SEL) {
            let text = clean_label(&element_text(label));
            if !text.is_empty() && text.len() <= 80 {
                return text;
            }
        }
    }
    for ancestor in ancestors {
        let text = element_text(*ancestor);
        for keyword in COMPETITION_KEYWORDS {
            if text.contains(keyword) {
                return (*keyword).to_string();
            }
        }
    }
    cfg.default_category.clone()
}

/// Display name: nearest heading above the match, else the longest
/// qualifying ancestor text once identifiers, time/date tokens, the
/// category, and the anchor's own label (the channel link text) are
/// stripped out.
fn find_name(
    anchor: ElementRef<'_>,
    ancestors: &[ElementRef<'_>],
    category: &str,
    cfg: &ExtractConfig,
) -> String {
    for ancestor in ancestors {
        if let Some(heading) = ancestor.select(&HEADING_SEL).next() {
            let text = clean_label(&element_text(heading));
            if text.len() >= cfg.name_min_len && text.len() <= cfg.name_max_len {
                return text;
            }
        }
    }

    let anchor_label = clean_label(&CONTENT_ID_RE.replace_all(&element_text(anchor), ""));
    let mut best: Option<String> = None;
    for ancestor in ancestors {
        let mut text = clean_label(&element_text(*ancestor));
        text = CONTENT_ID_RE.replace_all(&text, "").into_owned();
        text = TIME_RE.replace_all(&text, "").into_owned();
        text = DATE_RE.replace_all(&text, "").into_owned();
        if !anchor_label.is_empty() {
            text = text.replace(&anchor_label, "");
        }
        if !category.is_empty() {
            text = text.replace(category, "");
        }
        let text = clean_label(&text);
        if text.len() >= cfg.name_min_len && text.len() <= cfg.name_max_len {
            let longer = best.as_ref().is_none_or(|b| text.len() > b.len());
            if longer {
                best = Some(text);
            }
        }
    }
    best.unwrap_or_else(|| cfg.default_name.clone())
}
