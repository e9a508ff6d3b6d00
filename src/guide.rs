//! EPG guide channel index.
//!
//! The playlist header points players at an XMLTV guide. This module keeps
//! a local index of the channel ids that guide defines: `channels.txt`
//! holds the current set, and when a previous index exists the ids that
//! were not in it are written to `channels_new.txt` — the operator's cue
//! that the guide grew and the channel mapping may need attention. A run
//! with no new ids leaves no `channels_new.txt` behind.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashSet;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::fetch::Fetcher;

/// Summary of one guide update pass.
#[derive(Debug, PartialEq, Eq)]
pub struct GuideOutcome {
    pub total: usize,
    pub new: usize,
}

/// Fetch the guide XML (same horizontal fallback as the listing pages) and
/// refresh the channel index files under `output_dir`.
#[instrument(level = "info", skip_all)]
pub async fn update_channel_index(
    fetcher: &Fetcher,
    guide_urls: &[String],
    output_dir: &Path,
) -> Result<GuideOutcome, Box<dyn Error>> {
    let xml = fetcher.fetch_first("guide", guide_urls).await?;
    let ids = extract_channel_ids(&xml)?;
    if ids.is_empty() {
        warn!("Guide contained no channel definitions");
    }
    let outcome = write_channel_index(&ids, output_dir).await?;
    info!(total = outcome.total, new = outcome.new, "Channel index updated");
    Ok(outcome)
}

/// Pull every `<channel id="...">` out of an XMLTV document, in document
/// order, first occurrence wins. `<programme channel="...">` references do
/// not count — only definitions.
fn extract_channel_ids(xml: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() == b"channel" {
                    if let Some(attr) = e.try_get_attribute("id")? {
                        let id = attr.unescape_value()?.into_owned();
                        if !id.is_empty() && seen.insert(id.clone()) {
                            ids.push(id);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(ids)
}

/// Write `channels.txt` and the `channels_new.txt` diff against whatever
/// `channels.txt` held before this call.
async fn write_channel_index(
    ids: &[String],
    output_dir: &Path,
) -> Result<GuideOutcome, std::io::Error> {
    fs::create_dir_all(output_dir).await?;
    let index_path = output_dir.join("channels.txt");
    let new_path = output_dir.join("channels_new.txt");

    let previous: HashSet<String> = match fs::read_to_string(&index_path).await {
        Ok(text) => text.lines().map(str::to_string).collect(),
        Err(_) => HashSet::new(),
    };

    let mut index = ids.join("\n");
    index.push('\n');
    fs::write(&index_path, index).await?;

    // stale diff from the previous run must not linger
    if fs::try_exists(&new_path).await? {
        fs::remove_file(&new_path).await?;
    }

    let new_ids: Vec<&String> = ids.iter().filter(|id| !previous.contains(*id)).collect();
    if !previous.is_empty() && !new_ids.is_empty() {
        let mut diff = new_ids
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        diff.push('\n');
        fs::write(&new_path, diff).await?;
    }

    Ok(GuideOutcome {
        total: ids.len(),
        new: if previous.is_empty() { 0 } else { new_ids.len() },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GUIDE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tv generator-info-name="test">
  <channel id="La1.TV"><display-name>La 1</display-name></channel>
  <channel id="La2.TV"/>
  <channel id="La1.TV"><display-name>duplicate</display-name></channel>
  <programme channel="La1.TV" start="20260806210000 +0200"><title>Partido</title></programme>
</tv>"#;

    fn fresh_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ace_events_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_extract_channel_ids_dedupes_in_order() {
        let ids = extract_channel_ids(GUIDE_XML).unwrap();
        assert_eq!(ids, vec!["La1.TV".to_string(), "La2.TV".to_string()]);
    }

    #[test]
    fn test_programme_references_do_not_count() {
        let xml = r#"<tv><programme channel="Ghost.TV"/></tv>"#;
        assert!(extract_channel_ids(xml).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_index_has_no_diff_file() {
        let dir = fresh_dir("guide_first");
        let ids = vec!["La1.TV".to_string(), "La2.TV".to_string()];

        let outcome = write_channel_index(&ids, &dir).await.unwrap();

        assert_eq!(outcome, GuideOutcome { total: 2, new: 0 });
        assert_eq!(
            std::fs::read_to_string(dir.join("channels.txt")).unwrap(),
            "La1.TV\nLa2.TV\n"
        );
        assert!(!dir.join("channels_new.txt").exists());
    }

    #[tokio::test]
    async fn test_new_channels_diffed_against_previous() {
        let dir = fresh_dir("guide_diff");
        let first = vec!["La1.TV".to_string()];
        let second = vec!["La1.TV".to_string(), "La2.TV".to_string()];

        write_channel_index(&first, &dir).await.unwrap();
        let outcome = write_channel_index(&second, &dir).await.unwrap();

        assert_eq!(outcome, GuideOutcome { total: 2, new: 1 });
        assert_eq!(
            std::fs::read_to_string(dir.join("channels_new.txt")).unwrap(),
            "La2.TV\n"
        );
    }

    #[tokio::test]
    async fn test_stale_diff_removed_when_nothing_new() {
        let dir = fresh_dir("guide_stale");
        let ids = vec!["La1.TV".to_string()];

        write_channel_index(&ids, &dir).await.unwrap();
        std::fs::write(dir.join("channels_new.txt"), "stale\n").unwrap();
        write_channel_index(&ids, &dir).await.unwrap();

        assert!(!dir.join("channels_new.txt").exists());
    }
}
