//! M3U playlist serialization.
//!
//! Pure text rendering: the same record sequence always produces the same
//! bytes. Records are sorted by (date, time, name, id) with unknown
//! date/time last, so successive runs over a stable page diff cleanly.
//!
//! Entry shape:
//!
//! ```text
//! #EXTINF:-1 group-title="06-08 Liga" tvg-name="21:00 Team A vs Team B",21:00 Team A vs Team B (abcdef01)
//! http://127.0.0.1:6878/ace/getstream?id=abcdef0123456789abcdef0123456789abcdef01
//! ```

use std::fmt::Write;

use crate::config::PlaylistConfig;
use crate::models::EventRecord;
use crate::utils::strip_quotes;

/// Render the full playlist text: header pair, blank line, then one
/// metadata/URL line pair per record. An empty record slice produces a
/// valid header-only playlist.
pub fn render_playlist(records: &[EventRecord], cfg: &PlaylistConfig) -> String {
    let mut sorted: Vec<&EventRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.sort_key());

    let mut out = render_header(cfg);
    for record in sorted {
        let group = strip_quotes(&format!("{} {}", record.date_label(), record.category));
        let display = strip_quotes(&format!("{} {}", record.time_label(), record.name));
        let prefix = record.id_prefix(cfg.id_prefix_len);

        writeln!(
            out,
            "#EXTINF:-1 group-title=\"{group}\" tvg-name=\"{display}\",{display} ({prefix})"
        )
        .unwrap();
        writeln!(out, "{}{}", cfg.playback_endpoint, record.content_id).unwrap();
    }
    out
}

fn render_header(cfg: &PlaylistConfig) -> String {
    format!(
        "#EXTM3U url-tvg=\"{}\" refresh=\"{}\"\n#EXTVLCOPT:network-caching={}\n\n",
        cfg.guide_urls.join(","),
        cfg.refresh_secs,
        cfg.network_caching_ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockTime, DayMonth};

    const ID: &str = "abcdef0123456789abcdef0123456789abcdef01";

    fn cfg() -> PlaylistConfig {
        PlaylistConfig::default()
    }

    fn record(name: &str) -> EventRecord {
        EventRecord {
            date: None,
            time: Some(ClockTime { hour: 21, minute: 0 }),
            category: "Liga".to_string(),
            name: name.to_string(),
            content_id: ID.to_string(),
        }
    }

    #[test]
    fn test_header_only_when_no_records() {
        let out = render_playlist(&[], &cfg());
        assert_eq!(
            out,
            "#EXTM3U url-tvg=\"https://raw.githubusercontent.com/davidmuma/EPG_dobleM/refs/heads/master/guiatv.xml\" refresh=\"3600\"\n\
             #EXTVLCOPT:network-caching=1000\n\n"
        );
    }

    #[test]
    fn test_single_record_block() {
        let out = render_playlist(&[record("Team A vs Team B")], &cfg());
        assert!(out.contains(
            "#EXTINF:-1 group-title=\"?? Liga\" tvg-name=\"21:00 Team A vs Team B\",21:00 Team A vs Team B (abcdef01)\n"
        ));
        assert!(out.contains(&format!("http://127.0.0.1:6878/ace/getstream?id={ID}\n")));
        // header pair + blank + exactly one entry pair
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn test_multiple_guide_urls_joined_with_comma() {
        let mut cfg = cfg();
        cfg.guide_urls = vec![
            "https://example.com/a.xml".to_string(),
            "https://example.com/b.xml.gz".to_string(),
        ];
        let out = render_playlist(&[], &cfg);
        assert!(out.starts_with(
            "#EXTM3U url-tvg=\"https://example.com/a.xml,https://example.com/b.xml.gz\" refresh=\"3600\"\n"
        ));
    }

    #[test]
    fn test_quotes_stripped_from_attribute_values() {
        let mut r = record(r#"El "Clasico" special"#);
        r.category = r#"La "mejor" Liga"#.to_string();
        let out = render_playlist(&[r], &cfg());
        assert!(out.contains("group-title=\"?? La mejor Liga\""));
        assert!(out.contains("tvg-name=\"21:00 El Clasico special\""));
    }

    #[test]
    fn test_sorted_by_date_time_name_with_unknowns_last() {
        let mut early = record("B match");
        early.date = Some(DayMonth { month: 8, day: 6 });
        early.time = Some(ClockTime { hour: 9, minute: 0 });

        let mut late = record("A match");
        late.date = Some(DayMonth { month: 8, day: 6 });
        late.time = Some(ClockTime { hour: 21, minute: 0 });

        let mut same_slot = record("A match");
        same_slot.date = Some(DayMonth { month: 8, day: 6 });
        same_slot.time = Some(ClockTime { hour: 9, minute: 0 });

        let undated = record("Aaa first by name but undated");

        let out = render_playlist(&[undated, late, early, same_slot], &cfg());
        let entry_lines: Vec<&str> = out
            .lines()
            .filter(|l| l.starts_with("#EXTINF"))
            .collect();
        assert_eq!(entry_lines.len(), 4);
        assert!(entry_lines[0].contains("09:00 A match"));
        assert!(entry_lines[1].contains("09:00 B match"));
        assert!(entry_lines[2].contains("21:00 A match"));
        assert!(entry_lines[3].contains("Aaa first by name but undated"));
    }

    #[test]
    fn test_extracted_row_renders_expected_block() {
        let html = format!(
            "<table><tr><td>21:00</td><td>Liga</td><td>Team A vs Team B</td>\
             <td><a href=\"acestream://{ID}\">Channel 1</a></td></tr></table>"
        );
        let records =
            crate::extract::extract_events("events", &html, &crate::config::ExtractConfig::default())
                .unwrap();
        let records = crate::models::dedup_records(records);

        let out = render_playlist(&records, &cfg());
        assert!(out.contains("group-title=\"?? Liga\""));
        assert!(out.contains(&format!("http://127.0.0.1:6878/ace/getstream?id={ID}\n")));
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let records = vec![record("Team A vs Team B"), record("Other match up")];
        let first = render_playlist(&records, &cfg());
        let second = render_playlist(&records, &cfg());
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = record("Team A vs Team B");
        let b = record("Other match up");
        let forward = render_playlist(&[a.clone(), b.clone()], &cfg());
        let reversed = render_playlist(&[b, a], &cfg());
        assert_eq!(forward, reversed);
    }
}
