//! Text cleanup helpers for scraped labels.
//!
//! Listing pages decorate event rows with emoji, stray commas, and
//! arbitrary whitespace. Everything that ends up in a playlist field goes
//! through [`clean_label`] first so the output stays stable across cosmetic
//! page changes.

/// Normalize a scraped label for use in playlist fields.
///
/// - Collapses all whitespace runs (including newlines) to single spaces
///   and trims the ends.
/// - Strips emoji and pictographic characters.
/// - Replaces `,` with `.` — the `#EXTINF` display segment is
///   comma-delimited and the format has no escape syntax.
/// - Strips `"` — attribute values are double-quoted.
pub fn clean_label(s: &str) -> String {
    let stripped: String = s
        .chars()
        .filter(|c| !is_emoji(*c))
        .map(|c| match c {
            ',' => '.',
            c => c,
        })
        .filter(|c| *c != '"')
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip double quotes only. For values that are already clean but must
/// still be safe inside a quoted attribute.
pub fn strip_quotes(s: &str) -> String {
    s.replace('"', "")
}

/// Emoji and pictographic ranges seen on the listing pages: emoticons,
/// symbols and pictographs, transport, flags, supplemental symbols.
fn is_emoji(c: char) -> bool {
    matches!(c,
        '\u{1F300}'..='\u{1F5FF}'
        | '\u{1F600}'..='\u{1F64F}'
        | '\u{1F680}'..='\u{1F6FF}'
        | '\u{1F900}'..='\u{1F9FF}'
        | '\u{1FA70}'..='\u{1FAFF}'
        | '\u{1F1E6}'..='\u{1F1FF}'
        | '\u{2600}'..='\u{27BF}'
        | '\u{FE0F}'
    )
}
