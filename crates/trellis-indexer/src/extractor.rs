//! Wiki-link extraction
//!
//! Pure text → targets; no I/O, safe to run from any worker thread.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use trellis_core::NoteId;

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("link pattern is valid"))
}

/// Extract the normalized link targets referenced by a note body.
///
/// Handles `[[target]]` and `[[target|displayed alias]]`; only the target
/// side is taken. No length filtering happens here; that belongs to
/// consumers.
pub fn extract_links(body: &str) -> BTreeSet<NoteId> {
    link_pattern()
        .captures_iter(body)
        .filter_map(|cap| {
            let raw = cap.get(1)?.as_str();
            let target = match raw.split_once('|') {
                Some((target, _alias)) => target,
                None => raw,
            };
            let id = NoteId::from_link_target(target);
            (!id.is_empty()).then_some(id)
        })
        .collect()
}
