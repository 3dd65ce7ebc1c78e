//! Applies per-venue decisions to the generated text.
//!
//! Works on the byte spans recorded by the extractor rather than on repeated
//! find-and-replace, so a venue whose name is a substring of another one
//! ("Sé" inside "Catedral da Sé") is never touched by mistake.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::decision::Decision;
use crate::services::venue_extractor::{CandidateVenue, VenueExtractor};

/// Marker that precedes the link target in an annotation.
const LINK_PREFIX: &str = " [📍](";

pub fn link_annotation(map_url: &str) -> String {
    format!("{}{})", LINK_PREFIX, map_url)
}

/// Rewrites `text` using one decision per candidate name.
///
/// Rejected venues take their whole line with them. Accepted venues get a
/// link after their first surviving occurrence, unless some occurrence is
/// already linked, which is what makes a second pass a no-op. Names with no
/// decision are left alone.
pub fn rewrite(text: &str, decisions: &HashMap<String, Decision>) -> String {
    let candidates = VenueExtractor::new().extract(text);
    rewrite_candidates(text, &candidates, decisions)
}

pub fn rewrite_candidates(
    text: &str,
    candidates: &[CandidateVenue],
    decisions: &HashMap<String, Decision>,
) -> String {
    let line_starts = line_starts(text);
    let line_of = |offset: usize| match line_starts.binary_search(&offset) {
        Ok(line) => line,
        Err(next) => next - 1,
    };

    let mut removed_lines: BTreeSet<usize> = BTreeSet::new();
    for candidate in candidates {
        if let Some(Decision::Rejected { .. }) = decisions.get(&candidate.name) {
            removed_lines.extend(candidate.occurrences.iter().map(|o| line_of(o.span.start)));
        }
    }

    // byte offset -> annotation to insert there
    let mut insertions: HashMap<usize, String> = HashMap::new();
    let mut linked: HashSet<&str> = HashSet::new();
    for candidate in candidates {
        let Some(Decision::Accepted { map_url, .. }) = decisions.get(&candidate.name) else {
            continue;
        };
        if !linked.insert(candidate.name.as_str()) {
            continue;
        }
        if candidate
            .occurrences
            .iter()
            .any(|o| text[o.span.end..].starts_with(LINK_PREFIX))
        {
            continue;
        }
        if let Some(first) = candidate
            .occurrences
            .iter()
            .find(|o| !removed_lines.contains(&line_of(o.span.start)))
        {
            insertions.insert(first.span.end, link_annotation(map_url));
        }
    }

    let mut kept: Vec<String> = Vec::new();
    for (line_no, start) in line_starts.iter().enumerate() {
        if removed_lines.contains(&line_no) {
            continue;
        }
        let end = line_starts
            .get(line_no + 1)
            .map(|next| next - 1)
            .unwrap_or(text.len());

        let mut line = String::with_capacity(end - start);
        let mut cursor = *start;
        let mut points: Vec<&usize> = insertions
            .keys()
            .filter(|offset| **offset > *start && **offset <= end)
            .collect();
        points.sort();
        for offset in points {
            line.push_str(&text[cursor..*offset]);
            line.push_str(&insertions[offset]);
            cursor = *offset;
        }
        line.push_str(&text[cursor..end]);
        kept.push(line);
    }

    kept.join("\n")
}

/// Byte offset where each line begins; always contains at least 0.
fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}
