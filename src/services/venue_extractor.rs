//! Pulls candidate venue names out of generated itinerary text.
//!
//! The model is told to wrap every real place in `**double asterisks**`, so a
//! bold span is the only signal used. Headings and labels the model bolds for
//! other reasons come through too; the acceptance filters deal with those.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// `**name**` on a single line, no nested asterisks.
fn emphasis_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("emphasis pattern is valid"))
}

/// One emphasised span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Byte range of the whole `**name**` span, markers included.
    pub span: Range<usize>,
}

/// A distinct venue name and every place it was emphasised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateVenue {
    pub name: String,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, Default)]
pub struct VenueExtractor {
    stoplist: Option<HashSet<String>>,
}

impl VenueExtractor {
    /// Keeps every emphasised span.
    pub fn new() -> Self {
        Self { stoplist: None }
    }

    /// Skips spans whose lower-cased text exactly matches a stoplist entry.
    pub fn with_stoplist(stoplist: HashSet<String>) -> Self {
        Self {
            stoplist: Some(stoplist),
        }
    }

    /// Distinct candidates in order of first appearance. Empty or broken
    /// markup just yields nothing.
    pub fn extract(&self, text: &str) -> Vec<CandidateVenue> {
        let mut candidates: Vec<CandidateVenue> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for caps in emphasis_pattern().captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            let name = inner.as_str().trim();
            if name.is_empty() || self.is_label(name) {
                continue;
            }

            let occurrence = Occurrence {
                span: whole.range(),
            };

            match index.get(name) {
                Some(&i) => candidates[i].occurrences.push(occurrence),
                None => {
                    index.insert(name.to_string(), candidates.len());
                    candidates.push(CandidateVenue {
                        name: name.to_string(),
                        occurrences: vec![occurrence],
                    });
                }
            }
        }

        candidates
    }

    fn is_label(&self, name: &str) -> bool {
        self.stoplist
            .as_ref()
            .map(|stoplist| stoplist.contains(&name.to_lowercase()))
            .unwrap_or(false)
    }
}
