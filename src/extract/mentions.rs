//! Textual mention scanning for plain-text content.
//!
//! Two layers, in order:
//!
//! 1. Attribution-phrase patterns ("according to X", "as reported by X",
//!    "X first reported") locate capitalized spans, which are validated
//!    against the known-source registry.
//! 2. A direct scan for every known display name catches attributions the
//!    patterns missed; those hits are emitted as inferred references and
//!    carry no context.

use regex::Regex;

use crate::registry::SourceRegistry;

/// A validated mention of a known outlet.
#[derive(Debug, Clone)]
pub(crate) struct MentionHit {
    /// Canonical registry name of the mentioned outlet.
    pub name: String,
    /// Text around the match; empty for name-scan hits.
    pub context: String,
    /// True when the hit came from the name scan, not a phrase pattern.
    pub inferred: bool,
}

pub(crate) struct MentionScanner {
    patterns: Vec<Regex>,
}

/// Characters of surrounding text captured on each side of a match.
const CONTEXT_WINDOW: usize = 50;

impl MentionScanner {
    pub fn new() -> Self {
        let patterns = [
            r"(?i:according to|as reported by|reported by|citing)\s+(?:[Tt]he\s+)?([A-Z][A-Za-z\s]+?)(?:\s*[,.]|\s+said|\s+reported|\s+found|\s+showed)",
            r"(?i:a|an)\s+(?i:report|article|story|piece|investigation)\s+(?i:by|from|in)\s+(?:[Tt]he\s+)?([A-Z][A-Za-z\s]+?)(?:\s*[,.]|\s+said|\s+found|\s+showed)",
            r"([A-Z][A-Za-z\s]+?)\s+first\s+reported",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static pattern must compile"))
        .collect();
        Self { patterns }
    }

    /// Scan text for mentions of registry outlets.
    ///
    /// Pattern hits come first; the name scan then adds outlets the
    /// patterns missed. Each outlet appears at most once per call.
    pub fn scan(&self, text: &str, registry: &SourceRegistry) -> Vec<MentionHit> {
        let mut hits: Vec<MentionHit> = Vec::new();

        for pattern in &self.patterns {
            for captures in pattern.captures_iter(text) {
                let Some(span) = captures.get(1) else {
                    continue;
                };
                let trimmed = span.as_str().trim();
                // "The Hill"-style names lose their article to the pattern's
                // optional the-prefix; retry with it restored.
                let known = registry
                    .lookup_name(trimmed)
                    .or_else(|| registry.lookup_name(&format!("The {trimmed}")));
                let Some(known) = known else {
                    continue;
                };
                if hits.iter().any(|h| h.name == known.name) {
                    continue;
                }
                let whole = captures.get(0).expect("capture 0 always present");
                hits.push(MentionHit {
                    name: known.name.clone(),
                    context: context_window(text, whole.start(), whole.end()),
                    inferred: false,
                });
            }
        }

        let lowered = text.to_lowercase();
        for known in registry.entries() {
            if hits.iter().any(|h| h.name == known.name) {
                continue;
            }
            if lowered.contains(&known.name.to_lowercase()) {
                hits.push(MentionHit {
                    name: known.name.clone(),
                    context: String::new(),
                    inferred: true,
                });
            }
        }

        hits
    }
}

/// Slice `CONTEXT_WINDOW` characters around [start, end), on char boundaries.
fn context_window(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_WINDOW - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_WINDOW)
        .map(|(idx, _)| end + idx)
        .unwrap_or(text.len());
    text[from..to].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SourceRegistry {
        SourceRegistry::builtin()
    }

    #[test]
    fn attribution_phrase_is_a_pattern_hit() {
        let scanner = MentionScanner::new();
        let hits = scanner.scan(
            "According to Reuters, the talks collapsed on Friday.",
            &registry(),
        );
        let reuters = hits.iter().find(|h| h.name == "Reuters").unwrap();
        assert!(!reuters.inferred);
        assert!(reuters.context.contains("Reuters"));
    }

    #[test]
    fn first_reported_phrasing_matches() {
        let scanner = MentionScanner::new();
        let hits = scanner.scan("The Hill first reported the resignation.", &registry());
        assert!(hits.iter().any(|h| h.name == "The Hill" && !h.inferred));
    }

    #[test]
    fn the_prefix_is_stripped_before_lookup() {
        let scanner = MentionScanner::new();
        let hits = scanner.scan(
            "According to the Washington Post, the bill stalled.",
            &registry(),
        );
        assert!(hits.iter().any(|h| h.name == "Washington Post"));
    }

    #[test]
    fn bare_name_becomes_an_inferred_hit() {
        let scanner = MentionScanner::new();
        let hits = scanner.scan(
            "Coverage from Politico framed the vote differently.",
            &registry(),
        );
        let politico = hits.iter().find(|h| h.name == "Politico").unwrap();
        assert!(politico.inferred);
        assert!(politico.context.is_empty());
    }

    #[test]
    fn pattern_hit_suppresses_duplicate_name_scan() {
        let scanner = MentionScanner::new();
        let hits = scanner.scan(
            "According to Reuters, markets fell. Reuters later updated the story.",
            &registry(),
        );
        let reuters: Vec<_> = hits.iter().filter(|h| h.name == "Reuters").collect();
        assert_eq!(reuters.len(), 1);
        assert!(!reuters[0].inferred);
    }

    #[test]
    fn unknown_outlets_are_ignored() {
        let scanner = MentionScanner::new();
        let hits = scanner.scan(
            "According to Totally Real Gazette, pigs fly.",
            &registry(),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn context_window_respects_char_boundaries() {
        let text = format!("{}according to Reuters, yes.", "é".repeat(120));
        let start = text.find("according").unwrap();
        let window = context_window(&text, start, start + 9);
        assert!(window.contains("according"));
        assert!(window.chars().count() <= 9 + 2 * CONTEXT_WINDOW);
    }

    #[test]
    fn multibyte_text_does_not_panic_the_scanner() {
        let scanner = MentionScanner::new();
        let text = "«Üben»: according to Reuters, the café reopened.";
        let hits = scanner.scan(text, &registry());
        assert!(hits.iter().any(|h| h.name == "Reuters"));
    }
}
