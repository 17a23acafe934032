//! Paragraph-to-chunk segmentation for classifier input.
//!
//! Scraped paragraphs are noisy: navigation fragments, orphaned half
//! sentences, cookie-banner droppings. This module rebuilds a pseudo-document
//! from the paragraphs, splits it with a coarse-to-fine separator cascade,
//! repairs sentence boundaries on each candidate, and drops anything that
//! does not read like declarative policy text. The output is the unit of
//! classification downstream; document order is preserved.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ChunkingConfig;

/// Separator cascade, coarsest first. The splitter prefers the coarsest
/// separator that still yields pieces under the chunk ceiling.
const SEPARATORS: [&str; 9] = [
    "\n\n\n", // major section breaks
    "\n\n",   // paragraph breaks
    "\n",     // line breaks
    ". ",     // sentence end
    "? ",     // question end
    "! ",     // exclamation end
    "; ",     // clause break
    ", ",     // phrase break
    " ",      // word break (last resort)
];

/// `[.!?]` followed by whitespace and a capital: a recoverable sentence start.
static SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+[A-Z]").expect("valid regex"));

/// Lexical signals of declarative content. A chunk must match at least one
/// to survive validation; headings and link lists match none of these.
static VERB_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(is|are|was|were|be|been|being)\b",
        r"\b(have|has|had|having)\b",
        r"\b(do|does|did|doing)\b",
        r"\b(will|would|shall|should|can|could|may|might|must)\b",
        r"\b\w+(ed|ing|ize|ise|ate|ify)\b",
        r"\b(collect|share|use|store|retain|delete|access|provide|require|allow|enable|process)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Converts raw scraped paragraphs into validated, size-bounded chunks.
pub struct Segmenter {
    config: ChunkingConfig,
}

impl Segmenter {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Segment an ordered sequence of raw paragraphs into validated chunks.
    ///
    /// Empty input, or input where every paragraph is under the noise floor,
    /// yields an empty result rather than an error.
    pub fn segment(&self, paragraphs: &[String]) -> Vec<String> {
        let clean: Vec<&str> = paragraphs
            .iter()
            .map(|p| p.trim())
            .filter(|p| p.len() > self.config.paragraph_floor_chars)
            .collect();

        if clean.is_empty() {
            return Vec::new();
        }

        // Blank lines between paragraphs survive as the strongest split signal.
        let full_text = clean.join("\n\n");

        let raw_chunks = self.split_recursive(&full_text, &SEPARATORS);

        raw_chunks
            .iter()
            .filter_map(|chunk| {
                let repaired = repair_sentence_end(repair_sentence_start(chunk));
                let repaired = repaired.trim();
                if self.validate(repaired) {
                    Some(repaired.to_string())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Adapter for pre-joined text (pasted policies, re-analysis of scraped
    /// output). Recovers paragraphs from blank lines when present.
    pub fn segment_text(&self, text: &str) -> Vec<String> {
        let paragraphs: Vec<String> = if text.contains("\n\n") {
            text.split("\n\n").map(|p| p.to_string()).collect()
        } else {
            text.split('\n').map(|p| p.to_string()).collect()
        };
        tracing::debug!(
            text_len = text.len(),
            paragraphs = paragraphs.len(),
            "segmenting pre-joined text"
        );
        self.segment(&paragraphs)
    }

    /// A chunk must clear the minimum length and carry at least one verb-like
    /// signal. Failures are dropped, not repaired further.
    fn validate(&self, chunk: &str) -> bool {
        if chunk.trim().len() < self.config.min_chunk_chars {
            return false;
        }
        let lower = chunk.to_lowercase();
        VERB_PATTERNS.iter().any(|p| p.is_match(&lower))
    }

    /// Recursively split `text`, preferring the coarsest separator present.
    /// Pieces still over the ceiling recurse into the finer separators.
    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        // First separator that actually occurs in the text; the finest one
        // (plain space) is the unconditional fallback.
        let (separator, remaining) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| text.contains(**sep))
            .map(|(i, sep)| (*sep, &separators[i + 1..]))
            .unwrap_or((*separators.last().expect("non-empty cascade"), &[]));

        let splits: Vec<&str> = text.split(separator).collect();

        let mut good_splits: Vec<&str> = Vec::new();
        for split in splits {
            if split.len() < self.config.chunk_size {
                good_splits.push(split);
            } else {
                if !good_splits.is_empty() {
                    final_chunks.extend(self.merge_splits(&good_splits, separator));
                    good_splits.clear();
                }
                if remaining.is_empty() {
                    final_chunks.push(split.to_string());
                } else {
                    final_chunks.extend(self.split_recursive(split, remaining));
                }
            }
        }
        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits, separator));
        }

        final_chunks
    }

    /// Greedily merge small splits back together up to the chunk ceiling,
    /// carrying `chunk_overlap` characters of trailing context into the next
    /// chunk for continuity.
    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let sep_len = separator.len();
        let mut docs: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for split in splits {
            let len = split.len();
            let joiner = if current.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.config.chunk_size && !current.is_empty() {
                let doc = current.join(separator);
                let doc = doc.trim();
                if !doc.is_empty() {
                    docs.push(doc.to_string());
                }
                // Shed leading pieces until the carried-over tail fits in the
                // overlap budget and leaves room for the incoming split.
                while total > self.config.chunk_overlap
                    || (total + len + if current.is_empty() { 0 } else { sep_len }
                        > self.config.chunk_size
                        && total > 0)
                {
                    let head_len = current[0].len();
                    total -= head_len + if current.len() > 1 { sep_len } else { 0 };
                    current.remove(0);
                    if current.is_empty() {
                        break;
                    }
                }
            }

            total += len + if current.is_empty() { 0 } else { sep_len };
            current.push(split);
        }

        let doc = current.join(separator);
        let doc = doc.trim();
        if !doc.is_empty() {
            docs.push(doc.to_string());
        }

        docs
    }
}

/// Trim an orphaned leading fragment left behind by a hard split.
///
/// If the chunk opens lowercase and a sentence boundary appears within the
/// first 30% of the text, restart the chunk at that capital letter.
pub fn repair_sentence_start(text: &str) -> &str {
    let text = text.trim();
    let Some(first) = text.chars().next() else {
        return text;
    };
    if first.is_lowercase() {
        if let Some(m) = SENTENCE_START.find(text) {
            if m.start() < text.len() * 3 / 10 {
                // The capital letter is the final byte of the match.
                return &text[m.end() - 1..];
            }
        }
    }
    text
}

/// Trim a trailing sentence fragment so the chunk ends at terminal
/// punctuation, but only when at least ~30% of the text survives the trim.
/// Keeping more text beats forcing a clean ending.
pub fn repair_sentence_end(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() {
        return text;
    }
    if text.ends_with(['.', '!', '?']) {
        return text;
    }

    // Terminal punctuation within the last few characters (e.g. before a
    // closing quote) wins outright.
    let bytes = text.as_bytes();
    let len = bytes.len();
    let scan_from = len.saturating_sub(4).max(1);
    for i in (scan_from..len).rev() {
        if matches!(bytes[i], b'.' | b'!' | b'?') {
            return &text[..=i];
        }
    }

    let last_boundary = [". ", "? ", "! "]
        .iter()
        .filter_map(|p| text.rfind(p))
        .max();
    if let Some(pos) = last_boundary {
        if pos > len * 3 / 10 {
            return &text[..=pos];
        }
    }

    text
}
