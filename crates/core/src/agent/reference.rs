//! Detecting back-references and carrying resolved identifiers to the
//! model through an inline annotation.

use std::sync::LazyLock;

use regex::Regex;

use crate::memory::{
    BACK_REFERENCE_PHRASES, EntityMemory, ORDINAL_PATTERNS, ORDINAL_WORDS,
    contains_phrase,
};

/// Words suggesting the user talks about a specific, earlier result.
const EXTRA_MARKERS: &[&str] = &[
    "option",
    "number",
    "price",
    "rate",
    "rates",
    "room",
    "rooms",
    "availability",
    "available",
    "book",
    "details",
    "about",
    "amenities",
];

/// Utterances that reset the dialogue when sent on their own.
const EXIT_PHRASES: &[&str] = &[
    "bye",
    "goodbye",
    "exit",
    "quit",
    "clear",
    "reset",
    "start over",
    "new chat",
];

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\[hotel_id:[^\]]*\]").expect("invalid annotation pattern")
});

/// Returns `true` if the utterance may refer to an earlier result and is
/// worth running through the entity memory.
pub(crate) fn needs_resolution(memory: &EntityMemory, utterance: &str) -> bool {
    if ANNOTATION.is_match(utterance) {
        return false;
    }
    let lowered = utterance.to_lowercase();
    BACK_REFERENCE_PHRASES
        .iter()
        .chain(EXTRA_MARKERS)
        .chain(ORDINAL_WORDS.iter().map(|(word, _)| word))
        .any(|marker| contains_phrase(&lowered, marker))
        || ORDINAL_PATTERNS.iter().any(|p| p.is_match(&lowered))
        || memory.mentions_bound_name(&lowered)
}

/// Returns `true` if the utterance asks to start the conversation over.
pub(crate) fn is_exit_phrase(utterance: &str) -> bool {
    let normalized = utterance
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .to_lowercase();
    EXIT_PHRASES.contains(&normalized.as_str())
}

/// Appends the identifier annotation to an utterance.
#[inline]
pub fn annotate(utterance: &str, id: &str) -> String {
    format!("{} [hotel_id:{id}]", utterance.trim_end())
}

/// Removes every identifier annotation, then trims the text.
#[inline]
pub fn strip_annotations(text: &str) -> String {
    ANNOTATION.replace_all(text, "").trim().to_owned()
}
