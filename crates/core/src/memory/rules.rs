//! The ranked rules used to resolve an utterance to an entity.
//!
//! Rules run in the order of [`RULES`], the first one that doesn't pass
//! decides the outcome. Exact phrases and names come before the fuzzier
//! ordinal parsing, so that a number mentioned for another reason (a
//! price, a date) cannot hijack the resolution.

use std::sync::LazyLock;

use regex::Regex;

use super::{EntityMemory, KeyKind};

/// Pronoun-style phrases pointing back at the last referenced entity.
pub(crate) const BACK_REFERENCE_PHRASES: &[&str] = &[
    "this one",
    "this hotel",
    "that one",
    "that hotel",
    "same hotel",
    "same one",
    "above",
    "previous",
    "last one",
    "iski",
    "iska",
    "iske",
    "isme",
    "isko",
    "yeh wala",
    "ye wala",
    "wahi",
    "usi",
];

/// Ordinal words mapped to the position they stand for.
pub(crate) const ORDINAL_WORDS: &[(&str, &str)] = &[
    ("first", "1"),
    ("second", "2"),
    ("third", "3"),
    ("fourth", "4"),
    ("fifth", "5"),
    ("pehla", "1"),
    ("pehli", "1"),
    ("pehle", "1"),
    ("doosra", "2"),
    ("doosri", "2"),
    ("dusra", "2"),
    ("dusri", "2"),
    ("teesra", "3"),
    ("teesri", "3"),
    ("tisra", "3"),
    ("chautha", "4"),
    ("chauthi", "4"),
    ("paanchva", "5"),
    ("paanchvi", "5"),
    ("panchva", "5"),
];

/// Words too common in hotel names to identify one on their own.
const GENERIC_WORDS: &[&str] = &[
    "a", "an", "the", "hotel", "hotels", "resort", "resorts", "inn", "stay",
    "stays", "home", "homes", "guest", "house", "villa", "new", "grand",
];

pub(crate) static ORDINAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\boption\s*#?\s*(\d+)\b",
        r"\b(\d+)\s*(?:st|nd|rd|th)\b",
        r"(?:\bnumber|\bno\.?|#)\s*(\d+)\b",
        r"\bhotel\s*(\d+)\b",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("invalid ordinal pattern"))
    .collect()
});

/// What a rule concluded about an utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome<'a> {
    /// The rule doesn't apply, try the next one.
    Pass,
    /// The rule resolved the utterance to this identifier.
    Found(&'a str),
    /// The rule applies but has nothing to resolve to, stop here.
    Stop,
}

type Rule = for<'a> fn(&'a EntityMemory, &str) -> Outcome<'a>;

/// Rules in the order they are tried. Utterances are already lowercased.
pub(crate) const RULES: &[(&str, Rule)] = &[
    ("back reference", back_reference as Rule),
    ("name", name as Rule),
    ("ordinal pattern", ordinal_pattern as Rule),
    ("ordinal word", ordinal_word as Rule),
];

fn back_reference<'a>(memory: &'a EntityMemory, utterance: &str) -> Outcome<'a> {
    let mentioned = BACK_REFERENCE_PHRASES
        .iter()
        .any(|phrase| contains_phrase(utterance, phrase));
    if !mentioned {
        return Outcome::Pass;
    }
    match memory.last_referenced.as_deref() {
        Some(id) => Outcome::Found(id),
        None => Outcome::Stop,
    }
}

fn name<'a>(memory: &'a EntityMemory, utterance: &str) -> Outcome<'a> {
    // Longer keys first, so "hotel beta" beats a colliding short name. The
    // sort is stable, ties keep the binding order.
    let mut candidates: Vec<_> = memory
        .bindings
        .iter()
        .filter(|b| matches!(b.kind, KeyKind::Name | KeyKind::ShortName))
        .filter(|b| is_distinctive(&b.key))
        .collect();
    candidates.sort_by_key(|b| std::cmp::Reverse(b.key.len()));

    candidates
        .into_iter()
        .find(|b| contains_phrase(utterance, &b.key))
        .map_or(Outcome::Pass, |b| Outcome::Found(&b.entity.id))
}

fn ordinal_pattern<'a>(
    memory: &'a EntityMemory,
    utterance: &str,
) -> Outcome<'a> {
    for pattern in ORDINAL_PATTERNS.iter() {
        for captures in pattern.captures_iter(utterance) {
            let Some(position) = captures
                .get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok())
            else {
                continue;
            };
            if let Some(entity) = memory.lookup(&position.to_string()) {
                return Outcome::Found(&entity.id);
            }
        }
    }
    Outcome::Pass
}

fn ordinal_word<'a>(memory: &'a EntityMemory, utterance: &str) -> Outcome<'a> {
    ORDINAL_WORDS
        .iter()
        .filter(|(word, _)| contains_phrase(utterance, word))
        .find_map(|(_, position)| memory.lookup(position))
        .map_or(Outcome::Pass, |entity| Outcome::Found(&entity.id))
}

/// Returns `true` if a key can identify an entity when found in free text.
pub(crate) fn is_distinctive(key: &str) -> bool {
    !key.chars().all(|c| c.is_ascii_digit() || c.is_whitespace())
        && !GENERIC_WORDS.contains(&key)
}

/// Checks whether `needle` occurs in `haystack` on word boundaries.
///
/// Plain substring search would let short keys like "usi" match inside
/// "business".
pub(crate) fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric)
            && !after.is_some_and(char::is_alphanumeric)
    })
}
