//! Entity memory, which lets informal references like "option 2" or
//! "this one" resolve to an entity returned by the latest search.

mod rules;

use std::collections::HashMap;

pub(crate) use rules::{
    BACK_REFERENCE_PHRASES, ORDINAL_PATTERNS, ORDINAL_WORDS, contains_phrase,
};
use rules::{Outcome, RULES};

/// A reference to an entity (a hotel or a deal) returned by a search.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// The opaque, provider-assigned identifier.
    pub id: String,
    /// The display name.
    pub name: String,
}

impl EntityRef {
    /// Creates a new entity reference.
    #[inline]
    pub fn new<S1: Into<String>, S2: Into<String>>(id: S1, name: S2) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// How a key was derived from an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// The lowercased full name.
    Name,
    /// The lowercased first word of the name.
    ShortName,
    /// `"option {i}"`.
    Ordinal,
    /// The 1-based position itself, e.g. `"2"`.
    Position,
}

/// A key bound to an entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    key: String,
    kind: KeyKind,
    entity: EntityRef,
}

impl Binding {
    /// Returns the normalized key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns how the key was derived.
    #[inline]
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Returns the bound entity.
    #[inline]
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }
}

/// Maps informal references to entity identifiers.
///
/// The memory only ever reflects the most recent non-empty search: every
/// [`rebuild`](Self::rebuild) discards the previous bindings instead of
/// merging them. Many keys may point at the same entity, but a key points
/// at exactly one.
#[derive(Clone, Debug, Default)]
pub struct EntityMemory {
    bindings: Vec<Binding>,
    index: HashMap<String, usize>,
    last_referenced: Option<String>,
}

impl EntityMemory {
    /// Creates an empty memory.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all bindings with the given entities, in search order.
    ///
    /// An empty slice is a no-op, so that stale bindings stay usable until
    /// the next search that actually returns something.
    ///
    /// Positional keys (`"option 2"`, `"2"`) are bound first, then full
    /// names, then the first word of each name. A key already bound is
    /// never overwritten, so a full name always beats another entity's
    /// short name, and the earlier entity wins between short names.
    pub fn rebuild(&mut self, entities: &[EntityRef]) {
        if entities.is_empty() {
            trace!("empty rebuild, keeping {} bindings", self.bindings.len());
            return;
        }

        self.bindings.clear();
        self.index.clear();
        self.last_referenced = None;

        for (idx, entity) in entities.iter().enumerate() {
            let position = idx + 1;
            self.bind(format!("option {position}"), KeyKind::Ordinal, entity);
            self.bind(position.to_string(), KeyKind::Position, entity);
        }
        for entity in entities {
            self.bind(normalize(&entity.name), KeyKind::Name, entity);
        }
        for entity in entities {
            let normalized = normalize(&entity.name);
            if let Some(first_word) = normalized.split_whitespace().next() {
                self.bind(first_word.to_owned(), KeyKind::ShortName, entity);
            }
        }

        self.last_referenced = Some(entities[0].id.clone());
        debug!(
            "entity memory rebuilt with {} entities, {} keys",
            entities.len(),
            self.bindings.len()
        );
    }

    /// Resolves a free-text utterance to an entity identifier.
    ///
    /// A successful resolution also becomes the last referenced entity, so
    /// a following "this one" points at it.
    pub fn resolve(&mut self, utterance: &str) -> Option<String> {
        let utterance = utterance.to_lowercase();
        let mut resolved = None;
        for (rule_name, rule) in RULES {
            match rule(self, &utterance) {
                Outcome::Pass => continue,
                Outcome::Found(id) => {
                    debug!("resolved by {rule_name} rule: {id}");
                    resolved = Some(id.to_owned());
                    break;
                }
                Outcome::Stop => {
                    debug!("{rule_name} rule stopped without an entity");
                    break;
                }
            }
        }
        if let Some(id) = &resolved {
            self.last_referenced = Some(id.clone());
        }
        resolved
    }

    /// Returns the entity bound to a normalized key.
    #[inline]
    pub fn lookup(&self, key: &str) -> Option<&EntityRef> {
        self.index.get(key).map(|&idx| &self.bindings[idx].entity)
    }

    /// Returns the last referenced entity identifier.
    #[inline]
    pub fn last_referenced(&self) -> Option<&str> {
        self.last_referenced.as_deref()
    }

    /// Returns `true` if the utterance mentions a bound name.
    pub fn mentions_bound_name(&self, utterance: &str) -> bool {
        let utterance = utterance.to_lowercase();
        self.bindings
            .iter()
            .filter(|b| matches!(b.kind, KeyKind::Name | KeyKind::ShortName))
            .filter(|b| rules::is_distinctive(&b.key))
            .any(|b| contains_phrase(&utterance, &b.key))
    }

    /// Returns all bindings in binding order.
    #[inline]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Returns `true` if nothing is bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Forgets everything, including the last referenced entity.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.index.clear();
        self.last_referenced = None;
    }

    fn bind(&mut self, key: String, kind: KeyKind, entity: &EntityRef) {
        if key.is_empty() || self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key.clone(), self.bindings.len());
        self.bindings.push(Binding {
            key,
            kind,
            entity: entity.clone(),
        });
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotels() -> Vec<EntityRef> {
        vec![
            EntityRef::new("1", "Hotel Alpha"),
            EntityRef::new("2", "Hotel Beta"),
            EntityRef::new("3", "Taj Palace"),
            EntityRef::new("4", "Zostel  Goa"),
        ]
    }

    fn memory() -> EntityMemory {
        let mut memory = EntityMemory::new();
        memory.rebuild(&hotels());
        memory
    }

    #[test]
    fn test_option_keys() {
        let mut memory = memory();
        for (idx, hotel) in hotels().iter().enumerate() {
            let utterance = format!("Option {}", idx + 1);
            assert_eq!(memory.resolve(&utterance), Some(hotel.id.clone()));
        }
        assert_eq!(memory.resolve("option 9"), None);
    }

    #[test]
    fn test_bindings() {
        let memory = memory();
        assert_eq!(memory.lookup("hotel beta").unwrap().id, "2");
        assert_eq!(memory.lookup("zostel goa").unwrap().id, "4");
        assert_eq!(memory.lookup("option 3").unwrap().name, "Taj Palace");
        assert_eq!(memory.lookup("4").unwrap().id, "4");
        // First writer wins for the colliding short name.
        assert_eq!(memory.lookup("hotel").unwrap().id, "1");
        assert_eq!(memory.lookup("taj").unwrap().id, "3");
        assert_eq!(memory.last_referenced(), Some("1"));
    }

    #[test]
    fn test_full_name_beats_short_name() {
        let mut memory = EntityMemory::new();
        memory.rebuild(&[
            EntityRef::new("10", "Taj Palace"),
            EntityRef::new("20", "Taj"),
        ]);
        assert_eq!(memory.lookup("taj").unwrap().id, "20");
        assert_eq!(memory.resolve("is taj palace near the beach"), Some("10".to_owned()));
        assert_eq!(memory.resolve("what about taj"), Some("20".to_owned()));
    }

    #[test]
    fn test_back_reference() {
        let mut memory = memory();
        assert_eq!(memory.resolve("tell me about this one"), Some("1".to_owned()));
        assert_eq!(memory.resolve("option 2"), Some("2".to_owned()));
        assert_eq!(memory.resolve("same hotel, what amenities?"), Some("2".to_owned()));
        assert_eq!(memory.resolve("Iski price kya hai"), Some("2".to_owned()));

        let mut empty = EntityMemory::new();
        assert_eq!(empty.resolve("this one please"), None);
    }

    #[test]
    fn test_back_reference_stops_resolution() {
        let mut memory = EntityMemory::new();
        // No entity is bound yet, the phrase wins over the ordinal.
        assert_eq!(memory.resolve("option 1, this one"), None);
    }

    #[test]
    fn test_name_before_ordinal() {
        let mut memory = memory();
        assert_eq!(
            memory.resolve("does hotel beta have 2 pools"),
            Some("2".to_owned())
        );
        assert_eq!(
            memory.resolve("taj palace for 3rd march"),
            Some("3".to_owned())
        );
        // "hotel" alone is too generic to pick an entity.
        assert_eq!(memory.resolve("any hotel with a pool"), None);
    }

    #[test]
    fn test_ordinals() {
        let mut memory = memory();
        assert_eq!(memory.resolve("the 3rd one"), Some("3".to_owned()));
        assert_eq!(memory.resolve("number 4 looks nice"), Some("4".to_owned()));
        assert_eq!(memory.resolve("second wala dikhao"), Some("2".to_owned()));
        assert_eq!(memory.resolve("pehla wala"), Some("1".to_owned()));
        assert_eq!(memory.resolve("the fifth one"), None);
        assert_eq!(memory.resolve("price under 2000"), None);
    }

    #[test]
    fn test_empty_rebuild_is_noop() {
        let expected = memory().bindings().len();
        let mut memory = memory();
        memory.rebuild(&[]);
        assert_eq!(memory.resolve("option 2"), Some("2".to_owned()));
        assert_eq!(memory.bindings().len(), expected);
    }

    #[test]
    fn test_rebuild_discards_previous() {
        let mut memory = memory();
        memory.rebuild(&[EntityRef::new("77", "Lemon Tree")]);
        assert_eq!(memory.resolve("option 2"), None);
        assert_eq!(memory.resolve("hotel beta"), None);
        assert_eq!(memory.resolve("this one"), Some("77".to_owned()));
    }

    #[test]
    fn test_clear() {
        let mut memory = memory();
        memory.clear();
        assert!(memory.is_empty());
        assert_eq!(memory.last_referenced(), None);
        assert_eq!(memory.resolve("this one"), None);
    }

    #[test]
    fn test_mentions_bound_name() {
        let memory = memory();
        assert!(memory.mentions_bound_name("Is Zostel Goa pet friendly?"));
        assert!(!memory.mentions_bound_name("Show me a hotel in Delhi"));
    }
}
