//! Extracted translations grouped by domain.
//!
//! A [`Catalogue`] holds the entries of one domain keyed by
//! [`TranslationKey`]; [`Catalogues`] maps domain names to catalogues.
//! Merging is a union where entries with the same key are combined, so
//! extracting files one at a time or all at once gives the same result.

pub mod contextualiser;
pub mod message_catalogue;
pub mod pot;

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use indexmap::{IndexMap, IndexSet};

/// Identity of a catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TranslationKey {
    pub context: Option<String>,
    pub original: String,
}

impl TranslationKey {
    pub fn new(context: Option<String>, original: impl Into<String>) -> Self {
        Self {
            context,
            original: original.into(),
        }
    }

    /// gettext-style id: `original`, or `context\x04original`.
    pub fn id(&self) -> String {
        match &self.context {
            Some(context) => format!("{}\u{4}{}", context, self.original),
            None => self.original.clone(),
        }
    }
}

/// Where a message was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub path: String,
    pub line: usize,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub original: String,
    pub plural: Option<String>,
    pub context: Option<String>,
    /// Extracted comments for translators, in discovery order.
    pub comments: Vec<String>,
    pub references: IndexSet<Reference>,
}

impl Translation {
    pub fn new(key: &TranslationKey) -> Self {
        Self {
            original: key.original.clone(),
            plural: None,
            context: key.context.clone(),
            comments: Vec::new(),
            references: IndexSet::new(),
        }
    }

    pub fn key(&self) -> TranslationKey {
        TranslationKey::new(self.context.clone(), self.original.clone())
    }

    pub fn add_reference(&mut self, path: impl Into<String>, line: usize) {
        self.references.insert(Reference {
            path: path.into(),
            line,
        });
    }

    /// Fold `other` into this entry. The first plural seen is kept.
    pub fn merge(&mut self, other: Translation) {
        if self.plural.is_none() {
            self.plural = other.plural;
        }
        self.comments.extend(other.comments);
        self.references.extend(other.references);
    }
}

/// Entries of one domain in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalogue {
    entries: IndexMap<TranslationKey, Translation>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `translation`, merging it into an existing entry with the same key.
    pub fn add(&mut self, translation: Translation) {
        match self.entries.get_mut(&translation.key()) {
            Some(existing) => existing.merge(translation),
            None => {
                self.entries.insert(translation.key(), translation);
            }
        }
    }

    /// Entry for `key`, created empty when missing.
    pub fn entry(&mut self, key: TranslationKey) -> &mut Translation {
        let translation = Translation::new(&key);
        self.entries.entry(key).or_insert(translation)
    }

    pub fn get(&self, key: &TranslationKey) -> Option<&Translation> {
        self.entries.get(key)
    }

    pub fn merge(&mut self, other: Catalogue) {
        for translation in other.entries.into_values() {
            self.add(translation);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Translation> {
        self.entries.values()
    }
}

/// Catalogues keyed by domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalogues {
    domains: BTreeMap<String, Catalogue>,
}

impl Catalogues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain_mut(&mut self, domain: &str) -> &mut Catalogue {
        self.domains.entry(domain.to_string()).or_default()
    }

    pub fn get(&self, domain: &str) -> Option<&Catalogue> {
        self.domains.get(domain)
    }

    pub fn merge(&mut self, other: Catalogues) {
        for (domain, catalogue) in other.domains {
            match self.domains.entry(domain) {
                Entry::Occupied(mut existing) => existing.get_mut().merge(catalogue),
                Entry::Vacant(slot) => {
                    slot.insert(catalogue);
                }
            }
        }
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Catalogue)> {
        self.domains.iter().map(|(d, c)| (d.as_str(), c))
    }

    pub fn is_empty(&self) -> bool {
        self.domains.values().all(Catalogue::is_empty)
    }

    /// Total number of entries across domains.
    pub fn message_count(&self) -> usize {
        self.domains.values().map(Catalogue::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn translation(context: Option<&str>, original: &str, path: &str, line: usize) -> Translation {
        let mut t = Translation::new(&TranslationKey::new(context.map(String::from), original));
        t.add_reference(path, line);
        t
    }

    fn catalogues(entries: &[(&str, Translation)]) -> Catalogues {
        let mut catalogues = Catalogues::new();
        for (domain, t) in entries {
            catalogues.domain_mut(domain).add(t.clone());
        }
        catalogues
    }

    #[test]
    fn test_key_id() {
        assert_eq!(TranslationKey::new(None, "Open").id(), "Open");
        assert_eq!(
            TranslationKey::new(Some("menu".into()), "Open").id(),
            "menu\u{4}Open"
        );
    }

    #[test]
    fn test_same_key_merges_references() {
        let mut catalogue = Catalogue::new();
        catalogue.add(translation(None, "Hi", "a.twig", 1));
        catalogue.add(translation(None, "Hi", "b.twig", 4));
        catalogue.add(translation(None, "Hi", "a.twig", 1));

        assert_eq!(catalogue.len(), 1);
        let refs: Vec<String> = catalogue
            .get(&TranslationKey::new(None, "Hi"))
            .unwrap()
            .references
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(refs, vec!["a.twig:1", "b.twig:4"]);
    }

    #[test]
    fn test_context_keeps_entries_distinct() {
        let mut catalogue = Catalogue::new();
        catalogue.add(translation(None, "Open", "a.twig", 1));
        catalogue.add(translation(Some("menu"), "Open", "a.twig", 2));
        assert_eq!(catalogue.len(), 2);
    }

    #[test]
    fn test_first_plural_kept() {
        let mut first = translation(None, "apple", "a.twig", 1);
        first.plural = Some("apples".into());
        let mut second = translation(None, "apple", "b.twig", 1);
        second.plural = Some("many apples".into());
        second.comments.push("fruit".into());

        first.merge(second);
        assert_eq!(first.plural.as_deref(), Some("apples"));
        assert_eq!(first.comments, vec!["fruit"]);
    }

    #[test]
    fn test_catalogues_merge_is_associative() {
        let a = catalogues(&[("messages", translation(None, "x", "a", 1))]);
        let b = catalogues(&[
            ("messages", translation(None, "x", "b", 2)),
            ("errors", translation(None, "e", "b", 3)),
        ]);
        let c = catalogues(&[("errors", translation(None, "e", "c", 4))]);

        let mut left = a.clone();
        left.merge(b.clone());
        left.merge(c.clone());

        let mut bc = b;
        bc.merge(c);
        let mut right = a;
        right.merge(bc);

        assert_eq!(left, right);
        assert_eq!(left.domains().collect::<Vec<_>>(), vec!["errors", "messages"]);
        assert_eq!(left.message_count(), 2);
    }
}
