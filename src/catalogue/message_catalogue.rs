//! Flat key/target message store with per-message metadata.
//!
//! This is the shape the POT dumper works on: every domain maps string keys
//! to targets, and each key may carry comments, flags, source references and
//! a context. Entries with a context are stored under a contextualised key.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use log::debug;

use crate::catalogue::{Catalogues, Translation};
use crate::catalogue::contextualiser::MessageContextualiser;
use crate::extension::plural::join_rules;

/// Read access to a key/target store.
pub trait MessageStore {
    fn locale(&self) -> &str;

    fn has(&self, key: &str, domain: &str) -> bool;

    /// Key/target pairs of `domain` in insertion order.
    fn all(&self, domain: &str) -> Vec<(&str, &str)>;

    /// Metadata access, when the store supports it.
    fn as_metadata_aware(&self) -> Option<&dyn MetadataAware> {
        None
    }
}

pub trait MetadataAware {
    fn metadata(&self, key: &str, domain: &str) -> Option<&Metadata>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub comments: Vec<String>,
    pub flags: Vec<String>,
    pub sources: Vec<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MessageCatalogue {
    locale: String,
    messages: BTreeMap<String, IndexMap<String, String>>,
    metadata: BTreeMap<String, IndexMap<String, Metadata>>,
}

impl MessageCatalogue {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            ..Default::default()
        }
    }

    pub fn set(&mut self, key: &str, target: &str, domain: &str) {
        self.messages
            .entry(domain.to_string())
            .or_default()
            .insert(key.to_string(), target.to_string());
    }

    pub fn metadata_mut(&mut self, key: &str, domain: &str) -> &mut Metadata {
        self.metadata
            .entry(domain.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default()
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// Add every extracted translation.
    ///
    /// Plural entries are stored as `singular|plural` with literal pipes
    /// doubled. Entries with a context get a contextualised key and record
    /// the context in their metadata. Contextualised keys never take the key
    /// of a plain entry of the same domain, whatever the import order.
    pub fn import(&mut self, catalogues: &Catalogues, contextualiser: &MessageContextualiser) {
        for (domain, catalogue) in catalogues.iter() {
            debug!(
                "Importing {} messages into domain {}",
                catalogue.len(),
                domain
            );
            let plain: HashSet<String> = catalogue
                .iter()
                .filter(|t| t.context.is_none())
                .map(message_id)
                .collect();

            for translation in catalogue.iter() {
                let id = message_id(translation);
                let key = match translation.context {
                    Some(_) => {
                        let taken = ReservedKeys {
                            store: &*self,
                            reserved: &plain,
                        };
                        contextualiser.contextualise_key(&taken, &id, domain)
                    }
                    None => id.clone(),
                };

                self.set(&key, &id, domain);
                let metadata = self.metadata_mut(&key, domain);
                metadata.comments.extend(translation.comments.iter().cloned());
                metadata
                    .sources
                    .extend(translation.references.iter().map(ToString::to_string));
                metadata.context.clone_from(&translation.context);
            }
        }
    }
}

fn message_id(translation: &Translation) -> String {
    match &translation.plural {
        Some(plural) => join_rules(&translation.original, plural),
        None => translation.original.clone(),
    }
}

/// A store whose `reserved` keys count as present.
struct ReservedKeys<'a> {
    store: &'a MessageCatalogue,
    reserved: &'a HashSet<String>,
}

impl MessageStore for ReservedKeys<'_> {
    fn locale(&self) -> &str {
        self.store.locale()
    }

    fn has(&self, key: &str, domain: &str) -> bool {
        self.reserved.contains(key) || self.store.has(key, domain)
    }

    fn all(&self, domain: &str) -> Vec<(&str, &str)> {
        self.store.all(domain)
    }
}

impl MessageStore for MessageCatalogue {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn has(&self, key: &str, domain: &str) -> bool {
        self.messages
            .get(domain)
            .is_some_and(|messages| messages.contains_key(key))
    }

    fn all(&self, domain: &str) -> Vec<(&str, &str)> {
        self.messages
            .get(domain)
            .map(|messages| {
                messages
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn as_metadata_aware(&self) -> Option<&dyn MetadataAware> {
        Some(self)
    }
}

impl MetadataAware for MessageCatalogue {
    fn metadata(&self, key: &str, domain: &str) -> Option<&Metadata> {
        self.metadata.get(domain).and_then(|m| m.get(key))
    }
}
