//! Context-prefixed message keys.
//!
//! A flat key/target store cannot hold two messages with the same text but
//! different contexts. Contextualised entries are therefore stored under
//! `HAS_CONTEXT<n>::<key>`, where `n` is the lowest number not already taken
//! in the store. The prefix is removed again when the catalogue is dumped.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalogue::message_catalogue::MessageStore;
use crate::error::CatalogueError;

const CONTEXT_PREFIX: &str = "HAS_CONTEXT";

static PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"HAS_CONTEXT\d+::").expect("valid regex"));

#[derive(Debug, Default, Clone, Copy)]
pub struct MessageContextualiser;

impl MessageContextualiser {
    pub fn new() -> Self {
        Self
    }

    /// Prefix `key` with the first `HAS_CONTEXT<n>::` that does not collide
    /// with a key already in `store`.
    pub fn contextualise_key(&self, store: &dyn MessageStore, key: &str, domain: &str) -> String {
        (0..)
            .map(|n| format!("{}{}::{}", CONTEXT_PREFIX, n, key))
            .find(|candidate| !store.has(candidate, domain))
            .unwrap_or_else(|| key.to_string())
    }

    /// Strip the context prefix from `key`.
    ///
    /// Keys are left untouched unless they carry the prefix and their
    /// metadata records a context, so a message whose text merely starts with
    /// `HAS_CONTEXT` survives.
    pub fn decontextualise_key(
        &self,
        store: &dyn MessageStore,
        key: &str,
        domain: &str,
    ) -> Result<String, CatalogueError> {
        let metadata = store
            .as_metadata_aware()
            .ok_or(CatalogueError::MetadataUnsupported)?;

        let has_context = metadata
            .metadata(key, domain)
            .is_some_and(|m| m.context.is_some());
        if !key.starts_with(CONTEXT_PREFIX) || !has_context {
            return Ok(key.to_string());
        }

        Ok(PREFIX_PATTERN.replace(key, "").into_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::catalogue::message_catalogue::MessageCatalogue;

    /// A store without metadata support.
    struct PlainStore(HashSet<String>);

    impl MessageStore for PlainStore {
        fn locale(&self) -> &str {
            "en"
        }

        fn has(&self, key: &str, _domain: &str) -> bool {
            self.0.contains(key)
        }

        fn all(&self, _domain: &str) -> Vec<(&str, &str)> {
            self.0.iter().map(|k| (k.as_str(), k.as_str())).collect()
        }
    }

    #[test]
    fn test_contextualise_probes_for_free_prefix() {
        let contextualiser = MessageContextualiser::new();
        let mut catalogue = MessageCatalogue::new("en");

        let first = contextualiser.contextualise_key(&catalogue, "Open", "messages");
        assert_eq!(first, "HAS_CONTEXT0::Open");
        catalogue.set(&first, "Open", "messages");

        let second = contextualiser.contextualise_key(&catalogue, "Open", "messages");
        assert_eq!(second, "HAS_CONTEXT1::Open");
        catalogue.set(&second, "Open", "messages");

        let third = contextualiser.contextualise_key(&catalogue, "Open", "messages");
        assert_eq!(third, "HAS_CONTEXT2::Open");

        // other domains are independent
        assert_eq!(
            contextualiser.contextualise_key(&catalogue, "Open", "errors"),
            "HAS_CONTEXT0::Open"
        );
    }

    #[test]
    fn test_decontextualise_requires_metadata_support() {
        let store = PlainStore(HashSet::new());
        let err = MessageContextualiser::new()
            .decontextualise_key(&store, "HAS_CONTEXT0::Open", "messages")
            .unwrap_err();
        assert!(matches!(err, CatalogueError::MetadataUnsupported));
    }

    #[test]
    fn test_decontextualise_strips_prefix_with_context_metadata() {
        let contextualiser = MessageContextualiser::new();
        let mut catalogue = MessageCatalogue::new("en");
        catalogue.set("HAS_CONTEXT0::Open", "Open", "messages");
        catalogue.metadata_mut("HAS_CONTEXT0::Open", "messages").context = Some("menu".into());

        assert_eq!(
            contextualiser
                .decontextualise_key(&catalogue, "HAS_CONTEXT0::Open", "messages")
                .unwrap(),
            "Open"
        );
    }

    #[test]
    fn test_decontextualise_leaves_plain_keys() {
        let contextualiser = MessageContextualiser::new();
        let mut catalogue = MessageCatalogue::new("en");
        catalogue.set("HAS_CONTEXT0::literal", "x", "messages");
        catalogue.set("Open", "Open", "messages");

        assert_eq!(
            contextualiser
                .decontextualise_key(&catalogue, "HAS_CONTEXT0::literal", "messages")
                .unwrap(),
            "HAS_CONTEXT0::literal"
        );
        assert_eq!(
            contextualiser
                .decontextualise_key(&catalogue, "Open", "messages")
                .unwrap(),
            "Open"
        );
    }
}
