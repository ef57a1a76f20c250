//! Runtime message resolution.
//!
//! [`Translator`] picks the gettext function matching the request, asks the
//! [`GettextLookup`] backend for the translated text and then substitutes
//! replacement tokens.

pub mod catalog;
pub mod lookup;

use indexmap::IndexMap;
use log::debug;

pub use catalog::GettextCatalog;
pub use lookup::{GettextFunction, GettextLookup, LookupCall};

/// Token bound to the count of a pluralised message.
pub const COUNT_TOKEN: &str = "%count%";

pub struct Translator {
    lookup: Box<dyn GettextLookup>,
}

impl Translator {
    pub fn new(lookup: impl GettextLookup + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    pub fn set_locale(&mut self, locale: &str) {
        debug!("Switching translation locale to {}", locale);
        self.lookup.set_locale(locale);
    }

    /// Translate `original` and substitute `replacements` into the result.
    ///
    /// With a `count`, `%count%` is substituted too unless `replacements`
    /// already provides it. Tokens with no replacement are left as written.
    pub fn translate(
        &self,
        original: &str,
        replacements: &IndexMap<String, String>,
        domain: Option<&str>,
        context: Option<&str>,
        plural: Option<&str>,
        count: Option<u64>,
    ) -> String {
        let call = LookupCall::new(domain, context, original, plural, count);
        debug!("Resolving {}({:?})", call.function(), call.arguments());
        let translated = call.invoke(self.lookup.as_ref());

        match count {
            Some(count) if !replacements.contains_key(COUNT_TOKEN) => {
                let mut tokens = replacements.clone();
                tokens.insert(COUNT_TOKEN.to_string(), count.to_string());
                replace_tokens(&translated, &tokens)
            }
            _ => replace_tokens(&translated, replacements),
        }
    }
}

/// Replace every occurrence of each key with its value in a single
/// left-to-right pass. At any position the longest matching key wins, and
/// replaced text is never scanned again.
pub fn replace_tokens(text: &str, replacements: &IndexMap<String, String>) -> String {
    if replacements.is_empty() {
        return text.to_string();
    }

    let mut keys: Vec<(&str, &str)> = replacements
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if let Some((key, value)) = keys.iter().find(|(key, _)| rest.starts_with(key)) {
            output.push_str(value);
            rest = &rest[key.len()..];
        } else {
            output.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    output
}
