//! In-memory gettext catalog.

use std::collections::HashMap;

use log::trace;

use crate::translator::lookup::GettextLookup;

/// Domain used by the functions that take no domain argument.
pub const DEFAULT_TEXT_DOMAIN: &str = "messages";

#[derive(Debug, Default, Clone)]
struct DomainMessages {
    /// msgid (or `context\x04msgid`) to msgstr
    messages: HashMap<String, String>,
    /// (msgid, msgid_plural) to msgstr[n]
    plural_messages: HashMap<(String, String), Vec<String>>,
}

/// Translations held per locale and domain.
///
/// Plural forms follow the `n != 1` rule. Missing or empty translations fall
/// back to the untranslated text.
#[derive(Debug, Clone)]
pub struct GettextCatalog {
    locale: String,
    catalogs: HashMap<(String, String), DomainMessages>,
}

impl Default for GettextCatalog {
    fn default() -> Self {
        Self::new("en")
    }
}

impl GettextCatalog {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            catalogs: HashMap::new(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn add_message(
        &mut self,
        locale: &str,
        domain: &str,
        context: Option<&str>,
        original: &str,
        translation: impl Into<String>,
    ) {
        self.domain_mut(locale, domain)
            .messages
            .insert(message_key(context, original), translation.into());
    }

    pub fn add_plural_message(
        &mut self,
        locale: &str,
        domain: &str,
        context: Option<&str>,
        original: &str,
        plural: &str,
        translations: Vec<String>,
    ) {
        self.domain_mut(locale, domain).plural_messages.insert(
            (message_key(context, original), plural.to_string()),
            translations,
        );
    }

    fn domain_mut(&mut self, locale: &str, domain: &str) -> &mut DomainMessages {
        self.catalogs
            .entry((locale.to_string(), domain.to_string()))
            .or_default()
    }

    fn domain(&self, domain: &str) -> Option<&DomainMessages> {
        self.catalogs
            .get(&(self.locale.clone(), domain.to_string()))
    }

    fn singular(&self, domain: &str, context: Option<&str>, original: &str) -> String {
        let key = message_key(context, original);
        match self
            .domain(domain)
            .and_then(|d| d.messages.get(&key))
            .filter(|s| !s.is_empty())
        {
            Some(translation) => translation.clone(),
            None => {
                trace!("No translation for {:?} in {}/{}", key, self.locale, domain);
                original.to_string()
            }
        }
    }

    fn plural(
        &self,
        domain: &str,
        context: Option<&str>,
        original: &str,
        plural: &str,
        n: u64,
    ) -> String {
        let index = plural_index(n);
        let key = (message_key(context, original), plural.to_string());
        let found = self
            .domain(domain)
            .and_then(|d| d.plural_messages.get(&key))
            .and_then(|forms| forms.get(index.min(forms.len().saturating_sub(1))))
            .filter(|s| !s.is_empty());

        match found {
            Some(translation) => translation.clone(),
            None if n == 1 => original.to_string(),
            None => plural.to_string(),
        }
    }
}

fn message_key(context: Option<&str>, original: &str) -> String {
    match context {
        Some(context) => format!("{}\x04{}", context, original),
        None => original.to_string(),
    }
}

fn plural_index(n: u64) -> usize {
    if n == 1 { 0 } else { 1 }
}

impl GettextLookup for GettextCatalog {
    fn set_locale(&mut self, locale: &str) {
        self.locale = locale.to_string();
    }

    fn gettext(&self, original: &str) -> String {
        self.singular(DEFAULT_TEXT_DOMAIN, None, original)
    }

    fn pgettext(&self, context: &str, original: &str) -> String {
        self.singular(DEFAULT_TEXT_DOMAIN, Some(context), original)
    }

    fn ngettext(&self, original: &str, plural: &str, n: u64) -> String {
        self.plural(DEFAULT_TEXT_DOMAIN, None, original, plural, n)
    }

    fn npgettext(&self, context: &str, original: &str, plural: &str, n: u64) -> String {
        self.plural(DEFAULT_TEXT_DOMAIN, Some(context), original, plural, n)
    }

    fn dgettext(&self, domain: &str, original: &str) -> String {
        self.singular(domain, None, original)
    }

    fn dpgettext(&self, domain: &str, context: &str, original: &str) -> String {
        self.singular(domain, Some(context), original)
    }

    fn dngettext(&self, domain: &str, original: &str, plural: &str, n: u64) -> String {
        self.plural(domain, None, original, plural, n)
    }

    fn dnpgettext(
        &self,
        domain: &str,
        context: &str,
        original: &str,
        plural: &str,
        n: u64,
    ) -> String {
        self.plural(domain, Some(context), original, plural, n)
    }
}
