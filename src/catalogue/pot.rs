//! Portable object template output.
//!
//! POT files carry message ids only, every `msgstr` is left empty.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::catalogue::contextualiser::MessageContextualiser;
use crate::catalogue::message_catalogue::{MessageCatalogue, MessageStore};
use crate::error::CatalogueError;
use crate::extension::plural::standard_rules;

pub const POT_EXTENSION: &str = "pot";

#[derive(Debug, Default, Clone)]
pub struct PotDumper {
    contextualiser: MessageContextualiser,
}

impl PotDumper {
    pub fn new(contextualiser: MessageContextualiser) -> Self {
        Self { contextualiser }
    }

    /// Render one domain of `store` as POT text.
    ///
    /// A store without metadata support is dumped without comments,
    /// references or contexts.
    pub fn format(&self, store: &dyn MessageStore, domain: &str) -> Result<String, CatalogueError> {
        let metadata_store = store.as_metadata_aware();

        let mut out = String::new();
        out.push_str("msgid \"\"\n");
        out.push_str("msgstr \"\"\n");
        out.push_str("\"Content-Type: text/plain; charset=UTF-8\\n\"\n");
        out.push_str("\"Content-Transfer-Encoding: 8bit\\n\"\n");
        out.push_str(&format!("\"Language: {}\\n\"\n", store.locale()));
        out.push('\n');

        for (index, (source, target)) in store.all(domain).into_iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }

            let metadata = metadata_store.and_then(|m| m.metadata(source, domain));
            if let Some(metadata) = metadata {
                for comment in &metadata.comments {
                    out.push_str(&format!("#. TRANSLATORS: {}\n", comment));
                }
                if !metadata.flags.is_empty() {
                    out.push_str(&format!("#, {}\n", metadata.flags.join(",")));
                }
                if !metadata.sources.is_empty() {
                    out.push_str(&format!("#: {}\n", metadata.sources.join(" ")));
                }
            }

            let id = match metadata.and_then(|m| m.context.as_deref()) {
                Some(context) => {
                    out.push_str(&format!("msgctxt \"{}\"\n", escape(context)));
                    self.contextualiser
                        .decontextualise_key(store, source, domain)?
                }
                None => source.to_string(),
            };

            // interval rules are not decomposable and fall through to a plain entry
            let source_rules = standard_rules(&id).unwrap_or_default();
            let target_rules = standard_rules(target).unwrap_or_default();
            if source_rules.len() == 2 && !target_rules.is_empty() {
                out.push_str(&format!("msgid \"{}\"\n", escape(&source_rules[0])));
                out.push_str(&format!("msgid_plural \"{}\"\n", escape(&source_rules[1])));
                for i in 0..target_rules.len() {
                    out.push_str(&format!("msgstr[{}] \"\"\n", i));
                }
            } else {
                out.push_str(&format!("msgid \"{}\"\n", escape(&id)));
                out.push_str("msgstr \"\"\n");
            }
        }

        Ok(out)
    }

    /// Write one `<domain>.pot` file per domain into `dir`.
    pub fn dump(
        &self,
        catalogue: &MessageCatalogue,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, CatalogueError> {
        fs::create_dir_all(dir).map_err(|source| CatalogueError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::new();
        for domain in catalogue.domains() {
            let path = dir.join(format!("{}.{}", domain, POT_EXTENSION));
            let content = self.format(catalogue, domain)?;
            fs::write(&path, content).map_err(|source| CatalogueError::Write {
                path: path.clone(),
                source,
            })?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Backslash-escape control characters, `"` and `\`.
///
/// Control characters with a C escape use it, the rest are written as three
/// digit octal.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\x0B' => out.push_str("\\v"),
            '\x0C' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalogue::message_catalogue::MessageCatalogue;
    use crate::catalogue::{Catalogues, Translation, TranslationKey};

    const HEADER: &str = concat!(
        "msgid \"\"\n",
        "msgstr \"\"\n",
        "\"Content-Type: text/plain; charset=UTF-8\\n\"\n",
        "\"Content-Transfer-Encoding: 8bit\\n\"\n",
        "\"Language: en\\n\"\n",
        "\n",
    );

    fn catalogue(catalogues: &Catalogues) -> MessageCatalogue {
        let mut catalogue = MessageCatalogue::new("en");
        catalogue.import(catalogues, &MessageContextualiser::new());
        catalogue
    }

    #[test]
    fn test_empty_domain_is_header_only() {
        let catalogue = MessageCatalogue::new("en");
        assert_eq!(
            PotDumper::default().format(&catalogue, "messages").unwrap(),
            HEADER
        );
    }

    #[test]
    fn test_format_entries() {
        let mut catalogues = Catalogues::new();
        let messages = catalogues.domain_mut("messages");

        let title = messages.entry(TranslationKey::new(None, "My Title"));
        title.add_reference("templates/index.twig", 2);
        title.add_reference("templates/about.twig", 5);

        let open = messages.entry(TranslationKey::new(Some("menu".into()), "Open"));
        open.add_reference("templates/index.twig", 9);
        open.comments.push("File menu".into());

        let mut apple = Translation::new(&TranslationKey::new(None, "I have an apple"));
        apple.plural = Some("I have %count% apples".into());
        apple.add_reference("templates/index.twig", 12);
        messages.add(apple);

        let out = PotDumper::default()
            .format(&catalogue(&catalogues), "messages")
            .unwrap();

        let expected = format!(
            "{}{}",
            HEADER,
            concat!(
                "#: templates/index.twig:2 templates/about.twig:5\n",
                "msgid \"My Title\"\n",
                "msgstr \"\"\n",
                "\n",
                "#. TRANSLATORS: File menu\n",
                "#: templates/index.twig:9\n",
                "msgctxt \"menu\"\n",
                "msgid \"Open\"\n",
                "msgstr \"\"\n",
                "\n",
                "#: templates/index.twig:12\n",
                "msgid \"I have an apple\"\n",
                "msgid_plural \"I have %count% apples\"\n",
                "msgstr[0] \"\"\n",
                "msgstr[1] \"\"\n",
            )
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_context_and_plain_entries_are_distinct() {
        let mut catalogues = Catalogues::new();
        let messages = catalogues.domain_mut("messages");
        messages.entry(TranslationKey::new(None, "X"));
        messages.entry(TranslationKey::new(Some("C".into()), "X"));

        let out = PotDumper::default()
            .format(&catalogue(&catalogues), "messages")
            .unwrap();
        assert_eq!(out.matches("msgid \"X\"").count(), 2);
        assert_eq!(out.matches("msgctxt \"C\"").count(), 1);
    }

    #[test]
    fn test_prefix_looking_plain_entry_keeps_context_entry() {
        let mut catalogues = Catalogues::new();
        let messages = catalogues.domain_mut("messages");
        messages
            .entry(TranslationKey::new(Some("menu".into()), "Open"))
            .add_reference("a.twig", 1);
        messages
            .entry(TranslationKey::new(None, "HAS_CONTEXT0::Open"))
            .add_reference("b.twig", 2);

        let out = PotDumper::default()
            .format(&catalogue(&catalogues), "messages")
            .unwrap();
        assert!(out.contains("#: a.twig:1\nmsgctxt \"menu\"\nmsgid \"Open\"\n"));
        assert!(out.contains("#: b.twig:2\nmsgid \"HAS_CONTEXT0::Open\"\n"));
    }

    /// A store without metadata support.
    struct PlainStore(Vec<(String, String)>);

    impl MessageStore for PlainStore {
        fn locale(&self) -> &str {
            "en"
        }

        fn has(&self, key: &str, _domain: &str) -> bool {
            self.0.iter().any(|(k, _)| k == key)
        }

        fn all(&self, _domain: &str) -> Vec<(&str, &str)> {
            self.0.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
        }
    }

    #[test]
    fn test_store_without_metadata() {
        let store = PlainStore(vec![("Hello".into(), "Hello".into())]);
        let out = PotDumper::default().format(&store, "messages").unwrap();
        assert_eq!(out, format!("{}msgid \"Hello\"\nmsgstr \"\"\n", HEADER));
    }

    #[test]
    fn test_interval_id_is_plain_entry() {
        let mut catalogue = MessageCatalogue::new("en");
        catalogue.set("{0} none|[1,Inf[ some", "{0} none|[1,Inf[ some", "messages");
        let out = PotDumper::default().format(&catalogue, "messages").unwrap();
        assert!(out.ends_with("msgid \"{0} none|[1,Inf[ some\"\nmsgstr \"\"\n"));
    }

    #[test]
    fn test_escape() {
        insta::assert_snapshot!(escape("say \"hi\"\\now"), @r#"say \"hi\"\\now"#);
        assert_eq!(escape("a\nb\tc\r\x07\x08\x0B\x0C"), "a\\nb\\tc\\r\\a\\b\\v\\f");
        assert_eq!(escape("nul\0esc\x1b"), "nul\\000esc\\033");
    }

    #[test]
    fn test_dump_writes_one_file_per_domain() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalogue = MessageCatalogue::new("fr");
        catalogue.set("a", "a", "messages");
        catalogue.set("b", "b", "errors");

        let written = PotDumper::default().dump(&catalogue, dir.path()).unwrap();
        assert_eq!(
            written,
            vec![dir.path().join("errors.pot"), dir.path().join("messages.pot")]
        );
        let content = std::fs::read_to_string(dir.path().join("errors.pot")).unwrap();
        assert!(content.contains("\"Language: fr\\n\""));
        assert!(content.ends_with("msgid \"b\"\nmsgstr \"\"\n"));
    }
}
