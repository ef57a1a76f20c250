//! transcat - translation message extraction for Twig-style templates
//!
//! Finds translatable messages in templates (the `trans` tag and filter) and
//! in JavaScript/TypeScript `translate()` calls, aggregates them per domain
//! and writes gettext POT files. The same extension resolves messages at
//! render time through a gettext-style lookup.
//!
//! ## Module Structure
//!
//! - `template`: Minimal template engine hosting the translation extension
//! - `extension`: The `trans` tag, the `trans` filter and plural rules
//! - `extract`: Extractors turning files into catalogues
//! - `catalogue`: Catalogues, contextualised keys and the POT dumper
//! - `translator`: Runtime message resolution
//! - `config`: Configuration file loading and parsing
//! - `cli`: Command-line interface layer

pub mod catalogue;
pub mod cli;
pub mod config;
pub mod error;
pub mod extension;
pub mod extract;
pub mod template;
pub mod translator;
