//! gettext-family dispatch.
//!
//! A translation request carries an optional domain, an optional context and
//! an optional plural/count pair. Each combination maps to one of the eight
//! gettext functions, named `d?n?p?gettext`, whose positional arguments are
//! ordered `[domain] [context] original [plural, count]`.

use std::fmt;

/// Backend able to answer gettext lookups for the active locale.
///
/// Every function returns the translated string, falling back to `original`
/// (or `plural` when `n != 1`) when no translation exists.
pub trait GettextLookup {
    fn set_locale(&mut self, locale: &str);

    fn gettext(&self, original: &str) -> String;

    fn pgettext(&self, context: &str, original: &str) -> String;

    fn ngettext(&self, original: &str, plural: &str, n: u64) -> String;

    fn npgettext(&self, context: &str, original: &str, plural: &str, n: u64) -> String;

    fn dgettext(&self, domain: &str, original: &str) -> String;

    fn dpgettext(&self, domain: &str, context: &str, original: &str) -> String;

    fn dngettext(&self, domain: &str, original: &str, plural: &str, n: u64) -> String;

    fn dnpgettext(
        &self,
        domain: &str,
        context: &str,
        original: &str,
        plural: &str,
        n: u64,
    ) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GettextFunction {
    Gettext,
    Pgettext,
    Ngettext,
    Npgettext,
    Dgettext,
    Dpgettext,
    Dngettext,
    Dnpgettext,
}

impl GettextFunction {
    /// Pick the function for the arguments that are present.
    pub fn select(domain: bool, count: bool, context: bool) -> Self {
        match (domain, count, context) {
            (false, false, false) => GettextFunction::Gettext,
            (false, false, true) => GettextFunction::Pgettext,
            (false, true, false) => GettextFunction::Ngettext,
            (false, true, true) => GettextFunction::Npgettext,
            (true, false, false) => GettextFunction::Dgettext,
            (true, false, true) => GettextFunction::Dpgettext,
            (true, true, false) => GettextFunction::Dngettext,
            (true, true, true) => GettextFunction::Dnpgettext,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GettextFunction::Gettext => "gettext",
            GettextFunction::Pgettext => "pgettext",
            GettextFunction::Ngettext => "ngettext",
            GettextFunction::Npgettext => "npgettext",
            GettextFunction::Dgettext => "dgettext",
            GettextFunction::Dpgettext => "dpgettext",
            GettextFunction::Dngettext => "dngettext",
            GettextFunction::Dnpgettext => "dnpgettext",
        }
    }
}

impl fmt::Display for GettextFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One resolved gettext call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupCall<'a> {
    Gettext {
        original: &'a str,
    },
    Pgettext {
        context: &'a str,
        original: &'a str,
    },
    Ngettext {
        original: &'a str,
        plural: &'a str,
        count: u64,
    },
    Npgettext {
        context: &'a str,
        original: &'a str,
        plural: &'a str,
        count: u64,
    },
    Dgettext {
        domain: &'a str,
        original: &'a str,
    },
    Dpgettext {
        domain: &'a str,
        context: &'a str,
        original: &'a str,
    },
    Dngettext {
        domain: &'a str,
        original: &'a str,
        plural: &'a str,
        count: u64,
    },
    Dnpgettext {
        domain: &'a str,
        context: &'a str,
        original: &'a str,
        plural: &'a str,
        count: u64,
    },
}

impl<'a> LookupCall<'a> {
    /// Build the call for a translation request.
    ///
    /// A count without plural text uses `original` as the plural form.
    pub fn new(
        domain: Option<&'a str>,
        context: Option<&'a str>,
        original: &'a str,
        plural: Option<&'a str>,
        count: Option<u64>,
    ) -> Self {
        let plural = plural.unwrap_or(original);
        match (domain, count, context) {
            (None, None, None) => LookupCall::Gettext { original },
            (None, None, Some(context)) => LookupCall::Pgettext { context, original },
            (None, Some(count), None) => LookupCall::Ngettext {
                original,
                plural,
                count,
            },
            (None, Some(count), Some(context)) => LookupCall::Npgettext {
                context,
                original,
                plural,
                count,
            },
            (Some(domain), None, None) => LookupCall::Dgettext { domain, original },
            (Some(domain), None, Some(context)) => LookupCall::Dpgettext {
                domain,
                context,
                original,
            },
            (Some(domain), Some(count), None) => LookupCall::Dngettext {
                domain,
                original,
                plural,
                count,
            },
            (Some(domain), Some(count), Some(context)) => LookupCall::Dnpgettext {
                domain,
                context,
                original,
                plural,
                count,
            },
        }
    }

    pub fn function(&self) -> GettextFunction {
        match self {
            LookupCall::Gettext { .. } => GettextFunction::Gettext,
            LookupCall::Pgettext { .. } => GettextFunction::Pgettext,
            LookupCall::Ngettext { .. } => GettextFunction::Ngettext,
            LookupCall::Npgettext { .. } => GettextFunction::Npgettext,
            LookupCall::Dgettext { .. } => GettextFunction::Dgettext,
            LookupCall::Dpgettext { .. } => GettextFunction::Dpgettext,
            LookupCall::Dngettext { .. } => GettextFunction::Dngettext,
            LookupCall::Dnpgettext { .. } => GettextFunction::Dnpgettext,
        }
    }

    /// Positional arguments in call order, rendered as strings.
    pub fn arguments(&self) -> Vec<String> {
        match *self {
            LookupCall::Gettext { original } => vec![original.into()],
            LookupCall::Pgettext { context, original } => vec![context.into(), original.into()],
            LookupCall::Ngettext {
                original,
                plural,
                count,
            } => vec![original.into(), plural.into(), count.to_string()],
            LookupCall::Npgettext {
                context,
                original,
                plural,
                count,
            } => vec![
                context.into(),
                original.into(),
                plural.into(),
                count.to_string(),
            ],
            LookupCall::Dgettext { domain, original } => vec![domain.into(), original.into()],
            LookupCall::Dpgettext {
                domain,
                context,
                original,
            } => vec![domain.into(), context.into(), original.into()],
            LookupCall::Dngettext {
                domain,
                original,
                plural,
                count,
            } => vec![
                domain.into(),
                original.into(),
                plural.into(),
                count.to_string(),
            ],
            LookupCall::Dnpgettext {
                domain,
                context,
                original,
                plural,
                count,
            } => vec![
                domain.into(),
                context.into(),
                original.into(),
                plural.into(),
                count.to_string(),
            ],
        }
    }

    pub fn invoke(&self, lookup: &dyn GettextLookup) -> String {
        match *self {
            LookupCall::Gettext { original } => lookup.gettext(original),
            LookupCall::Pgettext { context, original } => lookup.pgettext(context, original),
            LookupCall::Ngettext {
                original,
                plural,
                count,
            } => lookup.ngettext(original, plural, count),
            LookupCall::Npgettext {
                context,
                original,
                plural,
                count,
            } => lookup.npgettext(context, original, plural, count),
            LookupCall::Dgettext { domain, original } => lookup.dgettext(domain, original),
            LookupCall::Dpgettext {
                domain,
                context,
                original,
            } => lookup.dpgettext(domain, context, original),
            LookupCall::Dngettext {
                domain,
                original,
                plural,
                count,
            } => lookup.dngettext(domain, original, plural, count),
            LookupCall::Dnpgettext {
                domain,
                context,
                original,
                plural,
                count,
            } => lookup.dnpgettext(domain, context, original, plural, count),
        }
    }
}
