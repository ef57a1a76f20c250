//! Standard pluralisation rules.
//!
//! A pluralised message is written as `singular|plural`. A literal pipe is
//! written `||`. Interval rules such as `{0} none|[1,Inf[ some` are not
//! supported.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::PluralisationError;

static PIPES_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|+$").expect("valid regex"));

static RULE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\|\||[^|])+").expect("valid regex"));

static INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)^(?:\{\s*-?\d+(?:\.\d+)?[\s*,\-?\d+(.)]*\s*\}|[\[\]]\s*(?:-Inf|-?\d+(?:\.\d+)?)\s*,\s*(?:\+?Inf|-?\d+(?:\.\d+)?)\s*[\[\]])",
    )
    .expect("valid regex")
});

/// Split `id` into its standard rules.
///
/// Fails when any alternative is an interval rule.
pub fn standard_rules(id: &str) -> Result<Vec<String>, PluralisationError> {
    let parts: Vec<&str> = if PIPES_ONLY.is_match(id) {
        id.split('|').collect()
    } else {
        RULE_PART.find_iter(id).map(|m| m.as_str()).collect()
    };

    parts
        .into_iter()
        .map(|part| {
            let part = trim(&part.replace("||", "|")).to_string();
            if INTERVAL.is_match(&part) {
                Err(PluralisationError::IntervalRule)
            } else {
                Ok(part)
            }
        })
        .collect()
}

/// Split a plural message body into its singular and plural forms.
pub fn split_plural(body: &str) -> Result<(String, String), PluralisationError> {
    let mut rules = standard_rules(body)?;
    if rules.len() != 2 {
        return Err(PluralisationError::AlternativeCount(rules.len()));
    }
    let plural = rules.pop().unwrap_or_default();
    let singular = rules.pop().unwrap_or_default();
    Ok((singular, plural))
}

/// Join a singular and plural form into one rule string, escaping pipes.
pub fn join_rules(singular: &str, plural: &str) -> String {
    format!("{}|{}", escape_rule(singular), escape_rule(plural))
}

pub fn escape_rule(rule: &str) -> String {
    rule.replace('|', "||")
}

/// Trim the characters PHP's `trim` strips by default.
fn trim(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
}
