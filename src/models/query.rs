//! Search filter built from REST query parameters

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use super::buch::{Buch, BuchField};

/// Titles shorter than this are matched as case-insensitive substrings,
/// longer ones exactly
pub const TITEL_REGEX_MAX_LEN: usize = 10;

const KEYWORD_FLAGS: [(&str, &str); 2] = [("javascript", "JAVASCRIPT"), ("typescript", "TYPESCRIPT")];

/// A single filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-insensitive substring match on titel
    TitelContains(String),
    /// Exact value of a field, compared in its textual form
    Equals { field: BuchField, value: String },
    /// Every listed keyword must be present
    Schlagwoerter(Vec<String>),
    /// Parameter naming no stored field; matches no record
    Unmatched(String),
}

/// Filter expression handed to the Record Store's find operation
#[derive(Debug, Clone, PartialEq)]
pub enum BuchFilter {
    /// Unconditional fetch-all
    All,
    /// Conjunction of conditions; an empty list matches every record
    Where(Vec<Condition>),
}

impl BuchFilter {
    /// Translate raw query parameters into a filter.
    ///
    /// An empty mapping short-circuits to [`BuchFilter::All`]. Empty values are
    /// treated as absent. A non-empty parameter that names no stored field
    /// still constrains the search, so it matches nothing.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        if params.is_empty() {
            return BuchFilter::All;
        }

        let mut conditions = Vec::new();
        let mut keywords: Option<Vec<String>> = None;

        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();

        for key in keys {
            let value = &params[key];
            match key.as_str() {
                "javascript" | "typescript" => {}
                "schlagwoerter" => {
                    if !value.is_empty() {
                        keywords = Some(vec![value.clone()]);
                    }
                }
                "titel" => {
                    if value.is_empty() {
                        continue;
                    }
                    if value.chars().count() < TITEL_REGEX_MAX_LEN {
                        conditions.push(Condition::TitelContains(value.clone()));
                    } else {
                        conditions.push(Condition::Equals {
                            field: BuchField::Titel,
                            value: value.clone(),
                        });
                    }
                }
                other => match other.parse::<BuchField>() {
                    Ok(field) if !value.is_empty() => {
                        conditions.push(Condition::Equals {
                            field,
                            value: value.clone(),
                        });
                    }
                    Ok(_) => {}
                    Err(_) if value.is_empty() => {}
                    Err(_) => {
                        tracing::debug!("BuchFilter: unknown parameter {}", other);
                        conditions.push(Condition::Unmatched(other.to_string()));
                    }
                },
            }
        }

        let flagged: Vec<String> = KEYWORD_FLAGS
            .iter()
            .filter(|(param, _)| params.get(*param).map(String::as_str) == Some("true"))
            .map(|(_, keyword)| keyword.to_string())
            .collect();

        if !flagged.is_empty() {
            conditions.push(Condition::Schlagwoerter(flagged));
        } else if let Some(mut existing) = keywords {
            // no flag set: an existing keyword filter is emptied so it matches broadly
            existing.clear();
            conditions.push(Condition::Schlagwoerter(existing));
        }

        BuchFilter::Where(conditions)
    }

    /// Evaluate the filter against a stored book
    pub fn matches(&self, buch: &Buch) -> bool {
        match self {
            BuchFilter::All => true,
            BuchFilter::Where(conditions) => conditions.iter().all(|c| c.matches(buch)),
        }
    }

    /// Keyword list of this filter, empty if none
    pub fn schlagwoerter(&self) -> &[String] {
        if let BuchFilter::Where(conditions) = self {
            for condition in conditions {
                if let Condition::Schlagwoerter(keywords) = condition {
                    return keywords;
                }
            }
        }
        &[]
    }
}

impl Condition {
    pub fn matches(&self, buch: &Buch) -> bool {
        match self {
            Condition::TitelContains(needle) => titel_regex(needle)
                .map(|re| re.is_match(&buch.titel))
                .unwrap_or(false),
            Condition::Equals { field, value } => {
                field.text_of(buch).as_deref() == Some(value.as_str())
            }
            Condition::Schlagwoerter(keywords) => keywords
                .iter()
                .all(|keyword| buch.schlagwoerter.contains(keyword)),
            Condition::Unmatched(_) => false,
        }
    }
}

/// Case-insensitive Unicode pattern matching `needle` literally
pub fn titel_regex(needle: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .unicode(true)
        .build()
        .ok()
}
