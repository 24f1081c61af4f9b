//! Schema validation of candidate Buch payloads.
//!
//! One closed rule set with two configurations: [`BuchSchema::CREATE`]
//! requires `isbn`, [`BuchSchema::UPDATE`] does not (the ISBN is kept
//! immutable by the update protocol, not here). Validity means zero messages.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use validator::ValidateUrl;

use super::isbn::is_valid_isbn;
use crate::models::enums::{BuchArt, Verlag};

pub const MAX_RATING: i64 = 5;

static TITEL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w").expect("valid titel regex"));

/// Constraint attached to a property
#[derive(Debug, Clone, Copy)]
enum Rule {
    Id,
    Version,
    Titel,
    Rating,
    Art,
    Verlag,
    Preis,
    Rabatt,
    Lieferbar,
    Datum,
    Isbn,
    Homepage,
    Schlagwoerter,
}

/// Known properties in declaration order, with their violation message
const PROPERTIES: [(&str, Rule, &str); 13] = [
    ("id", Rule::Id, "Die ID muss eine Zeichenkette sein."),
    ("version", Rule::Version, "Die Versionsnummer muss mindestens 0 sein."),
    (
        "titel",
        Rule::Titel,
        "Ein Buchtitel muss mit einem Buchstaben, einer Ziffer oder _ beginnen.",
    ),
    ("rating", Rule::Rating, "Eine Bewertung muss zwischen 0 und 5 liegen."),
    ("art", Rule::Art, "Die Art eines Buches muss KINDLE oder DRUCKAUSGABE sein."),
    (
        "verlag",
        Rule::Verlag,
        "Der Verlag eines Buches muss FOO_VERLAG oder BAR_VERLAG sein.",
    ),
    ("preis", Rule::Preis, "Der Preis darf nicht negativ sein."),
    ("rabatt", Rule::Rabatt, "Der Rabatt muss ein Wert zwischen 0 und 1 sein."),
    (
        "lieferbar",
        Rule::Lieferbar,
        "\"lieferbar\" muss auf true oder false gesetzt sein.",
    ),
    ("datum", Rule::Datum, "Das Datum muss im Format yyyy-MM-dd sein."),
    ("isbn", Rule::Isbn, "Die ISBN-Nummer ist nicht korrekt."),
    ("homepage", Rule::Homepage, "Die Homepage ist nicht korrekt."),
    (
        "schlagwoerter",
        Rule::Schlagwoerter,
        "Die Schlagwoerter muessen eine Liste von Zeichenketten sein.",
    ),
];

/// A configuration of the Buch rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuchSchema {
    required: &'static [&'static str],
}

impl BuchSchema {
    /// New records: the ISBN must be supplied
    pub const CREATE: BuchSchema = BuchSchema {
        required: &["titel", "art", "verlag", "isbn"],
    };

    /// Full replacement of an existing record
    pub const UPDATE: BuchSchema = BuchSchema {
        required: &["titel", "art", "verlag"],
    };

    /// Validate `candidate`, returning human-readable violations in a stable order
    pub fn validate(&self, candidate: &Value) -> Vec<String> {
        let Some(object) = candidate.as_object() else {
            return vec!["Ein Buch muss ein JSON-Objekt sein.".to_string()];
        };

        let mut messages = Vec::new();

        for name in self.required {
            if present(object, name).is_none() {
                messages.push(format!("\"{}\" ist ein Pflichtfeld.", name));
            }
        }

        for key in object.keys() {
            if !PROPERTIES.iter().any(|(name, _, _)| name == key) {
                messages.push(format!(
                    "\"{}\" ist keine zulaessige Eigenschaft eines Buches.",
                    key
                ));
            }
        }

        for (name, rule, message) in PROPERTIES.iter() {
            if let Some(value) = present(object, name) {
                if !rule.accepts(value) {
                    messages.push(message.to_string());
                }
            }
        }

        tracing::debug!("BuchSchema.validate: messages={:?}", messages);
        messages
    }
}

/// `null` counts as absent
fn present<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|v| !v.is_null())
}

impl Rule {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            Rule::Id => value.is_string(),
            Rule::Version => value.as_u64().is_some_and(|v| v <= i32::MAX as u64),
            Rule::Titel => value.as_str().is_some_and(|s| TITEL_PATTERN.is_match(s)),
            Rule::Rating => value
                .as_i64()
                .is_some_and(|r| (0..=MAX_RATING).contains(&r)),
            Rule::Art => value
                .as_str()
                .is_some_and(|s| BuchArt::ALL.iter().any(|a| a.as_str() == s)),
            Rule::Verlag => value
                .as_str()
                .is_some_and(|s| Verlag::ALL.iter().any(|v| v.as_str() == s)),
            Rule::Preis => value.as_f64().is_some_and(|p| p >= 0.0),
            Rule::Rabatt => value.as_f64().is_some_and(|r| r > 0.0 && r < 1.0),
            Rule::Lieferbar => value.is_boolean(),
            Rule::Datum => value
                .as_str()
                .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
            Rule::Isbn => value.as_str().is_some_and(is_valid_isbn),
            Rule::Homepage => value
                .as_str()
                .is_some_and(|s| s.to_string().validate_url()),
            Rule::Schlagwoerter => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}
