//! Buch (catalogue entry) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::enums::{BuchArt, Verlag};

/// Stored book, as returned by the Record Store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Buch {
    pub id: Uuid,
    /// Optimistic-concurrency counter, 0 at creation
    pub version: i32,
    pub titel: String,
    pub rating: Option<i16>,
    pub art: BuchArt,
    pub verlag: Verlag,
    pub preis: Option<f64>,
    pub rabatt: Option<f64>,
    pub lieferbar: Option<bool>,
    pub datum: Option<NaiveDate>,
    pub isbn: String,
    pub homepage: Option<String>,
    pub schlagwoerter: Vec<String>,
    pub erzeugt: DateTime<Utc>,
    pub aktualisiert: DateTime<Utc>,
}

impl Buch {
    /// Persistable fields of this book
    pub fn data(&self) -> BuchData {
        BuchData {
            titel: self.titel.clone(),
            rating: self.rating,
            art: self.art,
            verlag: self.verlag,
            preis: self.preis,
            rabatt: self.rabatt,
            lieferbar: self.lieferbar,
            datum: self.datum,
            isbn: self.isbn.clone(),
            homepage: self.homepage.clone(),
            schlagwoerter: self.schlagwoerter.clone(),
        }
    }
}

/// Fields written by insert and replace; id, version and timestamps belong to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuchData {
    pub titel: String,
    pub rating: Option<i16>,
    pub art: BuchArt,
    pub verlag: Verlag,
    pub preis: Option<f64>,
    pub rabatt: Option<f64>,
    pub lieferbar: Option<bool>,
    pub datum: Option<NaiveDate>,
    pub isbn: String,
    pub homepage: Option<String>,
    pub schlagwoerter: Vec<String>,
}

/// Candidate payload after it passed the schema validator.
///
/// `isbn` is optional because update payloads need not repeat it; `id` and
/// `version` may be echoed back by clients and are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BuchInput {
    pub titel: String,
    #[serde(default)]
    pub rating: Option<i16>,
    pub art: BuchArt,
    pub verlag: Verlag,
    #[serde(default)]
    pub preis: Option<f64>,
    #[serde(default)]
    pub rabatt: Option<f64>,
    #[serde(default)]
    pub lieferbar: Option<bool>,
    #[serde(default)]
    pub datum: Option<NaiveDate>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub schlagwoerter: Option<Vec<String>>,
}

impl BuchInput {
    /// Combine with the ISBN that will actually be persisted
    pub fn into_data(self, isbn: String) -> BuchData {
        BuchData {
            titel: self.titel,
            rating: self.rating,
            art: self.art,
            verlag: self.verlag,
            preis: self.preis,
            rabatt: self.rabatt,
            lieferbar: self.lieferbar,
            datum: self.datum,
            isbn,
            homepage: self.homepage,
            schlagwoerter: self.schlagwoerter.unwrap_or_default(),
        }
    }
}

/// Field addressable by an equality filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuchField {
    Id,
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
}

impl BuchField {
    /// Column name in the `buch` table (also the JSON property name)
    pub fn column(&self) -> &'static str {
        match self {
            BuchField::Id => "id",
            BuchField::Titel => "titel",
            BuchField::Rating => "rating",
            BuchField::Art => "art",
            BuchField::Verlag => "verlag",
            BuchField::Preis => "preis",
            BuchField::Rabatt => "rabatt",
            BuchField::Lieferbar => "lieferbar",
            BuchField::Datum => "datum",
            BuchField::Isbn => "isbn",
            BuchField::Homepage => "homepage",
        }
    }

    /// Textual value of this field on `buch`, in the same rendering Postgres
    /// uses for `column::text`
    pub fn text_of(&self, buch: &Buch) -> Option<String> {
        match self {
            BuchField::Id => Some(buch.id.to_string()),
            BuchField::Titel => Some(buch.titel.clone()),
            BuchField::Rating => buch.rating.map(|r| r.to_string()),
            BuchField::Art => Some(buch.art.to_string()),
            BuchField::Verlag => Some(buch.verlag.to_string()),
            BuchField::Preis => buch.preis.map(|p| p.to_string()),
            BuchField::Rabatt => buch.rabatt.map(|r| r.to_string()),
            BuchField::Lieferbar => buch.lieferbar.map(|l| l.to_string()),
            BuchField::Datum => buch.datum.map(|d| d.format("%Y-%m-%d").to_string()),
            BuchField::Isbn => Some(buch.isbn.clone()),
            BuchField::Homepage => buch.homepage.clone(),
        }
    }
}

impl std::str::FromStr for BuchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(BuchField::Id),
            "titel" => Ok(BuchField::Titel),
            "rating" => Ok(BuchField::Rating),
            "art" => Ok(BuchField::Art),
            "verlag" => Ok(BuchField::Verlag),
            "preis" => Ok(BuchField::Preis),
            "rabatt" => Ok(BuchField::Rabatt),
            "lieferbar" => Ok(BuchField::Lieferbar),
            "datum" => Ok(BuchField::Datum),
            "isbn" => Ok(BuchField::Isbn),
            "homepage" => Ok(BuchField::Homepage),
            _ => Err(format!("Unknown Buch field: {}", s)),
        }
    }
}

/// Fields with a uniqueness constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Titel,
    Isbn,
}

impl UniqueField {
    pub fn column(&self) -> &'static str {
        match self {
            UniqueField::Titel => "titel",
            UniqueField::Isbn => "isbn",
        }
    }

    pub fn value_of<'a>(&self, data: &'a BuchData) -> &'a str {
        match self {
            UniqueField::Titel => &data.titel,
            UniqueField::Isbn => &data.isbn,
        }
    }
}
