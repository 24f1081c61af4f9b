//! Reset the store to the known test records

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{BuchArt, BuchData, Verlag},
    repository::BuchRepository,
};

struct Testbuch {
    titel: &'static str,
    rating: i16,
    art: BuchArt,
    verlag: Verlag,
    preis: f64,
    rabatt: f64,
    datum: (i32, u32, u32),
    isbn: &'static str,
    homepage: &'static str,
    schlagwoerter: &'static [&'static str],
}

const TESTDATEN: [Testbuch; 5] = [
    Testbuch {
        titel: "Alpha",
        rating: 4,
        art: BuchArt::Druckausgabe,
        verlag: Verlag::FooVerlag,
        preis: 11.1,
        rabatt: 0.011,
        datum: (2021, 2, 1),
        isbn: "9783897225831",
        homepage: "https://acme.at/",
        schlagwoerter: &["JAVASCRIPT"],
    },
    Testbuch {
        titel: "Beta",
        rating: 2,
        art: BuchArt::Kindle,
        verlag: Verlag::BarVerlag,
        preis: 22.2,
        rabatt: 0.022,
        datum: (2021, 2, 2),
        isbn: "9783827315526",
        homepage: "https://acme.biz/",
        schlagwoerter: &["TYPESCRIPT"],
    },
    Testbuch {
        titel: "Gamma",
        rating: 1,
        art: BuchArt::Druckausgabe,
        verlag: Verlag::FooVerlag,
        preis: 33.3,
        rabatt: 0.033,
        datum: (2021, 2, 3),
        isbn: "9780201633610",
        homepage: "https://acme.com/",
        schlagwoerter: &["JAVASCRIPT", "TYPESCRIPT"],
    },
    Testbuch {
        titel: "Delta",
        rating: 3,
        art: BuchArt::Druckausgabe,
        verlag: Verlag::BarVerlag,
        preis: 44.4,
        rabatt: 0.044,
        datum: (2021, 2, 4),
        isbn: "9780387534060",
        homepage: "https://acme.de/",
        schlagwoerter: &[],
    },
    Testbuch {
        titel: "Epsilon",
        rating: 2,
        art: BuchArt::Kindle,
        verlag: Verlag::FooVerlag,
        preis: 55.5,
        rabatt: 0.055,
        datum: (2021, 2, 5),
        isbn: "9783824404810",
        homepage: "https://acme.es/",
        schlagwoerter: &["TYPESCRIPT"],
    },
];

impl Testbuch {
    fn data(&self) -> BuchData {
        let (year, month, day) = self.datum;
        BuchData {
            titel: self.titel.to_string(),
            rating: Some(self.rating),
            art: self.art,
            verlag: self.verlag,
            preis: Some(self.preis),
            rabatt: Some(self.rabatt),
            lieferbar: Some(true),
            datum: NaiveDate::from_ymd_opt(year, month, day),
            isbn: self.isbn.to_string(),
            homepage: Some(self.homepage.to_string()),
            schlagwoerter: self.schlagwoerter.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The test records, as they are inserted by [`populate`]
pub fn testdaten() -> Vec<BuchData> {
    TESTDATEN.iter().map(Testbuch::data).collect()
}

/// Delete every record and insert the test records, returning how many were inserted
pub async fn populate(repository: &dyn BuchRepository) -> AppResult<usize> {
    let removed = repository.delete_all().await?;
    tracing::warn!("{} Datensaetze wurden geloescht.", removed);

    let testdaten = testdaten();
    for data in &testdaten {
        repository.insert(data).await?;
    }
    tracing::warn!("{} Datensaetze wurden eingefuegt.", testdaten.len());
    Ok(testdaten.len())
}
