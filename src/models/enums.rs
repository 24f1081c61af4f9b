//! Shared domain enums, stored as their upper-case text codes

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};

// ---------------------------------------------------------------------------
// BuchArt
// ---------------------------------------------------------------------------

/// Edition type of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuchArt {
    Druckausgabe,
    Kindle,
}

impl BuchArt {
    pub const ALL: [BuchArt; 2] = [BuchArt::Druckausgabe, BuchArt::Kindle];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuchArt::Druckausgabe => "DRUCKAUSGABE",
            BuchArt::Kindle => "KINDLE",
        }
    }
}

impl std::str::FromStr for BuchArt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRUCKAUSGABE" => Ok(BuchArt::Druckausgabe),
            "KINDLE" => Ok(BuchArt::Kindle),
            _ => Err(format!("Invalid Buch art: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Verlag
// ---------------------------------------------------------------------------

/// Publisher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verlag {
    FooVerlag,
    BarVerlag,
}

impl Verlag {
    pub const ALL: [Verlag; 2] = [Verlag::FooVerlag, Verlag::BarVerlag];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verlag::FooVerlag => "FOO_VERLAG",
            Verlag::BarVerlag => "BAR_VERLAG",
        }
    }
}

impl std::str::FromStr for Verlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FOO_VERLAG" => Ok(Verlag::FooVerlag),
            "BAR_VERLAG" => Ok(Verlag::BarVerlag),
            _ => Err(format!("Invalid Verlag: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Display + SQLx conversion (TEXT columns)
// ---------------------------------------------------------------------------

macro_rules! text_enum {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_enum!(BuchArt);
text_enum!(Verlag);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_art_codes() {
        assert_eq!("KINDLE".parse::<BuchArt>(), Ok(BuchArt::Kindle));
        assert!("kindle".parse::<BuchArt>().is_err());
        assert_eq!(BuchArt::Druckausgabe.to_string(), "DRUCKAUSGABE");
    }

    #[test]
    fn test_verlag_serde() {
        let json = serde_json::to_string(&Verlag::BarVerlag).unwrap();
        assert_eq!(json, "\"BAR_VERLAG\"");
        let verlag: Verlag = serde_json::from_str("\"FOO_VERLAG\"").unwrap();
        assert_eq!(verlag, Verlag::FooVerlag);
    }
}
