//! Validation of Buch payloads: ISBN check digits and the closed field schema

pub mod isbn;
pub mod schema;

pub use isbn::{is_valid_isbn, normalize_isbn};
pub use schema::BuchSchema;
