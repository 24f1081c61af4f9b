//! Data models for the Buch catalogue

pub mod buch;
pub mod enums;
pub mod query;

// Re-export commonly used types
pub use buch::{Buch, BuchData, BuchField, BuchInput, UniqueField};
pub use enums::{BuchArt, Verlag};
pub use query::{BuchFilter, Condition};
