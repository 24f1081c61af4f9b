//! Repository layer: the Record Store behind the Buch services

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Buch, BuchData, BuchFilter, UniqueField};

pub use memory::InMemoryBuchRepository;
pub use postgres::PgBuchRepository;

/// Failures reported by a Record Store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Another write moved the version between check and persist
    #[error("Version conflict on Buch {id}: expected version {expected}")]
    VersionConflict { id: Uuid, expected: i32 },

    /// A unique constraint was hit by a concurrent insert or replace
    #[error("Duplicate {} value: {value}", .field.column())]
    Duplicate { field: UniqueField, value: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence of Buch records with version stamping
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuchRepository: Send + Sync {
    /// Every record, ordered by titel
    async fn find_all(&self) -> StoreResult<Vec<Buch>>;

    /// Records matching `filter`, ordered by titel
    async fn find(&self, filter: &BuchFilter) -> StoreResult<Vec<Buch>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Buch>>;

    /// Identifier of the record holding `value` in a unique field
    async fn find_id_by_field(&self, field: UniqueField, value: &str) -> StoreResult<Option<Uuid>>;

    async fn exists_by_field(&self, field: UniqueField, value: &str) -> StoreResult<bool> {
        Ok(self.find_id_by_field(field, value).await?.is_some())
    }

    /// Store a new record with a fresh identifier and version 0
    async fn insert(&self, data: &BuchData) -> StoreResult<Buch>;

    /// Replace the record if its version still equals `expected_version`,
    /// incrementing the version. `Ok(None)` if no such record exists.
    async fn replace(&self, id: Uuid, expected_version: i32, data: &BuchData) -> StoreResult<Option<Buch>>;

    /// Remove the record, returning whether one was removed
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Remove every record, returning how many were removed
    async fn delete_all(&self) -> StoreResult<u64>;

    /// Check the store is reachable
    async fn ping(&self) -> StoreResult<()>;
}
