//! In-memory Record Store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BuchRepository, StoreError, StoreResult};
use crate::models::{Buch, BuchData, BuchFilter, UniqueField};

/// Record Store kept in process memory; same semantics as the Postgres store
#[derive(Default)]
pub struct InMemoryBuchRepository {
    buecher: RwLock<HashMap<Uuid, Buch>>,
}

impl InMemoryBuchRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Byte-wise titel order, as the Postgres store sorts with `COLLATE "C"`
fn sorted(mut buecher: Vec<Buch>) -> Vec<Buch> {
    buecher.sort_by(|a, b| a.titel.cmp(&b.titel));
    buecher
}

/// First unique field of `data` already held by a record other than `except`
fn duplicate_of(
    buecher: &HashMap<Uuid, Buch>,
    data: &BuchData,
    except: Option<Uuid>,
) -> Option<StoreError> {
    [UniqueField::Titel, UniqueField::Isbn]
        .into_iter()
        .find(|field| {
            let value = field.value_of(data);
            buecher
                .values()
                .any(|b| Some(b.id) != except && field.value_of(&b.data()) == value)
        })
        .map(|field| StoreError::Duplicate {
            field,
            value: field.value_of(data).to_string(),
        })
}

#[async_trait]
impl BuchRepository for InMemoryBuchRepository {
    async fn find_all(&self) -> StoreResult<Vec<Buch>> {
        let buecher = self.buecher.read().await;
        Ok(sorted(buecher.values().cloned().collect()))
    }

    async fn find(&self, filter: &BuchFilter) -> StoreResult<Vec<Buch>> {
        let buecher = self.buecher.read().await;
        Ok(sorted(
            buecher.values().filter(|b| filter.matches(b)).cloned().collect(),
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Buch>> {
        Ok(self.buecher.read().await.get(&id).cloned())
    }

    async fn find_id_by_field(&self, field: UniqueField, value: &str) -> StoreResult<Option<Uuid>> {
        let buecher = self.buecher.read().await;
        Ok(buecher
            .values()
            .find(|b| match field {
                UniqueField::Titel => b.titel == value,
                UniqueField::Isbn => b.isbn == value,
            })
            .map(|b| b.id))
    }

    async fn insert(&self, data: &BuchData) -> StoreResult<Buch> {
        let mut buecher = self.buecher.write().await;
        if let Some(err) = duplicate_of(&buecher, data, None) {
            return Err(err);
        }

        let now = Utc::now();
        let buch = Buch {
            id: Uuid::new_v4(),
            version: 0,
            titel: data.titel.clone(),
            rating: data.rating,
            art: data.art,
            verlag: data.verlag,
            preis: data.preis,
            rabatt: data.rabatt,
            lieferbar: data.lieferbar,
            datum: data.datum,
            isbn: data.isbn.clone(),
            homepage: data.homepage.clone(),
            schlagwoerter: data.schlagwoerter.clone(),
            erzeugt: now,
            aktualisiert: now,
        };
        buecher.insert(buch.id, buch.clone());
        Ok(buch)
    }

    async fn replace(&self, id: Uuid, expected_version: i32, data: &BuchData) -> StoreResult<Option<Buch>> {
        let mut buecher = self.buecher.write().await;
        let Some(current) = buecher.get(&id) else {
            return Ok(None);
        };
        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
            });
        }
        if let Some(err) = duplicate_of(&buecher, data, Some(id)) {
            return Err(err);
        }

        let Some(version) = current.version.checked_add(1) else {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
            });
        };

        let updated = Buch {
            id,
            version,
            titel: data.titel.clone(),
            rating: data.rating,
            art: data.art,
            verlag: data.verlag,
            preis: data.preis,
            rabatt: data.rabatt,
            lieferbar: data.lieferbar,
            datum: data.datum,
            isbn: data.isbn.clone(),
            homepage: data.homepage.clone(),
            schlagwoerter: data.schlagwoerter.clone(),
            erzeugt: current.erzeugt,
            aktualisiert: Utc::now(),
        };
        buecher.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.buecher.write().await.remove(&id).is_some())
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut buecher = self.buecher.write().await;
        let count = buecher.len() as u64;
        buecher.clear();
        Ok(count)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
