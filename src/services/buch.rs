//! Buch catalogue service: search, create, versioned update and delete

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppResult, CreateError, UpdateError},
    models::{Buch, BuchFilter, BuchInput, UniqueField},
    repository::{BuchRepository, StoreError},
    validation::BuchSchema,
};

#[derive(Clone)]
pub struct BuchService {
    repository: Arc<dyn BuchRepository>,
}

/// Parse a client-supplied version; only plain decimal digits are accepted
pub fn parse_version(version: &str) -> Option<i32> {
    let version = version.trim();
    if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    version.parse::<i32>().ok()
}

fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

impl BuchService {
    pub fn new(repository: Arc<dyn BuchRepository>) -> Self {
        Self { repository }
    }

    pub async fn find_all(&self) -> AppResult<Vec<Buch>> {
        tracing::debug!("BuchService.find_all()");
        Ok(self.repository.find_all().await?)
    }

    /// Search with raw query parameters; no parameters at all means every record
    pub async fn find(&self, params: &HashMap<String, String>) -> AppResult<Vec<Buch>> {
        let filter = BuchFilter::from_query(params);
        tracing::debug!("BuchService.find(): filter={:?}", filter);

        if filter == BuchFilter::All {
            return self.find_all().await;
        }
        let buecher = self.repository.find(&filter).await?;
        tracing::debug!("BuchService.find(): {} found", buecher.len());
        Ok(buecher)
    }

    /// Look up a book; a malformed identifier is simply not found
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Buch>> {
        tracing::debug!("BuchService.find_by_id(): id={}", id);

        let Some(id) = parse_id(id) else {
            tracing::debug!("BuchService.find_by_id(): malformed id");
            return Ok(None);
        };
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Validate and store a new book with version 0, returning its identifier
    pub async fn create(&self, candidate: &Value) -> Result<Uuid, CreateError> {
        tracing::debug!("BuchService.create(): candidate={}", candidate);

        let messages = BuchSchema::CREATE.validate(candidate);
        if !messages.is_empty() {
            return Err(CreateError::BuchInvalid(messages));
        }
        let input: BuchInput = serde_json::from_value(candidate.clone())
            .map_err(|e| CreateError::BuchInvalid(vec![e.to_string()]))?;

        if let Some(id) = self
            .repository
            .find_id_by_field(UniqueField::Titel, &input.titel)
            .await?
        {
            return Err(CreateError::TitelExists {
                titel: input.titel,
                id: Some(id),
            });
        }

        let isbn = input.isbn.clone().unwrap_or_default();
        if let Some(id) = self
            .repository
            .find_id_by_field(UniqueField::Isbn, &isbn)
            .await?
        {
            return Err(CreateError::IsbnExists { isbn, id: Some(id) });
        }

        let buch = self
            .repository
            .insert(&input.into_data(isbn))
            .await
            .map_err(|e| match e {
                StoreError::Duplicate {
                    field: UniqueField::Titel,
                    value,
                } => CreateError::TitelExists { titel: value, id: None },
                StoreError::Duplicate {
                    field: UniqueField::Isbn,
                    value,
                } => CreateError::IsbnExists { isbn: value, id: None },
                other => CreateError::Store(other),
            })?;

        tracing::info!("Buch created: id={}, titel={}", buch.id, buch.titel);
        Ok(buch.id)
    }

    /// Replace the book `id` with `candidate`, gated by the client's version.
    ///
    /// A supplied version ahead of the stored one is accepted; only a stale
    /// version is rejected. The stored ISBN is kept. Returns the new version.
    pub async fn update(&self, candidate: &Value, id: &str, version: &str) -> Result<i32, UpdateError> {
        tracing::debug!("BuchService.update(): id={}, version={}", id, version);

        let supplied =
            parse_version(version).ok_or_else(|| UpdateError::VersionInvalid(version.to_string()))?;

        let messages = BuchSchema::UPDATE.validate(candidate);
        if !messages.is_empty() {
            return Err(UpdateError::BuchInvalid(messages));
        }
        let input: BuchInput = serde_json::from_value(candidate.clone())
            .map_err(|e| UpdateError::BuchInvalid(vec![e.to_string()]))?;

        let target = parse_id(id);
        if let Some(existing) = self
            .repository
            .find_id_by_field(UniqueField::Titel, &input.titel)
            .await?
        {
            if Some(existing) != target {
                return Err(UpdateError::TitelExists {
                    titel: input.titel,
                    id: Some(existing),
                });
            }
        }

        let Some(target) = target else {
            return Err(UpdateError::BuchNotExists(id.to_string()));
        };
        let Some(stored) = self.repository.find_by_id(target).await? else {
            return Err(UpdateError::BuchNotExists(id.to_string()));
        };

        if supplied < stored.version {
            return Err(UpdateError::VersionOutdated {
                supplied,
                stored: stored.version,
            });
        }

        if let Some(ref isbn) = input.isbn {
            if *isbn != stored.isbn {
                tracing::debug!("BuchService.update(): ignoring changed isbn {}", isbn);
            }
        }
        let data = input.into_data(stored.isbn.clone());

        match self.repository.replace(target, stored.version, &data).await {
            Ok(Some(updated)) => {
                tracing::info!("Buch updated: id={}, version={}", updated.id, updated.version);
                Ok(updated.version)
            }
            Ok(None) => Err(UpdateError::BuchNotExists(id.to_string())),
            Err(StoreError::VersionConflict { expected, .. }) => Err(UpdateError::VersionOutdated {
                supplied,
                stored: expected,
            }),
            Err(StoreError::Duplicate {
                field: UniqueField::Titel,
                value,
            }) => Err(UpdateError::TitelExists { titel: value, id: None }),
            Err(other) => Err(UpdateError::Store(other)),
        }
    }

    /// Remove a book; a malformed identifier is "not deleted" rather than an error
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        tracing::debug!("BuchService.delete(): id={}", id);

        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let deleted = self.repository.delete(id).await?;
        if deleted {
            tracing::info!("Buch deleted: id={}", id);
        }
        Ok(deleted)
    }

    /// Check the backing store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        Ok(self.repository.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{BuchArt, Verlag};
    use crate::repository::MockBuchRepository;
    use chrono::Utc;
    use serde_json::json;

    fn stored(id: Uuid, version: i32) -> Buch {
        Buch {
            id,
            version,
            titel: "Alpha".to_string(),
            rating: None,
            art: BuchArt::Druckausgabe,
            verlag: Verlag::FooVerlag,
            preis: None,
            rabatt: None,
            lieferbar: None,
            datum: None,
            isbn: "9783897225831".to_string(),
            homepage: None,
            schlagwoerter: vec![],
            erzeugt: Utc::now(),
            aktualisiert: Utc::now(),
        }
    }

    fn candidate() -> Value {
        json!({ "titel": "Alpha", "art": "KINDLE", "verlag": "BAR_VERLAG" })
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("0"), Some(0));
        assert_eq!(parse_version(" 7 "), Some(7));
        assert_eq!(parse_version("-1"), None);
        assert_eq!(parse_version("1.5"), None);
        assert_eq!(parse_version("abc"), None);
        assert_eq!(parse_version("4294967295"), None);
        assert_eq!(parse_version("2147483648"), None);
        assert_eq!(parse_version("+5"), None);
        assert_eq!(parse_version(""), None);
    }

    #[tokio::test]
    async fn test_concurrent_write_maps_to_version_outdated() {
        let id = Uuid::new_v4();
        let mut repo = MockBuchRepository::new();
        repo.expect_find_id_by_field().returning(move |_, _| Ok(Some(id)));
        repo.expect_find_by_id().returning(move |_| Ok(Some(stored(id, 2))));
        repo.expect_replace()
            .withf(move |target, expected, data| {
                *target == id && *expected == 2 && data.isbn == "9783897225831"
            })
            .returning(move |_, expected, _| Err(StoreError::VersionConflict { id, expected }));

        let service = BuchService::new(Arc::new(repo));
        let result = service.update(&candidate(), &id.to_string(), "2").await;
        assert!(matches!(
            result,
            Err(UpdateError::VersionOutdated { supplied: 2, stored: 2 })
        ));
    }

    #[tokio::test]
    async fn test_version_checked_before_store() {
        let mut repo = MockBuchRepository::new();
        repo.expect_find_id_by_field().never();
        repo.expect_replace().never();

        let service = BuchService::new(Arc::new(repo));
        let result = service.update(&candidate(), &Uuid::new_v4().to_string(), "\"1\"").await;
        assert!(matches!(result, Err(UpdateError::VersionInvalid(_))));
    }

    #[tokio::test]
    async fn test_delete_store_failure_is_infrastructure_fault() {
        let mut repo = MockBuchRepository::new();
        repo.expect_delete()
            .returning(|_| Err(StoreError::Database(sqlx::Error::PoolTimedOut)));

        let service = BuchService::new(Arc::new(repo));
        let result = service.delete(&Uuid::new_v4().to_string()).await;
        assert!(matches!(result, Err(AppError::Store(StoreError::Database(_)))));
    }

    #[tokio::test]
    async fn test_delete_malformed_id_skips_store() {
        let mut repo = MockBuchRepository::new();
        repo.expect_delete().never();

        let service = BuchService::new(Arc::new(repo));
        assert!(!service.delete("not-a-uuid").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_insert_race_maps_to_conflict() {
        let mut repo = MockBuchRepository::new();
        repo.expect_find_id_by_field().returning(|_, _| Ok(None));
        repo.expect_insert().returning(|data| {
            Err(StoreError::Duplicate {
                field: UniqueField::Isbn,
                value: data.isbn.clone(),
            })
        });

        let service = BuchService::new(Arc::new(repo));
        let candidate = json!({
            "titel": "Neu",
            "art": "KINDLE",
            "verlag": "FOO_VERLAG",
            "isbn": "0201633612"
        });
        let result = service.create(&candidate).await;
        assert!(matches!(
            result,
            Err(CreateError::IsbnExists { ref isbn, id: None }) if isbn == "0201633612"
        ));
    }
}
