//! PostgreSQL Record Store

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{BuchRepository, StoreError, StoreResult};
use crate::models::{query::Condition, Buch, BuchData, BuchFilter, UniqueField};

const COLUMNS: &str = r#"
    id, version, titel, rating, art, verlag, preis, rabatt, lieferbar,
    datum, isbn, homepage, schlagwoerter, erzeugt, aktualisiert
"#;

/// Byte-wise ordering, independent of the database collation
const ORDER_BY_TITEL: &str = r#" ORDER BY titel COLLATE "C""#;

#[derive(Clone)]
pub struct PgBuchRepository {
    pool: Pool<Postgres>,
}

impl PgBuchRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Translate unique violations on `buch` into [`StoreError::Duplicate`]
fn map_unique_violation(err: sqlx::Error, data: &BuchData) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("buch_titel_key") => UniqueField::Titel,
                _ => UniqueField::Isbn,
            };
            return StoreError::Duplicate {
                field,
                value: field.value_of(data).to_string(),
            };
        }
    }
    StoreError::Database(err)
}

/// Full search statement for `filter`
fn search_query(filter: &BuchFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM buch", COLUMNS));
    push_filter(&mut builder, filter);
    builder.push(ORDER_BY_TITEL);
    builder
}

/// Append the WHERE clause for `filter`
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &BuchFilter) {
    let BuchFilter::Where(conditions) = filter else {
        return;
    };
    if conditions.is_empty() {
        return;
    }

    builder.push(" WHERE ");
    let mut separated = builder.separated(" AND ");
    for condition in conditions {
        match condition {
            Condition::TitelContains(needle) => {
                separated.push("titel ~* ");
                separated.push_bind_unseparated(regex::escape(needle));
            }
            Condition::Equals { field, value } => {
                separated.push(format!("{}::text = ", field.column()));
                separated.push_bind_unseparated(value.clone());
            }
            Condition::Schlagwoerter(keywords) => {
                separated.push("schlagwoerter @> ");
                separated.push_bind_unseparated(keywords.clone());
            }
            Condition::Unmatched(_) => {
                separated.push("FALSE");
            }
        }
    }
}

#[async_trait]
impl BuchRepository for PgBuchRepository {
    async fn find_all(&self) -> StoreResult<Vec<Buch>> {
        let rows = sqlx::query_as::<_, Buch>(&format!("SELECT {} FROM buch{}", COLUMNS, ORDER_BY_TITEL))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find(&self, filter: &BuchFilter) -> StoreResult<Vec<Buch>> {
        let mut builder = search_query(filter);
        let rows = builder
            .build_query_as::<Buch>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Buch>> {
        let row = sqlx::query_as::<_, Buch>(&format!("SELECT {} FROM buch WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_id_by_field(&self, field: UniqueField, value: &str) -> StoreResult<Option<Uuid>> {
        let query = format!("SELECT id FROM buch WHERE {} = $1", field.column());
        let id: Option<Uuid> = sqlx::query_scalar(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn insert(&self, data: &BuchData) -> StoreResult<Buch> {
        let query = format!(
            r#"
            INSERT INTO buch (id, version, titel, rating, art, verlag, preis, rabatt,
                              lieferbar, datum, isbn, homepage, schlagwoerter)
            VALUES ($1, 0, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            COLUMNS
        );

        sqlx::query_as::<_, Buch>(&query)
            .bind(Uuid::new_v4())
            .bind(&data.titel)
            .bind(data.rating)
            .bind(data.art)
            .bind(data.verlag)
            .bind(data.preis)
            .bind(data.rabatt)
            .bind(data.lieferbar)
            .bind(data.datum)
            .bind(&data.isbn)
            .bind(&data.homepage)
            .bind(&data.schlagwoerter)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, data))
    }

    async fn replace(&self, id: Uuid, expected_version: i32, data: &BuchData) -> StoreResult<Option<Buch>> {
        let query = format!(
            r#"
            UPDATE buch
            SET titel = $3, rating = $4, art = $5, verlag = $6, preis = $7, rabatt = $8,
                lieferbar = $9, datum = $10, isbn = $11, homepage = $12, schlagwoerter = $13,
                version = version + 1, aktualisiert = NOW()
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            COLUMNS
        );

        let updated = sqlx::query_as::<_, Buch>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(&data.titel)
            .bind(data.rating)
            .bind(data.art)
            .bind(data.verlag)
            .bind(data.preis)
            .bind(data.rabatt)
            .bind(data.lieferbar)
            .bind(data.datum)
            .bind(&data.isbn)
            .bind(&data.homepage)
            .bind(&data.schlagwoerter)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, data))?;

        if updated.is_some() {
            return Ok(updated);
        }

        // Nothing matched: either the record is gone or its version moved on
        let exists: Option<i32> = sqlx::query_scalar("SELECT version FROM buch WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some(_) => Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
            }),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM buch WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM buch").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
