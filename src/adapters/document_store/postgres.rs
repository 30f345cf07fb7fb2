//! PostgreSQL implementation of the DocumentStore port.
//!
//! All collections share one `documents` table keyed by `(collection, id)`
//! with a JSONB body. Filters translate to JSONB operators. `add_to_set` and
//! `merge_if` are single conditional `UPDATE`s, so concurrent writers never
//! silently overwrite each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder};

use crate::config::StoreConfig;
use crate::domain::foundation::Timestamp;
use crate::ports::{Collection, Document, DocumentStore, Filter, StoreError, StoredDocument};

/// PostgreSQL implementation of the DocumentStore port.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool using the store configuration.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect: {}", e)))?;
        Ok(Self::new(pool))
    }

    /// Applies the bundled migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {}", e)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Database row representation of a document.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    body: Json<Value>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for StoredDocument {
    type Error = StoreError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        match row.body.0 {
            Value::Object(body) => Ok(StoredDocument {
                id: row.id,
                body,
                created_at: Timestamp::from_datetime(row.created_at),
            }),
            other => Err(StoreError::InvalidDocument {
                id: row.id,
                reason: format!("body is not an object: {}", other),
            }),
        }
    }
}

/// Maps a sqlx error, surfacing serialization failures and deadlocks as
/// retryable conflicts.
fn map_error(collection: &Collection, id: &str, context: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(db_err.code().as_deref(), Some("40001") | Some("40P01")) {
            return StoreError::conflict(collection, id);
        }
    }
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{}: {}", context, err))
        }
        other => StoreError::Database(format!("{}: {}", context, other)),
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::Eq { field, value } => {
            builder.push(" AND body -> ");
            builder.push_bind(field.clone());
            builder.push(" = ");
            builder.push_bind(Json(value.clone()));
        }
        Filter::ArrayContains { field, value } => {
            builder.push(" AND body -> ");
            builder.push_bind(field.clone());
            builder.push(" @> ");
            builder.push_bind(Json(Value::Array(vec![value.clone()])));
        }
        Filter::TimeRange { field, from, until } => {
            builder.push(" AND (body ->> ");
            builder.push_bind(field.clone());
            builder.push(")::timestamptz >= ");
            builder.push_bind(*from.as_datetime());
            builder.push(" AND (body ->> ");
            builder.push_bind(field.clone());
            builder.push(")::timestamptz < ");
            builder.push_bind(*until.as_datetime());
        }
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(
        &self,
        collection: &Collection,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, body, created_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.path())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_error(collection, id, "Failed to fetch document", e))?;

        row.map(StoredDocument::try_from).transpose()
    }

    async fn query(
        &self,
        collection: &Collection,
        filters: &[Filter],
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT id, body, created_at FROM documents WHERE collection = ");
        builder.push_bind(collection.path());
        for filter in filters {
            push_filter(&mut builder, filter);
        }

        let rows: Vec<DocumentRow> = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_error(collection, "*", "Failed to query documents", e))?;

        rows.into_iter().map(StoredDocument::try_from).collect()
    }

    async fn put(
        &self,
        collection: &Collection,
        id: &str,
        body: Document,
        merge: bool,
    ) -> Result<StoredDocument, StoreError> {
        let sql = if merge {
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = documents.body || EXCLUDED.body, updated_at = now()
            RETURNING id, body, created_at
            "#
        } else {
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, updated_at = now()
            RETURNING id, body, created_at
            "#
        };

        let row: DocumentRow = sqlx::query_as(sql)
            .bind(collection.path())
            .bind(id)
            .bind(Json(Value::Object(body)))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_error(collection, id, "Failed to write document", e))?;

        StoredDocument::try_from(row)
    }

    async fn merge_if(
        &self,
        collection: &Collection,
        id: &str,
        field: &str,
        expected: &Value,
        body: Document,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = body || $5::jsonb, updated_at = now()
            WHERE collection = $1
              AND id = $2
              AND COALESCE(body -> $3::text, 'null'::jsonb) = $4::jsonb
            "#,
        )
        .bind(collection.path())
        .bind(id)
        .bind(field)
        .bind(Json(expected.clone()))
        .bind(Json(Value::Object(body)))
        .execute(&self.pool)
        .await
        .map_err(|e| map_error(collection, id, "Failed to write guarded document", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &Collection, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.path())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_error(collection, id, "Failed to delete document", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_to_set(
        &self,
        collection: &Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<bool, StoreError> {
        let element = Json(Value::Array(vec![value]));
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = jsonb_set(
                    body,
                    ARRAY[$3::text],
                    COALESCE(body -> $3::text, '[]'::jsonb) || $4::jsonb
                ),
                updated_at = now()
            WHERE collection = $1
              AND id = $2
              AND NOT (COALESCE(body -> $3::text, '[]'::jsonb) @> $4::jsonb)
            "#,
        )
        .bind(collection.path())
        .bind(id)
        .bind(field)
        .bind(element)
        .execute(&self.pool)
        .await
        .map_err(|e| map_error(collection, id, "Failed to update set", e))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Nothing updated: either the value is already present or the
        // document is missing.
        let exists: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection.path())
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_error(collection, id, "Failed to check document", e))?;

        match exists {
            Some(_) => Ok(false),
            None => Err(StoreError::not_found(collection, id)),
        }
    }
}
