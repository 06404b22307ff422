use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use sweep_model::{
    ContentKind, ContentType, ContentTypeInfo, ItemId, ItemStatus,
};
use tracing::info;

use crate::error::{Result, SweepError};
use crate::ports::{ContentSource, ProgressStore, StoredRecord};
use crate::scan::eligibility::EligibilityRule;

/// Opens a pool and applies the bundled migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|err| SweepError::Storage(format!("migration failed: {err}")))?;
    info!("database migrations applied");
    Ok(())
}

fn rule_arrays(rule: &EligibilityRule) -> (Vec<String>, Vec<String>) {
    rule.entries()
        .iter()
        .map(|(name, status)| {
            (name.as_str().to_string(), status.as_str().to_string())
        })
        .unzip()
}

fn to_i64(value: u64, what: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| SweepError::InvalidInput(format!("{what} out of range")))
}

/// Content source over the `content_items` and `content_types` tables.
#[derive(Clone, Debug)]
pub struct PostgresContentSource {
    pool: PgPool,
}

impl PostgresContentSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register_type(&self, info: &ContentTypeInfo) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO content_types (name, label, kind, public)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE
            SET label = EXCLUDED.label,
                kind = EXCLUDED.kind,
                public = EXCLUDED.public
            "#,
        )
        .bind(info.name.as_str())
        .bind(&info.label)
        .bind(info.kind.as_str())
        .bind(info.public)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert(
        &self,
        content_type: &ContentType,
        status: ItemStatus,
    ) -> Result<ItemId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO content_items (content_type, status) VALUES ($1, $2) RETURNING id",
        )
        .bind(content_type.as_str())
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(ItemId(id))
    }

    pub async fn last_scanned(
        &self,
        id: ItemId,
    ) -> Result<Option<DateTime<Utc>>> {
        let scanned: Option<Option<DateTime<Utc>>> = sqlx::query_scalar(
            "SELECT last_scanned_at FROM content_items WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;
        Ok(scanned.flatten())
    }
}

#[async_trait]
impl ContentSource for PostgresContentSource {
    async fn content_types(&self) -> Result<Vec<ContentTypeInfo>> {
        let rows = sqlx::query(
            "SELECT name, label, kind, public FROM content_types ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<ContentTypeInfo> {
                let name: String = row.try_get("name")?;
                let kind: String = row.try_get("kind")?;
                let name = ContentType::parse(&name)
                    .map_err(|err| SweepError::Storage(err.to_string()))?;
                let kind = kind
                    .parse::<ContentKind>()
                    .map_err(|err| SweepError::Storage(err.to_string()))?;
                Ok(ContentTypeInfo::new(
                    name,
                    row.try_get::<String, _>("label")?,
                    kind,
                    row.try_get("public")?,
                ))
            })
            .collect()
    }

    async fn count(&self, rule: &EligibilityRule) -> Result<u64> {
        if rule.is_empty() {
            return Ok(0);
        }
        let (types, statuses) = rule_arrays(rule);
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM content_items i
            JOIN UNNEST($1::text[], $2::text[]) AS r(content_type, status)
              ON i.content_type = r.content_type AND i.status = r.status
            "#,
        )
        .bind(&types)
        .bind(&statuses)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn page(
        &self,
        rule: &EligibilityRule,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ItemId>> {
        if rule.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let (types, statuses) = rule_arrays(rule);
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT i.id
            FROM content_items i
            JOIN UNNEST($1::text[], $2::text[]) AS r(content_type, status)
              ON i.content_type = r.content_type AND i.status = r.status
            ORDER BY i.id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&types)
        .bind(&statuses)
        .bind(to_i64(limit, "limit")?)
        .bind(to_i64(offset, "offset")?)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(ItemId).collect())
    }

    async fn mark_scanned(
        &self,
        items: &[ItemId],
        at: DateTime<Utc>,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = items.iter().map(|id| id.get()).collect();
        sqlx::query(
            "UPDATE content_items SET last_scanned_at = $2 WHERE id = ANY($1)",
        )
        .bind(&ids)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Progress store over the `sweep_state` table.
#[derive(Clone, Debug)]
pub struct PostgresProgressStore {
    pool: PgPool,
}

impl PostgresProgressStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_revision(&self, key: &str) -> Result<u64> {
        let revision: Option<i64> = sqlx::query_scalar(
            "SELECT revision FROM sweep_state WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(revision.unwrap_or(0).max(0) as u64)
    }

    async fn conflict(&self, key: &str, expected: u64) -> SweepError {
        match self.current_revision(key).await {
            Ok(found) => SweepError::Conflict {
                key: key.to_string(),
                expected,
                found,
            },
            Err(err) => err,
        }
    }
}

#[async_trait]
impl ProgressStore for PostgresProgressStore {
    async fn get(&self, key: &str) -> Result<Option<StoredRecord>> {
        let row = sqlx::query(
            "SELECT value, revision FROM sweep_state WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<StoredRecord> {
            let revision: i64 = row.try_get("revision")?;
            Ok(StoredRecord {
                value: row.try_get::<Value, _>("value")?,
                revision: revision.max(0) as u64,
            })
        })
        .transpose()
    }

    async fn set(
        &self,
        key: &str,
        value: Value,
        expected_revision: Option<u64>,
    ) -> Result<u64> {
        let written: Option<i64> = match expected_revision {
            None => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO sweep_state (key, value, revision)
                    VALUES ($1, $2, 1)
                    ON CONFLICT (key) DO UPDATE
                    SET value = EXCLUDED.value,
                        revision = sweep_state.revision + 1,
                        updated_at = NOW()
                    RETURNING revision
                    "#,
                )
                .bind(key)
                .bind(&value)
                .fetch_optional(&self.pool)
                .await?
            }
            Some(0) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO sweep_state (key, value, revision)
                    VALUES ($1, $2, 1)
                    ON CONFLICT (key) DO NOTHING
                    RETURNING revision
                    "#,
                )
                .bind(key)
                .bind(&value)
                .fetch_optional(&self.pool)
                .await?
            }
            Some(expected) => {
                sqlx::query_scalar(
                    r#"
                    UPDATE sweep_state
                    SET value = $2, revision = revision + 1, updated_at = NOW()
                    WHERE key = $1 AND revision = $3
                    RETURNING revision
                    "#,
                )
                .bind(key)
                .bind(&value)
                .bind(to_i64(expected, "revision")?)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        match written {
            Some(revision) => Ok(revision.max(0) as u64),
            None => Err(self.conflict(key, expected_revision.unwrap_or(0)).await),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM sweep_state WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
