use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Postgres};
use tracing::{debug, error, info};

use crate::config::StorageConfig;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::ForceCharacterSheet;
use crate::database::store::{
    insert_document, update_document, Capabilities, CharacterStore, StoreError, FIND_MAX_TIME,
};
use crate::filter::{build_query, FilterOrder, FilterWhere, QueryFilter, SqlParam};
use crate::types::ObjectId;

/// Character sheets stored as JSONB documents, one table per collection.
pub struct PgCharacterStore {
    pool: PgPool,
    database_name: String,
    collection: String,
    archive_name: String,
}

impl PgCharacterStore {
    pub fn new(pool: PgPool, config: &StorageConfig) -> Result<Self, DatabaseError> {
        for name in [&config.collection, &config.archive] {
            if !DatabaseManager::is_valid_name(name) {
                return Err(DatabaseError::InvalidName(name.clone()));
            }
        }
        Ok(Self {
            pool,
            database_name: config.database.clone(),
            collection: config.collection.clone(),
            archive_name: config.archive.clone(),
        })
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn archive_name(&self) -> &str {
        &self.archive_name
    }

    fn table(&self) -> String {
        DatabaseManager::quote_identifier(&self.collection)
    }

    /// Create the collection table when it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<(), StoreError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\"id\" TEXT PRIMARY KEY, \"document\" JSONB NOT NULL)",
            self.table()
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        info!("Collection {} ready in {}", self.collection, self.database_name);
        Ok(())
    }

    /// Run `sql` in a transaction whose statements the server cancels after `limit`.
    async fn fetch_documents(
        &self,
        sql: &str,
        params: &[SqlParam],
        limit: Duration,
    ) -> Result<Vec<ForceCharacterSheet>, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&statement_timeout(limit)).execute(&mut *tx).await?;

        let mut matches = Vec::new();
        {
            let query = bind_params(sqlx::query_scalar::<_, Value>(sql), params);
            let mut rows = query.fetch(&mut *tx);
            while let Some(document) = rows.try_next().await? {
                matches.push(serde_json::from_value(document)?);
            }
        }
        tx.commit().await?;
        Ok(matches)
    }
}

#[async_trait]
impl CharacterStore for PgCharacterStore {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    async fn ping(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await.map_err(|e| {
            error!("ERROR connecting to database {}", e);
            StoreError::from(e)
        })
    }

    async fn insert(&self, sheet: &ForceCharacterSheet) -> Result<(), StoreError> {
        debug!("BEGIN - insert {}", sheet.id);
        let document = insert_document(sheet)?;
        let sql = format!("INSERT INTO {} (\"id\", \"document\") VALUES ($1, $2)", self.table());
        sqlx::query(&sql)
            .bind(sheet.id.to_hex())
            .bind(document)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_all(&self, filter: &QueryFilter) -> Result<Vec<ForceCharacterSheet>, StoreError> {
        debug!("BEGIN - find_all {:?}", filter);
        let (where_clause, mut params) = FilterWhere::generate(filter.predicate.as_ref(), 0);
        let (order_clause, order_params) = FilterOrder::generate(&filter.sort, params.len());
        params.extend(order_params);

        let mut sql = format!(
            "SELECT \"document\" FROM {} WHERE {} {} OFFSET {}",
            self.table(),
            where_clause,
            order_clause,
            filter.skip()
        );
        if let Some(limit) = filter.limit() {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        tokio::time::timeout(FIND_MAX_TIME, self.fetch_documents(&sql, &params, FIND_MAX_TIME))
            .await
            .map_err(|_| StoreError::Timeout(FIND_MAX_TIME))?
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<ForceCharacterSheet, StoreError> {
        debug!("BEGIN - find_by_id {}", id);
        let query = build_query(Some(id), None, vec![]);
        let (where_clause, params) = FilterWhere::generate(Some(&query), 0);
        let sql = format!("SELECT \"document\" FROM {} WHERE {}", self.table(), where_clause);

        let document = bind_params(sqlx::query_scalar::<_, Value>(&sql), &params)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(*id))?;
        Ok(serde_json::from_value(document)?)
    }

    async fn update_by_id(&self, sheet: &ForceCharacterSheet, id: &ObjectId) -> Result<(), StoreError> {
        debug!("BEGIN - update_by_id {}", id);
        let patch = update_document(sheet, id)?;
        let table = self.table();
        let sql = format!(
            "WITH matched AS (
                SELECT \"id\", \"document\" FROM {table} WHERE \"id\" = $1 FOR UPDATE
            ), updated AS (
                UPDATE {table} AS t SET \"document\" = matched.\"document\" || $2::jsonb
                FROM matched
                WHERE t.\"id\" = matched.\"id\"
                  AND (matched.\"document\" || $2::jsonb) IS DISTINCT FROM matched.\"document\"
                RETURNING t.\"id\"
            )
            SELECT (SELECT COUNT(*) FROM matched), (SELECT COUNT(*) FROM updated)"
        );

        let (matched, modified): (i64, i64) = sqlx::query_as(&sql)
            .bind(id.to_hex())
            .bind(patch)
            .fetch_one(&self.pool)
            .await?;
        info!("update {}: matched {}, modified {}", id, matched, modified);

        if matched != 1 {
            return Err(StoreError::UnmatchedUpdate { id: *id, matched: matched.max(0) as u64 });
        }
        if modified != 1 {
            return Err(StoreError::UnmodifiedUpdate { id: *id, modified: modified.max(0) as u64 });
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<(), StoreError> {
        debug!("BEGIN - delete_by_id {}", id);
        let sql = format!("DELETE FROM {} WHERE \"id\" = $1", self.table());
        let result = sqlx::query(&sql).bind(id.to_hex()).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(*id));
        }
        Ok(())
    }
}

/// `SET LOCAL` keeps the limit scoped to the enclosing transaction.
fn statement_timeout(limit: Duration) -> String {
    format!("SET LOCAL statement_timeout = {}", limit.as_millis())
}

fn bind_params<'q, O>(
    mut q: sqlx::query::QueryScalar<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::QueryScalar<'q, Postgres, O, PgArguments> {
    for p in params {
        q = match p {
            SqlParam::Text(s) => q.bind(s.clone()),
            SqlParam::Path(path) => q.bind(path.clone()),
        };
    }
    q
}
