use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::database::models::ForceCharacterSheet;
use crate::filter::QueryFilter;
use crate::types::ObjectId;

/// Upper bound on list query execution.
pub const FIND_MAX_TIME: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no documents in result for id {0}")]
    NotFound(ObjectId),

    #[error("duplicate key error: {0}")]
    Duplicate(String),

    #[error("unable to marshal document: {0}")]
    Marshal(#[from] serde_json::Error),

    #[error("could not update sheet {id}: got {matched} matches instead of 1")]
    UnmatchedUpdate { id: ObjectId, matched: u64 },

    #[error("could not update sheet {id}: modified {modified} documents instead of 1")]
    UnmodifiedUpdate { id: ObjectId, modified: u64 },

    #[error("operation not supported by this storage backend: {0}")]
    NotImplemented(&'static str),

    #[error("query exceeded its {0:?} time limit")]
    Timeout(Duration),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let code = err.as_database_error().and_then(|e| e.code()).map(|c| c.into_owned());
        StoreError::from_sqlstate(code.as_deref(), err)
    }
}

impl StoreError {
    /// 23505 is a unique violation; 57014 is a statement cancelled by
    /// `statement_timeout`, which only list queries set.
    fn from_sqlstate(code: Option<&str>, err: sqlx::Error) -> Self {
        match code {
            Some("23505") => StoreError::Duplicate(err.to_string()),
            Some("57014") => StoreError::Timeout(FIND_MAX_TIME),
            _ => StoreError::Database(DatabaseError::Sqlx(err)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Insert,
    Find,
    Update,
    Delete,
}

/// Operations a storage backend actually implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities(&'static [Capability]);

impl Capabilities {
    pub const BASE: Self = Self(&[Capability::Insert, Capability::Find, Capability::Update]);
    pub const ALL: Self = Self(&[
        Capability::Insert,
        Capability::Find,
        Capability::Update,
        Capability::Delete,
    ]);

    pub fn supports(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }
}

/// Data access for character sheets. Implementations are shared across
/// requests and hold no per-request state.
#[async_trait]
pub trait CharacterStore: Send + Sync {
    fn capabilities(&self) -> Capabilities {
        Capabilities::BASE
    }

    /// Liveness probe against the underlying store.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn insert(&self, sheet: &ForceCharacterSheet) -> Result<(), StoreError>;

    /// Empty result is not an error.
    async fn find_all(&self, filter: &QueryFilter) -> Result<Vec<ForceCharacterSheet>, StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<ForceCharacterSheet, StoreError>;

    /// Set every field of `sheet` on the document at `id`. Fails unless exactly
    /// one document matched and exactly one was modified.
    async fn update_by_id(&self, sheet: &ForceCharacterSheet, id: &ObjectId) -> Result<(), StoreError>;

    async fn delete_by_id(&self, _id: &ObjectId) -> Result<(), StoreError> {
        Err(StoreError::NotImplemented("delete"))
    }
}

/// Document persisted on insert. The stored version is never 0.
pub(crate) fn insert_document(sheet: &ForceCharacterSheet) -> Result<Value, StoreError> {
    let mut document = serde_json::to_value(sheet)?;
    if sheet.version == 0 {
        document["version"] = Value::from(1);
    }
    Ok(document)
}

/// Field set applied on update: the identifier stays the one addressed and an
/// unset version leaves the stored version alone.
pub(crate) fn update_document(sheet: &ForceCharacterSheet, id: &ObjectId) -> Result<Value, StoreError> {
    let mut document = serde_json::to_value(sheet)?;
    if let Value::Object(map) = &mut document {
        map.insert("_id".to_string(), Value::String(id.to_hex()));
        if sheet.version == 0 {
            map.remove("version");
        }
    }
    Ok(document)
}
