use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::models::ForceCharacterSheet;
use crate::database::store::{
    insert_document, update_document, Capabilities, Capability, CharacterStore, StoreError,
};
use crate::filter::{FilterOrder, FilterWhere, QueryFilter};
use crate::types::ObjectId;

/// Process-local document collection. Documents are kept in their JSON form
/// so filtering and sorting follow the same rules as the Postgres store.
pub struct InMemoryCharacterStore {
    documents: RwLock<BTreeMap<ObjectId, Value>>,
    capabilities: Capabilities,
}

impl Default for InMemoryCharacterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCharacterStore {
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::ALL)
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            capabilities,
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl CharacterStore for InMemoryCharacterStore {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, sheet: &ForceCharacterSheet) -> Result<(), StoreError> {
        debug!("BEGIN - insert {}", sheet.id);
        let document = insert_document(sheet)?;
        let mut documents = self.documents.write().await;
        if documents.contains_key(&sheet.id) {
            return Err(StoreError::Duplicate(format!("E11000 duplicate key error: _id {}", sheet.id)));
        }
        documents.insert(sheet.id, document);
        Ok(())
    }

    async fn find_all(&self, filter: &QueryFilter) -> Result<Vec<ForceCharacterSheet>, StoreError> {
        debug!("BEGIN - find_all {:?}", filter);
        let documents = self.documents.read().await;
        let mut matches: Vec<&Value> = documents
            .values()
            .filter(|doc| match &filter.predicate {
                Some(predicate) => FilterWhere::matches(predicate, doc),
                None => true,
            })
            .collect();
        matches.sort_by(|a, b| FilterOrder::compare(a, b, &filter.sort));

        let skip = usize::try_from(filter.skip()).unwrap_or(usize::MAX);
        let limit = filter
            .limit()
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        matches
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| serde_json::from_value(doc.clone()).map_err(StoreError::from))
            .collect()
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<ForceCharacterSheet, StoreError> {
        let documents = self.documents.read().await;
        let document = documents.get(id).ok_or(StoreError::NotFound(*id))?;
        Ok(serde_json::from_value(document.clone())?)
    }

    async fn update_by_id(&self, sheet: &ForceCharacterSheet, id: &ObjectId) -> Result<(), StoreError> {
        let patch = update_document(sheet, id)?;
        let mut documents = self.documents.write().await;
        let current = documents
            .get_mut(id)
            .ok_or(StoreError::UnmatchedUpdate { id: *id, matched: 0 })?;

        let mut merged = current.clone();
        if let (Value::Object(target), Value::Object(fields)) = (&mut merged, patch) {
            target.extend(fields);
        }
        if merged == *current {
            return Err(StoreError::UnmodifiedUpdate { id: *id, modified: 0 });
        }
        *current = merged;
        Ok(())
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<(), StoreError> {
        if !self.capabilities.supports(Capability::Delete) {
            return Err(StoreError::NotImplemented("delete"));
        }
        self.documents
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(*id))
    }
}
