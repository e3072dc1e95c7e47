pub mod core;

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::Entity;

/// Shared in-memory table of entities keyed by id
///
/// Clones share the same rows.
#[derive(Debug)]
pub struct Table<E: Entity> {
    rows: Arc<RwLock<HashMap<E::Id, E>>>,
}

impl<E: Entity> Table<E> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, id: &E::Id) -> Option<E> {
        self.rows.read().await.get(id).cloned()
    }

    /// Inserts or replaces the row for the entity's id.
    pub async fn put(&self, entity: E) -> E {
        debug!(entity = E::ENTITY_NAME, id = %entity.id(), "put row");
        self.rows
            .write()
            .await
            .insert(entity.id().clone(), entity.clone());
        entity
    }

    /// Rows matching the predicate, in no particular order
    pub async fn select<P>(&self, predicate: P) -> Vec<E>
    where
        P: Fn(&E) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl<E: Entity> Clone for Table<E> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self::new()
    }
}
