//! In-memory cache of server-owned entities.
//!
//! The store is the single source of truth for everything currently loaded
//! into the UI. It is mutated only by the mutation engine (`crate::mutation`)
//! and read by the derived views; chat logs live outside it.

use crate::document::Document;
use crate::project::Project;
use crate::task::Task;
use crate::team::TeamMember;
use crate::types::EntityId;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Anything addressable by collection + id.
pub trait Entity {
    fn id(&self) -> &EntityId;
    fn set_id(&mut self, id: EntityId);
}

macro_rules! impl_entity {
    ($ty:ty) => {
        impl Entity for $ty {
            fn id(&self) -> &EntityId {
                &self.id
            }
            fn set_id(&mut self, id: EntityId) {
                self.id = id;
            }
        }
    };
}

impl_entity!(Project);
impl_entity!(Task);
impl_entity!(Document);
impl_entity!(TeamMember);

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Id-keyed entity map plus an insertion-order id sequence.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    by_id: HashMap<EntityId, T>,
    order: Vec<EntityId>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id. Replacing preserves the entity's original
    /// insertion position; the call is idempotent.
    pub fn upsert(&mut self, entity: T) {
        let id = entity.id().clone();
        if self.by_id.insert(id.clone(), entity).is_none() {
            self.order.push(id);
        }
    }

    /// Delete if present. Missing ids are a no-op — deletions may race with
    /// background reloads.
    pub fn remove(&mut self, id: &EntityId) -> Option<T> {
        let removed = self.by_id.remove(id);
        if removed.is_some() {
            self.order.retain(|o| o != id);
        }
        removed
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Entities in insertion order.
    pub fn list(&self) -> Vec<&T> {
        self.order.iter().filter_map(|id| self.by_id.get(id)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insertion-order position of an entity, used by the mutation engine to
    /// revert a failed delete to its exact prior place.
    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.order.iter().position(|o| o == id)
    }

    /// Insert at a specific insertion-order position (clamped to the end).
    pub fn insert_at(&mut self, index: usize, entity: T) {
        let id = entity.id().clone();
        if self.by_id.insert(id.clone(), entity).is_none() {
            let index = index.min(self.order.len());
            self.order.insert(index, id);
        }
    }

    /// Rebind a placeholder id to the server-assigned id in place, keeping
    /// the insertion position. Returns false if `old` is not present.
    pub fn rekey(&mut self, old: &EntityId, new: EntityId) -> bool {
        let Some(mut entity) = self.by_id.remove(old) else {
            return false;
        };
        entity.set_id(new.clone());
        if let Some(slot) = self.order.iter_mut().find(|o| *o == old) {
            *slot = new.clone();
        }
        self.by_id.insert(new, entity);
        true
    }

    /// Replace the whole collection from a server list, preserving the
    /// server's ordering as the new insertion order.
    pub fn replace_all(&mut self, entities: Vec<T>) {
        self.by_id.clear();
        self.order.clear();
        for entity in entities {
            self.upsert(entity);
        }
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.order.clear();
    }
}

// ---------------------------------------------------------------------------
// EntityStore
// ---------------------------------------------------------------------------

/// All loaded server entities, one collection per type.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    pub projects: Collection<Project>,
    pub tasks: Collection<Task>,
    pub documents: Collection<Document>,
    pub members: Collection<TeamMember>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, title: &str) -> Task {
        Task::new(id, title)
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut col = Collection::new();
        col.upsert(task("t1", "A"));
        col.upsert(task("t1", "A"));
        assert_eq!(col.len(), 1);
        assert_eq!(col.list()[0].title, "A");
    }

    #[test]
    fn upsert_replace_preserves_position() {
        let mut col = Collection::new();
        col.upsert(task("t1", "A"));
        col.upsert(task("t2", "B"));
        col.upsert(task("t1", "A2"));
        let titles: Vec<_> = col.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A2", "B"]);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut col: Collection<Task> = Collection::new();
        assert!(col.remove(&EntityId::new("ghost")).is_none());
        assert!(col.is_empty());
    }

    #[test]
    fn list_returns_insertion_order() {
        let mut col = Collection::new();
        col.upsert(task("t2", "B"));
        col.upsert(task("t1", "A"));
        col.upsert(task("t3", "C"));
        let ids: Vec<_> = col.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1", "t3"]);
    }

    #[test]
    fn insert_at_restores_position() {
        let mut col = Collection::new();
        col.upsert(task("t1", "A"));
        col.upsert(task("t2", "B"));
        col.upsert(task("t3", "C"));
        let removed = col.remove(&EntityId::new("t2")).unwrap();
        col.insert_at(1, removed);
        let ids: Vec<_> = col.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn insert_at_clamps_out_of_range() {
        let mut col = Collection::new();
        col.upsert(task("t1", "A"));
        col.insert_at(99, task("t2", "B"));
        let ids: Vec<_> = col.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn rekey_keeps_position_and_value() {
        let mut col = Collection::new();
        col.upsert(task("local-1", "New"));
        col.upsert(task("t9", "Other"));
        assert!(col.rekey(&EntityId::new("local-1"), EntityId::new("t42")));
        let ids: Vec<_> = col.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t42", "t9"]);
        assert_eq!(col.get(&EntityId::new("t42")).unwrap().title, "New");
        assert!(!col.contains(&EntityId::new("local-1")));
    }

    #[test]
    fn rekey_missing_returns_false() {
        let mut col: Collection<Task> = Collection::new();
        assert!(!col.rekey(&EntityId::new("ghost"), EntityId::new("t1")));
    }

    #[test]
    fn replace_all_takes_server_order() {
        let mut col = Collection::new();
        col.upsert(task("t1", "A"));
        col.replace_all(vec![task("t5", "E"), task("t4", "D")]);
        let ids: Vec<_> = col.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t5", "t4"]);
    }
}
