//! Unit of work - Coda in memoria delle modifiche non ancora salvate

use crate::entities::{Entity, EntityId};

/// A queued change to one entity.
#[derive(Debug, Clone)]
pub enum Mutation<E: Entity> {
    /// Insert a new row; an unassigned identity is filled in by the store
    Insert(E),
    /// Overwrite the row addressed by `key` with `entity` (identity included)
    Update { key: E::Id, entity: E },
    /// Delete the row addressed by `key`.
    /// When `strict` is set a missing row fails the commit.
    Remove { key: E::Id, strict: bool },
}

/// Latest queued state of one identity
#[derive(Debug, PartialEq)]
pub enum Pending<'a, E> {
    Untouched,
    Present(&'a E),
    Removed,
}

/// Ordered batch of mutations, made durable only by
/// [`Store::commit`](super::Store::commit).
///
/// Dropping a unit of work discards everything queued in it.
#[derive(Debug)]
pub struct UnitOfWork<E: Entity> {
    mutations: Vec<Mutation<E>>,
}

impl<E: Entity> Default for UnitOfWork<E> {
    fn default() -> Self {
        Self::begin()
    }
}

impl<E: Entity> UnitOfWork<E> {
    pub fn begin() -> Self {
        Self {
            mutations: Vec::new(),
        }
    }

    pub fn add(&mut self, entity: E) {
        self.mutations.push(Mutation::Insert(entity));
    }

    pub fn update(&mut self, key: E::Id, entity: E) {
        self.mutations.push(Mutation::Update { key, entity });
    }

    pub fn remove(&mut self, key: E::Id) {
        self.mutations.push(Mutation::Remove { key, strict: true });
    }

    pub fn remove_if_present(&mut self, key: E::Id) {
        self.mutations.push(Mutation::Remove { key, strict: false });
    }

    /// Resolves `key` against the queue, most recent mutation first.
    ///
    /// Inserts with an unassigned identity never match: their identity is
    /// only known after the commit.
    pub fn pending(&self, key: &E::Id) -> Pending<'_, E> {
        if key.is_unassigned() {
            return Pending::Untouched;
        }

        for mutation in self.mutations.iter().rev() {
            match mutation {
                Mutation::Insert(entity) if entity.id() == key => return Pending::Present(entity),
                Mutation::Update { entity, .. } if entity.id() == key => {
                    return Pending::Present(entity);
                }
                // the row was moved to another identity
                Mutation::Update { key: old, .. } if old == key => return Pending::Removed,
                Mutation::Remove { key: removed, .. } if removed == key => return Pending::Removed,
                _ => {}
            }
        }

        Pending::Untouched
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn mutations(&self) -> &[Mutation<E>] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation<E>> {
        self.mutations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Item {
        id: i32,
        name: String,
    }

    impl Entity for Item {
        type Id = i32;
        const RESOURCE: &'static str = "items";

        fn id(&self) -> &i32 {
            &self.id
        }

        fn set_id(&mut self, id: i32) {
            self.id = id;
        }
    }

    fn item(id: i32, name: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_untouched_key() {
        let work = UnitOfWork::<Item>::begin();
        assert_eq!(work.pending(&1), Pending::Untouched);
        assert!(work.is_empty());
    }

    #[test]
    fn test_latest_mutation_wins() {
        let mut work = UnitOfWork::begin();
        work.add(item(1, "first"));
        work.update(1, item(1, "second"));

        assert_eq!(work.pending(&1), Pending::Present(&item(1, "second")));

        work.remove(1);
        assert_eq!(work.pending(&1), Pending::Removed);
        assert_eq!(work.len(), 3);
    }

    #[test]
    fn test_update_that_moves_identity() {
        let mut work = UnitOfWork::begin();
        work.update(1, item(5, "moved"));

        assert_eq!(work.pending(&1), Pending::Removed);
        assert_eq!(work.pending(&5), Pending::Present(&item(5, "moved")));
    }

    #[test]
    fn test_unassigned_inserts_never_match() {
        let mut work = UnitOfWork::begin();
        work.add(item(0, "new"));

        assert_eq!(work.pending(&0), Pending::Untouched);
    }

    #[test]
    fn test_remove_modes_are_recorded() {
        let mut work = UnitOfWork::<Item>::begin();
        work.remove(1);
        work.remove_if_present(2);

        let strictness: Vec<bool> = work
            .mutations()
            .iter()
            .map(|m| match m {
                Mutation::Remove { strict, .. } => *strict,
                _ => unreachable!("only removals were queued"),
            })
            .collect();
        assert_eq!(strictness, vec![true, false]);
    }
}
