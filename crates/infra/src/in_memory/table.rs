use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use smartstore_core::{Entity, StoreError, StoreResult};

/// Entities keyed by id behind a single lock.
#[derive(Debug)]
pub(crate) struct Table<E: Entity> {
    rows: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<E> Table<E>
where
    E: Entity + Clone,
{
    pub fn get(&self, id: &E::Id) -> StoreResult<Option<E>> {
        Ok(self.read()?.get(id).cloned())
    }

    /// Insert a new row (`Duplicate` if the id is taken).
    pub fn insert(&self, entity: E) -> StoreResult<()> {
        let mut rows = self.write()?;
        let id = *entity.id();
        if rows.contains_key(&id) {
            return Err(StoreError::Duplicate {
                entity: E::KIND,
                id: id.to_string(),
            });
        }
        rows.insert(id, entity);
        Ok(())
    }

    /// Run `f` on the row under the write lock; the row is only changed if `f` changes it.
    pub fn update<R, F>(&self, id: &E::Id, f: F) -> StoreResult<R>
    where
        F: FnOnce(&mut E) -> StoreResult<R>,
    {
        let mut rows = self.write()?;
        let row = rows
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(E::KIND, id))?;
        f(row)
    }

    pub fn filter<P>(&self, predicate: P) -> StoreResult<Vec<E>>
    where
        P: Fn(&E) -> bool,
    {
        Ok(self
            .read()?
            .values()
            .filter(|e| predicate(e))
            .cloned()
            .collect())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<E::Id, E>>> {
        self.rows
            .read()
            .map_err(|_| StoreError::backend(format!("{} table lock poisoned", E::KIND)))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<E::Id, E>>> {
        self.rows
            .write()
            .map_err(|_| StoreError::backend(format!("{} table lock poisoned", E::KIND)))
    }
}
