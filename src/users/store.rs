//! The in-memory user store.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::ApiError;

use super::model::{User, UserPayload};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::internal(e.to_string())
    }
}

/// In-memory user collection, kept in insertion order.
///
/// Every mutation, id assignment included, runs under the write lock, so
/// concurrent creates never hand out the same id.
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<Vec<User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The startup data set. Deliberately not in id order.
    pub fn seeded() -> Self {
        Self {
            users: RwLock::new(vec![
                User::new(4, "Alice", 35),
                User::new(1, "John", 30),
                User::new(2, "Jane", 25),
                User::new(3, "Bob", 40),
            ]),
        }
    }

    /// A seeded store whose lock was poisoned by a panicking writer.
    #[cfg(test)]
    pub(crate) fn poisoned() -> Self {
        let store = Self::seeded();
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = store.users.write().unwrap();
                    panic!("writer died holding the lock");
                })
                .join();
        });
        store
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<User>>, StoreError> {
        self.users.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<User>>, StoreError> {
        self.users.write().map_err(|_| StoreError::Poisoned)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    /// All users, ascending by id.
    pub fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut users = self.read()?.clone();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    pub fn find(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.iter().find(|u| u.id == id).cloned())
    }

    /// Stores a validated candidate under `max(id) + 1` (1 when empty).
    pub fn create(&self, candidate: UserPayload) -> Result<User, StoreError> {
        let mut users = self.write()?;
        let id = users.iter().map(|u| u.id).max().map_or(1, |max| max + 1);
        let user = User::new(id, candidate.user_name.trim(), candidate.age);
        users.push(user.clone());
        Ok(user)
    }

    /// Replaces the record at `id` in place. `None` if there is none.
    pub fn update(&self, id: i32, candidate: UserPayload) -> Result<Option<User>, StoreError> {
        let mut users = self.write()?;
        let Some(slot) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        *slot = User::new(id, candidate.user_name.trim(), candidate.age);
        Ok(Some(slot.clone()))
    }

    /// Removes the record at `id`; reports whether there was one.
    pub fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut users = self.write()?;
        match users.iter().position(|u| u.id == id) {
            Some(index) => {
                users.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
