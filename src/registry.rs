use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::models::{NewUser, UserRecord};

#[derive(Debug, PartialEq, Eq)]
pub enum InsertError {
    DuplicateEmail,
}

/// Storage behind the registration handler. Injected as `Arc<dyn UserStore>`
/// so a persistent backend can replace the in-memory list without touching
/// the handler.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Option<UserRecord>;

    /// Inserts the candidate with a fresh id, or rejects it if a record with
    /// the same email already exists. The uniqueness check and the append
    /// happen atomically; a rejected candidate is not stored.
    async fn insert(
        &self,
        user: NewUser,
        password_hash: String,
    ) -> Result<UserRecord, InsertError>;

    /// The full registry in insertion order.
    async fn all(&self) -> Vec<UserRecord>;
}

// Emails differing only in ASCII case refer to the same mailbox here.
fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Process-lifetime registry: ids are a monotonic counter starting at 1,
/// records live until the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: u32,
    users: Vec<UserRecord>,
}

impl InMemoryStore {
    fn locked(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        self.locked()
            .users
            .iter()
            .find(|user| same_email(&user.email, email))
            .cloned()
    }

    async fn insert(
        &self,
        user: NewUser,
        password_hash: String,
    ) -> Result<UserRecord, InsertError> {
        // One guard across check and append: no window for a racing insert.
        let mut inner = self.locked();
        if inner
            .users
            .iter()
            .any(|existing| same_email(&existing.email, &user.email))
        {
            return Err(InsertError::DuplicateEmail);
        }
        inner.last_id += 1;
        let record = UserRecord {
            id: inner.last_id,
            name: user.name,
            password_hash,
            email: user.email,
            website: user.website,
            age: user.age,
            skills: user.skills,
        };
        inner.users.push(record.clone());
        Ok(record)
    }

    async fn all(&self) -> Vec<UserRecord> {
        self.locked().users.clone()
    }
}
