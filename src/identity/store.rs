//! Identity storage.
//!
//! `IdentityStore` is the seam endpoint logic depends on; `MemoryIdentityStore`
//! is the process-local implementation (lost on restart).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use super::credential::{self, CredentialError};
use super::principal::Identity;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity already exists")]
    AlreadyExists,
    #[error("identity not found")]
    NotFound,
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

pub trait IdentityStore: Send + Sync {
    /// Create a new identity with a freshly generated credential.
    /// Fails with `AlreadyExists` if `nik` is taken.
    fn create(&self, nik: &str, role: &str) -> Result<Identity, StoreError>;

    fn find_by_nik(&self, nik: &str) -> Result<Identity, StoreError>;
}

pub type SharedIdentityStore = Arc<dyn IdentityStore>;

struct Inner {
    by_nik: HashMap<String, Identity>,
    next_id: u64,
}

/// Source of one-time credentials for new identities.
pub type CredentialSource = fn() -> Result<String, CredentialError>;

pub struct MemoryIdentityStore {
    inner: RwLock<Inner>,
    generate: CredentialSource,
}

impl Default for MemoryIdentityStore {
    fn default() -> Self { Self::with_generator(credential::generate) }
}

impl MemoryIdentityStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_generator(generate: CredentialSource) -> Self {
        Self { inner: RwLock::new(Inner { by_nik: HashMap::new(), next_id: 1 }), generate }
    }

    pub fn len(&self) -> usize { self.inner.read().by_nik.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl IdentityStore for MemoryIdentityStore {
    fn create(&self, nik: &str, role: &str) -> Result<Identity, StoreError> {
        // Drawn before locking; a failure leaves the store and the id counter untouched.
        let password = (self.generate)()?;
        // Existence check, id allocation and insert happen under one write lock.
        let mut inner = self.inner.write();
        if inner.by_nik.contains_key(nik) {
            return Err(StoreError::AlreadyExists);
        }
        let identity = Identity {
            id: inner.next_id,
            nik: nik.to_string(),
            role: role.to_string(),
            password,
        };
        inner.next_id += 1;
        inner.by_nik.insert(identity.nik.clone(), identity.clone());
        debug!(target: "authgate::store", id = identity.id, "identity stored");
        Ok(identity)
    }

    fn find_by_nik(&self, nik: &str) -> Result<Identity, StoreError> {
        self.inner.read().by_nik.get(nik).cloned().ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_sequential_ids_from_one() {
        let store = MemoryIdentityStore::new();
        let a = store.create("111", "user").unwrap();
        let b = store.create("222", "admin").unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.role, "admin");
        assert_eq!(a.password.len(), credential::CREDENTIAL_LEN);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn duplicate_nik_is_rejected_and_does_not_consume_an_id() {
        let store = MemoryIdentityStore::new();
        let first = store.create("123", "user").unwrap();
        assert!(matches!(store.create("123", "admin"), Err(StoreError::AlreadyExists)));
        // The stored record is untouched by the failed attempt.
        assert_eq!(store.find_by_nik("123").unwrap(), first);
        assert_eq!(store.create("456", "user").unwrap().id, 2);
    }

    #[test]
    fn find_unknown_nik_is_not_found() {
        let store = MemoryIdentityStore::new();
        assert!(store.is_empty());
        assert!(matches!(store.find_by_nik("nope"), Err(StoreError::NotFound)));
    }

    fn exhausted_entropy() -> Result<String, CredentialError> {
        Err(CredentialError::Entropy("source closed".into()))
    }

    #[test]
    fn credential_failure_stores_nothing_and_consumes_no_id() {
        let failing = MemoryIdentityStore::with_generator(exhausted_entropy);
        assert!(matches!(failing.create("123", "user"), Err(StoreError::Credential(_))));
        assert!(failing.is_empty());
        assert!(matches!(failing.find_by_nik("123"), Err(StoreError::NotFound)));

        // Same sequence with a working source: the first successful create is id 1.
        let store = MemoryIdentityStore::with_generator(|| {
            static CALLS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
            if CALLS.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                exhausted_entropy()
            } else {
                credential::generate()
            }
        });
        assert!(store.create("123", "user").is_err());
        assert_eq!(store.len(), 0);
        let created = store.create("123", "user").unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.password.len(), credential::CREDENTIAL_LEN);
    }

    #[test]
    fn concurrent_create_same_nik_has_exactly_one_winner() {
        let store = Arc::new(MemoryIdentityStore::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let s = store.clone();
                std::thread::spawn(move || s.create("race", "user").is_ok())
            })
            .collect();
        let wins = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();
        assert_eq!(wins, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_nik("race").unwrap().id, 1);
    }

    #[test]
    fn concurrent_create_distinct_niks_gets_unique_ids() {
        let store = Arc::new(MemoryIdentityStore::new());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let s = store.clone();
                std::thread::spawn(move || s.create(&format!("nik-{i}"), "user").unwrap().id)
            })
            .collect();
        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<u64>>());
    }
}
