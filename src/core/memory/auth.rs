//! In-memory credential store

use crate::core::traits::{AuthRepository, Credential};
use dashmap::DashMap;

use crate::types::CanteenError;

/// Thread-safe in-memory credential store, keyed by login email
#[derive(Debug, Default)]
pub struct MemoryAuthRepository {
    credentials: DashMap<String, Credential>,
}

impl MemoryAuthRepository {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthRepository for MemoryAuthRepository {
    fn store(&self, credential: Credential) -> Result<(), CanteenError> {
        if self.credentials.contains_key(&credential.email) {
            return Err(CanteenError::validation(format!(
                "email '{}' is already registered",
                credential.email
            )));
        }

        self.credentials
            .insert(credential.email.clone(), credential);
        Ok(())
    }

    fn find_by_email(&self, email: &str) -> Option<Credential> {
        self.credentials
            .get(email)
            .map(|entry| entry.value().clone())
    }
}
