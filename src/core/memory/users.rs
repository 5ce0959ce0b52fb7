//! In-memory user repository

use crate::core::traits::UserRepository;
use crate::types::{CanteenError, User, UserId};
use dashmap::DashMap;

/// Thread-safe in-memory user store
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: DashMap<UserId, User>,
}

impl MemoryUserRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryUserRepository {
    fn create(&self, user: User) -> Result<User, CanteenError> {
        if self.users.contains_key(&user.id) {
            return Err(CanteenError::validation(format!(
                "user '{}' already exists",
                user.id
            )));
        }

        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn get(&self, user_id: &str) -> Result<User, CanteenError> {
        self.users
            .get(user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CanteenError::not_found("user", user_id))
    }

    fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone())
    }

    fn update<F>(&self, user_id: &str, f: F) -> Result<User, CanteenError>
    where
        F: FnOnce(&mut User) -> Result<(), CanteenError>,
    {
        let mut entry = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| CanteenError::not_found("user", user_id))?;

        // Commit only on success, mirroring the order repository
        let mut updated = entry.value().clone();
        f(&mut updated)?;
        *entry.value_mut() = updated.clone();

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn student(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            role: Role::Student,
            first_name: "Sam".to_string(),
            last_name: "Doe".to_string(),
            parent_id: None,
            child_id: None,
        }
    }

    #[test]
    fn test_create_and_get() {
        let repo = MemoryUserRepository::new();
        repo.create(student("s1", "sam@test.com")).unwrap();

        let fetched = repo.get("s1").unwrap();
        assert_eq!(fetched.email, "sam@test.com");
        assert_eq!(fetched.role, Role::Student);
    }

    #[test]
    fn test_create_duplicate_id_fails() {
        let repo = MemoryUserRepository::new();
        repo.create(student("s1", "sam@test.com")).unwrap();

        let result = repo.create(student("s1", "other@test.com"));
        assert!(matches!(result, Err(CanteenError::Validation { .. })));
    }

    #[test]
    fn test_find_by_email() {
        let repo = MemoryUserRepository::new();
        repo.create(student("s1", "sam@test.com")).unwrap();

        assert_eq!(repo.find_by_email("sam@test.com").unwrap().id, "s1");
        assert!(repo.find_by_email("nobody@test.com").is_none());
    }

    #[test]
    fn test_update_commits_on_success() {
        let repo = MemoryUserRepository::new();
        repo.create(student("s1", "sam@test.com")).unwrap();

        repo.update("s1", |user| {
            user.parent_id = Some("p1".to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(repo.get("s1").unwrap().parent_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_update_rolls_back_on_error() {
        let repo = MemoryUserRepository::new();
        repo.create(student("s1", "sam@test.com")).unwrap();

        let result = repo.update("s1", |user| {
            user.parent_id = Some("p1".to_string());
            Err(CanteenError::validation("rejected mid-update"))
        });

        assert!(result.is_err());
        assert_eq!(repo.get("s1").unwrap().parent_id, None);
    }

    #[test]
    fn test_update_unknown_user_fails() {
        let repo = MemoryUserRepository::new();

        let result = repo.update("missing", |_| Ok(()));
        assert!(matches!(result, Err(CanteenError::NotFound { .. })));
    }
}
