//! Registration and authentication
//!
//! Users enter the system through [`AuthService::register`], which is where
//! the parent↔child link invariant is established: when a student names a
//! parent (or a parent names a student) at registration, both sides of the
//! link are written, so a student's `parent_id` and that parent's
//! `child_id` always point at each other.
//!
//! Passwords are hashed with Argon2 and stored as PHC strings behind the
//! [`AuthRepository`] boundary, never on the user record itself.

use crate::core::traits::{AuthRepository, Credential, UserRepository};
use crate::types::{CanteenError, Role, User, UserId};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,

    /// For students: the already-registered parent to link to
    pub parent_id: Option<UserId>,

    /// For parents: the already-registered student to link to
    pub child_id: Option<UserId>,
}

/// Registration and login over the user and credential repositories
///
/// Cheap to clone; clones share the underlying repositories.
pub struct AuthService<U, A> {
    users: Arc<U>,
    credentials: Arc<A>,
}

impl<U, A> Clone for AuthService<U, A> {
    fn clone(&self) -> Self {
        AuthService {
            users: Arc::clone(&self.users),
            credentials: Arc::clone(&self.credentials),
        }
    }
}

impl<U, A> AuthService<U, A>
where
    U: UserRepository,
    A: AuthRepository,
{
    /// Create an auth service over the given repositories
    pub fn new(users: Arc<U>, credentials: Arc<A>) -> Self {
        AuthService { users, credentials }
    }

    /// Register a new user
    ///
    /// Validates the profile, hashes the password, creates the user and
    /// stores the credential. When the registration names a counterpart
    /// (student → parent or parent → student), the mutual link is written to
    /// both user records.
    ///
    /// # Errors
    ///
    /// - `Validation` for a malformed email, an empty password, an already
    ///   registered email, a link target with the wrong role, or a link
    ///   target that is already linked elsewhere
    /// - `NotFound` if the named link target does not exist
    pub fn register(&self, registration: Registration) -> Result<User, CanteenError> {
        let email = registration.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(CanteenError::validation(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        if registration.password.is_empty() {
            return Err(CanteenError::validation("password must not be empty"));
        }
        if self.credentials.find_by_email(&email).is_some()
            || self.users.find_by_email(&email).is_some()
        {
            return Err(CanteenError::validation(format!(
                "email '{}' is already registered",
                email
            )));
        }

        // Resolve the link counterpart before creating anything
        let link = match registration.role {
            Role::Student => registration
                .parent_id
                .as_deref()
                .map(|parent_id| self.resolve_link_target(parent_id, Role::Parent))
                .transpose()?,
            Role::Parent => registration
                .child_id
                .as_deref()
                .map(|child_id| self.resolve_link_target(child_id, Role::Student))
                .transpose()?,
            Role::Cafeteria => None,
        };

        let password_hash = hash_password(&registration.password)?;

        let user = self.users.create(User {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            role: registration.role,
            first_name: registration.first_name,
            last_name: registration.last_name,
            parent_id: match registration.role {
                Role::Student => link.as_ref().map(|parent| parent.id.clone()),
                _ => None,
            },
            child_id: match registration.role {
                Role::Parent => link.as_ref().map(|child| child.id.clone()),
                _ => None,
            },
        })?;

        // Write the counterpart's side of the link
        if let Some(counterpart) = link {
            let user_id = user.id.clone();
            match user.role {
                Role::Student => self.users.update(&counterpart.id, |parent| {
                    parent.child_id = Some(user_id.clone());
                    Ok(())
                })?,
                _ => self.users.update(&counterpart.id, |child| {
                    child.parent_id = Some(user_id.clone());
                    Ok(())
                })?,
            };
        }

        self.credentials.store(Credential {
            email,
            user_id: user.id.clone(),
            password_hash,
        })?;

        info!(user = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Verify a login and return the user
    ///
    /// # Errors
    ///
    /// `Unauthorized` on an unknown email or a wrong password; the message
    /// does not reveal which one failed.
    pub fn login(&self, email: &str, password: &str) -> Result<User, CanteenError> {
        let invalid = || CanteenError::unauthorized(email, "log in");

        let credential = self
            .credentials
            .find_by_email(email.trim())
            .ok_or_else(invalid)?;

        let parsed = PasswordHash::new(&credential.password_hash)
            .map_err(|_| CanteenError::validation("stored credential is corrupt"))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| invalid())?;

        self.users.get(&credential.user_id)
    }

    /// Fetch the link target and check it has the expected role and is not
    /// already linked elsewhere
    fn resolve_link_target(&self, id: &str, expected: Role) -> Result<User, CanteenError> {
        let target = self.users.get(id)?;
        if target.role != expected {
            return Err(CanteenError::validation(format!(
                "user '{}' has role {}, expected {}",
                id, target.role, expected
            )));
        }

        let already_linked = match expected {
            Role::Parent => target.child_id.is_some(),
            _ => target.parent_id.is_some(),
        };
        if already_linked {
            return Err(CanteenError::validation(format!(
                "user '{}' is already linked",
                id
            )));
        }

        Ok(target)
    }
}

/// Hash a password with Argon2 and a fresh random salt
fn hash_password(password: &str) -> Result<String, CanteenError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CanteenError::validation(format!("password hashing failed: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::{MemoryAuthRepository, MemoryUserRepository};
    use crate::core::traits::UserRepository;

    fn service() -> AuthService<MemoryUserRepository, MemoryAuthRepository> {
        AuthService::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryAuthRepository::new()),
        )
    }

    fn registration(email: &str, role: Role) -> Registration {
        Registration {
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
            role,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            parent_id: None,
            child_id: None,
        }
    }

    #[test]
    fn test_register_and_login() {
        let auth = service();

        let user = auth
            .register(registration("sam@test.com", Role::Student))
            .unwrap();
        assert_eq!(user.role, Role::Student);

        let logged_in = auth.login("sam@test.com", "hunter2hunter2").unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[test]
    fn test_login_with_wrong_password_fails() {
        let auth = service();
        auth.register(registration("sam@test.com", Role::Student))
            .unwrap();

        let result = auth.login("sam@test.com", "wrong");
        assert!(matches!(result, Err(CanteenError::Unauthorized { .. })));
    }

    #[test]
    fn test_login_with_unknown_email_fails() {
        let auth = service();

        let result = auth.login("nobody@test.com", "whatever");
        assert!(matches!(result, Err(CanteenError::Unauthorized { .. })));
    }

    #[test]
    fn test_register_duplicate_email_fails() {
        let auth = service();
        auth.register(registration("sam@test.com", Role::Student))
            .unwrap();

        let result = auth.register(registration("sam@test.com", Role::Parent));
        assert!(matches!(result, Err(CanteenError::Validation { .. })));
    }

    #[test]
    fn test_register_rejects_bad_email_and_empty_password() {
        let auth = service();

        let result = auth.register(registration("not-an-email", Role::Student));
        assert!(matches!(result, Err(CanteenError::Validation { .. })));

        let mut reg = registration("sam@test.com", Role::Student);
        reg.password = String::new();
        let result = auth.register(reg);
        assert!(matches!(result, Err(CanteenError::Validation { .. })));
    }

    #[test]
    fn test_student_registration_links_both_sides() {
        let auth = service();
        let parent = auth
            .register(registration("pat@test.com", Role::Parent))
            .unwrap();

        let mut reg = registration("sam@test.com", Role::Student);
        reg.parent_id = Some(parent.id.clone());
        let student = auth.register(reg).unwrap();

        assert_eq!(student.parent_id.as_deref(), Some(parent.id.as_str()));
        let parent_after = auth.users.get(&parent.id).unwrap();
        assert_eq!(parent_after.child_id.as_deref(), Some(student.id.as_str()));
    }

    #[test]
    fn test_parent_registration_links_both_sides() {
        let auth = service();
        let student = auth
            .register(registration("sam@test.com", Role::Student))
            .unwrap();

        let mut reg = registration("pat@test.com", Role::Parent);
        reg.child_id = Some(student.id.clone());
        let parent = auth.register(reg).unwrap();

        assert_eq!(parent.child_id.as_deref(), Some(student.id.as_str()));
        let student_after = auth.users.get(&student.id).unwrap();
        assert_eq!(student_after.parent_id.as_deref(), Some(parent.id.as_str()));
    }

    #[test]
    fn test_linking_to_wrong_role_fails() {
        let auth = service();
        let other_student = auth
            .register(registration("kim@test.com", Role::Student))
            .unwrap();

        let mut reg = registration("sam@test.com", Role::Student);
        reg.parent_id = Some(other_student.id);
        let result = auth.register(reg);
        assert!(matches!(result, Err(CanteenError::Validation { .. })));
    }

    #[test]
    fn test_linking_to_already_linked_parent_fails() {
        let auth = service();
        let parent = auth
            .register(registration("pat@test.com", Role::Parent))
            .unwrap();

        let mut first = registration("sam@test.com", Role::Student);
        first.parent_id = Some(parent.id.clone());
        auth.register(first).unwrap();

        let mut second = registration("kim@test.com", Role::Student);
        second.parent_id = Some(parent.id);
        let result = auth.register(second);
        assert!(matches!(result, Err(CanteenError::Validation { .. })));
    }

    #[test]
    fn test_linking_to_unknown_parent_fails() {
        let auth = service();

        let mut reg = registration("sam@test.com", Role::Student);
        reg.parent_id = Some("ghost".to_string());
        let result = auth.register(reg);
        assert!(matches!(result, Err(CanteenError::NotFound { .. })));
    }
}
