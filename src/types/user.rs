//! User types
//!
//! Users come in three roles. Students own wallets and submit orders,
//! parents approve or reject their linked student's orders and fund the
//! wallet, and the cafeteria fulfills and cancels orders and manages the
//! product catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User identifier
pub type UserId = String;

/// Role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Orders food and owns a token wallet
    Student,

    /// Gates the linked student's purchases and funds their wallet
    Parent,

    /// Fulfills orders and manages the catalog
    Cafeteria,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Cafeteria => "cafeteria",
        };
        f.write_str(s)
    }
}

/// A registered user
///
/// Created at registration and never deleted. The `parent_id` and
/// `child_id` references are mutual: a student's `parent_id` and that
/// parent's `child_id` always point at each other, an invariant maintained
/// by the auth service when the link is established.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user id
    pub id: UserId,

    /// Login email, unique across users
    pub email: String,

    /// Role of this user
    pub role: Role,

    pub first_name: String,
    pub last_name: String,

    /// Student → parent back-reference (lookup only, never ownership)
    pub parent_id: Option<UserId>,

    /// Parent → student forward reference
    pub child_id: Option<UserId>,
}

impl User {
    /// Whether this user is the parent linked to the given student
    pub fn is_parent_of(&self, student_id: &str) -> bool {
        self.role == Role::Parent && self.child_id.as_deref() == Some(student_id)
    }
}
