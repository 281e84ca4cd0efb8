//! Who is acting, and in which role.
//!
//! A [`Session`] is handed explicitly to every operation that needs an identity. The
//! pure lifecycle computations never see one. [`SessionSlot`] keeps at most one session
//! in memory for the life of the process; nothing is written to disk.

pub mod router;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

pub use router::session_router;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Company,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Company => "company",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "company" => Some(Self::Company),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The signed-in actor. Identity is an email for customers and companies and the admin
/// id for admins. It carries no proof; the auth service vouched for it at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    identity: String,
    role: Role,
}

impl Session {
    pub fn new(identity: impl Into<String>, role: Role) -> Self {
        Self {
            identity: identity.into(),
            role,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The identity, provided the session has the given role.
    pub fn require(&self, role: Role) -> Result<&str, SessionError> {
        self.require_any(&[role])
    }

    pub fn require_any(&self, roles: &[Role]) -> Result<&str, SessionError> {
        if roles.contains(&self.role) {
            Ok(&self.identity)
        } else {
            Err(SessionError::WrongRole {
                required: roles.to_vec(),
                actual: self.role,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no active session; log in first")]
    Missing,
    #[error("a {} session is required, current session is {actual}", join_roles(.required))]
    WrongRole { required: Vec<Role>, actual: Role },
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|role| role.label())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Holds at most one session. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SessionSlot {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionSlot {
    /// Store `session`, returning whichever session it replaced.
    pub fn sign_in(&self, session: Session) -> Option<Session> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.replace(session)
    }

    pub fn sign_out(&self) -> Option<Session> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.take()
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn require(&self) -> Result<Session, SessionError> {
        self.current().ok_or(SessionError::Missing)
    }
}
