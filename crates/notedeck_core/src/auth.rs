//! Session provider seam.
//!
//! The provider answers "who is signed in"; redirecting anonymous visitors
//! is the caller's concern. A `None` session means not authenticated.

use crate::model::note::User;

/// Supplies the authenticated user, if any.
pub trait SessionProvider {
    fn get_session(&self) -> Option<User>;
}

/// Provider with a fixed answer, built from configuration or CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSessionProvider {
    user: Option<User>,
}

impl StaticSessionProvider {
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

impl From<Option<User>> for StaticSessionProvider {
    fn from(user: Option<User>) -> Self {
        Self { user }
    }
}

impl SessionProvider for StaticSessionProvider {
    fn get_session(&self) -> Option<User> {
        self.user.clone()
    }
}
