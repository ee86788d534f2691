//! Cart ownership identity
//!
//! Every cart and every checkout belongs to exactly one owner: an
//! authenticated user or an anonymous guest session. The two are modelled as
//! a tagged variant so a request carrying both ids (or neither) is rejected
//! at the boundary instead of silently double-counting a cart.

use std::fmt;

use thiserror::Error;

/// Errors resolving the owner of a request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Neither a user id nor a session id was supplied.
    #[error("no user id or session id supplied")]
    MissingIdentity,

    /// Both a user id and a session id were supplied.
    #[error("both a user id and a session id supplied; exactly one expected")]
    AmbiguousIdentity,
}

/// An authenticated user id, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id from its provider-issued string form.
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An anonymous guest session id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id from its cookie/session string form.
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The owner of a cart: an authenticated user or an anonymous guest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// An authenticated user.
    User(UserId),

    /// An anonymous guest session.
    Guest(SessionId),
}

impl Identity {
    /// Resolves an identity from the raw optional ids a request carries.
    ///
    /// Exactly one of the two must be present.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::MissingIdentity`] if both are absent.
    /// - [`IdentityError::AmbiguousIdentity`] if both are present.
    pub fn resolve(
        user_id: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<Identity, IdentityError> {
        match (user_id, session_id) {
            (Some(user), None) => Ok(Identity::User(UserId::new(user))),
            (None, Some(session)) => Ok(Identity::Guest(SessionId::new(session))),
            (None, None) => Err(IdentityError::MissingIdentity),
            (Some(_), Some(_)) => Err(IdentityError::AmbiguousIdentity),
        }
    }

    /// The user id, if this identity is an authenticated user.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::User(user) => Some(user),
            Identity::Guest(_) => None,
        }
    }
}
