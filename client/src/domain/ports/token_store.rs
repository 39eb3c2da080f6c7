//! Driven port for durable token slots.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use super::define_port_error;
use crate::domain::AccessToken;

/// Named token slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenSlot {
    /// Bearer token attached to API requests.
    Access,
    /// Token exchanged for a fresh access token.
    Refresh,
}

impl TokenSlot {
    /// Both slots.
    pub const ALL: [Self; 2] = [Self::Access, Self::Refresh];

    /// Storage key for the slot.
    pub fn key(self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

impl fmt::Display for TokenSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

define_port_error! {
    /// Failures raised by token storage.
    pub enum TokenStoreError {
        /// The backing medium could not be read or written.
        Io { message: String } => "token storage failed: {message}",
        /// Stored content could not be parsed.
        Corrupt { message: String } => "token storage is unreadable: {message}",
    }
}

/// Durable key/value storage for session tokens.
///
/// Calls are synchronous and short; stores never hold them across an await.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// Read the token held in `slot`.
    fn load(&self, slot: TokenSlot) -> Result<Option<AccessToken>, TokenStoreError>;

    /// Replace the token held in `slot`.
    fn save(&self, slot: TokenSlot, token: &AccessToken) -> Result<(), TokenStoreError>;

    /// Empty `slot`. Clearing an empty slot succeeds.
    fn clear(&self, slot: TokenSlot) -> Result<(), TokenStoreError>;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    slots: Mutex<BTreeMap<TokenSlot, AccessToken>>,
}

impl InMemoryTokenStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with an access token.
    pub fn with_access_token(token: impl Into<AccessToken>) -> Self {
        let store = Self::default();
        store
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TokenSlot::Access, token.into());
        store
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self, slot: TokenSlot) -> Result<Option<AccessToken>, TokenStoreError> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(&slot).cloned())
    }

    fn save(&self, slot: TokenSlot, token: &AccessToken) -> Result<(), TokenStoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(slot, token.clone());
        Ok(())
    }

    fn clear(&self, slot: TokenSlot) -> Result<(), TokenStoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(&slot);
        Ok(())
    }
}
