use cyb3ria_core::Result;
use std::sync::Arc;
use tracing::debug;

use crate::kv::KeyValueStore;

pub const CSRF_TOKEN_KEY: &str = "csrfToken";

/// Access to the persisted CSRF token.
#[derive(Clone)]
pub struct CsrfTokens {
    store: Arc<dyn KeyValueStore>,
}

impl CsrfTokens {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current token, or an empty string when none is held.
    pub fn current(&self) -> Result<String> {
        Ok(self.store.get(CSRF_TOKEN_KEY)?.unwrap_or_default())
    }

    pub fn is_held(&self) -> Result<bool> {
        Ok(!self.current()?.is_empty())
    }

    pub fn rotate(&self, token: &str) -> Result<()> {
        self.store.set(CSRF_TOKEN_KEY, token)?;
        debug!(len = token.len(), "CSRF token rotated");
        Ok(())
    }
}
