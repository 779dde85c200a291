use cyb3ria_core::Result;
use std::fmt;
use tracing::{debug, info};
use uuid::{Uuid, Variant};

use crate::kv::KeyValueStore;

pub const CLIENT_ID_KEY: &str = "clientId";

/// Per-profile chat identity. Opaque to everything except generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Fresh random identifier in lowercase hyphenated v4 form.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Return the stored identifier, creating and persisting one on first use.
    /// A stored value is never replaced.
    pub fn load_or_create(store: &dyn KeyValueStore) -> Result<Self> {
        if let Some(existing) = store.get(CLIENT_ID_KEY)? {
            if !existing.is_empty() {
                debug!(client_id = %existing, "Loaded client id");
                return Ok(Self(existing));
            }
        }
        let id = Self::generate();
        store.set(CLIENT_ID_KEY, id.as_str())?;
        info!(client_id = %id, "Generated new client id");
        Ok(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 36 characters, hyphens at 8/13/18/23, version nibble `4`, variant in {8,9,a,b}.
    pub fn is_v4_shaped(s: &str) -> bool {
        let bytes = s.as_bytes();
        if bytes.len() != 36 {
            return false;
        }
        for (i, b) in bytes.iter().enumerate() {
            let ok = match i {
                8 | 13 | 18 | 23 => *b == b'-',
                _ => b.is_ascii_digit() || (b'a'..=b'f').contains(b),
            };
            if !ok {
                return false;
            }
        }
        match Uuid::try_parse(s) {
            Ok(uuid) => uuid.get_version_num() == 4 && uuid.get_variant() == Variant::RFC4122,
            Err(_) => false,
        }
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClientId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryStore;
    use regex::Regex;

    #[test]
    fn test_generated_ids_match_v4_pattern() {
        let re = Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
            .unwrap();
        for _ in 0..64 {
            let id = ClientId::generate();
            assert!(re.is_match(id.as_str()), "bad id {}", id);
            assert!(ClientId::is_v4_shaped(id.as_str()));
        }
    }

    #[test]
    fn test_two_generations_differ() {
        assert_ne!(ClientId::generate(), ClientId::generate());
    }

    #[test]
    fn test_fresh_stores_get_different_ids() {
        let a = ClientId::load_or_create(&InMemoryStore::new()).unwrap();
        let b = ClientId::load_or_create(&InMemoryStore::new()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_persisted_id_is_stable() {
        let store = InMemoryStore::new();
        let first = ClientId::load_or_create(&store).unwrap();
        for _ in 0..5 {
            assert_eq!(ClientId::load_or_create(&store).unwrap(), first);
        }
        assert_eq!(store.get(CLIENT_ID_KEY).unwrap().as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_existing_value_kept_verbatim() {
        let store = InMemoryStore::new();
        store.set(CLIENT_ID_KEY, "abc-123").unwrap();
        assert_eq!(ClientId::load_or_create(&store).unwrap().as_str(), "abc-123");
    }

    #[test]
    fn test_shape_rejections() {
        assert!(ClientId::is_v4_shaped("1b4e28ba-2fa1-41d2-883f-0016d3cca427"));
        // version 1
        assert!(!ClientId::is_v4_shaped("1b4e28ba-2fa1-11d2-883f-0016d3cca427"));
        // variant nibble c
        assert!(!ClientId::is_v4_shaped("1b4e28ba-2fa1-41d2-c83f-0016d3cca427"));
        // uppercase
        assert!(!ClientId::is_v4_shaped("1B4E28BA-2FA1-41D2-883F-0016D3CCA427"));
        // simple form
        assert!(!ClientId::is_v4_shaped("1b4e28ba2fa141d2883f0016d3cca427"));
        assert!(!ClientId::is_v4_shaped("abc-123"));
    }
}
