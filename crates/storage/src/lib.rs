pub mod csrf;
pub mod file;
pub mod identity;
pub mod kv;

pub use csrf::{CsrfTokens, CSRF_TOKEN_KEY};
pub use file::FileStore;
pub use identity::{ClientId, CLIENT_ID_KEY};
pub use kv::{InMemoryStore, KeyValueStore};
