//! Durable token storage adapters.

mod file_token_store;

pub use self::file_token_store::{FileTokenStore, TOKEN_FILE_NAME};
