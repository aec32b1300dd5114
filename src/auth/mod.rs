//! Credential storage and token claims.

pub mod claims;
pub mod error;
pub mod store;
pub mod token;

pub use claims::Session;
pub use error::AuthError;
pub use store::{CredentialStore, CredentialStoreConfig, FileCredentialStore, MemoryCredentialStore};
pub use token::Credentials;
