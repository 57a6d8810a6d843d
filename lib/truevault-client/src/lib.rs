//! truevault-client - Rust client for the TrueVault document vault API
//!
//! Every call authenticates with HTTP Basic auth (API key as username, empty
//! password) and returns the decoded JSON body as an [`ApiResponse`]:
//!
//! ```no_run
//! # async fn run() -> Result<(), truevault_client::TrueVaultError> {
//! let client = truevault_client::VaultClient::new("api-key", None, None)?;
//! let vaults = client.list_vaults().await?;
//! assert!(vaults.is_success());
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod error;
mod models;
mod schemas;
mod users;

pub use auth::ApiKeyAuth;
pub use client::{DEFAULT_API_VERSION, DEFAULT_BASE_URL, VaultClient, VaultClientBuilder};
pub use error::{ErrorKind, TrueVaultError};
pub use models::{ApiResponse, BlobUpload, Vault};
