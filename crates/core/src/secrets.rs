//! SecretStore trait: where runtime secrets (signing keys, credentials)
//! come from when they are not in the config file.

use async_trait::async_trait;

use crate::error::SecretError;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Human-readable backend name (e.g. "azure_key_vault").
    fn name(&self) -> &str;

    /// Fetch a secret by name. `Ok(None)` means the store has no such secret.
    async fn get_secret(&self, name: &str) -> Result<Option<String>, SecretError>;
}
