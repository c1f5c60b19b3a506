//! Security for wordsplit: access tokens and secret lookup.
//!
//! Provides:
//! - **Auth**: the `admin`/`admin` login stub and HS256 bearer tokens
//! - **Key Vault**: Azure Key Vault client implementing [`SecretStore`]
//! - **Key resolution**: where the token signing key comes from at startup

pub mod auth;
pub mod keyvault;

pub use auth::{AuthError, AuthService, Claims, Credentials, Token};
pub use keyvault::KeyVaultClient;

use tracing::{info, warn};
use wordsplit_config::{AuthConfig, KeyVaultConfig};
use wordsplit_core::SecretStore;

/// Find the token signing key.
///
/// An explicit `auth.secret_key` wins. Otherwise the configured vault is
/// asked for `key_vault.secret_key_name`. Any vault failure is logged and
/// yields `None`, which makes [`AuthService::new`] generate a random key.
pub async fn resolve_signing_key(auth: &AuthConfig, vault: &KeyVaultConfig) -> Option<String> {
    if let Some(key) = auth.secret_key.as_deref().filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    let client = match KeyVaultClient::from_config(vault) {
        Ok(Some(client)) => client,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "Key Vault misconfigured; using a generated signing key");
            return None;
        }
    };

    fetch_key(&client, &vault.secret_key_name).await
}

async fn fetch_key(store: &dyn SecretStore, name: &str) -> Option<String> {
    match store.get_secret(name).await {
        Ok(Some(value)) if !value.is_empty() => {
            info!(store = store.name(), secret = name, "Signing key loaded from secret store");
            Some(value)
        }
        Ok(_) => {
            warn!(store = store.name(), secret = name, "Signing key secret is missing or empty");
            None
        }
        Err(e) => {
            warn!(store = store.name(), secret = name, error = %e, "Failed to fetch signing key");
            None
        }
    }
}
