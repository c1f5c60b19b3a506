//! Azure Key Vault secret lookup.
//!
//! Authenticates with the OAuth2 client-credentials flow and reads secrets
//! through the Key Vault REST API. The access token is cached until shortly
//! before it expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use wordsplit_config::KeyVaultConfig;
use wordsplit_core::{SecretError, SecretStore};

const VAULT_SCOPE: &str = "https://vault.azure.net/.default";
const API_VERSION: &str = "7.4";
/// Refresh the token this long before the authority says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct SecretBundle {
    value: String,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct KeyVaultClient {
    vault_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for KeyVaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVaultClient")
            .field("vault_url", &self.vault_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl KeyVaultClient {
    pub fn new(
        vault_url: impl Into<String>,
        authority_host: &str,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, SecretError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SecretError::Network(e.to_string()))?;

        Ok(Self {
            vault_url: vault_url.into().trim_end_matches('/').to_string(),
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                authority_host.trim_end_matches('/'),
                tenant_id
            ),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            client,
            token: Mutex::new(None),
        })
    }

    /// Build a client from config. `Ok(None)` when no vault URL is set.
    pub fn from_config(config: &KeyVaultConfig) -> Result<Option<Self>, SecretError> {
        if !config.is_configured() {
            return Ok(None);
        }

        let required = |value: &Option<String>, name: &str| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
                .ok_or_else(|| SecretError::NotConfigured(format!("missing {name}")))
        };
        let vault_url = required(&config.dns, "AzureKeyVault__Dns")?;
        let tenant_id = required(&config.tenant_id, "AzureKeyVault__TenantId")?;
        let client_id = required(&config.client_id, "AzureKeyVault__ClientId")?;
        let client_secret = required(&config.client_secret, "AzureKeyVault__ClientSecret")?;

        Self::new(
            vault_url,
            &config.authority_host,
            &tenant_id,
            client_id,
            client_secret,
        )
        .map(Some)
    }

    pub fn vault_url(&self) -> &str {
        &self.vault_url
    }

    async fn access_token(&self) -> Result<String, SecretError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        debug!(url = %self.token_url, "Requesting Key Vault access token");
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", VAULT_SCOPE),
        ];
        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| SecretError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Key Vault token request rejected");
            return Err(SecretError::Authentication(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SecretError::Authentication(format!("invalid token response: {e}")))?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        });
        Ok(token.access_token)
    }
}

/// Key Vault secret names are 1-127 characters of `[0-9a-zA-Z-]`.
fn is_valid_secret_name(name: &str) -> bool {
    (1..=127).contains(&name.len())
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

#[async_trait]
impl SecretStore for KeyVaultClient {
    fn name(&self) -> &str {
        "azure_key_vault"
    }

    async fn get_secret(&self, name: &str) -> Result<Option<String>, SecretError> {
        if !is_valid_secret_name(name) {
            return Err(SecretError::InvalidName(name.to_string()));
        }
        let token = self.access_token().await?;
        let url = format!("{}/secrets/{}?api-version={API_VERSION}", self.vault_url, name);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SecretError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 404 {
            debug!(secret = name, "Secret not found in Key Vault");
            return Ok(None);
        }
        if status == 401 || status == 403 {
            return Err(SecretError::Authentication(format!(
                "access to secret '{name}' denied (status {status})"
            )));
        }
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status, secret = name, "Key Vault returned error");
            return Err(SecretError::Request {
                status_code: status,
                message,
            });
        }

        let bundle: SecretBundle = response.json().await.map_err(|e| SecretError::Request {
            status_code: status,
            message: format!("Failed to parse response: {e}"),
        })?;
        info!(secret = name, "Secret retrieved from Key Vault");
        Ok(Some(bundle.value))
    }
}
