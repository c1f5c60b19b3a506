//! Login stub and HS256 access tokens.
//!
//! Only the hardcoded `admin` / `admin` pair is accepted. Tokens are compact
//! JWTs (`header.claims.signature`, base64url without padding) signed with
//! HMAC-SHA256.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";
const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token ausente")]
    MissingToken,

    #[error("Token malformado: {0}")]
    MalformedToken(String),

    #[error("Assinatura do token inválida")]
    InvalidSignature,

    #[error("Token expirado")]
    Expired,
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Response body of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Expiry as a Unix timestamp (seconds).
    pub exp: i64,
}

pub struct AuthService {
    key: Vec<u8>,
    expire_minutes: u64,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("key", &"[REDACTED]")
            .field("expire_minutes", &self.expire_minutes)
            .finish()
    }
}

impl AuthService {
    /// Create the service. A missing or empty key is replaced by a random
    /// one; tokens then stop validating when the process restarts.
    pub fn new(secret_key: Option<String>, expire_minutes: u64) -> Self {
        let key = match secret_key {
            Some(key) if !key.is_empty() => key.into_bytes(),
            _ => {
                warn!("No secret key configured; generating a per-process signing key");
                random_key()
            }
        };
        Self {
            key,
            expire_minutes,
        }
    }

    pub fn expire_minutes(&self) -> u64 {
        self.expire_minutes
    }

    /// Check a username/password pair.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        username == ADMIN_USERNAME && password == ADMIN_PASSWORD
    }

    pub fn login(&self, credentials: &Credentials) -> Result<Token, AuthError> {
        if !self.authenticate(&credentials.username, &credentials.password) {
            warn!(username = %credentials.username, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        debug!(username = %credentials.username, "Login accepted");
        Ok(Token {
            access_token: self.create_access_token(&credentials.username),
            token_type: "bearer".into(),
        })
    }

    pub fn create_access_token(&self, subject: &str) -> String {
        self.create_access_token_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn create_access_token_at(&self, subject: &str, now: DateTime<Utc>) -> String {
        let exp = i64::try_from(self.expire_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            exp,
        };

        let header = URL_SAFE_NO_PAD.encode(JWT_HEADER);
        // Serializing a struct of a String and an i64 cannot fail.
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap_or_default());
        let signing_input = format!("{header}.{payload}");
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));
        format!("{signing_input}.{signature}")
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_token_at(token, Utc::now())
    }

    /// Verify signature and expiry against the given time.
    pub fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [header, payload, signature] = parts.as_slice() else {
            return Err(AuthError::MalformedToken("expected three segments".into()));
        };

        let header_json = decode_segment(header)?;
        let header: serde_json::Value = serde_json::from_slice(&header_json)
            .map_err(|e| AuthError::MalformedToken(format!("header: {e}")))?;
        if header["alg"] != "HS256" {
            return Err(AuthError::MalformedToken("unsupported algorithm".into()));
        }

        let signature = decode_segment(signature)?;
        let signing_input = &token[..token.len() - parts[2].len() - 1];
        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidSignature)?;

        let claims: Claims = serde_json::from_slice(&decode_segment(payload)?)
            .map_err(|e| AuthError::MalformedToken(format!("claims: {e}")))?;
        if claims.exp <= now.timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length")
    }

    fn sign(&self, input: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AuthError::MalformedToken(e.to_string()))
}

fn random_key() -> Vec<u8> {
    let mut key = vec![0u8; 32];
    rand::rng().fill(&mut key[..]);
    key
}
