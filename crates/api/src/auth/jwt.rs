//! RS256 token issuance and validation.
//!
//! Both access and refresh tokens are JWTs signed with the configured RSA
//! private key and verified with the matching public key. The `type` claim
//! tells them apart; only `access` tokens authorize API calls. Every token
//! carries a unique `jti` so it can be revoked individually (see
//! [`crate::auth::revocation`]).

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use knowmaint_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clock skew tolerated when checking `exp`.
pub const TOKEN_LEEWAY_SECS: u64 = 60;

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 30;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

/// Which of the two token kinds a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Unique token identifier (UUID v4), the revocation key.
    pub jti: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// How long a revocation entry for this token must live so the token
    /// can never validate again, leeway included.
    pub fn revocation_ttl(&self) -> Duration {
        let now = chrono::Utc::now().timestamp();
        let remaining = u64::try_from(self.exp - now).unwrap_or(0);
        Duration::from_secs(remaining + TOKEN_LEEWAY_SECS)
    }
}

/// Key pair and lifetimes for token generation and validation.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Access token lifetime in minutes (default: 30).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("keys", &"<redacted>")
            .field("access_token_expiry_mins", &self.access_token_expiry_mins)
            .field("refresh_token_expiry_days", &self.refresh_token_expiry_days)
            .finish()
    }
}

impl JwtConfig {
    /// Build a config from PEM-encoded RSA keys.
    pub fn from_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        access_token_expiry_mins: i64,
        refresh_token_expiry_days: i64,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            encoding_key: EncodingKey::from_rsa_pem(private_pem)?,
            decoding_key: DecodingKey::from_rsa_pem(public_pem)?,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        })
    }

    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Default                  |
    /// |----------------------------|--------------------------|
    /// | `JWT_PRIVATE_KEY_PATH`     | `./keys/private_key.pem` |
    /// | `JWT_PUBLIC_KEY_PATH`      | `./keys/public_key.pem`  |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | `30`                     |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | `7`                      |
    ///
    /// # Panics
    ///
    /// Panics if either key file is missing or is not a valid RSA PEM.
    pub fn from_env() -> Self {
        let private_path = std::env::var("JWT_PRIVATE_KEY_PATH")
            .unwrap_or_else(|_| "./keys/private_key.pem".into());
        let public_path = std::env::var("JWT_PUBLIC_KEY_PATH")
            .unwrap_or_else(|_| "./keys/public_key.pem".into());

        let private_pem = std::fs::read(&private_path)
            .unwrap_or_else(|e| panic!("Failed to read JWT private key '{private_path}': {e}"));
        let public_pem = std::fs::read(&public_path)
            .unwrap_or_else(|e| panic!("Failed to read JWT public key '{public_path}': {e}"));

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self::from_pem(
            &private_pem,
            &public_pem,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        )
        .expect("JWT key files must contain valid RSA PEM keys")
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    fn refresh_token_ttl_secs(&self) -> i64 {
        self.refresh_token_expiry_days * 24 * 60 * 60
    }
}

/// Generate a short-lived access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue(user_id, TokenKind::Access, config.access_token_ttl_secs(), config)
}

/// Generate a long-lived refresh token for the given user.
pub fn generate_refresh_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue(user_id, TokenKind::Refresh, config.refresh_token_ttl_secs(), config)
}

fn issue(
    user_id: DbId,
    kind: TokenKind,
    ttl_secs: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        kind,
        jti: Uuid::new_v4().to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    encode(&Header::new(Algorithm::RS256), &claims, &config.encoding_key)
}

/// Verify signature and expiry and return the embedded [`Claims`].
///
/// The token kind and the revocation list are NOT checked here; callers
/// decide which kind they accept.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.leeway = TOKEN_LEEWAY_SECS;
    let token_data = decode::<Claims>(token, &config.decoding_key, &validation)?;
    Ok(token_data.claims)
}
