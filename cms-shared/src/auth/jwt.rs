/// Bearer token issuance and validation
///
/// Tokens are HS256-signed JWTs binding a user ID for a fixed 24 hours. They
/// are not persisted server-side; validity is decided by signature, expiry and
/// issuer alone.
///
/// # Claims
///
/// ```json
/// { "userId": "1", "iss": "cms", "iat": 1712345678, "exp": 1712432078 }
/// ```
///
/// # Example
///
/// ```
/// use cms_shared::auth::jwt::{issue_token, validate_token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-server-secret-of-at-least-32-bytes!";
/// let token = issue_token("1", secret)?;
///
/// let claims = validate_token(&token, secret)?;
/// assert_eq!(claims.user_id, "1");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer written into and required from every token
pub const ISSUER: &str = "cms";

/// Lifetime of an issued token
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// ID of the user the token was issued to
    pub user_id: String,

    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring after the standard lifetime
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::with_expiration(user_id, Duration::hours(TOKEN_LIFETIME_HOURS))
    }

    /// Creates claims with a custom lifetime
    ///
    /// A negative duration produces already-expired claims.
    pub fn with_expiration(user_id: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id: user_id.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Signs claims into a compact token
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Issues a token for `user_id` with the standard lifetime
pub fn issue_token(user_id: &str, secret: &str) -> Result<String, JwtError> {
    create_token(&Claims::new(user_id), secret)
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, that `exp` has not passed and that `iss` is
/// [`ISSUER`].
///
/// # Errors
///
/// - `JwtError::Expired` for an expired token
/// - `JwtError::InvalidIssuer` for a foreign issuer
/// - `JwtError::ValidationError` for anything else (bad signature, malformed)
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss"]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
