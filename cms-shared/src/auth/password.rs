/// Password hashing using Argon2id
///
/// Stored user passwords are PHC strings produced by [`hash_password_with`].
/// The cost parameters are embedded in each hash, so changing
/// [`PasswordParams`] only affects newly hashed passwords and existing hashes
/// keep verifying.
///
/// # Default parameters
///
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use cms_shared::auth::password::{hash_password_with, verify_password, PasswordParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = PasswordParams { memory_kib: 1024, iterations: 1, parallelism: 1 };
/// let hash = hash_password_with("admin123", &params)?;
///
/// assert!(verify_password("admin123", &hash)?);
/// assert!(!verify_password("admin124", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use serde::{Deserialize, Serialize};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordParams {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl PasswordParams {
    fn hasher(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(self.memory_kib)
            .t_cost(self.iterations)
            .p_cost(self.parallelism)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

        Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hashes a password with the default parameters
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with(password, &PasswordParams::default())
}

/// Hashes a password with explicit cost parameters
///
/// A fresh 16-byte salt is drawn from the OS RNG for every call.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if the parameters are out of range or
/// hashing fails
pub fn hash_password_with(password: &str, params: &PasswordParams) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// The comparison is constant-time. Parameters are read from the hash itself.
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if `hash` is not a complete PHC string and
/// `PasswordError::VerifyError` for other failures
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    if parsed_hash.hash.is_none() {
        return Err(PasswordError::InvalidHash("Hash has no output".to_string()));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Runs [`hash_password_with`] on the blocking thread pool
pub async fn hash_password_blocking(
    password: String,
    params: PasswordParams,
) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password_with(&password, &params))
        .await
        .map_err(|e| PasswordError::HashError(format!("Task join error: {}", e)))?
}

/// Runs [`verify_password`] on the blocking thread pool
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::VerifyError(format!("Task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: PasswordParams = PasswordParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn test_default_params_embedded() {
        let hash = hash_password("admin123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536,t=3,p=4"));
    }

    #[test]
    fn test_custom_params_embedded() {
        let hash = hash_password_with("admin123", &FAST).expect("Hash should succeed");
        assert!(hash.contains("m=1024,t=1,p=1"));
    }

    #[test]
    fn test_hash_uses_fresh_salt() {
        let hash1 = hash_password_with("same_password", &FAST).unwrap();
        let hash2 = hash_password_with("same_password", &FAST).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_round_trip() {
        for password in ["simple", "with spaces", "unicode-密码", ""] {
            let hash = hash_password_with(password, &FAST).unwrap();
            assert!(verify_password(password, &hash).unwrap(), "{password:?} should verify");
        }
    }

    #[test]
    fn test_verify_rejects_other_password() {
        let hash = hash_password_with("correct_password", &FAST).unwrap();

        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        assert!(matches!(
            verify_password("password", "plaintext"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(matches!(
            verify_password("password", "$argon2id$invalid"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[tokio::test]
    async fn test_blocking_wrappers_round_trip() {
        let hash = hash_password_blocking("secret".to_string(), FAST).await.unwrap();

        assert!(verify_password_blocking("secret".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("other".to_string(), hash).await.unwrap());
        assert!(matches!(
            verify_password_blocking("secret".to_string(), "plaintext".to_string()).await,
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = PasswordParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        };

        assert!(matches!(
            hash_password_with("x", &params),
            Err(PasswordError::HashError(_))
        ));
    }
}
