/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Bearer token issuance and validation
/// - [`middleware`]: Resolving a request's bearer token to a stored user
/// - [`authorization`]: Role checks on the resolved user
///
/// # Example
///
/// ```no_run
/// use cms_shared::auth::password::{hash_password, verify_password};
/// use cms_shared::auth::jwt::{issue_token, validate_token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let secret = "a-server-secret-of-at-least-32-bytes!";
/// let token = issue_token("1", secret)?;
/// assert_eq!(validate_token(&token, secret)?.user_id, "1");
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
