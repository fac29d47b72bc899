/// Role checks for authenticated callers
///
/// Roles are hierarchical (`admin` > `editor` > `user`), so requiring a role
/// admits that role and every role above it.
///
/// # Example
///
/// ```
/// use cms_shared::auth::authorization::require_role;
/// use cms_shared::auth::middleware::AuthContext;
/// use cms_shared::models::user::{Role, User};
///
/// let editor = User::new("2".into(), "ed".into(), "ed@site.com".into(), "hash".into(), Role::Editor, Default::default());
/// let auth = AuthContext { user: editor };
///
/// assert!(require_role(&auth, Role::Editor).is_ok());
/// assert!(require_role(&auth, Role::Admin).is_err());
/// ```

use super::middleware::AuthContext;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role is below the required one
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    InsufficientRole { required: Role, actual: Role },
}

/// Checks that the caller holds `required` or a higher role
pub fn require_role(auth: &AuthContext, required: Role) -> Result<(), AuthzError> {
    let actual = auth.user.role;

    if !actual.has_permission(&required) {
        tracing::debug!(user_id = %auth.user.id, %required, %actual, "Role check failed");
        return Err(AuthzError::InsufficientRole { required, actual });
    }

    Ok(())
}

/// Checks that the caller is an administrator
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    require_role(auth, Role::Admin)
}
