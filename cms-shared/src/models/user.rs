/// User model and collection operations
///
/// This module provides the User record stored in the `users` collection and
/// the in-memory operations routers apply to that collection: uniqueness
/// checks, updates, and the last-admin guard.
///
/// # Stored shape
///
/// ```json
/// {
///   "id": "1712345678901",
///   "username": "admin",
///   "email": "admin@admin.com",
///   "password": "$argon2id$v=19$...",
///   "role": "admin",
///   "status": "active",
///   "lastLogin": null,
///   "createdAt": "2024-04-05T12:00:00Z",
///   "updatedAt": "2024-04-05T12:00:00Z"
/// }
/// ```
///
/// # Example
///
/// ```
/// use cms_shared::models::user::{ensure_unique, Role, User};
///
/// let admin = User::new("1".into(), "admin".into(), "admin@admin.com".into(), "hash".into(), Role::Admin, Default::default());
/// let users = vec![admin];
///
/// assert!(ensure_unique(&users, Some("admin"), None, None).is_err());
/// assert!(ensure_unique(&users, Some("editor"), Some("editor@site.com"), None).is_ok());
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Error type for user collection operations
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Username or email already taken by another user
    #[error("Username or email already exists")]
    DuplicateIdentity,

    /// No user with the given ID
    #[error("User not found: {0}")]
    NotFound(String),

    /// Operation would leave the collection without an administrator
    #[error("At least one active administrator must remain")]
    LastAdmin,

    /// A user tried to delete their own account
    #[error("You cannot delete your own user")]
    SelfDeletion,
}

/// User role
///
/// Roles are hierarchical: `Admin` > `Editor` > `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access including user management
    Admin,

    /// Content management
    #[default]
    Editor,

    /// Basic authenticated access
    User,
}

impl Role {
    /// Gets role as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::User => "user",
        }
    }

    /// Checks if this role satisfies a required role
    pub fn has_permission(&self, required: &Role) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Editor => 2,
            Role::User => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    /// Gets status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record as stored in the `users` collection
///
/// The `password` field holds an Argon2id PHC string, never plaintext.
/// Use [`User::public`] before returning a user to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (millisecond timestamp string)
    pub id: String,

    /// Login name, unique across users
    pub username: String,

    /// Email address, unique across users
    pub email: String,

    /// Salted password hash
    pub password: String,

    /// Role
    #[serde(default)]
    pub role: Role,

    /// Account status
    #[serde(default)]
    pub status: UserStatus,

    /// Last successful login
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,

    /// When the user was created
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// User without the password hash, safe to return to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUser {
    /// Login name
    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password (hashed before storage)
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Role (defaults to editor)
    pub role: Option<Role>,

    /// Status (defaults to active)
    pub status: Option<UserStatus>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only provided fields are changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100, message = "Username cannot be empty"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New plaintext password
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: Option<String>,

    pub role: Option<Role>,

    pub status: Option<UserStatus>,
}

/// Input for changing only the account status
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserStatus {
    pub status: UserStatus,
}

impl User {
    /// Builds a new user record with fresh timestamps
    ///
    /// `password_hash` must already be hashed.
    pub fn new(
        id: String,
        username: String,
        email: String,
        password_hash: String,
        role: Role,
        status: UserStatus,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            username,
            email,
            password: password_hash,
            role,
            status,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the public projection of this user
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            status: self.status,
            last_login: self.last_login,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Checks if the user is an active administrator
    pub fn is_active_admin(&self) -> bool {
        self.role == Role::Admin && self.status == UserStatus::Active
    }

    /// Applies an update
    ///
    /// `password_hash` replaces the stored hash when present; the plaintext
    /// password in `update` is ignored here.
    pub fn apply(&mut self, update: UpdateUser, password_hash: Option<String>) {
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(hash) = password_hash {
            self.password = hash;
        }
        self.updated_at = Utc::now();
    }
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        user.public()
    }
}

/// Finds a user by ID
pub fn find_by_id<'a>(users: &'a [User], id: &str) -> Option<&'a User> {
    users.iter().find(|u| u.id == id)
}

/// Finds a user by username or email
pub fn find_by_login<'a>(users: &'a [User], identifier: &str) -> Option<&'a User> {
    users
        .iter()
        .find(|u| u.username == identifier || u.email == identifier)
}

/// Ensures no other user already uses `username` or `email`
///
/// `except_id` excludes the user being updated from the check.
pub fn ensure_unique(
    users: &[User],
    username: Option<&str>,
    email: Option<&str>,
    except_id: Option<&str>,
) -> Result<(), UserError> {
    let clash = users.iter().any(|u| {
        except_id != Some(u.id.as_str())
            && (username == Some(u.username.as_str()) || email == Some(u.email.as_str()))
    });

    if clash {
        return Err(UserError::DuplicateIdentity);
    }

    Ok(())
}

/// Counts active administrators
pub fn active_admin_count(users: &[User]) -> usize {
    users.iter().filter(|u| u.is_active_admin()).count()
}

/// Ensures that replacing `user_id` with `replacement` keeps an active admin
///
/// Pass `None` as replacement when the user is being deleted.
pub fn ensure_admin_remains(
    users: &[User],
    user_id: &str,
    replacement: Option<&User>,
) -> Result<(), UserError> {
    let remaining = users
        .iter()
        .filter(|u| u.id != user_id && u.is_active_admin())
        .count()
        + usize::from(replacement.is_some_and(User::is_active_admin));

    if remaining == 0 {
        return Err(UserError::LastAdmin);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, username: &str, email: &str, role: Role) -> User {
        User::new(
            id.to_string(),
            username.to_string(),
            email.to_string(),
            "hash".to_string(),
            role,
            UserStatus::Active,
        )
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.has_permission(&Role::Admin));
        assert!(Role::Admin.has_permission(&Role::User));
        assert!(Role::Editor.has_permission(&Role::User));
        assert!(!Role::Editor.has_permission(&Role::Admin));
        assert!(!Role::User.has_permission(&Role::Editor));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Editor).unwrap(), "editor");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_public_projection_hides_password() {
        let u = user("1", "admin", "admin@admin.com", Role::Admin);
        let json = serde_json::to_value(u.public()).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "admin");
        assert_eq!(json["lastLogin"], serde_json::Value::Null);
    }

    #[test]
    fn test_decode_record_without_status() {
        let json = serde_json::json!({
            "id": "1",
            "username": "admin",
            "email": "admin@admin.com",
            "password": "hash",
            "role": "admin",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        let u: User = serde_json::from_value(json).unwrap();
        assert_eq!(u.status, UserStatus::Active);
        assert!(u.last_login.is_none());
    }

    #[test]
    fn test_ensure_unique() {
        let users = vec![user("1", "admin", "admin@admin.com", Role::Admin)];

        assert!(matches!(
            ensure_unique(&users, Some("admin"), Some("other@site.com"), None),
            Err(UserError::DuplicateIdentity)
        ));
        assert!(matches!(
            ensure_unique(&users, Some("other"), Some("admin@admin.com"), None),
            Err(UserError::DuplicateIdentity)
        ));
        assert!(ensure_unique(&users, Some("other"), Some("other@site.com"), None).is_ok());
        // The user's own identity is not a conflict
        assert!(ensure_unique(&users, Some("admin"), None, Some("1")).is_ok());
        assert!(ensure_unique(&users, None, None, None).is_ok());
    }

    #[test]
    fn test_find_by_login() {
        let users = vec![
            user("1", "admin", "admin@admin.com", Role::Admin),
            user("2", "editor", "editor@site.com", Role::Editor),
        ];

        assert_eq!(find_by_login(&users, "editor").unwrap().id, "2");
        assert_eq!(find_by_login(&users, "admin@admin.com").unwrap().id, "1");
        assert!(find_by_login(&users, "nobody").is_none());
        assert_eq!(find_by_id(&users, "2").unwrap().username, "editor");
    }

    #[test]
    fn test_apply_update() {
        let mut u = user("1", "editor", "editor@site.com", Role::Editor);
        let before = u.updated_at;

        u.apply(
            UpdateUser {
                email: Some("new@site.com".to_string()),
                password: Some("ignored".to_string()),
                ..Default::default()
            },
            Some("new-hash".to_string()),
        );

        assert_eq!(u.username, "editor");
        assert_eq!(u.email, "new@site.com");
        assert_eq!(u.password, "new-hash");
        assert!(u.updated_at >= before);
    }

    #[test]
    fn test_last_admin_guard() {
        let users = vec![
            user("1", "admin", "admin@admin.com", Role::Admin),
            user("2", "editor", "editor@site.com", Role::Editor),
        ];

        assert!(matches!(
            ensure_admin_remains(&users, "1", None),
            Err(UserError::LastAdmin)
        ));

        let mut demoted = users[0].clone();
        demoted.role = Role::Editor;
        assert!(ensure_admin_remains(&users, "1", Some(&demoted)).is_err());

        // Deleting a non-admin is always fine
        assert!(ensure_admin_remains(&users, "2", None).is_ok());
        assert_eq!(active_admin_count(&users), 1);
    }

    #[test]
    fn test_create_user_rejects_unknown_fields() {
        let json = serde_json::json!({
            "username": "a",
            "email": "a@b.com",
            "password": "x",
            "isRoot": true
        });

        assert!(serde_json::from_value::<CreateUser>(json).is_err());
    }

    #[test]
    fn test_create_user_validation() {
        let input = CreateUser {
            username: String::new(),
            email: "not-an-email".to_string(),
            password: "x".to_string(),
            role: None,
            status: None,
        };

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_record_without_timestamps_decodes() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "7",
            "username": "legacy",
            "email": "legacy@example.com",
            "password": "hash"
        }))
        .unwrap();

        assert_eq!(user.role, Role::default());
        assert_eq!(user.status, UserStatus::default());
        assert!(user.last_login.is_none());
        assert!(user.created_at <= Utc::now());
    }
}
