/// Configuration management for the API server
///
/// This module loads configuration from environment variables (and a `.env`
/// file when present) into a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `JWT_SECRET`: Secret key for token signing (required, at least 32 characters)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 5000)
/// - `APP_ENV`: `production` enables HSTS (default: development)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `DATA_DIR`: Directory holding the collection files (default: data)
/// - `UPLOAD_DIR`: Directory holding uploaded media (default: uploads)
/// - `ADMIN_USERNAME` / `ADMIN_EMAIL` / `ADMIN_PASSWORD`: Bootstrap administrator
/// - `PASSWORD_MEMORY_KIB` / `PASSWORD_ITERATIONS` / `PASSWORD_PARALLELISM`: Argon2 cost
/// - `RUST_LOG`: Log filter (default: cms_api=debug,cms_shared=debug,tower_http=debug)
/// - `LOG_FORMAT`: `json` for JSON log lines (default: text)
///
/// # Example
///
/// ```no_run
/// use cms_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use cms_shared::{auth::password::PasswordParams, store::BootstrapAdmin};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, str::FromStr};

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Storage locations
    pub storage: StorageConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Administrator seeded into an empty store, with the password cost
    /// used for every hash
    pub admin: BootstrapAdmin,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins, `*` allows any
    pub cors_origins: Vec<String>,

    /// Whether the server runs behind HTTPS in production
    pub production: bool,
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `<collection>.json` files
    pub data_dir: PathBuf,

    /// Directory holding uploaded media
    pub upload_dir: PathBuf,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - A numeric variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} characters long");
        }

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let defaults = PasswordParams::default();
        let params = PasswordParams {
            memory_kib: parse_or(&lookup, "PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "PASSWORD_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "PASSWORD_PARALLELISM", defaults.parallelism)?,
        };

        let admin_defaults = BootstrapAdmin::default();

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST", "0.0.0.0"),
                port: parse_or(&lookup, "API_PORT", 5000)?,
                cors_origins,
                production: var("APP_ENV", "development").eq_ignore_ascii_case("production"),
            },
            storage: StorageConfig {
                data_dir: var("DATA_DIR", "data").into(),
                upload_dir: var("UPLOAD_DIR", "uploads").into(),
            },
            jwt: JwtConfig { secret: jwt_secret },
            admin: BootstrapAdmin {
                username: var("ADMIN_USERNAME", &admin_defaults.username),
                email: var("ADMIN_EMAIL", &admin_defaults.email),
                password: var("ADMIN_PASSWORD", &admin_defaults.password),
                params,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Argon2 cost used when hashing passwords
    pub fn password_params(&self) -> &PasswordParams {
        &self.admin.params
    }

    /// Directory receiving backup files
    pub fn backup_dir(&self) -> PathBuf {
        self.storage.data_dir.join("backups")
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {key}: {e}")),
        None => Ok(default),
    }
}
