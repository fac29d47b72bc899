/// Collection store on top of a backend
///
/// # Read and write contract
///
/// - [`CollectionStore::read`] never fails. A collection that was never
///   written yields its default, which is persisted on that first read under
///   the collection's lock. I/O or parse failures are logged and also yield
///   the default.
/// - [`CollectionStore::read_as`] decodes the contents. Valid JSON of the
///   wrong shape is logged and decodes as the collection's default.
/// - [`CollectionStore::write`] returns `false` and logs on failure.
/// - [`CollectionStore::update`] holds the collection's lock across the whole
///   read-modify-write, so concurrent updates to one collection never lose
///   each other's changes. Plain `write` takes no lock.

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::{Collection, CollectionBackend, JsonFileBackend, MemoryBackend, StoreError};
use crate::auth::password::{hash_password_blocking, PasswordParams};
use crate::models::user::{Role, User, UserStatus};

/// Credentials of the administrator seeded into an empty store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub params: PasswordParams,
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@admin.com".to_string(),
            password: "admin123".to_string(),
            params: PasswordParams::default(),
        }
    }
}

impl BootstrapAdmin {
    fn uses_default_password(&self) -> bool {
        self.password == Self::default().password
    }
}

/// Outcome of [`CollectionStore::initialize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    /// Entry count of every collection after initialization
    pub sizes: Vec<(Collection, usize)>,

    /// Whether the bootstrap administrator was created
    pub admin_created: bool,
}

/// Shared handle to the collections
///
/// Cloning is cheap and clones share locks and backend.
#[derive(Clone)]
pub struct CollectionStore {
    backend: Arc<dyn CollectionBackend>,
    locks: Arc<[Mutex<()>; Collection::COUNT]>,
}

impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("backend", &self.backend.describe())
            .finish()
    }
}

impl CollectionStore {
    pub fn new(backend: Arc<dyn CollectionBackend>) -> Self {
        Self {
            backend,
            locks: Arc::new(std::array::from_fn(|_| Mutex::new(()))),
        }
    }

    /// Store backed by JSON files in `dir`
    pub fn json_files(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(JsonFileBackend::new(dir)))
    }

    /// Store backed by memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Returns the current contents of `collection`
    pub async fn read(&self, collection: Collection) -> Value {
        match self.backend.load(collection.key()).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                let _guard = self.locks[collection.index()].lock().await;
                self.load_or_seed(collection).await
            }
            Err(e) => {
                error!(collection = %collection, error = %e, "Failed to read collection, using default");
                collection.default_value()
            }
        }
    }

    /// Loads `collection`, persisting its default when missing
    ///
    /// Callers hold the collection's lock.
    async fn load_or_seed(&self, collection: Collection) -> Value {
        match self.backend.load(collection.key()).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                let value = collection.default_value();
                debug!(collection = %collection, "Seeding default value");
                self.write(collection, &value).await;
                value
            }
            Err(e) => {
                error!(collection = %collection, error = %e, "Failed to read collection, using default");
                collection.default_value()
            }
        }
    }

    /// Replaces the contents of `collection`
    pub async fn write(&self, collection: Collection, value: &Value) -> bool {
        match self.backend.save(collection.key(), value).await {
            Ok(()) => true,
            Err(e) => {
                error!(collection = %collection, error = %e, "Failed to write collection");
                false
            }
        }
    }

    /// Reads a collection and decodes it as `T`
    ///
    /// # Errors
    ///
    /// Only when the collection's default itself does not decode as `T`.
    pub async fn read_as<T: DeserializeOwned>(&self, collection: Collection) -> Result<T, StoreError> {
        let value = self.read(collection).await;
        Self::decode(collection, value)
    }

    fn decode<T: DeserializeOwned>(collection: Collection, value: Value) -> Result<T, StoreError> {
        match serde_json::from_value(value) {
            Ok(data) => Ok(data),
            Err(e) => {
                error!(collection = %collection, error = %e, "Collection has an unexpected shape, using default");

                serde_json::from_value(collection.default_value()).map_err(|source| {
                    StoreError::Decode {
                        collection: collection.key().to_string(),
                        source,
                    }
                })
            }
        }
    }

    /// Encodes `data` and writes it to `collection`
    pub async fn write_as<T: Serialize>(&self, collection: Collection, data: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(data).map_err(|source| StoreError::Encode {
            collection: collection.key().to_string(),
            source,
        })?;

        if self.write(collection, &value).await {
            Ok(())
        } else {
            Err(StoreError::WriteFailed(collection.key().to_string()))
        }
    }

    /// Runs a read-modify-write on `collection` under its lock
    ///
    /// `f` receives the decoded contents. The result is written back only when
    /// `f` returns `Ok`; an `Err` leaves the stored data untouched.
    pub async fn update<T, R, E, F>(&self, collection: Collection, f: F) -> Result<R, E>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<StoreError>,
    {
        let _guard = self.locks[collection.index()].lock().await;

        let value = self.load_or_seed(collection).await;
        let mut data: T = Self::decode(collection, value)?;
        let result = f(&mut data)?;
        self.write_as(collection, &data).await?;

        Ok(result)
    }

    /// Prepares storage, seeds every collection and the bootstrap administrator
    ///
    /// # Errors
    ///
    /// Fails when the backing storage cannot be created or the administrator
    /// cannot be hashed or persisted. Per-collection read failures are not
    /// errors; they degrade to defaults.
    pub async fn initialize(&self, admin: &BootstrapAdmin) -> Result<InitReport, StoreError> {
        self.backend.prepare().await?;
        info!(location = %self.backend.describe(), "Initializing collection store");

        let admin_created = self.seed_admin(admin).await?;

        let mut sizes = Vec::with_capacity(Collection::COUNT);
        for collection in Collection::ALL {
            let value = self.read(collection).await;
            let size = Collection::size_of(&value);
            info!(collection = %collection, size, "Collection ready");
            sizes.push((collection, size));
        }

        Ok(InitReport {
            sizes,
            admin_created,
        })
    }

    async fn seed_admin(&self, admin: &BootstrapAdmin) -> Result<bool, StoreError> {
        let existing: Vec<User> = self.read_as(Collection::Users).await?;
        if !existing.is_empty() {
            debug!(count = existing.len(), "Users present, skipping bootstrap admin");
            return Ok(false);
        }

        let hash = hash_password_blocking(admin.password.clone(), admin.params)
            .await
            .map_err(|e| StoreError::Bootstrap(e.to_string()))?;

        let created = self
            .update(Collection::Users, |users: &mut Vec<User>| {
                if !users.is_empty() {
                    return Ok::<_, StoreError>(false);
                }

                users.push(User::new(
                    "1".to_string(),
                    admin.username.clone(),
                    admin.email.clone(),
                    hash,
                    Role::Admin,
                    UserStatus::Active,
                ));
                Ok(true)
            })
            .await?;

        if created {
            info!(username = %admin.username, email = %admin.email, "Bootstrap administrator created");
            if admin.uses_default_password() {
                warn!("Bootstrap administrator uses the default password, change it after first login");
            }
        }

        Ok(created)
    }

    /// Writes every collection into a single timestamped file under `dir`
    ///
    /// Returns the path of the backup file.
    pub async fn backup(&self, dir: &Path) -> Result<PathBuf, StoreError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        let mut all = Map::new();
        for collection in Collection::ALL {
            all.insert(collection.key().to_string(), self.read(collection).await);
        }

        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
        let path = dir.join(format!("backup-{stamp}.json"));

        let json = serde_json::to_string_pretty(&Value::Object(all)).map_err(|source| {
            StoreError::Encode {
                collection: "backup".to_string(),
                source,
            }
        })?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), "Backup created");
        Ok(path)
    }
}
