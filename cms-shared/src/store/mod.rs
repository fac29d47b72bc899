/// Persistent collection store
///
/// Named collections of JSON data (lists of records or single objects) kept
/// behind a swappable [`CollectionBackend`]. The store seeds built-in defaults,
/// degrades to those defaults when stored data cannot be read, and serializes
/// read-modify-write sequences per collection.
///
/// # Example
///
/// ```
/// use cms_shared::store::{Collection, CollectionStore};
/// use serde_json::json;
///
/// # async fn example() {
/// let store = CollectionStore::in_memory();
///
/// assert_eq!(store.read(Collection::Blocks).await, json!([]));
/// assert!(store.write(Collection::Blocks, &json!([{ "id": "hero" }])).await);
/// # }
/// ```

pub mod backend;
pub mod collection;
pub mod collection_store;

pub use backend::{CollectionBackend, JsonFileBackend, MemoryBackend};
pub use collection::Collection;
pub use collection_store::{BootstrapAdmin, CollectionStore, InitReport};

use std::path::PathBuf;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data is not valid JSON
    #[error("Collection '{collection}' contains malformed JSON: {source}")]
    Malformed {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored data does not match the expected record shape
    #[error("Collection '{collection}' has an unexpected shape: {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be serialized
    #[error("Failed to serialize collection '{collection}': {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// A write was rejected by the backend
    #[error("Failed to persist collection '{0}'")]
    WriteFailed(String),

    /// Initial setup could not complete
    #[error("Store bootstrap failed: {0}")]
    Bootstrap(String),
}
