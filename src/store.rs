//! Document store backed by an embedded fjall database.
//!
//! Each collection maps to one keyspace. Keys are the 16 raw bytes of a v4
//! UUID, values are postcard-encoded documents. At the API boundary the
//! identifier is the 32 character lowercase hex form of the UUID.

use std::path::Path;
use std::sync::Arc;

use fjall::{Database, Keyspace, KeyspaceCreateOptions};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::Result;

/// Process-wide handle to the document database. Open once, clone freely.
#[derive(Clone)]
pub struct DocumentStore {
    db: Database,
    /// Serializes check-then-write operations across every collection
    write_lock: Arc<Mutex<()>>,
}

impl DocumentStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::builder(path.as_ref()).open()?;
        Ok(Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Returns a handle to the named collection, creating it on first use.
    pub fn collection(&self, name: &str) -> Result<Collection> {
        let keyspace = self.db.keyspace(name, KeyspaceCreateOptions::default)?;
        Ok(Collection {
            name: name.to_string(),
            keyspace,
            write_lock: Arc::clone(&self.write_lock),
        })
    }
}

/// Handle to a single collection of documents.
#[derive(Clone)]
pub struct Collection {
    name: String,
    keyspace: Keyspace,
    write_lock: Arc<Mutex<()>>,
}

fn encode_id(id: &Uuid) -> String {
    id.simple().to_string()
}

fn decode_id(id: &str) -> Option<Vec<u8>> {
    Uuid::try_parse(id).ok().map(|uuid| uuid.as_bytes().to_vec())
}

fn scan(keyspace: Keyspace) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    let mut entries = Vec::new();
    for guard in keyspace.iter() {
        let (key, value) = guard.into_inner()?;
        entries.push((key.to_vec(), value.to_vec()));
    }
    Ok(entries)
}

impl Collection {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores a new document and returns its generated identifier.
    #[instrument(name = "store_insert", level = "debug", skip(self, doc), fields(collection = %self.name))]
    pub async fn insert<T: Serialize>(&self, doc: &T) -> Result<String> {
        let id = Uuid::new_v4();
        let key = id.as_bytes().to_vec();
        let bytes = postcard::to_stdvec(doc)?;
        let keyspace = self.keyspace.clone();

        task::spawn_blocking(move || keyspace.insert(key, bytes)).await??;
        debug!("Inserted document {}", id.simple());
        Ok(encode_id(&id))
    }

    /// Returns every document in the collection in key order.
    #[instrument(name = "store_find_all", level = "debug", skip(self), fields(collection = %self.name))]
    pub async fn find_all<T: DeserializeOwned>(&self) -> Result<Vec<(String, T)>> {
        let keyspace = self.keyspace.clone();
        let entries = task::spawn_blocking(move || scan(keyspace)).await??;

        let mut docs = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let Ok(uuid) = Uuid::from_slice(&key) else {
                tracing::warn!("Skipping entry with malformed key in {}", self.name);
                continue;
            };
            docs.push((encode_id(&uuid), postcard::from_bytes(&value)?));
        }
        debug!("Loaded {} documents", docs.len());
        Ok(docs)
    }

    #[instrument(name = "store_find_one", level = "debug", skip(self), fields(collection = %self.name))]
    pub async fn find_one<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        let Some(key) = decode_id(id) else {
            debug!("Identifier is not a valid document id");
            return Ok(None);
        };
        let keyspace = self.keyspace.clone();
        let maybe_bytes = task::spawn_blocking(move || {
            keyspace.get(key).map(|value| value.map(|v| v.to_vec()))
        })
        .await??;

        match maybe_bytes {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Overwrites an existing document. Returns the number of documents
    /// modified, 0 when the identifier is unknown.
    #[instrument(name = "store_update", level = "debug", skip(self, doc), fields(collection = %self.name))]
    pub async fn update<T: Serialize>(&self, id: &str, doc: &T) -> Result<u64> {
        let Some(key) = decode_id(id) else {
            return Ok(0);
        };
        let bytes = postcard::to_stdvec(doc)?;
        let keyspace = self.keyspace.clone();

        // A delete must not land between the existence check and the write.
        let _guard = self.write_lock.lock().await;
        let modified = task::spawn_blocking(move || -> Result<u64> {
            if !keyspace.contains_key(&key)? {
                return Ok(0);
            }
            keyspace.insert(key, bytes)?;
            Ok(1)
        })
        .await??;
        Ok(modified)
    }

    /// Removes a document. Returns the number of documents deleted.
    #[instrument(name = "store_delete", level = "debug", skip(self), fields(collection = %self.name))]
    pub async fn delete(&self, id: &str) -> Result<u64> {
        let Some(key) = decode_id(id) else {
            return Ok(0);
        };
        let keyspace = self.keyspace.clone();

        let _guard = self.write_lock.lock().await;
        let deleted = task::spawn_blocking(move || -> Result<u64> {
            if !keyspace.contains_key(&key)? {
                return Ok(0);
            }
            keyspace.remove(key)?;
            Ok(1)
        })
        .await??;
        Ok(deleted)
    }

    pub async fn count(&self) -> Result<usize> {
        let keyspace = self.keyspace.clone();
        let count = task::spawn_blocking(move || keyspace.len()).await??;
        Ok(count)
    }
}
