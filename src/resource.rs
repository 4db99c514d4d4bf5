//! Generic CRUD over a document collection
//!
//! Tasks and timetable entries behave identically apart from their
//! collection, display label and field schema, all of which come from the
//! [`Resource`] implementation.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::info;

use crate::models::{Task, TimetableEntry};
use crate::store::{Collection, DocumentStore};
use crate::{HaikuError, Result};

/// A document type exposed as a CRUD resource
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Store collection name
    const COLLECTION: &'static str;
    /// HTTP path of the collection, e.g. `/tasks`
    const PATH: &'static str;
    /// Human-readable name used in messages, e.g. "Task"
    const LABEL: &'static str;
}

impl Resource for Task {
    const COLLECTION: &'static str = "tasks";
    const PATH: &'static str = "/tasks";
    const LABEL: &'static str = "Task";
}

impl Resource for TimetableEntry {
    const COLLECTION: &'static str = "timetable";
    const PATH: &'static str = "/timetable";
    const LABEL: &'static str = "Timetable entry";
}

/// A document together with its store-assigned identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<R> {
    #[serde(flatten)]
    pub doc: R,
    pub id: String,
}

/// Confirmation returned by a successful delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
}

/// Typed view over the collection backing resource `R`
pub struct ResourceStore<R> {
    collection: Collection,
    _resource: PhantomData<R>,
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(store: &DocumentStore) -> Result<Self> {
        Ok(Self {
            collection: store.collection(R::COLLECTION)?,
            _resource: PhantomData,
        })
    }

    fn not_found() -> HaikuError {
        HaikuError::not_found(format!("{} not found", R::LABEL))
    }

    pub async fn list(&self) -> Result<Vec<Stored<R>>> {
        let docs = self.collection.find_all::<R>().await?;
        Ok(docs
            .into_iter()
            .map(|(id, doc)| Stored { doc, id })
            .collect())
    }

    pub async fn create(&self, doc: R) -> Result<Stored<R>> {
        let id = self.collection.insert(&doc).await?;
        info!("Created {} {}", R::LABEL, id);
        Ok(Stored { doc, id })
    }

    /// Overwrites every field of an existing document and returns it as stored.
    pub async fn replace(&self, id: &str, doc: R) -> Result<Stored<R>> {
        if self.collection.update(id, &doc).await? == 0 {
            return Err(Self::not_found());
        }
        // A concurrent delete can win between the write and this read.
        let doc = self
            .collection
            .find_one::<R>(id)
            .await?
            .ok_or_else(Self::not_found)?;
        info!("Replaced {} {}", R::LABEL, id);
        Ok(Stored {
            doc,
            id: id.to_string(),
        })
    }

    pub async fn delete(&self, id: &str) -> Result<Deleted> {
        if self.collection.delete(id).await? == 0 {
            return Err(Self::not_found());
        }
        info!("Deleted {} {}", R::LABEL, id);
        Ok(Deleted {
            message: format!("{} deleted", R::LABEL),
        })
    }

    pub async fn count(&self) -> Result<usize> {
        self.collection.count().await
    }
}
