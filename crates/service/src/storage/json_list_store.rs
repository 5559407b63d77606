use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed ordered list store.
///
/// Keeps a `Vec<T>` in memory in insertion order and rewrites the whole file
/// (pretty-printed JSON array) after every mutation. Writers are serialized by
/// the write lock, which is held until the file has been replaced.
#[derive(Clone)]
pub struct JsonListStore<T> {
    inner: Arc<RwLock<Vec<T>>>,
    file_path: PathBuf,
}

impl<T> JsonListStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Load the list from `path`. Creates the file with an empty array if missing.
    /// A file that exists but does not parse is an error.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let items: Vec<T> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!("cannot parse {}: {}", file_path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let empty: Vec<T> = Vec::new();
                persist(&file_path, &empty).await?;
                empty
            }
            Err(e) => {
                let msg = format!("cannot read {}: {}", file_path.display(), e);
                return Err(ServiceError::Storage(msg));
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(items)), file_path }))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Snapshot of all items in order.
    pub async fn list(&self) -> Vec<T> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// First item matching `pred`, in list order.
    pub async fn find<F>(&self, pred: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let items = self.inner.read().await;
        items.iter().find(|item| pred(item)).cloned()
    }

    /// Items in `offset..offset + limit` together with the total length,
    /// both taken under the same read lock.
    pub async fn slice(&self, offset: usize, limit: usize) -> (Vec<T>, usize) {
        let items = self.inner.read().await;
        let page = items.iter().skip(offset).take(limit).cloned().collect();
        (page, items.len())
    }

    /// Apply a mutation and persist it.
    ///
    /// `f` works on a copy; the copy only replaces the in-memory list once the
    /// file write succeeded, so memory and disk never disagree. If `f` fails
    /// nothing is written.
    pub async fn update_list<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let mut items = self.inner.write().await;
        let mut next = items.clone();
        let out = f(&mut next)?;
        persist(&self.file_path, &next).await?;
        *items = next;
        Ok(out)
    }
}

/// Write to a sibling temp file, then rename it over the target.
async fn persist<T: serde::Serialize>(path: &Path, items: &[T]) -> Result<(), ServiceError> {
    let data = serde_json::to_vec_pretty(items).map_err(|e| ServiceError::Storage(e.to_string()))?;
    let tmp = tmp_path(path);
    fs::write(&tmp, &data)
        .await
        .map_err(|e| ServiceError::Storage(format!("cannot write {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| ServiceError::Storage(format!("cannot replace {}: {}", path.display(), e)))?;
    debug!(path = %path.display(), bytes = data.len(), items = items.len(), "persisted json list");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
