use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::{HeftyError, Result};
use crate::interfaces::blob_store::BlobStore;

/// Blob store backed by a directory: one sub-directory per container, keys
/// map to relative paths beneath it.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub async fn create_container(&self, container: &str) -> Result<()> {
        let dir = self.container_dir(container)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| HeftyError::StoreIo(e.to_string()))
    }

    fn container_dir(&self, container: &str) -> Result<PathBuf> {
        let path = checked_relative(container)?;
        if path.components().count() != 1 {
            return Err(HeftyError::StoreIo(format!(
                "invalid bucket name {container}"
            )));
        }
        Ok(self.root.join(path))
    }

    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf> {
        Ok(self.container_dir(container)?.join(checked_relative(key)?))
    }
}

/// Rejects empty, absolute and parent-relative paths.
fn checked_relative(name: &str) -> Result<&Path> {
    let path = Path::new(name);
    let valid = !name.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !valid {
        return Err(HeftyError::StoreIo(format!("invalid object path {name}")));
    }
    Ok(path)
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        if !self.exists(container).await? {
            return Err(HeftyError::StoreIo(format!("bucket {container} does not exist")));
        }
        let path = self.object_path(container, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HeftyError::StoreIo(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| HeftyError::StoreIo(e.to_string()))
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(container, key)?;
        tokio::fs::read(&path).await.map_err(|e| {
            HeftyError::StoreIo(format!("unable to read {container}/{key}: {e}"))
        })
    }

    async fn delete(&self, container: &str, key: &str) -> Result<()> {
        let path = self.object_path(container, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HeftyError::StoreIo(e.to_string())),
        }
    }

    async fn exists(&self, container: &str) -> Result<bool> {
        let dir = self.container_dir(container)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(HeftyError::StoreIo(e.to_string())),
        }
    }
}
