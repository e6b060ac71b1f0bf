use async_trait::async_trait;

use crate::error::Result;

/// Object storage addressed by container (bucket) and key. Implementations
/// report their own failures as `HeftyError::StoreIo`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()>;
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>>;
    async fn delete(&self, container: &str, key: &str) -> Result<()>;
    async fn exists(&self, container: &str) -> Result<bool>;
}
