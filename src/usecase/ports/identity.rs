#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("{0}")]
    Message(String),
}

/// Durable slot for the connected external account id.
pub trait IdentityStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&self, user_id: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}
