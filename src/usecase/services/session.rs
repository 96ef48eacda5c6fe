use std::sync::Arc;

use tokio::sync::watch;

use crate::usecase::ports::identity::{IdentityStorage, StorageError};

/// Process-wide id of the connected external account.
///
/// Loaded from storage once, replaced on connect, cleared on disconnect.
/// Consumers subscribe instead of reading storage directly.
pub struct SessionIdentity {
    storage: Arc<dyn IdentityStorage>,
    sender: watch::Sender<Option<String>>,
}

impl SessionIdentity {
    pub fn load(storage: Arc<dyn IdentityStorage>) -> Self {
        let initial = match storage.load() {
            Ok(user_id) => user_id,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load stored session identity");
                None
            }
        };
        let (sender, _) = watch::channel(initial);
        Self { storage, sender }
    }

    pub fn current(&self) -> Option<String> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.sender.subscribe()
    }

    pub fn connect(&self, user_id: &str) -> Result<(), StorageError> {
        self.storage.save(user_id)?;
        self.sender.send_replace(Some(user_id.to_string()));
        tracing::info!("session identity connected");
        Ok(())
    }

    pub fn disconnect(&self) -> Result<(), StorageError> {
        self.storage.clear()?;
        self.sender.send_replace(None);
        tracing::info!("session identity cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct MemoryStorage {
        slot: Mutex<Option<String>>,
    }

    impl IdentityStorage for MemoryStorage {
        fn load(&self) -> Result<Option<String>, StorageError> {
            Ok(self.slot.lock().clone())
        }

        fn save(&self, user_id: &str) -> Result<(), StorageError> {
            *self.slot.lock() = Some(user_id.to_string());
            Ok(())
        }

        fn clear(&self) -> Result<(), StorageError> {
            *self.slot.lock() = None;
            Ok(())
        }
    }

    struct BrokenStorage;

    impl IdentityStorage for BrokenStorage {
        fn load(&self) -> Result<Option<String>, StorageError> {
            Err(StorageError::Message("disk gone".to_string()))
        }

        fn save(&self, _user_id: &str) -> Result<(), StorageError> {
            Err(StorageError::Message("disk gone".to_string()))
        }

        fn clear(&self) -> Result<(), StorageError> {
            Err(StorageError::Message("disk gone".to_string()))
        }
    }

    #[test]
    fn lifecycle_updates_storage_and_subscribers() {
        let storage = Arc::new(MemoryStorage::default());
        *storage.slot.lock() = Some("42".to_string());

        let identity = SessionIdentity::load(storage.clone());
        let receiver = identity.subscribe();
        assert_eq!(identity.current().as_deref(), Some("42"));

        identity.connect("77").expect("connect should persist");
        assert_eq!(receiver.borrow().as_deref(), Some("77"));
        assert_eq!(storage.slot.lock().as_deref(), Some("77"));

        identity.disconnect().expect("disconnect should persist");
        assert_eq!(*receiver.borrow(), None);
        assert_eq!(*storage.slot.lock(), None);
    }

    #[test]
    fn storage_failures_keep_previous_identity() {
        let identity = SessionIdentity::load(Arc::new(BrokenStorage));

        assert_eq!(identity.current(), None);
        assert!(identity.connect("1").is_err());
        assert_eq!(identity.current(), None);
    }
}
