//! Host Storage
//!
//! Narrow interfaces to the host application's persistence layer: per-user
//! access credentials, per-issue attachments and the widget settings.
//! In-memory implementations are provided for hosts without their own store
//! and for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{LucidchartError, StorageError};
use crate::types::{Attachment, UserCredentials, WidgetSettings};

/// Per-user access credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieve credentials for a user.
    async fn get(&self, user_id: &str) -> Result<Option<UserCredentials>, LucidchartError>;

    /// Store credentials for a user, replacing any previous ones.
    async fn save(&self, user_id: &str, credentials: UserCredentials) -> Result<(), LucidchartError>;
}

/// Per-issue attachment lists.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Retrieve the attachments of an issue; empty if none were saved.
    async fn get(&self, issue_id: u64) -> Result<Vec<Attachment>, LucidchartError>;

    /// Replace the attachments of an issue.
    async fn save(&self, issue_id: u64, attachments: Vec<Attachment>) -> Result<(), LucidchartError>;
}

/// Widget settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load settings, `None` until an administrator saved them.
    async fn load(&self) -> Result<Option<WidgetSettings>, LucidchartError>;

    /// Save settings.
    async fn save(&self, settings: WidgetSettings) -> Result<(), LucidchartError>;
}

/// In-memory credential store.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    credentials: Mutex<HashMap<String, UserCredentials>>,
}

impl InMemoryCredentialStore {
    /// Create new in-memory credential store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserCredentials>, LucidchartError> {
        Ok(self.credentials.lock().unwrap().get(user_id).cloned())
    }

    async fn save(&self, user_id: &str, credentials: UserCredentials) -> Result<(), LucidchartError> {
        self.credentials
            .lock()
            .unwrap()
            .insert(user_id.to_string(), credentials);
        Ok(())
    }
}

/// In-memory attachment store.
#[derive(Default)]
pub struct InMemoryAttachmentStore {
    attachments: Mutex<HashMap<u64, Vec<Attachment>>>,
}

impl InMemoryAttachmentStore {
    /// Create new in-memory attachment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn get(&self, issue_id: u64) -> Result<Vec<Attachment>, LucidchartError> {
        Ok(self
            .attachments
            .lock()
            .unwrap()
            .get(&issue_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, issue_id: u64, attachments: Vec<Attachment>) -> Result<(), LucidchartError> {
        self.attachments.lock().unwrap().insert(issue_id, attachments);
        Ok(())
    }
}

/// In-memory settings store.
#[derive(Default)]
pub struct InMemorySettingsStore {
    settings: Mutex<Option<WidgetSettings>>,
}

impl InMemorySettingsStore {
    /// Create an empty settings store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a settings store holding the given settings.
    pub fn with_settings(settings: WidgetSettings) -> Self {
        Self {
            settings: Mutex::new(Some(settings)),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<Option<WidgetSettings>, LucidchartError> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn save(&self, settings: WidgetSettings) -> Result<(), LucidchartError> {
        *self.settings.lock().unwrap() = Some(settings);
        Ok(())
    }
}

/// Mock host store for testing.
///
/// Implements all three store interfaces, records writes and can be told to
/// fail every operation.
#[derive(Default)]
pub struct MockHostStore {
    credentials: InMemoryCredentialStore,
    attachments: InMemoryAttachmentStore,
    settings: InMemorySettingsStore,
    credential_saves: Mutex<Vec<String>>,
    attachment_saves: Mutex<Vec<(u64, usize)>>,
    settings_saves: Mutex<u32>,
    should_fail: Mutex<bool>,
}

impl MockHostStore {
    /// Create new mock host store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set store to fail all operations.
    pub fn set_should_fail(&self, should_fail: bool) -> &Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    /// Pre-populate user credentials.
    pub fn add_credentials(&self, user_id: &str, credentials: UserCredentials) -> &Self {
        self.credentials
            .credentials
            .lock()
            .unwrap()
            .insert(user_id.to_string(), credentials);
        self
    }

    /// Pre-populate issue attachments.
    pub fn add_attachments(&self, issue_id: u64, attachments: Vec<Attachment>) -> &Self {
        self.attachments
            .attachments
            .lock()
            .unwrap()
            .insert(issue_id, attachments);
        self
    }

    /// Pre-populate settings.
    pub fn set_settings(&self, settings: WidgetSettings) -> &Self {
        *self.settings.settings.lock().unwrap() = Some(settings);
        self
    }

    /// User ids whose credentials were saved.
    pub fn get_credential_saves(&self) -> Vec<String> {
        self.credential_saves.lock().unwrap().clone()
    }

    /// `(issue_id, attachment_count)` for every attachment save.
    pub fn get_attachment_saves(&self) -> Vec<(u64, usize)> {
        self.attachment_saves.lock().unwrap().clone()
    }

    /// Number of settings saves.
    pub fn settings_save_count(&self) -> u32 {
        *self.settings_saves.lock().unwrap()
    }

    fn check_read(&self) -> Result<(), LucidchartError> {
        if *self.should_fail.lock().unwrap() {
            return Err(LucidchartError::Storage(StorageError::ReadFailed {
                message: "Mock storage failure".to_string(),
            }));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), LucidchartError> {
        if *self.should_fail.lock().unwrap() {
            return Err(LucidchartError::Storage(StorageError::WriteFailed {
                message: "Mock storage failure".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MockHostStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserCredentials>, LucidchartError> {
        self.check_read()?;
        CredentialStore::get(&self.credentials, user_id).await
    }

    async fn save(&self, user_id: &str, credentials: UserCredentials) -> Result<(), LucidchartError> {
        self.check_write()?;
        self.credential_saves
            .lock()
            .unwrap()
            .push(user_id.to_string());
        CredentialStore::save(&self.credentials, user_id, credentials).await
    }
}

#[async_trait]
impl AttachmentStore for MockHostStore {
    async fn get(&self, issue_id: u64) -> Result<Vec<Attachment>, LucidchartError> {
        self.check_read()?;
        AttachmentStore::get(&self.attachments, issue_id).await
    }

    async fn save(&self, issue_id: u64, attachments: Vec<Attachment>) -> Result<(), LucidchartError> {
        self.check_write()?;
        self.attachment_saves
            .lock()
            .unwrap()
            .push((issue_id, attachments.len()));
        AttachmentStore::save(&self.attachments, issue_id, attachments).await
    }
}

#[async_trait]
impl SettingsStore for MockHostStore {
    async fn load(&self) -> Result<Option<WidgetSettings>, LucidchartError> {
        self.check_read()?;
        self.settings.load().await
    }

    async fn save(&self, settings: WidgetSettings) -> Result<(), LucidchartError> {
        self.check_write()?;
        *self.settings_saves.lock().unwrap() += 1;
        SettingsStore::save(&self.settings, settings).await
    }
}

/// Create mock host store for testing.
pub fn create_mock_host_store() -> MockHostStore {
    MockHostStore::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(id: &str) -> Attachment {
        Attachment {
            document_id: id.to_string(),
            name: format!("Doc {id}"),
            image_bytes: vec![1],
            thumbnail_bytes: vec![2],
        }
    }

    #[tokio::test]
    async fn test_credential_store_roundtrip() {
        let store = InMemoryCredentialStore::new();
        assert!(store.get("alice").await.unwrap().is_none());

        store
            .save("alice", UserCredentials::new("at1", "as1"))
            .await
            .unwrap();
        store
            .save("alice", UserCredentials::new("at2", "as2"))
            .await
            .unwrap();

        let credentials = store.get("alice").await.unwrap().unwrap();
        assert_eq!(credentials, UserCredentials::new("at2", "as2"));
        assert!(store.get("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attachment_store_defaults_to_empty() {
        let store = InMemoryAttachmentStore::new();
        assert!(store.get(7).await.unwrap().is_empty());

        store.save(7, vec![attachment("A")]).await.unwrap();
        assert_eq!(store.get(7).await.unwrap().len(), 1);
        assert!(store.get(8).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settings_store() {
        let store = InMemorySettingsStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(WidgetSettings::new("key", "secret")).await.unwrap();
        assert_eq!(
            store.load().await.unwrap(),
            Some(WidgetSettings::new("key", "secret"))
        );
    }

    #[tokio::test]
    async fn test_mock_host_store_records_saves() {
        let store = MockHostStore::new();
        AttachmentStore::save(&store, 3, vec![attachment("A"), attachment("B")])
            .await
            .unwrap();
        CredentialStore::save(&store, "alice", UserCredentials::new("at", "as"))
            .await
            .unwrap();

        assert_eq!(store.get_attachment_saves(), vec![(3, 2)]);
        assert_eq!(store.get_credential_saves(), vec!["alice".to_string()]);
        assert_eq!(store.settings_save_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_host_store_failure() {
        let store = MockHostStore::new();
        store.set_should_fail(true);

        let result = SettingsStore::load(&store).await;
        assert!(matches!(
            result,
            Err(LucidchartError::Storage(StorageError::ReadFailed { .. }))
        ));

        let result = SettingsStore::save(&store, WidgetSettings::default()).await;
        assert!(matches!(
            result,
            Err(LucidchartError::Storage(StorageError::WriteFailed { .. }))
        ));
    }
}
