//! Lucidchart issue widget.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use super::routes::{parse_id, WidgetRoute};
use super::{WidgetApp, WidgetRequest, WidgetResponse, CONFIGURE_REDIRECT, HOME_REDIRECT};
use crate::builders::LucidchartConfigBuilder;
use crate::client::LucidchartConsumer;
use crate::core::{DefaultNonceSource, HttpTransport, NonceSource, ReqwestHttpTransport};
use crate::error::LucidchartError;
use crate::storage::{
    AttachmentStore, CredentialStore, InMemoryAttachmentStore, InMemoryCredentialStore,
    InMemorySettingsStore, SettingsStore,
};
use crate::token::InMemoryTokenManager;
use crate::types::{
    upsert_attachment, remove_attachments, Attachment, ImageRequest, UserCredentials,
    VerifierCallback, WidgetSettings,
};

type Consumer<T, N> = LucidchartConsumer<T, InMemoryTokenManager, N>;

/// Host stores used by the widget.
#[derive(Clone)]
pub struct WidgetStores {
    /// Per-user access credentials.
    pub credentials: Arc<dyn CredentialStore>,
    /// Per-issue attachments.
    pub attachments: Arc<dyn AttachmentStore>,
    /// Consumer key and secret.
    pub settings: Arc<dyn SettingsStore>,
}

impl WidgetStores {
    /// Stores kept in process memory.
    pub fn in_memory() -> Self {
        Self {
            credentials: Arc::new(InMemoryCredentialStore::new()),
            attachments: Arc::new(InMemoryAttachmentStore::new()),
            settings: Arc::new(InMemorySettingsStore::new()),
        }
    }

    /// Use one store for all three concerns.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: CredentialStore + AttachmentStore + SettingsStore + 'static,
    {
        Self {
            credentials: store.clone(),
            attachments: store.clone(),
            settings: store,
        }
    }
}

/// Issue widget attaching Lucidchart diagrams.
///
/// Holds no consumer until settings with both consumer key and secret have
/// been loaded or configured. Every reconfiguration installs a fresh
/// consumer with an empty token manager.
pub struct LucidchartWidget<T: HttpTransport = ReqwestHttpTransport, N: NonceSource = DefaultNonceSource>
{
    template: LucidchartConfigBuilder,
    transport: Arc<T>,
    nonce_source: Arc<N>,
    stores: WidgetStores,
    consumer: RwLock<Option<Arc<Consumer<T, N>>>>,
}

impl LucidchartWidget<ReqwestHttpTransport, DefaultNonceSource> {
    /// Create a widget with the default transport.
    ///
    /// `template` supplies everything but the consumer credentials, which
    /// come from the settings store.
    pub fn new(template: LucidchartConfigBuilder, stores: WidgetStores) -> Result<Self, LucidchartError> {
        let probe = template
            .clone()
            .consumer_key("probe")
            .consumer_secret("probe")
            .build()?;
        let transport = ReqwestHttpTransport::with_options(probe.timeout, probe.max_response_size)?;
        Ok(Self::with_components(
            template,
            stores,
            transport,
            DefaultNonceSource::new(),
        ))
    }
}

impl<T: HttpTransport, N: NonceSource> LucidchartWidget<T, N> {
    /// Create a widget with custom components.
    pub fn with_components(
        template: LucidchartConfigBuilder,
        stores: WidgetStores,
        transport: T,
        nonce_source: N,
    ) -> Self {
        Self {
            template,
            transport: Arc::new(transport),
            nonce_source: Arc::new(nonce_source),
            stores,
            consumer: RwLock::new(None),
        }
    }

    /// The current consumer, if the widget has been configured.
    pub fn consumer(&self) -> Option<Arc<Consumer<T, N>>> {
        self.consumer.read().unwrap().clone()
    }

    /// Check if consumer credentials are missing.
    pub fn needs_configuration(&self) -> bool {
        self.consumer.read().unwrap().is_none()
    }

    fn install(&self, settings: &WidgetSettings) -> Result<(), LucidchartError> {
        let consumer = if settings.is_complete() {
            let config = self
                .template
                .clone()
                .consumer_key(settings.consumer_key.clone())
                .consumer_secret(settings.consumer_secret.clone())
                .build()?;
            Some(Arc::new(LucidchartConsumer::from_shared(
                config,
                self.transport.clone(),
                Arc::new(InMemoryTokenManager::new()),
                self.nonce_source.clone(),
            )))
        } else {
            None
        };

        info!(
            consumer_key = %settings.consumer_key,
            configured = consumer.is_some(),
            "Installed Lucidchart consumer"
        );
        *self.consumer.write().unwrap() = consumer;
        Ok(())
    }

    async fn configure(&self, request: &WidgetRequest) -> Result<WidgetResponse, LucidchartError> {
        let settings = WidgetSettings::new(
            request.param("consumerkey").unwrap_or_default(),
            request.param("consumersecret").unwrap_or_default(),
        );

        self.stores.settings.save(settings.clone()).await?;
        self.install(&settings)?;
        Ok(WidgetResponse::success())
    }

    async fn authenticate(
        &self,
        consumer: &Consumer<T, N>,
        return_url: &str,
    ) -> Result<WidgetResponse, LucidchartError> {
        let redirect = consumer.begin_authorization(return_url).await?;
        Ok(WidgetResponse::Redirect(redirect.url.to_string()))
    }

    async fn verify(
        &self,
        consumer: &Consumer<T, N>,
        request: &WidgetRequest,
    ) -> Result<WidgetResponse, LucidchartError> {
        let callback = VerifierCallback {
            oauth_token: request.param("oauth_token").map(str::to_string),
            oauth_verifier: request.param("oauth_verifier").map(str::to_string),
            callback: request.param("callback").map(str::to_string),
        };

        // A denied authorization comes back without a token or verifier.
        let outcome = if callback.is_complete() {
            consumer.handle_callback(&callback).await?
        } else {
            None
        };

        match outcome {
            Some(credentials) => {
                self.stores
                    .credentials
                    .save(&request.user_id, credentials)
                    .await?;
                info!(user_id = %request.user_id, "Stored Lucidchart access token");
            }
            None => warn!(user_id = %request.user_id, "Authorization completed without a token"),
        }

        let target = match callback.callback.as_deref().filter(|c| !c.is_empty()) {
            Some(path) => consumer.config().app_url(path),
            None => HOME_REDIRECT.to_string(),
        };
        Ok(WidgetResponse::Redirect(target))
    }

    async fn user_credentials(&self, user_id: &str) -> Result<Option<UserCredentials>, LucidchartError> {
        self.stores.credentials.get(user_id).await
    }

    async fn save_document(
        &self,
        consumer: &Consumer<T, N>,
        credentials: &UserCredentials,
        issue_id: u64,
        document_id: &str,
    ) -> Result<(), LucidchartError> {
        let description = consumer.describe_document(document_id, credentials).await?;
        let image = consumer
            .document_image(&ImageRequest::preview(document_id), credentials)
            .await?;
        let thumbnail = consumer
            .document_image(&ImageRequest::thumbnail(document_id), credentials)
            .await?;

        let mut attachments = self.stores.attachments.get(issue_id).await?;
        upsert_attachment(
            &mut attachments,
            Attachment {
                document_id: document_id.to_string(),
                name: description.name,
                image_bytes: image.to_vec(),
                thumbnail_bytes: thumbnail.to_vec(),
            },
        );
        self.stores.attachments.save(issue_id, attachments).await?;

        info!(issue_id, document_id, "Saved Lucidchart attachment");
        Ok(())
    }

    async fn delete_document(&self, request: &WidgetRequest) -> Result<WidgetResponse, LucidchartError> {
        let issue_id = parse_id("issueid", request.require_param("issueid")?)?;
        let document_id = request.require_param("documentid")?;

        let mut attachments = self.stores.attachments.get(issue_id).await?;
        let removed = remove_attachments(&mut attachments, document_id);
        if removed > 0 {
            self.stores.attachments.save(issue_id, attachments).await?;
        }

        debug!(issue_id, document_id, removed, "Deleted Lucidchart attachment");
        Ok(WidgetResponse::success())
    }

    async fn download(
        &self,
        issue_id: u64,
        document_id: &str,
        select: fn(Attachment) -> Vec<u8>,
    ) -> Result<WidgetResponse, LucidchartError> {
        let bytes = self
            .stores
            .attachments
            .get(issue_id)
            .await?
            .into_iter()
            .find(|attachment| attachment.matches(document_id))
            .map(select)
            .unwrap_or_default();
        Ok(WidgetResponse::png(bytes))
    }
}

#[async_trait]
impl<T: HttpTransport, N: NonceSource> WidgetApp for LucidchartWidget<T, N> {
    async fn load_config(&self) -> Result<(), LucidchartError> {
        match self.stores.settings.load().await? {
            Some(settings) => self.install(&settings),
            None => {
                debug!("No Lucidchart settings stored");
                Ok(())
            }
        }
    }

    async fn on_request(&self, request: WidgetRequest) -> Result<WidgetResponse, LucidchartError> {
        let route = request.route()?;
        debug!(route = %route.path(), user_id = %request.user_id, "Handling widget request");

        match &route {
            WidgetRoute::Configure => return self.configure(&request).await,
            WidgetRoute::Thumbnail {
                issue_id,
                document_id,
            } => return self.download(*issue_id, document_id, |a| a.thumbnail_bytes).await,
            WidgetRoute::Image {
                issue_id,
                document_id,
            } => return self.download(*issue_id, document_id, |a| a.image_bytes).await,
            _ => {}
        }

        let Some(consumer) = self.consumer() else {
            return Ok(WidgetResponse::Redirect(CONFIGURE_REDIRECT.to_string()));
        };

        match route {
            WidgetRoute::Authenticate => {
                let callback = request.param("callback").unwrap_or_default().to_string();
                self.authenticate(&consumer, &callback).await
            }
            WidgetRoute::Verify => self.verify(&consumer, &request).await,
            WidgetRoute::DeleteDocument => self.delete_document(&request).await,
            WidgetRoute::NewDocument {
                ref project_code,
                project_id,
                issue_id,
            } => {
                let Some(credentials) = self.user_credentials(&request.user_id).await? else {
                    return self.authenticate(&consumer, &route.path()).await;
                };
                let callback = WidgetRoute::EditDocument {
                    project_code: project_code.clone(),
                    project_id,
                    issue_id,
                }
                .path();
                let url = consumer.new_document_url(&callback, &credentials)?;
                Ok(WidgetResponse::Redirect(url.to_string()))
            }
            WidgetRoute::ViewDocument {
                ref project_code,
                project_id,
                issue_id,
                ref document_id,
            } => {
                let Some(credentials) = self.user_credentials(&request.user_id).await? else {
                    return self.authenticate(&consumer, &route.path()).await;
                };
                let callback = WidgetRoute::EditDocument {
                    project_code: project_code.clone(),
                    project_id,
                    issue_id,
                }
                .path();
                let url = consumer.edit_document_url(document_id, &callback, &credentials)?;
                Ok(WidgetResponse::Redirect(url.to_string()))
            }
            WidgetRoute::EditDocument {
                ref project_code,
                project_id,
                issue_id,
            } => {
                let Some(credentials) = self.user_credentials(&request.user_id).await? else {
                    return self.authenticate(&consumer, &route.path()).await;
                };
                let document_id = request.require_param("documentid")?;
                self.save_document(&consumer, &credentials, issue_id, document_id)
                    .await?;
                Ok(WidgetResponse::IssuePage {
                    project_id,
                    project_code: project_code.clone(),
                    issue_id,
                })
            }
            WidgetRoute::Configure | WidgetRoute::Thumbnail { .. } | WidgetRoute::Image { .. } => {
                Ok(WidgetResponse::Empty)
            }
        }
    }
}
