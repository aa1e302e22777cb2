//! Thin wrappers over the backend platform's REST surface.
//!
//! One adapter per platform service:
//!
//! - [`AuthClient`] - email/password identity and the local session
//! - [`DocumentStore`] - collection/document storage
//! - [`BlobStore`] - path-addressed file storage
//!
//! All adapters share a single [`PlatformApp`], which owns the HTTP client,
//! the connection descriptor and the signed-in session. Each operation is a
//! single platform call: no retries, no caching, no batching. Failures are
//! logged once where they happen and returned as [`PlatformError`].

pub mod auth;
pub mod error;
pub mod firestore;
pub mod storage;

use std::sync::Arc;

use secrecy::ExposeSecret;
use tokio::sync::watch;
use tracing::info;

use crate::config::PlatformConfig;

pub use auth::{AuthClient, AuthUser};
pub use error::{Operation, PlatformError, PlatformFailure, Service};
pub use firestore::{
    Collection, Direction, Document, DocumentData, DocumentStore, FilterOp, QueryConstraint,
};
pub use storage::{BlobStore, StorageRef, StringFormat};

use error::LogFailure;

/// Handle to an initialized platform project.
///
/// Cheap to clone; every clone shares the same HTTP client and session.
#[derive(Clone)]
pub struct PlatformApp {
    inner: Arc<PlatformInner>,
}

struct PlatformInner {
    http: reqwest::Client,
    config: PlatformConfig,
    session: watch::Sender<Option<AuthUser>>,
}

impl PlatformApp {
    /// Initialize the platform handle from a connection descriptor.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::Initialize`] if the
    /// descriptor is incomplete or the HTTP client cannot be built.
    pub fn new(config: PlatformConfig) -> Result<Self, PlatformError> {
        let http = build_client(&config).log_failure(Operation::Initialize, &config.project_id)?;
        let (session, _) = watch::channel(None);

        info!(
            project_id = %config.project_id,
            bucket = %config.storage_bucket,
            "Platform initialized"
        );

        Ok(Self {
            inner: Arc::new(PlatformInner {
                http,
                config,
                session,
            }),
        })
    }

    /// Identity adapter.
    #[must_use]
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.clone())
    }

    /// Document store adapter.
    #[must_use]
    pub fn firestore(&self) -> DocumentStore {
        DocumentStore::new(self.clone())
    }

    /// Blob store adapter.
    #[must_use]
    pub fn storage(&self) -> BlobStore {
        BlobStore::new(self.clone())
    }

    #[must_use]
    pub fn config(&self) -> &PlatformConfig {
        &self.inner.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn api_key(&self) -> &str {
        self.inner.config.api_key.expose_secret()
    }

    pub(crate) fn session(&self) -> &watch::Sender<Option<AuthUser>> {
        &self.inner.session
    }

    /// ID token of the signed-in user, sent with data requests.
    pub(crate) fn id_token(&self) -> Option<String> {
        self.inner
            .session
            .borrow()
            .as_ref()
            .map(|user| user.id_token.expose_secret().to_string())
    }
}

impl std::fmt::Debug for PlatformApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformApp")
            .field("config", &self.inner.config)
            .field("signed_in", &self.inner.session.borrow().is_some())
            .finish_non_exhaustive()
    }
}

fn build_client(config: &PlatformConfig) -> Result<reqwest::Client, PlatformFailure> {
    if config.project_id.trim().is_empty() {
        return Err(PlatformFailure::InvalidInput(
            "project id must not be empty".to_string(),
        ));
    }
    if config.storage_bucket.trim().is_empty() {
        return Err(PlatformFailure::InvalidInput(
            "storage bucket must not be empty".to_string(),
        ));
    }
    for endpoint in [&config.auth_url, &config.firestore_url, &config.storage_url] {
        url::Url::parse(endpoint)?;
    }

    Ok(reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?)
}
