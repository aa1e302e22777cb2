//! Blob store adapter.
//!
//! Files are addressed by slash-separated paths inside the project bucket.
//! Uploads return a public download URL carrying the object's download
//! token. Directory listings use the `/` delimiter, so "directories" are
//! the common prefixes one level below the listed path.

mod format;
mod reference;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::PlatformApp;
use super::error::{LogFailure, Operation, PlatformError, PlatformFailure, check_status};

pub use format::StringFormat;
pub use reference::StorageRef;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    bucket: String,
    /// Comma-separated; the first token is used for download URLs.
    #[serde(default)]
    download_tokens: Option<String>,
}

impl ObjectMetadata {
    fn first_token(&self) -> Option<&str> {
        self.download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    prefixes: Vec<String>,
    #[serde(default)]
    items: Vec<ListItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
}

/// Which half of a listing the caller wants.
#[derive(Debug, Clone, Copy)]
enum Listing {
    Files,
    Directories,
}

/// Blob store adapter.
#[derive(Debug, Clone)]
pub struct BlobStore {
    app: PlatformApp,
}

impl BlobStore {
    pub(crate) const fn new(app: PlatformApp) -> Self {
        Self { app }
    }

    /// Reference to `path` in the project bucket. No I/O.
    #[must_use]
    pub fn create_storage_ref(&self, path: &str) -> StorageRef {
        StorageRef::new(self.app.config().storage_bucket.clone(), path)
    }

    /// Upload bytes to `path` and return the download URL.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::UploadFile`].
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_file(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, PlatformError> {
        self.upload(path, bytes, content_type)
            .await
            .log_failure(Operation::UploadFile, path)
    }

    /// Upload a string in the given format and return the download URL.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::UploadString`], including
    /// when `data` is not valid in `format`.
    #[instrument(skip(self, data))]
    pub async fn upload_string(
        &self,
        path: &str,
        data: &str,
        format: StringFormat,
    ) -> Result<String, PlatformError> {
        let result = match format.decode(data) {
            Ok((bytes, content_type)) => self.upload(path, bytes, content_type.as_deref()).await,
            Err(e) => Err(e),
        };
        result.log_failure(Operation::UploadString, path)
    }

    /// Download URL of an existing file.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::GetFileUrl`]; a missing
    /// file is a 404.
    #[instrument(skip(self))]
    pub async fn get_file_url(&self, path: &str) -> Result<String, PlatformError> {
        self.file_url(path)
            .await
            .log_failure(Operation::GetFileUrl, path)
    }

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::DeleteFile`]; a missing
    /// file is a 404.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, path: &str) -> Result<(), PlatformError> {
        self.delete(path)
            .await
            .log_failure(Operation::DeleteFile, path)
    }

    /// Fetch a file's bytes.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::DownloadFile`].
    #[instrument(skip(self))]
    pub async fn download_file(&self, path: &str) -> Result<Vec<u8>, PlatformError> {
        self.download(path)
            .await
            .log_failure(Operation::DownloadFile, path)
    }

    /// Files directly under `path`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::ListFiles`].
    #[instrument(skip(self))]
    pub async fn list_files(&self, path: &str) -> Result<Vec<StorageRef>, PlatformError> {
        self.list(path, Listing::Files)
            .await
            .log_failure(Operation::ListFiles, path)
    }

    /// Directories directly under `path`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::ListDirectories`].
    #[instrument(skip(self))]
    pub async fn list_directories(&self, path: &str) -> Result<Vec<StorageRef>, PlatformError> {
        self.list(path, Listing::Directories)
            .await
            .log_failure(Operation::ListDirectories, path)
    }

    // -------------------------------------------------------------------------
    // Requests
    // -------------------------------------------------------------------------

    fn objects_url(&self, bucket: &str) -> String {
        format!(
            "{}/v0/b/{bucket}/o",
            self.app.config().storage_url.trim_end_matches('/')
        )
    }

    fn object_url(&self, reference: &StorageRef) -> String {
        format!(
            "{}/{}",
            self.objects_url(reference.bucket()),
            urlencoding::encode(reference.full_path())
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.app.http().request(method, url);
        match self.app.id_token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Firebase {token}")),
            None => builder,
        }
    }

    /// Reference to a file; the bucket root is not a file.
    fn file_ref(&self, path: &str) -> Result<StorageRef, PlatformFailure> {
        let reference = self.create_storage_ref(path);
        if reference.is_root() {
            return Err(PlatformFailure::InvalidInput(
                "operation is not allowed on the bucket root".to_string(),
            ));
        }
        Ok(reference)
    }

    fn download_url(&self, metadata: &ObjectMetadata) -> Option<String> {
        metadata.first_token().map(|token| {
            format!(
                "{}/{}?alt=media&token={}",
                self.objects_url(&metadata.bucket),
                urlencoding::encode(&metadata.name),
                urlencoding::encode(token)
            )
        })
    }

    async fn metadata(&self, reference: &StorageRef) -> Result<ObjectMetadata, PlatformFailure> {
        let response = self
            .request(Method::GET, &self.object_url(reference))
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, PlatformFailure> {
        let reference = self.file_ref(path)?;
        let response = self
            .request(Method::POST, &self.objects_url(reference.bucket()))
            .query(&[("name", reference.full_path())])
            .header(CONTENT_TYPE, content_type.unwrap_or(DEFAULT_CONTENT_TYPE))
            .body(bytes)
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        let uploaded: ObjectMetadata = serde_json::from_str(&body)?;
        debug!(name = %uploaded.name, "Uploaded object");

        match self.download_url(&uploaded) {
            Some(url) => Ok(url),
            // Some upload responses omit tokens; the metadata read has them
            None => self.url_from_metadata(&reference).await,
        }
    }

    async fn file_url(&self, path: &str) -> Result<String, PlatformFailure> {
        let reference = self.file_ref(path)?;
        self.url_from_metadata(&reference).await
    }

    async fn url_from_metadata(&self, reference: &StorageRef) -> Result<String, PlatformFailure> {
        let metadata = self.metadata(reference).await?;
        self.download_url(&metadata).ok_or_else(|| {
            PlatformFailure::Unexpected(format!("no download token for {reference}"))
        })
    }

    async fn delete(&self, path: &str) -> Result<(), PlatformFailure> {
        let reference = self.file_ref(path)?;
        let response = self
            .request(Method::DELETE, &self.object_url(&reference))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, PlatformFailure> {
        let reference = self.file_ref(path)?;
        let response = self
            .request(Method::GET, &self.object_url(&reference))
            .query(&[("alt", "media")])
            .send()
            .await?;
        let bytes = check_status(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn list(&self, path: &str, listing: Listing) -> Result<Vec<StorageRef>, PlatformFailure> {
        let reference = self.create_storage_ref(path);
        let url = self.objects_url(reference.bucket());
        let prefix = if reference.is_root() {
            String::new()
        } else {
            format!("{}/", reference.full_path())
        };

        let mut found = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, &url)
                .query(&[("prefix", prefix.as_str()), ("delimiter", "/")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let body = check_status(request.send().await?).await?.text().await?;
            let page: ListResponse = serde_json::from_str(&body)?;

            match listing {
                Listing::Files => found.extend(
                    page.items
                        .iter()
                        .map(|item| StorageRef::new(reference.bucket(), &item.name)),
                ),
                Listing::Directories => found.extend(
                    page.prefixes
                        .iter()
                        .map(|prefix| StorageRef::new(reference.bucket(), prefix)),
                ),
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = found.len(), ?listing, "Listed objects");
        Ok(found)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::PlatformConfig;

    fn store() -> BlobStore {
        PlatformApp::new(PlatformConfig::new("key", "tensura-store"))
            .unwrap()
            .storage()
    }

    #[test]
    fn test_create_storage_ref_uses_project_bucket() {
        let reference = store().create_storage_ref("/products/rimuru.png");
        assert_eq!(reference.bucket(), "tensura-store.appspot.com");
        assert_eq!(reference.full_path(), "products/rimuru.png");
    }

    #[test]
    fn test_object_url_encodes_path() {
        let store = store();
        let reference = store.create_storage_ref("products/rimuru plush.png");
        assert_eq!(
            store.object_url(&reference),
            "https://firebasestorage.googleapis.com/v0/b/tensura-store.appspot.com/o/products%2Frimuru%20plush.png"
        );
    }

    #[test]
    fn test_download_url_uses_first_token() {
        let metadata = ObjectMetadata {
            name: "images/hero.jpg".to_string(),
            bucket: "tensura-store.appspot.com".to_string(),
            download_tokens: Some("tok-1,tok-2".to_string()),
        };
        assert_eq!(
            store().download_url(&metadata).unwrap(),
            "https://firebasestorage.googleapis.com/v0/b/tensura-store.appspot.com/o/images%2Fhero.jpg?alt=media&token=tok-1"
        );
    }

    #[test]
    fn test_download_url_needs_token() {
        let metadata = ObjectMetadata {
            name: "a.txt".to_string(),
            bucket: "b".to_string(),
            download_tokens: Some(" ,".to_string()),
        };
        assert_eq!(store().download_url(&metadata), None);
    }

    #[test]
    fn test_root_is_not_a_file() {
        let err = store().file_ref("/").unwrap_err();
        assert!(matches!(err, PlatformFailure::InvalidInput(_)));
    }
}
