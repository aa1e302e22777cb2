//! Document store adapter.
//!
//! Documents are addressed by collection path plus document ID. Data is
//! plain JSON ([`DocumentData`]); the wire encoding lives in [`value`] and
//! query building in [`query`].
//!
//! Requests carry the project API key and, once someone has signed in, the
//! session's ID token so the platform's security rules apply.

mod path;
mod query;
pub mod value;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use super::PlatformApp;
use super::error::{LogFailure, Operation, PlatformError, PlatformFailure, check_status};

pub use query::{Direction, FilterOp, QueryConstraint};
use path::{field_path, nest_fields};
use query::structured_query;
use value::{decode_fields, encode_fields};

/// Field map of one document.
pub type DocumentData = Map<String, Value>;

/// Collections the store reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Products,
    Orders,
    Cart,
    Auth,
    Reviews,
}

impl Collection {
    pub const ALL: [Self; 6] = [
        Self::Users,
        Self::Products,
        Self::Orders,
        Self::Cart,
        Self::Auth,
        Self::Reviews,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Cart => "cart",
            Self::Auth => "auth",
            Self::Reviews => "reviews",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Collection {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// A document returned by a listing or query.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: DocumentData,
}

impl Document {
    /// The document's data with its ID attached under `"id"`.
    ///
    /// The real ID replaces any `id` field stored in the data.
    #[must_use]
    pub fn into_map(self) -> DocumentData {
        let mut data = self.data;
        data.insert("id".to_string(), Value::String(self.id));
        data
    }

    /// Deserialize the document (ID attached) into a model type.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the data does not fit `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.into_map()))
    }
}

/// Serialize a model into document data.
///
/// # Errors
///
/// Fails if `value` does not serialize to a JSON object.
pub fn to_document_data<T: Serialize>(value: &T) -> Result<DocumentData, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "document data must be an object, got {other}"
        ))),
    }
}

/// A document as the REST surface returns it.
#[derive(Debug, serde::Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: DocumentData,
}

impl RawDocument {
    fn into_document(self) -> Result<Document, PlatformFailure> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PlatformFailure::Unexpected(format!("bad document name: {}", self.name)))?
            .to_string();
        Ok(Document {
            id,
            data: decode_fields(&self.fields)?,
        })
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct QueryResult {
    document: Option<RawDocument>,
}

/// Document store adapter.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    app: PlatformApp,
}

impl DocumentStore {
    pub(crate) const fn new(app: PlatformApp) -> Self {
        Self { app }
    }

    /// Create or replace a document.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::SetDocument`].
    #[instrument(skip(self, data))]
    pub async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &DocumentData,
    ) -> Result<(), PlatformError> {
        self.write(collection, id, data, &[])
            .await
            .log_failure(Operation::SetDocument, &target(collection, id))
    }

    /// Fetch one document's data, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::GetDocument`].
    #[instrument(skip(self))]
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<DocumentData>, PlatformError> {
        self.fetch(collection, id)
            .await
            .map(|doc| doc.map(|doc| doc.data))
            .log_failure(Operation::GetDocument, &target(collection, id))
    }

    /// Every document of a collection, following page tokens until the
    /// listing is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::GetDocuments`].
    #[instrument(skip(self))]
    pub async fn get_documents(&self, collection: &str) -> Result<Vec<Document>, PlatformError> {
        self.list(collection)
            .await
            .log_failure(Operation::GetDocuments, collection)
    }

    /// Run one query against a collection.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::QueryDocuments`], e.g.
    /// when the platform wants an index for the combination of constraints.
    #[instrument(skip(self))]
    pub async fn query_documents(
        &self,
        collection: &str,
        constraints: &[QueryConstraint],
    ) -> Result<Vec<Document>, PlatformError> {
        self.run_query(collection, constraints)
            .await
            .log_failure(Operation::QueryDocuments, collection)
    }

    /// Overwrite the given fields of an existing document.
    ///
    /// A dotted key such as `shippingAddress.city` updates only that nested
    /// field.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::UpdateDocument`]; a
    /// missing document is a 404, and overlapping keys are `InvalidInput`.
    #[instrument(skip(self, partial))]
    pub async fn update_document(
        &self,
        collection: &str,
        id: &str,
        partial: &DocumentData,
    ) -> Result<(), PlatformError> {
        self.update(collection, id, partial)
            .await
            .log_failure(Operation::UpdateDocument, &target(collection, id))
    }

    /// Delete a document. Deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::DeleteDocument`].
    #[instrument(skip(self))]
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), PlatformError> {
        self.delete(collection, id)
            .await
            .log_failure(Operation::DeleteDocument, &target(collection, id))
    }

    /// Documents whose `field` equals `value`.
    ///
    /// # Errors
    ///
    /// See [`Self::query_documents`].
    pub async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Document>, PlatformError> {
        self.query_documents(collection, &[QueryConstraint::where_eq(field, value)])
            .await
    }

    /// Documents sorted by `field`, optionally capped at `limit`.
    ///
    /// A limit of zero means no limit.
    ///
    /// # Errors
    ///
    /// See [`Self::query_documents`].
    pub async fn get_ordered_documents(
        &self,
        collection: &str,
        field: &str,
        direction: Direction,
        limit: Option<u32>,
    ) -> Result<Vec<Document>, PlatformError> {
        let mut constraints = vec![QueryConstraint::order_by(field, direction)];
        if let Some(limit) = limit.filter(|&limit| limit > 0) {
            constraints.push(QueryConstraint::limit(limit));
        }
        self.query_documents(collection, &constraints).await
    }

    // -------------------------------------------------------------------------
    // Requests
    // -------------------------------------------------------------------------

    fn documents_root(&self) -> String {
        let config = self.app.config();
        format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            config.firestore_url.trim_end_matches('/'),
            config.project_id
        )
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_root(), encode_path(collection))
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(id)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .app
            .http()
            .request(method, url)
            .query(&[("key", self.app.api_key())]);
        match self.app.id_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn write(
        &self,
        collection: &str,
        id: &str,
        data: &DocumentData,
        params: &[(&str, String)],
    ) -> Result<(), PlatformFailure> {
        let response = self
            .request(Method::PATCH, &self.document_url(collection, id))
            .query(params)
            .json(&json!({ "fields": encode_fields(data) }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Document>, PlatformFailure> {
        let response = self
            .request(Method::GET, &self.document_url(collection, id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Document not found");
            return Ok(None);
        }

        let body = check_status(response).await?.text().await?;
        let raw: RawDocument = serde_json::from_str(&body)?;
        raw.into_document().map(Some)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, PlatformFailure> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.request(Method::GET, &url);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let body = check_status(request.send().await?).await?.text().await?;
            let page: ListResponse = serde_json::from_str(&body)?;
            for raw in page.documents {
                documents.push(raw.into_document()?);
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = documents.len(), "Listed documents");
        Ok(documents)
    }

    async fn run_query(
        &self,
        collection: &str,
        constraints: &[QueryConstraint],
    ) -> Result<Vec<Document>, PlatformFailure> {
        let collection = collection.trim_matches('/');
        // Subcollections query under their parent document
        let (parent, collection_id) = match collection.rsplit_once('/') {
            Some((parent, id)) => (format!("/{}", encode_path(parent)), id),
            None => (String::new(), collection),
        };
        if collection_id.is_empty() {
            return Err(PlatformFailure::InvalidInput(
                "collection path must not be empty".to_string(),
            ));
        }

        let url = format!("{}{parent}:runQuery", self.documents_root());
        let response = self
            .request(Method::POST, &url)
            .json(&structured_query(collection_id, constraints))
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        let results: Vec<QueryResult> = serde_json::from_str(&body)?;
        let documents = results
            .into_iter()
            .filter_map(|result| result.document)
            .map(RawDocument::into_document)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = documents.len(), "Query returned documents");
        Ok(documents)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: &DocumentData,
    ) -> Result<(), PlatformFailure> {
        if partial.is_empty() {
            // Nothing to write; the call still fails for a missing document
            return match self.fetch(collection, id).await? {
                Some(_) => Ok(()),
                None => Err(PlatformFailure::Api {
                    status: StatusCode::NOT_FOUND.as_u16(),
                    message: format!("No document to update: {}", target(collection, id)),
                }),
            };
        }

        // Dotted keys update a nested field and leave its siblings alone
        let nested = nest_fields(partial)?;
        let mut params: Vec<(&str, String)> = partial
            .keys()
            .map(|key| ("updateMask.fieldPaths", field_path(key)))
            .collect();
        params.push(("currentDocument.exists", "true".to_string()));

        self.write(collection, id, &nested, &params).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), PlatformFailure> {
        let response = self
            .request(Method::DELETE, &self.document_url(collection, id))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

fn target(collection: &str, id: &str) -> String {
    format!("{}/{id}", collection.trim_matches('/'))
}

/// Percent-encode each segment of a slash-separated path.
fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
