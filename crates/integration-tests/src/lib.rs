//! Integration tests for Tensura Store.
//!
//! The platform wrappers are exercised over real HTTP against a `mockito`
//! server standing in for the backend platform, so no project or network
//! access is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tensura-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `platform_auth` - sign-in, sign-up and the session channel
//! - `platform_firestore` - document store requests and decoding
//! - `platform_storage` - blob store uploads, URLs and listings

use mockito::{Matcher, ServerGuard};
use serde_json::json;
use tensura_storefront::config::PlatformConfig;
use tensura_storefront::platform::{AuthUser, PlatformApp};

pub const API_KEY: &str = "test-api-key";
pub const PROJECT_ID: &str = "demo";
pub const BUCKET: &str = "demo.appspot.com";
pub const ID_TOKEN: &str = "id-token-rimuru";

/// Platform handle pointed at the mock server.
///
/// # Panics
///
/// Panics if the handle cannot be built.
#[must_use]
pub fn platform(server: &ServerGuard) -> PlatformApp {
    let config = PlatformConfig::new(API_KEY, PROJECT_ID).with_base_url(&server.url());
    PlatformApp::new(config).expect("Failed to initialize platform")
}

/// Path of a document store resource, e.g. `documents_path("/products/p1")`.
#[must_use]
pub fn documents_path(rest: &str) -> String {
    format!("/v1/projects/{PROJECT_ID}/databases/(default)/documents{rest}")
}

/// Query matcher for the API key every identity and document call carries.
#[must_use]
pub fn api_key() -> Matcher {
    Matcher::UrlEncoded("key".to_string(), API_KEY.to_string())
}

/// Identity response body for a password sign-in or sign-up.
#[must_use]
pub fn auth_response(uid: &str, email: &str) -> String {
    json!({
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": uid,
        "email": email,
        "displayName": "",
        "idToken": ID_TOKEN,
        "refreshToken": "refresh-token",
        "expiresIn": "3600",
        "registered": true
    })
    .to_string()
}

/// Sign in through a mocked identity endpoint so later calls are authorized
/// with [`ID_TOKEN`].
///
/// # Panics
///
/// Panics if the sign-in fails.
pub async fn sign_in(server: &mut ServerGuard, app: &PlatformApp) -> AuthUser {
    let mock = server
        .mock("POST", "/v1/accounts:signInWithPassword")
        .match_query(api_key())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(auth_response("rimuru", "rimuru@tempest.gov"))
        .create_async()
        .await;

    let user = app
        .auth()
        .sign_in("rimuru@tempest.gov", "Slime!2024")
        .await
        .expect("Failed to sign in");
    mock.assert_async().await;
    user
}
