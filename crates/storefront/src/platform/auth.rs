//! Identity adapter: email/password accounts and the local session.
//!
//! Sign-in and sign-up call the identity service's password endpoints. The
//! resulting [`AuthUser`] becomes the current session, which the document
//! and blob store adapters use to authorize their requests. Session changes
//! are broadcast through a `tokio::sync::watch` channel.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tensura_core::{Email, EmailError, User, UserId};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use super::PlatformApp;
use super::error::{LogFailure, Operation, PlatformError, PlatformFailure, check_status};

const SIGN_IN_METHOD: &str = "accounts:signInWithPassword";
const SIGN_UP_METHOD: &str = "accounts:signUp";

/// A signed-in platform account.
///
/// Tokens are secrets and never appear in `Debug` output.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: SecretString,
    pub refresh_token: SecretString,
    /// Lifetime of `id_token` in seconds.
    pub expires_in: u64,
}

impl AuthUser {
    /// Mirror the account into a local [`User`] record stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the account has no usable email address.
    pub fn to_user(&self, at: DateTime<Utc>) -> Result<User, EmailError> {
        let email = Email::parse(self.email.as_deref().unwrap_or_default())?;
        Ok(User {
            id: UserId::new(self.uid.clone()),
            email,
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
            created_at: at,
            updated_at: at,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(uid: &str, id_token: &str) -> Self {
        Self {
            uid: uid.to_string(),
            email: Some(format!("{uid}@tempest.gov")),
            display_name: None,
            photo_url: None,
            id_token: SecretString::from(id_token),
            refresh_token: SecretString::from("refresh"),
            expires_in: 3600,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

impl TryFrom<PasswordResponse> for AuthUser {
    type Error = PlatformFailure;

    fn try_from(response: PasswordResponse) -> Result<Self, Self::Error> {
        let expires_in = response.expires_in.parse::<u64>().map_err(|_| {
            PlatformFailure::Unexpected(format!("expiresIn is not a number: {}", response.expires_in))
        })?;

        Ok(Self {
            uid: response.local_id,
            email: response.email,
            // The platform sends "" for accounts without a display name
            display_name: response.display_name.filter(|name| !name.is_empty()),
            photo_url: response.photo_url.filter(|url| !url.is_empty()),
            id_token: SecretString::from(response.id_token),
            refresh_token: SecretString::from(response.refresh_token),
            expires_in,
        })
    }
}

/// Identity adapter.
#[derive(Debug, Clone)]
pub struct AuthClient {
    app: PlatformApp,
}

impl AuthClient {
    pub(crate) const fn new(app: PlatformApp) -> Self {
        Self { app }
    }

    /// Sign in with email and password and make the account current.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::SignIn`]; the platform's
    /// reason (e.g. `INVALID_LOGIN_CREDENTIALS`) is in
    /// [`PlatformError::api_message`].
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, PlatformError> {
        let user = self
            .password_request(SIGN_IN_METHOD, email, password)
            .await
            .log_failure(Operation::SignIn, email)?;

        debug!(uid = %user.uid, "Signed in");
        self.app.session().send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Create an account with email and password and make it current.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` tagged [`Operation::SignUp`] (e.g.
    /// `EMAIL_EXISTS`).
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, PlatformError> {
        let user = self
            .password_request(SIGN_UP_METHOD, email, password)
            .await
            .log_failure(Operation::SignUp, email)?;

        info!(uid = %user.uid, "Account created");
        self.app.session().send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Forget the current session. Local only; the platform keeps no
    /// server-side session for password sign-in.
    pub fn sign_out(&self) {
        if let Some(user) = self.app.session().send_replace(None) {
            debug!(uid = %user.uid, "Signed out");
        }
    }

    /// Observe session changes. Dropping the receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.app.session().subscribe()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.app.session().borrow().clone()
    }

    async fn password_request(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, PlatformFailure> {
        let url = format!(
            "{}/v1/{method}",
            self.app.config().auth_url.trim_end_matches('/')
        );

        let response = self
            .app
            .http()
            .post(url)
            .query(&[("key", self.app.api_key())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        let parsed: PasswordResponse = serde_json::from_str(&body)?;
        parsed.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::config::PlatformConfig;

    fn response(expires_in: &str) -> PasswordResponse {
        PasswordResponse {
            local_id: "rimuru".to_string(),
            email: Some("rimuru@tempest.gov".to_string()),
            display_name: Some(String::new()),
            photo_url: None,
            id_token: "id-token".to_string(),
            refresh_token: "refresh-token".to_string(),
            expires_in: expires_in.to_string(),
        }
    }

    #[test]
    fn test_response_conversion() {
        let user = AuthUser::try_from(response("3600")).unwrap();
        assert_eq!(user.uid, "rimuru");
        assert_eq!(user.expires_in, 3600);
        assert_eq!(user.display_name, None);
        assert_eq!(user.id_token.expose_secret(), "id-token");
    }

    #[test]
    fn test_response_bad_expiry() {
        let err = AuthUser::try_from(response("soon")).unwrap_err();
        assert!(matches!(err, PlatformFailure::Unexpected(_)));
    }

    #[test]
    fn test_response_wire_names() {
        let body = r#"{
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "abc",
            "email": "veldora@tempest.gov",
            "displayName": "Veldora",
            "idToken": "t",
            "refreshToken": "r",
            "expiresIn": "3600",
            "registered": true
        }"#;
        let parsed: PasswordResponse = serde_json::from_str(body).unwrap();
        let user = AuthUser::try_from(parsed).unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Veldora"));
        assert_eq!(user.email.as_deref(), Some("veldora@tempest.gov"));
    }

    #[test]
    fn test_to_user() {
        let at = Utc::now();
        let user = AuthUser::for_tests("shion", "t").to_user(at).unwrap();
        assert_eq!(user.id.as_str(), "shion");
        assert_eq!(user.email.as_str(), "shion@tempest.gov");
        assert_eq!(user.created_at, at);

        let mut anonymous = AuthUser::for_tests("anon", "t");
        anonymous.email = None;
        assert!(anonymous.to_user(at).is_err());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", AuthUser::for_tests("uid", "very-secret-token"));
        assert!(!debug.contains("very-secret-token"));
    }

    #[tokio::test]
    async fn test_sign_out_notifies_subscribers() {
        let app = PlatformApp::new(PlatformConfig::new("key", "demo")).unwrap();
        let auth = app.auth();
        let mut rx = auth.subscribe();

        app.session().send_replace(Some(AuthUser::for_tests("benimaru", "t")));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().uid, "benimaru");
        assert_eq!(auth.current_user().unwrap().uid, "benimaru");

        auth.sign_out();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
        assert!(auth.current_user().is_none());
    }
}
