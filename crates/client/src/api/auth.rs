//! Sign-in, sign-up and password recovery endpoints.

use bazaar_core::User;
use reqwest::Method;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::{ApiClient, ApiError, UserEnvelope};

/// Login credentials. The backend accepts either an email or a username.
#[derive(Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Credentials<'a> {
    Email { email: &'a str, password: &'a str },
    Username { username: &'a str, password: &'a str },
}

impl<'a> Credentials<'a> {
    /// Pick the email or username form from what was typed.
    #[must_use]
    pub fn new(login: &'a str, password: &'a str) -> Self {
        let login = login.trim();
        if login.contains('@') {
            Self::Email {
                email: login,
                password,
            }
        } else {
            Self::Username {
                username: login,
                password,
            }
        }
    }

    /// The email or username part.
    #[must_use]
    pub const fn login(&self) -> &'a str {
        match *self {
            Self::Email { email, .. } => email,
            Self::Username { username, .. } => username,
        }
    }
}

impl std::fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login())
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of a sign-up or OTP request.
#[derive(Clone, Copy, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for SignupRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A successful sign-in: the bearer token and the account it belongs to.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub token: SecretString,
    pub user: User,
}

#[derive(Deserialize)]
struct RawAuthResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

impl TryFrom<RawAuthResponse> for AuthResponse {
    type Error = ApiError;

    fn try_from(raw: RawAuthResponse) -> Result<Self, Self::Error> {
        let token = raw
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingField("token"))?;
        let user = raw.user.ok_or(ApiError::MissingField("user"))?;
        Ok(Self {
            token: SecretString::from(token),
            user,
        })
    }
}

/// Reply to a password-reset request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    /// Where the code was sent, partially hidden (`j***@example.com`).
    #[serde(default)]
    pub masked_email: Option<String>,
}

impl ApiClient {
    /// Sign in with an email or username and a password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, credentials), fields(login = %credentials.login()))]
    pub async fn login(&self, credentials: &Credentials<'_>) -> Result<AuthResponse, ApiError> {
        let request = self
            .request(Method::POST, "/api/auth/login")
            .await?
            .json(credentials);
        self.send_json::<RawAuthResponse>(request).await?.try_into()
    }

    /// Create a customer account and sign in.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created.
    #[instrument(skip(self, signup), fields(email = %signup.email))]
    pub async fn signup(&self, signup: &SignupRequest<'_>) -> Result<AuthResponse, ApiError> {
        let request = self
            .request(Method::POST, "/api/auth/signup")
            .await?
            .json(signup);
        self.send_json::<RawAuthResponse>(request).await?.try_into()
    }

    /// Ask for a sign-up code to be emailed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses to send the code.
    #[instrument(skip(self, signup), fields(email = %signup.email))]
    pub async fn request_signup_otp(
        &self,
        signup: &SignupRequest<'_>,
    ) -> Result<serde_json::Value, ApiError> {
        let request = self
            .request(Method::POST, "/api/auth/signup/request-otp")
            .await?
            .json(signup);
        self.send_json(request).await
    }

    /// Confirm a sign-up code and sign in.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong or expired.
    #[instrument(skip(self, code))]
    pub async fn verify_signup_otp(
        &self,
        email: &str,
        code: &str,
    ) -> Result<AuthResponse, ApiError> {
        let request = self
            .request(Method::POST, "/api/auth/signup/verify-otp")
            .await?
            .json(&json!({ "email": email, "code": code }));
        self.send_json::<RawAuthResponse>(request).await?.try_into()
    }

    /// Start a password reset for an email or username.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is unknown or the request fails.
    #[instrument(skip(self))]
    pub async fn forgot_password(
        &self,
        identifier: &str,
    ) -> Result<ForgotPasswordResponse, ApiError> {
        let request = self
            .request(Method::POST, "/api/auth/forgot-password")
            .await?
            .json(&json!({ "identifier": identifier }));
        self.send_json(request).await
    }

    /// Finish a password reset with the emailed code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong or the request fails.
    #[instrument(skip(self, code, new_password))]
    pub async fn reset_password(
        &self,
        identifier: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/api/auth/reset-password")
            .await?
            .json(&json!({
                "identifier": identifier,
                "code": code,
                "newPassword": new_password,
            }));
        self.send_empty(request).await
    }

    /// The account the current token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the token is missing or rejected.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ApiError> {
        let envelope: UserEnvelope<User> = self.get_json("/api/me").await?;
        Ok(envelope.user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_credentials_pick_email_or_username() {
        let by_email = serde_json::to_value(Credentials::new(" ann@example.com ", "pw")).unwrap();
        assert_eq!(by_email, json!({"email": "ann@example.com", "password": "pw"}));

        let by_username = serde_json::to_value(Credentials::new("root", "pw")).unwrap();
        assert_eq!(by_username, json!({"username": "root", "password": "pw"}));
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let debug = format!("{:?}", Credentials::new("root", "hunter2"));
        assert!(!debug.contains("hunter2"));
        let signup = SignupRequest {
            name: "Ann",
            email: "ann@example.com",
            password: "hunter2",
        };
        assert!(!format!("{signup:?}").contains("hunter2"));
    }

    #[test]
    fn test_auth_response_requires_token_and_user() {
        let raw: RawAuthResponse = serde_json::from_value(json!({
            "token": "abc",
            "user": {"_id": "u1", "email": "ann@example.com", "role": "SELLER"}
        }))
        .unwrap();
        let auth = AuthResponse::try_from(raw).unwrap();
        assert_eq!(auth.token.expose_secret(), "abc");
        assert_eq!(auth.user.account_id(), Some("u1"));

        let raw: RawAuthResponse = serde_json::from_value(json!({"user": {}})).unwrap();
        assert!(matches!(
            AuthResponse::try_from(raw),
            Err(ApiError::MissingField("token"))
        ));

        let raw: RawAuthResponse = serde_json::from_value(json!({"token": "abc"})).unwrap();
        assert!(matches!(
            AuthResponse::try_from(raw),
            Err(ApiError::MissingField("user"))
        ));
    }

    #[test]
    fn test_forgot_password_response() {
        let reply: ForgotPasswordResponse =
            serde_json::from_value(json!({"maskedEmail": "a***@example.com"})).unwrap();
        assert_eq!(reply.masked_email.as_deref(), Some("a***@example.com"));
    }
}
