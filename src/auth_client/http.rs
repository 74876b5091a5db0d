use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::error;
use url::Url;

use super::{
    AuthApi, AuthClientError, Credentials, LoginResponse, RegistrationResponse,
    ValidateTokenResponse,
};

/// HTTP client for the remote authorization service. One bounded-timeout
/// request per call, no retries; failures surface to the caller immediately.
pub struct HttpAuthClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpAuthClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{}{}", base, path)
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn register_user(&self, credentials: &Credentials) -> Result<String, AuthClientError> {
        let resp = self
            .http
            .post(self.endpoint("/register"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| {
                error!("auth service register call failed: {e}");
                AuthClientError::ClientUnavailable
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("auth service register returned {status}: {body}");
            return Err(AuthClientError::Message(format!(
                "failed to register user: {body}"
            )));
        }

        let body: RegistrationResponse = resp.json().await.map_err(|e| {
            error!("auth service register response unreadable: {e}");
            AuthClientError::Message("failed to parse response from auth service".into())
        })?;

        if !body.error.is_empty() {
            return Err(AuthClientError::Message(body.error));
        }
        Ok(body.token)
    }

    async fn login_user(&self, credentials: &Credentials) -> Result<String, AuthClientError> {
        // The authorization service takes login credentials on GET /auth.
        let resp = self
            .http
            .get(self.endpoint("/auth"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| {
                error!("auth service login call failed: {e}");
                AuthClientError::ClientUnavailable
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::UNAUTHORIZED {
            return Err(AuthClientError::UserNotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("auth service login returned {status}: {body}");
            return Err(AuthClientError::Message(format!(
                "failed to sign user in: {body}"
            )));
        }

        let body: LoginResponse = resp.json().await.map_err(|e| {
            error!("auth service login response unreadable: {e}");
            AuthClientError::Message("failed to parse response from auth service".into())
        })?;

        if !body.error.is_empty() {
            return Err(AuthClientError::Message(body.error));
        }
        Ok(body.token)
    }

    async fn validate_token(&self, token: &str) -> Result<String, AuthClientError> {
        let resp = self
            .http
            .post(self.endpoint("/validate"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                error!("auth service validate call failed: {e}");
                AuthClientError::ClientUnavailable
            })?;

        if !resp.status().is_success() {
            return Err(AuthClientError::InvalidToken);
        }

        let body: ValidateTokenResponse = resp.json().await.map_err(|e| {
            error!("auth service validate response unreadable: {e}");
            AuthClientError::Message("failed to parse response from auth service".into())
        })?;

        if body.status != "OK" || body.user_login.is_empty() {
            return Err(AuthClientError::InvalidToken);
        }
        Ok(body.user_login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = HttpAuthClient::new(
            Url::parse("http://auth.local:9000/").unwrap(),
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(client.endpoint("/register"), "http://auth.local:9000/register");
        assert_eq!(client.endpoint("/validate"), "http://auth.local:9000/validate");
    }
}
