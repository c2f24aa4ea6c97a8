//! Auth API client
//!
//! Thin wrapper over the REST endpoints. Transport failures come back as
//! `reqwest::Error`; HTTP-level rejections come back as
//! `ApiResponse::Failure` so callers can decide what a status means.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::session::{Credentials, ProfileUpdate, Registration, UserProfile};

/// Outcome of a request that reached the server.
#[derive(Debug)]
pub enum ApiResponse<T> {
    Success(T),
    Failure {
        status: StatusCode,
        /// `error` (or `message`) from the response body, when present
        message: Option<String>,
    },
}

/// Body of a successful login, register or refresh.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AuthPayload {
    /// `accessToken`, or the older `token` field.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .or(self.token.as_deref())
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: Option<&'a str>,
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    new_password: &'a str,
}

#[derive(Clone)]
pub struct AuthApi {
    client: reqwest::Client,
    base_url: Url,
}

impl AuthApi {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<ApiResponse<AuthPayload>, reqwest::Error> {
        let request = self.client.post(self.endpoint("/register")).json(registration);
        send_json(request).await
    }

    pub async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<ApiResponse<AuthPayload>, reqwest::Error> {
        let request = self.client.post(self.endpoint("/login")).json(credentials);
        send_json(request).await
    }

    /// The response body is ignored; only the status is reported.
    pub async fn logout(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<StatusCode, reqwest::Error> {
        let request = self
            .client
            .post(self.endpoint("/logout"))
            .bearer_auth(access_token)
            .json(&RefreshRequest { refresh_token });
        send_for_status(request).await
    }

    pub async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<ApiResponse<AuthPayload>, reqwest::Error> {
        let request = self
            .client
            .post(self.endpoint("/refresh"))
            .json(&RefreshRequest {
                refresh_token: Some(refresh_token),
            });
        send_json(request).await
    }

    pub async fn verify(&self, access_token: &str) -> Result<StatusCode, reqwest::Error> {
        let request = self
            .client
            .get(self.endpoint("/verify"))
            .bearer_auth(access_token);
        send_for_status(request).await
    }

    pub(crate) async fn profile(
        &self,
        access_token: &str,
    ) -> Result<ApiResponse<UserEnvelope>, reqwest::Error> {
        let request = self
            .client
            .get(self.endpoint("/profile"))
            .bearer_auth(access_token);
        send_json(request).await
    }

    pub(crate) async fn update_profile(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<ApiResponse<UserEnvelope>, reqwest::Error> {
        let request = self
            .client
            .put(self.endpoint("/profile"))
            .bearer_auth(access_token)
            .json(update);
        send_json(request).await
    }

    pub(crate) async fn forgot_password(
        &self,
        email: &str,
    ) -> Result<ApiResponse<MessageBody>, reqwest::Error> {
        let request = self
            .client
            .post(self.endpoint("/forgot-password"))
            .json(&EmailRequest { email });
        send_json(request).await
    }

    pub(crate) async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<ApiResponse<MessageBody>, reqwest::Error> {
        let request = self
            .client
            .post(self.endpoint("/reset-password"))
            .json(&ResetPasswordRequest {
                token,
                new_password,
            });
        send_json(request).await
    }
}

async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<ApiResponse<T>, reqwest::Error> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(ApiResponse::Success(response.json::<T>().await?));
    }

    // A missing or non-JSON error body just means no message
    let body = response.json::<ErrorBody>().await.unwrap_or_default();
    Ok(ApiResponse::Failure {
        status,
        message: body.error.or(body.message),
    })
}

async fn send_for_status(request: RequestBuilder) -> Result<StatusCode, reqwest::Error> {
    Ok(request.send().await?.status())
}
