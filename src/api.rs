//! HTTP client for the FactFlow backend.
//!
//! Callers depend on the [`Backend`] trait so every controller can be fed a
//! recording fake in tests. [`ApiClient`] is the reqwest implementation:
//! JSON bodies, `Authorization: Bearer` on every call once a token is set,
//! multipart only for the profile-photo upload. A 401 from any endpoint maps
//! to [`Error::AuthExpired`]; other non-2xx responses surface as
//! [`Error::Api`] carrying the server's `detail` message when it sends one.

use crate::error::{Error, Result};
use crate::models::{
    AnalysisResponse, AnalyzeRequest, ArticleAggregates, CommunityStats, LoginRequest,
    LoginResponse, RegisterRequest, UpdateProfileRequest, User, VoteRecord, VoteRequest,
    VoteTotals,
};
use async_trait::async_trait;
use reqwest::{multipart, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::RwLock;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Install or clear the bearer token used for authenticated calls.
    fn set_token(&self, token: Option<String>);

    async fn register(&self, req: &RegisterRequest) -> Result<User>;
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse>;
    async fn me(&self) -> Result<User>;
    async fn update_me(&self, req: &UpdateProfileRequest) -> Result<User>;
    async fn upload_photo(&self, filename: &str, bytes: Vec<u8>) -> Result<User>;
    async fn daily_login(&self) -> Result<User>;
    async fn my_votes(&self) -> Result<Vec<VoteRecord>>;
    async fn analyze(&self, req: &AnalyzeRequest) -> Result<AnalysisResponse>;
    async fn article(&self, id: &str) -> Result<ArticleAggregates>;
    async fn article_votes(&self, id: &str) -> Result<VoteTotals>;
    async fn vote(&self, req: &VoteRequest) -> Result<()>;
    async fn community_stats(&self) -> Result<CommunityStats>;
}

/// Error body shape used by the backend (`detail`, with `message` as a
/// legacy alias).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.read().expect("token lock").as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::AuthExpired);
        }
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail.or(body.message));
            return Err(Error::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.authorize(builder).send().await?;
        Ok(Self::check(response).await?.json::<T>().await?)
    }

    async fn fetch_unit(&self, builder: RequestBuilder) -> Result<()> {
        let response = self.authorize(builder).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl Backend for ApiClient {
    fn set_token(&self, token: Option<String>) {
        *self.token.write().expect("token lock") = token;
    }

    async fn register(&self, req: &RegisterRequest) -> Result<User> {
        self.fetch(self.http.post(self.url("/users/register")).json(req))
            .await
    }

    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        self.fetch(self.http.post(self.url("/users/login")).json(req))
            .await
    }

    async fn me(&self) -> Result<User> {
        self.fetch(self.http.get(self.url("/users/me"))).await
    }

    async fn update_me(&self, req: &UpdateProfileRequest) -> Result<User> {
        self.fetch(self.http.put(self.url("/users/me")).json(req))
            .await
    }

    async fn upload_photo(&self, filename: &str, bytes: Vec<u8>) -> Result<User> {
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);
        self.fetch(
            self.http
                .post(self.url("/users/me/upload-photo"))
                .multipart(form),
        )
        .await
    }

    async fn daily_login(&self) -> Result<User> {
        self.fetch(self.http.post(self.url("/users/me/daily-login")))
            .await
    }

    async fn my_votes(&self) -> Result<Vec<VoteRecord>> {
        self.fetch(self.http.get(self.url("/users/me/votes"))).await
    }

    async fn analyze(&self, req: &AnalyzeRequest) -> Result<AnalysisResponse> {
        self.fetch(self.http.post(self.url("/analyze")).json(req))
            .await
    }

    async fn article(&self, id: &str) -> Result<ArticleAggregates> {
        self.fetch(self.http.get(self.url(&format!("/article/{id}"))))
            .await
    }

    async fn article_votes(&self, id: &str) -> Result<VoteTotals> {
        self.fetch(self.http.get(self.url(&format!("/article/{id}/votes"))))
            .await
    }

    async fn vote(&self, req: &VoteRequest) -> Result<()> {
        self.fetch_unit(self.http.post(self.url("/vote")).json(req))
            .await
    }

    async fn community_stats(&self) -> Result<CommunityStats> {
        self.fetch(self.http.get(self.url("/community/stats")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://127.0.0.1:8050/");
        assert_eq!(client.url("/users/me"), "http://127.0.0.1:8050/users/me");
    }

    #[test]
    fn test_error_body_prefers_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": "bad credentials", "message": "legacy"}"#).unwrap();
        assert_eq!(
            body.detail.or(body.message).as_deref(),
            Some("bad credentials")
        );
    }

    #[test]
    fn test_error_body_falls_back_to_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": "nope"}"#).unwrap();
        assert_eq!(body.detail.or(body.message).as_deref(), Some("nope"));
    }
}
