//! Shared test fakes: a recording [`MockBackend`] plus sample-data builders.

use crate::api::Backend;
use crate::error::{Error, Result};
use crate::models::{
    AnalysisResponse, AnalyzeRequest, ArticleAggregates, CommunityStats, LoginRequest,
    LoginResponse, RegisterRequest, UpdateProfileRequest, User, VoteRecord, VoteRequest,
    VoteTotals,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub fn sample_user(username: &str) -> User {
    User {
        id: 7,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        points: 100,
        level: 2,
        reputation: 10,
        streak: 3,
        is_verified: false,
        badges: vec!["first_vote".to_string()],
        profile_photo: None,
    }
}

pub fn sample_analysis_response() -> AnalysisResponse {
    serde_json::from_value(serde_json::json!({
        "article_id": "art-1",
        "ai_score": 85,
        "community_score": 78,
        "final_score": 82,
        "details": [{"type": "positive", "text": "Recognized source"}],
        "votes": {"up": 12, "down": 3}
    }))
    .expect("static sample payload")
}

/// Records every call and serves scripted responses; unscripted endpoints
/// answer with sensible sample data.
#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<String>>,
    token: Mutex<Option<String>>,
    user: Mutex<Option<User>>,
    expired: AtomicBool,

    me_result: Mutex<Option<Result<User>>>,
    login_result: Mutex<Option<Result<LoginResponse>>>,
    register_result: Mutex<Option<Result<User>>>,
    analyze_result: Mutex<Option<Result<AnalysisResponse>>>,
    article_result: Mutex<Option<Result<ArticleAggregates>>>,
    article_votes_result: Mutex<Option<Result<VoteTotals>>>,
    vote_result: Mutex<Option<Result<()>>>,
    my_votes: Mutex<Vec<VoteRecord>>,

    analyze_requests: Mutex<Vec<AnalyzeRequest>>,
    vote_requests: Mutex<Vec<VoteRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            user: Mutex::new(Some(sample_user("ada"))),
            ..Self::default()
        }
    }

    // -- scripting --

    pub fn script_me(&self, result: Result<User>) {
        *self.me_result.lock().expect("lock") = Some(result);
    }

    pub fn script_login(&self, result: Result<LoginResponse>) {
        *self.login_result.lock().expect("lock") = Some(result);
    }

    pub fn script_register(&self, result: Result<User>) {
        *self.register_result.lock().expect("lock") = Some(result);
    }

    pub fn script_analyze(&self, result: Result<AnalysisResponse>) {
        *self.analyze_result.lock().expect("lock") = Some(result);
    }

    pub fn script_article(&self, result: Result<ArticleAggregates>) {
        *self.article_result.lock().expect("lock") = Some(result);
    }

    pub fn script_article_votes(&self, result: Result<VoteTotals>) {
        *self.article_votes_result.lock().expect("lock") = Some(result);
    }

    pub fn script_my_votes(&self, votes: Vec<VoteRecord>) {
        *self.my_votes.lock().expect("lock") = votes;
    }

    pub fn set_user(&self, user: User) {
        *self.user.lock().expect("lock") = Some(user);
    }

    pub fn fail_vote(&self, message: &str) {
        *self.vote_result.lock().expect("lock") = Some(Err(Error::Api {
            status: 500,
            detail: Some(message.to_string()),
        }));
    }

    /// Make every subsequent call answer 401.
    pub fn expire_session(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }

    // -- inspection --

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().expect("lock").clone()
    }

    pub fn analyze_requests(&self) -> Vec<AnalyzeRequest> {
        self.analyze_requests.lock().expect("lock").clone()
    }

    pub fn last_vote_request(&self) -> Option<VoteRequest> {
        self.vote_requests.lock().expect("lock").last().cloned()
    }

    // -- internals --

    fn record(&self, name: &str) -> Result<()> {
        self.calls.lock().expect("lock").push(name.to_string());
        if self.expired.load(Ordering::SeqCst) {
            Err(Error::AuthExpired)
        } else {
            Ok(())
        }
    }

    fn current_user(&self) -> User {
        self.user
            .lock()
            .expect("lock")
            .clone()
            .unwrap_or_else(|| sample_user("ada"))
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn set_token(&self, token: Option<String>) {
        *self.token.lock().expect("lock") = token;
    }

    async fn register(&self, req: &RegisterRequest) -> Result<User> {
        self.record("register")?;
        match self.register_result.lock().expect("lock").take() {
            Some(result) => result,
            None => {
                let mut user = sample_user(&req.username);
                user.email = req.email.clone();
                Ok(user)
            }
        }
    }

    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        self.record("login")?;
        match self.login_result.lock().expect("lock").take() {
            Some(result) => result,
            None => {
                let mut user = self.current_user();
                user.email = req.email.clone();
                Ok(LoginResponse {
                    access_token: "tok-mock".to_string(),
                    user: Some(user),
                })
            }
        }
    }

    async fn me(&self) -> Result<User> {
        self.record("me")?;
        match self.me_result.lock().expect("lock").take() {
            Some(result) => result,
            None => Ok(self.current_user()),
        }
    }

    async fn update_me(&self, req: &UpdateProfileRequest) -> Result<User> {
        self.record("update_me")?;
        let mut user = self.current_user();
        if let Some(username) = &req.username {
            user.username = username.clone();
        }
        if let Some(photo) = &req.profile_photo {
            user.profile_photo = Some(photo.clone());
        }
        *self.user.lock().expect("lock") = Some(user.clone());
        Ok(user)
    }

    async fn upload_photo(&self, filename: &str, _bytes: Vec<u8>) -> Result<User> {
        self.record("upload_photo")?;
        let mut user = self.current_user();
        user.profile_photo = Some(format!("/media/{filename}"));
        *self.user.lock().expect("lock") = Some(user.clone());
        Ok(user)
    }

    async fn daily_login(&self) -> Result<User> {
        self.record("daily_login")?;
        let mut user = self.current_user();
        user.streak += 1;
        *self.user.lock().expect("lock") = Some(user.clone());
        Ok(user)
    }

    async fn my_votes(&self) -> Result<Vec<VoteRecord>> {
        self.record("my_votes")?;
        Ok(self.my_votes.lock().expect("lock").clone())
    }

    async fn analyze(&self, req: &AnalyzeRequest) -> Result<AnalysisResponse> {
        self.record("analyze")?;
        self.analyze_requests
            .lock()
            .expect("lock")
            .push(req.clone());
        match self.analyze_result.lock().expect("lock").take() {
            Some(result) => result,
            None => Ok(sample_analysis_response()),
        }
    }

    async fn article(&self, _id: &str) -> Result<ArticleAggregates> {
        self.record("article")?;
        match self.article_result.lock().expect("lock").take() {
            Some(result) => result,
            None => Ok(ArticleAggregates::default()),
        }
    }

    async fn article_votes(&self, _id: &str) -> Result<VoteTotals> {
        self.record("article_votes")?;
        match self.article_votes_result.lock().expect("lock").take() {
            Some(result) => result,
            None => Ok(VoteTotals { up: 12, down: 3 }),
        }
    }

    async fn vote(&self, req: &VoteRequest) -> Result<()> {
        self.record("vote")?;
        self.vote_requests.lock().expect("lock").push(req.clone());
        match self.vote_result.lock().expect("lock").take() {
            Some(result) => result,
            None => Ok(()),
        }
    }

    async fn community_stats(&self) -> Result<CommunityStats> {
        self.record("community_stats")?;
        Ok(CommunityStats {
            total_users: 120,
            total_articles: 560,
            total_votes: 2300,
            average_score: Some(71.5),
        })
    }
}
