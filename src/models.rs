//! Wire models for the FactFlow backend plus persisted user settings.
//!
//! The backend's payloads drifted across revisions (`score` vs `ai_score`,
//! `final_score` vs `combined_score`, explanation as a string vs a list of
//! typed items, article ids as strings or numbers), so deserialization here
//! is deliberately tolerant. Normalization to a single internal shape happens
//! in [`crate::workflow::Analysis`].

use serde::{Deserialize, Serialize};

/// Accept a string or a number where the backend is inconsistent.
pub(crate) mod flex {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => Some(other.to_string()),
        })
    }
}

/// Current-user profile as served by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub reputation: i64,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
}

/// `POST /users/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

/// `POST /analyze` request body.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// One explanation line, typed for display (`positive`, `warning`, `negative`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplanationItem {
    #[serde(default, rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ExplanationItem {
    pub fn icon(&self) -> &'static str {
        match self.kind.as_str() {
            "positive" => "✓",
            "warning" => "⚠",
            "negative" => "✗",
            _ => "•",
        }
    }
}

/// Explanation payload: older revisions send a plain string, newer ones a
/// list of typed items.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Explanation {
    Text(String),
    Items(Vec<ExplanationItem>),
}

impl Default for Explanation {
    fn default() -> Self {
        Explanation::Items(Vec::new())
    }
}

impl Explanation {
    /// Flatten to displayable items; a bare string becomes one untyped item.
    pub fn into_items(self) -> Vec<ExplanationItem> {
        match self {
            Explanation::Items(items) => items,
            Explanation::Text(text) if text.is_empty() => Vec::new(),
            Explanation::Text(text) => vec![ExplanationItem {
                kind: String::new(),
                text,
            }],
        }
    }
}

/// Up/down tallies for an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTotals {
    #[serde(default)]
    pub up: i64,
    #[serde(default)]
    pub down: i64,
}

/// `POST /analyze` response, absorbing both payload generations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default, deserialize_with = "flex::opt_string")]
    pub article_id: Option<String>,
    #[serde(default, alias = "score")]
    pub ai_score: Option<f64>,
    #[serde(default)]
    pub community_score: Option<f64>,
    #[serde(default, alias = "combined_score")]
    pub final_score: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default, alias = "details")]
    pub explanation: Explanation,
    #[serde(default)]
    pub votes: Option<VoteTotals>,
}

/// `GET /article/{id}` supplementary aggregates. When present, these scores
/// win over the ones in the analyze response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleAggregates {
    #[serde(default, alias = "score")]
    pub ai_score: Option<f64>,
    #[serde(default)]
    pub community_score: Option<f64>,
    #[serde(default, alias = "final_score")]
    pub combined_score: Option<f64>,
    #[serde(default)]
    pub votes: Option<VoteTotals>,
}

/// One entry of `GET /users/me/votes`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteRecord {
    #[serde(default, deserialize_with = "flex::opt_string")]
    pub article_id: Option<String>,
    /// 1 = up, 0 = down, matching the wire encoding of `POST /vote`.
    pub vote: u8,
}

/// `POST /vote` request body.
#[derive(Debug, Clone, Serialize)]
pub struct VoteRequest {
    pub user_id: i64,
    pub article_id: String,
    pub vote: u8,
}

/// `GET /community/stats` aggregates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommunityStats {
    #[serde(default)]
    pub total_users: i64,
    #[serde(default)]
    pub total_articles: i64,
    #[serde(default)]
    pub total_votes: i64,
    #[serde(default)]
    pub average_score: Option<f64>,
}

/// Persisted user preferences, independent of the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auto_analyze: bool,
    pub show_notifications: bool,
    /// Alert threshold in percent. Only affects notification behavior, never
    /// the fixed display banding.
    pub threshold: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_analyze: true,
            show_notifications: false,
            threshold: 70,
        }
    }
}

impl Settings {
    pub fn set_threshold(&mut self, value: u8) {
        self.threshold = value.min(100);
    }
}
