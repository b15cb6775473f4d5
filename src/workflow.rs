//! The analysis workflow: idle → loading → results | error.
//!
//! Sequencing within one cycle is strict: page content is acquired and
//! length-gated before anything touches the network, the analyze call
//! completes before the supplementary fetches go out, and the two
//! supplementary fetches (article aggregates, vote tallies) are independent
//! of each other. Starting a new analysis while one is loading is a no-op.

use crate::api::Backend;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::{ContentExtractor, MIN_CONTENT_LEN};
use crate::models::{
    AnalysisResponse, AnalyzeRequest, ArticleAggregates, Explanation, ExplanationItem,
    VoteTotals,
};
use crate::score::{normalize_score, Band};
use crate::vote::VotePanel;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::Rng;
use std::time::Duration;

/// Perceived-progress labels shown while loading. Feedback only; the backend
/// sends no real progress signal.
pub const PROGRESS_STEPS: &[&str] = &[
    "Extracting page content",
    "Running AI analysis",
    "Gathering community signal",
    "Combining scores",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Results,
    Error(String),
}

/// Whether `start_analysis` actually ran or hit the re-entrancy guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Completed,
    AlreadyRunning,
}

/// Normalized analysis result: every score an integer percent.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub article_id: Option<String>,
    pub ai_score: u8,
    pub community_score: u8,
    pub combined_score: u8,
    pub band: Band,
    pub title: String,
    pub subtitle: String,
    pub explanation: Vec<ExplanationItem>,
    pub votes: VoteTotals,
}

impl Analysis {
    pub fn from_response(resp: AnalysisResponse, url: Option<&str>) -> Self {
        // The combined score falls back to the AI score for legacy payloads
        // that only carried `score`.
        let combined = resp
            .final_score
            .or(resp.ai_score)
            .map(normalize_score)
            .unwrap_or(0);
        Self {
            article_id: resp
                .article_id
                .or_else(|| url.map(derive_article_id)),
            ai_score: resp.ai_score.map(normalize_score).unwrap_or(0),
            community_score: resp.community_score.map(normalize_score).unwrap_or(0),
            combined_score: combined,
            band: Band::for_score(combined),
            title: resp.title.unwrap_or_else(|| "Article analyzed".to_string()),
            subtitle: resp
                .subtitle
                .unwrap_or_else(|| "Analysis complete".to_string()),
            explanation: resp.explanation.into_items(),
            votes: resp.votes.unwrap_or_default(),
        }
    }

    /// Aggregate scores win over the ones from the analyze response.
    fn merge_aggregates(&mut self, agg: ArticleAggregates) {
        if let Some(v) = agg.ai_score {
            self.ai_score = normalize_score(v);
        }
        if let Some(v) = agg.community_score {
            self.community_score = normalize_score(v);
        }
        if let Some(v) = agg.combined_score {
            self.combined_score = normalize_score(v);
        }
        if let Some(totals) = agg.votes {
            self.votes = totals;
        }
        self.band = Band::for_score(self.combined_score);
    }
}

/// Stable article identifier derived from the URL when the backend does not
/// assign one.
pub fn derive_article_id(url: impl AsRef<str>) -> String {
    BASE64.encode(url.as_ref()).chars().take(10).collect()
}

/// Canned result substituted when the backend is unreachable and the
/// `mock_fallback` config flag is on.
fn mock_response() -> AnalysisResponse {
    AnalysisResponse {
        article_id: None,
        ai_score: Some(85.0),
        community_score: Some(78.0),
        final_score: Some(82.0),
        status: Some("reliable".to_string()),
        title: Some("Article analyzed".to_string()),
        subtitle: Some("Reliable source detected".to_string()),
        explanation: Explanation::Items(vec![
            ExplanationItem {
                kind: "positive".to_string(),
                text: "Recognized source".to_string(),
            },
            ExplanationItem {
                kind: "positive".to_string(),
                text: "Verifiable information".to_string(),
            },
            ExplanationItem {
                kind: "warning".to_string(),
                text: "Catchy headline".to_string(),
            },
        ]),
        votes: Some(VoteTotals { up: 12, down: 3 }),
    }
}

pub struct AnalysisWorkflow {
    phase: Phase,
    current: Option<Analysis>,
    pub panel: VotePanel,
    step_delay_ms: u64,
    step_jitter_ms: u64,
    mock_fallback: bool,
}

impl AnalysisWorkflow {
    pub fn new(config: &Config) -> Self {
        Self {
            phase: Phase::Idle,
            current: None,
            panel: VotePanel::default(),
            step_delay_ms: config.step_delay_ms,
            step_jitter_ms: config.step_jitter_ms,
            mock_fallback: config.mock_fallback,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn current(&self) -> Option<&Analysis> {
        self.current.as_ref()
    }

    /// Back to idle, discarding the current result and vote state.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.current = None;
        self.panel = VotePanel::default();
    }

    /// Clear an error state after the message has been shown.
    pub fn acknowledge_error(&mut self) {
        if matches!(self.phase, Phase::Error(_)) {
            self.phase = Phase::Idle;
        }
    }

    #[cfg(test)]
    pub fn force_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Run one analysis cycle. `progress` is invoked once per perceived
    /// progress step while loading.
    pub async fn start_analysis(
        &mut self,
        extractor: &dyn ContentExtractor,
        backend: &dyn Backend,
        progress: &mut dyn FnMut(&str),
    ) -> Result<StartOutcome> {
        if self.phase == Phase::Loading {
            return Ok(StartOutcome::AlreadyRunning);
        }
        self.phase = Phase::Loading;

        match self.run(extractor, backend, progress).await {
            Ok(analysis) => {
                self.panel = VotePanel::new(analysis.votes);
                self.current = Some(analysis);
                self.phase = Phase::Results;
                Ok(StartOutcome::Completed)
            }
            Err(e) => {
                self.phase = Phase::Error(e.to_string());
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        extractor: &dyn ContentExtractor,
        backend: &dyn Backend,
        progress: &mut dyn FnMut(&str),
    ) -> Result<Analysis> {
        let page = extractor.page_content().await?;

        // Fail fast before any network traffic.
        let len = page.text.chars().count();
        if len < MIN_CONTENT_LEN {
            return Err(Error::Extraction(format!(
                "page text too short to analyze ({len} chars, need at least {MIN_CONTENT_LEN})"
            )));
        }

        for step in PROGRESS_STEPS {
            progress(step);
            self.step_pause().await;
        }

        let request = AnalyzeRequest {
            text: page.text,
            title: page.title,
            url: page.url.clone(),
            domain: page.domain,
        };
        let response = match backend.analyze(&request).await {
            Ok(response) => response,
            Err(e) if e.is_transport() && self.mock_fallback => {
                eprintln!("[factflow] backend unreachable ({e}), using canned result");
                mock_response()
            }
            Err(Error::Api { status, .. }) => return Err(Error::Analysis { status }),
            Err(e) => return Err(e),
        };

        let mut analysis = Analysis::from_response(response, page.url.as_deref());

        // Supplementary fetches are independent of each other and best-effort:
        // a failure leaves the primary result standing.
        if let Some(id) = analysis.article_id.clone() {
            let (aggregates, tallies) =
                tokio::join!(backend.article(&id), backend.article_votes(&id));
            match aggregates {
                Ok(agg) => analysis.merge_aggregates(agg),
                Err(Error::AuthExpired) => return Err(Error::AuthExpired),
                Err(e) => eprintln!("[factflow] article aggregates unavailable: {e}"),
            }
            match tallies {
                Ok(totals) => analysis.votes = totals,
                Err(Error::AuthExpired) => return Err(Error::AuthExpired),
                Err(e) => eprintln!("[factflow] vote tallies unavailable: {e}"),
            }
        }

        Ok(analysis)
    }

    async fn step_pause(&self) {
        let jitter = if self.step_jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.step_jitter_ms)
        } else {
            0
        };
        let total = self.step_delay_ms + jitter;
        if total > 0 {
            tokio::time::sleep(Duration::from_millis(total)).await;
        }
    }
}
