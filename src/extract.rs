//! Page content acquisition.
//!
//! The analysis workflow only sees the [`ContentExtractor`] trait, so the
//! host capability (a browser tab, a saved capture, a test fake) stays
//! swappable. Each failure mode carries its own actionable message.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::Read;
use std::path::PathBuf;

/// Minimum text length worth analyzing. Shorter content fails before any
/// network traffic.
pub const MIN_CONTENT_LEN: usize = 50;

/// Default truncation limit for extracted text, in characters. Revisions of
/// the backend accepted anywhere from 1000 to 5000; treat it as config.
pub const DEFAULT_CONTENT_LIMIT: usize = 2000;

/// What the host page gave us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub text: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
}

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn page_content(&self) -> Result<PageContent>;
}

/// Truncate on a char boundary, never mid-codepoint.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        text.chars().take(limit).collect()
    }
}

/// Host part of a URL, e.g. `https://example.com/a` → `example.com`.
pub fn domain_of(url: &str) -> Option<String> {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let host = rest.split(['/', '?', '#']).next()?.trim();
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Reads a saved page capture from a file (or stdin when no path is given).
/// The first non-empty line doubles as the title unless one is supplied.
pub struct CaptureExtractor {
    path: Option<PathBuf>,
    url: Option<String>,
    title: Option<String>,
    limit: usize,
}

impl CaptureExtractor {
    pub fn new(path: Option<PathBuf>, url: Option<String>, title: Option<String>) -> Self {
        Self {
            path,
            url,
            title,
            limit: DEFAULT_CONTENT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn read_raw(&self) -> Result<String> {
        match &self.path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(text) => Ok(text),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::Extraction(
                    format!("no page to analyze: capture not found at {}", path.display()),
                )),
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    Err(Error::Extraction(format!(
                        "access to page capture denied: {}",
                        path.display()
                    )))
                }
                Err(e) => Err(e.into()),
            },
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

#[async_trait]
impl ContentExtractor for CaptureExtractor {
    async fn page_content(&self) -> Result<PageContent> {
        let raw = self.read_raw()?;
        let text = raw.trim();
        let len = text.chars().count();
        if len < MIN_CONTENT_LEN {
            return Err(Error::Extraction(format!(
                "page text too short to analyze ({len} chars, need at least {MIN_CONTENT_LEN})"
            )));
        }

        let title = self.title.clone().or_else(|| {
            text.lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(|l| truncate_chars(l, 120))
        });
        let domain = self.url.as_deref().and_then(domain_of);

        Ok(PageContent {
            text: truncate_chars(text, self.limit),
            title,
            url: self.url.clone(),
            domain,
        })
    }
}
