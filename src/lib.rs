//! FactFlow - a trustworthiness client for news articles.
//!
//! Talks to a remote FactFlow backend to score page captures with a blend
//! of AI analysis and community votes, and tracks the signed-in user's
//! votes, points, and badges.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod profile;
pub mod score;
pub mod store;
pub mod vote;
pub mod workflow;

#[cfg(test)]
pub mod test_utils;

pub use cli::Args;
pub use error::{Error, Result};
