//! Profile sync and gamification notifications.
//!
//! After any action that can change server-side user state (a vote, the
//! daily login), the current user is re-fetched and diffed against the last
//! snapshot. Each newly earned badge, a false→true verification flip, and a
//! point increase produce exactly one transient notification.

use crate::api::Backend;
use crate::error::Result;
use crate::models::{UpdateProfileRequest, User};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a notification stays visible before it is silently dropped.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileChange {
    BadgeEarned(String),
    Verified,
    PointsGained(i64),
}

impl ProfileChange {
    pub fn message(&self) -> String {
        match self {
            ProfileChange::BadgeEarned(badge) => format!("New badge earned: {badge}"),
            ProfileChange::Verified => "Your account is now verified".to_string(),
            ProfileChange::PointsGained(delta) => format!("+{delta} points"),
        }
    }
}

/// Diff two profile snapshots into the notifications they warrant.
pub fn diff_users(old: &User, new: &User) -> Vec<ProfileChange> {
    let mut changes = Vec::new();

    let known: HashSet<&str> = old.badges.iter().map(String::as_str).collect();
    for badge in &new.badges {
        if !known.contains(badge.as_str()) {
            changes.push(ProfileChange::BadgeEarned(badge.clone()));
        }
    }
    if !old.is_verified && new.is_verified {
        changes.push(ProfileChange::Verified);
    }
    if new.points > old.points {
        changes.push(ProfileChange::PointsGained(new.points - old.points));
    }

    changes
}

/// Fire-and-forget notification queue. Entries expire after a fixed display
/// duration; nothing here ever blocks interaction.
pub struct NotificationCenter {
    queue: Vec<(String, Instant)>,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            queue: Vec::new(),
            ttl,
        }
    }

    pub fn push(&mut self, message: String) {
        self.queue.push((message, Instant::now()));
    }

    pub fn push_changes(&mut self, changes: &[ProfileChange]) {
        for change in changes {
            self.push(change.message());
        }
    }

    /// Messages still within their display window, removing them (displayed
    /// once = dismissed) along with anything already expired.
    pub fn drain_active(&mut self) -> Vec<String> {
        let ttl = self.ttl;
        self.queue
            .drain(..)
            .filter(|(_, posted)| posted.elapsed() <= ttl)
            .map(|(message, _)| message)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Holds the latest user snapshot; refreshes are last-write-wins, so a
/// vote-triggered refresh and a periodic one may race harmlessly.
pub struct ProfileSync {
    backend: Arc<dyn Backend>,
    last: Option<User>,
}

impl ProfileSync {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            last: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.last.as_ref()
    }

    /// Seed the snapshot without diffing (initial sign-in).
    pub fn prime(&mut self, user: User) {
        self.last = Some(user);
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Re-fetch the current user and report what changed since the last
    /// snapshot.
    pub async fn refresh(&mut self) -> Result<Vec<ProfileChange>> {
        let fresh = self.backend.me().await?;
        let changes = self
            .last
            .as_ref()
            .map(|old| diff_users(old, &fresh))
            .unwrap_or_default();
        self.last = Some(fresh);
        Ok(changes)
    }

    /// Update username and/or photo URL, replacing the snapshot.
    pub async fn update_profile(&mut self, request: &UpdateProfileRequest) -> Result<User> {
        let user = self.backend.update_me(request).await?;
        self.last = Some(user.clone());
        Ok(user)
    }

    /// Upload a profile photo, replacing the snapshot.
    pub async fn upload_photo(&mut self, filename: &str, bytes: Vec<u8>) -> Result<User> {
        let user = self.backend.upload_photo(filename, bytes).await?;
        self.last = Some(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_user, MockBackend};

    #[test]
    fn test_diff_reports_each_new_badge_once() {
        let old = sample_user("ada");
        let mut new = old.clone();
        new.badges.push("streak_7".to_string());
        new.badges.push("fact_finder".to_string());

        let changes = diff_users(&old, &new);
        assert_eq!(
            changes,
            vec![
                ProfileChange::BadgeEarned("streak_7".to_string()),
                ProfileChange::BadgeEarned("fact_finder".to_string()),
            ]
        );
    }

    #[test]
    fn test_diff_verification_edge_only_false_to_true() {
        let mut old = sample_user("ada");
        let mut new = old.clone();
        new.is_verified = true;
        assert_eq!(diff_users(&old, &new), vec![ProfileChange::Verified]);

        // Already verified: no notification.
        old.is_verified = true;
        assert!(diff_users(&old, &new).is_empty());
    }

    #[test]
    fn test_diff_points_increase_only() {
        let old = sample_user("ada");
        let mut new = old.clone();
        new.points += 25;
        assert_eq!(diff_users(&old, &new), vec![ProfileChange::PointsGained(25)]);

        new.points = old.points - 5;
        assert!(diff_users(&old, &new).is_empty());
    }

    #[test]
    fn test_diff_unchanged_user_is_quiet() {
        let user = sample_user("ada");
        assert!(diff_users(&user, &user.clone()).is_empty());
    }

    #[test]
    fn test_notification_center_drains_once() {
        let mut center = NotificationCenter::new();
        center.push("hello".to_string());
        assert_eq!(center.drain_active(), vec!["hello"]);
        assert!(center.drain_active().is_empty());
        assert!(center.is_empty());
    }

    #[test]
    fn test_notification_center_drops_expired() {
        let mut center = NotificationCenter::with_ttl(Duration::ZERO);
        center.push("too late".to_string());
        std::thread::sleep(Duration::from_millis(5));
        assert!(center.drain_active().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_diffs_against_snapshot() {
        let backend = Arc::new(MockBackend::new());
        let mut sync = ProfileSync::new(backend.clone());
        sync.prime(sample_user("ada"));

        let mut updated = sample_user("ada");
        updated.points += 10;
        updated.badges.push("first_analysis".to_string());
        backend.set_user(updated);

        let changes = sync.refresh().await.unwrap();
        assert_eq!(changes.len(), 2);
        assert!(changes.contains(&ProfileChange::PointsGained(10)));
        assert!(changes
            .iter()
            .any(|c| matches!(c, ProfileChange::BadgeEarned(b) if b == "first_analysis")));
        // Snapshot advanced: a second refresh is quiet.
        assert!(sync.refresh().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_without_snapshot_is_quiet() {
        let backend = Arc::new(MockBackend::new());
        let mut sync = ProfileSync::new(backend);
        assert!(sync.refresh().await.unwrap().is_empty());
        assert!(sync.user().is_some());
    }

    #[tokio::test]
    async fn test_update_profile_replaces_snapshot() {
        let backend = Arc::new(MockBackend::new());
        let mut sync = ProfileSync::new(backend);
        sync.prime(sample_user("ada"));

        let request = UpdateProfileRequest {
            username: Some("ada_l".to_string()),
            profile_photo: None,
        };
        let user = sync.update_profile(&request).await.unwrap();
        assert_eq!(user.username, "ada_l");
        assert_eq!(sync.user().unwrap().username, "ada_l");
    }
}
