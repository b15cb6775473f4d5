//! Score normalization and reliability banding.
//!
//! Backend revisions disagree on whether scores are 0–1 fractions or 0–100
//! percentages. Everything internal is an integer percent; banding uses the
//! fixed 70/40 cutoffs regardless of the user's configurable alert threshold.

/// Band cutoffs. Design constants, not user settings.
pub const HIGH_CUTOFF: u8 = 70;
pub const MODERATE_CUTOFF: u8 = 40;

/// Normalize a raw backend score into an integer percent.
///
/// Values at or below 1.0 are treated as fractions (so a literal `1` means
/// 100%, not 1%); anything larger is already a percentage. The result is
/// rounded and clamped to 0–100.
pub fn normalize_score(raw: f64) -> u8 {
    let percent = if raw <= 1.0 { raw * 100.0 } else { raw };
    percent.round().clamp(0.0, 100.0) as u8
}

/// Reliability band shown next to a combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    High,
    Moderate,
    Low,
}

impl Band {
    pub fn for_score(percent: u8) -> Self {
        if percent >= HIGH_CUTOFF {
            Band::High
        } else if percent >= MODERATE_CUTOFF {
            Band::Moderate
        } else {
            Band::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::High => "Verified",
            Band::Moderate => "Under Review",
            Band::Low => "Unverified",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Band::High => "✓",
            Band::Moderate => "?",
            Band::Low => "✕",
        }
    }

    /// One-line advisory shown with the badge.
    pub fn advisory(self) -> &'static str {
        match self {
            Band::High => "This information has been fact-checked and verified.",
            Band::Moderate => "This information is currently under review.",
            Band::Low => "This information has not been verified. Use caution.",
        }
    }
}
