//! The fixed OPP-115 privacy-practice taxonomy.
//!
//! Label order matches the output ordering of the multi-label classifier
//! checkpoints; index positions are load-bearing everywhere a score vector
//! appears. Thresholds and risk tiers are hand-tuned values carried over
//! from the deployed model configuration; do not re-derive them.

use serde::{Deserialize, Serialize};

/// Number of taxonomy categories.
pub const SIZE: usize = 12;

/// Taxonomy labels, ordered by classifier output index.
pub const LABELS: [&str; SIZE] = [
    "First Party Collection/Use",
    "Third Party Sharing/Collection",
    "User Choice/Control",
    "User Access, Edit & Deletion",
    "Data Retention",
    "Data Security",
    "Policy Change",
    "Do Not Track",
    "International & Specific Audiences",
    "Miscellaneous and Other",
    "Contact Information",
    "User Choices/Consent Mechanisms",
];

/// Per-category detection thresholds, tuned against class imbalance.
/// Rare-but-important categories (e.g. Do Not Track) sit lower.
pub const THRESHOLDS: [f32; SIZE] = [
    0.30, 0.35, 0.25, 0.40, 0.38, 0.40, 0.38, 0.25, 0.35, 0.30, 0.35, 0.40,
];

/// Fallback threshold for any index outside the table.
pub const DEFAULT_THRESHOLD: f32 = 0.40;

/// Risk tier assigned to a detected category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static risk tier per category index.
pub const RISK_TIERS: [RiskTier; SIZE] = [
    RiskTier::Medium, // First Party Collection/Use
    RiskTier::High,   // Third Party Sharing/Collection
    RiskTier::Medium, // User Choice/Control
    RiskTier::Low,    // User Access, Edit & Deletion
    RiskTier::High,   // Data Retention
    RiskTier::Low,    // Data Security
    RiskTier::Medium, // Policy Change
    RiskTier::High,   // Do Not Track
    RiskTier::Medium, // International & Specific Audiences
    RiskTier::Medium, // Miscellaneous and Other
    RiskTier::Low,    // Contact Information
    RiskTier::Low,    // User Choices/Consent Mechanisms
];

/// Label text for a category index.
pub fn label(index: usize) -> &'static str {
    LABELS[index]
}

/// Detection threshold for a category index (fallback for out-of-range).
pub fn threshold(index: usize) -> f32 {
    THRESHOLDS.get(index).copied().unwrap_or(DEFAULT_THRESHOLD)
}

/// Risk tier for a category index (medium for out-of-range).
pub fn risk_tier(index: usize) -> RiskTier {
    RISK_TIERS.get(index).copied().unwrap_or(RiskTier::Medium)
}

/// Risk tier for a label string, used when only the label survives.
pub fn risk_tier_for_label(name: &str) -> RiskTier {
    LABELS
        .iter()
        .position(|l| *l == name)
        .map(risk_tier)
        .unwrap_or(RiskTier::Medium)
}
