use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::candidate::{ContactInfo, CvSection};
use super::scoring::SimilarityScore;

/// One concrete gap between the résumé and the posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub field: String,
    #[serde(default)]
    pub cv_value: String,
    #[serde(default)]
    pub job_expectation: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationReport {
    pub mismatches: Vec<Mismatch>,
    pub summary: String,
}

/// Rewritten résumé. `contact` is always the input's contact, never generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizedCandidate {
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub sections: Vec<CvSection>,
    #[serde(default, alias = "changes_summary")]
    pub changes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovedScore {
    pub before: SimilarityScore,
    pub after: SimilarityScore,
    /// `after.overall - before.overall`, rounded to four decimals.
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub improved_score: ImprovedScore,
    pub explanation: ExplanationReport,
    pub optimized: OptimizedCandidate,
    /// Empty when the narrative step failed.
    pub narrative: String,
}
