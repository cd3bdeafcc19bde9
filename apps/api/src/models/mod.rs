pub mod candidate;
pub mod posting;
pub mod report;
pub mod scoring;

pub use candidate::{CvSection, SectionType, StructuredCandidate};
pub use posting::StructuredPosting;
pub use report::{
    ComparisonReport, ExplanationReport, ImprovedScore, OptimizedCandidate, ValidationReport,
};
pub use scoring::{MatchAnalysis, SectionScore, SimilarityScore};
