//! Shared test fixtures: a realistic CV/job pair and scripted model replies.

use crate::models::{StructuredCandidate, StructuredPosting};

pub const CV_TEXT: &str = r#"Jane Doe
jane@example.com | +44 7700 900123 | London

Summary
Backend engineer with 6 years of experience building payment systems in Rust and Go.

Experience
Acme Payments, Senior Engineer, 2019-2024. Built a high-throughput ledger service in Rust handling 5k requests per second. Led migration from a monolith to event-driven services on Kafka.

Skills
Rust, Go, PostgreSQL, Kafka, Docker, Kubernetes, team leadership

Education
BSc Computer Science, University of Leeds, 2017"#;

pub const JOB_TEXT: &str = r#"Senior Backend Engineer - Fintech Platform (Full-time)
We are looking for a backend engineer to design and operate our payments ledger.
Required: 5+ years backend experience, Rust, PostgreSQL, Kafka.
Nice to have: Terraform, AWS.
You will own services end to end and mentor engineers. English required."#;

pub const CANDIDATE_JSON: &str = r#"{
  "contact": {
    "name": "Jane Doe",
    "email": "jane@example.com",
    "phone": "+44 7700 900123",
    "location": "London",
    "links": []
  },
  "sections": [
    {"section_type": "summary", "text": "Backend engineer with 6 years of experience building payment systems in Rust and Go.", "items": []},
    {"section_type": "experience", "text": "Acme Payments, Senior Engineer, 2019-2024. Built a high-throughput ledger service in Rust handling 5k requests per second. Led migration from a monolith to event-driven services on Kafka.", "items": []},
    {"section_type": "skills", "text": "Rust, Go, PostgreSQL, Kafka, Docker, Kubernetes, team leadership", "items": ["Rust", "Go", "PostgreSQL", "Kafka"]},
    {"section_type": "education", "text": "BSc Computer Science, University of Leeds, 2017", "items": []}
  ],
  "language": "en",
  "hard_skills": ["Rust", "Go", "PostgreSQL", "Kafka"],
  "soft_skills": ["team leadership"],
  "tools": ["Docker", "Kubernetes"],
  "languages_spoken": ["English"],
  "total_years_experience": 6,
  "education_level": "Bachelor",
  "certifications": []
}"#;

pub const POSTING_JSON: &str = r#"{
  "title": "Senior Backend Engineer",
  "company": "",
  "employment_type": "full_time",
  "required_skills": [
    {"skill": "Rust", "required": true},
    {"skill": "PostgreSQL", "required": true},
    {"skill": "Kafka", "required": true},
    {"skill": "Terraform", "required": false}
  ],
  "responsibilities": ["Design and operate the payments ledger", "Mentor engineers"],
  "qualifications": ["5+ years backend experience"],
  "hard_skills": ["Rust", "PostgreSQL", "Kafka"],
  "soft_skills": ["mentoring"],
  "tools": ["Terraform", "AWS"],
  "languages_required": ["English"],
  "min_years_experience": 5,
  "education_level": "",
  "preferred_certifications": [],
  "methodologies": [],
  "domain": "fintech",
  "language": "en"
}"#;

/// Sub-scores 0.8 / 0.7 / 1.0 / 1.0, overall 0.83 once weighted.
pub const ANALYSIS_JSON: &str = r#"{
  "skills_match_score": 0.8,
  "experience_match_score": 0.7,
  "education_match_score": 1.0,
  "languages_match_score": 1.0,
  "overall_llm_score": 0.99,
  "skill_details": [
    {"skill": "Rust", "found_in_cv": true, "cv_evidence": "ledger service in Rust"},
    {"skill": "Terraform", "found_in_cv": false, "cv_evidence": ""}
  ],
  "strengths": ["Production Rust payments experience"],
  "gaps": ["No infrastructure-as-code experience"],
  "reasoning": "Strong backend fit with a tooling gap."
}"#;

pub const EXPLANATION_JSON: &str = r#"{
  "mismatches": [
    {
      "field": "skills",
      "cv_value": "No Terraform listed",
      "job_expectation": "Terraform experience is a plus",
      "explanation": "Infrastructure-as-code is not mentioned anywhere in the CV."
    },
    {
      "field": "experience",
      "cv_value": "Ledger work described briefly",
      "job_expectation": "Own services end to end",
      "explanation": "Ownership of the ledger service is implied but not stated."
    }
  ],
  "summary": "Good technical fit; make ownership and Kafka work more visible."
}"#;

pub const REWRITE_JSON: &str = r#"{
  "sections": [
    {"section_type": "summary", "text": "Backend engineer with 6 years of experience building high-throughput payment systems in Rust and Go, focused on reliable distributed services.", "items": []},
    {"section_type": "experience", "text": "Acme Payments, Senior Engineer, 2019-2024. Designed and owned a high-throughput ledger service in Rust handling 5k requests per second. Led the migration from a monolith to event-driven services on Kafka.", "items": []},
    {"section_type": "skills", "text": "Rust, Kafka, PostgreSQL, Go, Docker, Kubernetes, team leadership", "items": ["Rust", "Kafka", "PostgreSQL", "Go"]},
    {"section_type": "education", "text": "BSc Computer Science, University of Leeds, 2017", "items": []}
  ],
  "changes": [
    "Emphasised ownership of the ledger service",
    "Moved Kafka next to Rust in the skills list"
  ]
}"#;

/// Experience section cut to a fraction of the original.
pub const SHRUNK_REWRITE_JSON: &str = r#"{
  "sections": [
    {"section_type": "experience", "text": "Senior Engineer at Acme.", "items": []},
    {"section_type": "skills", "text": "Rust, Kafka, PostgreSQL, Go, Docker, Kubernetes, team leadership", "items": []}
  ],
  "changes": ["Condensed experience"]
}"#;

pub const NARRATIVE_TEXT: &str =
    "Your CV now foregrounds ownership of the Rust ledger and Kafka migration. \
    Terraform remains a gap worth addressing.";

pub fn candidate() -> StructuredCandidate {
    let mut candidate: StructuredCandidate =
        serde_json::from_str(CANDIDATE_JSON).expect("candidate fixture");
    candidate.raw_text = CV_TEXT.to_string();
    candidate
}

pub fn posting() -> StructuredPosting {
    let mut posting: StructuredPosting =
        serde_json::from_str(POSTING_JSON).expect("posting fixture");
    posting.raw_text = JOB_TEXT.to_string();
    posting
}
