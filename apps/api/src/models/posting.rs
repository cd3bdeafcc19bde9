use serde::{Deserialize, Serialize};

use super::candidate::join_non_empty;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
    #[default]
    Unknown,
}

impl From<String> for EmploymentType {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "full_time" => EmploymentType::FullTime,
            "part_time" => EmploymentType::PartTime,
            "contract" => EmploymentType::Contract,
            "freelance" => EmploymentType::Freelance,
            "internship" => EmploymentType::Internship,
            _ => EmploymentType::Unknown,
        }
    }
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredSkill {
    pub skill: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

/// Normalised job posting produced by the job normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredPosting {
    pub title: String,
    pub company: String,
    pub employment_type: EmploymentType,
    pub required_skills: Vec<RequiredSkill>,
    pub responsibilities: Vec<String>,
    pub qualifications: Vec<String>,
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub tools: Vec<String>,
    pub languages_required: Vec<String>,
    pub min_years_experience: Option<f64>,
    pub education_level: String,
    pub preferred_certifications: Vec<String>,
    pub methodologies: Vec<String>,
    /// Industry or business domain ("fintech", "healthcare", ...).
    pub domain: String,
    pub language: String,
    pub raw_text: String,
}

impl StructuredPosting {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if let Some(idx) = self
            .required_skills
            .iter()
            .position(|s| s.skill.trim().is_empty())
        {
            return Err(format!("required_skills[{idx}].skill must not be empty"));
        }
        if matches!(self.min_years_experience, Some(y) if !y.is_finite() || y < 0.0) {
            return Err("min_years_experience must be a non-negative number".into());
        }
        Ok(())
    }

    /// Text embedded for the job side of the deterministic matcher: title,
    /// required skill names, categorized skills, responsibilities,
    /// methodologies and domain, in that order.
    pub fn embedding_text(&self) -> String {
        let skill_names: Vec<String> = self
            .required_skills
            .iter()
            .map(|s| s.skill.clone())
            .collect();

        join_non_empty(
            std::iter::once(&self.title)
                .chain(&skill_names)
                .chain(&self.hard_skills)
                .chain(&self.soft_skills)
                .chain(&self.tools)
                .chain(&self.responsibilities)
                .chain(&self.methodologies)
                .chain(std::iter::once(&self.domain)),
        )
    }

    pub fn skills_text(&self) -> String {
        join_non_empty(
            self.hard_skills
                .iter()
                .chain(&self.soft_skills)
                .chain(&self.tools),
        )
    }
}
