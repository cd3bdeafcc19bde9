use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of résumé section tags. Anything else folds to `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SectionType {
    Summary,
    Experience,
    Education,
    Skills,
    Certifications,
    Projects,
    Languages,
    #[default]
    Other,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Summary => "summary",
            SectionType::Experience => "experience",
            SectionType::Education => "education",
            SectionType::Skills => "skills",
            SectionType::Certifications => "certifications",
            SectionType::Projects => "projects",
            SectionType::Languages => "languages",
            SectionType::Other => "other",
        }
    }
}

impl From<String> for SectionType {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "summary" => SectionType::Summary,
            "experience" => SectionType::Experience,
            "education" => SectionType::Education,
            "skills" => SectionType::Skills,
            "certifications" => SectionType::Certifications,
            "projects" => SectionType::Projects,
            "languages" => SectionType::Languages,
            _ => SectionType::Other,
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    /// Profile URLs (LinkedIn, GitHub, portfolio).
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvSection {
    #[serde(default)]
    pub section_type: SectionType,
    #[serde(alias = "raw_text")]
    pub text: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl CvSection {
    #[cfg(test)]
    pub fn new(section_type: SectionType, text: impl Into<String>) -> Self {
        Self {
            section_type,
            text: text.into(),
            items: Vec::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Structured, enriched résumé produced by the CV parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredCandidate {
    pub contact: ContactInfo,
    pub sections: Vec<CvSection>,
    /// Detected language code of the résumé ("en", "fr", ...).
    pub language: String,
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub tools: Vec<String>,
    pub languages_spoken: Vec<String>,
    pub total_years_experience: Option<f64>,
    pub education_level: String,
    pub certifications: Vec<String>,
    pub raw_text: String,
}

impl StructuredCandidate {
    /// Schema checks applied to generated records.
    pub fn validate(&self) -> Result<(), String> {
        if self.contact.name.trim().is_empty() {
            return Err("contact.name must not be empty".into());
        }
        if let Some(idx) = self.sections.iter().position(CvSection::is_blank) {
            return Err(format!("sections[{idx}] has empty text"));
        }
        if matches!(self.total_years_experience, Some(y) if !y.is_finite() || y < 0.0) {
            return Err("total_years_experience must be a non-negative number".into());
        }
        Ok(())
    }

    /// Hard skills, soft skills and tools joined into one blob.
    pub fn skills_text(&self) -> String {
        join_non_empty(
            self.hard_skills
                .iter()
                .chain(&self.soft_skills)
                .chain(&self.tools),
        )
    }

    /// Sections of one type, in document order.
    pub fn sections_of(&self, section_type: SectionType) -> impl Iterator<Item = &CvSection> {
        self.sections
            .iter()
            .filter(move |s| s.section_type == section_type)
    }
}

pub(crate) fn join_non_empty<'a>(parts: impl IntoIterator<Item = &'a String>) -> String {
    parts
        .into_iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
