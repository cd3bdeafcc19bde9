//! Rule Validator — deterministic business-rule gate on a rewritten CV.
//!
//! Total function: every check runs and every violation is collected. The
//! orchestrator decides whether violations are fatal.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::models::{
    CvSection, OptimizedCandidate, SectionType, StructuredCandidate, ValidationReport,
};

/// Rewritten sections below this fraction of the original length are flagged.
const MIN_LENGTH_RATIO: f64 = 0.5;

pub fn validate(original: &StructuredCandidate, optimized: &OptimizedCandidate) -> ValidationReport {
    let mut violations = Vec::new();

    if optimized.contact.email.trim().is_empty() {
        violations.push("Contact email is missing.".to_string());
    }

    let has_core_section = optimized
        .sections
        .iter()
        .any(|s| matches!(s.section_type, SectionType::Experience | SectionType::Skills));
    if !has_core_section {
        violations.push("CV must contain at least one 'experience' or 'skills' section.".to_string());
    }

    for section in &optimized.sections {
        if section.is_blank() {
            violations.push(format!(
                "Section '{}' is empty after rewriting.",
                section.section_type
            ));
        }
    }

    // Compared by type, not position: the k-th rewritten section of a type
    // pairs with the k-th original of that type, extras with the last one.
    let mut seen: HashMap<SectionType, usize> = HashMap::new();
    for section in &optimized.sections {
        let index = seen.entry(section.section_type).or_insert(0);
        let originals: Vec<&CvSection> = original.sections_of(section.section_type).collect();
        let baseline = originals.get(*index).or(originals.last()).copied();
        *index += 1;

        let Some(original_section) = baseline else {
            continue;
        };
        let original_len = original_section.text.chars().count();
        if original_len == 0 {
            continue;
        }
        let optimized_len = section.text.chars().count();
        if (optimized_len as f64) < original_len as f64 * MIN_LENGTH_RATIO {
            violations.push(format!(
                "Section '{}' shrank by more than 50% ({} -> {} chars); possible content loss.",
                section.section_type, original_len, optimized_len
            ));
        }
    }

    let is_valid = violations.is_empty();
    if is_valid {
        info!("Validation passed");
    } else {
        warn!("Validation found {} violations", violations.len());
    }

    ValidationReport {
        is_valid,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::ContactInfo;
    use crate::optimization::fixtures;

    fn original_with(section_type: SectionType, len: usize) -> StructuredCandidate {
        StructuredCandidate {
            contact: ContactInfo {
                name: "Jane".into(),
                email: "jane@example.com".into(),
                ..Default::default()
            },
            sections: vec![CvSection::new(section_type, "a".repeat(len))],
            ..Default::default()
        }
    }

    fn optimized_from(
        original: &StructuredCandidate,
        sections: Vec<CvSection>,
    ) -> OptimizedCandidate {
        OptimizedCandidate {
            contact: original.contact.clone(),
            sections,
            changes: vec![],
        }
    }

    #[test]
    fn test_missing_email_is_violation() {
        let original = fixtures::candidate();
        let mut optimized = optimized_from(&original, original.sections.clone());
        optimized.contact.email = String::new();

        let report = validate(&original, &optimized);
        assert!(!report.is_valid);
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].contains("email"));
    }

    #[test]
    fn test_shrink_to_quarter_is_flagged() {
        let original = original_with(SectionType::Experience, 200);
        let optimized = optimized_from(
            &original,
            vec![CvSection::new(SectionType::Experience, "b".repeat(50))],
        );

        let report = validate(&original, &optimized);
        assert!(!report.is_valid);
        assert!(report.violations[0].contains("shrank"));
    }

    #[test]
    fn test_shrink_to_sixty_percent_is_allowed() {
        let original = original_with(SectionType::Experience, 200);
        let optimized = optimized_from(
            &original,
            vec![CvSection::new(SectionType::Experience, "b".repeat(120))],
        );

        let report = validate(&original, &optimized);
        assert!(report.is_valid, "{:?}", report.violations);
    }

    #[test]
    fn test_shrinkage_compares_by_type_not_position() {
        let mut original = original_with(SectionType::Summary, 20);
        original
            .sections
            .push(CvSection::new(SectionType::Experience, "a".repeat(200)));
        // Reordered: experience first. Each keeps its length.
        let optimized = optimized_from(
            &original,
            vec![
                CvSection::new(SectionType::Experience, "b".repeat(200)),
                CvSection::new(SectionType::Summary, "b".repeat(20)),
            ],
        );

        assert!(validate(&original, &optimized).is_valid);
    }

    #[test]
    fn test_all_violations_are_collected() {
        let original = original_with(SectionType::Summary, 100);
        let mut optimized =
            optimized_from(&original, vec![CvSection::new(SectionType::Summary, "  ")]);
        optimized.contact.email = String::new();

        let report = validate(&original, &optimized);
        // email, no core section, blank section, shrinkage
        assert_eq!(report.violations.len(), 4);
    }

    #[test]
    fn test_fixture_rewrite_is_valid() {
        let original = fixtures::candidate();
        let rewrite: OptimizedCandidate = serde_json::from_str(fixtures::REWRITE_JSON).unwrap();
        let optimized = optimized_from(&original, rewrite.sections);

        assert!(validate(&original, &optimized).is_valid);
    }

    #[test]
    fn test_repeated_section_types_pair_in_order() {
        let mut original = original_with(SectionType::Experience, 100);
        original.sections.extend([
            CvSection::new(SectionType::Other, "a".repeat(200)),
            CvSection::new(SectionType::Other, "a".repeat(40)),
        ]);
        let optimized = optimized_from(&original, original.sections.clone());

        let report = validate(&original, &optimized);
        assert!(report.is_valid, "{:?}", report.violations);
    }

    #[test]
    fn test_repeated_section_type_still_catches_shrinkage() {
        let mut original = original_with(SectionType::Experience, 100);
        original.sections.extend([
            CvSection::new(SectionType::Other, "a".repeat(40)),
            CvSection::new(SectionType::Other, "a".repeat(200)),
        ]);
        let optimized = optimized_from(
            &original,
            vec![
                CvSection::new(SectionType::Experience, "a".repeat(100)),
                CvSection::new(SectionType::Other, "b".repeat(40)),
                CvSection::new(SectionType::Other, "b".repeat(60)),
            ],
        );

        let report = validate(&original, &optimized);
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].contains("200 -> 60"));
    }

    #[test]
    fn test_extra_rewritten_sections_use_last_original() {
        let mut original = original_with(SectionType::Experience, 100);
        original
            .sections
            .push(CvSection::new(SectionType::Other, "a".repeat(80)));
        let optimized = optimized_from(
            &original,
            vec![
                CvSection::new(SectionType::Experience, "a".repeat(100)),
                CvSection::new(SectionType::Other, "b".repeat(80)),
                CvSection::new(SectionType::Other, "b".repeat(30)),
            ],
        );

        let report = validate(&original, &optimized);
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].contains("80 -> 30"));
    }

    #[test]
    fn test_new_section_type_has_no_shrink_baseline() {
        let original = original_with(SectionType::Experience, 40);
        let optimized = optimized_from(
            &original,
            vec![
                CvSection::new(SectionType::Experience, "a".repeat(40)),
                CvSection::new(SectionType::Projects, "x"),
            ],
        );
        assert!(validate(&original, &optimized).is_valid);
    }
}
