// Prompt constants for every generative pipeline stage.
// Cross-cutting fragments live in llm_client::prompts.

/// System prompt for CV parsing.
pub const CV_PARSE_SYSTEM: &str =
    "You are a CV parsing engine. Extract structured data from résumé text in any language. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// CV parsing prompt template. Replace `{cv_text}` before sending.
pub const CV_PARSE_PROMPT_TEMPLATE: &str = r#"Extract structured data from the CV below.

Return a JSON object with this EXACT schema:
{
  "contact": {
    "name": "string",
    "email": "string",
    "phone": "string",
    "location": "string",
    "links": ["string"]
  },
  "sections": [
    {
      "section_type": "summary|experience|education|skills|certifications|projects|languages|other",
      "text": "string",
      "items": ["string"]
    }
  ],
  "language": "ISO 639-1 code of the CV, e.g. en or fr",
  "hard_skills": ["string"],
  "soft_skills": ["string"],
  "tools": ["string"],
  "languages_spoken": ["string"],
  "total_years_experience": 0.0,
  "education_level": "string",
  "certifications": ["string"]
}

Rules:
- If a field is not found, use an empty string, an empty list, or null for numbers.
- section_type must be one of the listed values.
- Keep section text verbatim; do not summarise.
- total_years_experience is the sum of professional experience in years.

{no_fabrication}

CV:
{cv_text}"#;

/// System prompt for job normalization.
pub const JOB_NORMALIZE_SYSTEM: &str =
    "You are a job description normalisation engine. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Job normalization prompt template. Replace `{job_text}` before sending.
pub const JOB_NORMALIZE_PROMPT_TEMPLATE: &str = r#"Normalise the job description below.

Return a JSON object with this EXACT schema:
{
  "title": "string",
  "company": "string",
  "employment_type": "full_time|part_time|contract|freelance|internship|unknown",
  "required_skills": [{"skill": "string", "required": true}],
  "responsibilities": ["string"],
  "qualifications": ["string"],
  "hard_skills": ["string"],
  "soft_skills": ["string"],
  "tools": ["string"],
  "languages_required": ["string"],
  "min_years_experience": 0.0,
  "education_level": "string",
  "preferred_certifications": ["string"],
  "methodologies": ["string"],
  "domain": "string",
  "language": "ISO 639-1 code of the posting"
}

Rules:
- required=false for nice-to-have skills ("preferred", "a plus", "bonus").
- Technical skills go to hard_skills, interpersonal ones to soft_skills, named software to tools.
- min_years_experience is null when the posting does not state one.

Job description:
{job_text}"#;

/// System prompt for the generative match analyzer.
pub const MATCH_ANALYSIS_SYSTEM: &str = r#"role: cv_job_match_analyzer
description: |
  You are a bilingual (FR/EN) recruitment matching engine.
  Given a STRUCTURED CV and a STRUCTURED JOB (both JSON), compare them field by field.

analysis_dimensions:
  skills_match:
    - Compare CV hard_skills + soft_skills + tools against the job's.
    - Accept synonyms and near-matches ("MS Excel" = "Excel", "Gestion de projet" = "Project Management").
    - Score = coverage of the job's skills.
  experience_match:
    - Compare CV total_years_experience with job min_years_experience, and the relevance of the roles.
    - 1.0 if met or exceeded, proportionally less if under.
  education_match:
    - Compare CV education_level with job education_level. A PhD satisfies a Master requirement.
    - 1.0 if met, 0.5 if close, 0.0 if far below.
  languages_match:
    - Compare CV languages_spoken with job languages_required ("Français" = "French").
  skill_details:
    - One entry per job skill: {"skill": "...", "found_in_cv": true, "cv_evidence": "short quote or note"}
  strengths: 3-5 points, in the language of the job posting.
  gaps: 3-5 points, in the language of the job posting.
  reasoning: 2-4 sentences, in the language of the job posting.

output_format: |
  {
    "skills_match_score": 0.0,
    "experience_match_score": 0.0,
    "education_match_score": 0.0,
    "languages_match_score": 0.0,
    "skill_details": [{"skill": "...", "found_in_cv": true, "cv_evidence": "..."}],
    "strengths": ["..."],
    "gaps": ["..."],
    "reasoning": "..."
  }

critical_rules:
  - Every score is a float between 0.0 and 1.0.
  - Return ONLY the JSON object. No markdown. No text outside the JSON.
  - The JSON must be complete."#;

/// System prompt for the gap explainer.
pub const EXPLAIN_SYSTEM: &str =
    "You are a career coach analysing a CV against a job description. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Explainer prompt template. Replace `{context}` before sending.
pub const EXPLAIN_PROMPT_TEMPLATE: &str = r#"Explain the mismatches between this CV and job.

{context}

Return a JSON object with this EXACT schema:
{
  "mismatches": [
    {
      "field": "skills|experience|education|languages|certifications|...",
      "cv_value": "what the CV currently shows",
      "job_expectation": "what the job requires",
      "explanation": "why this is a gap and what would close it"
    }
  ],
  "summary": "1-2 sentence overall assessment"
}

Be concise. Focus on actionable gaps."#;

/// Context block for the explainer. Every `{placeholder}` is filled by
/// `explainer::build_context`.
pub const EXPLAIN_CONTEXT_TEMPLATE: &str = "JOB
Title: {job_title}
Required skills: {job_required}
Hard skills: {job_hard}
Soft skills: {job_soft}
Tools: {job_tools}
Minimum years: {job_years}
Education: {job_education}
Languages required: {job_languages}

CV
Name: {cv_name}
Hard skills: {cv_hard}
Soft skills: {cv_soft}
Tools: {cv_tools}
Years of experience: {cv_years}
Education: {cv_education}
Languages spoken: {cv_languages}
Sections:
{cv_sections}

SCORES
Overall similarity: {overall}
{section_scores}{analysis}";

/// Appended to the explainer context when the match analyzer ran.
pub const EXPLAIN_ANALYSIS_TEMPLATE: &str = "

MATCH ANALYSIS
Skills {skills}, experience {experience}, education {education}, languages {languages}
{skill_details}
Strengths: {strengths}
Gaps: {gaps}
Reasoning: {reasoning}";

/// System prompt for the constrained rewriter.
pub const REWRITE_SYSTEM: &str =
    "You are a professional CV writer. You rewrite CV sections to align with a job \
    WITHOUT inventing anything. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Rewriter prompt template. Replace `{job_title}`, `{required_skills}`,
/// `{gaps}`, `{sections}` and `{no_fabrication}` before sending.
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"Rewrite the CV sections below for this job.

Job: {job_title}
Required skills: {required_skills}

Identified gaps:
{gaps}

Current CV sections:
{sections}

Return a JSON object with this EXACT schema:
{
  "sections": [
    {"section_type": "same tag as the input section", "text": "rewritten text", "items": ["string"]}
  ],
  "changes": ["brief description of each change made"]
}

Rules:
- Return every input section, with the same section_type.
- Only rephrase, reorder and emphasise existing content.
- Do NOT drastically shorten a section.
- Do NOT include contact details.

{no_fabrication}"#;

/// System prompt for the narrative summary. Plain text output.
pub const NARRATIVE_SYSTEM: &str =
    "You are a concise technical writer. Summarise the CV optimisation results in \
    2-3 sentences for the candidate. Be specific about improvements made and remaining gaps. \
    Be encouraging but honest. Return plain text, no markdown.";

/// Narrative prompt template.
pub const NARRATIVE_PROMPT_TEMPLATE: &str = "Score before: {before}
Score after:  {after}
Delta: {delta}
Gaps addressed: {gap_count}
Changes made: {changes}";
