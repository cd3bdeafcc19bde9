// Shared prompt fragments.
// Each agent keeps its own templates in optimization/prompts.rs; this file
// only holds the instruction every content-producing call repeats.

/// Appended to every prompt that produces or edits candidate content.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Use only facts present in the input. \
    Do NOT invent employers, titles, dates, degrees, certifications, metrics or skills. \
    If the input does not support a claim, omit it.";
