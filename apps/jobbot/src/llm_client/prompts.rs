// Shared prompt constants for free-text LLM calls.
// Each module that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Common instruction appended to prompts that describe the candidate.
pub const FACTUAL_INSTRUCTION: &str = "\
    CRITICAL: Only mention experience, skills and achievements that appear in the \
    candidate profile. Do NOT invent employers, numbers or technologies.";
