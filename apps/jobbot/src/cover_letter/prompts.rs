// All LLM prompt constants for cover letter generation.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for cover letter writing.
pub const COVER_LETTER_SYSTEM: &str = "You are an experienced technical recruiter who \
    writes short, specific cover letters for software engineers. \
    Respond with the letter text only. \
    Do NOT use markdown code fences or headings.";

/// Cover letter prompt template. Replace `{job_title}`, `{company}`,
/// `{job_description}`, `{candidate_profile}` and `{candidate_contact}` before sending.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = "Write a concise, professional cover letter \
(3 paragraphs, under 250 words) for:

Position: {job_title} at {company}
Job Description: {job_description}

{candidate_profile}

Guidelines:
- Be professional and enthusiastic
- Highlight the 2-3 experiences most relevant to this specific role
- Show understanding of the company and the role
- Keep it concise and impactful
- Do NOT open with generic phrases like \"I am excited to apply\"
- End with the contact line: {candidate_contact}";

/// Maximum description length sent to the model.
pub const MAX_DESCRIPTION_CHARS: usize = 4000;
