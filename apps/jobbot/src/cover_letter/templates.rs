//! Role-specific cover letter templates used when AI generation is unavailable.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::CandidateProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    AiEngineer,
    Platform,
    Devops,
    Backend,
    Default,
}

impl RoleCategory {
    /// Categories in match priority order. `Default` is never matched by keyword.
    pub const MATCH_ORDER: [RoleCategory; 4] = [
        RoleCategory::AiEngineer,
        RoleCategory::Platform,
        RoleCategory::Devops,
        RoleCategory::Backend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCategory::AiEngineer => "ai_engineer",
            RoleCategory::Platform => "platform",
            RoleCategory::Devops => "devops",
            RoleCategory::Backend => "backend",
            RoleCategory::Default => "default",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            RoleCategory::AiEngineer => &[
                "ai engineer",
                "ai developer",
                "llm",
                "langchain",
                "agentic",
                "machine learning",
                "ml engineer",
                "nlp",
                "artificial intelligence",
            ],
            RoleCategory::Platform => &[
                "platform engineer",
                "api engineer",
                "extensibility",
                "infrastructure engineer",
                "developer experience",
            ],
            RoleCategory::Devops => &[
                "devops",
                "sre",
                "site reliability",
                "infrastructure",
                "cloud engineer",
                "systems engineer",
            ],
            RoleCategory::Backend => &[
                "backend",
                "back-end",
                "server-side",
                "node.js",
                "nodejs",
                "golang",
                "typescript",
                "graphql",
                "microservices",
            ],
            RoleCategory::Default => &[],
        }
    }

    /// First category whose keywords appear in `"{title} {description}"`.
    pub fn match_job(title: &str, description: &str) -> RoleCategory {
        let text = format!("{title} {description}").to_lowercase();
        Self::MATCH_ORDER
            .into_iter()
            .find(|category| category.keywords().iter().any(|kw| text.contains(kw)))
            .unwrap_or(RoleCategory::Default)
    }

    fn body(&self) -> &'static str {
        match self {
            RoleCategory::AiEngineer => AI_ENGINEER_BODY,
            RoleCategory::Platform => PLATFORM_BODY,
            RoleCategory::Devops => DEVOPS_BODY,
            RoleCategory::Backend => BACKEND_BODY,
            RoleCategory::Default => DEFAULT_BODY,
        }
    }
}

impl fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BACKEND_BODY: &str = "I am writing to express my interest in the {job_title} position at \
{company}. With {experience_years}+ years of experience as a {candidate_headline}, I have \
developed deep expertise in building scalable, high-performance backend systems.

My core stack includes {core_stack}. {top_highlight}. What excites me most about this role is \
the opportunity to apply my experience with distributed systems to {company}'s technical \
challenges.

I thrive in remote-first environments with strong async communication. I would welcome the \
opportunity to discuss how my backend expertise can contribute to your team's success.";

const AI_ENGINEER_BODY: &str = "I am glad to apply for the {job_title} position at {company}. As \
a {candidate_headline} with hands-on experience building production LLM applications, I bring a \
combination of backend engineering and applied AI skills.

I have built automated, agentic workflows and integrated LLMs into production systems, including \
retrieval pipelines and careful prompt design. Combined with {experience_years}+ years of work \
on scalable systems ({core_stack}), I can bridge the gap between AI capabilities and \
production-ready infrastructure.

I would love to discuss how my blend of backend engineering and LLM experience can contribute to \
{company}'s AI initiatives.";

const PLATFORM_BODY: &str = "I am writing to apply for the {job_title} position at {company}. \
With my background in building platforms and API products, I am confident I can make a \
significant contribution to your team.

{top_highlight}. I have extensive experience with event-driven architectures, CI/CD pipelines \
and infrastructure automation, and I focus on systems that are both developer-friendly and \
operationally robust.

My experience with {core_stack} positions me well to help {company} scale its platform. I look \
forward to discussing how I can contribute to your platform engineering efforts.";

const DEVOPS_BODY: &str = "I am applying for the {job_title} role at {company}. My experience \
building and maintaining cloud infrastructure at scale makes me a strong candidate for this \
position.

Over {experience_years}+ years I have worked extensively with {core_stack}. {top_highlight}. I \
care about automation and reliability, and about enabling development teams to ship faster.

I would be thrilled to bring my infrastructure and automation experience to {company}, and I \
look forward to learning more about your challenges.";

const DEFAULT_BODY: &str = "I am writing to express my interest in the {job_title} position at \
{company}. With {experience_years}+ years of experience as a {candidate_headline}, I have \
developed strong expertise in building scalable software systems and delivering impactful \
products.

My technical background spans {core_stack}. {top_highlight}. I thrive in remote-first, startup \
environments where I can take ownership and make meaningful contributions.

I would welcome the chance to discuss how my experience aligns with {company}'s needs.";

/// Renders the template for `category`. Always returns a complete letter.
pub fn render(
    category: RoleCategory,
    job_title: &str,
    company: &str,
    profile: &CandidateProfile,
) -> String {
    let core_stack = if profile.skills.is_empty() {
        "modern backend and cloud technologies".to_string()
    } else {
        profile
            .skills
            .iter()
            .take(6)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    let top_highlight = profile
        .highlights
        .first()
        .map(|h| h.trim_end_matches('.').to_string())
        .unwrap_or_else(|| "I have delivered production systems end to end".to_string());

    let body = category
        .body()
        .replace("{job_title}", job_title)
        .replace("{company}", company)
        .replace("{candidate_headline}", &profile.headline)
        .replace("{experience_years}", &profile.experience_years.to_string())
        .replace("{core_stack}", &core_stack)
        .replace("{top_highlight}", &top_highlight);

    let name = &profile.name;
    let mut letter = format!("Dear Hiring Team,\n\n{body}\n\nBest regards,\n{name}");
    let contact = profile.contact_line();
    if !contact.is_empty() {
        letter.push('\n');
        letter.push_str(&contact);
    }
    letter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_order_prefers_ai_over_backend() {
        assert_eq!(
            RoleCategory::match_job("Backend Engineer", "Build LLM agents in Go"),
            RoleCategory::AiEngineer
        );
    }

    #[test]
    fn test_match_categories() {
        assert_eq!(
            RoleCategory::match_job("Platform Engineer", ""),
            RoleCategory::Platform
        );
        assert_eq!(RoleCategory::match_job("SRE", ""), RoleCategory::Devops);
        assert_eq!(
            RoleCategory::match_job("Engineer", "Node.js microservices"),
            RoleCategory::Backend
        );
        assert_eq!(
            RoleCategory::match_job("Product Designer", "Figma"),
            RoleCategory::Default
        );
    }

    #[test]
    fn test_render_fills_every_placeholder() {
        let mut profile = CandidateProfile::default();
        profile.name = "Ada Lovelace".to_string();
        profile.email = "ada@example.com".to_string();

        for category in RoleCategory::MATCH_ORDER
            .into_iter()
            .chain([RoleCategory::Default])
        {
            let letter = render(category, "Backend Engineer", "Acme", &profile);
            assert!(letter.starts_with("Dear Hiring Team,"));
            assert!(letter.contains("Acme"), "{category} misses company");
            assert!(letter.contains("Ada Lovelace"));
            assert!(letter.ends_with("ada@example.com"));
            assert!(!letter.contains('{'), "{category} left a placeholder");
        }
    }

    #[test]
    fn test_render_without_contact_ends_with_name() {
        let profile = CandidateProfile::default();
        let letter = render(RoleCategory::Default, "Engineer", "Acme", &profile);
        assert!(letter.ends_with(&profile.name));
    }
}
