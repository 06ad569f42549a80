//! Reference lists the analysis engine scores against.
//!
//! Built once at startup and handed to `ResumeAnalyzer`; nothing here is mutated afterwards.

const TECHNICAL_SKILLS: &[&str] = &[
    "JavaScript",
    "Python",
    "Java",
    "C++",
    "React",
    "Angular",
    "Vue",
    "Node.js",
    "AWS",
    "Docker",
    "Kubernetes",
    "SQL",
    "NoSQL",
    "Git",
    "CI/CD",
    "REST API",
    "GraphQL",
    "Machine Learning",
    "Agile",
];

const SOFT_SKILLS: &[&str] = &[
    "Leadership",
    "Communication",
    "Problem Solving",
    "Team Management",
    "Project Management",
    "Time Management",
    "Critical Thinking",
    "Collaboration",
    "Adaptability",
    "Innovation",
];

const IMPACT_VERBS: &[&str] = &[
    "achieved",
    "improved",
    "increased",
    "decreased",
    "reduced",
    "developed",
    "launched",
    "led",
    "managed",
    "created",
    "implemented",
    "designed",
    "optimized",
    "streamlined",
];

const CANONICAL_SECTIONS: &[&str] = &["SUMMARY", "EXPERIENCE", "EDUCATION", "SKILLS"];

/// Skill names, impact verbs and section headings used by every analysis stage.
#[derive(Debug, Clone)]
pub struct AnalysisRules {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    /// Lowercase. Experience and keyword coverage both read this list.
    pub impact_verbs: Vec<String>,
    /// Uppercase heading names, matched case-insensitively.
    pub sections: Vec<String>,
}

impl Default for AnalysisRules {
    fn default() -> Self {
        Self {
            technical_skills: to_owned(TECHNICAL_SKILLS),
            soft_skills: to_owned(SOFT_SKILLS),
            impact_verbs: to_owned(IMPACT_VERBS),
            sections: to_owned(CANONICAL_SECTIONS),
        }
    }
}

impl AnalysisRules {
    /// Technical skills first, then soft skills.
    pub fn all_skills(&self) -> impl Iterator<Item = &str> {
        self.technical_skills
            .iter()
            .chain(self.soft_skills.iter())
            .map(String::as_str)
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
