use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::analysis::rules::AnalysisRules;
use crate::analysis::AnalysisError;

const SINGLE_MENTION_SUGGESTION: &str =
    "Consider adding more context about your experience with this skill";

/// Proficiency tier derived from how often a skill is mentioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Expert,
    Proficient,
    Familiar,
}

impl SkillLevel {
    pub fn from_mentions(count: usize) -> Self {
        match count {
            c if c > 2 => SkillLevel::Expert,
            c if c > 1 => SkillLevel::Proficient,
            _ => SkillLevel::Familiar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub skill: String,
    pub level: SkillLevel,
    /// First line mentioning the skill, trimmed.
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Counts literal, ASCII case-insensitive mentions of every reference skill.
///
/// Matching is substring-based ("Java" also counts inside "JavaScript"). Skills with no
/// mention are left out.
pub fn extract_skills(text: &str, rules: &AnalysisRules) -> Result<Vec<SkillAnalysis>, AnalysisError> {
    let mut skills = Vec::new();

    for skill in rules.all_skills() {
        let pattern = RegexBuilder::new(&regex::escape(skill))
            .case_insensitive(true)
            .unicode(false)
            .build()?;

        let mentions = pattern.find_iter(text).count();
        if mentions == 0 {
            continue;
        }

        skills.push(SkillAnalysis {
            skill: skill.to_string(),
            level: SkillLevel::from_mentions(mentions),
            context: context_line(text, skill),
            suggestion: (mentions == 1).then(|| SINGLE_MENTION_SUGGESTION.to_string()),
        });
    }

    Ok(skills)
}

fn context_line(text: &str, skill: &str) -> String {
    let needle = skill.to_ascii_lowercase();
    text.split('\n')
        .find(|line| line.to_ascii_lowercase().contains(&needle))
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}
