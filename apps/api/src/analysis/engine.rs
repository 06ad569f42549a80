use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::analysis::experience::{analyze_experience, ExperienceAnalysis};
use crate::analysis::format::{analyze_format, FormatAnalysis};
use crate::analysis::keywords::{analyze_keywords, KeywordAnalysis};
use crate::analysis::messages::{render_messages, MessageInputs, NarrativeMessages};
use crate::analysis::rules::AnalysisRules;
use crate::analysis::skills::{extract_skills, SkillAnalysis, SkillLevel};
use crate::analysis::AnalysisError;

/// Skill count at which the skills component reaches 100.
const SKILL_TARGET: f64 = 10.0;

const FALLBACK_STRENGTH: &str = "Basic resume structure detected";
const FALLBACK_IMPROVEMENT: &str = "Focus on adding more specific achievements and metrics";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetails {
    pub skills: Vec<SkillAnalysis>,
    pub experience: ExperienceAnalysis,
    pub keywords: KeywordAnalysis,
    pub format: FormatAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 0 – 100
    pub score: u32,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub details: AnalysisDetails,
    pub messages: NarrativeMessages,
}

/// The four 0 – 100 sub-scores averaged into `AnalysisResult::score`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    pub skills: f64,
    pub experience: f64,
    pub keywords: f64,
    pub format: f64,
}

impl ComponentScores {
    pub fn compute(details: &AnalysisDetails, verb_list_len: usize) -> Self {
        let keywords = if verb_list_len == 0 {
            0.0
        } else {
            (details.keywords.found.len() as f64 / verb_list_len as f64) * 100.0
        };

        Self {
            skills: ((details.skills.len() as f64 / SKILL_TARGET) * 100.0).min(100.0),
            experience: details.experience.impact as f64,
            keywords: keywords.min(100.0),
            format: details.format.readability.score as f64,
        }
    }

    pub fn overall(&self) -> u32 {
        let sum = self.skills + self.experience + self.keywords + self.format;
        (sum / 4.0).floor() as u32
    }
}

/// Rule-based résumé scorer.
///
/// Immutable once built; share it behind an `Arc` and call it from any number of tasks.
#[derive(Debug, Clone)]
pub struct ResumeAnalyzer {
    rules: AnalysisRules,
    processing_delay: Duration,
}

impl Default for ResumeAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisRules::default(), Duration::ZERO)
    }
}

impl ResumeAnalyzer {
    pub fn new(rules: AnalysisRules, processing_delay: Duration) -> Self {
        Self {
            rules,
            processing_delay,
        }
    }

    /// Waits out the configured processing delay, then analyzes.
    pub async fn analyze_resume(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }
        self.analyze(text)
    }

    pub fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        if text.is_empty() {
            return Err(AnalysisError::InvalidInput);
        }

        let skills = extract_skills(text, &self.rules).unwrap_or_else(|e| {
            warn!("Skill extraction failed, continuing without skills: {e}");
            Vec::new()
        });
        let details = AnalysisDetails {
            skills,
            experience: analyze_experience(text, &self.rules),
            keywords: analyze_keywords(text, &self.rules),
            format: analyze_format(text, &self.rules),
        };

        let score = ComponentScores::compute(&details, self.rules.impact_verbs.len()).overall();
        let strengths = collect_strengths(&details);
        let improvements = collect_improvements(&details);

        let messages = render_messages(MessageInputs {
            score,
            skills: &details.skills,
            experience: &details.experience,
            keywords: &details.keywords,
            format: &details.format,
            improvements: &improvements,
        });

        debug!(
            "Analyzed resume: score={score}, skills={}, words={}",
            details.skills.len(),
            details.format.length.word_count
        );

        Ok(AnalysisResult {
            score,
            strengths,
            improvements,
            details,
            messages,
        })
    }
}

/// Pulls the résumé text out of a JSON value, rejecting anything that is not a string.
pub fn text_from_json(value: &Value) -> Result<&str, AnalysisError> {
    value.as_str().ok_or(AnalysisError::InvalidInput)
}

fn collect_strengths(details: &AnalysisDetails) -> Vec<String> {
    let mut strengths = Vec::new();

    let expert: Vec<&str> = details
        .skills
        .iter()
        .filter(|s| s.level == SkillLevel::Expert)
        .map(|s| s.skill.as_str())
        .collect();
    if !expert.is_empty() {
        strengths.push(format!("Strong expertise in {}", expert.join(", ")));
    }
    if details.format.structure.has_proper_sections {
        strengths.push("Well-structured with clear sections".to_string());
    }
    if details.experience.metrics {
        strengths.push("Effective use of metrics to demonstrate impact".to_string());
    }

    if strengths.is_empty() {
        strengths.push(FALLBACK_STRENGTH.to_string());
    }
    strengths
}

fn collect_improvements(details: &AnalysisDetails) -> Vec<String> {
    let mut improvements = details.experience.suggestions.clone();
    improvements.extend(details.skills.iter().filter_map(|s| s.suggestion.clone()));

    let missing = &details.keywords.missing;
    if !missing.is_empty() {
        let top: Vec<&str> = missing.iter().take(3).map(String::as_str).collect();
        improvements.push(format!(
            "Consider incorporating impactful words like: {}",
            top.join(", ")
        ));
    }

    if improvements.is_empty() {
        improvements.push(FALLBACK_IMPROVEMENT.to_string());
    }
    improvements
}
