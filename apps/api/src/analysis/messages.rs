//! Canned narrative sentences shown alongside the numeric results.

use serde::{Deserialize, Serialize};

use crate::analysis::experience::ExperienceAnalysis;
use crate::analysis::format::FormatAnalysis;
use crate::analysis::keywords::KeywordAnalysis;
use crate::analysis::skills::{SkillAnalysis, SkillLevel};

/// More keywords than this reads as ATS-friendly.
const ATS_KEYWORD_THRESHOLD: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeMessages {
    pub intro: String,
    pub ats: String,
    pub impact: String,
    pub clarity: String,
    pub skills: String,
    pub experience: String,
    pub action_plan: String,
}

pub struct MessageInputs<'a> {
    pub score: u32,
    pub skills: &'a [SkillAnalysis],
    pub experience: &'a ExperienceAnalysis,
    pub keywords: &'a KeywordAnalysis,
    pub format: &'a FormatAnalysis,
    pub improvements: &'a [String],
}

pub fn render_messages(inputs: MessageInputs<'_>) -> NarrativeMessages {
    let MessageInputs {
        score,
        skills,
        experience,
        keywords,
        format,
        improvements,
    } = inputs;

    let sections_ok = format.structure.has_proper_sections;

    NarrativeMessages {
        intro: format!(
            "I've completed a comprehensive analysis of your resume, achieving an overall score of {score}%. \
             Let's dive into the detailed breakdown and specific recommendations for improvement."
        ),
        ats: format!(
            "Your resume contains {} impactful keywords out of our recommended set. {} {}",
            keywords.found.len(),
            if keywords.found.len() > ATS_KEYWORD_THRESHOLD {
                "This is good for ATS optimization!"
            } else {
                "Consider incorporating more industry-standard terms for better ATS performance."
            },
            if sections_ok {
                "The clear section structure will help with automated parsing."
            } else {
                "Adding clear section headers will improve ATS readability."
            },
        ),
        impact: format!(
            "Your experience section {} quantifiable achievements. {} Impact score: {}%",
            if experience.metrics {
                "effectively uses"
            } else {
                "could benefit from"
            },
            if experience.leadership {
                "Leadership experience is well-highlighted."
            } else {
                "Consider emphasizing leadership roles and responsibilities."
            },
            experience.impact,
        ),
        clarity: format!(
            "Document structure is {}. Length is {} at {} words. {}",
            if sections_ok {
                "well-organized"
            } else {
                "needs improvement"
            },
            if format.length.appropriate {
                "appropriate"
            } else {
                "not optimal"
            },
            format.length.word_count,
            format.length.suggestion.as_deref().unwrap_or(""),
        ),
        skills: skills_message(skills),
        experience: format!(
            "Your experience section {} achievements. {} {}",
            if experience.achievements {
                "effectively showcases"
            } else {
                "needs stronger"
            },
            if experience.metrics {
                "Good use of metrics!"
            } else {
                "Add specific numbers and percentages to quantify your impact."
            },
            if experience.leadership {
                "Leadership experience is well-documented."
            } else {
                "Consider highlighting team leadership and project management experiences."
            },
        ),
        action_plan: format!(
            "Priority improvements:\n1. {}\n2. {}\n3. {}",
            improvement_or(improvements, 0, ""),
            improvement_or(improvements, 1, "Continue maintaining current strengths"),
            improvement_or(improvements, 2, "Focus on quantifying achievements"),
        ),
    }
}

fn skills_message(skills: &[SkillAnalysis]) -> String {
    let expert = names_at(skills, SkillLevel::Expert, 3);
    let familiar = names_at(skills, SkillLevel::Familiar, 2);

    let expand = if familiar.is_empty() {
        String::new()
    } else {
        format!(
            "Consider expanding on your experience with {}",
            familiar.join(", ")
        )
    };

    format!(
        "You've demonstrated {} relevant skills, with particular strength in {}. {}",
        skills.len(),
        expert.join(", "),
        expand
    )
}

fn names_at(skills: &[SkillAnalysis], level: SkillLevel, limit: usize) -> Vec<&str> {
    skills
        .iter()
        .filter(|s| s.level == level)
        .take(limit)
        .map(|s| s.skill.as_str())
        .collect()
}

fn improvement_or<'a>(improvements: &'a [String], index: usize, fallback: &'a str) -> &'a str {
    improvements
        .get(index)
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
}
