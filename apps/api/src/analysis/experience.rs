use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::keywords::tokens;
use crate::analysis::rules::AnalysisRules;

// NOTE: expect() on these statics only fires on a malformed literal pattern.
static EXPERIENCE_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:EXPERIENCE|WORK|EMPLOYMENT)(.*?)(?:\n\n|\n[A-Z])")
        .expect("Invalid regex: experience section")
});

static METRIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[0-9]+%|\$[0-9]+|[0-9]+ (users|customers|clients|projects|teams?|people|employees)",
    )
    .expect("Invalid regex: metrics")
});

static LEADERSHIP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(led|managed|supervised|mentored|directed|coordinated) (team|project|initiative)")
        .expect("Invalid regex: leadership")
});

const ADD_METRICS: &str = "Add specific metrics and quantifiable achievements";
const ADD_LEADERSHIP: &str = "Highlight leadership and project management experiences";
const ADD_VERBS: &str = "Use more impactful action verbs to describe your achievements";

/// Points awarded per distinct impact verb, capped at 100.
const POINTS_PER_VERB: u32 = 20;
const MIN_IMPACT_VERBS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceAnalysis {
    /// 0 – 100
    pub impact: u32,
    pub metrics: bool,
    pub leadership: bool,
    pub achievements: bool,
    pub suggestions: Vec<String>,
}

/// Best-effort slice of the experience section.
///
/// The heading must be uppercase. The body runs lazily up to the first blank line or the
/// first line starting with an uppercase letter; no terminator means no section.
pub fn experience_section(text: &str) -> &str {
    EXPERIENCE_SECTION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or("")
}

pub fn analyze_experience(text: &str, rules: &AnalysisRules) -> ExperienceAnalysis {
    let section = experience_section(text);

    let metrics = METRIC_PATTERN.is_match(section);
    let leadership = LEADERSHIP_PATTERN.is_match(section);

    let section_tokens: Vec<&str> = tokens(section).collect();
    let verb_count = rules
        .impact_verbs
        .iter()
        .filter(|verb| section_tokens.iter().any(|t| t.eq_ignore_ascii_case(verb)))
        .count();

    let mut suggestions = Vec::new();
    if !metrics {
        suggestions.push(ADD_METRICS.to_string());
    }
    if !leadership {
        suggestions.push(ADD_LEADERSHIP.to_string());
    }
    if verb_count < MIN_IMPACT_VERBS {
        suggestions.push(ADD_VERBS.to_string());
    }

    ExperienceAnalysis {
        impact: (verb_count as u32 * POINTS_PER_VERB).min(100),
        metrics,
        leadership,
        achievements: verb_count > 0,
        suggestions,
    }
}
