use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::analysis::rules::AnalysisRules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    /// Impact verbs present in the text, in order of first appearance.
    pub found: Vec<String>,
    /// Impact verbs absent from the text, in list order.
    pub missing: Vec<String>,
    /// Every token in the text, lowercased.
    pub frequency: BTreeMap<String, u32>,
}

/// Word tokens: maximal runs of ASCII letters, digits and underscores.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
}

pub fn word_count(text: &str) -> usize {
    tokens(text).count()
}

pub fn analyze_keywords(text: &str, rules: &AnalysisRules) -> KeywordAnalysis {
    let lowered = text.to_lowercase();

    let mut frequency: BTreeMap<String, u32> = BTreeMap::new();
    let mut found = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for token in tokens(&lowered) {
        *frequency.entry(token.to_string()).or_insert(0) += 1;

        if seen.insert(token) && rules.impact_verbs.iter().any(|v| v == token) {
            found.push(token.to_string());
        }
    }

    let missing = rules
        .impact_verbs
        .iter()
        .filter(|v| !frequency.contains_key(v.as_str()))
        .cloned()
        .collect();

    KeywordAnalysis {
        found,
        missing,
        frequency,
    }
}
