use serde::{Deserialize, Serialize};

use crate::analysis::keywords::word_count;
use crate::analysis::rules::AnalysisRules;

const MIN_WORDS: usize = 300;
const MAX_WORDS: usize = 700;
const MIN_SECTIONS: usize = 3;
const WORDS_PER_READABILITY_POINT: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureAnalysis {
    pub has_proper_sections: bool,
    pub sections_found: Vec<String>,
    pub missing_sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthAnalysis {
    pub appropriate: bool,
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityAnalysis {
    /// 0 – 100, a word-count proxy.
    pub score: u32,
    /// Reserved; always empty for now.
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatAnalysis {
    pub structure: StructureAnalysis,
    pub length: LengthAnalysis,
    pub readability: ReadabilityAnalysis,
}

pub fn analyze_format(text: &str, rules: &AnalysisRules) -> FormatAnalysis {
    let haystack = text.to_ascii_lowercase();
    let (sections_found, missing_sections): (Vec<String>, Vec<String>) = rules
        .sections
        .iter()
        .cloned()
        .partition(|section| haystack.contains(&section.to_ascii_lowercase()));

    let words = word_count(text);
    let suggestion = if words < MIN_WORDS {
        Some("Add more detailed content".to_string())
    } else if words > MAX_WORDS {
        Some("Consider making content more concise".to_string())
    } else {
        None
    };

    FormatAnalysis {
        structure: StructureAnalysis {
            has_proper_sections: sections_found.len() >= MIN_SECTIONS,
            sections_found,
            missing_sections,
        },
        length: LengthAnalysis {
            appropriate: (MIN_WORDS..=MAX_WORDS).contains(&words),
            word_count: words,
            suggestion,
        },
        readability: ReadabilityAnalysis {
            score: (words / WORDS_PER_READABILITY_POINT).min(100) as u32,
            issues: Vec::new(),
        },
    }
}
