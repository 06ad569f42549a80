// Résumé analysis engine.
// Pure, rule-based scoring over extracted text: skills, experience impact, keyword coverage,
// document format, plus the narrative messages built from them.

pub mod engine;
pub mod experience;
pub mod format;
pub mod handlers;
pub mod keywords;
pub mod messages;
pub mod rules;
pub mod skills;

use thiserror::Error;

pub use engine::{text_from_json, AnalysisResult, ResumeAnalyzer};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid resume content")]
    InvalidInput,

    /// Only raised inside skill extraction, where it is downgraded to an empty skill list.
    #[error("Skill pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
