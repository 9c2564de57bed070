//! AI insight provider contract.
//!
//! Only the interface lives in core. Implementations (hosted models, local
//! heuristics) are plugged in by the application and driven through
//! `DiaryService::apply_insights`.

use crate::model::entry::DiaryEntry;
use crate::model::mood::Mood;
use std::error::Error;

/// Produces AI-derived metadata for diary content.
pub trait AiService {
    type Error: Error + 'static;

    /// Suggests a mood, or `None` when the content is inconclusive.
    fn detect_mood(&self, content: &str) -> Result<Option<Mood>, Self::Error>;
    fn generate_summary(&self, content: &str) -> Result<String, Self::Error>;
    /// Returns themes in relevance order.
    fn extract_themes(&self, content: &str) -> Result<Vec<String>, Self::Error>;
    /// Returns an unbounded sentiment score; sign carries polarity.
    fn analyze_sentiment(&self, content: &str) -> Result<f64, Self::Error>;
    fn generate_reflection_questions(&self, entry: &DiaryEntry)
        -> Result<Vec<String>, Self::Error>;
}
