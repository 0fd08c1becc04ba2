//! Rule-based editing assistant.
//!
//! Replies are a pure function of the user text and a [`TimelineSummary`]:
//! a keyword table picks the reply, and suggestions come from a fixed
//! availability/confidence table. There is no model state.

use serde::{Deserialize, Serialize};

use crate::summary::TimelineSummary;

/// Action an assistant suggestion would trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    AutoCut,
    ColorGrade,
    Transitions,
    AudioEnhance,
    Captions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub title: String,
    pub description: String,
    /// Percentage, used for ranking.
    pub confidence: u8,
    pub estimated_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub message: String,
    pub suggestions: Vec<Suggestion>,
}

pub const GREETING: &str = "Hi! I'm your editing assistant. I can analyze your timeline, suggest improvements, and automate tedious tasks. What would you like me to help you with?";

/// Suggestions that apply to the summarized timeline, in table order.
pub fn available_suggestions(summary: &TimelineSummary) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if summary.total_clips > 0 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::AutoCut,
            title: "Auto Cut Silence".to_string(),
            description: format!("Remove silent parts from {} audio clips", summary.audio_clips),
            confidence: 85,
            estimated_time: "2-3 min".to_string(),
        });
    }
    if summary.video_clips > 0 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::ColorGrade,
            title: "Color Correction".to_string(),
            description: format!(
                "Apply cinematic grading to {} video clips",
                summary.video_clips
            ),
            confidence: 92,
            estimated_time: "1-2 min".to_string(),
        });
    }
    if summary.total_clips > 3 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::Transitions,
            title: "Smart Transitions".to_string(),
            description: "Add smooth transitions between clips".to_string(),
            confidence: 78,
            estimated_time: "30 sec".to_string(),
        });
    }
    if summary.audio_clips > 0 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::AudioEnhance,
            title: "Audio Enhancement".to_string(),
            description: "Improve audio quality and normalize levels".to_string(),
            confidence: 88,
            estimated_time: "1 min".to_string(),
        });
    }
    suggestions.push(Suggestion {
        kind: SuggestionKind::Captions,
        title: "Generate Captions".to_string(),
        description: "Create subtitles automatically".to_string(),
        confidence: 95,
        estimated_time: "3-5 min".to_string(),
    });

    suggestions
}

/// Available suggestions ordered by descending confidence. Ties keep table
/// order.
pub fn ranked_suggestions(summary: &TimelineSummary) -> Vec<Suggestion> {
    let mut suggestions = available_suggestions(summary);
    suggestions.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    suggestions
}

struct Rule {
    keywords: &'static [&'static str],
    kind: SuggestionKind,
    message: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        keywords: &["cut", "trim"],
        kind: SuggestionKind::AutoCut,
        message: "I can help you cut your video! Removing silent sections and tightening clip lengths would improve pacing. Should I proceed?",
    },
    Rule {
        keywords: &["color", "colour", "grade"],
        kind: SuggestionKind::ColorGrade,
        message: "I can apply colour grading to enhance the look of your video. A cinematic grade would make the content more engaging.",
    },
    Rule {
        keywords: &["audio", "sound"],
        kind: SuggestionKind::AudioEnhance,
        message: "I can improve your audio: reduce background noise, normalize volume levels and apply EQ.",
    },
    Rule {
        keywords: &["transition"],
        kind: SuggestionKind::Transitions,
        message: "I'll add smooth transitions between your clips for better flow.",
    },
    Rule {
        keywords: &["caption", "subtitle"],
        kind: SuggestionKind::Captions,
        message: "I can generate captions for your video automatically to make it more accessible.",
    },
];

const FALLBACK_MESSAGE: &str = "I understand you want to improve your video. Here are the enhancements that fit your timeline best.";

/// Produces the reply for one user message.
///
/// # Example
/// ```
/// use timeline_engine::assistant::{SuggestionKind, respond};
/// use timeline_engine::TimelineSummary;
///
/// let reply = respond("add captions please", &TimelineSummary::default());
/// assert_eq!(reply.suggestions[0].kind, SuggestionKind::Captions);
/// ```
pub fn respond(text: &str, summary: &TimelineSummary) -> AssistantReply {
    let lower = text.to_lowercase();
    let ranked = ranked_suggestions(summary);

    if lower.contains("analyze") || lower.contains("analyse") || lower.contains("suggest") {
        return AssistantReply {
            message: format!(
                "I've analyzed your timeline with {} clips. Here are my top recommendations based on your content:",
                summary.total_clips
            ),
            suggestions: ranked.into_iter().take(3).collect(),
        };
    }

    for rule in RULES {
        if rule.keywords.iter().any(|keyword| lower.contains(keyword)) {
            return AssistantReply {
                message: rule.message.to_string(),
                suggestions: ranked
                    .into_iter()
                    .filter(|suggestion| suggestion.kind == rule.kind)
                    .collect(),
            };
        }
    }

    AssistantReply {
        message: FALLBACK_MESSAGE.to_string(),
        suggestions: ranked.into_iter().take(2).collect(),
    }
}

pub fn apply_message(suggestion: &Suggestion) -> String {
    format!(
        "Applying {}... This will take approximately {}.",
        suggestion.title, suggestion.estimated_time
    )
}

pub fn completion_message(suggestion: &Suggestion) -> String {
    format!("{} completed successfully.", suggestion.title)
}
