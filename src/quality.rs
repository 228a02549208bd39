use crate::scaffold::{normalize_scaffold, ScaffoldSlot, SlotKey};
use serde::{Deserialize, Serialize};

const MIN_SUBJECT_LENGTH: usize = 10;
const SHORT_SUBJECT_PENALTY: i32 = 5;

/// Phrases the Quality slot is expected to carry. Missing all of them only
/// produces a recommendation, never a score penalty.
const QUALITY_KEYWORDS: [&str; 6] = ["quality", "detailed", "4k", "8k", "masterpiece", "sharp"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreAdjustment {
    pub reason: String,
    pub delta: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityBreakdown {
    pub filled_slots: usize,
    pub total_slots: usize,
    pub base_score: i32,
    pub adjustments: Vec<ScoreAdjustment>,
}

/// Advisory completeness score for a scaffold. Drives UI hints only; no
/// other operation gates on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub score: u32,
    pub breakdown: QualityBreakdown,
    pub recommendations: Vec<String>,
}

pub fn calculate_prompt_quality(scaffold: &[ScaffoldSlot]) -> QualityReport {
    let scaffold = normalize_scaffold(scaffold);
    let total_slots = scaffold.len();
    let filled_slots = scaffold.iter().filter(|s| s.is_filled()).count();

    let base_score = (filled_slots * 100 / total_slots) as i32;
    let mut adjustments = Vec::new();
    let mut recommendations = Vec::new();

    for slot in &scaffold {
        if !slot.is_filled() {
            recommendations.push(format!(
                "Fill the {} slot: {}",
                slot.name,
                lowercase_first(&slot.description)
            ));
        }
    }

    if let Some(subject) = scaffold.iter().find(|s| s.key == SlotKey::Subject) {
        if subject.is_filled() && subject.content.trim().len() < MIN_SUBJECT_LENGTH {
            adjustments.push(ScoreAdjustment {
                reason: "Subject is very short".to_string(),
                delta: -SHORT_SUBJECT_PENALTY,
            });
            recommendations.push(
                "Expand the subject with a few identifying details".to_string(),
            );
        }
    }

    if let Some(quality) = scaffold.iter().find(|s| s.key == SlotKey::Quality) {
        if quality.is_filled() && !contains_quality_keyword(&quality.content) {
            recommendations.push(format!(
                "Consider quality boosters such as {}",
                QUALITY_KEYWORDS[..3]
                    .iter()
                    .map(|k| format!("\"{}\"", k))
                    .collect::<Vec<String>>()
                    .join(", ")
            ));
        }
    }

    let score = adjustments
        .iter()
        .fold(base_score, |acc, a| acc + a.delta)
        .clamp(0, 100) as u32;

    QualityReport {
        score,
        breakdown: QualityBreakdown {
            filled_slots,
            total_slots,
            base_score,
            adjustments,
        },
        recommendations,
    }
}

fn contains_quality_keyword(content: &str) -> bool {
    let lowered = content.to_lowercase();
    QUALITY_KEYWORDS.iter().any(|k| lowered.contains(k))
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().collect::<String>() + chars.as_str(),
    }
}
