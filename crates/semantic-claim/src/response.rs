//! Defensive unwrapping of completion output.
//!
//! Models wrap JSON in code fences, prepend chatter, or invent status words.
//! Everything here is total: malformed input becomes a [`ClaimError`], never
//! a panic.

use serde::Deserialize;

use crate::error::ClaimError;
use crate::{ClaimJudgment, ClaimStatus};

#[derive(Debug, Deserialize)]
struct RawJudgment {
    status: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    confidence: Option<serde_json::Value>,
}

/// Strip code fences and return the outermost `{...}` span.
pub fn unwrap_json_object(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}

/// Map a free-form status word onto [`ClaimStatus`].
///
/// Unknown words map to `Plausible`.
pub fn map_status(raw: &str) -> ClaimStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "supported" | "supports" | "support" => ClaimStatus::Supported,
        "contradictory" | "contradicts" | "contradicted" | "disputed" | "disputes" | "refuted" => {
            ClaimStatus::Contradictory
        }
        "unrelated" | "irrelevant" | "not_related" | "not related" => ClaimStatus::Unrelated,
        _ => ClaimStatus::Plausible,
    }
}

fn read_confidence(value: Option<serde_json::Value>) -> f32 {
    let raw = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if raw.is_finite() {
        raw.clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}

/// Parse a completion into a judgment, or explain why it could not be read.
pub fn parse_judgment(text: &str) -> Result<ClaimJudgment, ClaimError> {
    let body = unwrap_json_object(text)
        .ok_or_else(|| ClaimError::MalformedResponse("no JSON object in response".to_string()))?;
    let raw: RawJudgment = serde_json::from_str(body)?;
    let status = raw
        .status
        .ok_or_else(|| ClaimError::MalformedResponse("missing `status`".to_string()))?;

    Ok(ClaimJudgment {
        status: map_status(&status),
        reasoning: raw.reasoning.unwrap_or_default(),
        confidence: read_confidence(raw.confidence),
    })
}
