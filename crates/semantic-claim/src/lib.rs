//! Semantic-Claim: claim-support judging for citeaudit
//!
//! Given the text surrounding a citation and the abstract of the cited work,
//! [`SemanticClaimService`] asks a single-shot completion provider whether
//! the abstract supports the claim.
//!
//! The service is a strict adapter around an unreliable port: every answer
//! is unwrapped and validated, and any transport, timeout or parse failure
//! fails closed to [`ClaimStatus::Unrelated`] with confidence 0. Judgments
//! are advisory and never block an audit.

pub mod error;
pub mod fakes;
pub mod openai;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use error::ClaimError;
pub use openai::{CompletionConfig, OpenAiCompatibleProvider};
pub use response::{map_status, parse_judgment, unwrap_json_object};

const SYSTEM_PROMPT: &str = "You check whether a scholarly abstract supports a claim that cites it. \
Answer with a single JSON object and nothing else: \
{\"status\": \"supported\" | \"plausible\" | \"unrelated\" | \"contradictory\", \
\"reasoning\": \"<one or two sentences>\", \"confidence\": <number between 0 and 1>}. \
Use \"supported\" only when the abstract states the claim, \"plausible\" when it is consistent \
but not stated, \"contradictory\" when it reports the opposite, and \"unrelated\" otherwise.";

/// How the cited abstract relates to the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Supported,
    Plausible,
    Unrelated,
    Contradictory,
}

/// Verdict for one claim/abstract pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimJudgment {
    pub status: ClaimStatus,
    pub reasoning: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

impl ClaimJudgment {
    /// The fail-closed verdict.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            status: ClaimStatus::Unrelated,
            reasoning: format!("Semantic analysis unavailable: {reason}"),
            confidence: 0.0,
        }
    }
}

/// A two-part chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPrompt {
    pub system: String,
    pub user: String,
}

impl CompletionPrompt {
    /// Prompt asking whether `abstract_text` supports `claim`.
    pub fn claim_check(claim: &str, abstract_text: &str) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            user: format!(
                "Claim:\n{}\n\nAbstract of the cited work:\n{}",
                claim.trim(),
                abstract_text.trim()
            ),
        }
    }
}

/// Single-shot text-completion port.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Return the raw completion text for `prompt`.
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, ClaimError>;
}

/// Strict, timeout-bounded, retry-free claim judge.
#[derive(Clone)]
pub struct SemanticClaimService {
    provider: Arc<dyn CompletionProvider>,
    timeout: Duration,
}

impl SemanticClaimService {
    pub fn new(provider: Arc<dyn CompletionProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Judge whether `abstract_text` supports `claim`. Never fails.
    pub async fn verify_claim(&self, claim: &str, abstract_text: &str) -> ClaimJudgment {
        if claim.trim().is_empty() || abstract_text.trim().is_empty() {
            return ClaimJudgment::unavailable("claim or abstract is empty");
        }

        match self.try_verify(claim, abstract_text).await {
            Ok(judgment) => {
                debug!(status = ?judgment.status, confidence = judgment.confidence, "claim judged");
                judgment
            }
            Err(e) => {
                warn!(provider = %self.provider.name(), error = %e, "claim judgment failed closed");
                ClaimJudgment::unavailable(&e.to_string())
            }
        }
    }

    async fn try_verify(&self, claim: &str, abstract_text: &str) -> Result<ClaimJudgment, ClaimError> {
        let prompt = CompletionPrompt::claim_check(claim, abstract_text);
        let text = tokio::time::timeout(self.timeout, self.provider.complete(&prompt))
            .await
            .map_err(|_| ClaimError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            })??;
        parse_judgment(&text)
    }
}
