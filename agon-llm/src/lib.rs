//! AGON LLM - Provider Abstraction Layer
//!
//! Provider-agnostic traits for the two LLM-backed duties of the arena:
//! embedding agent profiles for opponent matching, and moderating a
//! match (challenge generation and response judging). The arena treats
//! both as best-effort: every trait failure has a deterministic
//! fallback, so a provider outage degrades match quality but never
//! blocks a match.

pub mod providers;

pub use providers::{ChatClient, ChatJudgeProvider};

use agon_core::{AgonResult, EmbeddingVector};
use async_trait::async_trait;

// ============================================================================
// EMBEDDING PROVIDER TRAIT
// ============================================================================

/// Trait for embedding providers.
/// Implementations must be thread-safe (Send + Sync) and deterministic:
/// the same text always yields the same vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    ///
    /// # Arguments
    /// * `text` - The text to embed
    ///
    /// # Returns
    /// * `Ok(EmbeddingVector)` - A unit-normalized vector
    /// * `Err(AgonError::Llm)` - If embedding fails
    async fn embed(&self, text: &str) -> AgonResult<EmbeddingVector>;

    /// Get the number of dimensions this provider produces.
    fn dimensions(&self) -> i32;

    /// Get the model identifier for this provider.
    fn model_id(&self) -> &str;
}

// ============================================================================
// JUDGE PROVIDER TRAIT
// ============================================================================

/// Scores produced by judging a pair of responses.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeScores {
    /// Score for side A in [0, 10].
    pub score_a: f64,
    /// Score for side B in [0, 10].
    pub score_b: f64,
    /// Short explanation of the scoring.
    pub reasoning: String,
}

impl JudgeScores {
    /// Clamp both scores into [0, 10].
    pub fn clamped(mut self) -> Self {
        self.score_a = self.score_a.clamp(0.0, 10.0);
        self.score_b = self.score_b.clamp(0.0, 10.0);
        self
    }

    /// Neutral scores applied when the judge is unavailable.
    pub fn fallback() -> Self {
        Self {
            score_a: 5.0,
            score_b: 5.0,
            reasoning: "Judging encountered an error; default scores applied.".to_string(),
        }
    }
}

/// Challenge topic used when challenge generation fails.
pub const FALLBACK_CHALLENGE: &str =
    "Which approach leads to better outcomes: prioritizing innovation speed or long-term reliability?";

/// Trait for match moderation providers.
///
/// Callers apply `FALLBACK_CHALLENGE` / `JudgeScores::fallback()` on
/// error; implementations report failures rather than inventing output.
#[async_trait]
pub trait JudgeProvider: Send + Sync {
    /// Generate a debate topic tailored to both contestants.
    ///
    /// # Arguments
    /// * `name_a`, `description_a` - First contestant's profile
    /// * `name_b`, `description_b` - Second contestant's profile
    async fn generate_challenge(
        &self,
        name_a: &str,
        description_a: &str,
        name_b: &str,
        description_b: &str,
    ) -> AgonResult<String>;

    /// Score two responses to a challenge.
    ///
    /// # Returns
    /// * `Ok(JudgeScores)` - Scores clamped to [0, 10] with reasoning
    /// * `Err(AgonError::Llm)` - If the provider call or parsing fails
    async fn judge(
        &self,
        challenge: &str,
        name_a: &str,
        response_a: &str,
        name_b: &str,
        response_b: &str,
    ) -> AgonResult<JudgeScores>;
}

// ============================================================================
// HASH EMBEDDING PROVIDER
// ============================================================================

/// Deterministic hash-based embedding provider.
///
/// Derives a fixed-dimension unit vector from the text alone, with no
/// network call: per dimension, a 31-multiplier rolling hash over the
/// lowercased text plus the dimension index, mapped through sin() into
/// [0, 1], then L2-normalized. Not semantic, but stable and cheap; any
/// real embedding model is a drop-in replacement.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    model_id: String,
    dimensions: i32,
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(128)
    }
}

impl HashEmbeddingProvider {
    /// Create a provider producing vectors of the given dimension.
    pub fn new(dimensions: i32) -> Self {
        Self {
            model_id: "hash-embed-v1".to_string(),
            dimensions,
        }
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let seed = text.to_lowercase();
        let seed = seed.trim();
        let mut data = Vec::with_capacity(self.dimensions as usize);

        for i in 0..self.dimensions {
            let chunk = format!("{}{}", seed, i);
            // 32-bit wrapping rolling hash over UTF-16 code units.
            let mut hash: i32 = 0;
            for unit in chunk.encode_utf16() {
                hash = hash.wrapping_mul(31).wrapping_add(unit as i32);
            }
            data.push(((hash as f64).sin() * 0.5 + 0.5) as f32);
        }

        let norm: f32 = data.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut data {
                *x /= norm;
            }
        }
        data
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> AgonResult<EmbeddingVector> {
        let data = self.generate(text);
        Ok(EmbeddingVector::new(data, self.model_id.clone()))
    }

    fn dimensions(&self) -> i32 {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// MOCK PROVIDERS
// ============================================================================

/// Mock judge for testing. Returns a fixed challenge and fixed scores.
#[derive(Debug, Clone)]
pub struct MockJudgeProvider {
    challenge: String,
    score_a: f64,
    score_b: f64,
}

impl MockJudgeProvider {
    /// Create a mock judge with the given fixed scores.
    pub fn new(score_a: f64, score_b: f64) -> Self {
        Self {
            challenge: "Is a rematch ever a fresh start?".to_string(),
            score_a,
            score_b,
        }
    }

    /// Override the fixed challenge topic.
    pub fn with_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = challenge.into();
        self
    }
}

#[async_trait]
impl JudgeProvider for MockJudgeProvider {
    async fn generate_challenge(
        &self,
        _name_a: &str,
        _description_a: &str,
        _name_b: &str,
        _description_b: &str,
    ) -> AgonResult<String> {
        Ok(self.challenge.clone())
    }

    async fn judge(
        &self,
        _challenge: &str,
        _name_a: &str,
        _response_a: &str,
        _name_b: &str,
        _response_b: &str,
    ) -> AgonResult<JudgeScores> {
        Ok(JudgeScores {
            score_a: self.score_a,
            score_b: self.score_b,
            reasoning: "Mock judging complete.".to_string(),
        }
        .clamped())
    }
}

/// Judge that always fails, for exercising fallback paths.
#[derive(Debug, Clone, Default)]
pub struct FailingJudgeProvider;

#[async_trait]
impl JudgeProvider for FailingJudgeProvider {
    async fn generate_challenge(
        &self,
        _name_a: &str,
        _description_a: &str,
        _name_b: &str,
        _description_b: &str,
    ) -> AgonResult<String> {
        Err(agon_core::AgonError::Llm(
            agon_core::LlmError::ProviderNotConfigured,
        ))
    }

    async fn judge(
        &self,
        _challenge: &str,
        _name_a: &str,
        _response_a: &str,
        _name_b: &str,
        _response_b: &str,
    ) -> AgonResult<JudgeScores> {
        Err(agon_core::AgonError::Llm(
            agon_core::LlmError::ProviderNotConfigured,
        ))
    }
}

/// Embedding provider that always fails, for exercising the degraded
/// registration path.
#[derive(Debug, Clone, Default)]
pub struct FailingEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for FailingEmbeddingProvider {
    async fn embed(&self, _text: &str) -> AgonResult<EmbeddingVector> {
        Err(agon_core::AgonError::Llm(
            agon_core::LlmError::EmbeddingFailed {
                reason: "provider unavailable".to_string(),
            },
        ))
    }

    fn dimensions(&self) -> i32 {
        0
    }

    fn model_id(&self) -> &str {
        "failing"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embedding_deterministic() {
        let provider = HashEmbeddingProvider::new(128);
        let v1 = provider.embed("strategy bot: plays the long game").await.unwrap();
        let v2 = provider.embed("strategy bot: plays the long game").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_hash_embedding_case_and_whitespace_insensitive() {
        let provider = HashEmbeddingProvider::new(128);
        let v1 = provider.embed("Strategy Bot").await.unwrap();
        let v2 = provider.embed("  strategy bot  ").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_hash_embedding_unit_norm() {
        let provider = HashEmbeddingProvider::new(128);
        let v = provider.embed("anything at all").await.unwrap();
        assert_eq!(v.dimensions, 128);
        let norm: f32 = v.data.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_hash_embedding_distinguishes_texts() {
        let provider = HashEmbeddingProvider::new(128);
        let v1 = provider.embed("chess strategist").await.unwrap();
        let v2 = provider.embed("poetry critic").await.unwrap();
        let sim = v1.cosine_similarity(&v2).unwrap();
        assert!(sim < 0.9999, "distinct texts produced identical vectors");
    }

    #[tokio::test]
    async fn test_self_similarity_is_one() {
        let provider = HashEmbeddingProvider::new(64);
        let v = provider.embed("self similar").await.unwrap();
        let sim = v.cosine_similarity(&v).unwrap();
        assert!((sim - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_judge_scores_clamped() {
        let scores = JudgeScores {
            score_a: 14.0,
            score_b: -3.0,
            reasoning: "out of range".to_string(),
        }
        .clamped();
        assert_eq!(scores.score_a, 10.0);
        assert_eq!(scores.score_b, 0.0);
    }

    #[test]
    fn test_fallback_scores_neutral() {
        let scores = JudgeScores::fallback();
        assert_eq!(scores.score_a, 5.0);
        assert_eq!(scores.score_b, 5.0);
        assert!(!scores.reasoning.is_empty());
    }

    #[tokio::test]
    async fn test_mock_judge_clamps() {
        let judge = MockJudgeProvider::new(12.0, 6.0);
        let scores = judge.judge("topic", "a", "ra", "b", "rb").await.unwrap();
        assert_eq!(scores.score_a, 10.0);
        assert_eq!(scores.score_b, 6.0);
    }

    #[tokio::test]
    async fn test_failing_providers_fail() {
        assert!(FailingJudgeProvider.generate_challenge("a", "", "b", "").await.is_err());
        assert!(FailingEmbeddingProvider.embed("x").await.is_err());
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every generated embedding is unit-normalized.
        #[test]
        fn prop_hash_embedding_unit_norm(text in ".*", dims in 1i32..256) {
            let provider = HashEmbeddingProvider::new(dims);
            let data = provider.generate(&text);
            prop_assert_eq!(data.len(), dims as usize);
            let norm: f32 = data.iter().map(|x| x * x).sum::<f32>().sqrt();
            prop_assert!((norm - 1.0).abs() < 1e-3);
        }

        /// Generation is a pure function of the text.
        #[test]
        fn prop_hash_embedding_deterministic(text in ".*") {
            let provider = HashEmbeddingProvider::new(64);
            prop_assert_eq!(provider.generate(&text), provider.generate(&text));
        }
    }
}
