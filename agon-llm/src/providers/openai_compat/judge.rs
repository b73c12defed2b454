//! Chat-based judge provider

use super::client::ChatClient;
use crate::providers::invalid_response;
use crate::{JudgeProvider, JudgeScores};
use agon_core::AgonResult;
use async_trait::async_trait;

/// Judge backed by an OpenAI-compatible chat model.
///
/// Generates debate topics from both contestants' profiles and scores
/// response pairs, asking the model for a strict JSON verdict.
#[derive(Debug)]
pub struct ChatJudgeProvider {
    client: ChatClient,
}

impl ChatJudgeProvider {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    /// Create a provider with the default judging model.
    pub fn with_default_model(api_key: impl Into<String>) -> Self {
        Self::new(ChatClient::new(api_key, "llama-3.1-8b-instant", 60))
    }
}

#[async_trait]
impl JudgeProvider for ChatJudgeProvider {
    async fn generate_challenge(
        &self,
        name_a: &str,
        description_a: &str,
        name_b: &str,
        description_b: &str,
    ) -> AgonResult<String> {
        let prompt = format!(
            "You are a debate moderator for an AI agent arena.\n\n\
             Two agents are about to debate:\n\
             - Agent A: \"{name_a}\" - {description_a}\n\
             - Agent B: \"{name_b}\" - {description_b}\n\n\
             Generate a single debate topic/question that:\n\
             1. Is relevant to BOTH agents' areas of expertise\n\
             2. Has no objectively correct answer (opinion/strategy based)\n\
             3. Is specific enough to generate interesting arguments\n\
             4. Is 1-2 sentences max\n\n\
             Return ONLY the debate topic, nothing else."
        );

        let topic = self.client.chat("You are a debate moderator.", &prompt).await?;
        if topic.trim().is_empty() {
            return Err(invalid_response("openai_compat", "empty challenge"));
        }
        Ok(topic.trim().to_string())
    }

    async fn judge(
        &self,
        challenge: &str,
        name_a: &str,
        response_a: &str,
        name_b: &str,
        response_b: &str,
    ) -> AgonResult<JudgeScores> {
        let prompt = format!(
            "You are a fair and impartial judge in an AI agent debate arena.\n\n\
             DEBATE TOPIC: \"{challenge}\"\n\n\
             AGENT A (\"{name_a}\") RESPONSE:\n{response_a}\n\n\
             AGENT B (\"{name_b}\") RESPONSE:\n{response_b}\n\n\
             Score each agent from 0-10 on:\n\
             - Reasoning quality (how logical and well-structured)\n\
             - Creativity (unique insights or approaches)\n\
             - Relevance (how well they address the topic)\n\n\
             Respond in this EXACT JSON format only:\n\
             {{\"scoreA\": <number 0-10>, \"scoreB\": <number 0-10>, \"reasoning\": \"<1-2 sentence explanation>\"}}"
        );

        let reply = self
            .client
            .chat(
                "You are an impartial debate judge. Respond ONLY in valid JSON.",
                &prompt,
            )
            .await?;

        parse_verdict(&reply)
    }
}

/// Parse the judge's JSON verdict. Missing or non-numeric scores fall
/// back to the neutral 5, and both scores are clamped to [0, 10].
fn parse_verdict(reply: &str) -> AgonResult<JudgeScores> {
    let parsed: serde_json::Value = serde_json::from_str(reply.trim())
        .map_err(|e| invalid_response("openai_compat", format!("verdict is not JSON: {}", e)))?;

    let score = |key: &str| -> f64 {
        parsed
            .get(key)
            .and_then(|v| v.as_f64())
            .filter(|s| s.is_finite() && *s != 0.0)
            .unwrap_or(5.0)
    };

    let reasoning = parsed
        .get("reasoning")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("Judging complete.")
        .to_string();

    Ok(JudgeScores {
        score_a: score("scoreA"),
        score_b: score("scoreB"),
        reasoning,
    }
    .clamped())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict_well_formed() {
        let scores =
            parse_verdict(r#"{"scoreA": 8, "scoreB": 6.5, "reasoning": "A argued better."}"#)
                .unwrap();
        assert_eq!(scores.score_a, 8.0);
        assert_eq!(scores.score_b, 6.5);
        assert_eq!(scores.reasoning, "A argued better.");
    }

    #[test]
    fn test_parse_verdict_clamps_out_of_range() {
        let scores = parse_verdict(r#"{"scoreA": 42, "scoreB": -2, "reasoning": "x"}"#).unwrap();
        assert_eq!(scores.score_a, 10.0);
        assert_eq!(scores.score_b, 0.0);
    }

    #[test]
    fn test_parse_verdict_missing_scores_default_neutral() {
        let scores = parse_verdict(r#"{"reasoning": "no numbers"}"#).unwrap();
        assert_eq!(scores.score_a, 5.0);
        assert_eq!(scores.score_b, 5.0);
    }

    #[test]
    fn test_parse_verdict_non_numeric_score_defaults_neutral() {
        let scores = parse_verdict(r#"{"scoreA": "eight", "scoreB": 6}"#).unwrap();
        assert_eq!(scores.score_a, 5.0);
        assert_eq!(scores.score_b, 6.0);
        assert_eq!(scores.reasoning, "Judging complete.");
    }

    #[test]
    fn test_parse_verdict_rejects_non_json() {
        assert!(parse_verdict("I refuse to answer in JSON").is_err());
    }
}
