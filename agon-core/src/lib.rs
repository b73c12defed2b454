//! AGON Core - Entity Types and Contest Math
//!
//! Pure data structures and pure functions shared by every other crate.
//! This crate performs no I/O: storage backends, LLM providers, and the
//! arena engine all live elsewhere and depend on these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Match identifier: a short opaque string handed out to contestants
/// and voters instead of an internal entity id.
pub type MatchId = String;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Generate a new short opaque match identifier (8 hex chars).
pub fn new_match_id() -> MatchId {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Generate a new agent API key.
pub fn new_api_key() -> String {
    format!("agon_{}", Uuid::new_v4().simple())
}

// ============================================================================
// ENUMS
// ============================================================================

/// Entity type discriminator used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Agent,
    Match,
    Vote,
}

/// Lifecycle phase of a match. Phases only ever advance.
///
/// `LlmJudged` is a score-availability marker: the engine moves a match
/// from `Responding` straight to `VotingOpen` once judging completes,
/// carrying the LLM scores along, but asynchronous voting clients may
/// still observe and act on the intermediate phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchPhase {
    Matched,
    Responding,
    LlmJudged,
    VotingOpen,
    Final,
}

impl MatchPhase {
    fn rank(self) -> u8 {
        match self {
            MatchPhase::Matched => 0,
            MatchPhase::Responding => 1,
            MatchPhase::LlmJudged => 2,
            MatchPhase::VotingOpen => 3,
            MatchPhase::Final => 4,
        }
    }

    /// Whether a transition from `self` to `next` moves forward.
    pub fn can_advance_to(self, next: MatchPhase) -> bool {
        next.rank() > self.rank()
    }

    /// Whether the match is finished and immutable.
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchPhase::Final)
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchPhase::Matched => "MATCHED",
            MatchPhase::Responding => "RESPONDING",
            MatchPhase::LlmJudged => "LLM_JUDGED",
            MatchPhase::VotingOpen => "VOTING_OPEN",
            MatchPhase::Final => "FINAL",
        };
        f.write_str(s)
    }
}

/// Which seat a contestant occupies in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// Final outcome of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchOutcome {
    A,
    B,
    Draw,
}

/// Kind of voter that cast a ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoterKind {
    /// A registered agent that is not a contestant of the match.
    Agent,
    /// An anonymous human observer.
    Human,
}

/// Win/loss/draw bucket applied to an agent at finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultTally {
    Win,
    Loss,
    Draw,
}

// ============================================================================
// EMBEDDING VECTOR
// ============================================================================

/// Embedding vector with dynamic dimensions.
///
/// The arena only relies on the provider contract: deterministic for
/// identical input, fixed length, unit-normalized. Any real embedding
/// model is a drop-in replacement for the hash-based default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    /// The embedding data as a vector of f32 values.
    pub data: Vec<f32>,
    /// Identifier of the model that produced this embedding.
    pub model_id: String,
    /// Number of dimensions (must match data.len()).
    pub dimensions: i32,
}

impl EmbeddingVector {
    /// Create a new embedding vector with dimensions set from data length.
    pub fn new(data: Vec<f32>, model_id: String) -> Self {
        let dimensions = data.len() as i32;
        Self {
            data,
            model_id,
            dimensions,
        }
    }

    /// An empty embedding, used when embedding generation degraded.
    /// Candidates with empty embeddings are skipped during similarity
    /// ranking.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            model_id: String::new(),
            dimensions: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Compute cosine similarity with another embedding vector.
    ///
    /// # Returns
    /// * `Ok(f32)` - Cosine similarity in range [-1.0, 1.0]
    /// * `Err(AgonError::Vector)` - If dimensions don't match
    pub fn cosine_similarity(&self, other: &EmbeddingVector) -> AgonResult<f32> {
        if self.dimensions != other.dimensions {
            return Err(AgonError::Vector(VectorError::DimensionMismatch {
                expected: self.dimensions,
                got: other.dimensions,
            }));
        }

        let mut dot_product = 0.0f32;
        let mut norm_a = 0.0f32;
        let mut norm_b = 0.0f32;

        for (a, b) in self.data.iter().zip(other.data.iter()) {
            dot_product += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        let norm_a = norm_a.sqrt();
        let norm_b = norm_b.sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return Ok(0.0);
        }

        Ok(dot_product / (norm_a * norm_b))
    }

    /// Check if this vector has valid dimensions.
    pub fn is_valid(&self) -> bool {
        self.dimensions > 0 && self.data.len() == self.dimensions as usize
    }
}

// ============================================================================
// CORE ENTITY STRUCTS
// ============================================================================

/// Agent - identity and rating record.
///
/// An agent is in at most one of {idle, queued, matched} at any time:
/// `in_queue` and `in_match` are never both set. Storage mutations are
/// responsible for preserving that invariant; `is_consistent` asserts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub agent_id: EntityId,
    /// Unique display name.
    pub name: String,
    /// Free-text description, also the embedding source.
    pub description: String,
    /// Unique secret credential, format `agon_<hex>`.
    pub api_key: String,
    pub embedding: EmbeddingVector,
    pub elo: i32,
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
    pub in_queue: bool,
    pub in_match: Option<MatchId>,
    pub created_at: Timestamp,
}

/// Initial Elo rating for newly registered agents.
pub const INITIAL_ELO: i32 = 1200;

impl AgentRecord {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        api_key: impl Into<String>,
        embedding: EmbeddingVector,
    ) -> Self {
        Self {
            agent_id: new_entity_id(),
            name: name.into(),
            description: description.into(),
            api_key: api_key.into(),
            embedding,
            elo: INITIAL_ELO,
            wins: 0,
            losses: 0,
            draws: 0,
            in_queue: false,
            in_match: None,
            created_at: Utc::now(),
        }
    }

    /// Queued and not yet bound to a match - eligible as an opponent.
    pub fn is_available(&self) -> bool {
        self.in_queue && self.in_match.is_none()
    }

    /// The queue/match mutual-exclusivity invariant.
    pub fn is_consistent(&self) -> bool {
        !(self.in_queue && self.in_match.is_some())
    }
}

/// Match - a single contest between two agents.
///
/// Responses are set at most once each; `winner` and the final scores
/// are set exactly once, on the transition into `Final`. The record is
/// immutable after that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: MatchId,
    pub phase: MatchPhase,
    pub agent_a: EntityId,
    pub agent_b: EntityId,
    pub agent_a_name: String,
    pub agent_b_name: String,
    pub challenge: String,
    pub response_a: Option<String>,
    pub response_b: Option<String>,
    /// LLM judge scores in [0, 10]; 0.0 means "not yet judged".
    pub llm_score_a: f64,
    pub llm_score_b: f64,
    pub llm_reasoning: String,
    pub agent_votes_a: i32,
    pub agent_votes_b: i32,
    pub human_votes_a: i32,
    pub human_votes_b: i32,
    /// Normalized final scores in [0, 1], rounded to 2 decimal places.
    pub final_score_a: f64,
    pub final_score_b: f64,
    pub winner: Option<MatchOutcome>,
    pub voting_deadline: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MatchRecord {
    /// Create a match in `Responding` (the matchmaker passes through
    /// `Matched` implicitly).
    pub fn new(agent_a: &AgentRecord, agent_b: &AgentRecord, challenge: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            match_id: new_match_id(),
            phase: MatchPhase::Responding,
            agent_a: agent_a.agent_id,
            agent_b: agent_b.agent_id,
            agent_a_name: agent_a.name.clone(),
            agent_b_name: agent_b.name.clone(),
            challenge: challenge.into(),
            response_a: None,
            response_b: None,
            llm_score_a: 0.0,
            llm_score_b: 0.0,
            llm_reasoning: String::new(),
            agent_votes_a: 0,
            agent_votes_b: 0,
            human_votes_a: 0,
            human_votes_b: 0,
            final_score_a: 0.0,
            final_score_b: 0.0,
            winner: None,
            voting_deadline: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Which seat the given agent occupies, if any.
    pub fn side_of(&self, agent_id: EntityId) -> Option<Side> {
        if agent_id == self.agent_a {
            Some(Side::A)
        } else if agent_id == self.agent_b {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn is_contestant(&self, agent_id: EntityId) -> bool {
        self.side_of(agent_id).is_some()
    }

    pub fn response(&self, side: Side) -> Option<&str> {
        match side {
            Side::A => self.response_a.as_deref(),
            Side::B => self.response_b.as_deref(),
        }
    }

    pub fn contestant_name(&self, side: Side) -> &str {
        match side {
            Side::A => &self.agent_a_name,
            Side::B => &self.agent_b_name,
        }
    }

    pub fn has_both_responses(&self) -> bool {
        self.response_a.is_some() && self.response_b.is_some()
    }

    /// Whether the voting deadline exists and has passed at `now`.
    pub fn deadline_passed(&self, now: Timestamp) -> bool {
        self.voting_deadline.map(|d| now > d).unwrap_or(false)
    }
}

/// Vote - one ballot cast on a match.
///
/// Agent ballots are unique per (match, voter); human ballots are
/// anonymous and unconstrained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub vote_id: EntityId,
    pub match_id: MatchId,
    /// None for anonymous human votes.
    pub voter_id: Option<EntityId>,
    pub voter_kind: VoterKind,
    pub choice: Side,
    pub reason: String,
    pub created_at: Timestamp,
}

impl VoteRecord {
    pub fn agent(
        match_id: impl Into<MatchId>,
        voter_id: EntityId,
        choice: Side,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            vote_id: new_entity_id(),
            match_id: match_id.into(),
            voter_id: Some(voter_id),
            voter_kind: VoterKind::Agent,
            choice,
            reason: reason.into(),
            created_at: Utc::now(),
        }
    }

    pub fn human(match_id: impl Into<MatchId>, choice: Side) -> Self {
        Self {
            vote_id: new_entity_id(),
            match_id: match_id.into(),
            voter_id: None,
            voter_kind: VoterKind::Human,
            choice,
            reason: String::new(),
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// ELO CALCULATOR
// ============================================================================

/// K-factor for rating updates.
pub const ELO_K: f64 = 32.0;

/// Compute the post-match ratings for both contestants.
///
/// Standard logistic expected score with K=32. Pure function; the
/// caller persists the results.
///
/// # Returns
/// `(new_rating_a, new_rating_b)`
pub fn calculate_elo(rating_a: i32, rating_b: i32, outcome: MatchOutcome) -> (i32, i32) {
    let expected_a = 1.0 / (1.0 + 10f64.powf((rating_b - rating_a) as f64 / 400.0));
    let expected_b = 1.0 - expected_a;

    let (score_a, score_b) = match outcome {
        MatchOutcome::A => (1.0, 0.0),
        MatchOutcome::B => (0.0, 1.0),
        MatchOutcome::Draw => (0.5, 0.5),
    };

    let new_a = (rating_a as f64 + ELO_K * (score_a - expected_a)).round() as i32;
    let new_b = (rating_b as f64 + ELO_K * (score_b - expected_b)).round() as i32;
    (new_a, new_b)
}

// ============================================================================
// WEIGHTED SCORE FINALIZATION
// ============================================================================

/// Relative weights of the three scoring channels. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub llm: f64,
    pub agent_votes: f64,
    pub human_votes: f64,
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.llm + self.agent_votes + self.human_votes
    }
}

/// Round to 2 decimal places, the persisted final-score precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A channel with zero ballots contributes a neutral 0.5 to both sides.
fn vote_share(votes_for: i32, votes_against: i32) -> f64 {
    let total = votes_for + votes_against;
    if total > 0 {
        votes_for as f64 / total as f64
    } else {
        0.5
    }
}

/// Compute the weighted final scores for a match.
///
/// LLM scores are normalized from [0,10] to [0,1]; each vote channel is
/// normalized to the caster's share of that channel's total. Returns
/// unrounded values: the winner decision uses full precision, and the
/// caller applies `round2` when persisting.
///
/// # Returns
/// `(final_score_a, final_score_b)`
pub fn final_scores(m: &MatchRecord, weights: &ScoreWeights) -> (f64, f64) {
    let llm_a = m.llm_score_a / 10.0;
    let llm_b = m.llm_score_b / 10.0;

    let agent_a = vote_share(m.agent_votes_a, m.agent_votes_b);
    let agent_b = vote_share(m.agent_votes_b, m.agent_votes_a);

    let human_a = vote_share(m.human_votes_a, m.human_votes_b);
    let human_b = vote_share(m.human_votes_b, m.human_votes_a);

    let final_a = weights.llm * llm_a + weights.agent_votes * agent_a + weights.human_votes * human_a;
    let final_b = weights.llm * llm_b + weights.agent_votes * agent_b + weights.human_votes * human_b;

    (final_a, final_b)
}

/// Decide the winner from two final scores. Scores closer than
/// `draw_margin` are a draw.
pub fn decide_winner(final_a: f64, final_b: f64, draw_margin: f64) -> MatchOutcome {
    if (final_a - final_b).abs() < draw_margin {
        MatchOutcome::Draw
    } else if final_a > final_b {
        MatchOutcome::A
    } else {
        MatchOutcome::B
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: String },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Update failed for {entity_type:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_type: EntityType,
        id: String,
        reason: String,
    },

    #[error("Unique constraint violated on {constraint}: {key}")]
    UniqueViolation { constraint: String, key: String },
}

/// LLM provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("No LLM provider configured")]
    ProviderNotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Embedding failed: {reason}")]
    EmbeddingFailed { reason: String },
}

/// Contest rule violations. These reject the operation without
/// mutating any state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Match {match_id} is in phase {phase}, cannot {action}")]
    WrongPhase {
        match_id: MatchId,
        phase: MatchPhase,
        action: String,
    },

    #[error("Response already submitted for side {side} of match {match_id}")]
    ResponseAlreadySubmitted { match_id: MatchId, side: Side },

    #[error("Agent {voter_id} already voted on match {match_id}")]
    DuplicateVote { match_id: MatchId, voter_id: EntityId },

    #[error("Agent {voter_id} is a contestant of match {match_id} and cannot vote on it")]
    SelfVote { match_id: MatchId, voter_id: EntityId },

    #[error("Agent {agent_id} is not in a match")]
    NotInMatch { agent_id: EntityId },

    #[error("Agent {agent_id} is not a contestant of match {match_id}")]
    NotAContestant { agent_id: EntityId, match_id: MatchId },

    #[error("Agent name already registered: {name}")]
    NameTaken { name: String },
}

/// Vector operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VectorError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: i32, got: i32 },

    #[error("Invalid vector: {reason}")]
    InvalidVector { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all AGON errors.
#[derive(Debug, Clone, Error)]
pub enum AgonError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Rule violation: {0}")]
    Rule(#[from] RuleError),

    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for AGON operations.
pub type AgonResult<T> = Result<T, AgonError>;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Arena configuration. `standard()` carries the production constants;
/// `validate()` must pass before the config is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// How long voting stays open after judging completes.
    pub voting_window: Duration,
    /// Final scores closer than this are a draw.
    pub draw_margin: f64,
    /// Channel weights for final-score combination.
    pub score_weights: ScoreWeights,
    /// Dimensions the embedding provider must produce.
    pub embedding_dimensions: i32,
    /// Maximum leaderboard entries returned.
    pub leaderboard_limit: usize,
    /// Maximum active matches in a live snapshot.
    pub active_matches_limit: usize,
    /// Maximum recent finished matches in a live snapshot.
    pub recent_matches_limit: usize,
    /// Maximum open matches listed to a prospective voter.
    pub open_matches_limit: usize,
}

impl ArenaConfig {
    /// The production configuration: 5 minute voting window, 40/30/30
    /// channel weights, 0.02 draw margin, 128-dim embeddings.
    pub fn standard() -> Self {
        Self {
            voting_window: Duration::from_secs(5 * 60),
            draw_margin: 0.02,
            score_weights: ScoreWeights {
                llm: 0.4,
                agent_votes: 0.3,
                human_votes: 0.3,
            },
            embedding_dimensions: 128,
            leaderboard_limit: 50,
            active_matches_limit: 20,
            recent_matches_limit: 10,
            open_matches_limit: 10,
        }
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(AgonError::Config) if invalid.
    pub fn validate(&self) -> AgonResult<()> {
        if self.voting_window.is_zero() {
            return Err(AgonError::Config(ConfigError::InvalidValue {
                field: "voting_window".to_string(),
                value: format!("{:?}", self.voting_window),
                reason: "voting_window must be positive".to_string(),
            }));
        }

        if self.draw_margin <= 0.0 || self.draw_margin >= 1.0 {
            return Err(AgonError::Config(ConfigError::InvalidValue {
                field: "draw_margin".to_string(),
                value: self.draw_margin.to_string(),
                reason: "draw_margin must be in (0.0, 1.0)".to_string(),
            }));
        }

        let w = &self.score_weights;
        if w.llm < 0.0 || w.agent_votes < 0.0 || w.human_votes < 0.0 {
            return Err(AgonError::Config(ConfigError::InvalidValue {
                field: "score_weights".to_string(),
                value: format!("{:?}", w),
                reason: "weights must be non-negative".to_string(),
            }));
        }
        if (w.sum() - 1.0).abs() > 1e-9 {
            return Err(AgonError::Config(ConfigError::InvalidValue {
                field: "score_weights".to_string(),
                value: format!("{:?}", w),
                reason: "weights must sum to 1.0".to_string(),
            }));
        }

        if self.embedding_dimensions <= 0 {
            return Err(AgonError::Config(ConfigError::InvalidValue {
                field: "embedding_dimensions".to_string(),
                value: self.embedding_dimensions.to_string(),
                reason: "embedding_dimensions must be greater than 0".to_string(),
            }));
        }

        if self.leaderboard_limit == 0 {
            return Err(AgonError::Config(ConfigError::InvalidValue {
                field: "leaderboard_limit".to_string(),
                value: self.leaderboard_limit.to_string(),
                reason: "leaderboard_limit must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str) -> AgentRecord {
        AgentRecord::new(name, "a test agent", new_api_key(), EmbeddingVector::empty())
    }

    #[test]
    fn test_new_entity_id_is_v7() {
        let id = new_entity_id();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn test_match_id_is_short_opaque() {
        let id = new_match_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_api_key_prefix() {
        assert!(new_api_key().starts_with("agon_"));
    }

    #[test]
    fn test_phase_forward_only() {
        assert!(MatchPhase::Responding.can_advance_to(MatchPhase::VotingOpen));
        assert!(MatchPhase::VotingOpen.can_advance_to(MatchPhase::Final));
        assert!(!MatchPhase::VotingOpen.can_advance_to(MatchPhase::Responding));
        assert!(!MatchPhase::Final.can_advance_to(MatchPhase::Matched));
        assert!(MatchPhase::Final.is_terminal());
    }

    #[test]
    fn test_phase_serde_wire_format() {
        let s = serde_json::to_string(&MatchPhase::VotingOpen).unwrap();
        assert_eq!(s, "\"VOTING_OPEN\"");
        let s = serde_json::to_string(&MatchOutcome::Draw).unwrap();
        assert_eq!(s, "\"DRAW\"");
    }

    #[test]
    fn test_agent_record_initial_state() {
        let a = agent("tester");
        assert_eq!(a.elo, INITIAL_ELO);
        assert_eq!((a.wins, a.losses, a.draws), (0, 0, 0));
        assert!(!a.in_queue);
        assert!(a.in_match.is_none());
        assert!(a.is_consistent());
        assert!(!a.is_available());
    }

    #[test]
    fn test_match_side_lookup() {
        let a = agent("alpha");
        let b = agent("beta");
        let m = MatchRecord::new(&a, &b, "a topic");

        assert_eq!(m.phase, MatchPhase::Responding);
        assert_eq!(m.side_of(a.agent_id), Some(Side::A));
        assert_eq!(m.side_of(b.agent_id), Some(Side::B));
        assert_eq!(m.side_of(new_entity_id()), None);
        assert_eq!(m.contestant_name(Side::B), "beta");
        assert!(!m.has_both_responses());
    }

    #[test]
    fn test_deadline_passed() {
        let a = agent("alpha");
        let b = agent("beta");
        let mut m = MatchRecord::new(&a, &b, "a topic");
        let now = Utc::now();

        assert!(!m.deadline_passed(now));
        m.voting_deadline = Some(now - chrono::Duration::seconds(1));
        assert!(m.deadline_passed(now));
        m.voting_deadline = Some(now + chrono::Duration::seconds(60));
        assert!(!m.deadline_passed(now));
    }

    #[test]
    fn test_elo_even_ratings_win() {
        assert_eq!(calculate_elo(1200, 1200, MatchOutcome::A), (1216, 1184));
        assert_eq!(calculate_elo(1200, 1200, MatchOutcome::B), (1184, 1216));
    }

    #[test]
    fn test_elo_even_ratings_draw() {
        assert_eq!(calculate_elo(1200, 1200, MatchOutcome::Draw), (1200, 1200));
    }

    #[test]
    fn test_elo_upset_pays_more() {
        // The lower-rated winner gains more than 16 points.
        let (new_low, new_high) = calculate_elo(1000, 1400, MatchOutcome::A);
        assert!(new_low - 1000 > 16);
        assert!(1400 - new_high > 16);
    }

    #[test]
    fn test_final_scores_worked_example() {
        let a = agent("alpha");
        let b = agent("beta");
        let mut m = MatchRecord::new(&a, &b, "a topic");
        m.llm_score_a = 8.0;
        m.llm_score_b = 6.0;
        m.agent_votes_a = 3;
        m.agent_votes_b = 1;
        m.human_votes_a = 2;
        m.human_votes_b = 2;

        let (fa, fb) = final_scores(&m, &ArenaConfig::standard().score_weights);
        assert!((fa - 0.695).abs() < 1e-9);
        assert!((fb - 0.465).abs() < 1e-9);
        assert_eq!(decide_winner(fa, fb, 0.02), MatchOutcome::A);
    }

    #[test]
    fn test_final_scores_neutral_channels() {
        // No votes at all: both channels contribute 0.5 to each side.
        let a = agent("alpha");
        let b = agent("beta");
        let mut m = MatchRecord::new(&a, &b, "a topic");
        m.llm_score_a = 10.0;
        m.llm_score_b = 0.0;

        let (fa, fb) = final_scores(&m, &ArenaConfig::standard().score_weights);
        assert!((fa - 0.7).abs() < 1e-9);
        assert!((fb - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_decide_winner_draw_threshold() {
        assert_eq!(decide_winner(0.50, 0.51, 0.02), MatchOutcome::Draw);
        assert_eq!(decide_winner(0.695, 0.465, 0.02), MatchOutcome::A);
        assert_eq!(decide_winner(0.40, 0.60, 0.02), MatchOutcome::B);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let v1 = EmbeddingVector::new(vec![1.0, 0.0, 0.0], "test".to_string());
        let v2 = EmbeddingVector::new(vec![1.0, 0.0, 0.0], "test".to_string());
        let similarity = v1.cosine_similarity(&v2).unwrap();
        assert!((similarity - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        let v1 = EmbeddingVector::new(vec![1.0, 0.0, 0.0], "test".to_string());
        let v2 = EmbeddingVector::new(vec![1.0, 0.0], "test".to_string());
        assert!(matches!(
            v1.cosine_similarity(&v2),
            Err(AgonError::Vector(VectorError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn test_config_standard_is_valid() {
        assert!(ArenaConfig::standard().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_weights() {
        let mut config = ArenaConfig::standard();
        config.score_weights.llm = 0.9;
        let result = config.validate();
        assert!(matches!(
            result,
            Err(AgonError::Config(ConfigError::InvalidValue { field, .. })) if field == "score_weights"
        ));
    }

    #[test]
    fn test_config_rejects_zero_voting_window() {
        let mut config = ArenaConfig::standard();
        config.voting_window = Duration::ZERO;
        let result = config.validate();
        assert!(matches!(
            result,
            Err(AgonError::Config(ConfigError::InvalidValue { field, .. })) if field == "voting_window"
        ));
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
