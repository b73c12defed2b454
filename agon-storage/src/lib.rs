//! AGON Storage - Storage Trait and In-Memory Backend
//!
//! Defines the storage abstraction for AGON entities. Every method that
//! mutates state is atomic: the in-memory backend holds a single writer
//! lock for the duration of each call, so the compare-and-set updates,
//! unique-insert rejections, and counter increments the arena relies on
//! are race-free without any caller-side locking.

use agon_core::{
    AgentRecord, AgonError, AgonResult, EntityId, EntityType, MatchOutcome, MatchPhase,
    MatchRecord, ResultTally, RuleError, Side, StorageError, Timestamp, VoteRecord, VoterKind,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Storage trait for AGON entities.
///
/// Each method is a single atomic step. Methods that guard a state
/// transition (`agent_claim_for_match`, `match_begin_voting`,
/// `match_finalize`) return `Ok(false)` when the precondition no longer
/// holds; losing such a race is an expected outcome, not an error.
pub trait ArenaStorage: Send + Sync {
    // === Agent Operations ===

    /// Insert a new agent. Rejects duplicate id, name, or api key.
    fn agent_insert(&self, agent: &AgentRecord) -> AgonResult<()>;

    /// Get an agent by ID.
    fn agent_get(&self, id: EntityId) -> AgonResult<Option<AgentRecord>>;

    /// Get an agent by its API key.
    fn agent_get_by_api_key(&self, api_key: &str) -> AgonResult<Option<AgentRecord>>;

    /// Get an agent by its display name.
    fn agent_get_by_name(&self, name: &str) -> AgonResult<Option<AgentRecord>>;

    /// List agents that are queued and unmatched, excluding the given
    /// agent, in registration order.
    fn agent_list_queued(&self, exclude: EntityId) -> AgonResult<Vec<AgentRecord>>;

    /// Put an idle agent into the queue. Returns false if the agent is
    /// already queued or already in a match.
    fn agent_enqueue(&self, id: EntityId) -> AgonResult<bool>;

    /// Claim a queued agent as an opponent: clears `in_queue` iff the
    /// agent is still queued and unmatched. Returns false when the
    /// claim race was lost.
    fn agent_claim_for_match(&self, id: EntityId) -> AgonResult<bool>;

    /// Bind an agent to a match, clearing its queue flag.
    fn agent_assign_match(&self, id: EntityId, match_id: &str) -> AgonResult<()>;

    /// Apply a finalized result: set the new rating, bump the W/L/D
    /// tally, and release the agent from its match.
    fn agent_apply_result(&self, id: EntityId, new_rating: i32, tally: ResultTally)
        -> AgonResult<()>;

    /// Number of agents currently queued.
    fn agent_count_queued(&self) -> AgonResult<usize>;

    /// Agents sorted by rating descending, limited.
    fn agent_list_by_elo(&self, limit: usize) -> AgonResult<Vec<AgentRecord>>;

    /// Total number of registered agents.
    fn agent_count(&self) -> AgonResult<usize>;

    // === Match Operations ===

    /// Insert a new match. Rejects a duplicate match id.
    fn match_insert(&self, m: &MatchRecord) -> AgonResult<()>;

    /// Get a match by its public id.
    fn match_get(&self, match_id: &str) -> AgonResult<Option<MatchRecord>>;

    /// Record a contestant's response. Requires phase `Responding` and
    /// an empty slot for that side; returns the updated record so the
    /// caller can observe whether both responses are now present.
    fn match_set_response(&self, match_id: &str, side: Side, text: &str)
        -> AgonResult<MatchRecord>;

    /// Apply judge scores and open voting: transitions `Responding` to
    /// `VotingOpen`. Returns false when another caller got there first,
    /// in which case the scores are discarded.
    fn match_begin_voting(
        &self,
        match_id: &str,
        score_a: f64,
        score_b: f64,
        reasoning: &str,
        deadline: Timestamp,
    ) -> AgonResult<bool>;

    /// Increment one vote counter. Returns false when the match no
    /// longer accepts votes of the given kind.
    fn match_record_vote(&self, match_id: &str, kind: VoterKind, side: Side) -> AgonResult<bool>;

    /// Seal a match: transitions `VotingOpen` to `Final` with the given
    /// scores and winner. Returns false when the race was lost, in
    /// which case the caller must not apply rating updates.
    fn match_finalize(
        &self,
        match_id: &str,
        final_a: f64,
        final_b: f64,
        winner: MatchOutcome,
    ) -> AgonResult<bool>;

    /// List matches in a given phase, newest first.
    fn match_list_by_phase(&self, phase: MatchPhase, limit: usize) -> AgonResult<Vec<MatchRecord>>;

    /// List unfinished matches, newest first.
    fn match_list_active(&self, limit: usize) -> AgonResult<Vec<MatchRecord>>;

    /// List finished matches, most recently finished first.
    fn match_list_recent_final(&self, limit: usize) -> AgonResult<Vec<MatchRecord>>;

    // === Vote Operations ===

    /// Insert a ballot. Rejects a second agent ballot for the same
    /// (match, voter) pair; human ballots are unconstrained.
    fn vote_insert(&self, vote: &VoteRecord) -> AgonResult<()>;
}

// ============================================================================
// IN-MEMORY STORAGE
// ============================================================================

/// Thread-safe in-memory storage.
///
/// The reference backend for single-process deployments and for tests.
/// Uniqueness checks and conditional updates happen under the write
/// lock of the map they touch, which makes them atomic.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    agents: Arc<RwLock<HashMap<EntityId, AgentRecord>>>,
    matches: Arc<RwLock<HashMap<String, MatchRecord>>>,
    votes: Arc<RwLock<HashMap<EntityId, VoteRecord>>>,
}

impl MemoryStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.agents.write().unwrap().clear();
        self.matches.write().unwrap().clear();
        self.votes.write().unwrap().clear();
    }

    /// Get count of stored matches.
    pub fn match_count(&self) -> usize {
        self.matches.read().unwrap().len()
    }

    /// Get count of stored ballots.
    pub fn vote_count(&self) -> usize {
        self.votes.read().unwrap().len()
    }
}

fn not_found(entity_type: EntityType, id: impl ToString) -> AgonError {
    AgonError::Storage(StorageError::NotFound {
        entity_type,
        id: id.to_string(),
    })
}

impl ArenaStorage for MemoryStorage {
    // === Agent Operations ===

    fn agent_insert(&self, agent: &AgentRecord) -> AgonResult<()> {
        let mut agents = self.agents.write().unwrap();
        if agents.contains_key(&agent.agent_id) {
            return Err(AgonError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Agent,
                reason: "already exists".to_string(),
            }));
        }
        if agents.values().any(|a| a.name == agent.name) {
            return Err(AgonError::Storage(StorageError::UniqueViolation {
                constraint: "agent.name".to_string(),
                key: agent.name.clone(),
            }));
        }
        if agents.values().any(|a| a.api_key == agent.api_key) {
            return Err(AgonError::Storage(StorageError::UniqueViolation {
                constraint: "agent.api_key".to_string(),
                key: agent.api_key.clone(),
            }));
        }
        agents.insert(agent.agent_id, agent.clone());
        Ok(())
    }

    fn agent_get(&self, id: EntityId) -> AgonResult<Option<AgentRecord>> {
        let agents = self.agents.read().unwrap();
        Ok(agents.get(&id).cloned())
    }

    fn agent_get_by_api_key(&self, api_key: &str) -> AgonResult<Option<AgentRecord>> {
        let agents = self.agents.read().unwrap();
        Ok(agents.values().find(|a| a.api_key == api_key).cloned())
    }

    fn agent_get_by_name(&self, name: &str) -> AgonResult<Option<AgentRecord>> {
        let agents = self.agents.read().unwrap();
        Ok(agents.values().find(|a| a.name == name).cloned())
    }

    fn agent_list_queued(&self, exclude: EntityId) -> AgonResult<Vec<AgentRecord>> {
        let agents = self.agents.read().unwrap();
        let mut queued: Vec<AgentRecord> = agents
            .values()
            .filter(|a| a.is_available() && a.agent_id != exclude)
            .cloned()
            .collect();
        // UUIDv7 ids sort by creation time, giving registration order.
        queued.sort_by_key(|a| a.agent_id);
        Ok(queued)
    }

    fn agent_enqueue(&self, id: EntityId) -> AgonResult<bool> {
        let mut agents = self.agents.write().unwrap();
        let agent = agents
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Agent, id))?;
        if agent.in_queue || agent.in_match.is_some() {
            return Ok(false);
        }
        agent.in_queue = true;
        Ok(true)
    }

    fn agent_claim_for_match(&self, id: EntityId) -> AgonResult<bool> {
        let mut agents = self.agents.write().unwrap();
        let agent = agents
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Agent, id))?;
        if !agent.is_available() {
            return Ok(false);
        }
        agent.in_queue = false;
        Ok(true)
    }

    fn agent_assign_match(&self, id: EntityId, match_id: &str) -> AgonResult<()> {
        let mut agents = self.agents.write().unwrap();
        let agent = agents
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Agent, id))?;
        agent.in_queue = false;
        agent.in_match = Some(match_id.to_string());
        Ok(())
    }

    fn agent_apply_result(
        &self,
        id: EntityId,
        new_rating: i32,
        tally: ResultTally,
    ) -> AgonResult<()> {
        let mut agents = self.agents.write().unwrap();
        let agent = agents
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Agent, id))?;
        agent.elo = new_rating;
        match tally {
            ResultTally::Win => agent.wins += 1,
            ResultTally::Loss => agent.losses += 1,
            ResultTally::Draw => agent.draws += 1,
        }
        agent.in_match = None;
        Ok(())
    }

    fn agent_count_queued(&self) -> AgonResult<usize> {
        let agents = self.agents.read().unwrap();
        Ok(agents.values().filter(|a| a.is_available()).count())
    }

    fn agent_list_by_elo(&self, limit: usize) -> AgonResult<Vec<AgentRecord>> {
        let agents = self.agents.read().unwrap();
        let mut ranked: Vec<AgentRecord> = agents.values().cloned().collect();
        ranked.sort_by(|a, b| b.elo.cmp(&a.elo).then(a.agent_id.cmp(&b.agent_id)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    fn agent_count(&self) -> AgonResult<usize> {
        let agents = self.agents.read().unwrap();
        Ok(agents.len())
    }

    // === Match Operations ===

    fn match_insert(&self, m: &MatchRecord) -> AgonResult<()> {
        let mut matches = self.matches.write().unwrap();
        if matches.contains_key(&m.match_id) {
            return Err(AgonError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Match,
                reason: "already exists".to_string(),
            }));
        }
        matches.insert(m.match_id.clone(), m.clone());
        Ok(())
    }

    fn match_get(&self, match_id: &str) -> AgonResult<Option<MatchRecord>> {
        let matches = self.matches.read().unwrap();
        Ok(matches.get(match_id).cloned())
    }

    fn match_set_response(
        &self,
        match_id: &str,
        side: Side,
        text: &str,
    ) -> AgonResult<MatchRecord> {
        let mut matches = self.matches.write().unwrap();
        let m = matches
            .get_mut(match_id)
            .ok_or_else(|| not_found(EntityType::Match, match_id))?;

        if m.phase != MatchPhase::Responding {
            return Err(AgonError::Rule(RuleError::WrongPhase {
                match_id: match_id.to_string(),
                phase: m.phase,
                action: "submit a response".to_string(),
            }));
        }
        let slot = match side {
            Side::A => &mut m.response_a,
            Side::B => &mut m.response_b,
        };
        if slot.is_some() {
            return Err(AgonError::Rule(RuleError::ResponseAlreadySubmitted {
                match_id: match_id.to_string(),
                side,
            }));
        }
        *slot = Some(text.to_string());
        m.updated_at = chrono::Utc::now();
        Ok(m.clone())
    }

    fn match_begin_voting(
        &self,
        match_id: &str,
        score_a: f64,
        score_b: f64,
        reasoning: &str,
        deadline: Timestamp,
    ) -> AgonResult<bool> {
        let mut matches = self.matches.write().unwrap();
        let m = matches
            .get_mut(match_id)
            .ok_or_else(|| not_found(EntityType::Match, match_id))?;

        if m.phase != MatchPhase::Responding {
            return Ok(false);
        }
        m.llm_score_a = score_a;
        m.llm_score_b = score_b;
        m.llm_reasoning = reasoning.to_string();
        m.voting_deadline = Some(deadline);
        m.phase = MatchPhase::VotingOpen;
        m.updated_at = chrono::Utc::now();
        Ok(true)
    }

    fn match_record_vote(&self, match_id: &str, kind: VoterKind, side: Side) -> AgonResult<bool> {
        let mut matches = self.matches.write().unwrap();
        let m = matches
            .get_mut(match_id)
            .ok_or_else(|| not_found(EntityType::Match, match_id))?;

        let accepts = match kind {
            VoterKind::Agent => m.phase == MatchPhase::VotingOpen,
            VoterKind::Human => {
                m.phase == MatchPhase::VotingOpen || m.phase == MatchPhase::LlmJudged
            }
        };
        if !accepts {
            return Ok(false);
        }
        match (kind, side) {
            (VoterKind::Agent, Side::A) => m.agent_votes_a += 1,
            (VoterKind::Agent, Side::B) => m.agent_votes_b += 1,
            (VoterKind::Human, Side::A) => m.human_votes_a += 1,
            (VoterKind::Human, Side::B) => m.human_votes_b += 1,
        }
        m.updated_at = chrono::Utc::now();
        Ok(true)
    }

    fn match_finalize(
        &self,
        match_id: &str,
        final_a: f64,
        final_b: f64,
        winner: MatchOutcome,
    ) -> AgonResult<bool> {
        let mut matches = self.matches.write().unwrap();
        let m = matches
            .get_mut(match_id)
            .ok_or_else(|| not_found(EntityType::Match, match_id))?;

        if m.phase != MatchPhase::VotingOpen {
            return Ok(false);
        }
        m.final_score_a = final_a;
        m.final_score_b = final_b;
        m.winner = Some(winner);
        m.phase = MatchPhase::Final;
        m.updated_at = chrono::Utc::now();
        Ok(true)
    }

    fn match_list_by_phase(&self, phase: MatchPhase, limit: usize) -> AgonResult<Vec<MatchRecord>> {
        let matches = self.matches.read().unwrap();
        let mut found: Vec<MatchRecord> = matches
            .values()
            .filter(|m| m.phase == phase)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(limit);
        Ok(found)
    }

    fn match_list_active(&self, limit: usize) -> AgonResult<Vec<MatchRecord>> {
        let matches = self.matches.read().unwrap();
        let mut active: Vec<MatchRecord> = matches
            .values()
            .filter(|m| !m.phase.is_terminal())
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        active.truncate(limit);
        Ok(active)
    }

    fn match_list_recent_final(&self, limit: usize) -> AgonResult<Vec<MatchRecord>> {
        let matches = self.matches.read().unwrap();
        let mut finished: Vec<MatchRecord> = matches
            .values()
            .filter(|m| m.phase.is_terminal())
            .cloned()
            .collect();
        finished.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        finished.truncate(limit);
        Ok(finished)
    }

    // === Vote Operations ===

    fn vote_insert(&self, vote: &VoteRecord) -> AgonResult<()> {
        let mut votes = self.votes.write().unwrap();
        if let Some(voter_id) = vote.voter_id {
            let duplicate = votes
                .values()
                .any(|v| v.match_id == vote.match_id && v.voter_id == Some(voter_id));
            if duplicate {
                return Err(AgonError::Storage(StorageError::UniqueViolation {
                    constraint: "vote.match_id+voter_id".to_string(),
                    key: format!("{}:{}", vote.match_id, voter_id),
                }));
            }
        }
        votes.insert(vote.vote_id, vote.clone());
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
