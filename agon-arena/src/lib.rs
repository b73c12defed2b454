//! AGON Arena - Matchmaking and Match Lifecycle Engine
//!
//! The service layer that ties storage and LLM providers together:
//! agent registration, similarity-based matchmaking with an atomic
//! opponent claim, the response/judging/voting lifecycle, weighted
//! score finalization, and Elo rating updates.
//!
//! Concurrency model: every contested state transition is delegated to
//! a single conditional storage update, so any number of concurrent
//! callers produce exactly one winner per transition. Losing such a
//! race is a normal outcome and is reported as a quiet status, never an
//! error.

use agon_core::{
    calculate_elo, decide_winner, final_scores, round2, AgentRecord, AgonError, AgonResult,
    ArenaConfig, EmbeddingVector, EntityId, EntityType, MatchId, MatchOutcome, MatchPhase,
    MatchRecord, ResultTally, RuleError, Side, StorageError, Timestamp, VoteRecord, VoterKind,
    new_api_key,
};
use agon_llm::{EmbeddingProvider, JudgeProvider, JudgeScores, FALLBACK_CHALLENGE};
use agon_storage::ArenaStorage;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

// ============================================================================
// OPERATION RESULTS AND VIEWS
// ============================================================================

/// Who is casting a ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voter {
    /// A registered agent, identified and deduplicated.
    Agent(EntityId),
    /// An anonymous human observer.
    Human,
}

/// Result of a registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredAgent {
    pub agent_id: EntityId,
    pub api_key: String,
    pub elo: i32,
}

/// Result of a join request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum JoinOutcome {
    /// The caller is already bound to a match.
    AlreadyInMatch { match_id: MatchId },
    /// Queued; no opponent was secured on this call.
    Waiting { queue_size: usize },
    /// Paired and the match has started.
    Matched { match_id: MatchId },
}

/// Result of a response submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SubmitOutcome {
    /// Recorded; the opponent has not responded yet.
    Waiting,
    /// Both responses are in, judging ran, and voting is open.
    Judged { llm_score_a: f64, llm_score_b: f64 },
}

/// Judge scores, visible once judging has run.
#[derive(Debug, Clone, Serialize)]
pub struct JudgingView {
    pub llm_score_a: f64,
    pub llm_score_b: f64,
    pub llm_reasoning: String,
}

/// Vote tallies, visible once voting has opened.
#[derive(Debug, Clone, Serialize)]
pub struct VotingView {
    pub agent_votes_a: i32,
    pub agent_votes_b: i32,
    pub human_votes_a: i32,
    pub human_votes_b: i32,
    pub voting_deadline: Option<Timestamp>,
}

/// Final scores and winner, visible once the match is sealed.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeView {
    pub final_score_a: f64,
    pub final_score_b: f64,
    pub winner: MatchOutcome,
}

/// A contestant's view of its current match. Score and vote fields
/// appear only once the lifecycle has reached them.
#[derive(Debug, Clone, Serialize)]
pub struct MatchStatusView {
    pub match_id: MatchId,
    pub phase: MatchPhase,
    pub my_role: Side,
    pub opponent: String,
    pub challenge: String,
    pub my_response_submitted: bool,
    pub opponent_response_submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judging: Option<JudgingView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voting: Option<VotingView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeView>,
}

/// Where an agent currently stands.
#[derive(Debug, Clone, Serialize)]
pub enum AgentStatusView {
    /// Queued, waiting for an opponent.
    Waiting,
    /// Neither queued nor matched.
    Idle,
    /// Bound to a match.
    InMatch(MatchStatusView),
}

/// Full report of a finished match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub match_id: MatchId,
    pub challenge: String,
    pub agent_a_name: String,
    pub agent_b_name: String,
    pub response_a: Option<String>,
    pub response_b: Option<String>,
    pub llm_score_a: f64,
    pub llm_score_b: f64,
    pub llm_reasoning: String,
    pub agent_votes_a: i32,
    pub agent_votes_b: i32,
    pub human_votes_a: i32,
    pub human_votes_b: i32,
    pub final_score_a: f64,
    pub final_score_b: f64,
    pub winner: MatchOutcome,
}

/// Result lookup outcome.
#[derive(Debug, Clone, Serialize)]
pub enum MatchResultView {
    /// The caller is not in a match.
    Idle,
    /// The match is still running; check back after the deadline.
    Pending {
        match_id: MatchId,
        phase: MatchPhase,
        voting_deadline: Option<Timestamp>,
    },
    /// The match is sealed.
    Final(MatchReport),
}

/// Public view of a match, used by listings and the live feed.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub phase: MatchPhase,
    pub agent_a_name: String,
    pub agent_b_name: String,
    pub challenge: String,
    pub response_a: Option<String>,
    pub response_b: Option<String>,
    pub llm_score_a: f64,
    pub llm_score_b: f64,
    pub llm_reasoning: String,
    pub agent_votes_a: i32,
    pub agent_votes_b: i32,
    pub human_votes_a: i32,
    pub human_votes_b: i32,
    pub final_score_a: f64,
    pub final_score_b: f64,
    pub winner: Option<MatchOutcome>,
    pub voting_deadline: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<MatchRecord> for MatchSummary {
    fn from(m: MatchRecord) -> Self {
        Self {
            match_id: m.match_id,
            phase: m.phase,
            agent_a_name: m.agent_a_name,
            agent_b_name: m.agent_b_name,
            challenge: m.challenge,
            response_a: m.response_a,
            response_b: m.response_b,
            llm_score_a: m.llm_score_a,
            llm_score_b: m.llm_score_b,
            llm_reasoning: m.llm_reasoning,
            agent_votes_a: m.agent_votes_a,
            agent_votes_b: m.agent_votes_b,
            human_votes_a: m.human_votes_a,
            human_votes_b: m.human_votes_b,
            final_score_a: m.final_score_a,
            final_score_b: m.final_score_b,
            winner: m.winner,
            voting_deadline: m.voting_deadline,
            created_at: m.created_at,
        }
    }
}

/// One row of the leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub elo: i32,
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
}

/// Arena-wide counters for the live feed.
#[derive(Debug, Clone, Serialize)]
pub struct ArenaStats {
    pub queue_size: usize,
    pub total_agents: usize,
}

/// Snapshot of arena activity.
#[derive(Debug, Clone, Serialize)]
pub struct LiveSnapshot {
    pub active: Vec<MatchSummary>,
    pub recent: Vec<MatchSummary>,
    pub stats: ArenaStats,
}

// ============================================================================
// ARENA SERVICE
// ============================================================================

/// The arena engine.
///
/// Stateless apart from its storage handle; safe to clone behind an
/// `Arc` and call from any number of tasks.
pub struct ArenaService {
    storage: Arc<dyn ArenaStorage>,
    judge: Arc<dyn JudgeProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: ArenaConfig,
}

impl ArenaService {
    /// Create a new arena service.
    ///
    /// # Arguments
    /// * `storage` - Entity storage backend
    /// * `judge` - Challenge generation and response judging provider
    /// * `embedder` - Profile embedding provider
    /// * `config` - Validated arena configuration
    pub fn new(
        storage: Arc<dyn ArenaStorage>,
        judge: Arc<dyn JudgeProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: ArenaConfig,
    ) -> AgonResult<Self> {
        config.validate()?;
        Ok(Self {
            storage,
            judge,
            embedder,
            config,
        })
    }

    // === Registration and Authentication ===

    /// Register a new agent and hand out its API key.
    ///
    /// The profile embedding is best-effort: if the provider fails, the
    /// agent is registered with an empty embedding and simply ranks as
    /// "no similarity signal" during matchmaking.
    pub async fn register(
        &self,
        name: &str,
        description: &str,
    ) -> AgonResult<RegisteredAgent> {
        if self.storage.agent_get_by_name(name)?.is_some() {
            return Err(AgonError::Rule(RuleError::NameTaken {
                name: name.to_string(),
            }));
        }

        let embedding = match self
            .embedder
            .embed(&format!("{}: {}", name, description))
            .await
        {
            Ok(vector) => vector,
            Err(e) => {
                warn!(agent_name = %name, error = %e, "profile embedding failed, registering without one");
                EmbeddingVector::empty()
            }
        };

        let agent = AgentRecord::new(name, description, new_api_key(), embedding);
        self.storage.agent_insert(&agent)?;
        info!(agent_id = %agent.agent_id, agent_name = %name, "agent registered");

        Ok(RegisteredAgent {
            agent_id: agent.agent_id,
            api_key: agent.api_key,
            elo: agent.elo,
        })
    }

    /// Resolve an API key to its agent.
    pub fn authenticate(&self, api_key: &str) -> AgonResult<AgentRecord> {
        self.storage
            .agent_get_by_api_key(api_key)?
            .ok_or_else(|| {
                AgonError::Storage(StorageError::NotFound {
                    entity_type: EntityType::Agent,
                    id: "api_key".to_string(),
                })
            })
    }

    // === Matchmaking ===

    /// Enter the matchmaking queue and try to secure an opponent.
    ///
    /// Idempotent: an agent that is already matched or already queued
    /// gets its current standing back instead of an error.
    pub async fn join(&self, agent_id: EntityId) -> AgonResult<JoinOutcome> {
        let agent = self.require_agent(agent_id)?;

        if let Some(match_id) = agent.in_match.clone() {
            return Ok(JoinOutcome::AlreadyInMatch { match_id });
        }
        if agent.in_queue {
            return Ok(JoinOutcome::Waiting {
                queue_size: self.storage.agent_count_queued()?,
            });
        }

        self.storage.agent_enqueue(agent_id)?;

        if let Some(match_id) = self.try_matchmaking(&agent).await? {
            return Ok(JoinOutcome::Matched { match_id });
        }

        Ok(JoinOutcome::Waiting {
            queue_size: self.storage.agent_count_queued()?,
        })
    }

    /// Scan the queue for an opponent, claim them, and start a match.
    ///
    /// Candidates are ranked by cosine similarity of profile
    /// embeddings; candidates without a usable embedding carry no
    /// signal, and when nobody does, the longest-queued candidate is
    /// taken. Exactly one claim attempt is made: if a concurrent join
    /// snatches the chosen opponent first, the joiner stays queued
    /// rather than settling for a lower-ranked candidate.
    async fn try_matchmaking(&self, joiner: &AgentRecord) -> AgonResult<Option<MatchId>> {
        let candidates = self.storage.agent_list_queued(joiner.agent_id)?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let mut best: Option<&AgentRecord> = None;
        let mut best_sim = -1.0f32;
        if !joiner.embedding.is_empty() {
            for candidate in &candidates {
                if candidate.embedding.is_empty() {
                    continue;
                }
                let sim = joiner.embedding.cosine_similarity(&candidate.embedding)?;
                if sim > best_sim {
                    best_sim = sim;
                    best = Some(candidate);
                }
            }
        }
        let opponent = best.unwrap_or(&candidates[0]);

        if !self.storage.agent_claim_for_match(opponent.agent_id)? {
            info!(
                joiner = %joiner.name,
                opponent = %opponent.name,
                "opponent claimed by a concurrent join, staying in queue"
            );
            return Ok(None);
        }

        let challenge = match self
            .judge
            .generate_challenge(
                &joiner.name,
                &joiner.description,
                &opponent.name,
                &opponent.description,
            )
            .await
        {
            Ok(topic) => topic,
            Err(e) => {
                warn!(error = %e, "challenge generation failed, using fallback topic");
                FALLBACK_CHALLENGE.to_string()
            }
        };

        let m = MatchRecord::new(joiner, opponent, challenge);
        self.storage.match_insert(&m)?;
        self.storage.agent_assign_match(joiner.agent_id, &m.match_id)?;
        self.storage.agent_assign_match(opponent.agent_id, &m.match_id)?;

        info!(
            match_id = %m.match_id,
            agent_a = %joiner.name,
            agent_b = %opponent.name,
            similarity = best_sim,
            "match created"
        );
        Ok(Some(m.match_id))
    }

    // === Match Lifecycle ===

    /// Submit the caller's response to its current match.
    ///
    /// When this submission completes the pair, judging runs inline and
    /// voting opens. If the judge provider fails, neutral 5/5 scores
    /// are applied so the match still progresses.
    pub async fn submit_response(
        &self,
        agent_id: EntityId,
        text: &str,
    ) -> AgonResult<SubmitOutcome> {
        let agent = self.require_agent(agent_id)?;
        let match_id = agent
            .in_match
            .clone()
            .ok_or(AgonError::Rule(RuleError::NotInMatch { agent_id }))?;
        let m = self.require_match(&match_id)?;
        let side = m
            .side_of(agent_id)
            .ok_or(AgonError::Rule(RuleError::NotAContestant {
                agent_id,
                match_id: match_id.clone(),
            }))?;

        let updated = self.storage.match_set_response(&match_id, side, text)?;
        if !updated.has_both_responses() {
            return Ok(SubmitOutcome::Waiting);
        }

        // Both responses observed by this writer; judge and open voting.
        // The phase guard in match_begin_voting keeps this exactly-once.
        let scores = match self
            .judge
            .judge(
                &updated.challenge,
                &updated.agent_a_name,
                updated.response(Side::A).unwrap_or_default(),
                &updated.agent_b_name,
                updated.response(Side::B).unwrap_or_default(),
            )
            .await
        {
            Ok(scores) => scores,
            Err(e) => {
                warn!(match_id = %match_id, error = %e, "judging failed, applying neutral scores");
                JudgeScores::fallback()
            }
        };

        let deadline = Utc::now()
            + chrono::Duration::from_std(self.config.voting_window)
                .unwrap_or_else(|_| chrono::Duration::seconds(300));

        let applied = self.storage.match_begin_voting(
            &match_id,
            scores.score_a,
            scores.score_b,
            &scores.reasoning,
            deadline,
        )?;

        if applied {
            info!(
                match_id = %match_id,
                llm_score_a = scores.score_a,
                llm_score_b = scores.score_b,
                "judging complete, voting open"
            );
            return Ok(SubmitOutcome::Judged {
                llm_score_a: scores.score_a,
                llm_score_b: scores.score_b,
            });
        }

        // A concurrent caller judged first; report the stored verdict.
        let current = self.require_match(&match_id)?;
        Ok(SubmitOutcome::Judged {
            llm_score_a: current.llm_score_a,
            llm_score_b: current.llm_score_b,
        })
    }

    /// Cast a ballot on a match.
    ///
    /// Agent ballots require open voting, reject contestants of the
    /// match, and are unique per voter; human ballots are anonymous,
    /// accepted from the moment scores exist, and never deduplicated.
    pub fn cast_vote(
        &self,
        match_id: &str,
        voter: Voter,
        choice: Side,
        reason: &str,
    ) -> AgonResult<()> {
        let m = self.require_match(match_id)?;

        let (kind, record) = match voter {
            Voter::Agent(voter_id) => {
                if m.is_contestant(voter_id) {
                    return Err(AgonError::Rule(RuleError::SelfVote {
                        match_id: match_id.to_string(),
                        voter_id,
                    }));
                }
                if m.phase != MatchPhase::VotingOpen {
                    return Err(wrong_phase(match_id, m.phase, "vote"));
                }
                (
                    VoterKind::Agent,
                    VoteRecord::agent(match_id, voter_id, choice, reason),
                )
            }
            Voter::Human => {
                if m.phase != MatchPhase::VotingOpen && m.phase != MatchPhase::LlmJudged {
                    return Err(wrong_phase(match_id, m.phase, "vote"));
                }
                (VoterKind::Human, VoteRecord::human(match_id, choice))
            }
        };

        self.storage.vote_insert(&record).map_err(|e| match e {
            AgonError::Storage(StorageError::UniqueViolation { .. }) => {
                AgonError::Rule(RuleError::DuplicateVote {
                    match_id: match_id.to_string(),
                    voter_id: record.voter_id.unwrap_or_default(),
                })
            }
            other => other,
        })?;

        if !self.storage.match_record_vote(match_id, kind, choice)? {
            // The match sealed between the phase check and the count.
            return Err(wrong_phase(match_id, MatchPhase::Final, "vote"));
        }
        Ok(())
    }

    /// The caller's current standing: queued, idle, or a phase-gated
    /// view of its match.
    pub fn status(&self, agent_id: EntityId) -> AgonResult<AgentStatusView> {
        let agent = self.require_agent(agent_id)?;

        if agent.in_queue {
            return Ok(AgentStatusView::Waiting);
        }
        let match_id = match agent.in_match {
            Some(id) => id,
            None => return Ok(AgentStatusView::Idle),
        };
        let m = self.require_match(&match_id)?;
        let my_role = m
            .side_of(agent_id)
            .ok_or(AgonError::Rule(RuleError::NotAContestant {
                agent_id,
                match_id: match_id.clone(),
            }))?;

        let scores_visible = matches!(
            m.phase,
            MatchPhase::LlmJudged | MatchPhase::VotingOpen | MatchPhase::Final
        );
        let votes_visible = matches!(m.phase, MatchPhase::VotingOpen | MatchPhase::Final);

        let judging = scores_visible.then(|| JudgingView {
            llm_score_a: m.llm_score_a,
            llm_score_b: m.llm_score_b,
            llm_reasoning: m.llm_reasoning.clone(),
        });
        let voting = votes_visible.then(|| VotingView {
            agent_votes_a: m.agent_votes_a,
            agent_votes_b: m.agent_votes_b,
            human_votes_a: m.human_votes_a,
            human_votes_b: m.human_votes_b,
            voting_deadline: m.voting_deadline,
        });
        let outcome = m.winner.map(|winner| OutcomeView {
            final_score_a: m.final_score_a,
            final_score_b: m.final_score_b,
            winner,
        });

        Ok(AgentStatusView::InMatch(MatchStatusView {
            match_id: m.match_id.clone(),
            phase: m.phase,
            my_role,
            opponent: m.contestant_name(my_role.opposite()).to_string(),
            challenge: m.challenge.clone(),
            my_response_submitted: m.response(my_role).is_some(),
            opponent_response_submitted: m.response(my_role.opposite()).is_some(),
            judging,
            voting,
            outcome,
        }))
    }

    /// Fetch the result of the caller's match, finalizing it first if
    /// the voting deadline has passed.
    ///
    /// Finalization is lazy and idempotent: the first reader past the
    /// deadline seals the match and applies ratings; concurrent and
    /// later readers observe the sealed record.
    pub fn result(&self, agent_id: EntityId) -> AgonResult<MatchResultView> {
        let agent = self.require_agent(agent_id)?;
        let match_id = match agent.in_match {
            Some(id) => id,
            None => return Ok(MatchResultView::Idle),
        };
        let m = self.require_match(&match_id)?;

        if m.phase == MatchPhase::VotingOpen && m.deadline_passed(Utc::now()) {
            self.finalize(&m)?;
            let sealed = self.require_match(&match_id)?;
            return Ok(MatchResultView::Final(report(sealed)));
        }

        if m.phase == MatchPhase::Final {
            return Ok(MatchResultView::Final(report(m)));
        }

        Ok(MatchResultView::Pending {
            match_id: m.match_id,
            phase: m.phase,
            voting_deadline: m.voting_deadline,
        })
    }

    /// Seal a match: weighted scores, winner, rating updates.
    ///
    /// The conditional phase transition decides a single winner among
    /// concurrent finalizers; only that caller touches ratings.
    fn finalize(&self, m: &MatchRecord) -> AgonResult<()> {
        let (raw_a, raw_b) = final_scores(m, &self.config.score_weights);
        let winner = decide_winner(raw_a, raw_b, self.config.draw_margin);

        let sealed =
            self.storage
                .match_finalize(&m.match_id, round2(raw_a), round2(raw_b), winner)?;
        if !sealed {
            return Ok(());
        }

        let agent_a = self.require_agent(m.agent_a)?;
        let agent_b = self.require_agent(m.agent_b)?;
        let (new_a, new_b) = calculate_elo(agent_a.elo, agent_b.elo, winner);
        let (tally_a, tally_b) = match winner {
            MatchOutcome::A => (ResultTally::Win, ResultTally::Loss),
            MatchOutcome::B => (ResultTally::Loss, ResultTally::Win),
            MatchOutcome::Draw => (ResultTally::Draw, ResultTally::Draw),
        };
        self.storage.agent_apply_result(m.agent_a, new_a, tally_a)?;
        self.storage.agent_apply_result(m.agent_b, new_b, tally_b)?;

        info!(
            match_id = %m.match_id,
            winner = %format!("{:?}", winner),
            final_score_a = round2(raw_a),
            final_score_b = round2(raw_b),
            elo_a = new_a,
            elo_b = new_b,
            "match finalized"
        );
        Ok(())
    }

    // === Listings ===

    /// Agents ranked by rating.
    pub fn leaderboard(&self) -> AgonResult<Vec<LeaderboardEntry>> {
        let ranked = self
            .storage
            .agent_list_by_elo(self.config.leaderboard_limit)?;
        Ok(ranked
            .into_iter()
            .enumerate()
            .map(|(i, a)| LeaderboardEntry {
                rank: i + 1,
                name: a.name,
                elo: a.elo,
                wins: a.wins,
                losses: a.losses,
                draws: a.draws,
            })
            .collect())
    }

    /// Matches the caller could vote on: voting open, caller not a
    /// contestant.
    pub fn open_matches(&self, agent_id: EntityId) -> AgonResult<Vec<MatchSummary>> {
        let open = self
            .storage
            .match_list_by_phase(MatchPhase::VotingOpen, self.config.open_matches_limit)?;
        Ok(open
            .into_iter()
            .filter(|m| !m.is_contestant(agent_id))
            .map(MatchSummary::from)
            .collect())
    }

    /// Arena-wide activity snapshot.
    pub fn live(&self) -> AgonResult<LiveSnapshot> {
        let active = self
            .storage
            .match_list_active(self.config.active_matches_limit)?;
        let recent = self
            .storage
            .match_list_recent_final(self.config.recent_matches_limit)?;
        Ok(LiveSnapshot {
            active: active.into_iter().map(MatchSummary::from).collect(),
            recent: recent.into_iter().map(MatchSummary::from).collect(),
            stats: ArenaStats {
                queue_size: self.storage.agent_count_queued()?,
                total_agents: self.storage.agent_count()?,
            },
        })
    }

    /// Public view of a single match.
    pub fn match_detail(&self, match_id: &str) -> AgonResult<MatchSummary> {
        Ok(MatchSummary::from(self.require_match(match_id)?))
    }

    // === Helpers ===

    fn require_agent(&self, agent_id: EntityId) -> AgonResult<AgentRecord> {
        self.storage.agent_get(agent_id)?.ok_or_else(|| {
            AgonError::Storage(StorageError::NotFound {
                entity_type: EntityType::Agent,
                id: agent_id.to_string(),
            })
        })
    }

    fn require_match(&self, match_id: &str) -> AgonResult<MatchRecord> {
        self.storage.match_get(match_id)?.ok_or_else(|| {
            AgonError::Storage(StorageError::NotFound {
                entity_type: EntityType::Match,
                id: match_id.to_string(),
            })
        })
    }
}

fn wrong_phase(match_id: &str, phase: MatchPhase, action: &str) -> AgonError {
    AgonError::Rule(RuleError::WrongPhase {
        match_id: match_id.to_string(),
        phase,
        action: action.to_string(),
    })
}

fn report(m: MatchRecord) -> MatchReport {
    MatchReport {
        match_id: m.match_id,
        challenge: m.challenge,
        agent_a_name: m.agent_a_name,
        agent_b_name: m.agent_b_name,
        response_a: m.response_a,
        response_b: m.response_b,
        llm_score_a: m.llm_score_a,
        llm_score_b: m.llm_score_b,
        llm_reasoning: m.llm_reasoning,
        agent_votes_a: m.agent_votes_a,
        agent_votes_b: m.agent_votes_b,
        human_votes_a: m.human_votes_a,
        human_votes_b: m.human_votes_b,
        final_score_a: m.final_score_a,
        final_score_b: m.final_score_b,
        winner: m.winner.unwrap_or(MatchOutcome::Draw),
    }
}

// ============================================================================
// TESTS
// ============================================================================
