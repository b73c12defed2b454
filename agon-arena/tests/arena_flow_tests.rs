//! End-to-End Arena Flow Tests
//!
//! Drives a full contest through the public service surface only:
//! register, join, respond, vote, and read the finalized result, the
//! way two agent clients and a few spectators would over a session.

use agon_arena::{
    AgentStatusView, ArenaService, JoinOutcome, MatchResultView, SubmitOutcome, Voter,
};
use agon_core::{AgonError, ArenaConfig, MatchOutcome, MatchPhase, RuleError, Side};
use agon_llm::{HashEmbeddingProvider, MockJudgeProvider};
use agon_storage::MemoryStorage;
use std::sync::Arc;
use std::time::Duration;

fn arena(score_a: f64, score_b: f64, voting_window: Duration) -> ArenaService {
    let mut config = ArenaConfig::standard();
    config.voting_window = voting_window;
    ArenaService::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(MockJudgeProvider::new(score_a, score_b)),
        Arc::new(HashEmbeddingProvider::new(128)),
        config,
    )
    .unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn full_match_from_registration_to_ratings() {
    init_tracing();
    let service = arena(8.0, 6.0, Duration::from_millis(5));

    // Two contestants and a spectator agent register.
    let first = service
        .register("strategist", "long-horizon planning arguments")
        .await
        .unwrap();
    let second = service
        .register("tactician", "short-horizon concrete calculation")
        .await
        .unwrap();
    let watcher = service
        .register("watcher", "votes on other agents' debates")
        .await
        .unwrap();

    // API keys authenticate back to their agents.
    assert_eq!(
        service.authenticate(&first.api_key).unwrap().agent_id,
        first.agent_id
    );

    // First joiner waits; the second joiner completes the pair.
    assert!(matches!(
        service.join(first.agent_id).await.unwrap(),
        JoinOutcome::Waiting { queue_size: 1 }
    ));
    let match_id = match service.join(second.agent_id).await.unwrap() {
        JoinOutcome::Matched { match_id } => match_id,
        other => panic!("expected a match, got {:?}", other),
    };

    // Both see the same challenge from their own seat.
    let view = match service.status(first.agent_id).unwrap() {
        AgentStatusView::InMatch(view) => view,
        other => panic!("expected in-match status, got {:?}", other),
    };
    assert_eq!(view.match_id, match_id);
    assert_eq!(view.phase, MatchPhase::Responding);
    assert_eq!(view.opponent, "tactician");
    assert!(!view.challenge.is_empty());

    // The second joiner holds seat A. First response waits, second
    // triggers judging and opens voting.
    assert_eq!(
        service
            .submit_response(second.agent_id, "adapt the plan every turn")
            .await
            .unwrap(),
        SubmitOutcome::Waiting
    );
    assert_eq!(
        service
            .submit_response(first.agent_id, "the plan survives contact")
            .await
            .unwrap(),
        SubmitOutcome::Judged {
            llm_score_a: 8.0,
            llm_score_b: 6.0
        }
    );

    // The spectator finds the match and votes; contestants cannot.
    let open = service.open_matches(watcher.agent_id).unwrap();
    assert_eq!(open.len(), 1);
    service
        .cast_vote(&match_id, Voter::Agent(watcher.agent_id), Side::A, "sharper")
        .unwrap();
    assert!(matches!(
        service.cast_vote(&match_id, Voter::Agent(first.agent_id), Side::B, ""),
        Err(AgonError::Rule(RuleError::SelfVote { .. }))
    ));
    // A second ballot from the same agent is rejected.
    assert!(matches!(
        service.cast_vote(&match_id, Voter::Agent(watcher.agent_id), Side::A, "again"),
        Err(AgonError::Rule(RuleError::DuplicateVote { .. }))
    ));
    // Humans vote anonymously and repeatedly.
    service.cast_vote(&match_id, Voter::Human, Side::A, "").unwrap();
    service.cast_vote(&match_id, Voter::Human, Side::B, "").unwrap();

    // Result reads finalize lazily once the window has passed.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let outcome = match service.result(first.agent_id).unwrap() {
        MatchResultView::Final(outcome) => outcome,
        other => panic!("expected final result, got {:?}", other),
    };
    // LLM 8/6, agent votes 1-0, human votes split: side A takes it.
    assert_eq!(outcome.winner, MatchOutcome::A);
    assert_eq!(outcome.agent_votes_a, 1);
    assert_eq!(outcome.human_votes_a, 1);
    assert_eq!(outcome.human_votes_b, 1);
    assert!(outcome.final_score_a > outcome.final_score_b);

    // Ratings moved: the winner (seat A, the second joiner) gained.
    let board = service.leaderboard().unwrap();
    assert_eq!(board.len(), 3);
    assert_eq!(board[0].name, "tactician");
    assert_eq!(board[0].elo, 1216);
    assert_eq!(board[0].wins, 1);
    let loser = board.iter().find(|e| e.name == "strategist").unwrap();
    assert_eq!(loser.elo, 1184);
    assert_eq!(loser.losses, 1);

    // Both contestants are released and can queue again.
    assert!(matches!(
        service.join(first.agent_id).await.unwrap(),
        JoinOutcome::Waiting { .. }
    ));
}

#[tokio::test]
async fn drawn_match_leaves_ratings_unchanged() {
    init_tracing();
    let service = arena(7.0, 7.0, Duration::from_millis(5));

    let first = service.register("mirror-a", "argues both sides").await.unwrap();
    let second = service.register("mirror-b", "argues both sides too").await.unwrap();
    service.join(first.agent_id).await.unwrap();
    match service.join(second.agent_id).await.unwrap() {
        JoinOutcome::Matched { .. } => {}
        other => panic!("expected a match, got {:?}", other),
    }

    service.submit_response(second.agent_id, "yes").await.unwrap();
    service.submit_response(first.agent_id, "also yes").await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let outcome = match service.result(first.agent_id).unwrap() {
        MatchResultView::Final(outcome) => outcome,
        other => panic!("expected final result, got {:?}", other),
    };
    assert_eq!(outcome.winner, MatchOutcome::Draw);

    for entry in service.leaderboard().unwrap() {
        assert_eq!(entry.elo, 1200);
        assert_eq!(entry.draws, 1);
    }
}

#[tokio::test]
async fn live_feed_tracks_active_and_finished_matches() {
    init_tracing();
    let service = arena(9.0, 3.0, Duration::from_millis(5));

    let first = service.register("one", "first debater").await.unwrap();
    let second = service.register("two", "second debater").await.unwrap();
    service.join(first.agent_id).await.unwrap();
    service.join(second.agent_id).await.unwrap();

    let snapshot = service.live().unwrap();
    assert_eq!(snapshot.active.len(), 1);
    assert!(snapshot.recent.is_empty());
    assert_eq!(snapshot.stats.total_agents, 2);

    service.submit_response(second.agent_id, "a").await.unwrap();
    service.submit_response(first.agent_id, "b").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    service.result(first.agent_id).unwrap();

    let snapshot = service.live().unwrap();
    assert!(snapshot.active.is_empty());
    assert_eq!(snapshot.recent.len(), 1);
    assert_eq!(snapshot.recent[0].phase, MatchPhase::Final);
    assert_eq!(snapshot.recent[0].winner, Some(MatchOutcome::A));
}
