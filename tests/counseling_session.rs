//! Integration tests for full counseling sessions.
//!
//! These tests drive the orchestrator through complete turns:
//! 1. First turn: profile stored, roster routed, simple reply
//! 2. Subsequent turns: phase advance, expert fan-out, composed reply
//! 3. Degraded paths: missing roster, failing experts, failing composer
//!
//! Uses the mock provider with in-memory and file-backed stores.

use std::sync::Arc;
use tempfile::TempDir;

use counsel_swarm::adapters::ai::{MockAIProvider, MockError};
use counsel_swarm::adapters::storage::{FileSessionStore, InMemorySessionStore};
use counsel_swarm::application::{
    CounselingError, CounselingOrchestrator, OrchestratorSettings, TurnCommand,
};
use counsel_swarm::domain::counseling::{
    default_roster, CounselingPhase, CounselingState, History, HistoryEntry, Role,
    SelectedExperts, UserProfile,
};
use counsel_swarm::domain::foundation::SessionId;
use counsel_swarm::ports::{RequestPurpose, SessionStore};

// =============================================================================
// Test Infrastructure
// =============================================================================

const ROUTER_REPLY: &str = r#"["Financial Psychology Expert", "Gottman Method Expert", "CBT Expert"]"#;

fn session(id: &str) -> SessionId {
    SessionId::new(id).unwrap()
}

fn profile() -> UserProfile {
    UserProfile::new().with_field("duration", "2 years")
}

fn provider() -> MockAIProvider {
    MockAIProvider::new()
        .respond_to(RequestPurpose::Routing, ROUTER_REPLY)
        .respond_to(RequestPurpose::FirstReply, "Thank you for telling me. What happens when money comes up?")
        .respond_to(RequestPurpose::FinalReply, "I hear how tiring this is for both of you.")
}

fn orchestrator(mock: &MockAIProvider, store: Arc<dyn SessionStore>) -> CounselingOrchestrator {
    CounselingOrchestrator::new(Arc::new(mock.clone()), store, OrchestratorSettings::default())
}

/// Seeds a session as if `turn_count` turns had completed.
async fn seed_session(store: &InMemorySessionStore, id: &SessionId, turn_count: u32) {
    let mut history = History::new();
    for n in 0..turn_count {
        history = history.with_turn(format!("question {}", n), format!("answer {}", n));
    }
    store.put_history(id, &history).await.unwrap();
    store.put_profile(id, &profile()).await.unwrap();
    store
        .put_selected_experts(id, &SelectedExperts::from_names(["Gottman Method Expert", "Lawyer Expert"]))
        .await
        .unwrap();
    store
        .put_counseling_state(
            id,
            &CounselingState {
                phase: CounselingPhase::for_turn(turn_count),
                turn_count,
                started: true,
            },
        )
        .await
        .unwrap();
}

// =============================================================================
// First turn
// =============================================================================

#[tokio::test]
async fn first_turn_initializes_session() {
    let mock = provider();
    let store = InMemorySessionStore::new();
    let orch = orchestrator(&mock, Arc::new(store.clone()));
    let id = session("new-session");

    let result = orch
        .handle_turn(TurnCommand::new(id.clone(), "we keep fighting about money").with_profile(profile()))
        .await
        .unwrap();

    let history = store.get_history(&id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.entries()[0], HistoryEntry::user("we keep fighting about money"));
    assert_eq!(history.entries()[1].role, Role::Agent);
    assert_eq!(history.entries()[1].text, result.reply);

    let state = store.get_counseling_state(&id).await.unwrap();
    assert_eq!((state.phase, state.turn_count), (CounselingPhase::Exploration, 1));

    let experts = store.get_selected_experts(&id).await.unwrap().unwrap();
    assert!(!experts.is_empty());
    assert_eq!(experts.names()[0], "Financial Psychology Expert");

    assert_eq!(store.get_profile(&id).await.unwrap(), Some(profile()));
    assert!(mock.analyzed_experts().is_empty());
    assert!(mock.calls_for(&RequestPurpose::FinalReply).is_empty());
}

#[tokio::test]
async fn unparsable_router_reply_uses_default_roster() {
    let mock = MockAIProvider::new().respond_to(RequestPurpose::Routing, "The couple needs help with money.");
    let store = InMemorySessionStore::new();
    let orch = orchestrator(&mock, Arc::new(store.clone()));
    let id = session("fallback");

    orch.handle_turn(TurnCommand::new(id.clone(), "hello").with_profile(profile()))
        .await
        .unwrap();

    let experts = store.get_selected_experts(&id).await.unwrap().unwrap();
    assert_eq!(experts, default_roster());
    assert_eq!(experts.len(), 3);
    assert_eq!(experts.known_experts().len(), 3);
}

// =============================================================================
// Subsequent turns
// =============================================================================

#[tokio::test]
async fn third_turn_enters_insight_with_fixed_roster() {
    let mock = provider();
    let store = InMemorySessionStore::new();
    let id = session("turn-three");
    seed_session(&store, &id, 2).await;
    let orch = orchestrator(&mock, Arc::new(store.clone()));

    let result = orch
        .handle_turn(TurnCommand::new(id.clone(), "it happened again"))
        .await
        .unwrap();

    assert_eq!(result.phase, CounselingPhase::Insight);
    assert_eq!(result.turn_count, 3);
    assert!(result.phase_changed);
    assert_eq!(mock.analyzed_experts(), ["Gottman Method Expert", "Lawyer Expert"]);
    assert!(mock.calls_for(&RequestPurpose::Routing).is_empty());
    assert_eq!(
        store.get_selected_experts(&id).await.unwrap().unwrap().names(),
        ["Gottman Method Expert", "Lawyer Expert"]
    );

    let state = store.get_counseling_state(&id).await.unwrap();
    assert_eq!((state.phase, state.turn_count), (CounselingPhase::Insight, 3));
    assert_eq!(store.get_history(&id).await.unwrap().len(), 6);
}

#[tokio::test]
async fn final_prompt_labels_each_report() {
    let mock = provider()
        .respond_to(
            RequestPurpose::ExpertAnalysis("Gottman Method Expert".into()),
            "Gottman Method Analysis Report: criticism and defensiveness.",
        )
        .respond_to(
            RequestPurpose::ExpertAnalysis("Lawyer Expert".into()),
            "Legal Perspective: no red flags.",
        );
    let store = InMemorySessionStore::new();
    let id = session("labels");
    seed_session(&store, &id, 1).await;

    orchestrator(&mock, Arc::new(store.clone()))
        .handle_turn(TurnCommand::new(id, "what should I do?"))
        .await
        .unwrap();

    let prompt = mock.calls_for(&RequestPurpose::FinalReply)[0].prompt_text();
    assert!(prompt.contains("--- Gottman Method Expert Report ---\nGottman Method Analysis Report"));
    assert!(prompt.contains("--- Lawyer Expert Report ---\nLegal Perspective"));
    assert!(prompt.contains("duration: 2 years"));
    assert!(prompt.contains("what should I do?"));
}

#[tokio::test]
async fn phases_progress_through_a_whole_session() {
    let mock = provider();
    let store = InMemorySessionStore::new();
    let orch = orchestrator(&mock, Arc::new(store.clone()));
    let id = session("whole");

    let mut phases = Vec::new();
    for n in 0..6 {
        let mut cmd = TurnCommand::new(id.clone(), format!("message {}", n));
        if n == 0 {
            cmd = cmd.with_profile(profile());
        }
        phases.push(orch.handle_turn(cmd).await.unwrap().phase);
    }

    use CounselingPhase::*;
    assert_eq!(phases, [Exploration, Exploration, Insight, Insight, Action, Action]);
    assert_eq!(store.get_history(&id).await.unwrap().len(), 12);
    assert_eq!(mock.calls_for(&RequestPurpose::Routing).len(), 1);
}

// =============================================================================
// Degraded paths
// =============================================================================

#[tokio::test]
async fn missing_roster_still_produces_reply() {
    let mock = provider();
    let store = InMemorySessionStore::new();
    let id = session("no-roster");
    store
        .put_history(&id, &History::new().with_turn("hi", "hello"))
        .await
        .unwrap();
    store
        .put_counseling_state(&id, &CounselingState::after_first_turn())
        .await
        .unwrap();

    let result = orchestrator(&mock, Arc::new(store.clone()))
        .handle_turn(TurnCommand::new(id.clone(), "are you there?"))
        .await
        .unwrap();

    assert!(!result.reply.is_empty());
    assert!(mock.analyzed_experts().is_empty());
    let prompt = mock.calls_for(&RequestPurpose::FinalReply)[0].prompt_text();
    assert!(prompt.contains("No expert reports were generated for this turn."));
    assert_eq!(store.get_history(&id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn failing_expert_is_marked_and_turn_completes() {
    let mock = provider().fail_on(
        RequestPurpose::ExpertAnalysis("Lawyer Expert".into()),
        MockError::Timeout { timeout_secs: 60 },
    );
    let store = InMemorySessionStore::new();
    let id = session("partial");
    seed_session(&store, &id, 1).await;

    let result = orchestrator(&mock, Arc::new(store.clone()))
        .handle_turn(TurnCommand::new(id.clone(), "help"))
        .await
        .unwrap();

    assert_eq!(result.reply, "I hear how tiring this is for both of you.");
    let prompt = mock.calls_for(&RequestPurpose::FinalReply)[0].prompt_text();
    assert!(prompt.contains("--- Gottman Method Expert Report ---\nMock response"));
    assert!(prompt.contains("--- Lawyer Expert Report ---\nError during analysis:"));
}

#[tokio::test]
async fn composer_failure_leaves_session_untouched() {
    let mock = MockAIProvider::new().fail_on(
        RequestPurpose::FinalReply,
        MockError::RateLimited { retry_after_secs: 20 },
    );
    let store = InMemorySessionStore::new();
    let id = session("composer-down");
    seed_session(&store, &id, 2).await;
    let history_before = store.get_history(&id).await.unwrap();
    let state_before = store.get_counseling_state(&id).await.unwrap();

    let err = orchestrator(&mock, Arc::new(store.clone()))
        .handle_turn(TurnCommand::new(id.clone(), "hello?"))
        .await
        .unwrap_err();

    assert!(matches!(err, CounselingError::Composer(_)));
    assert!(err.user_message().contains("20 seconds"));
    assert_eq!(store.get_history(&id).await.unwrap(), history_before);
    assert_eq!(store.get_counseling_state(&id).await.unwrap(), state_before);
}

// =============================================================================
// Store behavior
// =============================================================================

#[tokio::test]
async fn get_history_is_idempotent() {
    let mock = provider();
    let store = InMemorySessionStore::new();
    let orch = orchestrator(&mock, Arc::new(store.clone()));
    let id = session("idempotent");
    orch.handle_turn(TurnCommand::new(id.clone(), "hi").with_profile(profile()))
        .await
        .unwrap();

    let first = orch.get_history(&id).await.unwrap();
    let second = orch.get_history(&id).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn file_backed_session_resumes_after_restart() {
    let temp_dir = TempDir::new().unwrap();
    let id = session("restart");

    {
        let mock = provider();
        let orch = orchestrator(&mock, Arc::new(FileSessionStore::new(temp_dir.path())));
        orch.handle_turn(TurnCommand::new(id.clone(), "first").with_profile(profile()))
            .await
            .unwrap();
        orch.handle_turn(TurnCommand::new(id.clone(), "second"))
            .await
            .unwrap();
    }

    let mock = provider();
    let orch = orchestrator(&mock, Arc::new(FileSessionStore::new(temp_dir.path())));
    let result = orch
        .handle_turn(TurnCommand::new(id.clone(), "third"))
        .await
        .unwrap();

    assert_eq!(result.turn_count, 3);
    assert_eq!(result.phase, CounselingPhase::Insight);
    assert!(mock.calls_for(&RequestPurpose::Routing).is_empty());
    assert_eq!(
        mock.analyzed_experts(),
        ["Financial Psychology Expert", "Gottman Method Expert", "CBT Expert"]
    );
    assert_eq!(orch.get_history(&id).await.unwrap().len(), 6);
}

#[tokio::test]
async fn sessions_run_independently() {
    let mock = provider();
    let store = InMemorySessionStore::new();
    let orch = Arc::new(orchestrator(&mock, Arc::new(store.clone())));

    let turns = ["alpha", "beta", "gamma"].map(|name| {
        let orch = Arc::clone(&orch);
        async move {
            let id = session(name);
            orch.handle_turn(TurnCommand::new(id.clone(), "hello").with_profile(profile()))
                .await?;
            orch.handle_turn(TurnCommand::new(id, "again")).await
        }
    });
    let results = futures::future::join_all(turns).await;

    for result in results {
        let result = result.unwrap();
        assert_eq!(result.turn_count, 2);
    }
    assert_eq!(store.session_count().await, 3);
}
