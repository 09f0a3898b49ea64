//! CounselingOrchestrator - runs one user turn end to end.
//!
//! ## First turn
//! Persist the profile, fix the expert roster (router), reply from profile
//! and question only, then store `(Exploration, 1)` and the first two
//! history entries.
//!
//! ## Subsequent turns
//! Advance the phase, window the history, fan out to the roster, compose
//! the phase-aware reply, then store history and the advanced state.
//!
//! State and history are written only after the reply succeeds, so a failed
//! turn leaves the session exactly as it was.

use std::sync::Arc;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

use super::composer::ResponseComposer;
use super::errors::CounselingError;
use super::fan_out::AnalysisFanOut;
use super::router::ExpertRouter;
use super::session_locks::SessionLocks;
use crate::domain::counseling::prompts::FinalPromptInput;
use crate::domain::counseling::{
    render_reports, CounselingPhase, CounselingState, History, SelectedExperts, TurnKind,
    UserProfile,
};
use crate::domain::foundation::SessionId;
use crate::ports::{AIProvider, SessionStore};

/// Tunables for a turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorSettings {
    /// Turns of history shown to experts and the lead agent.
    pub max_history_turns: usize,
    /// Expert calls in flight at once within a turn.
    pub analysis_concurrency: usize,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_history_turns: 10,
            analysis_concurrency: 3,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Command to process one user message.
#[derive(Debug, Clone)]
pub struct TurnCommand {
    pub session_id: SessionId,
    pub message: String,
    /// Intake answers. Used on the first turn; ignored afterwards.
    pub profile: Option<UserProfile>,
}

impl TurnCommand {
    pub fn new(session_id: SessionId, message: impl Into<String>) -> Self {
        Self {
            session_id,
            message: message.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub reply: String,
    pub phase: CounselingPhase,
    pub turn_count: u32,
    /// True if this turn moved the session into a new phase.
    pub phase_changed: bool,
    /// Experts consulted this turn, or selected on the first turn.
    pub experts: SelectedExperts,
}

/// Top-level entry point for counseling turns.
pub struct CounselingOrchestrator {
    store: Arc<dyn SessionStore>,
    router: ExpertRouter,
    fan_out: AnalysisFanOut,
    composer: ResponseComposer,
    locks: SessionLocks,
    max_history_turns: usize,
}

impl CounselingOrchestrator {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        store: Arc<dyn SessionStore>,
        settings: OrchestratorSettings,
    ) -> Self {
        let mut fan_out = AnalysisFanOut::new(Arc::clone(&provider), settings.analysis_concurrency);
        let mut composer = ResponseComposer::new(Arc::clone(&provider));
        if let Some(max_tokens) = settings.max_tokens {
            fan_out = fan_out.with_max_tokens(max_tokens);
            composer = composer.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = settings.temperature {
            composer = composer.with_temperature(temperature);
        }

        Self {
            store,
            router: ExpertRouter::new(provider),
            fan_out,
            composer,
            locks: SessionLocks::new(),
            max_history_turns: settings.max_history_turns,
        }
    }

    /// Processes one user message. Turns on the same session are serialized.
    pub async fn handle_turn(&self, cmd: TurnCommand) -> Result<TurnResult, CounselingError> {
        if cmd.message.trim().is_empty() {
            return Err(CounselingError::InvalidInput(
                "message cannot be empty".to_string(),
            ));
        }

        let trace_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "counseling_turn",
            session_id = %cmd.session_id,
            trace_id = %trace_id
        );

        async {
            let _guard = self.locks.lock(&cmd.session_id).await;
            let state = self.store.get_counseling_state(&cmd.session_id).await?;
            match state.turn_kind() {
                TurnKind::FirstTurn => self.first_turn(cmd, &trace_id).await,
                TurnKind::SubsequentTurn => self.subsequent_turn(cmd, state, &trace_id).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn first_turn(
        &self,
        cmd: TurnCommand,
        trace_id: &str,
    ) -> Result<TurnResult, CounselingError> {
        let id = &cmd.session_id;

        let stored_profile = self.store.get_profile(id).await?;
        let stored_experts = self.store.get_selected_experts(id).await?;

        // A retried first turn keeps the roster chosen by the failed attempt,
        // and the profile that roster was routed from.
        let (profile, experts) = match (stored_experts, stored_profile) {
            (Some(experts), Some(profile)) => {
                if cmd.profile.is_some() {
                    debug!("Keeping the profile the stored roster was routed from");
                }
                (profile, experts)
            }
            (stored_experts, stored_profile) => {
                let profile = cmd.profile.or(stored_profile).unwrap_or_default();
                self.store.put_profile(id, &profile).await?;
                let experts = match stored_experts {
                    Some(experts) => experts,
                    None => {
                        let experts = self.router.select(id, &profile, trace_id).await;
                        self.store.put_selected_experts(id, &experts).await?;
                        experts
                    }
                };
                (profile, experts)
            }
        };

        let reply = self
            .composer
            .first_reply(id, &profile, &cmd.message, trace_id)
            .await?;

        let history = self.store.get_history(id).await?.with_turn(&cmd.message, &reply);
        let state = CounselingState::after_first_turn();
        self.store.put_history(id, &history).await?;
        self.store.put_counseling_state(id, &state).await?;

        info!(experts = ?experts.names(), "Session started");
        Ok(TurnResult {
            reply,
            phase: state.phase,
            turn_count: state.turn_count,
            phase_changed: false,
            experts,
        })
    }

    async fn subsequent_turn(
        &self,
        cmd: TurnCommand,
        state: CounselingState,
        trace_id: &str,
    ) -> Result<TurnResult, CounselingError> {
        let id = &cmd.session_id;
        if cmd.profile.is_some() {
            debug!("Ignoring profile sent after the first turn");
        }

        let profile = self.store.get_profile(id).await?.unwrap_or_default();
        let experts = self.store.get_selected_experts(id).await?.unwrap_or_default();
        let history = self.store.get_history(id).await?;
        debug!(entries = history.len(), experts = experts.len(), "Loaded session");

        let next = state.advance();
        let recent = history.window(self.max_history_turns);

        let reports = self
            .fan_out
            .analyze(id, &experts, recent, &cmd.message, trace_id)
            .await;
        let reports_text = render_reports(&reports);

        let reply = self
            .composer
            .compose(
                id,
                FinalPromptInput {
                    turn_count: next.turn_count,
                    phase: next.phase,
                    reports: &reports_text,
                    recent,
                    question: &cmd.message,
                    profile: &profile,
                },
                trace_id,
            )
            .await?;

        let history = history.with_turn(&cmd.message, &reply);
        self.store.put_history(id, &history).await?;
        self.store.put_counseling_state(id, &next).await?;

        let phase_changed = next.entered_new_phase(&state);
        if phase_changed {
            info!(from = %state.phase, to = %next.phase, turn = next.turn_count, "Phase transition");
        }
        Ok(TurnResult {
            reply,
            phase: next.phase,
            turn_count: next.turn_count,
            phase_changed,
            experts,
        })
    }

    /// Full stored history for a session.
    pub async fn get_history(&self, id: &SessionId) -> Result<History, CounselingError> {
        Ok(self.store.get_history(id).await?)
    }

    /// Stored phase and turn count for a session.
    pub async fn get_state(&self, id: &SessionId) -> Result<CounselingState, CounselingError> {
        Ok(self.store.get_counseling_state(id).await?)
    }

    /// Removes every stored facet of a session.
    pub async fn purge(&self, id: &SessionId) -> Result<(), CounselingError> {
        let _guard = self.locks.lock(id).await;
        self.store.purge(id).await?;
        info!(session_id = %id, "Session purged");
        Ok(())
    }
}
