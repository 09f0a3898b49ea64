//! AnalysisFanOut - one analysis call per selected expert.
//!
//! Every call shares the same context (recent history plus the new message)
//! and differs only in the expert's system instruction. A failing expert is
//! replaced by an error-marker report; the batch never aborts.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::counseling::prompts::analysis_context;
use crate::domain::counseling::{Expert, ExpertReport, HistoryEntry, SelectedExperts};
use crate::domain::foundation::SessionId;
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata, RequestPurpose};

/// Runs expert analyses for one turn.
pub struct AnalysisFanOut {
    provider: Arc<dyn AIProvider>,
    concurrency: usize,
    max_tokens: Option<u32>,
}

impl AnalysisFanOut {
    /// `concurrency` of 1 runs experts strictly one after another.
    pub fn new(provider: Arc<dyn AIProvider>, concurrency: usize) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// One report per registry-known roster entry, in roster order.
    pub async fn analyze(
        &self,
        session_id: &SessionId,
        roster: &SelectedExperts,
        recent: &[HistoryEntry],
        question: &str,
        trace_id: &str,
    ) -> Vec<ExpertReport> {
        let experts = roster.known_experts();
        if experts.len() < roster.len() {
            debug!(
                session_id = %session_id,
                skipped = roster.len() - experts.len(),
                "Skipping roster names missing from the registry"
            );
        }
        if experts.is_empty() {
            return Vec::new();
        }

        let context = analysis_context(recent, question);

        stream::iter(experts)
            .map(|expert| self.analyze_one(session_id, expert, &context, trace_id))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn analyze_one(
        &self,
        session_id: &SessionId,
        expert: Expert,
        context: &str,
        trace_id: &str,
    ) -> ExpertReport {
        let mut request = CompletionRequest::new(RequestMetadata::new(
            session_id.clone(),
            RequestPurpose::ExpertAnalysis(expert.name().to_string()),
            trace_id,
        ))
        .with_system_prompt(expert.instruction())
        .with_message(MessageRole::User, context);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        match self.provider.complete(request).await {
            Ok(response) => {
                debug!(session_id = %session_id, expert = expert.name(), "Expert analysis complete");
                ExpertReport::analysis(expert.name(), response.content)
            }
            Err(err) => {
                warn!(
                    session_id = %session_id,
                    expert = expert.name(),
                    error = %err,
                    "Expert analysis failed"
                );
                ExpertReport::failed(expert.name(), err.to_string())
            }
        }
    }
}
