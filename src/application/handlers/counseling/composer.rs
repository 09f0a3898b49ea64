//! ResponseComposer - the lead agent's reply for a turn.

use std::sync::Arc;
use tracing::error;

use crate::domain::counseling::prompts::{
    final_prompt, first_turn_prompt, FinalPromptInput, COUNSELOR_SYSTEM_PROMPT,
};
use crate::domain::counseling::UserProfile;
use crate::domain::foundation::SessionId;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata, RequestPurpose,
};

/// Issues the lead counselor's completion calls.
pub struct ResponseComposer {
    provider: Arc<dyn AIProvider>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl ResponseComposer {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// First-turn reply from profile and question only.
    pub async fn first_reply(
        &self,
        session_id: &SessionId,
        profile: &UserProfile,
        question: &str,
        trace_id: &str,
    ) -> Result<String, AIError> {
        self.complete(
            session_id,
            RequestPurpose::FirstReply,
            first_turn_prompt(profile, question),
            trace_id,
        )
        .await
    }

    /// Phase-aware reply built from expert reports, recent history and profile.
    pub async fn compose(
        &self,
        session_id: &SessionId,
        input: FinalPromptInput<'_>,
        trace_id: &str,
    ) -> Result<String, AIError> {
        self.complete(
            session_id,
            RequestPurpose::FinalReply,
            final_prompt(input),
            trace_id,
        )
        .await
    }

    async fn complete(
        &self,
        session_id: &SessionId,
        purpose: RequestPurpose,
        prompt: String,
        trace_id: &str,
    ) -> Result<String, AIError> {
        let mut request = CompletionRequest::new(RequestMetadata::new(
            session_id.clone(),
            purpose.clone(),
            trace_id,
        ))
        .with_system_prompt(COUNSELOR_SYSTEM_PROMPT)
        .with_message(MessageRole::User, prompt);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        self.provider
            .complete(request)
            .await
            .map(|response| response.content)
            .map_err(|err| {
                error!(session_id = %session_id, %purpose, error = %err, "Counselor reply failed");
                err
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::counseling::{CounselingPhase, HistoryEntry};

    fn sid() -> SessionId {
        SessionId::new("composer").unwrap()
    }

    #[tokio::test]
    async fn first_reply_uses_persona_and_simple_prompt() {
        let mock = MockAIProvider::new().with_response("Welcome.");
        let composer = ResponseComposer::new(Arc::new(mock.clone()));
        let profile = UserProfile::new().with_field("Marriage Duration", "2 years");

        let reply = composer
            .first_reply(&sid(), &profile, "we keep fighting about money", "t")
            .await
            .unwrap();

        assert_eq!(reply, "Welcome.");
        let call = &mock.calls_for(&RequestPurpose::FirstReply)[0];
        assert!(call.system_prompt.as_deref().unwrap_or("").contains("Dr. Helen"));
        assert!(call.prompt_text().starts_with("[User Information]\nMarriage Duration: 2 years"));
        assert!(!call.prompt_text().contains("Report"));
    }

    #[tokio::test]
    async fn compose_carries_phase_and_reports() {
        let mock = MockAIProvider::new().with_response("Let's try one thing this week.");
        let composer = ResponseComposer::new(Arc::new(mock.clone()))
            .with_max_tokens(300)
            .with_temperature(0.7);
        let profile = UserProfile::new();
        let recent = [HistoryEntry::user("hi"), HistoryEntry::agent("hello")];

        composer
            .compose(
                &sid(),
                FinalPromptInput {
                    turn_count: 5,
                    phase: CounselingPhase::Action,
                    reports: "--- CBT Expert Report ---\nCBT Analysis Report: ...",
                    recent: &recent,
                    question: "what should we do?",
                    profile: &profile,
                },
                "t",
            )
            .await
            .unwrap();

        let call = &mock.calls_for(&RequestPurpose::FinalReply)[0];
        let prompt = call.prompt_text();
        assert!(prompt.contains("turn #5"));
        assert!(prompt.contains("--- CBT Expert Report ---"));
        assert!(prompt.contains(CounselingPhase::Action.directive()));
        assert_eq!(call.max_tokens, Some(300));
        assert_eq!(call.temperature, Some(0.7));
    }

    #[tokio::test]
    async fn failure_is_returned() {
        let mock = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "overloaded".to_string(),
        });
        let composer = ResponseComposer::new(Arc::new(mock));

        let result = composer
            .first_reply(&sid(), &UserProfile::new(), "q", "t")
            .await;

        assert!(matches!(result, Err(AIError::Unavailable { .. })));
    }
}
