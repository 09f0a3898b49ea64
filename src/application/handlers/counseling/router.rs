//! ExpertRouter - picks the session's expert roster once, on the first turn.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::counseling::prompts::router_prompt;
use crate::domain::counseling::{
    default_roster, parse_router_output, registry_names, SelectedExperts, UserProfile,
};
use crate::domain::foundation::SessionId;
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata, RequestPurpose};

/// Routing replies are short lists; keep the budget small.
const ROUTER_MAX_TOKENS: u32 = 200;

/// Selects experts for a session via one completion call.
pub struct ExpertRouter {
    provider: Arc<dyn AIProvider>,
}

impl ExpertRouter {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    /// Returns the roster for a new session. Never fails: a completion error
    /// or an unusable reply yields [`default_roster`].
    pub async fn select(
        &self,
        session_id: &SessionId,
        profile: &UserProfile,
        trace_id: &str,
    ) -> SelectedExperts {
        let request = CompletionRequest::new(RequestMetadata::new(
            session_id.clone(),
            RequestPurpose::Routing,
            trace_id,
        ))
        .with_message(MessageRole::User, router_prompt(profile, &registry_names()))
        .with_max_tokens(ROUTER_MAX_TOKENS)
        .with_temperature(0.0);

        let reply = match self.provider.complete(request).await {
            Ok(response) => response.content,
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "Routing call failed, using default experts");
                return default_roster();
            }
        };

        match parse_router_output(&reply) {
            Ok(roster) => {
                info!(session_id = %session_id, experts = ?roster.names(), "Selected experts");
                roster
            }
            Err(err) => {
                warn!(
                    session_id = %session_id,
                    error = %err,
                    reply = %reply,
                    "Could not parse router reply, using default experts"
                );
                default_roster()
            }
        }
    }
}
