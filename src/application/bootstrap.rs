//! Builds the orchestrator and its collaborators from [`AppConfig`].

use std::sync::Arc;
use tracing::info;

use super::handlers::counseling::{CounselingError, CounselingOrchestrator, OrchestratorSettings};
use crate::adapters::ai::{
    AnthropicConfig, AnthropicProvider, FailoverAIProvider, OpenAIConfig, OpenAIProvider,
    ThrottleConfig, ThrottledAIProvider,
};
use crate::adapters::storage::{FileSessionStore, InMemorySessionStore, RedisSessionStore};
use crate::config::{AiConfig, AiProvider, AppConfig, CounselingConfig, StorageBackend, StorageConfig};
use crate::ports::{AIProvider, SessionStore};

/// Validates `config` and wires provider, store and orchestrator.
///
/// # Errors
///
/// `Configuration` if validation fails or a provider cannot be built;
/// `Store` if the session store backend is unreachable.
pub async fn build_orchestrator(config: &AppConfig) -> Result<CounselingOrchestrator, CounselingError> {
    config
        .validate()
        .map_err(|e| CounselingError::Configuration(e.to_string()))?;

    let provider = build_provider(&config.ai, &config.counseling)?;
    let store = build_store(&config.storage).await?;

    let settings = OrchestratorSettings {
        max_history_turns: config.counseling.max_history_turns,
        analysis_concurrency: config.counseling.analysis_concurrency,
        max_tokens: Some(config.ai.max_tokens),
        temperature: config.ai.temperature,
    };

    Ok(CounselingOrchestrator::new(provider, store, settings))
}

/// Primary provider, optional fallback, each behind its own throttle.
pub fn build_provider(
    ai: &AiConfig,
    counseling: &CounselingConfig,
) -> Result<Arc<dyn AIProvider>, CounselingError> {
    let throttle = ThrottleConfig {
        requests_per_minute: counseling.requests_per_minute,
        burst: counseling.burst,
        max_concurrent: counseling.max_concurrent_requests,
        // One deadline covers the provider's own retries.
        call_timeout: ai.timeout() * (ai.max_retries + 1),
    };

    let primary = throttled(provider_for(ai, ai.primary_provider)?, throttle);
    let mut failover = FailoverAIProvider::new(primary);
    if let Some(kind) = ai.fallback_provider.filter(|kind| *kind != ai.primary_provider) {
        failover = failover.with_fallback(throttled(provider_for(ai, kind)?, throttle));
    }

    info!(
        primary = ?ai.primary_provider,
        fallback = ?ai.fallback_provider,
        "AI provider ready"
    );
    Ok(Arc::new(failover))
}

fn throttled(provider: Arc<dyn AIProvider>, config: ThrottleConfig) -> Arc<dyn AIProvider> {
    Arc::new(ThrottledAIProvider::new(provider, config))
}

fn provider_for(ai: &AiConfig, kind: AiProvider) -> Result<Arc<dyn AIProvider>, CounselingError> {
    let missing = |name: &str| CounselingError::Configuration(format!("{} is not set", name));
    let build_failed = |e: crate::ports::AIError| CounselingError::Configuration(e.to_string());

    match kind {
        AiProvider::Anthropic => {
            let key = ai
                .anthropic_api_key
                .clone()
                .ok_or_else(|| missing("ANTHROPIC_API_KEY"))?;
            let config = AnthropicConfig::from_secret(key)
                .with_model(&ai.anthropic_model)
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries)
                .with_default_max_tokens(ai.max_tokens);
            Ok(Arc::new(AnthropicProvider::new(config).map_err(build_failed)?))
        }
        AiProvider::OpenAI => {
            let key = ai
                .openai_api_key
                .clone()
                .ok_or_else(|| missing("OPENAI_API_KEY"))?;
            let config = OpenAIConfig::from_secret(key)
                .with_model(&ai.openai_model)
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            Ok(Arc::new(OpenAIProvider::new(config).map_err(build_failed)?))
        }
    }
}

/// Session store for the configured backend.
pub async fn build_store(storage: &StorageConfig) -> Result<Arc<dyn SessionStore>, CounselingError> {
    let store: Arc<dyn SessionStore> = match storage.backend {
        StorageBackend::Memory => Arc::new(InMemorySessionStore::new()),
        StorageBackend::File => Arc::new(FileSessionStore::new(&storage.path)),
        StorageBackend::Redis => {
            let url = storage.redis_url.as_deref().ok_or_else(|| {
                CounselingError::Configuration("STORAGE__REDIS_URL is not set".to_string())
            })?;
            let mut store = RedisSessionStore::connect(url).await?;
            if let Some(ttl) = storage.redis_ttl_secs {
                store = store.with_ttl_secs(ttl);
            }
            Arc::new(store)
        }
    };
    info!(backend = ?storage.backend, "Session store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;
    use tempfile::TempDir;

    fn ai_with_anthropic() -> AiConfig {
        AiConfig {
            anthropic_api_key: Some(Secret::new("sk-ant-xxx".to_string())),
            ..AiConfig::default()
        }
    }

    #[tokio::test]
    async fn missing_key_is_configuration_error() {
        let result = build_orchestrator(&AppConfig::default()).await;
        assert!(matches!(result, Err(CounselingError::Configuration(_))));
    }

    #[tokio::test]
    async fn builds_with_memory_store() {
        let config = AppConfig {
            ai: ai_with_anthropic(),
            ..AppConfig::default()
        };
        assert!(build_orchestrator(&config).await.is_ok());
    }

    #[test]
    fn provider_reports_primary() {
        let provider = build_provider(&ai_with_anthropic(), &CounselingConfig::default()).unwrap();
        assert_eq!(provider.provider_info().name, "anthropic");
    }

    #[test]
    fn fallback_requires_its_key() {
        let ai = AiConfig {
            fallback_provider: Some(AiProvider::OpenAI),
            ..ai_with_anthropic()
        };
        assert!(matches!(
            build_provider(&ai, &CounselingConfig::default()),
            Err(CounselingError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn file_store_is_rooted_at_path() {
        let temp_dir = TempDir::new().unwrap();
        let storage = StorageConfig {
            backend: StorageBackend::File,
            path: temp_dir.path().to_path_buf(),
            ..StorageConfig::default()
        };
        let store = build_store(&storage).await.unwrap();
        let id = crate::domain::foundation::SessionId::new("boot").unwrap();

        store
            .put_history(&id, &crate::domain::counseling::History::new().with_turn("a", "b"))
            .await
            .unwrap();

        assert!(temp_dir.path().join("boot").join("history.yaml").exists());
    }
}
