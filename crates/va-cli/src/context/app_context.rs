use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use va_client::BackendClient;
use va_config::ValanConfig;
use va_core::Language;
use va_sync::SessionSynchronizer;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: ValanConfig,
    pub client: Arc<BackendClient>,
    pub lang: Language,
}

impl AppContext {
    pub fn init(config: ValanConfig) -> anyhow::Result<Self> {
        let timeout = match config.backend.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let client = BackendClient::new(config.backend.normalized_base_url(), timeout)
            .context("failed to build backend HTTP client")?;
        tracing::debug!(base_url = client.base_url(), "backend client ready");

        Ok(Self {
            lang: config.general.language,
            client: Arc::new(client),
            config,
        })
    }

    /// A synchronizer over this context's client, using the configured
    /// default step and poll interval.
    pub fn synchronizer(&self) -> SessionSynchronizer<BackendClient> {
        SessionSynchronizer::new(
            Arc::clone(&self.client),
            self.config.general.default_step,
            self.config.polling.interval(),
        )
    }
}
