use va_config::{DEFAULT_BASE_URL, ValanConfig};

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &ValanConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &ValanConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if config.backend.base_url == DEFAULT_BASE_URL
        && has_single_underscore_key(&env_keys, "VALAN_BACKEND")
    {
        warnings.push(
            "Backend config appears default while VALAN_BACKEND* env vars exist. Use double underscores (example: VALAN_BACKEND__BASE_URL)."
                .to_string(),
        );
    }

    if config.polling.interval_ms == 3_000
        && has_single_underscore_key(&env_keys, "VALAN_POLLING")
    {
        warnings.push(
            "Polling config appears default while VALAN_POLLING* env vars exist. Use double underscores (example: VALAN_POLLING__INTERVAL_MS)."
                .to_string(),
        );
    }

    warnings
}

fn has_single_underscore_key(keys: &[String], prefix: &str) -> bool {
    let nested = format!("{prefix}__");
    keys.iter()
        .any(|key| key.starts_with(prefix) && !key.starts_with(&nested))
}
