use anyhow::Context;
use va_config::ValanConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, the layered config, then apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<ValanConfig> {
    load_dotenv()?;

    let mut config = ValanConfig::load().context("failed to load valan configuration")?;
    apply_overrides(&mut config, flags);
    config
        .validate()
        .context("invalid command-line override")?;
    Ok(config)
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}

fn apply_overrides(config: &mut ValanConfig, flags: &GlobalFlags) {
    if let Some(backend) = &flags.backend {
        config.backend.base_url.clone_from(backend);
    }
    if let Some(lang) = flags.lang {
        config.general.language = lang;
    }
}

#[cfg(test)]
mod tests {
    use va_core::Language;

    use super::*;
    use crate::cli::OutputFormat;

    fn flags(backend: Option<&str>, lang: Option<Language>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            quiet: false,
            verbose: false,
            backend: backend.map(str::to_string),
            lang,
        }
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config = ValanConfig::default();
        apply_overrides(
            &mut config,
            &flags(Some("https://analyst.internal:9000"), Some(Language::Zh)),
        );
        assert_eq!(config.backend.base_url, "https://analyst.internal:9000");
        assert_eq!(config.general.language, Language::Zh);
    }

    #[test]
    fn absent_overrides_keep_config() {
        let mut config = ValanConfig::default();
        apply_overrides(&mut config, &flags(None, None));
        assert_eq!(config.backend.base_url, va_config::DEFAULT_BASE_URL);
        assert_eq!(config.general.language, Language::En);
    }

    #[test]
    fn bad_backend_override_fails_validation() {
        let mut config = ValanConfig::default();
        apply_overrides(&mut config, &flags(Some("localhost:8001"), None));
        assert!(config.validate().is_err());
    }
}
