use figment::Jail;
use va_config::ValanConfig;
use va_core::Language;

#[test]
fn env_vars_map_to_nested_keys() {
    Jail::expect_with(|jail| {
        jail.set_env("VALAN_BACKEND__BASE_URL", "http://backend.test:8001");
        jail.set_env("VALAN_POLLING__INTERVAL_MS", "250");
        jail.set_env("VALAN_GENERAL__LANGUAGE", "zh");

        let config = ValanConfig::load().expect("config loads");
        assert_eq!(config.backend.base_url, "http://backend.test:8001");
        assert_eq!(config.polling.interval_ms, 250);
        assert_eq!(config.general.language, Language::Zh);
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".valan")?;
        jail.create_file(
            ".valan/config.toml",
            "[backend]\nbase_url = \"http://from-toml:8001\"\n",
        )?;
        jail.set_env("VALAN_BACKEND__BASE_URL", "http://from-env:8001");

        let config = ValanConfig::load().expect("config loads");
        assert_eq!(config.backend.base_url, "http://from-env:8001");
        Ok(())
    });
}

#[test]
fn single_underscore_does_not_nest() {
    Jail::expect_with(|jail| {
        jail.set_env("VALAN_BACKEND_BASE_URL", "http://ignored:1");

        let config = ValanConfig::load().expect("config loads");
        assert_eq!(config.backend.base_url, "http://localhost:8001");
        Ok(())
    });
}
