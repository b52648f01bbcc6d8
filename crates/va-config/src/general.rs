//! General application configuration.

use serde::{Deserialize, Serialize};
use va_core::{AnalysisStep, Language};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Language for labels and user-facing messages.
    #[serde(default)]
    pub language: Language,

    /// Step selected when a session is first opened.
    #[serde(default)]
    pub default_step: AnalysisStep,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.default_step, AnalysisStep::Business);
    }
}
