use std::time::Duration;

/// Offline mode: the scaffold provider answers instead of the translation
/// backend. Read from `SCAFFOLD_MODE` and `MOCK_RESPONSE_DELAY` (ms).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldConfig {
    pub enabled: bool,
    pub mock_response_delay: Duration,
}

impl ScaffoldConfig {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("SCAFFOLD_MODE").ok().as_deref(),
            std::env::var("MOCK_RESPONSE_DELAY").ok().as_deref(),
        )
    }

    fn from_values(mode: Option<&str>, delay_ms: Option<&str>) -> Self {
        let enabled = mode
            .map(str::trim)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        let delay_ms = delay_ms
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        Self {
            enabled,
            mock_response_delay: Duration::from_millis(delay_ms),
        }
    }
}
