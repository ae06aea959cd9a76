/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Default filter directive, used when `RUST_LOG` is unset.
    pub level: String,
}

impl TracingConfig {
    pub fn new(
        environment: impl Into<String>,
        json_format: bool,
        level: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            json_format,
            level: level.into(),
        }
    }
}
