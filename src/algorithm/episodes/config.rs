//! Configuration for episode segmentation

/// Default clinical cutoff used by the reference surveillance pipeline
pub const DEFAULT_CUTOFF_DAYS: i64 = 30;

/// Default lab-assigned isolate identifier prefix
pub const DEFAULT_ISOLATE_ID_PREFIX: &str = "BI";

/// Configuration for the segmentation process
#[derive(Debug, Clone)]
pub struct EpisodeConfig {
    /// Days within which a repeat culture belongs to the running episode.
    /// A clinical parameter chosen by the caller; 30 matches the reference
    /// pipeline but carries no endorsement.
    pub cutoff_days: i64,

    /// Only isolate identifiers starting with this prefix participate;
    /// everything else is excluded and counted in the quality report
    pub isolate_id_prefix: String,

    /// Whether to process groups on the rayon pool for large inputs
    pub parallel: bool,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            cutoff_days: DEFAULT_CUTOFF_DAYS,
            isolate_id_prefix: DEFAULT_ISOLATE_ID_PREFIX.to_string(),
            parallel: true,
        }
    }
}

impl EpisodeConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for constructing a configuration
    #[must_use]
    pub fn builder() -> EpisodeConfigBuilder {
        EpisodeConfigBuilder::new()
    }
}

/// Builder for constructing a segmentation configuration
#[derive(Debug, Clone)]
pub struct EpisodeConfigBuilder {
    config: EpisodeConfig,
}

impl Default for EpisodeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EpisodeConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: EpisodeConfig::default(),
        }
    }

    /// Set the episode cutoff in days
    #[must_use]
    pub fn cutoff_days(mut self, days: i64) -> Self {
        self.config.cutoff_days = days;
        self
    }

    /// Set the accepted isolate identifier prefix
    #[must_use]
    pub fn isolate_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.isolate_id_prefix = prefix.into();
        self
    }

    /// Set whether to use parallel processing
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> EpisodeConfig {
        self.config
    }
}
