//! Configuration for result consolidation

/// Configuration for the consolidation process
#[derive(Debug, Clone)]
pub struct ConsolidatorConfig {
    /// Keep only rows whose interpretation is an actual test result (S, I, R)
    pub only_testable: bool,

    /// Fill absent cells with `NotTested` after pivoting
    pub backfill_not_tested: bool,

    /// Whether to reduce groups on the rayon pool for large inputs
    pub parallel: bool,
}

impl Default for ConsolidatorConfig {
    fn default() -> Self {
        Self {
            only_testable: true,
            backfill_not_tested: false,
            parallel: true,
        }
    }
}

impl ConsolidatorConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for constructing a configuration
    #[must_use]
    pub fn builder() -> ConsolidatorConfigBuilder {
        ConsolidatorConfigBuilder::new()
    }
}

/// Builder for constructing a consolidation configuration
#[derive(Debug, Clone)]
pub struct ConsolidatorConfigBuilder {
    config: ConsolidatorConfig,
}

impl Default for ConsolidatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsolidatorConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ConsolidatorConfig::default(),
        }
    }

    /// Set whether only testable interpretations enter the reduction
    #[must_use]
    pub const fn only_testable(mut self, only_testable: bool) -> Self {
        self.config.only_testable = only_testable;
        self
    }

    /// Set whether absent cells are backfilled with `NotTested`
    #[must_use]
    pub const fn backfill_not_tested(mut self, backfill: bool) -> Self {
        self.config.backfill_not_tested = backfill;
        self
    }

    /// Set whether to use parallel processing
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Build the configuration
    #[must_use]
    pub const fn build(self) -> ConsolidatorConfig {
        self.config
    }
}
