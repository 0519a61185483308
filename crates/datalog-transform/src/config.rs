//! Transformer configuration, passed explicitly into each run.

/// The SIPS policy used to pick the next body atom during reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SipsStrategy {
    /// First atom with at least one bound argument, or any proposition
    Naive,
    /// First atom with every concrete argument bound
    #[default]
    AllBound,
    /// Maximise the number of bound arguments
    MaxBound,
    /// Maximise the bound-to-arity ratio
    MaxRatio,
    /// Minimise the number of unbound arguments
    LeastFree,
    /// Minimise the number of distinct unbound variables
    LeastFreeVars,
    /// Keep the source order
    Identity,
}

impl SipsStrategy {
    /// Resolve a policy name; `ast2ram` is an alias for `all-bound`, and
    /// unknown names keep the source order.
    pub fn from_name(name: &str) -> Self {
        match name {
            "naive" => SipsStrategy::Naive,
            "all-bound" => SipsStrategy::AllBound,
            "max-bound" => SipsStrategy::MaxBound,
            "max-ratio" => SipsStrategy::MaxRatio,
            "least-free" => SipsStrategy::LeastFree,
            "least-free-vars" => SipsStrategy::LeastFreeVars,
            "ast2ram" => SipsStrategy::AllBound,
            _ => SipsStrategy::Identity,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SipsStrategy::Naive => "naive",
            SipsStrategy::AllBound => "all-bound",
            SipsStrategy::MaxBound => "max-bound",
            SipsStrategy::MaxRatio => "max-ratio",
            SipsStrategy::LeastFree => "least-free",
            SipsStrategy::LeastFreeVars => "least-free-vars",
            SipsStrategy::Identity => "identity",
        }
    }
}

/// Process-wide configuration for a transformation run, read-only while the
/// transformers execute.
#[derive(Debug, Clone, Default)]
pub struct TransformConfig {
    /// SIPS policy for literal reordering
    pub sips: SipsStrategy,
    /// Run the profile-guided reordering pass
    pub profile_use: bool,
    /// Silence deprecated-syntax warnings
    pub legacy: bool,
}

impl TransformConfig {
    pub fn new() -> Self {
        TransformConfig::default()
    }

    pub fn with_sips(mut self, name: &str) -> Self {
        self.sips = SipsStrategy::from_name(name);
        self
    }
}
