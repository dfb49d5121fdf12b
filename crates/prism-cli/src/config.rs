//! Runtime configuration for the `prism` binary.

use prism_core::scopes::histogram::DEFAULT_NUM_BINS;
use prism_core::scopes::plot::DEFAULT_PLOT_HEIGHT;

/// Environment variable overriding the histogram bin count.
pub const ENV_BINS: &str = "PRISM_BINS";
/// Environment variable overriding the plot height in pixels.
pub const ENV_PLOT_HEIGHT: &str = "PRISM_PLOT_HEIGHT";
/// Presence of this variable routes grading and histograms to the GPU.
pub const ENV_GPU: &str = "PRISM_GPU";

/// Defaults resolved from the environment. Command-line flags win over these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Histogram bins per channel.
    pub bins: usize,
    /// Height of rendered histogram plots.
    pub plot_height: u32,
    /// Whether to try the GPU path first.
    pub gpu: bool,
}

impl CliConfig {
    /// Resolve the config through `lookup` instead of the process environment.
    ///
    /// Unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bins: lookup(ENV_BINS)
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_NUM_BINS),
            plot_height: lookup(ENV_PLOT_HEIGHT)
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PLOT_HEIGHT),
            gpu: lookup(ENV_GPU).is_some(),
        }
    }

    /// Flag value if given, the configured bin count otherwise.
    pub fn bins_or(&self, flag: Option<usize>) -> usize {
        flag.unwrap_or(self.bins)
    }

    pub fn plot_height_or(&self, flag: Option<u32>) -> u32 {
        flag.unwrap_or(self.plot_height)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}
