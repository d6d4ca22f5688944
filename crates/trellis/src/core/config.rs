use serde::{Deserialize, Serialize};

/// Engine configuration, fixed when a [`Core`](crate::Core) is constructed.
///
/// Hosts usually embed this in their own settings file, so missing fields
/// fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The host negotiates sizes itself. Measurements are never cached and
    /// invalidation never schedules a batch; the host calls
    /// [`Core::allocate`](crate::Core::allocate) directly.
    pub host_driven: bool,
    /// Upper bound on size-check/reallocate rounds within one batch. Work
    /// re-queued beyond this bound is dropped with a warning.
    pub max_batch_passes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_driven: false,
            max_batch_passes: 64,
        }
    }
}

impl Config {
    /// Set whether the host drives size negotiation.
    pub fn with_host_driven(mut self, host_driven: bool) -> Self {
        self.host_driven = host_driven;
        self
    }

    /// Set the per-batch pass bound. Zero is treated as one.
    pub fn with_max_batch_passes(mut self, passes: usize) -> Self {
        self.max_batch_passes = passes.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let c: Config = serde_json::from_str(r#"{"host_driven": true}"#).unwrap();
        assert!(c.host_driven);
        assert_eq!(c.max_batch_passes, Config::default().max_batch_passes);
    }

    #[test]
    fn zero_passes_clamped() {
        assert_eq!(Config::default().with_max_batch_passes(0).max_batch_passes, 1);
    }
}
