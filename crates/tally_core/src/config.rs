//! Ledger configuration.

/// Default number of attempts the gate makes when opening or draining.
pub const DEFAULT_RETRY_BUDGET: u32 = 1000;

/// Default permission bits for snapshot files on unix.
pub const DEFAULT_SNAPSHOT_MODE: u32 = 0o644;

/// Configuration for a ledger.
#[derive(Debug, Clone)]
pub struct Config {
    /// Attempts `Gate::open` and `Gate::close` make before giving up.
    ///
    /// Each failed attempt yields the thread once. Never zero.
    pub retry_budget: u32,

    /// Permission bits applied to snapshot files written by `Ledger::save`.
    ///
    /// Ignored on non-unix platforms.
    pub snapshot_mode: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
            snapshot_mode: DEFAULT_SNAPSHOT_MODE,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gate retry budget. A budget of zero is raised to one.
    #[must_use]
    pub const fn retry_budget(mut self, attempts: u32) -> Self {
        self.retry_budget = if attempts == 0 { 1 } else { attempts };
        self
    }

    /// Sets the permission bits for snapshot files.
    #[must_use]
    pub const fn snapshot_mode(mut self, mode: u32) -> Self {
        self.snapshot_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.retry_budget, DEFAULT_RETRY_BUDGET);
        assert_eq!(config.snapshot_mode, 0o644);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new().retry_budget(16).snapshot_mode(0o600);

        assert_eq!(config.retry_budget, 16);
        assert_eq!(config.snapshot_mode, 0o600);
    }

    #[test]
    fn zero_budget_is_raised() {
        let config = Config::new().retry_budget(0);
        assert_eq!(config.retry_budget, 1);
    }
}
