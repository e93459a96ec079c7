//! Registry configuration and the round state machine.

use std::time::Duration;

// ---------------------------------------------------------------------------
// HubConfig
// ---------------------------------------------------------------------------

/// How long a round may sit with nobody holding it before it is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the round registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Prepended to every generated code so several deployments can share
    /// one administrative namespace without collisions.
    pub prefix: String,

    /// Idle time, with zero connections, after which a round expires.
    pub idle_timeout: Duration,

    /// Command channel size for the hub actor. Callers wait when it's full.
    pub channel_size: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoundState
// ---------------------------------------------------------------------------

/// The lifecycle state of a round.
///
/// ```text
/// Active → Revealed
/// ```
///
/// - **Active**: players are guessing.
/// - **Revealed**: every connected player gave up and the remaining words
///   were revealed. Guesses no longer change anything. There is no way
///   back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RoundState {
    Active,
    Revealed,
}

impl RoundState {
    /// Returns `true` while guesses can still solve words.
    pub(crate) fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_config_default() {
        let config = HubConfig::default();
        assert_eq!(config.prefix, "");
        assert_eq!(config.idle_timeout, Duration::from_secs(86_400));
        assert_eq!(config.channel_size, 64);
    }

    #[test]
    fn test_round_state_is_active() {
        assert!(RoundState::Active.is_active());
        assert!(!RoundState::Revealed.is_active());
    }
}
