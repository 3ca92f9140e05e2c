//! Cluster configuration (§4.J): gossip cadence and the post-termination
//! grace period, with an optional overlay loaded via the `config` crate.
//! The core library never reads environment variables or files on its
//! own initiative — this overlay is applied at the builder edge only.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

// Layer 3: Internal
use crate::cluster::{DEFAULT_GOSSIP_FANOUT, DEFAULT_GOSSIP_INTERVAL};
use crate::remote::WAIT_AFTER_ENDPOINT_TERMINATION;

/// Gossip cadence and endpoint-blocklist timing for a clustered
/// [`super::ActorSystem`]. Matches the defaults named elsewhere in this
/// crate (gossip interval/fanout, `WaitAfterEndpointTermination`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Interval between gossip rounds.
    #[serde(with = "duration_millis")]
    pub gossip_interval: Duration,

    /// Peers contacted per gossip round.
    pub gossip_fanout: usize,

    /// How long a terminated endpoint's address stays blocklisted.
    #[serde(with = "duration_millis")]
    pub wait_after_endpoint_termination: Duration,

    /// Static seed peer addresses, used when no other discovery
    /// mechanism is configured.
    #[serde(default)]
    pub seeds: Vec<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            gossip_interval: DEFAULT_GOSSIP_INTERVAL,
            gossip_fanout: DEFAULT_GOSSIP_FANOUT,
            wait_after_endpoint_termination: WAIT_AFTER_ENDPOINT_TERMINATION,
            seeds: Vec::new(),
        }
    }
}

impl ClusterConfig {
    /// Load a [`ClusterConfig`], overlaying [`Self::default`] with
    /// values from `path` (if it exists) and `STRATA_CLUSTER_`-prefixed
    /// environment variables. Intended for use at the application's
    /// composition root, never from inside library code.
    pub fn load(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let builder = Config::builder()
            .set_default("gossip_interval", defaults.gossip_interval.as_millis() as i64)?
            .set_default("gossip_fanout", defaults.gossip_fanout as i64)?
            .set_default(
                "wait_after_endpoint_termination",
                defaults.wait_after_endpoint_termination.as_millis() as i64,
            )?
            .set_default("seeds", Vec::<String>::new())?
            .add_source(File::with_name(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("STRATA_CLUSTER").separator("__"));
        builder.build()?.try_deserialize()
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_named_constants() {
        let config = ClusterConfig::default();
        assert_eq!(config.gossip_interval, DEFAULT_GOSSIP_INTERVAL);
        assert_eq!(config.gossip_fanout, DEFAULT_GOSSIP_FANOUT);
        assert_eq!(
            config.wait_after_endpoint_termination,
            WAIT_AFTER_ENDPOINT_TERMINATION
        );
        assert!(config.seeds.is_empty());
    }

    #[test]
    fn load_without_file_or_env_returns_defaults() {
        let config = ClusterConfig::load("strata-cluster-nonexistent").unwrap();
        assert_eq!(config.gossip_fanout, DEFAULT_GOSSIP_FANOUT);
    }
}
