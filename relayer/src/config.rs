//! Relayer configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One relayed network partition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Relay partition id, e.g. `"eth"`, `"sep"`.
    pub id: String,
    /// Numeric chain id for attestation-gated queues.
    pub chain_id: u64,
    /// JSON-RPC endpoint for reads.
    pub rpc_url: String,
    /// Execution gateway endpoint for submission.
    pub gateway_url: String,
    /// The relayer's funded account on this network.
    pub relayer_address: String,
    /// Minimum balance (wei, decimal string) below which the liquidity
    /// report turns negative and clients stop picking the sig-relay path.
    #[serde(default = "default_minimum_balance")]
    pub minimum_balance: String,
    /// Attestation provider endpoint; enables the proposal worker when set.
    #[serde(default)]
    pub attestation_url: Option<String>,
}

/// Configuration for the relay daemon.
///
/// Can be loaded from a TOML file or built programmatically (e.g. for
/// tests); CLI flags override file values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayerConfig {
    /// Data directory for the LMDB store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// HTTP port for the RPC boundary.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Worker poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Staleness sweep interval in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Networks this relayer serves.
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl RelayerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, crate::RelayError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| crate::RelayError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| crate::RelayError::Config(format!("{}: {e}", path.display())))
    }
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            rpc_port: default_rpc_port(),
            poll_interval_secs: default_poll_interval(),
            sweep_interval_secs: default_sweep_interval(),
            networks: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./agora_data")
}

fn default_map_size() -> usize {
    1024 * 1024 * 1024
}

fn default_rpc_port() -> u16 {
    3000
}

fn default_poll_interval() -> u64 {
    15
}

fn default_sweep_interval() -> u64 {
    10 * 60
}

fn default_minimum_balance() -> String {
    // 0.1 ether in wei
    "100000000000000000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_round_trip() {
        let toml_src = r#"
            rpc_port = 8000

            [[networks]]
            id = "eth"
            chain_id = 1
            rpc_url = "http://localhost:8545"
            gateway_url = "http://localhost:9000"
            relayer_address = "0x00000000000000000000000000000000000000bb"
        "#;
        let config: RelayerConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.rpc_port, 8000);
        assert_eq!(config.poll_interval_secs, 15);
        assert_eq!(config.networks.len(), 1);
        assert_eq!(config.networks[0].minimum_balance, "100000000000000000");
        assert!(config.networks[0].attestation_url.is_none());
    }
}
