//! Agora relay daemon — entry point for running the relay service.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use clap::Parser;

use agora_merkle::MerkleRegistry;
use agora_relayer::{
    run_sweeper, HttpAttestationClient, HttpChainClient, ProposalWorker, RelayService,
    RelayWorker, RelayerConfig, RelayerMetrics,
};
use agora_rpc::{AppState, RpcServer};
use agora_store_lmdb::{
    LmdbEnvironment, LmdbMerkleStore, LmdbProposalRelayStore, LmdbRelayJobStore,
};
use agora_types::{Address, ChainId, Network};

#[derive(Parser)]
#[command(name = "agora-relayerd", about = "Agora governance relay daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags override them.
    #[arg(long, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the relay store.
    #[arg(long, env = "AGORA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP port for the RPC boundary.
    #[arg(long, env = "AGORA_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Worker poll interval in seconds.
    #[arg(long, env = "AGORA_POLL_INTERVAL")]
    poll_interval: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "AGORA_LOG_LEVEL")]
    log_level: String,
}

fn init_tracing(default_level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RelayerConfig::from_toml_file(path)?,
        None => RelayerConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(port) = cli.rpc_port {
        config.rpc_port = port;
    }
    if let Some(poll) = cli.poll_interval {
        config.poll_interval_secs = poll;
    }

    init_tracing(&cli.log_level);
    tracing::info!(
        data_dir = %config.data_dir.display(),
        networks = config.networks.len(),
        "starting agora relay daemon"
    );

    std::fs::create_dir_all(&config.data_dir)?;
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size)?;

    let metrics = Arc::new(RelayerMetrics::new());
    let service = Arc::new(RelayService::new(
        Arc::new(LmdbRelayJobStore::new(env.clone())),
        Arc::new(LmdbProposalRelayStore::new(env.clone())),
        metrics,
    ));
    let merkle = Arc::new(MerkleRegistry::new(Arc::new(LmdbMerkleStore::new(env))));

    let poll_interval = Duration::from_secs(config.poll_interval_secs);
    let mut chains: HashMap<Network, Arc<dyn agora_relayer::ChainClient>> = HashMap::new();
    let mut tasks = tokio::task::JoinSet::new();

    for network_config in &config.networks {
        let network = Network::new(network_config.id.clone());
        let relayer_address = Address::parse(&network_config.relayer_address)?;
        let minimum_balance: U256 = network_config
            .minimum_balance
            .parse()
            .map_err(|e| anyhow::anyhow!("minimum_balance for {network}: {e}"))?;

        let chain: Arc<HttpChainClient> = Arc::new(HttpChainClient::new(
            network_config.rpc_url.clone(),
            network_config.gateway_url.clone(),
            relayer_address,
            minimum_balance,
        ));
        chains.insert(network.clone(), chain.clone());

        tasks.spawn(
            RelayWorker::new(service.clone(), chain.clone(), network.clone(), poll_interval)
                .run(),
        );

        if let Some(attestation_url) = &network_config.attestation_url {
            let attestations = Arc::new(HttpAttestationClient::new(attestation_url.clone()));
            tasks.spawn(
                ProposalWorker::new(
                    service.clone(),
                    chain,
                    attestations,
                    ChainId(network_config.chain_id),
                    poll_interval,
                )
                .run(),
            );
        }
    }

    tasks.spawn(run_sweeper(
        service.clone(),
        Duration::from_secs(config.sweep_interval_secs),
    ));

    let state = AppState {
        relay: service,
        merkle,
        chains: Arc::new(chains),
    };
    let server = RpcServer::new(config.rpc_port, state);
    tasks.spawn(async move {
        if let Err(e) = server.start().await {
            tracing::error!(error = %e, "rpc server exited");
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    tasks.shutdown().await;
    Ok(())
}
