//! Axum server wiring for the relay service.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use prometheus::{Encoder, TextEncoder};
use tower_http::cors::CorsLayer;

use agora_merkle::MerkleRegistry;
use agora_relayer::{ChainClient, RelayService, RelayerInfo};
use agora_store::JobSubmission;
use agora_types::{ContentHash, Network};

use crate::error::RpcError;
use crate::handlers::{
    BuildStatusResponse, JobView, MarkDoneRequest, MarkDoneResponse, MerkleRequestBody,
    PendingQuery, ProofResponse, SaveTreeRequest, SaveTreeResponse, SubmitJobRequest,
    SubmitJobResponse, TreeResponse,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
    pub merkle: Arc<MerkleRegistry>,
    /// Per-network chain clients, used for the relayer liquidity report.
    pub chains: Arc<HashMap<Network, Arc<dyn ChainClient>>>,
}

/// The RPC server, configured with a port and shared state.
pub struct RpcServer {
    pub port: u16,
    pub state: AppState,
}

impl RpcServer {
    pub fn new(port: u16, state: AppState) -> Self {
        Self { port, state }
    }

    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/relay", post(submit_job))
            .route("/relay/pending", get(list_pending))
            .route("/relay/jobs/:hash", get(job_by_hash))
            .route("/relay/jobs/:id/done", post(mark_done))
            .route("/relayer/:network", get(relayer_info))
            .route("/merkle/request", post(merkle_request))
            .route("/merkle/trees", post(save_tree))
            .route("/merkle/trees/:root", get(get_tree))
            .route("/merkle/trees/:root/proof/:leaf", get(get_proof))
            .route("/merkle/requests/:id", get(build_status))
            .route("/metrics", get(metrics))
            .route("/health", get(|| async { "ok" }))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind and serve until the task is aborted.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let router = Self::router(self.state);
        let listener =
            tokio::net::TcpListener::bind(("0.0.0.0", self.port)).await?;
        tracing::info!(port = self.port, "rpc server listening");
        axum::serve(listener, router).await
    }
}

// ── Relay handlers ───────────────────────────────────────────────────────

async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> Result<Json<SubmitJobResponse>, RpcError> {
    let submission = JobSubmission {
        network: request.network,
        kind: request.kind,
        sender: request.sender,
        payload_hash: request.hash,
        payload: request.data.to_string(),
    };
    let outcome = state.relay.submit(&submission)?;
    Ok(Json(SubmitJobResponse {
        accepted: true,
        id: outcome.id,
    }))
}

async fn list_pending(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<JobView>>, RpcError> {
    let network = query.network.map(|n| Network::new(n));
    let pending = state.relay.list_pending(network.as_ref())?;
    Ok(Json(pending.into_iter().map(JobView::from).collect()))
}

async fn job_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<JobView>, RpcError> {
    let hash = ContentHash::from_hex(&hash)
        .map_err(|e| RpcError::InvalidRequest(e.to_string()))?;
    let job = state
        .relay
        .job_by_hash(&hash)?
        .ok_or_else(|| RpcError::NotFound(format!("job {hash}")))?;
    Ok(Json(JobView::from(job)))
}

async fn mark_done(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<MarkDoneRequest>,
) -> Result<Json<MarkDoneResponse>, RpcError> {
    let updated = state.relay.mark_done(id, request.failed)?;
    Ok(Json(MarkDoneResponse { updated }))
}

async fn relayer_info(
    State(state): State<AppState>,
    Path(network): Path<String>,
) -> Result<Json<RelayerInfo>, RpcError> {
    let network = Network::new(network);
    let chain = state
        .chains
        .get(&network)
        .ok_or_else(|| RpcError::NotFound(format!("network {network}")))?;
    let info = chain
        .relayer_info()
        .await
        .map_err(|e| RpcError::Internal(e.to_string()))?;
    Ok(Json(info))
}

// ── Merkle handlers ──────────────────────────────────────────────────────

async fn merkle_request(
    State(state): State<AppState>,
    Json(request): Json<MerkleRequestBody>,
) -> Result<Json<serde_json::Value>, RpcError> {
    state.merkle.request_build(&request.id)?;
    Ok(Json(serde_json::json!({ "accepted": true })))
}

async fn save_tree(
    State(state): State<AppState>,
    Json(request): Json<SaveTreeRequest>,
) -> Result<Json<SaveTreeResponse>, RpcError> {
    let root = state.merkle.build_and_save(&request.id, &request.leaves)?;
    Ok(Json(SaveTreeResponse { root }))
}

async fn get_tree(
    State(state): State<AppState>,
    Path(root): Path<String>,
) -> Result<Json<TreeResponse>, RpcError> {
    let root = ContentHash::from_hex(&root)
        .map_err(|e| RpcError::InvalidRequest(e.to_string()))?;
    let leaves = state
        .merkle
        .tree(&root)?
        .ok_or_else(|| RpcError::NotFound(format!("tree {root}")))?;
    Ok(Json(TreeResponse { leaves }))
}

async fn get_proof(
    State(state): State<AppState>,
    Path((root, leaf)): Path<(String, String)>,
) -> Result<Json<ProofResponse>, RpcError> {
    let root = ContentHash::from_hex(&root)
        .map_err(|e| RpcError::InvalidRequest(e.to_string()))?;
    let leaf = ContentHash::from_hex(&leaf)
        .map_err(|e| RpcError::InvalidRequest(e.to_string()))?;
    let proof = state.merkle.proof(&root, &leaf)?;
    Ok(Json(ProofResponse { proof }))
}

async fn build_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BuildStatusResponse>, RpcError> {
    let request = state
        .merkle
        .build_status(&id)?
        .ok_or_else(|| RpcError::NotFound(format!("build request {id}")))?;
    Ok(Json(BuildStatusResponse {
        processed: request.processed,
        root: request.root,
    }))
}

async fn metrics(State(state): State<AppState>) -> Result<String, RpcError> {
    let families = state.relay.metrics().registry.gather();
    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&families, &mut buf)
        .map_err(|e| RpcError::Internal(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| RpcError::Internal(e.to_string()))
}
