//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use agora_merkle::MerkleError;
use agora_relayer::RelayError;
use agora_store::StoreError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RelayError> for RpcError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::Store(StoreError::NotFound(key)) => RpcError::NotFound(key),
            other => RpcError::Internal(other.to_string()),
        }
    }
}

impl From<MerkleError> for RpcError {
    fn from(e: MerkleError) -> Self {
        match e {
            MerkleError::UnknownTree(root) => RpcError::NotFound(format!("tree {root}")),
            MerkleError::LeafNotFound => RpcError::NotFound("leaf".to_string()),
            MerkleError::Store(StoreError::NotFound(key)) => RpcError::NotFound(key),
            other => RpcError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = match &self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
