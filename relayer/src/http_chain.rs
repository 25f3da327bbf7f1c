//! HTTP-backed chain access.
//!
//! Reads (relayer balance, chain head) go straight to the network's JSON-RPC
//! endpoint. Submission goes to the execution gateway, the collaborator that
//! builds and signs the native transaction from the stored payload with the
//! relayer's key and its own gas/fee strategy.

use alloy_primitives::U256;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use agora_store::{ProposalRelayRecord, RelayJob};
use agora_types::Address;

use crate::chain::{ChainClient, RelayerInfo, SubmissionError, TxReceipt};
use crate::worker::AttestationClient;

fn transient(e: impl ToString) -> SubmissionError {
    SubmissionError::Transient(e.to_string())
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
}

/// Chain client over a JSON-RPC endpoint plus an execution gateway.
pub struct HttpChainClient {
    client: reqwest::Client,
    rpc_url: String,
    gateway_url: String,
    relayer_address: Address,
    minimum_balance: U256,
}

impl HttpChainClient {
    pub fn new(
        rpc_url: impl Into<String>,
        gateway_url: impl Into<String>,
        relayer_address: Address,
        minimum_balance: U256,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
            gateway_url: gateway_url.into(),
            relayer_address,
            minimum_balance,
        }
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, SubmissionError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response: JsonRpcResponse = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(transient)?
            .error_for_status()
            .map_err(transient)?
            .json()
            .await
            .map_err(transient)?;

        if let Some(error) = response.error {
            return Err(SubmissionError::Transient(error.to_string()));
        }
        response
            .result
            .ok_or_else(|| SubmissionError::Transient("empty rpc result".into()))
    }

    async fn hex_quantity(&self, method: &str, params: serde_json::Value)
        -> Result<U256, SubmissionError> {
        let result = self.rpc_call(method, params).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| SubmissionError::Transient("non-string quantity".into()))?;
        let digits = hex.strip_prefix("0x").unwrap_or(hex);
        U256::from_str_radix(digits, 16)
            .map_err(|e| SubmissionError::Transient(e.to_string()))
    }
}

#[derive(Deserialize)]
struct GatewayReceipt {
    tx_id: String,
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn submit(&self, job: &RelayJob) -> Result<TxReceipt, SubmissionError> {
        let response = self
            .client
            .post(format!("{}/transactions", self.gateway_url))
            .json(&job)
            .send()
            .await
            .map_err(transient)?;

        let status = response.status();
        if status.is_client_error() {
            // The gateway vetted the payload against the chain and rejected
            // it outright; retrying the same bytes cannot succeed.
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Permanent(format!("{status}: {body}")));
        }
        let response = response.error_for_status().map_err(transient)?;
        let receipt: GatewayReceipt = response.json().await.map_err(transient)?;
        Ok(TxReceipt {
            tx_id: receipt.tx_id,
        })
    }

    async fn relayer_info(&self) -> Result<RelayerInfo, SubmissionError> {
        let balance = self
            .hex_quantity(
                "eth_getBalance",
                json!([self.relayer_address.as_str(), "latest"]),
            )
            .await?;
        Ok(RelayerInfo {
            address: self.relayer_address.clone(),
            has_minimum_balance: balance >= self.minimum_balance,
        })
    }

    async fn head(&self) -> Result<u64, SubmissionError> {
        let head = self.hex_quantity("eth_blockNumber", json!([])).await?;
        Ok(head.try_into().unwrap_or(u64::MAX))
    }
}

/// Attestation provider client over its HTTP API.
pub struct HttpAttestationClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAttestationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct AttestationAck {
    id: String,
}

#[derive(Deserialize)]
struct AttestationStatus {
    complete: bool,
}

#[async_trait]
impl AttestationClient for HttpAttestationClient {
    async fn request_attestation(
        &self,
        record: &ProposalRelayRecord,
    ) -> Result<String, SubmissionError> {
        let ack: AttestationAck = self
            .client
            .post(format!("{}/attestations", self.base_url))
            .json(record)
            .send()
            .await
            .map_err(transient)?
            .error_for_status()
            .map_err(transient)?
            .json()
            .await
            .map_err(transient)?;
        Ok(ack.id)
    }

    async fn is_complete(&self, attestation_id: &str) -> Result<bool, SubmissionError> {
        let status: AttestationStatus = self
            .client
            .get(format!("{}/attestations/{attestation_id}", self.base_url))
            .send()
            .await
            .map_err(transient)?
            .error_for_status()
            .map_err(transient)?
            .json()
            .await
            .map_err(transient)?;
        Ok(status.complete)
    }
}
