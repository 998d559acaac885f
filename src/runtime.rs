//! Boundary traits for the external collaborators: the signer/provider and
//! the contract-execution runtime.
//!
//! Everything behind these traits may suspend; nothing in this crate blocks
//! on them. Failures cross the boundary as [`RuntimeFailure`] values and are
//! turned into display strings by [`crate::failure`] — they never propagate
//! further.

use alloy_primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// A failure surfaced by the execution runtime or the wallet.
#[derive(Debug, Clone, Error)]
pub enum RuntimeFailure {
    /// A JSON-RPC style error object from the node or wallet, kept in its
    /// raw shape for the message normalizer to inspect.
    #[error("contract runtime failure")]
    Rpc(Value),

    /// A transport or local failure that only carries a message.
    #[error("{0}")]
    Transport(String),
}

impl RuntimeFailure {
    /// The failure as the loosely-shaped object the message normalizer
    /// inspects.
    pub fn payload(&self) -> Value {
        match self {
            RuntimeFailure::Rpc(value) => value.clone(),
            RuntimeFailure::Transport(message) => json!({ "message": message }),
        }
    }
}

/// An account that can authorize transactions. Key handling lives entirely
/// on the other side of this seam.
pub trait Signer: Send + Sync {
    fn address(&self) -> Address;
    fn chain_id(&self) -> u64;
}

/// The wallet/provider collaborator. Acquiring a signer may suspend (e.g. a
/// wallet-connect round trip) and may fail when no wallet is connected.
#[async_trait]
pub trait SignerSource: Send + Sync {
    async fn get_signer(&self) -> Result<Arc<dyn Signer>, RuntimeFailure>;
}

/// The contract-execution runtime: raw read calls and transaction
/// submission against a chain.
#[async_trait]
pub trait ContractRuntime: Send + Sync {
    /// Execute a read-only call and return the raw return data.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RuntimeFailure>;

    /// Submit a state-changing transaction authorized by `from`.
    async fn send(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<Box<dyn PendingTransaction>, RuntimeFailure>;
}

/// A submitted transaction that has not reached finality yet.
#[async_trait]
pub trait PendingTransaction: Send {
    /// Suspend until the transaction is final; yields the finalized hash.
    async fn confirmed(self: Box<Self>) -> Result<TxHash, RuntimeFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failure_payload_carries_the_message() {
        let failure = RuntimeFailure::Transport("connection reset".into());
        assert_eq!(failure.payload()["message"], "connection reset");
    }

    #[test]
    fn rpc_failure_payload_is_passed_through() {
        let failure = RuntimeFailure::Rpc(json!({ "code": 4001 }));
        assert_eq!(failure.payload()["code"], 4001);
    }
}
