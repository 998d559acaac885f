//! Session binding: one contract handle per (address, ABI) pair.
//!
//! A bind acquires the signer (an await point), constructs the handle and
//! instantiates one [`FunctionCaller`] per descriptor against it. Any
//! rebind — successful or not — bumps the session epoch first, so the prior
//! handle and every invocation in flight against it go stale immediately.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, warn};

use alloy_primitives::Address;

use crate::abi::FunctionDescriptor;
use crate::contract::ContractHandle;
use crate::invoke::FunctionCaller;
use crate::runtime::{ContractRuntime, SignerSource};
use crate::validate::is_well_formed_address;

/// Why a bind produced no usable handle. Hosts render every variant as a
/// single "Invalid Contract" state; the display strings here are for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("no contract address supplied")]
    MissingAddress,

    #[error("contract address is not well-formed")]
    InvalidAddress,

    #[error("ABI has no entries")]
    EmptyAbi,

    #[error("no signer available")]
    NoSigner,

    /// A newer bind started while this one was resolving its signer; its
    /// result was discarded.
    #[error("bind superseded by a newer one")]
    Superseded,
}

/// A successfully bound contract: the shared handle plus one invocation
/// controller per ABI entry.
pub struct BoundContract {
    pub handle: Arc<ContractHandle>,
    pub callers: Vec<FunctionCaller>,
}

impl std::fmt::Debug for BoundContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundContract")
            .field("address", &self.handle.address())
            .field("callers", &self.callers.len())
            .finish()
    }
}

/// Owns the signer source and execution runtime, and tracks which handle is
/// current. There is at most one active (address, ABI) binding per session.
pub struct ContractSession {
    runtime: Arc<dyn ContractRuntime>,
    signers: Arc<dyn SignerSource>,
    epoch: Arc<AtomicU64>,
    current: Mutex<Option<Arc<ContractHandle>>>,
}

impl ContractSession {
    pub fn new(runtime: Arc<dyn ContractRuntime>, signers: Arc<dyn SignerSource>) -> Self {
        Self {
            runtime,
            signers,
            epoch: Arc::new(AtomicU64::new(0)),
            current: Mutex::new(None),
        }
    }

    /// Bind a contract handle for `address` over `descriptors`.
    ///
    /// Fails when the address is missing or ill-formed, the descriptor list
    /// is empty, or no signer can be acquired. The previous binding is
    /// discarded up front either way; results of invocations still in
    /// flight against it will not be rendered.
    pub async fn bind(
        &self,
        address: &str,
        descriptors: &[FunctionDescriptor],
    ) -> Result<BoundContract, BindError> {
        let generation = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        *self.current_slot() = None;

        let address = address.trim();
        if address.is_empty() {
            return Err(BindError::MissingAddress);
        }
        if !is_well_formed_address(address) {
            return Err(BindError::InvalidAddress);
        }
        let address = Address::from_str(address).map_err(|_| BindError::InvalidAddress)?;
        if descriptors.is_empty() {
            return Err(BindError::EmptyAbi);
        }

        let signer = self.signers.get_signer().await.map_err(|failure| {
            warn!(%failure, "signer unavailable");
            BindError::NoSigner
        })?;

        // A newer bind may have started while the signer was resolving;
        // its generation wins and this one installs nothing.
        if self.epoch.load(Ordering::SeqCst) != generation {
            return Err(BindError::Superseded);
        }

        let handle = Arc::new(ContractHandle::new(
            generation,
            self.epoch.clone(),
            address,
            descriptors,
            self.runtime.clone(),
            signer,
        ));
        let callers = descriptors
            .iter()
            .map(|descriptor| FunctionCaller::new(descriptor.clone(), handle.clone()))
            .collect();
        *self.current_slot() = Some(handle.clone());
        debug!(%address, functions = descriptors.len(), "contract bound");

        Ok(BoundContract { handle, callers })
    }

    /// The handle of the active binding, if any.
    pub fn handle(&self) -> Option<Arc<ContractHandle>> {
        self.current_slot().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.current_slot().is_some()
    }

    fn current_slot(&self) -> MutexGuard<'_, Option<Arc<ContractHandle>>> {
        // Held only across plain stores/loads; poisoning cannot leave the
        // slot half-written, so recover instead of propagating the panic.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
