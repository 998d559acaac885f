//! Contract handle: name-keyed dispatch over a dynamically described
//! interface.
//!
//! The interface arrives at run time as parsed ABI descriptors, so there is
//! no `sol!`-style static binding here. Functions are keyed by name into a
//! dispatch table at bind time; arguments are coerced from user text with
//! [`DynSolType::coerce_str`] and encoded as standard calldata (4-byte
//! selector plus params encoding).

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{hex, keccak256, Address, Bytes, TxHash};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::abi::{DescriptorKind, FunctionDescriptor, ParamDescriptor};
use crate::runtime::{ContractRuntime, RuntimeFailure, Signer};

/// Opaque binding of one (address, ABI, signer) triple.
///
/// Read-only once constructed; a rebind replaces it wholesale and marks it
/// stale via the shared epoch, so results that resolve against a replaced
/// handle can be recognized and discarded.
pub struct ContractHandle {
    id: u64,
    epoch: Arc<AtomicU64>,
    address: Address,
    functions: HashMap<String, FunctionDescriptor>,
    runtime: Arc<dyn ContractRuntime>,
    signer: Arc<dyn Signer>,
}

impl ContractHandle {
    pub(crate) fn new(
        id: u64,
        epoch: Arc<AtomicU64>,
        address: Address,
        descriptors: &[FunctionDescriptor],
        runtime: Arc<dyn ContractRuntime>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        let functions = descriptors
            .iter()
            .filter(|d| d.kind == DescriptorKind::Function && !d.name.is_empty())
            .map(|d| (d.name.clone(), d.clone()))
            .collect();
        Self {
            id,
            epoch,
            address,
            functions,
            runtime,
            signer,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }

    /// True once a newer handle has been bound over this one.
    pub fn is_stale(&self) -> bool {
        self.epoch.load(Ordering::SeqCst) != self.id
    }

    fn function(&self, name: &str) -> Result<&FunctionDescriptor, RuntimeFailure> {
        self.functions
            .get(name)
            .ok_or_else(|| RuntimeFailure::Transport(format!("unknown function: {name}")))
    }

    /// Read path: execute a `view`/`pure` function and render its return
    /// value for display (empty string when the function returns nothing).
    pub async fn call(&self, name: &str, args: &[String]) -> Result<String, RuntimeFailure> {
        let descriptor = self.function(name)?;
        let data = encode_call(descriptor, args)?;
        debug!(function = name, to = %self.address, "read call");
        let raw = self.runtime.call(self.address, data).await?;
        decode_outputs(descriptor, &raw)
    }

    /// Write path: submit a state-changing call and suspend until finality.
    pub async fn send(&self, name: &str, args: &[String]) -> Result<TxHash, RuntimeFailure> {
        let descriptor = self.function(name)?;
        let data = encode_call(descriptor, args)?;
        debug!(function = name, to = %self.address, "transaction submit");
        let pending = self
            .runtime
            .send(self.signer.address(), self.address, data)
            .await?;
        pending.confirmed().await
    }
}

fn resolve_types(params: &[ParamDescriptor]) -> Result<Vec<DynSolType>, RuntimeFailure> {
    params
        .iter()
        .map(|param| {
            param
                .ty
                .parse::<DynSolType>()
                .map_err(|e| RuntimeFailure::Transport(format!("unsupported type '{}': {e}", param.ty)))
        })
        .collect()
}

/// Canonical 4-byte selector for `name` over the resolved input types
/// (aliases like `uint` hash as their canonical `uint256` form).
fn selector(name: &str, inputs: &[DynSolType]) -> [u8; 4] {
    let signature = format!(
        "{}({})",
        name,
        inputs
            .iter()
            .map(|ty| ty.sol_type_name())
            .collect::<Vec<_>>()
            .join(",")
    );
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn encode_call(descriptor: &FunctionDescriptor, args: &[String]) -> Result<Bytes, RuntimeFailure> {
    let types = resolve_types(&descriptor.inputs)?;
    if args.len() != types.len() {
        return Err(RuntimeFailure::Transport(format!(
            "argument count mismatch: expected {}, got {}",
            types.len(),
            args.len()
        )));
    }

    let mut values = Vec::with_capacity(args.len());
    for ((ty, param), raw) in types.iter().zip(&descriptor.inputs).zip(args) {
        let value = ty.coerce_str(raw).map_err(|e| {
            RuntimeFailure::Transport(format!("argument '{}': {e}", param.label()))
        })?;
        values.push(value);
    }

    let mut data = selector(&descriptor.name, &types).to_vec();
    data.extend(DynSolValue::Tuple(values).abi_encode_params());
    Ok(data.into())
}

fn decode_outputs(descriptor: &FunctionDescriptor, raw: &[u8]) -> Result<String, RuntimeFailure> {
    let outputs = descriptor.outputs.as_deref().unwrap_or(&[]);
    if outputs.is_empty() {
        return Ok(String::new());
    }
    let types = resolve_types(outputs)?;
    let decoded = DynSolType::Tuple(types)
        .abi_decode_sequence(raw)
        .map_err(|e| RuntimeFailure::Transport(format!("failed to decode result: {e}")))?;
    Ok(display_value(&decoded))
}

/// Render a decoded value for display. Compound values join their elements
/// with commas, matching how stringified results read in wallet UIs.
pub fn display_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(v, _) => v.to_string(),
        DynSolValue::Uint(v, _) => v.to_string(),
        DynSolValue::Address(a) => a.to_checksum(None),
        DynSolValue::Function(f) => f.to_string(),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(items)
        | DynSolValue::FixedArray(items)
        | DynSolValue::Tuple(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
    }
}
