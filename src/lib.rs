//! Core pipeline for interacting with arbitrary smart contracts from
//! pasted ABI text.
//!
//! The flow mirrors the hosting UI: user text goes through the tolerant
//! normalizer in [`abi`] to produce function descriptors; a
//! [`session::ContractSession`] binds one [`contract::ContractHandle`] per
//! (address, ABI) pair against the active signer; each descriptor gets an
//! [`invoke::FunctionCaller`] that validates per-field input with
//! [`validate`], dispatches a read call or a transaction based on declared
//! mutability, and renders either the stringified result or a message
//! normalized by [`failure`].
//!
//! The signer/provider and the execution runtime stay behind the traits in
//! [`runtime`]; nothing here talks to a chain directly.

pub mod abi;
pub mod contract;
pub mod failure;
pub mod invoke;
pub mod runtime;
pub mod session;
pub mod validate;

pub use abi::{
    normalize_abi_text, AbiError, AbiInput, DescriptorKind, FunctionDescriptor, NormalizedAbi,
    ParamDescriptor, StateMutability,
};
pub use contract::ContractHandle;
pub use failure::{readable_error_message, readable_failure};
pub use invoke::{FunctionCaller, InvocationOutcome};
pub use runtime::{ContractRuntime, PendingTransaction, RuntimeFailure, Signer, SignerSource};
pub use session::{BindError, BoundContract, ContractSession};
pub use validate::{
    is_well_formed_address, validate_input, validation_errors, ValidationError, ValidationErrorSet,
};
