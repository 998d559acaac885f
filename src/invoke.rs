//! Per-function invocation state: collect input text, validate it, and
//! dispatch a call or a transaction based on declared mutability.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::abi::FunctionDescriptor;
use crate::contract::ContractHandle;
use crate::failure::readable_failure;
use crate::validate::{validate_input, ValidationErrorSet};

/// The rendered result of one invocation. Transient; overwritten by the
/// next invocation of the same function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    Success(String),
    Failure(String),
}

impl InvocationOutcome {
    /// The display string, whichever way the invocation went.
    pub fn text(&self) -> &str {
        match self {
            InvocationOutcome::Success(text) | InvocationOutcome::Failure(text) => text,
        }
    }
}

/// One invocation controller per ABI entry.
///
/// Owns the text entered for each named input, the inline validation state
/// and the last outcome. At most one invocation may be outstanding at a
/// time; an outcome that resolves after the underlying handle has been
/// replaced is discarded silently.
pub struct FunctionCaller {
    descriptor: FunctionDescriptor,
    handle: Arc<ContractHandle>,
    values: BTreeMap<String, String>,
    validation: ValidationErrorSet,
    outcome: Option<InvocationOutcome>,
    busy: bool,
}

impl FunctionCaller {
    pub(crate) fn new(descriptor: FunctionDescriptor, handle: Arc<ContractHandle>) -> Self {
        let values = descriptor
            .named_inputs()
            .map(|input| (input.name.clone(), String::new()))
            .collect();
        Self {
            descriptor,
            handle,
            values,
            validation: ValidationErrorSet::new(),
            outcome: None,
            busy: false,
        }
    }

    pub fn descriptor(&self) -> &FunctionDescriptor {
        &self.descriptor
    }

    /// Record one input edit and revalidate that field. Edits for unknown
    /// or unnamed parameters are ignored; those are never solicited.
    pub fn set_input(&mut self, name: &str, value: &str) {
        let Some(slot) = self.values.get_mut(name) else {
            return;
        };
        *slot = value.to_string();
        let ty = self
            .descriptor
            .inputs
            .iter()
            .find(|input| input.name == name)
            .map(|input| input.ty.clone())
            .unwrap_or_default();
        let message = match validate_input(name, value, &ty) {
            Ok(()) => String::new(),
            Err(error) => error.to_string(),
        };
        self.validation.insert(name.to_string(), message);
    }

    /// The inline error for a field, if it currently has one.
    pub fn validation_error(&self, name: &str) -> Option<&str> {
        self.validation
            .get(name)
            .map(String::as_str)
            .filter(|message| !message.is_empty())
    }

    /// Enablement rule for the submit control: read-only functions are
    /// always invocable; state-changing ones only when every named input is
    /// non-empty and passes validation. Re-derived on every call.
    pub fn can_invoke(&self) -> bool {
        if self.busy {
            return false;
        }
        if self.descriptor.is_read_only() {
            return true;
        }
        self.descriptor.named_inputs().all(|input| {
            let value = self.values.get(&input.name).map(String::as_str).unwrap_or("");
            !value.is_empty() && validate_input(&input.name, value, &input.ty).is_ok()
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The last rendered outcome, if any.
    pub fn outcome(&self) -> Option<&InvocationOutcome> {
        self.outcome.as_ref()
    }

    /// Invoke the function with the currently entered values.
    ///
    /// Builds the positional argument list in ABI input order (unnamed
    /// inputs resolve to the empty string), then takes the read path for
    /// `view`/`pure` entries and the transact-and-wait path otherwise.
    /// Returns `None` when another invocation is already outstanding or the
    /// handle went stale before the result resolved.
    pub async fn invoke(&mut self) -> Option<&InvocationOutcome> {
        if self.busy {
            return None;
        }
        self.busy = true;
        self.outcome = None;

        let args: Vec<String> = self
            .descriptor
            .inputs
            .iter()
            .map(|input| self.values.get(&input.name).cloned().unwrap_or_default())
            .collect();

        let produced = if self.descriptor.is_read_only() {
            match self.handle.call(&self.descriptor.name, &args).await {
                Ok(display) => InvocationOutcome::Success(display),
                Err(failure) => {
                    InvocationOutcome::Failure(format!("Error: {}", readable_failure(&failure)))
                }
            }
        } else {
            match self.handle.send(&self.descriptor.name, &args).await {
                Ok(hash) => {
                    InvocationOutcome::Success(format!("Transaction successful! Hash: {hash}"))
                }
                Err(failure) => {
                    InvocationOutcome::Failure(format!("Error: {}", readable_failure(&failure)))
                }
            }
        };

        self.busy = false;
        if self.handle.is_stale() {
            // The session was rebound while this invocation was in flight;
            // the result belongs to a dead handle and must not be rendered.
            self.outcome = None;
            return None;
        }
        self.outcome = Some(produced);
        self.outcome.as_ref()
    }
}
