//! Per-input validation against Solidity primitive type tags.
//!
//! Only scalar shapes are checked: addresses, unsigned and signed integers,
//! and booleans. Everything else (`bytesN`, `string`, arrays, tuples) is
//! treated as opaque and always valid at this layer; coercion failures for
//! those surface at invocation time instead.

use alloy_primitives::{Address, I256};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

use crate::abi::FunctionDescriptor;

static UNSIGNED_DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// A per-field validation failure. The display strings are shown inline
/// next to the offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid address")]
    InvalidAddress,

    #[error("Must be a positive integer")]
    NotPositiveInteger,

    #[error("Must be a valid integer")]
    NotInteger,

    #[error("Must be a boolean value")]
    NotBoolean,
}

/// Mapping from parameter name to an error message; an empty string marks a
/// valid field. Recomputed on every input change, never persisted.
pub type ValidationErrorSet = BTreeMap<String, String>;

/// Canonical EVM address syntax: `0x` followed by 40 hex digits.
/// Single-case hex is accepted as-is; mixed case must carry a valid
/// EIP-55 checksum.
pub fn is_well_formed_address(value: &str) -> bool {
    let Some(body) = value.strip_prefix("0x") else {
        return false;
    };
    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }
    let mixed = body.bytes().any(|b| b.is_ascii_uppercase())
        && body.bytes().any(|b| b.is_ascii_lowercase());
    if !mixed {
        return true;
    }
    Address::parse_checksummed(value, None).is_ok()
}

/// Validate one named parameter's text value against its declared type tag.
///
/// Rules are matched on the type tag prefix, first applicable rule wins;
/// unmatched types are always valid.
pub fn validate_input(_name: &str, value: &str, ty: &str) -> Result<(), ValidationError> {
    if ty == "address" {
        if !is_well_formed_address(value) {
            return Err(ValidationError::InvalidAddress);
        }
    } else if ty.starts_with("uint") {
        // The digits-only regex already implies non-negative; the sign check
        // stays as an independent guard for arbitrary-width input.
        if !UNSIGNED_DECIMAL.is_match(value) || value.starts_with('-') {
            return Err(ValidationError::NotPositiveInteger);
        }
    } else if ty.starts_with("int") {
        if I256::from_dec_str(value).is_err() {
            return Err(ValidationError::NotInteger);
        }
    } else if ty == "bool"
        && !value.eq_ignore_ascii_case("true")
        && !value.eq_ignore_ascii_case("false")
    {
        return Err(ValidationError::NotBoolean);
    }
    Ok(())
}

/// Derive the full error set for a descriptor from the current input text.
///
/// Pure function over `(descriptor, values)`; the host calls it whenever an
/// input changes and renders the result verbatim. Keys are exactly the
/// descriptor's named inputs.
pub fn validation_errors(
    descriptor: &FunctionDescriptor,
    values: &BTreeMap<String, String>,
) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();
    for input in descriptor.named_inputs() {
        let value = values.get(&input.name).map(String::as_str).unwrap_or("");
        let message = match validate_input(&input.name, value, &input.ty) {
            Ok(()) => String::new(),
            Err(error) => error.to_string(),
        };
        errors.insert(input.name.clone(), message);
    }
    errors
}
