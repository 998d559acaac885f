//! Tolerant normalization of pasted ABI text.
//!
//! ABI arrays copied out of explorers, chat logs and editors routinely carry
//! single quotes, bare identifier keys and trailing commas. This module
//! repairs those deviations, parses the result as strict JSON and surfaces
//! the entries as [`FunctionDescriptor`]s. It is not a relaxed-JSON parser;
//! only the deviations listed above are repaired, in a fixed order.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

/// Quote a bare identifier key immediately preceding a colon.
static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,]\s*)(\w+):").unwrap()
});
/// A comma sitting directly before a closing brace or bracket.
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",(\s*[}\]])").unwrap()
});
/// A run of two or more consecutive commas.
static COMMA_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",,+").unwrap()
});

/// Failures of the ABI text normalizer. All recoverable; the display
/// strings are shown to the user next to the ABI input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("Input cannot be empty")]
    Empty,

    #[error("Invalid JSON format: Must start and end with []")]
    NotArray,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid JSON: Must be an array")]
    NotObject,

    /// The array-ness of a newly parsed value differs from the
    /// previously accepted one.
    #[error("Please enter ABI properly")]
    ShapeMismatch,
}

/// Declared mutability of an ABI entry. Decides the call-vs-transact path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    View,
    Pure,
    #[default]
    Nonpayable,
    Payable,
}

/// The `type` tag of an ABI entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    #[default]
    Function,
    Constructor,
    Event,
    Fallback,
    Receive,
    Error,
    #[serde(other)]
    Other,
}

/// One input or output parameter of an ABI entry. An empty `name` marks an
/// unnamed parameter; unnamed inputs are never solicited from the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: String,
}

impl ParamDescriptor {
    /// Form label for this parameter: `name (type)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.ty)
    }
}

/// One entry of a parsed ABI array. Immutable once parsed; unknown JSON
/// fields (`internalType`, `anonymous`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ParamDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<ParamDescriptor>>,
    #[serde(rename = "stateMutability", default)]
    pub state_mutability: StateMutability,
    #[serde(rename = "type", default)]
    pub kind: DescriptorKind,
}

impl FunctionDescriptor {
    /// True for `view`/`pure` entries, which only ever take the read path.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }

    /// The named inputs, in declaration order.
    pub fn named_inputs(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.inputs.iter().filter(|input| !input.name.is_empty())
    }
}

/// A successfully repaired and parsed ABI.
#[derive(Debug, Clone)]
pub struct NormalizedAbi {
    /// The repaired text that was actually parsed.
    pub raw: String,
    /// Pretty-printed (2-space indented) rendering of the parsed value.
    pub formatted: String,
    /// The parsed JSON value.
    pub parsed: Value,
    /// The entries, one descriptor per array element.
    pub descriptors: Vec<FunctionDescriptor>,
}

/// Repair and parse user-supplied ABI text.
///
/// Steps, each a hard precondition for the next: reject empty input, require
/// a `[`..`]` wrapper, apply the textual repair passes in order (single
/// quotes, bare keys, trailing commas, comma runs), parse as strict JSON,
/// require a non-null object or array.
pub fn normalize_abi_text(input: &str) -> Result<NormalizedAbi, AbiError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AbiError::Empty);
    }
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return Err(AbiError::NotArray);
    }

    // Repair passes. Order matters: later passes assume earlier ones ran.
    let cleaned = trimmed.replace('\'', "\"");
    let cleaned = BARE_KEY.replace_all(&cleaned, "$1\"$2\":");
    let cleaned = TRAILING_COMMA.replace_all(&cleaned, "$1");
    let cleaned = COMMA_RUN.replace_all(&cleaned, ",").into_owned();

    let parsed: Value =
        serde_json::from_str(&cleaned).map_err(|e| AbiError::InvalidJson(e.to_string()))?;
    if !(parsed.is_object() || parsed.is_array()) {
        return Err(AbiError::NotObject);
    }
    let formatted =
        serde_json::to_string_pretty(&parsed).map_err(|e| AbiError::InvalidJson(e.to_string()))?;
    let descriptors = descriptors_from(&parsed);

    Ok(NormalizedAbi {
        raw: cleaned,
        formatted,
        parsed,
        descriptors,
    })
}

fn descriptors_from(parsed: &Value) -> Vec<FunctionDescriptor> {
    match parsed {
        Value::Array(entries) => entries
            .iter()
            .map(|entry| serde_json::from_value(entry.clone()).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    }
}

/// Caller-side state for an editable ABI field.
///
/// On failure the user's raw text stays in the field, the error is surfaced,
/// and the previously accepted descriptor list is cleared so no stale entry
/// remains active. Clearing the field resets everything without an error.
#[derive(Debug, Default)]
pub struct AbiInput {
    text: String,
    descriptors: Vec<FunctionDescriptor>,
    error: Option<AbiError>,
    accepted_array: Option<bool>,
}

impl AbiInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one edit of the ABI field.
    pub fn set_text(&mut self, value: &str) {
        if value.is_empty() {
            *self = Self::default();
            return;
        }
        match normalize_abi_text(value) {
            Ok(normalized) => {
                let is_array = normalized.parsed.is_array();
                if self.accepted_array.is_some_and(|prev| prev != is_array) {
                    self.fail(value, AbiError::ShapeMismatch);
                    return;
                }
                self.text = normalized.formatted;
                self.descriptors = normalized.descriptors;
                self.accepted_array = Some(is_array);
                self.error = None;
            }
            Err(error) => self.fail(value, error),
        }
    }

    fn fail(&mut self, value: &str, error: AbiError) {
        self.text = value.to_string();
        self.descriptors.clear();
        self.error = Some(error);
    }

    /// The text currently in the field (formatted on success, the user's
    /// raw text on failure).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The accepted descriptor list; empty while the field is in error.
    pub fn descriptors(&self) -> &[FunctionDescriptor] {
        &self.descriptors
    }

    pub fn error(&self) -> Option<&AbiError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STRICT: &str = r#"[
        {
            "inputs": [{"internalType": "bytes32", "name": "role", "type": "bytes32"}],
            "name": "getRoleAdmin",
            "outputs": [{"internalType": "bytes32", "name": "", "type": "bytes32"}],
            "stateMutability": "view",
            "type": "function"
        }
    ]"#;

    #[test]
    fn strict_json_passes_through() {
        let normalized = normalize_abi_text(STRICT).unwrap();
        assert_eq!(normalized.descriptors.len(), 1);
        let descriptor = &normalized.descriptors[0];
        assert_eq!(descriptor.name, "getRoleAdmin");
        assert_eq!(descriptor.state_mutability, StateMutability::View);
        assert_eq!(descriptor.kind, DescriptorKind::Function);
        assert_eq!(descriptor.inputs[0].ty, "bytes32");
    }

    #[test]
    fn repairs_single_quotes_bare_keys_and_trailing_commas() {
        let sloppy = r#"[{name: 'transfer', type: 'function', stateMutability: 'nonpayable',
            inputs: [{name: 'to', type: 'address'}, {name: 'value', type: 'uint256'},],},]"#;
        let normalized = normalize_abi_text(sloppy).unwrap();
        assert_eq!(normalized.descriptors.len(), 1);
        assert_eq!(normalized.descriptors[0].name, "transfer");
        assert_eq!(normalized.descriptors[0].inputs.len(), 2);
        assert_eq!(
            normalized.descriptors[0].state_mutability,
            StateMutability::Nonpayable
        );
    }

    #[test]
    fn repaired_text_matches_hand_fixed_json() {
        let sloppy = "[{name: 'a', type: 'function',, inputs: [],}]";
        let fixed = r#"[{"name": "a", "type": "function", "inputs": []}]"#;
        let normalized = normalize_abi_text(sloppy).unwrap();
        let strict: Value = serde_json::from_str(fixed).unwrap();
        assert_eq!(normalized.parsed, strict);
    }

    #[test]
    fn collapses_comma_runs() {
        let normalized = normalize_abi_text("[{\"name\": \"f\"},,, {\"name\": \"g\"}]").unwrap();
        assert_eq!(normalized.descriptors.len(), 2);
    }

    #[test]
    fn empty_and_whitespace_rejected() {
        assert_eq!(normalize_abi_text("").unwrap_err(), AbiError::Empty);
        assert_eq!(normalize_abi_text("   \n\t").unwrap_err(), AbiError::Empty);
    }

    #[test]
    fn must_be_wrapped_in_brackets() {
        assert_eq!(
            normalize_abi_text("{\"name\": \"f\"}").unwrap_err(),
            AbiError::NotArray
        );
        assert_eq!(normalize_abi_text("[oops").unwrap_err(), AbiError::NotArray);
    }

    #[test]
    fn syntax_failure_carries_the_parser_message() {
        match normalize_abi_text("[{\"name\" \"f\"}]").unwrap_err() {
            AbiError::InvalidJson(message) => assert!(!message.is_empty()),
            other => panic!("expected InvalidJson, got {other:?}"),
        }
    }

    #[test]
    fn formatted_output_is_two_space_indented() {
        let normalized = normalize_abi_text("[{\"name\": \"f\"}]").unwrap();
        assert!(normalized.formatted.contains("  \"name\""));
    }

    #[test]
    fn missing_mutability_defaults_to_nonpayable() {
        let normalized = normalize_abi_text("[{\"name\": \"f\", \"type\": \"function\"}]").unwrap();
        assert_eq!(
            normalized.descriptors[0].state_mutability,
            StateMutability::Nonpayable
        );
    }

    #[test]
    fn unknown_kind_is_tolerated() {
        let normalized =
            normalize_abi_text("[{\"name\": \"f\", \"type\": \"weird-extension\"}]").unwrap();
        assert_eq!(normalized.descriptors[0].kind, DescriptorKind::Other);
    }

    #[test]
    fn abi_input_failure_keeps_raw_text_and_clears_descriptors() {
        let mut input = AbiInput::new();
        input.set_text("[{\"name\": \"f\"}]");
        assert_eq!(input.descriptors().len(), 1);

        input.set_text("[{\"name\" \"f\"}]");
        assert_eq!(input.text(), "[{\"name\" \"f\"}]");
        assert!(input.descriptors().is_empty());
        assert!(matches!(input.error(), Some(AbiError::InvalidJson(_))));
    }

    #[test]
    fn abi_input_clearing_resets_without_error() {
        let mut input = AbiInput::new();
        input.set_text("[{\"name\" \"f\"}]");
        input.set_text("");
        assert_eq!(input.text(), "");
        assert!(input.descriptors().is_empty());
        assert!(input.error().is_none());
    }

    #[test]
    fn abi_input_shape_mismatch_against_prior_accepted_value() {
        let mut input = AbiInput {
            accepted_array: Some(false),
            ..AbiInput::default()
        };
        input.set_text("[{\"name\": \"f\"}]");
        assert_eq!(input.error(), Some(&AbiError::ShapeMismatch));
        assert!(input.descriptors().is_empty());
    }

    #[test]
    fn non_array_entries_degrade_to_default_descriptors() {
        let descriptors = descriptors_from(&json!([42]));
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0], FunctionDescriptor::default());
    }

    #[test]
    fn param_label_format() {
        let param = ParamDescriptor {
            name: "to".into(),
            ty: "address".into(),
        };
        assert_eq!(param.label(), "to (address)");
    }
}
