//! Normalization of heterogeneous contract-call failures into one
//! user-facing message.
//!
//! Wallets, nodes and libraries disagree on failure shapes: some carry a
//! decoded revert reason, some bury it inside a quoted fragment of the
//! message, some nest it under a data payload, and user rejections arrive as
//! bare numeric or symbolic codes. [`readable_error_message`] resolves them
//! in a fixed order and is total — it never fails, whatever the payload.

use serde_json::Value;

use crate::runtime::RuntimeFailure;

/// Message marker for an execution revert carrying a quoted reason.
const REVERT_MARKER: &str = "execution reverted:";
/// Message marker for an account that cannot cover the transaction.
const INSUFFICIENT_MARKER: &str = "insufficient funds";
/// Numeric EIP-1193 user-rejection code.
const REJECTION_CODE: i64 = 4001;
/// Symbolic user-rejection code used by ethers-style libraries.
const REJECTION_SYMBOL: &str = "ACTION_REJECTED";

const REJECTED_MESSAGE: &str = "Transaction was rejected";
const INSUFFICIENT_MESSAGE: &str = "Insufficient funds for transaction";
const GENERIC_MESSAGE: &str = "Transaction failed. Please try again.";
const UNINSPECTABLE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Map an arbitrary failure object to one user-facing string.
///
/// Resolution order, first match wins: a `reason` field verbatim; the quoted
/// reason after the revert marker in `message` (a malformed revert payload
/// falls through); a string `data.message`; the user-rejection code; the
/// insufficient-funds marker; a fixed generic message. A payload that cannot
/// be inspected at all (no `reason` and no string `message`) yields a fixed
/// fallback instead of an error.
pub fn readable_error_message(failure: &Value) -> String {
    match inspect(failure) {
        Some(message) => message,
        None => UNINSPECTABLE_MESSAGE.to_string(),
    }
}

/// [`readable_error_message`] over a runtime failure.
pub fn readable_failure(failure: &RuntimeFailure) -> String {
    readable_error_message(&failure.payload())
}

/// `None` marks a payload that could not be inspected.
fn inspect(failure: &Value) -> Option<String> {
    if let Some(reason) = failure.get("reason").and_then(Value::as_str) {
        return Some(reason.to_string());
    }

    let message = failure.get("message").and_then(Value::as_str)?;

    if message.contains(REVERT_MARKER) {
        let quoted = message
            .split(REVERT_MARKER)
            .nth(1)
            .and_then(|rest| rest.split('"').nth(1));
        if let Some(reason) = quoted {
            return Some(reason.to_string());
        }
        // No quoted reason after the marker: fall through.
    }

    if let Some(nested) = failure
        .get("data")
        .and_then(|data| data.get("message"))
        .and_then(Value::as_str)
    {
        return Some(nested.to_string());
    }

    if let Some(code) = failure.get("code") {
        if code.as_i64() == Some(REJECTION_CODE) || code.as_str() == Some(REJECTION_SYMBOL) {
            return Some(REJECTED_MESSAGE.to_string());
        }
    }

    if message.contains(INSUFFICIENT_MARKER) {
        return Some(INSUFFICIENT_MESSAGE.to_string());
    }

    Some(GENERIC_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reason_field_returned_verbatim() {
        let failure = json!({ "reason": "insufficient allowance", "message": "ignored" });
        assert_eq!(readable_error_message(&failure), "insufficient allowance");
    }

    #[test]
    fn quoted_revert_reason_extracted_from_message() {
        let failure = json!({
            "message": "call failed: execution reverted: \"Ownable: caller is not the owner\" (code=CALL_EXCEPTION)"
        });
        assert_eq!(
            readable_error_message(&failure),
            "Ownable: caller is not the owner"
        );
    }

    #[test]
    fn malformed_revert_payload_falls_through() {
        let failure = json!({
            "message": "execution reverted: no quotes here",
            "data": { "message": "out of gas" }
        });
        assert_eq!(readable_error_message(&failure), "out of gas");
    }

    #[test]
    fn nested_data_message_used_when_string() {
        let failure = json!({ "message": "boom", "data": { "message": "nonce too low" } });
        assert_eq!(readable_error_message(&failure), "nonce too low");

        let non_string = json!({ "message": "boom", "data": { "message": 7 } });
        assert_eq!(readable_error_message(&non_string), GENERIC_MESSAGE);
    }

    #[test]
    fn numeric_and_symbolic_rejection_codes() {
        let numeric = json!({ "message": "denied", "code": 4001 });
        assert_eq!(readable_error_message(&numeric), "Transaction was rejected");

        let symbolic = json!({ "message": "denied", "code": "ACTION_REJECTED" });
        assert_eq!(
            readable_error_message(&symbolic),
            "Transaction was rejected"
        );
    }

    #[test]
    fn insufficient_funds_marker() {
        let failure =
            json!({ "message": "insufficient funds for gas * price + value", "code": -32000 });
        assert_eq!(
            readable_error_message(&failure),
            "Insufficient funds for transaction"
        );
    }

    #[test]
    fn unrecognized_failure_gets_the_generic_message() {
        let failure = json!({ "message": "some other problem", "code": -32603 });
        assert_eq!(readable_error_message(&failure), GENERIC_MESSAGE);
    }

    #[test]
    fn uninspectable_payloads_get_the_fallback() {
        assert_eq!(readable_error_message(&json!({})), UNINSPECTABLE_MESSAGE);
        assert_eq!(
            readable_error_message(&json!({ "message": 5 })),
            UNINSPECTABLE_MESSAGE
        );
        assert_eq!(readable_error_message(&json!(null)), UNINSPECTABLE_MESSAGE);
    }

    #[test]
    fn reason_wins_over_everything_else() {
        let failure = json!({
            "reason": "paused",
            "message": "execution reverted: \"other\"",
            "code": 4001
        });
        assert_eq!(readable_error_message(&failure), "paused");
    }

    #[test]
    fn transport_failures_normalize_through_their_message() {
        let failure = RuntimeFailure::Transport("insufficient funds for transfer".into());
        assert_eq!(
            readable_failure(&failure),
            "Insufficient funds for transaction"
        );
    }
}
