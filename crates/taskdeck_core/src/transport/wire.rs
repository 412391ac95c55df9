//! Batch envelope and per-call outcome wire types.
//!
//! # Invariants
//! - `BatchResponse.results` is positional: exactly one outcome per call,
//!   in request order.
//! - One failing call never affects sibling outcomes.
//! - Rich values survive the boundary losslessly: timestamps are epoch-ms
//!   integers and stay comparable after decode; optional fields are
//!   explicit nulls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire form of the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Validation,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
}

/// One named procedure invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureCall {
    /// Dotted procedure name, e.g. `project.getProjectById`.
    pub path: String,
    /// Input payload; `null` for input-less procedures.
    #[serde(default)]
    pub input: Value,
}

impl ProcedureCall {
    pub fn new(path: impl Into<String>, input: Value) -> Self {
        Self {
            path: path.into(),
            input,
        }
    }
}

/// Calls coalesced into one network exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub calls: Vec<ProcedureCall>,
}

/// Outcome of one call within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    Ok { data: Value },
    Err { code: ErrorCode, message: String },
}

impl CallOutcome {
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Err { .. })
    }

    /// Splits the outcome into data or `(code, message)`.
    pub fn into_result(self) -> Result<Value, (ErrorCode, String)> {
        match self {
            Self::Ok { data } => Ok(data),
            Self::Err { code, message } => Err((code, message)),
        }
    }
}

/// Positional outcomes for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<CallOutcome>,
}

#[cfg(test)]
mod tests {
    use super::{BatchRequest, CallOutcome, ErrorCode, ProcedureCall};
    use serde_json::json;

    #[test]
    fn error_codes_use_wire_casing() {
        let encoded = serde_json::to_value(ErrorCode::NotFound).expect("code serializes");
        assert_eq!(encoded, json!("NOT_FOUND"));
    }

    #[test]
    fn call_input_defaults_to_null() {
        let call: ProcedureCall =
            serde_json::from_value(json!({ "path": "project.getAllProjects" }))
                .expect("call decodes without input");
        assert!(call.input.is_null());
    }

    #[test]
    fn batch_round_trips_through_json() {
        let request = BatchRequest {
            calls: vec![
                ProcedureCall::new("project.getAllProjects", json!(null)),
                ProcedureCall::new("project.create", json!({ "name": "abcde" })),
            ],
        };

        let encoded = serde_json::to_string(&request).expect("batch serializes");
        let decoded: BatchRequest = serde_json::from_str(&encoded).expect("batch decodes");
        assert_eq!(decoded, request);
    }

    #[test]
    fn timestamps_stay_comparable_after_decode() {
        let outcome = CallOutcome::Ok {
            data: json!({ "createdAt": 1_700_000_000_123_i64, "updatedAt": 1_700_000_000_456_i64 }),
        };
        let encoded = serde_json::to_string(&outcome).expect("outcome serializes");
        let decoded: CallOutcome = serde_json::from_str(&encoded).expect("outcome decodes");

        let data = decoded.into_result().expect("outcome is ok");
        let created = data["createdAt"].as_i64().expect("createdAt is integer");
        let updated = data["updatedAt"].as_i64().expect("updatedAt is integer");
        assert!(updated > created);
    }
}
