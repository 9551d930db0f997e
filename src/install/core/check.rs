//! Outcome of a collaborator pre-install check

/// Result of a named connectivity probe
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    /// Diagnostic payload surfaced to the operator on failure
    pub json_result: serde_json::Value,
}

impl CheckResult {
    pub fn passed(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            success: true,
            json_result: payload,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            name: name.into(),
            success: false,
            json_result: serde_json::json!({ "error": error.to_string() }),
        }
    }
}
