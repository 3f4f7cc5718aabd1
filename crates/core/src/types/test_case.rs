use serde::{Deserialize, Serialize};

use crate::naming::TestCaseDetails;

use super::Traits;

/// One executable test instance produced by discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub display_name: String,
    pub unique_id: String,
    pub collection: String,
    pub class_name: String,
    pub method_name: String,
    pub kind: TestCaseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Traits::is_empty")]
    pub traits: Traits,
    /// Data row for data-driven cases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestCaseKind {
    Standard,
    /// A placeholder that fails with `message` when run
    Error { message: String },
}

impl TestCase {
    pub fn new(details: TestCaseDetails) -> Self {
        Self {
            display_name: details.display_name,
            unique_id: details.unique_id,
            collection: details.collection,
            class_name: details.class_name,
            method_name: details.method_name,
            kind: TestCaseKind::Standard,
            skip_reason: details.skip_reason,
            timeout_ms: details.timeout_ms,
            traits: details.traits,
            data: None,
        }
    }

    /// An error test case. Error cases are never skipped.
    pub fn error(details: TestCaseDetails, message: impl Into<String>) -> Self {
        Self {
            kind: TestCaseKind::Error {
                message: message.into(),
            },
            skip_reason: None,
            ..Self::new(details)
        }
    }

    /// Attach a data row; the row is appended to the display name and
    /// folded into the unique id so rows of one method stay distinct.
    pub fn with_data(mut self, data: Vec<serde_json::Value>) -> Self {
        let rendered = data
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.display_name = format!("{}({rendered})", self.display_name);
        self.unique_id = format!(
            "{:x}",
            md5::compute(format!("{}\0{rendered}", self.unique_id).as_bytes())
        );
        self.data = Some(data);
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TestCaseKind::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.kind {
            TestCaseKind::Error { message } => Some(message),
            TestCaseKind::Standard => None,
        }
    }
}
