//! Wire types shared by the revalidation server and its clients.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Header carrying the shared revalidation secret.
pub const SECRET_HEADER: &str = "x-revalidate-secret";

/// Response of `/api/revalidate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevalidateResponse {
    pub revalidated: bool,
    /// Unix time in milliseconds.
    pub now: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Response of `/api/revalidate-all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevalidateAllResponse {
    pub success: bool,
    pub total: usize,
    pub revalidated: usize,
    pub failed: usize,
    /// Sample of at most ten failure messages.
    #[serde(default)]
    pub errors: Vec<String>,
    pub now: i64,
}

/// Response of `/api/webhook/magento`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Change notification posted by the commerce backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Missing or non-string values read as empty, an unknown entity.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub entity: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub action: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl WebhookPayload {
    /// Read a non-empty field from `data`, stringifying numbers.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match self.data.get(name)? {
            Value::String(value) => value.trim().to_string(),
            Value::Number(number) => number.to_string(),
            _ => return None,
        };
        (!value.is_empty()).then_some(value)
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => value,
        _ => String::new(),
    })
}
