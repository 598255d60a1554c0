//! Trigger request payload parsing.

use serde::Deserialize;

use crate::error::TriggerError;

/// Name of the JSON field carrying the job name.
pub const CRON_NAME_FIELD: &str = "cronName";

/// Body of `POST /trigger`.
#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    #[serde(rename = "cronName", default)]
    pub cron_name: Option<String>,
}

impl TriggerRequest {
    /// Parse a raw request body and extract a non-empty job name.
    ///
    /// Anything that is not a JSON object with an optional string
    /// `cronName` (including an empty body) is a `MalformedRequest`; a
    /// missing, `null` or empty `cronName` is a `MissingParameter`.
    pub fn parse(body: &[u8]) -> Result<String, TriggerError> {
        // Structs also deserialize from JSON arrays, so insist on an object first.
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)
            .map_err(|e| TriggerError::MalformedRequest(e.to_string()))?;
        let request = TriggerRequest::deserialize(serde_json::Value::Object(object))
            .map_err(|e| TriggerError::MalformedRequest(e.to_string()))?;

        match request.cron_name {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(TriggerError::MissingParameter(CRON_NAME_FIELD)),
        }
    }
}
