//! Record gateway contract.
//!
//! Both the table view and the form controller talk to the backend through
//! [`RecordGateway`]. Responses share one envelope where status `200` means
//! success and anything else is a failure carrying a message.

use crate::error::GatewayError;
use crate::record::{Record, RecordId};
use crate::schema::SchemaField;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const STATUS_OK: u16 = 200;

#[async_trait]
pub trait RecordGateway: Send + Sync {
    async fn list(&self, table: &str) -> Result<Vec<Record>, GatewayError>;

    async fn schema(&self, table: &str) -> Result<Vec<SchemaField>, GatewayError>;

    async fn select_one(&self, table: &str, id: &RecordId) -> Result<Record, GatewayError>;

    async fn insert(&self, table: &str, data: Record) -> Result<(), GatewayError>;

    async fn update(&self, table: &str, id: &RecordId, data: Record) -> Result<(), GatewayError>;

    async fn delete(&self, table: &str, id: &RecordId) -> Result<(), GatewayError>;
}

/// Response envelope shared by every gateway call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: STATUS_OK,
            data: Some(data),
            message: None,
        }
    }

    pub fn failed(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Status check only; the payload may be absent.
    pub fn into_status(self) -> Result<Option<T>, GatewayError> {
        if self.status == STATUS_OK {
            Ok(self.data)
        } else {
            Err(GatewayError::rejected(
                self.status,
                self.message.unwrap_or_else(|| "Request failed".to_string()),
            ))
        }
    }

    /// Status check plus a required payload.
    pub fn into_data(self) -> Result<T, GatewayError> {
        self.into_status()?.ok_or(GatewayError::MissingData)
    }
}

/// Schema response. The metadata endpoint answers with a bare field list
/// rather than the status envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaResponse {
    #[serde(default)]
    pub fields: Option<Vec<SchemaField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SchemaResponse {
    pub fn into_fields(self) -> Result<Vec<SchemaField>, GatewayError> {
        match self.fields {
            Some(fields) => Ok(fields),
            None => Err(GatewayError::decode(
                self.message
                    .unwrap_or_else(|| "Could not load field metadata".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_yields_data() {
        let envelope: Envelope<Vec<Record>> =
            serde_json::from_value(json!({"status": 200, "data": [{"uuid": "a"}]})).unwrap();
        let records = envelope.into_data().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_non_ok_status_is_rejected_with_message() {
        let envelope: Envelope<Record> =
            serde_json::from_value(json!({"status": 500, "message": "boom"})).unwrap();
        assert_eq!(
            envelope.into_data(),
            Err(GatewayError::rejected(500, "boom"))
        );
    }

    #[test]
    fn test_ok_without_data_is_missing_data() {
        let envelope: Envelope<Record> = serde_json::from_value(json!({"status": 200})).unwrap();
        assert_eq!(envelope.into_data(), Err(GatewayError::MissingData));
    }

    #[test]
    fn test_ok_without_data_passes_status_check() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"status": 200})).unwrap();
        assert_eq!(envelope.into_status(), Ok(None));
    }

    #[test]
    fn test_schema_without_fields_is_decode_error() {
        let response: SchemaResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            response.into_fields(),
            Err(GatewayError::Decode { .. })
        ));
    }
}
