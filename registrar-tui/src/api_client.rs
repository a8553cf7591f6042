//! HTTP record gateway.
//!
//! Every operation is a JSON POST against the backend's instance API. The
//! response envelope is decoded by `registrar_core::gateway`.

use crate::config::TuiConfig;
use async_trait::async_trait;
use registrar_core::{
    Envelope, GatewayError, Record, RecordGateway, RecordId, SchemaField, SchemaResponse,
};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const LIST_PATH: &str = "/api/instance/list";
pub const METADATA_PATH: &str = "/api/metadata";
pub const SELECT_PATH: &str = "/api/instance/select";
pub const INSERT_PATH: &str = "/api/instance/insert";
pub const UPDATE_PATH: &str = "/api/instance/update";
pub const DELETE_PATH: &str = "/api/instance/delete";

const LIST_KIND: &str = "instance_list";

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config error: {0}")]
    Config(String),
}

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    table: &'a str,
}

#[derive(Debug, Serialize)]
struct TableRequest<'a> {
    table: &'a str,
}

#[derive(Debug, Serialize)]
struct RecordRequest<'a> {
    table: &'a str,
    uuid: &'a RecordId,
}

#[derive(Debug, Serialize)]
struct InsertRequest<'a> {
    table: &'a str,
    data: &'a Record,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    table: &'a str,
    uuid: &'a RecordId,
    data: &'a Record,
}

#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpGateway {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        let base_url = config.api_base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiClientError::Config("api_base_url is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url,
            timeout_ms: config.request_timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;
        decode_body(status, &text).inspect_err(|err| warn!(path, error = %err, "Request failed"))
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                ms: self.timeout_ms,
            }
        } else {
            GatewayError::transport(err.to_string())
        }
    }
}

/// Decode a response body. Non-JSON bodies from error statuses become
/// rejections carrying the body text.
pub fn decode_body<T: serde::de::DeserializeOwned>(
    status: u16,
    text: &str,
) -> Result<T, GatewayError> {
    serde_json::from_str(text).map_err(|err| {
        if (200..300).contains(&status) {
            GatewayError::decode(err.to_string())
        } else {
            let message = text.trim();
            GatewayError::rejected(
                status,
                if message.is_empty() {
                    format!("HTTP {status}")
                } else {
                    message.chars().take(200).collect()
                },
            )
        }
    })
}

#[async_trait]
impl RecordGateway for HttpGateway {
    async fn list(&self, table: &str) -> Result<Vec<Record>, GatewayError> {
        let body = ListRequest {
            kind: LIST_KIND,
            table,
        };
        let envelope: Envelope<Vec<Record>> = self.post_json(LIST_PATH, &body).await?;
        Ok(envelope.into_status()?.unwrap_or_default())
    }

    async fn schema(&self, table: &str) -> Result<Vec<SchemaField>, GatewayError> {
        let response: SchemaResponse = self
            .post_json(METADATA_PATH, &TableRequest { table })
            .await?;
        response.into_fields()
    }

    async fn select_one(&self, table: &str, id: &RecordId) -> Result<Record, GatewayError> {
        let envelope: Envelope<Record> = self
            .post_json(SELECT_PATH, &RecordRequest { table, uuid: id })
            .await?;
        envelope.into_data()
    }

    async fn insert(&self, table: &str, data: Record) -> Result<(), GatewayError> {
        let envelope: Envelope<serde_json::Value> = self
            .post_json(INSERT_PATH, &InsertRequest { table, data: &data })
            .await?;
        envelope.into_status().map(|_| ())
    }

    async fn update(&self, table: &str, id: &RecordId, data: Record) -> Result<(), GatewayError> {
        let body = UpdateRequest {
            table,
            uuid: id,
            data: &data,
        };
        let envelope: Envelope<serde_json::Value> = self.post_json(UPDATE_PATH, &body).await?;
        envelope.into_status().map(|_| ())
    }

    async fn delete(&self, table: &str, id: &RecordId) -> Result<(), GatewayError> {
        let envelope: Envelope<serde_json::Value> = self
            .post_json(DELETE_PATH, &RecordRequest { table, uuid: id })
            .await?;
        envelope.into_status().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_body_carries_kind() {
        let body = ListRequest {
            kind: LIST_KIND,
            table: "staffers",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"type": "instance_list", "table": "staffers"})
        );
    }

    #[test]
    fn test_update_body_shape() {
        let id = RecordId::new("u-1");
        let data = Record::new().with("deleted", true);
        let body = UpdateRequest {
            table: "nomenclature",
            uuid: &id,
            data: &data,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"table": "nomenclature", "uuid": "u-1", "data": {"deleted": true}})
        );
    }

    #[test]
    fn test_html_error_page_becomes_rejection() {
        let result: Result<Envelope<Record>, _> = decode_body(502, "<html>Bad Gateway</html>");
        assert_eq!(
            result.unwrap_err(),
            GatewayError::rejected(502, "<html>Bad Gateway</html>")
        );
    }

    #[test]
    fn test_garbage_with_ok_status_is_decode_error() {
        let result: Result<Envelope<Record>, _> = decode_body(200, "not json");
        assert!(matches!(result, Err(GatewayError::Decode { .. })));
    }

    #[test]
    fn test_error_status_with_envelope_is_decoded() {
        let envelope: Envelope<Record> =
            decode_body(500, r#"{"status": 500, "message": "db down"}"#).unwrap();
        assert_eq!(
            envelope.into_data(),
            Err(GatewayError::rejected(500, "db down"))
        );
    }
}
