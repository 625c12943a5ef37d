//! Raw API client: URL building, request execution, envelope checks
//!
//! Every operation is a GET of the base endpoint with `key`, `op` and
//! operation-specific query parameters. Responses are JSON envelopes except
//! `getDatasetRaw`, which returns the archive bytes directly.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::error::{LegiscanError, Result};
use crate::transport::Transport;

pub struct ApiClient {
    api_key: String,
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(api_key: &str, base_url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| LegiscanError::Config(format!("invalid base URL {base_url}: {err}")))?;
        Ok(Self {
            api_key: api_key.to_string(),
            base_url,
            transport,
        })
    }

    fn build_url(&self, op: &str, params: &[(&str, &str)]) -> String {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", &self.api_key);
            query.append_pair("op", op);
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        url.into()
    }

    fn get(&self, op: &str, params: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = self.build_url(op, params);
        // The URL carries the secret, so log the operation instead
        tracing::debug!(op, backend = self.transport.name(), "requesting");

        let response = self.transport.get(&url)?;
        if !(200..300).contains(&response.status) {
            return Err(LegiscanError::Transport {
                status: Some(response.status),
                message: format!(
                    "HTTP {} from {op}: {}",
                    response.status,
                    String::from_utf8_lossy(&response.body)
                ),
            });
        }
        Ok(response.body)
    }

    /// Perform a JSON operation and return the undecoded envelope.
    ///
    /// A populated `alert` field (or an `ERROR` status) means the API
    /// rejected the request at the application level even though HTTP
    /// succeeded; that surfaces as [`LegiscanError::Protocol`] so callers
    /// can treat it differently from transport failures.
    pub fn request_value(&self, op: &str, params: &[(&str, &str)]) -> Result<Value> {
        let body = self.get(op, params)?;
        let value: Value = serde_json::from_slice(&body)?;
        check_alert(&value)?;
        Ok(value)
    }

    /// Perform a binary operation (`getDatasetRaw`) and return body bytes
    pub fn request_raw(&self, op: &str, params: &[(&str, &str)]) -> Result<Vec<u8>> {
        self.get(op, params)
    }
}

fn check_alert(value: &Value) -> Result<()> {
    if let Some(alert) = value.get("alert").filter(|a| !a.is_null()) {
        let message = alert
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unspecified API alert")
            .to_string();
        return Err(LegiscanError::Protocol { message });
    }
    if value.get("status").and_then(Value::as_str) == Some("ERROR") {
        return Err(LegiscanError::Protocol {
            message: "API returned status ERROR without an alert".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alert_maps_to_protocol_error() {
        let value = json!({"status": "ERROR", "alert": {"message": "Invalid API key"}});
        let err = check_alert(&value).unwrap_err();
        assert!(matches!(err, LegiscanError::Protocol { ref message } if message == "Invalid API key"));
    }

    #[test]
    fn error_status_without_alert_is_still_protocol() {
        let value = json!({"status": "ERROR"});
        assert!(matches!(check_alert(&value), Err(LegiscanError::Protocol { .. })));
    }

    #[test]
    fn ok_envelope_passes() {
        let value = json!({"status": "OK", "bill": {"bill_id": 1}});
        assert!(check_alert(&value).is_ok());
    }

    #[test]
    fn null_alert_is_not_an_error() {
        let value = json!({"status": "OK", "alert": null});
        assert!(check_alert(&value).is_ok());
    }
}
