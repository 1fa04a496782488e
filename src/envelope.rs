use serde::{de::DeserializeOwned, Deserialize};

use crate::{GdprError, Result};

/// Generic wrapper the service puts around every HTTP 200 body.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(rename = "statusCode")]
    pub status_code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

const STATUS_OK: i64 = 200;
const STATUS_NOT_FOUND: i64 = 404;

pub(crate) fn parse_envelope(body: &str) -> Result<Envelope> {
    serde_json::from_str(body).map_err(|err| {
        GdprError::Decode(format!("invalid response envelope: {err}; body: {body}"))
    })
}

/// Fails unless the envelope reports success.
///
/// With `record` set, a 404 inside the envelope becomes
/// [`GdprError::NotFound`] naming that record.
pub(crate) fn ensure_ok(envelope: &Envelope, record: Option<&str>) -> Result<()> {
    match (envelope.status_code, record) {
        (STATUS_OK, _) => Ok(()),
        (STATUS_NOT_FOUND, Some(record)) => Err(GdprError::NotFound(record.to_owned())),
        (status_code, _) => Err(GdprError::Service {
            status_code,
            message: envelope.message.clone().unwrap_or_default(),
        }),
    }
}

/// Decodes the `data` member of a successful envelope.
pub(crate) fn decode_data<T: DeserializeOwned>(envelope: Envelope) -> Result<T> {
    let data = envelope
        .data
        .ok_or_else(|| GdprError::Decode("missing data in response envelope".to_owned()))?;
    serde_json::from_value(data)
        .map_err(|err| GdprError::Decode(format!("invalid envelope data: {err}")))
}
