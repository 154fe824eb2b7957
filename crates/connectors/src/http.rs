//! Response decoding shared by both vendor APIs
//!
//! Both APIs report business failures inside a `{code, msg}` envelope, and
//! Bitable sends many of them with a 4xx status. The envelope is decoded
//! first so those failures keep their vendor code; the HTTP status only
//! decides the error when the body is not an envelope.

use serde::de::DeserializeOwned;

use crate::error::ConnectorError;

/// Response body carrying a vendor status code, `0` meaning success
pub(crate) trait Envelope: DeserializeOwned {
    fn code(&self) -> i64;
}

/// Read and decode a response body
///
/// A non-success status with a body that is not an envelope, or an envelope
/// claiming success, becomes `ConnectorError::Http`.
pub(crate) async fn decode_envelope<T: Envelope>(
    response: reqwest::Response,
) -> Result<T, ConnectorError> {
    let status_error = response.error_for_status_ref().err();
    let body = response.bytes().await?;

    match (serde_json::from_slice::<T>(&body), status_error) {
        (Ok(envelope), None) => Ok(envelope),
        (Ok(envelope), Some(_)) if envelope.code() != 0 => Ok(envelope),
        (_, Some(status)) => Err(ConnectorError::Http(status)),
        (Err(e), None) => Err(ConnectorError::Json(e)),
    }
}
