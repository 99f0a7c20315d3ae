//! XML response decoding.
//!
//! Typed decoding goes through `quick-xml`'s serde support. Callers who want
//! the payload untouched use `PinboardClient::fetch_raw` instead and never
//! reach this module.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::translate::RawResult;

/// Result code the API uses for a successful write.
pub const DONE: &str = "done";

/// Decode an XML body into `T`.
pub fn decode_xml<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(quick_xml::de::from_reader(body)?)
}

/// Decode a `<result>` document and turn any code but `done` into
/// `ApiError::Rejected`.
pub fn decode_result_code(body: &[u8]) -> Result<()> {
    let code = decode_xml::<RawResult>(body)?.value();
    if code == DONE {
        Ok(())
    } else {
        warn!(code = %code, "request rejected");
        Err(ApiError::Rejected(code))
    }
}

/// Decode a `<result>` document whose text is the payload.
pub fn decode_text(body: &[u8]) -> Result<String> {
    Ok(decode_xml::<RawResult>(body)?.value())
}
