//! Payload codecs.

use bytes::Bytes;
use courier_error::{CourierResult, DecodeError, RequestBuildError, RequestBuildErrorKind};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Symmetric encoder/decoder for request and response payloads.
pub trait Codec: Send + Sync + 'static {
    /// Media type written to `Content-Type` for encoded request bodies.
    fn content_type(&self) -> &'static str;

    /// Encode a request payload.
    fn encode<T: Serialize + ?Sized>(&self, payload: &T) -> CourierResult<Bytes>;

    /// Decode a response body.
    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> CourierResult<T>;
}

/// JSON codec backed by `serde_json`.
///
/// # Example
///
/// ```
/// use courier_core::{Codec, JsonCodec};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Fact {
///     fact: String,
///     length: u32,
/// }
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Fact { fact: "purr".into(), length: 4 }).unwrap();
/// let fact: Fact = codec.decode(&bytes).unwrap();
/// assert_eq!(fact.length, 4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize + ?Sized>(&self, payload: &T) -> CourierResult<Bytes> {
        serde_json::to_vec(payload)
            .map(Bytes::from)
            .map_err(|e| RequestBuildError::new(RequestBuildErrorKind::Encode(e.to_string())).into())
    }

    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> CourierResult<T> {
        serde_json::from_reader(body).map_err(|e| DecodeError::new(e.to_string()).into())
    }
}
