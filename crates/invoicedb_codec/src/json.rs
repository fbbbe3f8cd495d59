//! JSON-per-line codec.

use crate::error::{CodecError, CodecResult};
use crate::RecordCodec;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// Encode a record as a single line of compact JSON.
///
/// `serde_json` escapes control characters inside strings, so the output
/// never contains a raw line terminator for well-behaved `Serialize`
/// implementations. The result is checked anyway, since a custom
/// implementation could emit a raw value.
///
/// # Errors
///
/// Returns `EncodingFailed` if serialization fails, or
/// `EmbeddedLineTerminator` if the output spans more than one line.
pub fn to_json_line<T: Serialize>(record: &T) -> CodecResult<String> {
    let line =
        serde_json::to_string(record).map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    if line.contains(['\n', '\r']) {
        return Err(CodecError::EmbeddedLineTerminator);
    }
    Ok(line)
}

/// Decode a record from one line of JSON.
///
/// # Errors
///
/// Returns `MalformedRecord` if the line is not a valid encoding of `T`.
pub fn from_json_line<T: DeserializeOwned>(line: &str) -> CodecResult<T> {
    serde_json::from_str(line).map_err(|e| CodecError::malformed(e.to_string()))
}

/// A [`RecordCodec`] that stores each record as compact JSON.
///
/// Field order follows the `Serialize` implementation, so encoding is
/// deterministic for a given type.
pub struct JsonLineCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonLineCodec<T> {
    /// Creates a new codec.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonLineCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonLineCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonLineCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonLineCodec")
    }
}

impl<T> RecordCodec<T> for JsonLineCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, record: &T) -> CodecResult<String> {
        to_json_line(record)
    }

    fn decode(&self, line: &str) -> CodecResult<T> {
        from_json_line(line)
    }
}
