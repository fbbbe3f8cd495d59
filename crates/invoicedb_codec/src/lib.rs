//! # InvoiceDB Codec
//!
//! One-record-per-line encoding for InvoiceDB.
//!
//! A line store addresses records by line number, so an encoded record
//! must never span more than one line. This crate provides:
//! - The [`RecordCodec`] trait that line stores are generic over
//! - [`JsonLineCodec`], which writes each record as compact JSON
//!
//! ## Usage
//!
//! ```
//! use invoicedb_codec::{JsonLineCodec, RecordCodec};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Note {
//!     id: u64,
//!     text: String,
//! }
//!
//! let codec = JsonLineCodec::<Note>::new();
//! let note = Note { id: 1, text: "two\nlines".into() };
//!
//! let line = codec.encode(&note).unwrap();
//! assert!(!line.contains('\n'));
//! assert_eq!(codec.decode(&line).unwrap(), note);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod json;

pub use error::{CodecError, CodecResult};
pub use json::{from_json_line, to_json_line, JsonLineCodec};

/// Serializes records of type `T` to and from single lines of text.
///
/// # Contract
///
/// - `encode` is deterministic and its output contains no `\n` or `\r`
/// - `decode(encode(r))` yields a record equal to `r`
/// - `decode` reports unparsable input as [`CodecError::MalformedRecord`]
pub trait RecordCodec<T>: Send + Sync {
    /// Encodes `record` as one line, without a terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be represented on one line.
    fn encode(&self, record: &T) -> CodecResult<String>;

    /// Decodes one line, without its terminator.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` if the line does not parse.
    fn decode(&self, line: &str) -> CodecResult<T>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: Option<u64>,
        name: String,
        tags: Vec<String>,
    }

    fn codec() -> JsonLineCodec<Sample> {
        JsonLineCodec::new()
    }

    #[test]
    fn encode_is_single_line() {
        let sample = Sample {
            id: Some(7),
            name: "line one\nline two\r\n".into(),
            tags: vec!["\n".into()],
        };
        let line = codec().encode(&sample).unwrap();
        assert!(!line.contains('\n'));
        assert!(!line.contains('\r'));
        assert_eq!(codec().decode(&line).unwrap(), sample);
    }

    #[test]
    fn deterministic_encoding() {
        let sample = Sample {
            id: None,
            name: "same".into(),
            tags: vec!["a".into(), "b".into()],
        };
        let first = codec().encode(&sample).unwrap();
        let second = codec().encode(&sample.clone()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn decode_garbage_is_malformed() {
        for line in ["", "not json", "{\"id\":", "[1,2,3]", "{\"id\":\"x\"}"] {
            let err = codec().decode(line).unwrap_err();
            assert!(err.is_malformed(), "{line:?} gave {err:?}");
        }
    }

    #[test]
    fn decode_missing_field_is_malformed() {
        let err = codec().decode("{\"id\":1}").unwrap_err();
        assert!(matches!(err, CodecError::MalformedRecord { .. }));
    }

    proptest! {
        #[test]
        fn arbitrary_text_never_breaks_a_line(name in any::<String>(), tags in prop::collection::vec(any::<String>(), 0..4)) {
            let sample = Sample { id: Some(1), name, tags };
            let line = codec().encode(&sample).unwrap();
            prop_assert!(!line.contains(['\n', '\r']));
            prop_assert_eq!(codec().decode(&line).unwrap(), sample);
        }
    }
}
