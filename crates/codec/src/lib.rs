//! Binary value serialization for the tether script/native bridge.
//!
//! Script-language values (objects, dense and sparse arrays, maps, sets,
//! regular expressions, errors, primitives) are modeled as a closed [`Value`]
//! union and marshalled across the native boundary as a self-describing byte
//! stream. Strings are deduplicated per stream: the first occurrence is
//! written as a length-prefixed literal, later occurrences as back-references
//! into a table keyed by (content, [`StringLocation`] bucket). The location
//! of a string is never written to the stream: both sides derive it from
//! structural position, so the table stays in lockstep as long as encoder and
//! decoder agree on the [`DedupMode`].
//!
//! ```
//! use tether_codec::{Value, ValueDecoder, ValueEncoder};
//!
//! let tree = Value::Object(vec![
//!     ("a".to_string(), Value::Str("x".to_string())),
//!     ("b".to_string(), Value::Str("x".to_string())),
//! ]);
//! let mut encoder = ValueEncoder::new();
//! let bytes = encoder.encode(&tree).unwrap();
//! let mut decoder = ValueDecoder::new();
//! assert_eq!(decoder.decode(&bytes).unwrap(), tree);
//! ```

mod constants;
mod decoder;
mod dedup;
mod encoder;
mod error;
mod location;
mod value;

pub use constants::{opcode, regexp_flags, MAX_STRING_BYTES};
pub use decoder::ValueDecoder;
pub use dedup::DedupMode;
pub use encoder::ValueEncoder;
pub use error::{DecodeError, EncodeError};
pub use location::{location_for, StringLocation, StringRole};
pub use value::{ErrorKind, ErrorValue, RegExpValue, Value, ValueKind};
