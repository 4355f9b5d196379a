//! [`Value`] — the closed union of every shape the bridge can marshal.

use crate::constants::regexp_flags;
use crate::error::EncodeError;

/// A script-language value as seen by the bridge.
///
/// The set is closed: every variant has a wire opcode except
/// [`Value::HostObject`], which exists so engine-native handles can flow
/// through glue code as first-class values while [`Value::classify`] keeps
/// them out of the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The script engine's `undefined`; also stands in for dense-array holes.
    Undefined,
    Null,
    Bool(bool),
    /// Exact integer. Distinct from [`Value::Number`] so integral values
    /// round-trip without a float detour.
    Integer(i64),
    /// Double-precision number.
    Number(f64),
    /// UTF-8 string.
    Str(String),
    /// Ordered elements; holes are `Undefined`.
    DenseArray(Vec<Value>),
    /// Explicit (index, value) pairs; indices need not be contiguous.
    SparseArray(Vec<(u32, Value)>),
    /// Insertion-ordered key/value pairs; keys may be any value.
    Map(Vec<(Value, Value)>),
    /// Insertion-ordered unique elements.
    Set(Vec<Value>),
    /// Insertion-ordered string-keyed pairs.
    Object(Vec<(String, Value)>),
    RegExp(RegExpValue),
    Error(ErrorValue),
    /// Opaque handle to an engine-native object. Cannot cross the boundary
    /// by value; `classify` rejects it.
    HostObject(u32),
}

/// A regular expression: pattern source plus a flags bitmask
/// (see [`crate::regexp_flags`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegExpValue {
    pub pattern: String,
    pub flags: u8,
}

impl RegExpValue {
    pub fn new(pattern: impl Into<String>, flags: u8) -> Self {
        Self {
            pattern: pattern.into(),
            flags,
        }
    }

    /// Renders the flags bitmask in the conventional `gimsuy` spelling.
    pub fn flags_string(&self) -> String {
        let mut out = String::new();
        for (bit, ch) in [
            (regexp_flags::GLOBAL, 'g'),
            (regexp_flags::IGNORE_CASE, 'i'),
            (regexp_flags::MULTILINE, 'm'),
            (regexp_flags::DOTALL, 's'),
            (regexp_flags::UNICODE, 'u'),
            (regexp_flags::STICKY, 'y'),
        ] {
            if self.flags & bit != 0 {
                out.push(ch);
            }
        }
        out
    }
}

/// A script error: kind tag, message, optional stack trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    pub kind: ErrorKind,
    pub message: String,
    pub stack: Option<String>,
}

impl ErrorValue {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// Error constructor families of the script engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    Eval,
    Range,
    Reference,
    Syntax,
    Type,
    Uri,
}

impl ErrorKind {
    /// Wire tag byte for this kind.
    pub fn tag(self) -> u8 {
        match self {
            ErrorKind::Error => 0,
            ErrorKind::Eval => 1,
            ErrorKind::Range => 2,
            ErrorKind::Reference => 3,
            ErrorKind::Syntax => 4,
            ErrorKind::Type => 5,
            ErrorKind::Uri => 6,
        }
    }

    /// Inverse of [`ErrorKind::tag`].
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ErrorKind::Error),
            1 => Some(ErrorKind::Eval),
            2 => Some(ErrorKind::Range),
            3 => Some(ErrorKind::Reference),
            4 => Some(ErrorKind::Syntax),
            5 => Some(ErrorKind::Type),
            6 => Some(ErrorKind::Uri),
            _ => None,
        }
    }

    /// Constructor name, e.g. `TypeError`.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::Eval => "EvalError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Uri => "URIError",
        }
    }
}

/// Kind tag of a serializable value, used to select the encoding opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Integer,
    Number,
    String,
    DenseArray,
    SparseArray,
    Map,
    Set,
    Object,
    RegExp,
    Error,
}

impl Value {
    /// Deterministic kind lookup.
    ///
    /// Fails with [`EncodeError::UnsupportedValueKind`] for values outside
    /// the serializable set; a future kind gets a new explicit tag here, it
    /// is never coerced silently.
    pub fn classify(&self) -> Result<ValueKind, EncodeError> {
        match self {
            Value::Undefined => Ok(ValueKind::Undefined),
            Value::Null => Ok(ValueKind::Null),
            Value::Bool(_) => Ok(ValueKind::Boolean),
            Value::Integer(_) => Ok(ValueKind::Integer),
            Value::Number(_) => Ok(ValueKind::Number),
            Value::Str(_) => Ok(ValueKind::String),
            Value::DenseArray(_) => Ok(ValueKind::DenseArray),
            Value::SparseArray(_) => Ok(ValueKind::SparseArray),
            Value::Map(_) => Ok(ValueKind::Map),
            Value::Set(_) => Ok(ValueKind::Set),
            Value::Object(_) => Ok(ValueKind::Object),
            Value::RegExp(_) => Ok(ValueKind::RegExp),
            Value::Error(_) => Ok(ValueKind::Error),
            Value::HostObject(_) => {
                Err(EncodeError::UnsupportedValueKind(self.kind_name()))
            }
        }
    }

    /// Human-readable variant name, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::DenseArray(_) => "dense array",
            Value::SparseArray(_) => "sparse array",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Object(_) => "object",
            Value::RegExp(_) => "regexp",
            Value::Error(_) => "error",
            Value::HostObject(_) => "host object",
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                // Integral JSON numbers keep their exactness; everything else
                // is a double.
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Number(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(arr) => {
                Value::DenseArray(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Object(
                obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

/// Lossy projection for display and JSON edges. `Undefined` and host objects
/// become null, a `Map` becomes an object only when every key is a string
/// (an array of pairs otherwise), a `Set` becomes an array, a `SparseArray`
/// becomes an object keyed by decimal indices, a `RegExp` becomes
/// `"/pattern/flags"`, an `Error` becomes a `{name, message, stack?}` object.
impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Undefined => serde_json::Value::Null,
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::json!(i),
            Value::Number(f) => serde_json::json!(f),
            Value::Str(s) => serde_json::Value::String(s),
            Value::DenseArray(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            Value::SparseArray(pairs) => serde_json::Value::Object(
                pairs
                    .into_iter()
                    .map(|(i, v)| (i.to_string(), serde_json::Value::from(v)))
                    .collect(),
            ),
            Value::Map(pairs) => {
                let all_string_keys = pairs.iter().all(|(k, _)| matches!(k, Value::Str(_)));
                if all_string_keys {
                    serde_json::Value::Object(
                        pairs
                            .into_iter()
                            .filter_map(|(k, v)| match k {
                                Value::Str(s) => Some((s, serde_json::Value::from(v))),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    serde_json::Value::Array(
                        pairs
                            .into_iter()
                            .map(|(k, v)| {
                                serde_json::Value::Array(vec![
                                    serde_json::Value::from(k),
                                    serde_json::Value::from(v),
                                ])
                            })
                            .collect(),
                    )
                }
            }
            Value::Set(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(pairs) => serde_json::Value::Object(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
            Value::RegExp(re) => {
                serde_json::Value::String(format!("/{}/{}", re.pattern, re.flags_string()))
            }
            Value::Error(err) => {
                let mut obj = serde_json::Map::new();
                obj.insert("name".to_string(), serde_json::json!(err.kind.name()));
                obj.insert("message".to_string(), serde_json::json!(err.message));
                if let Some(stack) = err.stack {
                    obj.insert("stack".to_string(), serde_json::json!(stack));
                }
                serde_json::Value::Object(obj)
            }
            Value::HostObject(_) => serde_json::Value::Null,
        }
    }
}
