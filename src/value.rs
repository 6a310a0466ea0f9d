// used for the timestamp kind; offsets are kept but comparisons use the instant
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
// used when a value travels as a wire literal
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;

// used when parsing a type string into a kind
use std::str::FromStr;
// used to print out readable forms of kinds and values
use std::fmt;

use crate::error::{ApiError, Result};
use crate::filter::Op;

pub type Timestamp = DateTime<FixedOffset>;

// ------------- Kind --------------
/// The runtime tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
    Time,
}

impl Kind {
    pub const ALL: [Kind; 13] = [
        Kind::String,
        Kind::Int,
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Uint,
        Kind::Uint8,
        Kind::Uint16,
        Kind::Uint32,
        Kind::Uint64,
        Kind::Bool,
        Kind::Time,
    ];
    pub fn name(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Bool => "bool",
            Kind::Time => "time",
        }
    }
    /// Reads the type-string notation used by definitions, where a leading
    /// `*` marks the attribute as nullable (`"*int8"`).
    pub fn parse_type_string(s: &str) -> Option<(Kind, bool)> {
        let (nullable, name) = match s.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        Kind::from_str(name).ok().map(|kind| (kind, nullable))
    }
    pub fn type_string(&self, nullable: bool) -> String {
        if nullable {
            format!("*{}", self.name())
        } else {
            self.name().to_string()
        }
    }
}
impl FromStr for Kind {
    type Err = ApiError;
    fn from_str(s: &str) -> Result<Kind> {
        Kind::ALL
            .iter()
            .find(|kind| kind.name() == s)
            .copied()
            .ok_or_else(|| ApiError::Definition(format!("unknown attribute kind {s:?}")))
    }
}
impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ------------- Value --------------
/// A typed primitive where every kind may also be null.
///
/// The variant is the tag and never changes after construction. Equality and
/// hashing of timestamps go through the instant, so the same moment written
/// with two different offsets is one value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    String(Option<String>),
    Int(Option<isize>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Uint(Option<usize>),
    Uint8(Option<u8>),
    Uint16(Option<u16>),
    Uint32(Option<u32>),
    Uint64(Option<u64>),
    Bool(Option<bool>),
    Time(Option<Timestamp>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::String(_) => Kind::String,
            Value::Int(_) => Kind::Int,
            Value::Int8(_) => Kind::Int8,
            Value::Int16(_) => Kind::Int16,
            Value::Int32(_) => Kind::Int32,
            Value::Int64(_) => Kind::Int64,
            Value::Uint(_) => Kind::Uint,
            Value::Uint8(_) => Kind::Uint8,
            Value::Uint16(_) => Kind::Uint16,
            Value::Uint32(_) => Kind::Uint32,
            Value::Uint64(_) => Kind::Uint64,
            Value::Bool(_) => Kind::Bool,
            Value::Time(_) => Kind::Time,
        }
    }
    pub fn is_null(&self) -> bool {
        match self {
            Value::String(v) => v.is_none(),
            Value::Int(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::Uint(v) => v.is_none(),
            Value::Uint8(v) => v.is_none(),
            Value::Uint16(v) => v.is_none(),
            Value::Uint32(v) => v.is_none(),
            Value::Uint64(v) => v.is_none(),
            Value::Bool(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
        }
    }
    pub fn null(kind: Kind) -> Value {
        match kind {
            Kind::String => Value::String(None),
            Kind::Int => Value::Int(None),
            Kind::Int8 => Value::Int8(None),
            Kind::Int16 => Value::Int16(None),
            Kind::Int32 => Value::Int32(None),
            Kind::Int64 => Value::Int64(None),
            Kind::Uint => Value::Uint(None),
            Kind::Uint8 => Value::Uint8(None),
            Kind::Uint16 => Value::Uint16(None),
            Kind::Uint32 => Value::Uint32(None),
            Kind::Uint64 => Value::Uint64(None),
            Kind::Bool => Value::Bool(None),
            Kind::Time => Value::Time(None),
        }
    }
    /// The value a freshly created attribute holds: null when the attribute
    /// is nullable, otherwise the zero of its kind (the epoch for timestamps).
    pub fn zero(kind: Kind, nullable: bool) -> Value {
        if nullable {
            return Value::null(kind);
        }
        match kind {
            Kind::String => Value::String(Some(String::new())),
            Kind::Int => Value::Int(Some(0)),
            Kind::Int8 => Value::Int8(Some(0)),
            Kind::Int16 => Value::Int16(Some(0)),
            Kind::Int32 => Value::Int32(Some(0)),
            Kind::Int64 => Value::Int64(Some(0)),
            Kind::Uint => Value::Uint(Some(0)),
            Kind::Uint8 => Value::Uint8(Some(0)),
            Kind::Uint16 => Value::Uint16(Some(0)),
            Kind::Uint32 => Value::Uint32(Some(0)),
            Kind::Uint64 => Value::Uint64(Some(0)),
            Kind::Bool => Value::Bool(Some(false)),
            Kind::Time => Value::Time(Some(DateTime::<Utc>::UNIX_EPOCH.fixed_offset())),
        }
    }

    /// Evaluates `self <op> other`.
    ///
    /// Values of different kinds never compare true, whatever the operator.
    /// Booleans only support `=` and `!=`. A null equals another null of the
    /// same kind and takes no part in ordering.
    pub fn compare(&self, op: &Op, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => ordered(op, a, b),
            (Value::Int(a), Value::Int(b)) => ordered(op, a, b),
            (Value::Int8(a), Value::Int8(b)) => ordered(op, a, b),
            (Value::Int16(a), Value::Int16(b)) => ordered(op, a, b),
            (Value::Int32(a), Value::Int32(b)) => ordered(op, a, b),
            (Value::Int64(a), Value::Int64(b)) => ordered(op, a, b),
            (Value::Uint(a), Value::Uint(b)) => ordered(op, a, b),
            (Value::Uint8(a), Value::Uint8(b)) => ordered(op, a, b),
            (Value::Uint16(a), Value::Uint16(b)) => ordered(op, a, b),
            (Value::Uint32(a), Value::Uint32(b)) => ordered(op, a, b),
            (Value::Uint64(a), Value::Uint64(b)) => ordered(op, a, b),
            (Value::Bool(a), Value::Bool(b)) => equality(op, a, b),
            (Value::Time(a), Value::Time(b)) => ordered(op, a, b),
            _ => false,
        }
    }

    /// The wire literal of this value. Timestamps are written as RFC 3339.
    pub fn to_json(&self) -> Json {
        match self {
            Value::String(v) => v.as_deref().map_or(Json::Null, Json::from),
            Value::Int(v) => v.map_or(Json::Null, Json::from),
            Value::Int8(v) => v.map_or(Json::Null, Json::from),
            Value::Int16(v) => v.map_or(Json::Null, Json::from),
            Value::Int32(v) => v.map_or(Json::Null, Json::from),
            Value::Int64(v) => v.map_or(Json::Null, Json::from),
            Value::Uint(v) => v.map_or(Json::Null, Json::from),
            Value::Uint8(v) => v.map_or(Json::Null, Json::from),
            Value::Uint16(v) => v.map_or(Json::Null, Json::from),
            Value::Uint32(v) => v.map_or(Json::Null, Json::from),
            Value::Uint64(v) => v.map_or(Json::Null, Json::from),
            Value::Bool(v) => v.map_or(Json::Null, Json::from),
            Value::Time(v) => v.map_or(Json::Null, |t| {
                Json::from(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }),
        }
    }

    /// Reads a wire literal as a value of the given kind. Numbers must fit
    /// the kind's width and timestamps must be RFC 3339 strings.
    pub fn from_json(kind: Kind, json: &Json) -> Result<Value> {
        if json.is_null() {
            return Ok(Value::null(kind));
        }
        let invalid = || ApiError::Literal(format!("{json} is not a valid {kind} literal"));
        let signed = || json.as_i64().ok_or_else(invalid);
        let unsigned = || json.as_u64().ok_or_else(invalid);
        let value = match kind {
            Kind::String => Value::from(json.as_str().ok_or_else(invalid)?),
            Kind::Int => Value::from(isize::try_from(signed()?).map_err(|_| invalid())?),
            Kind::Int8 => Value::from(i8::try_from(signed()?).map_err(|_| invalid())?),
            Kind::Int16 => Value::from(i16::try_from(signed()?).map_err(|_| invalid())?),
            Kind::Int32 => Value::from(i32::try_from(signed()?).map_err(|_| invalid())?),
            Kind::Int64 => Value::from(signed()?),
            Kind::Uint => Value::from(usize::try_from(unsigned()?).map_err(|_| invalid())?),
            Kind::Uint8 => Value::from(u8::try_from(unsigned()?).map_err(|_| invalid())?),
            Kind::Uint16 => Value::from(u16::try_from(unsigned()?).map_err(|_| invalid())?),
            Kind::Uint32 => Value::from(u32::try_from(unsigned()?).map_err(|_| invalid())?),
            Kind::Uint64 => Value::from(unsigned()?),
            Kind::Bool => Value::from(json.as_bool().ok_or_else(invalid)?),
            Kind::Time => {
                let text = json.as_str().ok_or_else(invalid)?;
                Value::from(DateTime::parse_from_rfc3339(text).map_err(|_| invalid())?)
            }
        };
        Ok(value)
    }

    /// Reads a wire literal without a declared kind to guide it: strings stay
    /// strings, integers become `int64` (or `uint64` above its range).
    pub fn infer(json: &Json) -> Result<Value> {
        match json {
            Json::String(s) => Ok(Value::from(s.as_str())),
            Json::Bool(b) => Ok(Value::from(*b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::from(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::from(u))
                } else {
                    Err(ApiError::Literal(format!("{n} is not an integer")))
                }
            }
            Json::Null => Err(ApiError::Literal("a null literal needs a typed field".into())),
            _ => Err(ApiError::Literal(format!("{json} is not a primitive literal"))),
        }
    }
}

fn ordered<T: Ord>(op: &Op, a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => match op {
            Op::Eq => a == b,
            Op::Ne => a != b,
            Op::Lt => a < b,
            Op::Le => a <= b,
            Op::Gt => a > b,
            Op::Ge => a >= b,
            _ => false,
        },
        _ => nulls(op, a.is_none(), b.is_none()),
    }
}

fn equality<T: Eq>(op: &Op, a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => match op {
            Op::Eq => a == b,
            Op::Ne => a != b,
            _ => false,
        },
        _ => nulls(op, a.is_none(), b.is_none()),
    }
}

fn nulls(op: &Op, a_null: bool, b_null: bool) -> bool {
    match op {
        Op::Eq => a_null && b_null,
        Op::Ne => a_null != b_null,
        _ => false,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_json() {
            Json::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Value::infer(&json).map_err(serde::de::Error::custom)
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(Some(v))
                }
            }
            impl From<Option<$t>> for Value {
                fn from(v: Option<$t>) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}
value_from!(
    String => String,
    isize => Int,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    usize => Uint,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    bool => Bool,
    Timestamp => Time,
);
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Some(v.to_string()))
    }
}
