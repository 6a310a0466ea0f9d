//! Filter conditions.
//!
//! A [`Condition`] is either a comparison leaf `{field, op, value}` or an
//! `and`/`or` node over child conditions. On the wire a condition is an
//! object with the keys `f` (field), `o` (operator), `v` (literal, or array
//! of child conditions for `and`/`or`) and `c` (collection scope); `f` and
//! `c` are left out when empty.
//!
//! Decoding only looks at the operator to decide how to read `v`. An
//! operator it does not know still decodes, and such a condition simply
//! matches nothing. Evaluation never fails: anything undefined or mismatched
//! is a non-match.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;

use std::fmt;

use tracing::trace;

use crate::error::{ApiError, Result};
use crate::resource::Resource;
use crate::schema::{Schema, Type};
use crate::value::Value;

// ------------- Op -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Unknown(String),
}

impl Op {
    pub fn as_str(&self) -> &str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::And => "and",
            Op::Or => "or",
            Op::Unknown(op) => op,
        }
    }
    pub fn is_comparison(&self) -> bool {
        matches!(self, Op::Eq | Op::Ne | Op::Lt | Op::Le | Op::Gt | Op::Ge)
    }
    pub fn is_boolean(&self) -> bool {
        matches!(self, Op::And | Op::Or)
    }
}
impl From<&str> for Op {
    fn from(op: &str) -> Op {
        match op {
            "=" => Op::Eq,
            "!=" => Op::Ne,
            "<" => Op::Lt,
            "<=" => Op::Le,
            ">" => Op::Gt,
            ">=" => Op::Ge,
            "and" => Op::And,
            "or" => Op::Or,
            other => Op::Unknown(other.to_string()),
        }
    }
}
impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ------------- Condition -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Value(Value),
    Conditions(Vec<Condition>),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub val: Operand,
    /// Name of a to-many relationship the comparison is scoped within.
    pub col: String,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            val: Operand::Value(value.into()),
            col: String::new(),
        }
    }
    pub fn and(children: Vec<Condition>) -> Self {
        Self {
            field: String::new(),
            op: Op::And,
            val: Operand::Conditions(children),
            col: String::new(),
        }
    }
    pub fn or(children: Vec<Condition>) -> Self {
        Self {
            field: String::new(),
            op: Op::Or,
            val: Operand::Conditions(children),
            col: String::new(),
        }
    }
    pub fn within(mut self, col: impl Into<String>) -> Self {
        self.col = col.into();
        self
    }
    pub fn value(&self) -> Option<&Value> {
        match &self.val {
            Operand::Value(value) => Some(value),
            _ => None,
        }
    }
    pub fn children(&self) -> &[Condition] {
        match &self.val {
            Operand::Conditions(children) => children,
            _ => &[],
        }
    }
    pub fn matches(&self, resource: &dyn Resource) -> bool {
        matches(resource, self)
    }

    /// Decodes a condition, typing each literal only by its JSON shape.
    pub fn from_json(text: &str) -> Result<Condition> {
        Ok(serde_json::from_str(text)?)
    }
    /// Decodes a condition meant for resources of type `typ`, reading each
    /// literal as the declared kind of the attribute it is compared with. A
    /// leaf with a collection scope is typed against the target type of that
    /// to-many relationship. Literals that do not fit the declared kind keep
    /// the kind their JSON shape gives them, so they will not match.
    pub fn from_json_for(schema: &Schema, typ: &str, text: &str) -> Result<Condition> {
        let typ = schema
            .get_type(typ)
            .ok_or_else(|| ApiError::UnknownType(typ.to_string()))?;
        let wire: Wire = serde_json::from_str(text)?;
        decode(wire, &Typing::Schema { schema, typ })
    }
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ------------- Evaluation -------------
/// Reports whether `resource` satisfies `condition`.
///
/// `and` over no children holds, `or` over no children does not. A
/// comparison holds only when the field is a declared attribute whose value
/// has the same kind as the literal. Relationship operands are identifiers
/// rather than values, so no literal ever shares their kind.
pub fn matches(resource: &dyn Resource, condition: &Condition) -> bool {
    match (&condition.op, &condition.val) {
        (Op::And, Operand::Conditions(children)) => {
            children.iter().all(|child| matches(resource, child))
        }
        (Op::Or, Operand::Conditions(children)) => {
            children.iter().any(|child| matches(resource, child))
        }
        (op, Operand::Value(literal)) if op.is_comparison() => {
            match operand(resource, &condition.field) {
                Some(value) => value.compare(op, literal),
                None => false,
            }
        }
        (Op::Unknown(op), _) => {
            trace!(op = %op, field = %condition.field, "unknown operator matches nothing");
            false
        }
        _ => false,
    }
}

fn operand(resource: &dyn Resource, field: &str) -> Option<Value> {
    if resource.attrs().contains_key(field) {
        resource.get(field)
    } else {
        None
    }
}

// ------------- Wire format -------------
#[derive(Deserialize)]
struct Wire {
    #[serde(default)]
    f: String,
    #[serde(default)]
    o: String,
    #[serde(default)]
    v: Json,
    #[serde(default)]
    c: String,
}

enum Typing<'s> {
    Inferred,
    Schema { schema: &'s Schema, typ: &'s Type },
}

impl Typing<'_> {
    fn literal(&self, field: &str, col: &str, json: &Json) -> Result<Value> {
        let Typing::Schema { schema, typ } = self else {
            return Value::infer(json);
        };
        let scope = if col.is_empty() {
            Some(*typ)
        } else {
            typ.rel(col)
                .filter(|rel| !rel.is_to_one())
                .and_then(|rel| schema.get_type(&rel.target))
        };
        match scope.and_then(|scope| scope.attr(field)) {
            Some(attr) => Value::from_json(attr.kind, json).or_else(|_| Value::infer(json)),
            None => Value::infer(json),
        }
    }
}

fn decode(wire: Wire, typing: &Typing) -> Result<Condition> {
    let op = Op::from(wire.o.as_str());
    let val = if op.is_boolean() {
        let children: Vec<Wire> = if wire.v.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(wire.v)?
        };
        let children = children
            .into_iter()
            .map(|child| decode(child, typing))
            .collect::<Result<Vec<_>>>()?;
        Operand::Conditions(children)
    } else if op.is_comparison() {
        Operand::Value(typing.literal(&wire.f, &wire.c, &wire.v)?)
    } else {
        Operand::Missing
    };
    let field = if op.is_boolean() { String::new() } else { wire.f };
    Ok(Condition {
        field,
        op,
        val,
        col: wire.c,
    })
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = Wire::deserialize(deserializer)?;
        decode(wire, &Typing::Inferred).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.field.is_empty() {
            map.serialize_entry("f", &self.field)?;
        }
        if !self.op.as_str().is_empty() {
            map.serialize_entry("o", self.op.as_str())?;
        }
        match &self.val {
            Operand::Value(value) => map.serialize_entry("v", value)?,
            Operand::Conditions(children) => map.serialize_entry("v", children)?,
            Operand::Missing => map.serialize_entry("v", &Json::Null)?,
        }
        if !self.col.is_empty() {
            map.serialize_entry("c", &self.col)?;
        }
        map.end()
    }
}
