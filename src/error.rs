use thiserror::Error;

/// Every failure the core can report.
///
/// Schema definition and integrity problems are accumulated into lists by the
/// operations that produce them, so one pass surfaces all of them. Filter
/// evaluation never produces an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("type name is empty")]
    InvalidType,
    #[error("type name {0} is already used")]
    DuplicateType(String),
    #[error("type {0} does not exist")]
    UnknownType(String),
    #[error("field {name} of type {typ} is declared more than once")]
    DuplicateMember { typ: String, name: String },
    #[error("{0:?} is not a valid member name")]
    InvalidMemberName(String),
    #[error("type {typ} has no attribute {name}")]
    UnknownAttribute { typ: String, name: String },
    #[error("type {typ} has no relationship {name}")]
    UnknownRelationship { typ: String, name: String },
    #[error("the target type {target} of relationship {rel} of type {typ} does not exist")]
    DanglingRelationship { typ: String, rel: String, target: String },
    #[error("relationship {rel} of type {typ} and its inverse do not point to each other: {reason}")]
    InverseMismatch { typ: String, rel: String, reason: String },
    #[error("attribute {attr} expects {expected}, got {found}")]
    KindMismatch { attr: String, expected: String, found: String },
    #[error("attribute {0} cannot be null")]
    NullNotAllowed(String),
    #[error("relationship {rel} is {expected}, not {found}")]
    CardinalityMismatch { rel: String, expected: String, found: String },
    #[error("relationship {rel} points to {expected}, got an identifier of type {found}")]
    IdentifierType { rel: String, expected: String, found: String },
    #[error("literal error: {0}")]
    Literal(String),
    #[error("wire format error: {0}")]
    Wire(String),
    #[error("definition error: {0}")]
    Definition(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

// Helper conversions
impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self { Self::Wire(e.to_string()) }
}
impl From<config::ConfigError> for ApiError {
    fn from(e: config::ConfigError) -> Self { Self::Definition(e.to_string()) }
}
