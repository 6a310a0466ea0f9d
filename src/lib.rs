//! jsonapi-core – the data and query core of a JSON:API resource model.
//!
//! The crate covers three tightly coupled pieces:
//! * a **schema** of resource types (attributes, relationships and their
//!   inverses) with an integrity check over the relationship graph,
//! * a **generic resource/collection model** giving uniform, dynamically
//!   typed access to attributes and relationships whatever backs them,
//! * a **filter query engine**: a small typed expression language that is
//!   both a wire format and an evaluator.
//!
//! ## Modules
//! * [`value`] – [`value::Kind`] and the nullable, tagged [`value::Value`]
//!   with its strict comparison rules.
//! * [`identifier`] – `(type, id)` pairs, the unit of relationship linkage.
//! * [`schema`] – [`schema::Type`] descriptors and the [`schema::Schema`]
//!   that owns them and checks their relationships.
//! * [`definition`] – explicit type definitions, built in code or loaded from
//!   a declarative schema file.
//! * [`resource`] – the [`resource::Resource`] trait with a schema driven
//!   variant ([`resource::SoftResource`]) and a statically shaped one
//!   ([`resource::Record`]).
//! * [`collection`] – ordered collections of resources.
//! * [`filter`] – [`filter::Condition`], its wire encoding and [`filter::matches`].
//! * [`registry`] – the concurrency guarded catalogue and its factories.
//!
//! ## Values
//! Every attribute holds a [`value::Value`] of one of 13 kinds (string,
//! signed and unsigned integers of five widths each, bool, time), any of them
//! possibly null. Values of different kinds never compare true: `30::<int32>`
//! is neither equal nor unequal to `"30"`.
//!
//! ## Quick Start
//! ```
//! use jsonapi_core::{Cardinality, Condition, Kind, Op, Registry, TypeDef, Value};
//!
//! let registry = Registry::new();
//! registry.register_type(
//!     TypeDef::new("people")
//!         .attr("name", Kind::String, false)
//!         .attr("age", Kind::Int32, false)
//!         .rel("articles", "articles", Cardinality::ToMany, Some("author")),
//! );
//! registry.register_type(
//!     TypeDef::new("articles")
//!         .attr("title", Kind::String, false)
//!         .rel("author", "people", Cardinality::ToOne, Some("articles")),
//! );
//! assert!(registry.check().is_empty());
//!
//! let mut person = registry.resource("people");
//! person.set_id("p1".to_string());
//! person.set("age", Value::from(30i32)).unwrap();
//!
//! let adult = Condition::new("age", Op::Ge, 18i32);
//! assert!(adult.matches(person.as_ref()));
//! ```
//!
//! ## Errors
//! Schema definition and integrity problems are accumulated and returned as
//! lists of [`ApiError`]. Registering a malformed type or asking the
//! registry for an unknown one panics. Filter evaluation cannot fail.

pub mod collection;
pub mod definition;
pub mod error;
pub mod filter;
pub mod identifier;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod value;

pub use collection::{Collection, SoftCollection};
pub use definition::{AttrDef, RelDef, SchemaDef, TypeDef};
pub use error::{ApiError, Result};
pub use filter::{matches, Condition, Op, Operand};
pub use identifier::{Identifier, Identifiers};
pub use registry::{Catalogue, Registry};
pub use resource::{Entity, Record, Resource, SoftResource};
pub use schema::{Attr, Cardinality, Rel, Schema, Type};
pub use value::{Kind, Timestamp, Value};
