//! Explicit type definitions.
//!
//! A [`TypeDef`] is the input from which a [`Type`] is built: a name, an
//! ordered list of attributes and an ordered list of relationships. It can be
//! written in code with the builder methods, or read from a declarative
//! schema file through [`SchemaDef`]:
//!
//! ```toml
//! [[types]]
//! name = "articles"
//! attrs = [
//!     { name = "title", type = "string" },
//!     { name = "published", type = "*time" },
//! ]
//! rels = [
//!     { name = "author", target = "people", cardinality = "to-one", inverse = "articles" },
//! ]
//! ```

use std::collections::HashSet;
use std::path::Path;

use config::{Config, File, FileFormat};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::schema::{Attr, Cardinality, Rel, Schema, Type};
use crate::value::Kind;

lazy_static! {
    // JSON:API member names: alphanumeric at both ends, with '-', '_' and
    // spaces allowed in between
    static ref MEMBER_NAME: Regex =
        Regex::new(r"^[a-zA-Z0-9](?:[a-zA-Z0-9_\- ]*[a-zA-Z0-9])?$").unwrap();
}

pub fn is_member_name(name: &str) -> bool {
    MEMBER_NAME.is_match(name)
}

// ------------- AttrDef -------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AttrSpec", into = "AttrSpec")]
pub struct AttrDef {
    pub name: String,
    pub kind: Kind,
    pub nullable: bool,
}

// the file notation keeps kind and nullability together ("*int8")
#[derive(Serialize, Deserialize)]
struct AttrSpec {
    name: String,
    #[serde(rename = "type")]
    type_string: String,
}
impl TryFrom<AttrSpec> for AttrDef {
    type Error = ApiError;
    fn try_from(spec: AttrSpec) -> Result<AttrDef> {
        let (kind, nullable) = Kind::parse_type_string(&spec.type_string).ok_or_else(|| {
            ApiError::Definition(format!(
                "attribute {} has an unknown type {:?}",
                spec.name, spec.type_string
            ))
        })?;
        Ok(AttrDef {
            name: spec.name,
            kind,
            nullable,
        })
    }
}
impl From<AttrDef> for AttrSpec {
    fn from(def: AttrDef) -> AttrSpec {
        AttrSpec {
            type_string: def.kind.type_string(def.nullable),
            name: def.name,
        }
    }
}

// ------------- RelDef -------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelDef {
    pub name: String,
    pub target: String,
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse: Option<String>,
}

// ------------- TypeDef -------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default)]
    pub attrs: Vec<AttrDef>,
    #[serde(default)]
    pub rels: Vec<RelDef>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            rels: Vec::new(),
        }
    }
    pub fn attr(mut self, name: impl Into<String>, kind: Kind, nullable: bool) -> Self {
        self.attrs.push(AttrDef {
            name: name.into(),
            kind,
            nullable,
        });
        self
    }
    pub fn rel(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        cardinality: Cardinality,
        inverse: Option<&str>,
    ) -> Self {
        self.rels.push(RelDef {
            name: name.into(),
            target: target.into(),
            cardinality,
            inverse: inverse.map(str::to_string),
        });
        self
    }

    /// Reports every structural problem of the definition: an empty or
    /// malformed type name, malformed member names and members declared
    /// more than once (attributes and relationships share one namespace).
    pub fn validate(&self) -> Vec<ApiError> {
        let mut errs = Vec::new();
        if self.name.is_empty() {
            errs.push(ApiError::InvalidType);
        } else if !is_member_name(&self.name) {
            errs.push(ApiError::InvalidMemberName(self.name.clone()));
        }
        let mut seen = HashSet::new();
        let members = self
            .attrs
            .iter()
            .map(|attr| &attr.name)
            .chain(self.rels.iter().map(|rel| &rel.name));
        for name in members {
            if !is_member_name(name) {
                errs.push(ApiError::InvalidMemberName(name.clone()));
            } else if !seen.insert(name.as_str()) {
                errs.push(ApiError::DuplicateMember {
                    typ: self.name.clone(),
                    name: name.clone(),
                });
            }
        }
        errs
    }

    pub fn build(self) -> std::result::Result<Type, Vec<ApiError>> {
        let errs = self.validate();
        if !errs.is_empty() {
            return Err(errs);
        }
        let mut typ = Type::new(self.name);
        for attr in self.attrs {
            typ.add_attr(Attr::new(attr.name, attr.kind, attr.nullable))
                .map_err(|e| vec![e])?;
        }
        for def in self.rels {
            let mut rel = Rel::new(def.name, def.target, def.cardinality);
            rel.inverse_name = def.inverse;
            typ.add_rel(rel).map_err(|e| vec![e])?;
        }
        Ok(typ)
    }
}

// ------------- SchemaDef -------------
/// A whole schema as written in a declarative file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl SchemaDef {
    /// Loads a schema file, its format (toml, json, yaml, ...) taken from the
    /// file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<SchemaDef> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;
        Ok(settings.try_deserialize::<SchemaDef>()?)
    }
    pub fn parse(text: &str, format: FileFormat) -> Result<SchemaDef> {
        let settings = Config::builder()
            .add_source(File::from_str(text, format))
            .build()?;
        Ok(settings.try_deserialize::<SchemaDef>()?)
    }

    /// Builds every type and adds it to a fresh schema, reporting all
    /// definition problems at once. Relationships are not checked here,
    /// see [`Schema::check`].
    pub fn build(self) -> std::result::Result<Schema, Vec<ApiError>> {
        let mut schema = Schema::new();
        let mut errs = Vec::new();
        for def in self.types {
            match def.build() {
                Ok(typ) => {
                    if let Err(e) = schema.add_type(typ) {
                        errs.push(e);
                    }
                }
                Err(mut type_errs) => errs.append(&mut type_errs),
            }
        }
        if errs.is_empty() { Ok(schema) } else { Err(errs) }
    }
}
