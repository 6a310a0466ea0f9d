// attributes and relationships are kept sorted by name so that walks over a
// type (and therefore diagnostics) come out in a stable order
use std::collections::BTreeMap;

// used to print out readable forms of the schema constructs
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::resource::SoftResource;
use crate::value::Kind;

// ------------- Attr -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attr {
    pub name: String,
    pub kind: Kind,
    pub nullable: bool,
}
impl Attr {
    pub fn new(name: impl Into<String>, kind: Kind, nullable: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable,
        }
    }
}
impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}::<{}>", self.name, self.kind.type_string(self.nullable))
    }
}

// ------------- Rel -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    ToOne,
    ToMany,
}
impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cardinality::ToOne => write!(f, "to-one"),
            Cardinality::ToMany => write!(f, "to-many"),
        }
    }
}

/// A relationship declared on one side only.
///
/// `inverse_type` is the name of the owning type whenever an inverse is
/// declared. `inverse_cardinality` is never supplied by the caller, it is
/// written by [`Schema::check`] once the pairing has been verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rel {
    pub name: String,
    pub target: String,
    pub cardinality: Cardinality,
    pub inverse_name: Option<String>,
    pub inverse_type: String,
    pub inverse_cardinality: Option<Cardinality>,
}
impl Rel {
    pub fn new(name: impl Into<String>, target: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality,
            inverse_name: None,
            inverse_type: String::new(),
            inverse_cardinality: None,
        }
    }
    pub fn to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, target, Cardinality::ToOne)
    }
    pub fn to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, target, Cardinality::ToMany)
    }
    pub fn inverse(mut self, name: impl Into<String>) -> Self {
        self.inverse_name = Some(name.into());
        self
    }
    pub fn is_to_one(&self) -> bool {
        self.cardinality == Cardinality::ToOne
    }
}

// ------------- Type -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub name: String,
    pub attrs: BTreeMap<String, Attr>,
    pub rels: BTreeMap<String, Rel>,
}
impl Type {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: BTreeMap::new(),
            rels: BTreeMap::new(),
        }
    }
    fn check_member(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ApiError::InvalidMemberName(name.to_string()));
        }
        if self.attrs.contains_key(name) || self.rels.contains_key(name) {
            return Err(ApiError::DuplicateMember {
                typ: self.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
    pub fn add_attr(&mut self, attr: Attr) -> Result<()> {
        self.check_member(&attr.name)?;
        self.attrs.insert(attr.name.clone(), attr);
        Ok(())
    }
    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.remove(name);
    }
    /// Adds a relationship. When it names an inverse, its inverse type is
    /// taken to be this type unless one was already set.
    pub fn add_rel(&mut self, mut rel: Rel) -> Result<()> {
        self.check_member(&rel.name)?;
        if rel.inverse_name.is_some() && rel.inverse_type.is_empty() {
            rel.inverse_type = self.name.clone();
        }
        self.rels.insert(rel.name.clone(), rel);
        Ok(())
    }
    pub fn remove_rel(&mut self, name: &str) {
        self.rels.remove(name);
    }
    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.get(name)
    }
    pub fn rel(&self, name: &str) -> Option<&Rel> {
        self.rels.get(name)
    }
    /// Names of all attributes followed by all relationships.
    pub fn fields(&self) -> Vec<&str> {
        self.attrs
            .keys()
            .chain(self.rels.keys())
            .map(String::as_str)
            .collect()
    }
}

// ------------- Schema -------------
/// An ordered collection of uniquely named types.
///
/// Types can be added in any order, relationship targets are only resolved
/// by [`Schema::check`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    types: Vec<Type>,
}

impl Schema {
    pub fn new() -> Self {
        Self { types: Vec::new() }
    }
    pub fn add_type(&mut self, typ: Type) -> Result<()> {
        if typ.name.is_empty() {
            return Err(ApiError::InvalidType);
        }
        if self.has_type(&typ.name) {
            return Err(ApiError::DuplicateType(typ.name));
        }
        self.types.push(typ);
        Ok(())
    }
    pub fn remove_type(&mut self, name: &str) {
        self.types.retain(|typ| typ.name != name);
    }
    fn type_mut(&mut self, name: &str) -> Result<&mut Type> {
        self.types
            .iter_mut()
            .find(|typ| typ.name == name)
            .ok_or_else(|| ApiError::UnknownType(name.to_string()))
    }
    pub fn add_attr(&mut self, typ: &str, attr: Attr) -> Result<()> {
        self.type_mut(typ)?.add_attr(attr)
    }
    pub fn remove_attr(&mut self, typ: &str, attr: &str) -> Result<()> {
        self.type_mut(typ)?.remove_attr(attr);
        Ok(())
    }
    pub fn add_rel(&mut self, typ: &str, rel: Rel) -> Result<()> {
        self.type_mut(typ)?.add_rel(rel)
    }
    pub fn remove_rel(&mut self, typ: &str, rel: &str) -> Result<()> {
        self.type_mut(typ)?.remove_rel(rel);
        Ok(())
    }
    pub fn has_type(&self, name: &str) -> bool {
        self.types.iter().any(|typ| typ.name == name)
    }
    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|typ| typ.name == name)
    }
    pub fn types(&self) -> &[Type] {
        &self.types
    }
    pub fn len(&self) -> usize {
        self.types.len()
    }
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
    /// A soft resource of the named type with every attribute at its zero value.
    pub fn resource(&self, name: &str) -> Option<SoftResource> {
        self.get_type(name).cloned().map(SoftResource::new)
    }

    /// Checks the integrity of all relationships and returns every problem
    /// found, one diagnostic per faulty relationship.
    ///
    /// A relationship whose target type is missing yields a dangling
    /// diagnostic only, since its inverse cannot be looked up. For every
    /// other relationship with an inverse, both sides must name each other.
    /// The inverse cardinality of each relationship is rewritten on every
    /// call (cleared when the pairing fails), so checking twice gives the
    /// same schema and the same diagnostics.
    pub fn check(&mut self) -> Vec<ApiError> {
        let mut errs = Vec::new();
        let mut resolved: Vec<(usize, String, Option<Cardinality>)> = Vec::new();
        for (t, typ) in self.types.iter().enumerate() {
            for rel in typ.rels.values() {
                let Some(target) = self.get_type(&rel.target) else {
                    errs.push(ApiError::DanglingRelationship {
                        typ: typ.name.clone(),
                        rel: rel.name.clone(),
                        target: rel.target.clone(),
                    });
                    resolved.push((t, rel.name.clone(), None));
                    continue;
                };
                let inverse_cardinality = match &rel.inverse_name {
                    None => None,
                    Some(inverse_name) => match pair(typ, rel, target, inverse_name) {
                        Ok(cardinality) => Some(cardinality),
                        Err(reason) => {
                            errs.push(ApiError::InverseMismatch {
                                typ: typ.name.clone(),
                                rel: rel.name.clone(),
                                reason,
                            });
                            None
                        }
                    },
                };
                resolved.push((t, rel.name.clone(), inverse_cardinality));
            }
        }
        for (t, name, inverse_cardinality) in resolved {
            if let Some(rel) = self.types[t].rels.get_mut(&name) {
                rel.inverse_cardinality = inverse_cardinality;
            }
        }
        errs
    }
}

// Verifies that `rel` (owned by `typ`) and the relationship `inverse_name` on
// `target` point to each other, returning the inverse side's cardinality.
fn pair(typ: &Type, rel: &Rel, target: &Type, inverse_name: &str) -> std::result::Result<Cardinality, String> {
    if rel.inverse_type != typ.name {
        return Err(format!(
            "its inverse type should be {}, not {}",
            typ.name, rel.inverse_type
        ));
    }
    let inverse = target
        .rel(inverse_name)
        .ok_or_else(|| format!("type {} has no relationship {}", target.name, inverse_name))?;
    if inverse.target != typ.name {
        return Err(format!(
            "{}.{} points to {}, not {}",
            target.name, inverse.name, inverse.target, typ.name
        ));
    }
    if inverse.inverse_name.as_deref() != Some(rel.name.as_str()) {
        return Err(format!(
            "the inverse of {}.{} is {}, not {}",
            target.name,
            inverse.name,
            inverse.inverse_name.as_deref().unwrap_or("unset"),
            rel.name
        ));
    }
    Ok(inverse.cardinality)
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = String::new();
        for attr in self.attrs.values() {
            s += &(attr.to_string() + ", ");
        }
        for rel in self.rels.values() {
            s += &format!("{}::<{} {}>, ", rel.name, rel.cardinality, rel.target);
        }
        s.truncate(s.trim_end_matches(", ").len());
        write!(f, "{} {{{}}}", self.name, s)
    }
}
