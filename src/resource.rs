//! Uniform access to resources, whatever backs them.
//!
//! [`Resource`] is the capability set every consumer depends on (the filter
//! evaluator, collections and the registry factories). Two variants ship
//! with the crate:
//! * [`SoftResource`] – fully dynamic, its shape is a [`Type`] handed over at
//!   runtime and values live in maps.
//! * [`Record`] – wraps a native struct implementing [`Entity`], which
//!   declares its shape once and exposes its fields by name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::definition::TypeDef;
use crate::error::{ApiError, Result};
use crate::identifier::{Identifier, Identifiers};
use crate::schema::{Attr, Cardinality, Rel, Type};
use crate::value::Value;

pub trait Resource: fmt::Debug + Send + Sync {
    /// The type this resource conforms to.
    fn shape(&self) -> &Type;
    fn type_name(&self) -> &str {
        &self.shape().name
    }
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn attrs(&self) -> &BTreeMap<String, Attr> {
        &self.shape().attrs
    }
    fn rels(&self) -> &BTreeMap<String, Rel> {
        &self.shape().rels
    }
    /// The value of a declared attribute, `None` for anything undeclared.
    fn get(&self, attr: &str) -> Option<Value>;
    /// Fails unless the value has the declared kind of the attribute, and is
    /// only null when the attribute is nullable.
    fn set(&mut self, attr: &str, value: Value) -> Result<()>;
    fn get_to_one(&self, rel: &str) -> Option<Identifier>;
    fn get_to_many(&self, rel: &str) -> Identifiers;
    fn set_to_one(&mut self, rel: &str, identifier: Option<Identifier>) -> Result<()>;
    fn set_to_many(&mut self, rel: &str, identifiers: Identifiers) -> Result<()>;
    fn copy(&self) -> Box<dyn Resource>;
}

fn check_value(shape: &Type, attr: &str, value: &Value) -> Result<()> {
    let declared = shape.attr(attr).ok_or_else(|| ApiError::UnknownAttribute {
        typ: shape.name.clone(),
        name: attr.to_string(),
    })?;
    if value.kind() != declared.kind {
        return Err(ApiError::KindMismatch {
            attr: attr.to_string(),
            expected: declared.kind.type_string(declared.nullable),
            found: value.kind().to_string(),
        });
    }
    if value.is_null() && !declared.nullable {
        return Err(ApiError::NullNotAllowed(attr.to_string()));
    }
    Ok(())
}

fn check_rel<'s>(shape: &'s Type, rel: &str, cardinality: Cardinality) -> Result<&'s Rel> {
    let declared = shape.rel(rel).ok_or_else(|| ApiError::UnknownRelationship {
        typ: shape.name.clone(),
        name: rel.to_string(),
    })?;
    if declared.cardinality != cardinality {
        return Err(ApiError::CardinalityMismatch {
            rel: rel.to_string(),
            expected: declared.cardinality.to_string(),
            found: cardinality.to_string(),
        });
    }
    Ok(declared)
}

fn check_identifier(rel: &Rel, identifier: &Identifier) -> Result<()> {
    if identifier.typ != rel.target {
        return Err(ApiError::IdentifierType {
            rel: rel.name.clone(),
            expected: rel.target.clone(),
            found: identifier.typ.clone(),
        });
    }
    Ok(())
}

// ------------- SoftResource -------------
#[derive(Debug, Clone, PartialEq)]
pub struct SoftResource {
    shape: Arc<Type>,
    id: String,
    values: BTreeMap<String, Value>,
    to_one: BTreeMap<String, Option<String>>,
    to_many: BTreeMap<String, Vec<String>>,
}

impl SoftResource {
    /// An empty resource: no ID, zero values, no related resources.
    pub fn new(shape: impl Into<Arc<Type>>) -> Self {
        let shape = shape.into();
        let values = shape
            .attrs
            .values()
            .map(|attr| (attr.name.clone(), Value::zero(attr.kind, attr.nullable)))
            .collect();
        Self {
            shape,
            id: String::new(),
            values,
            to_one: BTreeMap::new(),
            to_many: BTreeMap::new(),
        }
    }
}

impl Resource for SoftResource {
    fn shape(&self) -> &Type {
        &self.shape
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn get(&self, attr: &str) -> Option<Value> {
        self.values.get(attr).cloned()
    }
    fn set(&mut self, attr: &str, value: Value) -> Result<()> {
        check_value(&self.shape, attr, &value)?;
        self.values.insert(attr.to_string(), value);
        Ok(())
    }
    fn get_to_one(&self, rel: &str) -> Option<Identifier> {
        let declared = self.shape.rel(rel).filter(|r| r.is_to_one())?;
        let id = self.to_one.get(rel)?.as_ref()?;
        Some(Identifier::new(declared.target.as_str(), id.as_str()))
    }
    fn get_to_many(&self, rel: &str) -> Identifiers {
        match (self.shape.rel(rel), self.to_many.get(rel)) {
            (Some(declared), Some(ids)) if !declared.is_to_one() => {
                Identifiers::new(&declared.target, ids.iter().cloned())
            }
            _ => Identifiers::default(),
        }
    }
    fn set_to_one(&mut self, rel: &str, identifier: Option<Identifier>) -> Result<()> {
        let declared = check_rel(&self.shape, rel, Cardinality::ToOne)?;
        if let Some(identifier) = &identifier {
            check_identifier(declared, identifier)?;
        }
        self.to_one
            .insert(rel.to_string(), identifier.map(|identifier| identifier.id));
        Ok(())
    }
    fn set_to_many(&mut self, rel: &str, identifiers: Identifiers) -> Result<()> {
        let declared = check_rel(&self.shape, rel, Cardinality::ToMany)?;
        for identifier in identifiers.iter() {
            check_identifier(declared, identifier)?;
        }
        self.to_many.insert(rel.to_string(), identifiers.ids());
        Ok(())
    }
    fn copy(&self) -> Box<dyn Resource> {
        Box::new(self.clone())
    }
}

// ------------- Entity -------------
/// A native struct that can stand in as a resource.
///
/// The shape is declared once through [`Entity::define`] and the struct maps
/// field names to its own fields. Setters only ever receive values that
/// already passed the shape's checks, so an implementation can ignore
/// anything it does not recognise.
pub trait Entity: fmt::Debug + Clone + Send + Sync + 'static {
    const TYPE: &'static str;
    fn define(def: TypeDef) -> TypeDef;
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn attr(&self, name: &str) -> Option<Value>;
    fn set_attr(&mut self, name: &str, value: Value);
    fn to_one(&self, _rel: &str) -> Option<String> {
        None
    }
    fn set_to_one(&mut self, _rel: &str, _id: Option<String>) {}
    fn to_many(&self, _rel: &str) -> Vec<String> {
        Vec::new()
    }
    fn set_to_many(&mut self, _rel: &str, _ids: Vec<String>) {}

    fn definition() -> TypeDef {
        Self::define(TypeDef::new(Self::TYPE))
    }
}

// ------------- Record -------------
#[derive(Debug, Clone)]
pub struct Record<T: Entity> {
    inner: T,
    shape: Arc<Type>,
}

impl<T: Entity> Record<T> {
    /// Wraps `inner`, building the shape from the entity's definition.
    pub fn new(inner: T) -> std::result::Result<Self, Vec<ApiError>> {
        let shape = T::definition().build()?;
        Ok(Self::with_shape(inner, Arc::new(shape)))
    }
    /// Wraps `inner` with an already built shape, typically one shared by
    /// every record of a collection.
    pub fn with_shape(inner: T, shape: Arc<Type>) -> Self {
        Self { inner, shape }
    }
    pub fn inner(&self) -> &T {
        &self.inner
    }
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Entity> Resource for Record<T> {
    fn shape(&self) -> &Type {
        &self.shape
    }
    fn id(&self) -> &str {
        self.inner.id()
    }
    fn set_id(&mut self, id: String) {
        self.inner.set_id(id);
    }
    fn get(&self, attr: &str) -> Option<Value> {
        self.shape.attr(attr)?;
        self.inner.attr(attr)
    }
    fn set(&mut self, attr: &str, value: Value) -> Result<()> {
        check_value(&self.shape, attr, &value)?;
        self.inner.set_attr(attr, value);
        Ok(())
    }
    fn get_to_one(&self, rel: &str) -> Option<Identifier> {
        let declared = self.shape.rel(rel).filter(|r| r.is_to_one())?;
        self.inner
            .to_one(rel)
            .map(|id| Identifier::new(declared.target.as_str(), id))
    }
    fn get_to_many(&self, rel: &str) -> Identifiers {
        match self.shape.rel(rel) {
            Some(declared) if !declared.is_to_one() => {
                Identifiers::new(&declared.target, self.inner.to_many(rel))
            }
            _ => Identifiers::default(),
        }
    }
    fn set_to_one(&mut self, rel: &str, identifier: Option<Identifier>) -> Result<()> {
        let declared = check_rel(&self.shape, rel, Cardinality::ToOne)?;
        if let Some(identifier) = &identifier {
            check_identifier(declared, identifier)?;
        }
        self.inner
            .set_to_one(rel, identifier.map(|identifier| identifier.id));
        Ok(())
    }
    fn set_to_many(&mut self, rel: &str, identifiers: Identifiers) -> Result<()> {
        let declared = check_rel(&self.shape, rel, Cardinality::ToMany)?;
        for identifier in identifiers.iter() {
            check_identifier(declared, identifier)?;
        }
        self.inner.set_to_many(rel, identifiers.ids());
        Ok(())
    }
    fn copy(&self) -> Box<dyn Resource> {
        Box::new(self.clone())
    }
}
