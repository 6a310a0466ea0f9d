//! The process-wide catalogue of resource types.
//!
//! A [`Registry`] is filled during initialization and treated as read-only
//! afterwards. Registration and checking go through one coarse lock, so
//! concurrent registrations cannot corrupt the catalogue. Once filled, a
//! [`Catalogue`] snapshot can be taken and shared freely; reading from it
//! needs no locking at all.
//!
//! Registration and lookup failures are programming errors found at start
//! up, and they panic. Integrity problems between types are returned by
//! [`Registry::check`] as a list.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lazy_static::lazy_static;
use seahash::SeaHasher;
use tracing::{debug, info, warn};

use crate::collection::{Collection, SoftCollection};
use crate::definition::{SchemaDef, TypeDef};
use crate::error::ApiError;
use crate::resource::{Entity, Resource, SoftResource};
use crate::schema::{Schema, Type};

pub type NameHasher = BuildHasherDefault<SeaHasher>;

lazy_static! {
    static ref GLOBAL: Registry = Registry::new();
}

/// The registry shared by the whole process.
pub fn global() -> &'static Registry {
    &GLOBAL
}

fn describe(errs: &[ApiError]) -> String {
    errs.iter()
        .map(ApiError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ------------- Registry -------------
#[derive(Debug, Default)]
pub struct Registry {
    schema: Mutex<Schema>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            schema: Mutex::new(Schema::new()),
        }
    }
    // a panic while holding the lock can only come from a failed
    // registration, which leaves the schema untouched
    fn lock(&self) -> MutexGuard<'_, Schema> {
        self.schema.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builds a type from its definition and adds it to the catalogue.
    ///
    /// Panics when the definition is malformed or its name is taken.
    pub fn register_type(&self, def: TypeDef) {
        let name = def.name.clone();
        let typ = match def.build() {
            Ok(typ) => typ,
            Err(errs) => panic!("jsonapi: cannot register type {name:?}: {}", describe(&errs)),
        };
        let mut schema = self.lock();
        debug!(
            typ = %typ.name,
            attrs = typ.attrs.len(),
            rels = typ.rels.len(),
            "registering type"
        );
        if let Err(e) = schema.add_type(typ) {
            drop(schema);
            panic!("jsonapi: cannot register type {name:?}: {e}");
        }
    }
    /// Registers a statically shaped type through its own definition.
    pub fn register<T: Entity>(&self) {
        self.register_type(T::definition());
    }
    pub fn register_schema(&self, def: SchemaDef) {
        for typ in def.types {
            self.register_type(typ);
        }
    }

    /// Checks the relationships between all registered types, returning one
    /// diagnostic per faulty relationship, and records the inverse
    /// cardinality of every verified pair.
    pub fn check(&self) -> Vec<ApiError> {
        let mut schema = self.lock();
        let errs = schema.check();
        if errs.is_empty() {
            info!(types = schema.len(), "schema is consistent");
        } else {
            for e in errs.iter() {
                warn!(error = %e, "schema integrity");
            }
        }
        errs
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.lock().has_type(name)
    }
    pub fn get_type(&self, name: &str) -> Option<Type> {
        self.lock().get_type(name).cloned()
    }
    fn shape(&self, name: &str) -> Type {
        match self.get_type(name) {
            Some(typ) => typ,
            None => panic!("jsonapi: type {name:?} not found"),
        }
    }
    /// An empty resource of the named type. Panics when the type is unknown.
    pub fn resource(&self, name: &str) -> Box<dyn Resource> {
        Box::new(SoftResource::new(self.shape(name)))
    }
    /// An empty collection of the named type. Panics when the type is unknown.
    pub fn collection(&self, name: &str) -> Box<dyn Collection> {
        Box::new(SoftCollection::new(self.shape(name)))
    }

    /// Freezes the current catalogue into an immutable snapshot.
    pub fn snapshot(&self) -> Catalogue {
        Catalogue::new(self.lock().clone())
    }
}

// ------------- Catalogue -------------
/// An immutable view of a schema, cheap to clone and safe to read from any
/// number of threads.
#[derive(Debug, Clone)]
pub struct Catalogue {
    schema: Arc<Schema>,
    shapes: Arc<HashMap<String, Arc<Type>, NameHasher>>,
}

impl Catalogue {
    pub fn new(schema: Schema) -> Self {
        let shapes = schema
            .types()
            .iter()
            .map(|typ| (typ.name.clone(), Arc::new(typ.clone())))
            .collect();
        Self {
            schema: Arc::new(schema),
            shapes: Arc::new(shapes),
        }
    }
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
    pub fn has_type(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }
    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.shapes.get(name).map(|typ| typ.as_ref())
    }
    fn shape(&self, name: &str) -> Arc<Type> {
        match self.shapes.get(name) {
            Some(typ) => Arc::clone(typ),
            None => panic!("jsonapi: type {name:?} not found"),
        }
    }
    /// An empty resource of the named type. Panics when the type is unknown.
    pub fn resource(&self, name: &str) -> Box<dyn Resource> {
        Box::new(SoftResource::new(self.shape(name)))
    }
    /// An empty collection of the named type. Panics when the type is unknown.
    pub fn collection(&self, name: &str) -> Box<dyn Collection> {
        Box::new(SoftCollection::new(self.shape(name)))
    }
}
