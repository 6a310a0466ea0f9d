use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::filter::Condition;
use crate::resource::{Resource, SoftResource};
use crate::schema::Type;

/// An ordered sequence of resources of one declared type.
pub trait Collection: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// The resource at index `i`. Panics when `i` is out of range.
    fn elem(&self, i: usize) -> &dyn Resource;
    /// Appends a resource, keeping insertion order.
    fn add(&mut self, resource: Box<dyn Resource>);
}

// ------------- SoftCollection -------------
/// A collection shaped by a [`Type`] handed over at runtime.
///
/// `add` trusts the caller: a resource of another type is appended all the
/// same (and logged), nothing is deduplicated.
#[derive(Debug)]
pub struct SoftCollection {
    shape: Arc<Type>,
    resources: Vec<Box<dyn Resource>>,
}

impl SoftCollection {
    pub fn new(shape: impl Into<Arc<Type>>) -> Self {
        Self {
            shape: shape.into(),
            resources: Vec::new(),
        }
    }
    pub fn shape(&self) -> &Type {
        &self.shape
    }
    /// An empty resource of the collection's type, ready to be filled and added.
    pub fn new_resource(&self) -> SoftResource {
        SoftResource::new(Arc::clone(&self.shape))
    }
    pub fn iter(&self) -> impl Iterator<Item = &dyn Resource> {
        self.resources.iter().map(|resource| resource.as_ref())
    }
    /// A new collection of the same type holding copies of the resources
    /// that match `condition`, in their original order.
    pub fn filter(&self, condition: &Condition) -> SoftCollection {
        SoftCollection {
            shape: Arc::clone(&self.shape),
            resources: self
                .iter()
                .filter(|resource| condition.matches(*resource))
                .map(|resource| resource.copy())
                .collect(),
        }
    }
}

impl Clone for SoftCollection {
    fn clone(&self) -> Self {
        Self {
            shape: Arc::clone(&self.shape),
            resources: self.iter().map(|resource| resource.copy()).collect(),
        }
    }
}

impl Collection for SoftCollection {
    fn type_name(&self) -> &str {
        &self.shape.name
    }
    fn len(&self) -> usize {
        self.resources.len()
    }
    fn elem(&self, i: usize) -> &dyn Resource {
        self.resources[i].as_ref()
    }
    fn add(&mut self, resource: Box<dyn Resource>) {
        if resource.type_name() != self.shape.name {
            warn!(
                collection = %self.shape.name,
                resource = %resource.type_name(),
                id = %resource.id(),
                "adding a resource of another type"
            );
        }
        self.resources.push(resource);
    }
}
