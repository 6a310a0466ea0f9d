use serde::{Deserialize, Serialize};

// used to print out readable forms of identifiers
use std::fmt;
use std::ops;

// ------------- Identifier -------------
/// A resource's type and ID, the unit relationships are made of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
}
impl Identifier {
    pub fn new(typ: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            typ: typ.into(),
        }
    }
}
impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.typ, self.id)
    }
}

// ------------- Identifiers -------------
/// An ordered list of identifiers. Order is membership order of a to-many
/// relationship and is never rearranged here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifiers(Vec<Identifier>);

impl Identifiers {
    /// Builds identifiers of type `typ`, one per ID, in the given order.
    pub fn new<I, S>(typ: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(|id| Identifier::new(typ, id)).collect())
    }
    pub fn ids(&self) -> Vec<String> {
        self.0.iter().map(|identifier| identifier.id.clone()).collect()
    }
    pub fn push(&mut self, identifier: Identifier) {
        self.0.push(identifier);
    }
}
impl ops::Deref for Identifiers {
    type Target = [Identifier];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl From<Vec<Identifier>> for Identifiers {
    fn from(identifiers: Vec<Identifier>) -> Self {
        Self(identifiers)
    }
}
impl FromIterator<Identifier> for Identifiers {
    fn from_iter<I: IntoIterator<Item = Identifier>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl IntoIterator for Identifiers {
    type Item = Identifier;
    type IntoIter = std::vec::IntoIter<Identifier>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
impl fmt::Display for Identifiers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = String::new();
        for identifier in self.0.iter() {
            s += &(identifier.to_string() + ",");
        }
        s.pop();
        write!(f, "[{}]", s)
    }
}
