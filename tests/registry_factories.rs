use std::sync::Arc;
use std::thread;

use jsonapi_core::registry;
use jsonapi_core::{
    Cardinality, Entity, Identifiers, Kind, Op, Condition, Record, Registry, Resource, TypeDef,
    Value,
};

#[derive(Debug, Clone, Default)]
struct Article {
    id: String,
    title: String,
    views: u32,
    tags: Vec<String>,
}

impl Entity for Article {
    const TYPE: &'static str = "articles";
    fn define(def: TypeDef) -> TypeDef {
        def.attr("title", Kind::String, false)
            .attr("views", Kind::Uint32, false)
            .rel("tags", "tags", Cardinality::ToMany, Some("articles"))
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn attr(&self, name: &str) -> Option<Value> {
        match name {
            "title" => Some(Value::from(self.title.as_str())),
            "views" => Some(Value::from(self.views)),
            _ => None,
        }
    }
    fn set_attr(&mut self, name: &str, value: Value) {
        match (name, value) {
            ("title", Value::String(Some(title))) => self.title = title,
            ("views", Value::Uint32(Some(views))) => self.views = views,
            _ => {}
        }
    }
    fn to_many(&self, rel: &str) -> Vec<String> {
        if rel == "tags" { self.tags.clone() } else { Vec::new() }
    }
    fn set_to_many(&mut self, rel: &str, ids: Vec<String>) {
        if rel == "tags" {
            self.tags = ids;
        }
    }
}

fn setup() -> Registry {
    let registry = Registry::new();
    registry.register::<Article>();
    registry.register_type(
        TypeDef::new("tags")
            .attr("label", Kind::String, false)
            .rel("articles", "articles", Cardinality::ToMany, Some("tags")),
    );
    registry
}

#[test]
fn registered_types_are_consistent() {
    let registry = setup();
    assert!(registry.has_type("articles"));
    assert!(registry.has_type("tags"));
    assert!(registry.check().is_empty());
    let tags = registry.get_type("tags").unwrap();
    assert_eq!(
        tags.rel("articles").unwrap().inverse_cardinality,
        Some(Cardinality::ToMany),
        "the check must record the inverse cardinality"
    );
}

#[test]
fn factories_build_empty_values() {
    let registry = setup();
    let tag = registry.resource("tags");
    assert_eq!(tag.type_name(), "tags");
    assert_eq!(tag.id(), "");
    assert_eq!(tag.get("label"), Some(Value::from("")));
    let col = registry.collection("articles");
    assert_eq!(col.type_name(), "articles");
    assert!(col.is_empty());
}

#[test]
#[should_panic(expected = "jsonapi: type \"ghosts\" not found")]
fn unknown_resource_type_panics() {
    setup().resource("ghosts");
}

#[test]
#[should_panic(expected = "jsonapi: type \"ghosts\" not found")]
fn unknown_collection_type_panics() {
    setup().collection("ghosts");
}

#[test]
#[should_panic(expected = "jsonapi: cannot register type")]
fn registering_twice_panics() {
    let registry = setup();
    registry.register::<Article>();
}

#[test]
#[should_panic(expected = "jsonapi: cannot register type")]
fn registering_an_unnamed_type_panics() {
    Registry::new().register_type(TypeDef::new(""));
}

#[test]
fn records_behave_like_soft_resources() {
    let mut record = Record::new(Article::default()).unwrap();
    record.set_id("a1".into());
    record.set("title", Value::from("Rust")).unwrap();
    record.set("views", Value::from(120u32)).unwrap();
    assert!(record.set("views", Value::from(120i32)).is_err());
    record
        .set_to_many("tags", Identifiers::new("tags", ["lang", "systems"]))
        .unwrap();
    assert!(Condition::new("views", Op::Ge, 100u32).matches(&record));
    assert_eq!(record.get("nothing"), None);
    assert_eq!(record.get_to_many("tags").ids(), vec!["lang", "systems"]);

    let copy = record.copy();
    assert_eq!(copy.get("title"), Some(Value::from("Rust")));
    let article = record.into_inner();
    assert_eq!(article.title, "Rust");
    assert_eq!(article.views, 120);
    assert_eq!(article.tags, vec!["lang", "systems"]);
}

#[test]
fn snapshots_are_shared_without_locking() {
    let registry = setup();
    registry.check();
    let catalogue = Arc::new(registry.snapshot());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let catalogue = Arc::clone(&catalogue);
            thread::spawn(move || {
                let mut tag = catalogue.resource("tags");
                tag.set_id(format!("t{i}"));
                tag.set("label", Value::from("x")).unwrap();
                tag.id().to_string()
            })
        })
        .collect();
    let ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ids, vec!["t0", "t1", "t2", "t3"]);
    assert!(catalogue.has_type("articles"));
    assert_eq!(catalogue.schema().len(), 2);
    // later registrations do not reach an existing snapshot
    registry.register_type(TypeDef::new("people"));
    assert!(!catalogue.has_type("people"));
}

#[test]
fn concurrent_registration() {
    let registry = Arc::new(Registry::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry.register_type(TypeDef::new(format!("type{i}")).attr("n", Kind::Int, false));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    for i in 0..8 {
        assert!(registry.has_type(&format!("type{i}")));
    }
}

#[test]
fn global_registry() {
    registry::global().register_type(TypeDef::new("global-things").attr("n", Kind::Int64, true));
    assert!(registry::global().has_type("global-things"));
    let thing = registry::global().resource("global-things");
    assert_eq!(thing.get("n"), Some(Value::null(Kind::Int64)));
}
