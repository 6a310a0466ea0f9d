use jsonapi_core::{
    Cardinality, Collection, Condition, Identifier, Identifiers, Kind, Op, Resource,
    SoftCollection, TypeDef, Value,
};

fn setup() -> SoftCollection {
    let articles = TypeDef::new("articles")
        .attr("title", Kind::String, false)
        .attr("views", Kind::Uint32, false)
        .rel("author", "people", Cardinality::ToOne, None)
        .rel("tags", "tags", Cardinality::ToMany, None)
        .build()
        .unwrap();
    let mut col = SoftCollection::new(articles);
    for (id, title, views) in [("a1", "Rust", 120u32), ("a2", "Go", 40), ("a3", "Zig", 300)] {
        let mut article = col.new_resource();
        article.set_id(id.into());
        article.set("title", Value::from(title)).unwrap();
        article.set("views", Value::from(views)).unwrap();
        col.add(Box::new(article));
    }
    col
}

#[test]
fn keeps_insertion_order() {
    let col = setup();
    assert_eq!(col.type_name(), "articles");
    assert_eq!(col.len(), 3);
    assert!(!col.is_empty());
    let ids: Vec<&str> = col.iter().map(|article| article.id()).collect();
    assert_eq!(ids, vec!["a1", "a2", "a3"]);
    assert_eq!(col.elem(1).get("title"), Some(Value::from("Go")));
}

#[test]
#[should_panic]
fn elem_out_of_range_panics() {
    let col = setup();
    col.elem(3);
}

#[test]
fn to_many_identifiers_keep_their_order() {
    let mut col = setup();
    let mut article = col.new_resource();
    article.set_id("a4".into());
    article
        .set_to_many("tags", Identifiers::new("tags", ["rust", "db", "api"]))
        .unwrap();
    article
        .set_to_one("author", Some(Identifier::new("people", "p1")))
        .unwrap();
    col.add(Box::new(article));

    let added = col.elem(3);
    let tags = added.get_to_many("tags");
    assert_eq!(tags.ids(), vec!["rust", "db", "api"]);
    assert!(tags.iter().all(|tag| tag.typ == "tags"));
    assert_eq!(tags.to_string(), "[(tags, rust),(tags, db),(tags, api)]");
    assert_eq!(added.get_to_one("author"), Some(Identifier::new("people", "p1")));
    assert!(col.elem(0).get_to_many("tags").is_empty());
    assert_eq!(col.elem(0).get_to_one("author"), None);
}

#[test]
fn filter_copies_matching_resources() {
    let col = setup();
    let popular = col.filter(&Condition::new("views", Op::Gt, 100u32));
    assert_eq!(popular.len(), 2);
    assert_eq!(popular.elem(0).id(), "a1");
    assert_eq!(popular.elem(1).id(), "a3");
    assert_eq!(col.len(), 3, "the source collection is left alone");

    let none = col.filter(&Condition::new("views", Op::Gt, 100i64));
    assert!(none.is_empty(), "uint32 attributes never match an int64 literal");
    let all = col.filter(&Condition::and(vec![]));
    assert_eq!(all.len(), 3);
}

#[test]
fn add_trusts_the_caller() {
    let mut col = setup();
    let people = TypeDef::new("people").attr("name", Kind::String, false).build().unwrap();
    let stranger = SoftCollection::new(people).new_resource();
    col.add(Box::new(stranger));
    assert_eq!(col.len(), 4);
    assert_eq!(col.elem(3).type_name(), "people");
}

#[test]
fn clones_are_independent() {
    let col = setup();
    let mut copy = col.clone();
    let mut article = copy.new_resource();
    article.set_id("a9".into());
    copy.add(Box::new(article));
    assert_eq!(col.len(), 3);
    assert_eq!(copy.len(), 4);
}
