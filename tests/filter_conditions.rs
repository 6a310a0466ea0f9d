use chrono::DateTime;
use jsonapi_core::{
    matches, Cardinality, Condition, Kind, Op, Operand, Resource, Schema, SoftResource,
    TypeDef, Value,
};

fn setup() -> (Schema, SoftResource) {
    let schema = TypeDef::new("people")
        .attr("name", Kind::String, false)
        .attr("age", Kind::Int32, false)
        .attr("active", Kind::Bool, false)
        .attr("nickname", Kind::String, true)
        .attr("joined", Kind::Time, false)
        .rel("articles", "articles", Cardinality::ToMany, None)
        .build()
        .map(|people| {
            let mut schema = Schema::new();
            schema.add_type(people).unwrap();
            schema
        })
        .unwrap();
    let mut person = schema.resource("people").unwrap();
    person.set_id("p1".into());
    person.set("name", Value::from("Ada")).unwrap();
    person.set("age", Value::from(30i32)).unwrap();
    person.set("active", Value::from(true)).unwrap();
    let joined = DateTime::parse_from_rfc3339("2020-01-01T12:00:00+02:00").unwrap();
    person.set("joined", Value::from(joined)).unwrap();
    (schema, person)
}

#[test]
fn comparisons_on_matching_kinds() {
    let (_, person) = setup();
    assert!(matches(&person, &Condition::new("age", Op::Ge, 18i32)));
    assert!(matches(&person, &Condition::new("age", Op::Eq, 30i32)));
    assert!(!matches(&person, &Condition::new("age", Op::Lt, 30i32)));
    assert!(matches(&person, &Condition::new("age", Op::Le, 30i32)));
    assert!(!matches(&person, &Condition::new("age", Op::Gt, 30i32)));
    assert!(matches(&person, &Condition::new("name", Op::Lt, "Bob")));
    assert!(matches(&person, &Condition::new("name", Op::Ne, "Bob")));
}

#[test]
fn different_kinds_never_match() {
    let (_, person) = setup();
    for op in [Op::Eq, Op::Ne, Op::Lt, Op::Le, Op::Gt, Op::Ge] {
        let cond = Condition::new("age", op.clone(), "30");
        assert!(!matches(&person, &cond), "int32 {op} string must be false");
        let cond = Condition::new("age", op.clone(), 30i64);
        assert!(!matches(&person, &cond), "int32 {op} int64 must be false");
    }
}

#[test]
fn booleans_only_compare_for_equality() {
    let (_, person) = setup();
    assert!(matches(&person, &Condition::new("active", Op::Eq, true)));
    assert!(matches(&person, &Condition::new("active", Op::Ne, false)));
    assert!(!matches(&person, &Condition::new("active", Op::Gt, false)));
    assert!(!matches(&person, &Condition::new("active", Op::Ge, true)));
}

#[test]
fn timestamps_compare_by_instant() {
    let (_, person) = setup();
    let same = DateTime::parse_from_rfc3339("2020-01-01T10:00:00Z").unwrap();
    assert!(matches(&person, &Condition::new("joined", Op::Eq, same)));
    assert!(!matches(&person, &Condition::new("joined", Op::Gt, same)));
    let later = DateTime::parse_from_rfc3339("2020-01-01T10:00:01Z").unwrap();
    assert!(matches(&person, &Condition::new("joined", Op::Lt, later)));
}

#[test]
fn nulls() {
    let (_, person) = setup();
    let null = Value::null(Kind::String);
    assert!(matches(&person, &Condition::new("nickname", Op::Eq, null.clone())));
    assert!(!matches(&person, &Condition::new("nickname", Op::Ne, null.clone())));
    assert!(matches(&person, &Condition::new("nickname", Op::Ne, "Countess")));
    assert!(!matches(&person, &Condition::new("nickname", Op::Lt, "Countess")));
    assert!(!matches(&person, &Condition::new("name", Op::Eq, null)));
}

#[test]
fn and_or() {
    let (_, person) = setup();
    assert!(matches(&person, &Condition::and(vec![])), "empty and holds");
    assert!(!matches(&person, &Condition::or(vec![])), "empty or fails");
    let adult_named_ada = Condition::and(vec![
        Condition::new("age", Op::Ge, 18i32),
        Condition::new("name", Op::Eq, "Ada"),
    ]);
    assert!(adult_named_ada.matches(&person));
    let either = Condition::or(vec![
        Condition::new("age", Op::Lt, 18i32),
        Condition::new("name", Op::Eq, "Ada"),
    ]);
    assert!(either.matches(&person));
    let neither = Condition::or(vec![
        Condition::new("age", Op::Lt, 18i32),
        Condition::new("name", Op::Eq, "Bob"),
    ]);
    assert!(!neither.matches(&person));
}

#[test]
fn unresolvable_fields_do_not_match() {
    let (_, person) = setup();
    assert!(!matches(&person, &Condition::new("height", Op::Eq, 180i32)));
    assert!(!matches(&person, &Condition::new("articles", Op::Eq, "a1")));
}

#[test]
fn unknown_operator_decodes_but_never_matches() {
    let (_, person) = setup();
    let cond = Condition::from_json(r#"{"f":"age","o":"~","v":30}"#).unwrap();
    assert_eq!(cond.op, Op::Unknown("~".into()));
    assert_eq!(cond.val, Operand::Missing);
    assert!(!cond.matches(&person));
}

#[test]
fn untyped_decoding_infers_literal_kinds() {
    let cond = Condition::from_json(r#"{"f":"age","o":">=","v":18}"#).unwrap();
    assert_eq!(cond.field, "age");
    assert_eq!(cond.op, Op::Ge);
    assert_eq!(cond.value(), Some(&Value::from(18i64)));
    let cond = Condition::from_json(r#"{"f":"name","o":"=","v":"Ada"}"#).unwrap();
    assert_eq!(cond.value(), Some(&Value::from("Ada")));
    assert!(Condition::from_json(r#"{"f":"age","o":"=","v":1.5}"#).is_err());
    assert!(Condition::from_json("not json").is_err());
}

#[test]
fn schema_typed_decoding() {
    let (schema, person) = setup();
    let cond = Condition::from_json_for(&schema, "people", r#"{"f":"age","o":">=","v":18}"#).unwrap();
    assert_eq!(cond.value(), Some(&Value::from(18i32)));
    assert!(cond.matches(&person));
    let cond = Condition::from_json_for(&schema, "people", r#"{"f":"age","o":"=","v":"30"}"#).unwrap();
    assert!(!cond.matches(&person), "a string literal never matches an int32 attribute");
    let text = r#"{"f":"joined","o":"=","v":"2020-01-01T10:00:00Z"}"#;
    let cond = Condition::from_json_for(&schema, "people", text).unwrap();
    assert!(cond.matches(&person));
    let cond = Condition::from_json_for(&schema, "people", r#"{"f":"nickname","o":"=","v":null}"#).unwrap();
    assert!(cond.matches(&person));
    assert!(Condition::from_json_for(&schema, "ghosts", r#"{"o":"and","v":[]}"#).is_err());
}

#[test]
fn nested_conditions_on_the_wire() {
    let (schema, person) = setup();
    let text = r#"{"o":"and","v":[{"f":"age","o":">=","v":18},{"o":"or","v":[{"f":"name","o":"=","v":"Ada"},{"f":"name","o":"=","v":"Bob"}]}]}"#;
    let cond = Condition::from_json_for(&schema, "people", text).unwrap();
    assert_eq!(cond.op, Op::And);
    assert_eq!(cond.children().len(), 2);
    assert_eq!(cond.children()[1].children().len(), 2);
    assert!(cond.matches(&person));
    assert_eq!(cond.to_json().unwrap(), text);
}

#[test]
fn encoding_leaves_out_empty_keys() {
    let cond = Condition::new("age", Op::Ge, 18i32);
    assert_eq!(cond.to_json().unwrap(), r#"{"f":"age","o":">=","v":18}"#);
    let cond = Condition::new("title", Op::Eq, "Rust").within("articles");
    assert_eq!(cond.to_json().unwrap(), r#"{"f":"title","o":"=","v":"Rust","c":"articles"}"#);
    assert_eq!(Condition::and(vec![]).to_json().unwrap(), r#"{"o":"and","v":[]}"#);
    let decoded = Condition::from_json(r#"{"f":"title","o":"=","v":"Rust","c":"articles"}"#).unwrap();
    assert_eq!(decoded.col, "articles");
    assert_eq!(decoded, cond);
}

#[test]
fn operators_round_trip_their_symbols() {
    for symbol in ["=", "!=", "<", "<=", ">", ">=", "and", "or", "like"] {
        assert_eq!(Op::from(symbol).as_str(), symbol);
    }
    assert!(Op::Le.is_comparison());
    assert!(Op::Or.is_boolean());
    assert!(!Op::Unknown("like".into()).is_comparison());
}

#[test]
fn working_age_range() {
    let (schema, mut person) = setup();
    let text = r#"{"o":"and","v":[{"f":"age","o":">=","v":18},{"f":"age","o":"<","v":65}]}"#;
    let cond = Condition::from_json_for(&schema, "people", text).unwrap();
    assert!(cond.matches(&person), "30 is within the range");
    person.set("age", Value::from(70i32)).unwrap();
    assert!(!cond.matches(&person), "70 is outside the range");
    let decoded = Condition::from_json_for(&schema, "people", &cond.to_json().unwrap()).unwrap();
    assert_eq!(decoded, cond);
}
