// tests/record_tests.rs

use std::collections::{BTreeMap, HashMap};

use classad_lang::{AttributeMap, ClassAd, Error, Expr, LiteralEvaluator, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn sample() -> ClassAd {
    ClassAd::parse("[Cpus = 4; Memory = 2048; Requirements = TARGET.Memory >= Memory]").unwrap()
}

// ============================================================================
// Mapping operations
// ============================================================================

#[test]
fn test_get_and_try_get() {
    let ad = sample();
    assert_eq!(ad.get("cpus").unwrap(), &Expr::integer(4));
    assert_eq!(ad.try_get("Disk"), None);
    assert!(matches!(ad.get("Disk"), Err(Error::MissingKey(name)) if name == "Disk"));
}

#[test]
fn test_set_replaces_in_place() {
    let mut ad = sample();
    ad.set("MEMORY", 4096).unwrap();
    assert_eq!(ad.keys(), vec!["Cpus", "Memory", "Requirements"]);
    assert_eq!(ad.get("Memory").unwrap(), &Expr::integer(4096));
}

#[test]
fn test_set_appends_new_names() {
    let mut ad = ClassAd::new();
    ad.set("b", true).unwrap();
    ad.set("a", "text").unwrap();
    ad.set("c", 1.5).unwrap();
    assert_eq!(ad.keys(), vec!["b", "a", "c"]);
    assert_eq!(ad.to_canonical_string(), "[ b = true; a = \"text\"; c = 1.5 ]");
}

#[test]
fn test_delete_and_pop() {
    let mut ad = sample();
    ad.delete("cpus").unwrap();
    assert!(!ad.contains_key("Cpus"));
    assert!(ad.delete("Cpus").unwrap_err().is_key_lookup());

    let memory = ad.pop("Memory").unwrap();
    assert_eq!(memory, Expr::integer(2048));
    assert_eq!(ad.len(), 1);
}

#[test]
fn test_set_default() {
    let mut ad = sample();
    assert_eq!(ad.set_default("Cpus", 1).unwrap(), &Expr::integer(4));
    assert_eq!(ad.set_default("Disk", 100).unwrap(), &Expr::integer(100));
    assert_eq!(ad.keys().last().map(String::as_str), Some("Disk"));
}

#[test]
fn test_update_is_last_wins() {
    let mut ad = ClassAd::parse("[a = 1; b = 2]").unwrap();
    ad.update(&ClassAd::parse("[c = 3; A = 10]").unwrap());
    assert_eq!(ad.keys(), vec!["a", "b", "c"]);
    assert_eq!(ad.get("a").unwrap(), &Expr::integer(10));
}

#[test]
fn test_items_and_clear() {
    let mut ad = ClassAd::parse("[x = 1; y = x]").unwrap();
    let items = ad.items();
    assert_eq!(items[1], ("y".to_string(), Expr::attr("x")));
    ad.clear();
    assert!(ad.is_empty());
    assert_eq!(ad.to_canonical_string(), "[]");
}

// ============================================================================
// Keys
// ============================================================================

#[test]
fn test_non_string_keys() {
    let mut ad = sample();
    let key = json!(7);
    assert!(matches!(ad.get(&key), Err(Error::NonStringKey("number"))));
    assert!(ad.set(&key, 1).unwrap_err().is_key_lookup());
    assert!(ad.delete(&key).unwrap_err().is_key_lookup());
    assert!(!ad.contains_key(&key));

    let key = Value::Integer(1);
    assert!(ad.get(&key).unwrap_err().is_key_lookup());

    let key = Value::String("cpus".to_string());
    assert_eq!(ad.get(&key).unwrap(), &Expr::integer(4));
}

#[test]
fn test_empty_name_rejected() {
    let mut ad = ClassAd::new();
    assert!(matches!(ad.set("", 1), Err(Error::EmptyKey)));
}

// ============================================================================
// Conversions on assignment
// ============================================================================

#[test]
fn test_mapping_is_copied() {
    let mut source = HashMap::new();
    source.insert("inner".to_string(), 1);

    let mut ad = ClassAd::new();
    ad.set("nested", &source).unwrap();
    source.insert("inner".to_string(), 2);
    source.insert("extra".to_string(), 3);

    let Expr::Record(nested) = ad.get("nested").unwrap() else {
        panic!("Expected a nested record");
    };
    assert_eq!(nested.len(), 1);
    assert_eq!(nested.get("inner").unwrap(), &Expr::integer(1));
}

#[test]
fn test_nested_record_is_copied() {
    let mut inner = ClassAd::parse("[a = 1]").unwrap();
    let mut ad = ClassAd::new();
    ad.set("inner", &inner).unwrap();
    inner.set("a", 2).unwrap();
    assert_eq!(ad.to_canonical_string(), "[ inner = [ a = 1 ] ]");
}

#[test]
fn test_sequences_and_options() {
    let mut ad = ClassAd::new();
    ad.set("list", vec![1, 2, 3]).unwrap();
    ad.set("missing", None::<i32>).unwrap();
    ad.set("bytes", b"raw").unwrap();
    assert_eq!(
        ad.to_canonical_string(),
        "[ list = { 1, 2, 3 }; missing = undefined; bytes = \"raw\" ]"
    );
}

#[test]
fn test_unsupported_values() {
    let mut ad = ClassAd::new();
    assert!(matches!(ad.set("big", u64::MAX), Err(Error::TypeMismatch(_))));
    assert!(matches!(ad.set("bad", &[0xff_u8, 0xfe][..]), Err(Error::TypeMismatch(_))));
    assert!(ad.is_empty());
}

#[test]
fn test_integer_and_real_kept_apart() {
    let mut ad = ClassAd::new();
    ad.set("i", 2).unwrap();
    ad.set("r", 2.0).unwrap();
    assert_eq!(ad.get_value("i").unwrap(), Value::Integer(2));
    assert_eq!(ad.get_value("r").unwrap(), Value::Real(2.0));
}

#[test]
fn test_from_map() {
    let mut words = BTreeMap::new();
    words.insert("b", "two");
    words.insert("a", "one");
    let ad = ClassAd::from_map(words).unwrap();
    assert_eq!(ad.keys(), vec!["a", "b"]);
}

// ============================================================================
// Reading values
// ============================================================================

#[test]
fn test_get_value() {
    let ad = sample();
    assert_eq!(ad.get_value("Cpus").unwrap(), Value::Integer(4));
    assert!(matches!(ad.get_value("Requirements").unwrap(), Value::Expression(_)));
    assert!(ad.get_value("nothing").unwrap_err().is_key_lookup());
}

#[test]
fn test_evaluate_attr_against_target() {
    let job = ClassAd::parse("[Wanted = Memory]").unwrap();
    let machine = ClassAd::parse("[Memory = 2048]").unwrap();
    let engine = LiteralEvaluator::default();
    assert_eq!(
        job.evaluate_attr("Wanted", &engine, Some(&machine)).unwrap(),
        Value::Integer(2048)
    );
}

// ============================================================================
// Equality and rendering
// ============================================================================

#[test]
fn test_equality_is_structural() {
    let a = ClassAd::parse("[x = 2 + 2; y = \"s\"]").unwrap();
    let b = ClassAd::parse("[ y = \"s\" ; x = 2+2 ]").unwrap();
    let c = ClassAd::parse("[x = 2 + 3; y = \"s\"]").unwrap();
    assert_eq!(a, b);
    assert_eq!(b, a);
    assert_ne!(a, c);
}

#[test]
fn test_display_form() {
    let ad = ClassAd::parse("[a = 1; b = [c = {1, 2}]]").unwrap();
    let expected = "[\n    a = 1;\n    b = [\n        c = { 1, 2 }\n    ]\n]";
    assert_eq!(ad.to_string(), expected);
    assert_eq!(ClassAd::parse(expected).unwrap(), ad);
    assert_eq!(ClassAd::new().to_string(), "[]");
}

#[test]
fn test_canonical_round_trip() {
    let ad = sample();
    assert_eq!(
        ad.to_canonical_string(),
        "[ Cpus = 4; Memory = 2048; Requirements = TARGET.Memory >= Memory ]"
    );
    assert_eq!(ClassAd::parse(&ad.to_canonical_string()).unwrap(), ad);
}

#[test]
fn test_odd_attribute_names_round_trip() {
    let mut ad = ClassAd::new();
    ad.set("odd name", 1).unwrap();
    ad.set("true", 2).unwrap();
    let text = ad.to_canonical_string();
    assert_eq!(text, "[ 'odd name' = 1; 'true' = 2 ]");
    assert_eq!(ClassAd::parse(&text).unwrap(), ad);
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn test_json_round_trip() {
    let ad = ClassAd::parse(
        "[Name = \"slot1\"; Cpus = 4; Load = 0.5; Owner = undefined; Tags = {\"a\", \"b\"}; Start = Cpus > 2]",
    )
    .unwrap();
    let json = ad.to_json();
    assert_eq!(
        json,
        json!({
            "Name": "slot1",
            "Cpus": 4,
            "Load": 0.5,
            "Owner": null,
            "Tags": ["a", "b"],
            "Start": "/Expr(Cpus > 2)/",
        })
    );
    assert_eq!(ClassAd::try_from(json).unwrap(), ad);
}

proptest! {
    #[test]
    fn prop_canonical_round_trip(
        pairs in prop::collection::vec(("[a-z][a-z0-9_]{0,8}", any::<i64>(), ".*"), 0..8)
    ) {
        let mut ad = ClassAd::new();
        for (name, n, s) in pairs {
            if name.eq_ignore_ascii_case("is") || name.eq_ignore_ascii_case("isnt") {
                continue;
            }
            ad.set(&format!("{}_n", name), n).unwrap();
            ad.set(&format!("{}_s", name), s).unwrap();
        }
        prop_assert_eq!(ClassAd::parse(&ad.to_canonical_string()).unwrap(), ad.clone());
        prop_assert_eq!(ClassAd::parse(&ad.to_display_string()).unwrap(), ad);
    }
}
