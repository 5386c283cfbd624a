//! Property: for any input a model accepts, constructing its canonical
//! output again yields the same record.

use curate_core::FieldValue;
use curate_schema::ModelCompiler;
use proptest::prelude::*;
use serde_json::{json, Value};

fn schema() -> Value {
    json!({
        "title": {"type": "string", "required": true},
        "count": {"type": "int"},
        "ratio": {"type": "float"},
        "flag": {"type": "bool", "default": false},
        "kind": {"type": "enum", "enum": ["static", "filterable"], "required": true},
        "published": {"type": "datetime"},
        "tags": {"type": "list", "items": {"type": "string"}},
        "contact": {
            "name": {"type": "string", "required": true},
            "email": {"type": "string"}
        }
    })
}

fn valid_input() -> impl Strategy<Value = Value> {
    (
        "[a-zA-Z ]{1,20}",
        proptest::option::of(any::<i32>()),
        proptest::option::of(-1000i32..1000),
        proptest::option::of(any::<bool>()),
        prop_oneof![Just("static"), Just("filterable")],
        proptest::option::of((2000i32..2030, 1u32..13, 1u32..29)),
        proptest::option::of(prop::collection::vec("[a-z]{0,8}", 0..5)),
        proptest::option::of("[a-z]{1,10}"),
    )
        .prop_map(|(title, count, ratio, flag, kind, date, tags, contact)| {
            let mut v = json!({"title": title, "kind": kind});
            let obj = v.as_object_mut().expect("object literal");
            if let Some(n) = count {
                obj.insert("count".into(), json!(n));
            }
            if let Some(r) = ratio {
                obj.insert("ratio".into(), json!(r));
            }
            if let Some(b) = flag {
                obj.insert("flag".into(), json!(b));
            }
            if let Some((y, m, d)) = date {
                obj.insert("published".into(), json!(format!("{y:04}-{m:02}-{d:02}")));
            }
            if let Some(t) = tags {
                obj.insert("tags".into(), json!(t));
            }
            if let Some(name) = contact {
                obj.insert("contact".into(), json!({"name": name}));
            }
            v
        })
}

proptest! {
    #[test]
    fn construct_is_idempotent(input in valid_input()) {
        let mut compiler = ModelCompiler::new();
        let model = compiler.compile("PropModel", &schema()).unwrap();
        let once = model.construct_json(&input).unwrap();
        let twice = model.construct(&once).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.len(), model.fields().len());
    }

    #[test]
    fn missing_required_is_always_named(input in valid_input()) {
        let mut compiler = ModelCompiler::new();
        let model = compiler.compile("PropModel", &schema()).unwrap();
        let mut record = match FieldValue::from(input) {
            FieldValue::Map(m) => m,
            _ => unreachable!(),
        };
        record.remove("title");
        let err = model.construct(&record).unwrap_err();
        prop_assert!(err.mentions("title"));
    }
}
