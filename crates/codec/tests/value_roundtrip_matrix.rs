use serde_json::json;
use tether_codec::{
    regexp_flags, DedupMode, ErrorKind, ErrorValue, RegExpValue, Value, ValueDecoder, ValueEncoder,
};

fn roundtrip_with(mode: DedupMode, value: &Value) -> Value {
    let mut encoder = ValueEncoder::with_mode(mode);
    let bytes = encoder.encode(value).expect("encode");
    let mut decoder = ValueDecoder::with_mode(mode);
    decoder.decode(&bytes).expect("decode")
}

fn matrix() -> Vec<Value> {
    vec![
        Value::Undefined,
        Value::Null,
        Value::Bool(true),
        Value::Bool(false),
        Value::Integer(0),
        Value::Integer(-1),
        Value::Integer(1),
        Value::Integer(i64::MAX),
        Value::Integer(i64::MIN),
        Value::Number(0.0),
        Value::Number(1.5),
        Value::Number(-123456.789),
        Value::Number(f64::INFINITY),
        Value::Number(f64::NEG_INFINITY),
        Value::Number(f64::MIN_POSITIVE),
        Value::Str(String::new()),
        Value::Str("hello".into()),
        Value::Str("héllo 🌍 — ≠".into()),
        Value::DenseArray(vec![]),
        Value::DenseArray(vec![
            Value::Integer(1),
            Value::Undefined,
            Value::Str("gap".into()),
            Value::Undefined,
        ]),
        Value::SparseArray(vec![]),
        Value::SparseArray(vec![
            (0, Value::Str("zero".into())),
            (5, Value::Null),
            (1000, Value::Integer(7)),
        ]),
        Value::Map(vec![
            (Value::Str("k".into()), Value::Integer(1)),
            (Value::Integer(2), Value::Str("two".into())),
            (Value::Bool(true), Value::Null),
        ]),
        Value::Set(vec![
            Value::Str("a".into()),
            Value::Str("b".into()),
            Value::Integer(3),
        ]),
        Value::Object(vec![
            ("name".into(), Value::Str("tether".into())),
            ("version".into(), Value::Integer(1)),
        ]),
        Value::RegExp(RegExpValue::new(
            "^a.*b$",
            regexp_flags::GLOBAL | regexp_flags::IGNORE_CASE,
        )),
        Value::RegExp(RegExpValue::new("", 0)),
        Value::Error(ErrorValue::new(ErrorKind::Type, "not a function")),
        Value::Error(
            ErrorValue::new(ErrorKind::Range, "out of range").with_stack("at main (app.js:1:1)"),
        ),
        // Nested composite exercising every container in one tree.
        Value::Object(vec![
            (
                "rows".into(),
                Value::DenseArray(vec![
                    Value::Object(vec![("id".into(), Value::Integer(1))]),
                    Value::Object(vec![("id".into(), Value::Integer(2))]),
                ]),
            ),
            (
                "index".into(),
                Value::Map(vec![(
                    Value::Str("first".into()),
                    Value::SparseArray(vec![(3, Value::Set(vec![Value::Str("tag".into())]))]),
                )]),
            ),
            (
                "failure".into(),
                Value::Error(ErrorValue::new(ErrorKind::Reference, "x is not defined")),
            ),
        ]),
    ]
}

#[test]
fn roundtrip_matrix_grouped() {
    for value in matrix() {
        assert_eq!(roundtrip_with(DedupMode::Grouped, &value), value, "{value:?}");
    }
}

#[test]
fn roundtrip_matrix_exact() {
    for value in matrix() {
        assert_eq!(roundtrip_with(DedupMode::Exact, &value), value, "{value:?}");
    }
}

#[test]
fn integer_and_double_stay_distinct() {
    // Same numeric value, different kinds; both must survive unchanged.
    let int = roundtrip_with(DedupMode::Grouped, &Value::Integer(5));
    let num = roundtrip_with(DedupMode::Grouped, &Value::Number(5.0));
    assert_eq!(int, Value::Integer(5));
    assert_eq!(num, Value::Number(5.0));
    assert_ne!(int, num);
}

#[test]
fn sparse_array_keeps_exact_indices() {
    let sparse = Value::SparseArray(vec![
        (0, Value::Integer(10)),
        (5, Value::Integer(50)),
        (1000, Value::Integer(99)),
    ]);
    let decoded = roundtrip_with(DedupMode::Grouped, &sparse);
    let Value::SparseArray(pairs) = decoded else {
        panic!("expected sparse array");
    };
    assert_eq!(
        pairs.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
        vec![0, 5, 1000]
    );
    // No holes materialized: three pairs, nothing in between.
    assert_eq!(pairs.len(), 3);
}

#[test]
fn dense_array_holes_survive() {
    let arr = Value::DenseArray(vec![
        Value::Undefined,
        Value::Integer(1),
        Value::Undefined,
    ]);
    assert_eq!(roundtrip_with(DedupMode::Grouped, &arr), arr);
}

#[test]
fn map_insertion_order_is_preserved() {
    let map = Value::Map(vec![
        (Value::Str("z".into()), Value::Integer(1)),
        (Value::Str("a".into()), Value::Integer(2)),
        (Value::Integer(0), Value::Integer(3)),
    ]);
    assert_eq!(roundtrip_with(DedupMode::Grouped, &map), map);
}

#[test]
fn json_pipeline_preserves_content() {
    let original = json!({
        "title": "report",
        "count": 3,
        "ratio": 0.25,
        "flags": [true, false, null],
        "nested": {"inner": ["x", "x", "x"]}
    });
    let tree = Value::from(original.clone());
    let mut encoder = ValueEncoder::new();
    let bytes = encoder.encode(&tree).expect("encode");
    let mut decoder = ValueDecoder::new();
    let decoded = decoder.decode(&bytes).expect("decode");
    assert_eq!(serde_json::Value::from(decoded), original);
}

#[test]
fn concurrent_codecs_do_not_interfere() {
    let handles: Vec<_> = (0..4)
        .map(|t| {
            std::thread::spawn(move || {
                let tree = Value::Object(vec![
                    ("thread".into(), Value::Integer(t)),
                    ("payload".into(), Value::Str(format!("worker-{t}"))),
                    ("payload2".into(), Value::Str(format!("worker-{t}"))),
                ]);
                for _ in 0..100 {
                    assert_eq!(roundtrip_with(DedupMode::Grouped, &tree), tree);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread");
    }
}

#[test]
fn reused_instances_match_fresh_instances() {
    let trees = matrix();
    let mut encoder = ValueEncoder::new();
    let mut decoder = ValueDecoder::new();
    for tree in &trees {
        let reused = encoder.encode(tree).expect("encode");
        let fresh = ValueEncoder::new().encode(tree).expect("encode");
        assert_eq!(reused, fresh);
        assert_eq!(decoder.decode(&reused).expect("decode"), *tree);
    }
}
