use tether_codec::{
    opcode, DecodeError, ErrorKind, ErrorValue, RegExpValue, Value, ValueDecoder, ValueEncoder,
};

fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    ValueDecoder::new().decode(bytes)
}

/// A tree touching every record shape: composites, literals,
/// back-references, varint integers, doubles, regexp, error.
fn rich_tree() -> Value {
    Value::Object(vec![
        (
            "rows".into(),
            Value::DenseArray(vec![
                Value::Object(vec![("id".into(), Value::Str("dup".into()))]),
                Value::Object(vec![("id".into(), Value::Str("dup".into()))]),
            ]),
        ),
        (
            "sparse".into(),
            Value::SparseArray(vec![(0, Value::Integer(300)), (1000, Value::Number(2.5))]),
        ),
        (
            "meta".into(),
            Value::Map(vec![(Value::Str("re".into()), Value::RegExp(RegExpValue::new("a+", 1)))]),
        ),
        (
            "err".into(),
            Value::Error(ErrorValue::new(ErrorKind::Syntax, "bad token").with_stack("at 1:1")),
        ),
        ("set".into(), Value::Set(vec![Value::Str("dup".into())])),
    ])
}

#[test]
fn truncation_at_every_byte_boundary_is_rejected() {
    let mut encoder = ValueEncoder::new();
    let bytes = encoder.encode(&rich_tree()).expect("encode");
    // Sanity: the untruncated stream decodes.
    assert_eq!(decode(&bytes), Ok(rich_tree()));

    for cut in 0..bytes.len() {
        let result = decode(&bytes[..cut]);
        match result {
            Err(DecodeError::TruncatedInput) | Err(DecodeError::LengthOverflow) => {}
            other => panic!("cut at {cut}/{} gave {other:?}", bytes.len()),
        }
    }
}

#[test]
fn unknown_backreference_at_top_level() {
    assert_eq!(
        decode(&[opcode::STR_REF, 0]),
        Err(DecodeError::UnknownBackReference(0))
    );
}

#[test]
fn unknown_backreference_inside_object() {
    // {"a": <backref 5>} with nothing assigned in the text bucket.
    let bytes = [
        opcode::OBJECT,
        1,
        opcode::STR,
        1,
        b'a',
        opcode::STR_REF,
        5,
    ];
    assert_eq!(decode(&bytes), Err(DecodeError::UnknownBackReference(5)));
}

#[test]
fn backreference_across_buckets_is_unknown() {
    // A key literal does not make its ID resolvable from a value position:
    // {"a": <backref 0>}.
    let bytes = [
        opcode::OBJECT,
        1,
        opcode::STR,
        1,
        b'a',
        opcode::STR_REF,
        0,
    ];
    assert_eq!(decode(&bytes), Err(DecodeError::UnknownBackReference(0)));
}

#[test]
fn string_length_beyond_input_is_length_overflow() {
    assert_eq!(
        decode(&[opcode::STR, 100, b'a']),
        Err(DecodeError::LengthOverflow)
    );
}

#[test]
fn composite_count_beyond_input_is_length_overflow() {
    assert_eq!(decode(&[opcode::DENSE_ARRAY, 100]), Err(DecodeError::LengthOverflow));
    assert_eq!(
        decode(&[opcode::MAP, 3, opcode::NULL]),
        Err(DecodeError::LengthOverflow)
    );
    assert_eq!(decode(&[opcode::SET, 0xff, 0xff, 0xff, 0xff, 0x0f]), Err(DecodeError::LengthOverflow));
}

#[test]
fn invalid_utf8_literal_is_rejected() {
    assert_eq!(
        decode(&[opcode::STR, 2, 0xff, 0xfe]),
        Err(DecodeError::InvalidUtf8)
    );
}

#[test]
fn unassigned_opcodes_are_rejected() {
    for op in [0x06u8, 0x0f, 0x12, 0x27, 0x40, 0x80, 0xff] {
        assert_eq!(decode(&[op]), Err(DecodeError::InvalidOpcode(op)), "0x{op:02x}");
    }
}

#[test]
fn regexp_pattern_must_be_a_string_record() {
    // REGEXP with flags 0 whose pattern slot holds an INT record.
    let bytes = [opcode::REGEXP, 0, opcode::INT, 2];
    assert_eq!(decode(&bytes), Err(DecodeError::InvalidOpcode(opcode::INT)));
}

#[test]
fn sparse_index_truncated_mid_varint() {
    let bytes = [opcode::SPARSE_ARRAY, 1, 0x80];
    assert_eq!(decode(&bytes), Err(DecodeError::TruncatedInput));
}

#[test]
fn trailing_bytes_are_reported_via_consumed() {
    let mut encoder = ValueEncoder::new();
    let mut bytes = encoder.encode(&Value::Integer(1)).expect("encode");
    let record_len = bytes.len();
    bytes.extend_from_slice(&[0xde, 0xad]);

    let mut decoder = ValueDecoder::new();
    let (value, consumed) = decoder.decode_with_consumed(&bytes).expect("decode");
    assert_eq!(value, Value::Integer(1));
    assert_eq!(consumed, record_len);
}

#[test]
fn failed_decode_does_not_poison_the_instance() {
    let mut decoder = ValueDecoder::new();
    assert!(decoder.decode(&[opcode::STR_REF, 0]).is_err());
    // The per-call pool was discarded with the failed call; a good stream
    // decodes cleanly afterwards.
    let mut encoder = ValueEncoder::new();
    let tree = rich_tree();
    let bytes = encoder.encode(&tree).expect("encode");
    assert_eq!(decoder.decode(&bytes), Ok(tree));
}
