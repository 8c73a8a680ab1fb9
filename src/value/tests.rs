use proptest::prelude::*;

use crate::buf::RecvBuf;
use crate::error::{ErrorKind, Result};
use crate::proto::Endianness;
use crate::signature::{OwnedSignature, Signature};

use super::read::read_value;
use super::write::BodyWriter;
use super::Value;

fn sig(bytes: &[u8]) -> OwnedSignature {
    OwnedSignature::new(bytes).unwrap()
}

/// Encode `value` from a body origin and read it back at the same
/// signature.
fn roundtrip_at(value: &Value, endianness: Endianness) -> Result<Value> {
    let signature = value.signature()?;

    let mut out = Vec::new();
    BodyWriter::new(&mut out, endianness).put_value(value)?;

    let mut buf = RecvBuf::with_endianness(endianness);
    buf.feed(&out);

    let decoded = read_value(&mut buf, &signature)?;
    assert_eq!(buf.remaining(), 0, "trailing bytes after {signature}");
    Ok(decoded)
}

#[test]
fn basic_roundtrips() -> Result<()> {
    let values = [
        Value::Byte(0xfe),
        Value::Bool(true),
        Value::Int16(-2),
        Value::Uint16(40_000),
        Value::Int32(-70_000),
        Value::Uint32(3_000_000_000),
        Value::Int64(i64::MIN),
        Value::Uint64(u64::MAX),
        Value::Double(3.5),
        Value::String(String::from("Hello World")),
        Value::ObjectPath(String::from("/org/freedesktop/DBus")),
        Value::Signature(sig(b"a{sv}")),
        Value::Variant(Box::new(Value::Int32(42))),
        Value::Struct(vec![Value::Byte(1), Value::Variant(Box::new(Value::Bool(false)))]),
        Value::Array(sig(b"s"), vec![Value::from("a"), Value::from("bc")]),
    ];

    for value in values {
        assert_eq!(roundtrip_at(&value, Endianness::Little)?, value);
        assert_eq!(roundtrip_at(&value, Endianness::Big)?, value);
    }

    Ok(())
}

#[test]
fn fixed_width_layout() -> Result<()> {
    // A byte followed by a u32 pads to the 4-byte boundary.
    let value = Value::Struct(vec![Value::Byte(1), Value::Uint32(2)]);

    let mut out = Vec::new();
    BodyWriter::new(&mut out, Endianness::Little).put_value(&value)?;
    assert_eq!(out, [1, 0, 0, 0, 2, 0, 0, 0]);
    Ok(())
}

#[test]
fn empty_array_padding() -> Result<()> {
    // The element alignment padding is emitted even for an empty array of
    // 8-aligned elements.
    let value = Value::Array(sig(b"(u)"), Vec::new());

    let mut out = Vec::new();
    BodyWriter::new(&mut out, Endianness::Little).put_value(&value)?;
    assert_eq!(out, [0, 0, 0, 0, 0, 0, 0, 0]);

    let mut buf = RecvBuf::with_endianness(Endianness::Little);
    buf.feed(&out);
    assert_eq!(read_value(&mut buf, &sig(b"a(u)"))?, value);

    // A 4-byte truncation is not a complete value.
    let mut buf = RecvBuf::with_endianness(Endianness::Little);
    buf.feed(&out[..4]);
    let e = read_value(&mut buf, &sig(b"a(u)")).unwrap_err();
    assert!(e.is_need_more());
    Ok(())
}

#[test]
fn dict_roundtrip() -> Result<()> {
    let value = Value::Dict(
        sig(b"s"),
        sig(b"v"),
        vec![
            (Value::from("foo"), Value::Variant(Box::new(Value::Int32(1)))),
            (Value::from("bar"), Value::Variant(Box::new(Value::from("x")))),
        ],
    );

    let decoded = roundtrip_at(&value, Endianness::Little)?;

    let Value::Dict(.., entries) = &decoded else {
        panic!("expected a dict, got {decoded:?}");
    };

    assert_eq!(entries.len(), 2);
    assert_eq!(decoded, value);
    Ok(())
}

#[test]
fn dict_duplicate_keys_last_write_wins() -> Result<()> {
    let duplicated = Value::Dict(
        sig(b"u"),
        sig(b"s"),
        vec![
            (Value::Uint32(1), Value::from("first")),
            (Value::Uint32(1), Value::from("second")),
        ],
    );

    let mut out = Vec::new();
    BodyWriter::new(&mut out, Endianness::Little).put_value(&duplicated)?;

    let mut buf = RecvBuf::with_endianness(Endianness::Little);
    buf.feed(&out);

    let decoded = read_value(&mut buf, &sig(b"a{us}"))?;
    assert_eq!(
        decoded,
        Value::Dict(
            sig(b"u"),
            sig(b"s"),
            vec![(Value::Uint32(1), Value::from("second"))],
        )
    );
    Ok(())
}

#[test]
fn nested_struct_signature_splits_by_complete_types() -> Result<()> {
    let value = Value::Struct(vec![Value::Array(
        sig(b"(ii)"),
        vec![Value::Struct(vec![Value::Int32(1), Value::Int32(2)])],
    )]);

    assert_eq!(value.signature()?.as_str(), "(a(ii))");
    assert_eq!(roundtrip_at(&value, Endianness::Little)?, value);
    Ok(())
}

#[test]
fn bool_out_of_range() {
    let mut buf = RecvBuf::with_endianness(Endianness::Little);
    buf.feed(&[2, 0, 0, 0]);

    let e = read_value(&mut buf, Signature::new(b"b").unwrap()).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::InvalidBool(2)));
}

#[test]
fn string_with_interior_nul() {
    let mut buf = RecvBuf::with_endianness(Endianness::Little);
    buf.feed(&[3, 0, 0, 0, b'a', 0, b'b', 0]);

    let e = read_value(&mut buf, Signature::new(b"s").unwrap()).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::NulInString));
}

#[test]
fn invalid_object_path() {
    let mut buf = RecvBuf::with_endianness(Endianness::Little);
    buf.feed(&[2, 0, 0, 0, b'/', b'/', 0]);

    let e = read_value(&mut buf, Signature::new(b"o").unwrap()).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::ObjectPath(..)));
}

#[test]
fn array_length_overrun() {
    // Array of u32 claiming 6 bytes of content.
    let mut buf = RecvBuf::with_endianness(Endianness::Little);
    buf.feed(&[6, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);

    let e = read_value(&mut buf, Signature::new(b"au").unwrap()).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::LengthOverrun));
}

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<u8>().prop_map(Value::Byte),
        any::<bool>().prop_map(Value::Bool),
        any::<i16>().prop_map(Value::Int16),
        any::<u16>().prop_map(Value::Uint16),
        any::<i32>().prop_map(Value::Int32),
        any::<u32>().prop_map(Value::Uint32),
        any::<i64>().prop_map(Value::Int64),
        any::<u64>().prop_map(Value::Uint64),
        (-1.0e12f64..1.0e12).prop_map(Value::Double),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        Just(Value::ObjectPath(String::from("/org/freedesktop/DBus"))),
        Just(Value::Signature(sig(b"a{sv}"))),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|v| Value::Variant(Box::new(v))),
            prop::collection::vec(inner.clone(), 1..4).prop_map(Value::Struct),
            (inner.clone(), 0..3usize).prop_map(|(v, n)| {
                let elem = v.signature().unwrap();
                Value::Array(elem, vec![v; n])
            }),
            prop::collection::btree_map(any::<u32>(), inner, 0..3).prop_map(|entries| {
                Value::Dict(
                    sig(b"u"),
                    sig(b"v"),
                    entries
                        .into_iter()
                        .map(|(k, v)| (Value::Uint32(k), Value::Variant(Box::new(v))))
                        .collect(),
                )
            }),
        ]
    })
}

proptest! {
    #[test]
    fn roundtrip_any_value(value in value_strategy()) {
        prop_assert_eq!(&roundtrip_at(&value, Endianness::Little).unwrap(), &value);
        prop_assert_eq!(&roundtrip_at(&value, Endianness::Big).unwrap(), &value);
    }

    #[test]
    fn alignment_holds_at_any_offset(value in value_strategy(), lead in 0usize..16) {
        // Encoding after a misaligned lead-in of bytes must pad so the
        // value still reads back at the same offset.
        let signature = value.signature().unwrap();

        let mut out = vec![0x5a; lead];
        let mut w = BodyWriter::new(&mut out, Endianness::Little);
        w.put_value(&Value::Byte(0)).unwrap();
        w.put_value(&value).unwrap();

        let mut buf = RecvBuf::with_endianness(Endianness::Little);
        buf.feed(&out);
        buf.consume(lead).unwrap();

        let first = read_value(&mut buf, Signature::new(b"y").unwrap()).unwrap();
        prop_assert_eq!(first, Value::Byte(0));

        let decoded = read_value(&mut buf, &signature).unwrap();
        prop_assert_eq!(&decoded, &value);
    }
}
