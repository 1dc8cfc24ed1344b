//! End-to-end tests for generated codecs.
//!
//! Every type here has its `Marshal`, `Unmarshal`, `Encodable`,
//! `Decodable` and `Sizer` impls generated by the build script.

use std::collections::{BTreeMap, HashMap};

use msgp_rs::{Decodable, Error, Marshal, RawExtension, Reader, Sizer, Unmarshal};
use msgp_rs_tests::{
    Celsius, Digest, Empty, Kind, Position, Registry, Rgb, Sample, Tags, TestFast, TestObj,
    TestType, UserId,
};

// =============================================================================
// Fixtures
// =============================================================================

fn test_fast() -> TestFast {
    TestFast {
        lat: 40.7128,
        long: -74.006,
        alt: 10.5,
        data: vec![0x00, 0xff, 0x10, 0x20, 0x7f],
    }
}

fn test_type() -> TestType {
    TestType {
        name: "root".to_string(),
        f: Some(2.5),
        els: HashMap::from([
            ("a".to_string(), "alpha".to_string()),
            ("b".to_string(), "beta".to_string()),
        ]),
        obj: TestObj {
            value_a: "value a".to_string(),
            value_b: b"value b".to_vec(),
        },
        child: Some(Box::new(TestType {
            name: "child".to_string(),
            kind: Kind::Leaf,
            ..Default::default()
        })),
        kind: Kind::Branch,
        owner: UserId::new("user-42"),
        slice1: vec!["one".to_string(), "two".to_string()],
        slice_ptr: vec![Some("present".to_string()), None],
        counts: BTreeMap::from([
            ("evens".to_string(), vec![0, 2, 4]),
            ("odds".to_string(), vec![1, 3, 70_000]),
        ]),
        grid: [[1, -2, 300], [-20_000, 5, i16::MAX]],
        digest: *b"0123456789abcdef",
        color: Rgb { r: 255, g: 128, b: 0 },
        raw_ext: RawExtension::new(-3, vec![9, 8, 7, 6, 5]),
        position: Position(51.5, -0.12),
        tags: Tags(vec!["x".to_string(), String::new()]),
    }
}

fn marshal<T: Marshal>(v: &T) -> Vec<u8> {
    msgp_rs::to_vec(v).unwrap()
}

fn encode<T: msgp_rs::Encodable>(v: &T) -> Vec<u8> {
    msgp_rs::encode(Vec::new(), v).unwrap()
}

fn unmarshal<T: Unmarshal + Default>(bts: &[u8]) -> Result<T, Error> {
    let (v, rest) = msgp_rs::from_slice(bts)?;
    assert!(rest.is_empty(), "{} bytes left over", rest.len());
    Ok(v)
}

fn decode<T: Decodable + Default>(bts: &[u8]) -> Result<T, Error> {
    msgp_rs::decode(bts)
}

fn expect_array_size<T: std::fmt::Debug>(result: Result<T, Error>, expected: u32, found: u32) {
    match result {
        Err(Error::ArraySize {
            expected: e,
            found: f,
        }) => assert_eq!((e, f), (expected, found)),
        other => panic!("expected array size error, got {:?}", other),
    }
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_fast_round_trip() {
    let v = test_fast();
    let bts = marshal(&v);

    let out: TestFast = unmarshal(&bts).unwrap();
    assert_eq!(out, v);
    assert_eq!(out.data, vec![0x00, 0xff, 0x10, 0x20, 0x7f]);

    let out: TestFast = decode(&bts).unwrap();
    assert_eq!(out, v);
}

#[test]
fn test_type_round_trip() {
    let v = test_type();
    let bts = marshal(&v);

    assert_eq!(unmarshal::<TestType>(&bts).unwrap(), v);
    assert_eq!(decode::<TestType>(&bts).unwrap(), v);
}

#[test]
fn test_recursive_child_absent() {
    let v = TestType {
        name: "leaf".to_string(),
        f: Some(-1.0),
        child: None,
        ..Default::default()
    };

    let out: TestType = unmarshal(&marshal(&v)).unwrap();
    assert!(out.child.is_none());
    assert_eq!(out, v);
}

#[test]
fn test_recursive_child_present() {
    let mut v = test_type();
    v.child = Some(Box::new(test_type()));

    let out: TestType = unmarshal(&marshal(&v)).unwrap();
    let child = out.child.as_deref().unwrap();
    assert_eq!(child.name, "root");
    assert_eq!(child.child.as_deref().unwrap().name, "child");
    assert_eq!(out, v);
}

#[test]
fn test_map_with_two_entries() {
    let v = TestType {
        els: HashMap::from([
            ("first".to_string(), "1".to_string()),
            ("second".to_string(), "2".to_string()),
        ]),
        ..Default::default()
    };

    let out: TestType = unmarshal(&marshal(&v)).unwrap();
    assert_eq!(out.els.len(), 2);
    assert_eq!(out.els["first"], "1");
    assert_eq!(out.els["second"], "2");
}

#[test]
fn test_newtypes_round_trip() {
    let registry = Registry(HashMap::from([
        ("nyc".to_string(), test_fast()),
        ("empty".to_string(), TestFast::default()),
    ]));
    assert_eq!(unmarshal::<Registry>(&marshal(&registry)).unwrap(), registry);
    assert_eq!(decode::<Registry>(&encode(&registry)).unwrap(), registry);

    let digest = Digest([7; 32]);
    assert_eq!(unmarshal::<Digest>(&marshal(&digest)).unwrap(), digest);

    let sample = Sample(200, None, "s".to_string());
    assert_eq!(unmarshal::<Sample>(&marshal(&sample)).unwrap(), sample);
    let sample = Sample(0, Some(0.5), String::new());
    assert_eq!(decode::<Sample>(&encode(&sample)).unwrap(), sample);

    assert_eq!(unmarshal::<Celsius>(&marshal(&Celsius(21.5))).unwrap(), Celsius(21.5));
}

#[test]
fn test_converted_fields() {
    let v = TestType {
        kind: Kind::Branch,
        owner: UserId::new("u-1"),
        ..Default::default()
    };
    let out: TestType = unmarshal(&marshal(&v)).unwrap();
    assert_eq!(out.kind, Kind::Branch);
    assert_eq!(out.owner.to_string(), "u-1");
}

// =============================================================================
// Wire Layout
// =============================================================================

#[test]
fn test_newtype_is_transparent() {
    let mut expected = Vec::new();
    msgp_rs::append_f32(&mut expected, 21.5);
    assert_eq!(marshal(&Celsius(21.5)), expected);

    let mut expected = Vec::new();
    msgp_rs::append_array_header(&mut expected, 2);
    msgp_rs::append_str(&mut expected, "a").unwrap();
    msgp_rs::append_str(&mut expected, "b").unwrap();
    assert_eq!(marshal(&Tags(vec!["a".to_string(), "b".to_string()])), expected);

    let mut expected = Vec::new();
    msgp_rs::append_bytes(&mut expected, &[1; 32]).unwrap();
    assert_eq!(marshal(&Digest([1; 32])), expected);
}

#[test]
fn test_struct_layout() {
    let mut expected = Vec::new();
    msgp_rs::append_map_header(&mut expected, 4);
    for (key, value) in [("lat", 1.0), ("long", 2.0), ("alt", 3.0)] {
        msgp_rs::append_str(&mut expected, key).unwrap();
        msgp_rs::append_f64(&mut expected, value);
    }
    msgp_rs::append_str(&mut expected, "data").unwrap();
    msgp_rs::append_bytes(&mut expected, b"d").unwrap();

    let v = TestFast {
        lat: 1.0,
        long: 2.0,
        alt: 3.0,
        data: b"d".to_vec(),
    };
    assert_eq!(marshal(&v), expected);
}

#[test]
fn test_tuple_layout() {
    let mut expected = Vec::new();
    msgp_rs::append_array_header(&mut expected, 2);
    msgp_rs::append_f64(&mut expected, 1.5);
    msgp_rs::append_f64(&mut expected, -1.5);
    assert_eq!(marshal(&Position(1.5, -1.5)), expected);
}

#[test]
fn test_empty_struct() {
    assert_eq!(marshal(&Empty {}), vec![0x80]);
    assert_eq!(encode(&Empty {}), vec![0x80]);
    assert_eq!(unmarshal::<Empty>(&[0x80]).unwrap(), Empty {});
}

#[test]
fn test_stream_and_buffer_bytes_match() {
    let v = test_type();
    assert_eq!(marshal(&v), encode(&v));
    assert_eq!(marshal(&test_fast()), encode(&test_fast()));
    assert_eq!(marshal(&Sample(1, Some(2.0), "3".into())), encode(&Sample(1, Some(2.0), "3".into())));
}

#[test]
fn test_msgsize_bounds_encoding() {
    let v = test_type();
    assert!(v.msgsize() >= marshal(&v).len());
    assert!(test_fast().msgsize() >= marshal(&test_fast()).len());
    assert!(Empty {}.msgsize() >= 1);
    assert!(Digest::default().msgsize() >= marshal(&Digest::default()).len());
}

// =============================================================================
// Decode Tolerance
// =============================================================================

#[test]
fn test_unknown_keys_are_skipped() {
    let mut bts = Vec::new();
    msgp_rs::append_map_header(&mut bts, 6);
    msgp_rs::append_str(&mut bts, "data").unwrap();
    msgp_rs::append_bytes(&mut bts, b"xyz").unwrap();
    msgp_rs::append_str(&mut bts, "unknown").unwrap();
    msgp_rs::append_array_header(&mut bts, 2);
    msgp_rs::append_str(&mut bts, "nested").unwrap();
    msgp_rs::append_map_header(&mut bts, 1);
    msgp_rs::append_str(&mut bts, "k").unwrap();
    msgp_rs::append_nil(&mut bts);
    msgp_rs::append_str(&mut bts, "alt").unwrap();
    msgp_rs::append_f64(&mut bts, 3.0);
    msgp_rs::append_str(&mut bts, "lat").unwrap();
    msgp_rs::append_f64(&mut bts, 1.0);
    msgp_rs::append_str(&mut bts, "long").unwrap();
    msgp_rs::append_f64(&mut bts, 2.0);
    msgp_rs::append_str(&mut bts, "another").unwrap();
    msgp_rs::append_i64(&mut bts, -5);

    let expected = TestFast {
        lat: 1.0,
        long: 2.0,
        alt: 3.0,
        data: b"xyz".to_vec(),
    };
    assert_eq!(unmarshal::<TestFast>(&bts).unwrap(), expected);
    assert_eq!(decode::<TestFast>(&bts).unwrap(), expected);
}

#[test]
fn test_missing_keys_keep_previous_values() {
    let mut bts = Vec::new();
    msgp_rs::append_map_header(&mut bts, 1);
    msgp_rs::append_str(&mut bts, "lat").unwrap();
    msgp_rs::append_f64(&mut bts, 9.0);

    let mut v = test_fast();
    v.unmarshal_msg(&bts).unwrap();
    assert_eq!(v.lat, 9.0);
    assert_eq!(v.long, test_fast().long);
    assert_eq!(v.data, test_fast().data);
}

#[test]
fn test_repeated_key_last_wins() {
    let mut bts = Vec::new();
    msgp_rs::append_map_header(&mut bts, 2);
    msgp_rs::append_str(&mut bts, "lat").unwrap();
    msgp_rs::append_f64(&mut bts, 1.0);
    msgp_rs::append_str(&mut bts, "lat").unwrap();
    msgp_rs::append_f64(&mut bts, 2.0);

    assert_eq!(unmarshal::<TestFast>(&bts).unwrap().lat, 2.0);
}

#[test]
fn test_decode_reuses_receiver() {
    let mut v = test_type();
    let bts = marshal(&TestType::default());

    v.unmarshal_msg(&bts).unwrap();
    assert_eq!(v, TestType::default());

    let mut v = test_type();
    let mut dc = Reader::new(bts.as_slice());
    v.decode_msg(&mut dc).unwrap();
    assert_eq!(v, TestType::default());
}

// =============================================================================
// Nil Handling
// =============================================================================

#[test]
fn test_pointer_nilability() {
    let mut v = test_type();
    v.f = None;
    v.slice_ptr = vec![None, Some("x".to_string()), None];
    let out: TestType = unmarshal(&marshal(&v)).unwrap();
    assert_eq!(out.f, None);
    assert_eq!(out.slice_ptr, v.slice_ptr);

    v.f = Some(0.0);
    let out: TestType = unmarshal(&marshal(&v)).unwrap();
    assert_eq!(out.f, Some(0.0));
}

#[test]
fn test_nil_clears_present_value() {
    let mut with_value = Sample(1, Some(5.0), "a".to_string());
    let bts = marshal(&Sample(1, None, "a".to_string()));

    with_value.unmarshal_msg(&bts).unwrap();
    assert_eq!(with_value.1, None);
}

// =============================================================================
// Strictness
// =============================================================================

fn position_with(count: u32) -> Vec<u8> {
    let mut bts = Vec::new();
    msgp_rs::append_array_header(&mut bts, count);
    for i in 0..count {
        msgp_rs::append_f64(&mut bts, f64::from(i));
    }
    bts
}

#[test]
fn test_tuple_rejects_wrong_arity() {
    for count in [0, 1, 3, 4] {
        let bts = position_with(count);
        expect_array_size(unmarshal::<Position>(&bts), 2, count);
        expect_array_size(decode::<Position>(&bts), 2, count);
    }
    assert_eq!(unmarshal::<Position>(&position_with(2)).unwrap(), Position(0.0, 1.0));
}

#[test]
fn test_fixed_bytes_reject_wrong_length() {
    for len in [0usize, 31, 33] {
        let mut bts = Vec::new();
        msgp_rs::append_bytes(&mut bts, &vec![0; len]).unwrap();
        expect_array_size(unmarshal::<Digest>(&bts), 32, len as u32);
        expect_array_size(decode::<Digest>(&bts), 32, len as u32);
    }
}

#[test]
fn test_fixed_array_rejects_wrong_arity() {
    let mut v = TestType::default();
    v.grid = [[1, 2, 3], [4, 5, 6]];
    let bts = marshal(&v);

    // Inner arrays are fixarrays of three positive fixints
    let inner = [0x93, 0x01, 0x02, 0x03];
    let pos = bts
        .windows(inner.len())
        .position(|w| w == inner)
        .unwrap();
    let mut short = bts.clone();
    short[pos] = 0x92;
    short.remove(pos + 3);

    let mut long = bts.clone();
    long[pos] = 0x94;
    long.insert(pos + 4, 0x04);

    expect_array_size(unmarshal::<TestType>(&short), 3, 2);
    expect_array_size(decode::<TestType>(&short), 3, 2);
    expect_array_size(unmarshal::<TestType>(&long), 3, 4);
    expect_array_size(decode::<TestType>(&long), 3, 4);
}

#[test]
fn test_forged_count_without_payload_is_truncated() {
    // array32 and map32 headers claiming 2^28 entries, then nothing
    let array = [0xdd, 0x10, 0x00, 0x00, 0x00];
    let map = [0xdf, 0x10, 0x00, 0x00, 0x00];

    assert!(unmarshal::<Tags>(&array).unwrap_err().is_truncated());
    assert!(decode::<Tags>(&array).unwrap_err().is_truncated());
    assert!(unmarshal::<Registry>(&map).unwrap_err().is_truncated());
    assert!(decode::<Registry>(&map).unwrap_err().is_truncated());

    let mut partial = array.to_vec();
    msgp_rs::append_str(&mut partial, "only").unwrap();
    assert!(decode::<Tags>(&partial).unwrap_err().is_truncated());
}

#[test]
fn test_stream_decode_shrinks_used_slice() {
    let mut v = Tags(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    let bts = marshal(&Tags(vec!["z".to_string()]));

    v.decode_msg(&mut Reader::new(bts.as_slice())).unwrap();
    assert_eq!(v, Tags(vec!["z".to_string()]));
}

#[test]
fn test_wrong_kind_is_reported() {
    let bts = marshal(&Position(1.0, 2.0));
    assert!(matches!(
        unmarshal::<TestFast>(&bts),
        Err(Error::WireType { .. })
    ));
}

#[test]
fn test_extension_type_checked() {
    let mut v = TestType::default();
    v.color = Rgb { r: 1, g: 2, b: 3 };
    let bts = marshal(&v);

    let mut wrong = bts.clone();
    // fixext of three bytes is not defined; Rgb is written as ext8 (0xc7, 3, 7)
    let pos = wrong
        .windows(3)
        .position(|w| w == [0xc7, 0x03, Rgb::EXTENSION_TYPE as u8])
        .unwrap();
    wrong[pos + 2] = 8;

    assert!(matches!(
        unmarshal::<TestType>(&wrong),
        Err(Error::ExtensionType { expected: 7, found: 8 })
    ));
}

// =============================================================================
// Skip And Truncation
// =============================================================================

#[test]
fn test_skip_matches_unmarshal() {
    let mut bts = marshal(&test_type());
    bts.extend_from_slice(&[0xc0, 0x01]);

    let skipped = msgp_rs::skip(&bts).unwrap();
    let mut v = TestType::default();
    let rest = v.unmarshal_msg(&bts).unwrap();

    assert_eq!(skipped, &[0xc0, 0x01]);
    assert_eq!(rest, skipped);
}

#[test]
fn test_leftover_bytes_returned() {
    let mut bts = marshal(&test_fast());
    bts.push(0x2a);

    let (v, rest) = msgp_rs::from_slice::<TestFast>(&bts).unwrap();
    assert_eq!(v, test_fast());
    assert_eq!(rest, &[0x2a]);
}

#[test]
fn test_truncated_input_reports_truncated() {
    let bts = marshal(&test_type());

    for end in 0..bts.len() {
        let prefix = &bts[..end];
        let err = unmarshal::<TestType>(prefix).unwrap_err();
        assert!(err.is_truncated(), "prefix of {} bytes: {:?}", end, err);

        let err = decode::<TestType>(prefix).unwrap_err();
        assert!(err.is_truncated(), "stream prefix of {} bytes: {:?}", end, err);
    }
}
