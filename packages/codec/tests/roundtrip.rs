mod common;

use std::collections::{BTreeMap, HashMap};

use collection_literals::btree;
use serde_json::json;

use common::{Alarm, Color, Level, Pixel, Point, Shape};
use recordmap_codec::{
    CodecConfig, EnumEncoding, MapEncoding, Record, RecordCodec, TypeRef, Value,
};

fn sample_shape() -> Shape {
    Shape {
        name: "kite".to_string(),
        origin: Point { x: 1, y: 2 },
        corners: [Point { x: 0, y: 0 }, Point { x: 5, y: 5 }],
        weights: [0.5, 1.5],
        label: Some("sky".to_string()),
        fill: Some(Color::Blue),
        tags: vec!["red".to_string(), "tail".to_string()],
        path: vec![Point { x: 1, y: 1 }, Point { x: 2, y: 3 }],
        scores: BTreeMap::from([("wind".to_string(), 7), ("height".to_string(), 40)]),
        anchors: HashMap::from([(1, Point { x: 9, y: 9 })]),
        palette: HashMap::from([(Color::Green, true)]),
    }
}

#[test]
fn point_to_record() {
    let codec = RecordCodec::new();
    let record = codec.to_record(&Point { x: 3, y: 4 }).unwrap();
    let expected = Record::from(btree! {
        "X".to_string() => Value::Integer(3),
        "Y".to_string() => Value::Integer(4),
    });
    assert_eq!(record, expected);
}

#[test]
fn point_from_record() {
    let codec = RecordCodec::new();
    let record = Record::from(btree! {
        "X".to_string() => Value::Integer(3),
        "Y".to_string() => Value::Integer(4),
    });
    let point: Point = codec.from_record(&record).unwrap();
    assert_eq!(point, Point { x: 3, y: 4 });
}

#[test]
fn missing_fields_keep_defaults() {
    let codec = RecordCodec::new();
    let point: Point = codec.from_json(json!({ "X": 3 })).unwrap();
    assert_eq!(point, Point { x: 3, y: 0 });
}

#[test]
fn unknown_fields_are_ignored() {
    let codec = RecordCodec::new();
    let point: Point = codec.from_json(json!({ "X": 3, "Z": 9 })).unwrap();
    assert_eq!(point, Point { x: 3, y: 0 });
}

#[test]
fn enum_by_name_and_ordinal() {
    let codec = RecordCodec::new();
    let json = codec.to_json(&Pixel { color: Color::Green }).unwrap();
    assert_eq!(json, json!({ "Color": "Green" }));

    let by_name: Pixel = codec.from_json(json!({ "Color": "Green" })).unwrap();
    let by_ordinal: Pixel = codec.from_json(json!({ "Color": 1 })).unwrap();
    assert_eq!(by_name.color, Color::Green);
    assert_eq!(by_ordinal.color, Color::Green);
}

#[test]
fn enum_ordinal_encoding() {
    let codec = RecordCodec::builder()
        .config(CodecConfig {
            enum_encoding: EnumEncoding::Ordinal,
            ..CodecConfig::default()
        })
        .build();
    let json = codec.to_json(&Pixel { color: Color::Blue }).unwrap();
    assert_eq!(json, json!({ "Color": 2 }));

    // Names are still accepted on read.
    let pixel: Pixel = codec.from_json(json!({ "Color": "Red" })).unwrap();
    assert_eq!(pixel.color, Color::Red);
}

#[test]
fn enum_ordinals_use_discriminants() {
    let codec = RecordCodec::new();
    let alarm: Alarm = codec.from_json(json!({ "Level": 20 })).unwrap();
    assert_eq!(alarm.level, Level::High);

    // Declaration positions are not discriminants.
    let err = codec.from_json::<Alarm>(json!({ "Level": 1 })).unwrap_err();
    assert!(matches!(err, recordmap_codec::Error::Mismatch { .. }));

    let ordinal = RecordCodec::builder()
        .config(CodecConfig {
            enum_encoding: EnumEncoding::Ordinal,
            ..CodecConfig::default()
        })
        .build();
    let json = ordinal.to_json(&Alarm { level: Level::High }).unwrap();
    assert_eq!(json, json!({ "Level": 20 }));
    assert_eq!(ordinal.from_json::<Alarm>(json).unwrap().level, Level::High);
}

#[test]
fn shape_round_trip() {
    let codec = RecordCodec::new();
    let shape = sample_shape();
    let record = codec.to_record(&shape).unwrap();
    let back: Shape = codec.from_record(&record).unwrap();
    assert_eq!(back, shape);
}

#[test]
fn shape_record_layout() {
    let codec = RecordCodec::new();
    let json = codec.to_json(&sample_shape()).unwrap();
    assert_eq!(json["Origin"], json!({ "X": 1, "Y": 2 }));
    assert_eq!(json["Corners"], json!([{ "X": 0, "Y": 0 }, { "X": 5, "Y": 5 }]));
    assert_eq!(json["Weights"], json!([0.5, 1.5]));
    assert_eq!(json["Fill"], json!("Blue"));
    assert_eq!(json["Tags"], json!(["red", "tail"]));
    assert_eq!(json["Scores"], json!([["height", 40], ["wind", 7]]));
    assert_eq!(json["Anchors"], json!([[1, { "X": 9, "Y": 9 }]]));
    assert_eq!(json["Palette"], json!([["Green", true]]));
}

#[test]
fn empty_options_are_omitted_and_null_resets() {
    let codec = RecordCodec::new();
    let shape = Shape {
        label: None,
        fill: None,
        ..sample_shape()
    };
    let record = codec.to_record(&shape).unwrap();
    assert!(!record.contains("Label"));
    assert!(!record.contains("Fill"));

    let mut with_nulls = codec.to_record(&sample_shape()).unwrap();
    with_nulls.insert("Label", Value::Null);
    with_nulls.insert("Fill", Value::Null);
    let back: Shape = codec.from_record(&with_nulls).unwrap();
    assert_eq!(back.label, None);
    assert_eq!(back.fill, None);
}

#[test]
fn null_for_non_nullable_field_is_ignored() {
    let codec = RecordCodec::new();
    let point: Point = codec.from_json(json!({ "X": null, "Y": 4 })).unwrap();
    assert_eq!(point, Point { x: 0, y: 4 });
}

#[test]
fn maps_as_records() {
    let codec = RecordCodec::builder()
        .config(CodecConfig {
            map_encoding: MapEncoding::Record,
            ..CodecConfig::default()
        })
        .build();
    let shape = sample_shape();
    let json = codec.to_json(&shape).unwrap();
    assert_eq!(json["Scores"], json!({ "height": 40, "wind": 7 }));
    assert_eq!(json["Anchors"], json!({ "1": { "X": 9, "Y": 9 } }));
    assert_eq!(json["Palette"], json!({ "Green": true }));

    let back: Shape = codec.from_json(json).unwrap();
    assert_eq!(back, shape);
}

#[test]
fn both_map_encodings_read() {
    let codec = RecordCodec::new();
    let from_pairs: Shape = codec
        .from_json(json!({ "Scores": [["a", 1]], "Palette": [[2, false]] }))
        .unwrap();
    let from_record: Shape = codec
        .from_json(json!({ "Scores": { "a": 1 }, "Palette": { "2": false } }))
        .unwrap();
    assert_eq!(from_pairs.scores, from_record.scores);
    assert_eq!(from_pairs.palette, HashMap::from([(Color::Blue, false)]));
    assert_eq!(from_record.palette, from_pairs.palette);
}

#[test]
fn key_only_pairs_store_defaults() {
    let codec = RecordCodec::new();
    let shape: Shape = codec
        .from_json(json!({
            "Scores": [["a"], ["b", 2]],
            "Anchors": [[3]],
            "Palette": [["Green"]]
        }))
        .unwrap();
    assert_eq!(
        shape.scores,
        BTreeMap::from([("a".to_string(), 0), ("b".to_string(), 2)])
    );
    assert_eq!(shape.anchors, HashMap::from([(3, Point::default())]));
    assert_eq!(shape.palette, HashMap::from([(Color::Green, false)]));

    let err = codec
        .from_json::<Shape>(json!({ "Scores": [[]] }))
        .unwrap_err();
    assert!(matches!(err, recordmap_codec::Error::Mismatch { .. }));
}

#[test]
fn array_length_must_match() {
    let codec = RecordCodec::new();
    let err = codec
        .from_json::<Shape>(json!({ "Weights": [1.0, 2.0, 3.0] }))
        .unwrap_err();
    assert!(err.is_data_error());
}

#[test]
fn converters_are_cached_per_type() {
    let codec = RecordCodec::new();
    codec.to_record(&sample_shape()).unwrap();

    let mut names = common::type_names(&codec.cached_types());
    names.sort();
    let mut expected = vec![
        TypeRef::of::<Shape>().name(),
        TypeRef::of::<Point>().name(),
    ];
    expected.sort();
    assert_eq!(names, expected);

    let view = codec.converters();
    assert_eq!(view.len(), 2);
    assert!(view.peek(&TypeRef::of::<Pixel>()).is_none());
    let shape = view.peek(&TypeRef::of::<Shape>()).unwrap();
    assert_eq!(
        shape.field_names(),
        vec![
            "Name", "Origin", "Corners", "Weights", "Label", "Fill", "Tags", "Path", "Scores",
            "Anchors", "Palette"
        ]
    );
}
