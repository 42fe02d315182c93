//! Reflected models shared by the integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use recordmap_codec::{EnumInfo, ObjectInfo, Reflect, TypeInfo, TypeKind, TypeRef};

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Reflect for Point {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Struct(
            ObjectInfo::builder::<Point>()
                .field("X", |p| &p.x, |p, v| p.x = v)
                .field("Y", |p| &p.y, |p, v| p.y = v)
                .build(),
        ))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    #[default]
    Red,
    Green,
    Blue,
}

impl Reflect for Color {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Enum(EnumInfo::new(
            &[
                ("Red", Color::Red),
                ("Green", Color::Green),
                ("Blue", Color::Blue),
            ],
            |c| *c as i64,
        )))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pixel {
    pub color: Color,
}

impl Reflect for Pixel {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Struct(
            ObjectInfo::builder::<Pixel>()
                .field("Color", |p| &p.color, |p, v| p.color = v)
                .build(),
        ))
    }
}

/// Explicit discriminants that differ from declaration positions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    #[default]
    Low = 10,
    High = 20,
}

impl Reflect for Level {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Enum(EnumInfo::new(
            &[("Low", Level::Low), ("High", Level::High)],
            |l| *l as i64,
        )))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Alarm {
    pub level: Level,
}

impl Reflect for Alarm {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Struct(
            ObjectInfo::builder::<Alarm>()
                .field("Level", |a| &a.level, |a, v| a.level = v)
                .build(),
        ))
    }
}

/// A bit of everything: nested objects, nullable values, collections.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Shape {
    pub name: String,
    pub origin: Point,
    pub corners: [Point; 2],
    pub weights: [f64; 2],
    pub label: Option<String>,
    pub fill: Option<Color>,
    pub tags: Vec<String>,
    pub path: Vec<Point>,
    pub scores: BTreeMap<String, u32>,
    pub anchors: HashMap<u8, Point>,
    pub palette: HashMap<Color, bool>,
}

impl Reflect for Shape {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Struct(
            ObjectInfo::builder::<Shape>()
                .field("Name", |s| &s.name, |s, v| s.name = v)
                .field("Origin", |s| &s.origin, |s, v| s.origin = v)
                .field("Corners", |s| &s.corners, |s, v| s.corners = v)
                .field("Weights", |s| &s.weights, |s, v| s.weights = v)
                .field("Label", |s| &s.label, |s, v| s.label = v)
                .field("Fill", |s| &s.fill, |s, v| s.fill = v)
                .field("Tags", |s| &s.tags, |s, v| s.tags = v)
                .field("Path", |s| &s.path, |s, v| s.path = v)
                .field("Scores", |s| &s.scores, |s, v| s.scores = v)
                .field("Anchors", |s| &s.anchors, |s, v| s.anchors = v)
                .field("Palette", |s| &s.palette, |s, v| s.palette = v)
                .build(),
        ))
    }
}

/// Singly linked, self-referential.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Node {
    pub value: i64,
    pub next: Option<Box<Node>>,
}

impl Reflect for Node {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Struct(
            ObjectInfo::builder::<Node>()
                .field("Value", |n| &n.value, |n, v| n.value = v)
                .field("Next", |n| &n.next, |n, v| n.next = v)
                .build(),
        ))
    }
}

/// `Author` and `Book` refer to each other.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Author {
    pub name: String,
    pub books: Vec<Book>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Book {
    pub title: String,
    pub author: Option<Box<Author>>,
}

impl Reflect for Author {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Struct(
            ObjectInfo::builder::<Author>()
                .field("Name", |a| &a.name, |a, v| a.name = v)
                .field("Books", |a| &a.books, |a, v| a.books = v)
                .build(),
        ))
    }
}

impl Reflect for Book {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Struct(
            ObjectInfo::builder::<Book>()
                .field("Title", |b| &b.title, |b, v| b.title = v)
                .field("Author", |b| &b.author, |b, v| b.author = v)
                .build(),
        ))
    }
}

/// A map keyed by objects cannot be represented.
#[derive(Debug, Default)]
pub struct Atlas {
    pub by_point: HashMap<Point, String>,
}

impl Reflect for Atlas {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Struct(
            ObjectInfo::builder::<Atlas>()
                .field("ByPoint", |a| &a.by_point, |a, v| a.by_point = v)
                .build(),
        ))
    }
}

/// Holds an `Atlas`, so building it fails one level down.
#[derive(Debug, Default)]
pub struct World {
    pub origin: Point,
    pub atlas: Atlas,
}

impl Reflect for World {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Struct(
            ObjectInfo::builder::<World>()
                .field("Origin", |w| &w.origin, |w, v| w.origin = v)
                .field("Atlas", |w| &w.atlas, |w, v| w.atlas = v)
                .build(),
        ))
    }
}

pub fn type_names(types: &[TypeRef]) -> Vec<&'static str> {
    types.iter().map(|t| t.name()).collect()
}
