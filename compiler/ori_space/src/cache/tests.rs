use super::*;
use crate::test_helpers::{MockEnumElement, MockType, MockTypes};
use pretty_assertions::assert_eq;

fn colors() -> MockTypes {
    MockTypes::new().with_enum("Color", &["red", "green", "blue"])
}

fn element(name: &str) -> MockEnumElement {
    MockEnumElement {
        class: "Color".to_string(),
        name: name.to_string(),
    }
}

// ── Fixed types ───────────────────────────────────────────────

#[test]
fn new_interns_fixed_types() {
    let host = MockTypes::new();
    let cache = ExhaustivenessCache::new(&host);
    assert_eq!(cache.len(), StaticTypeId::FIRST_DYNAMIC as usize);
    assert_eq!(cache.name(StaticTypeId::NULLABLE_OBJECT), "Object?");
    assert_eq!(cache.name(StaticTypeId::OBJECT), "Object");
    assert_eq!(cache.name(StaticTypeId::BOOL), "bool");
    assert_eq!(cache.name(StaticTypeId::TRUE), "true");
    assert_eq!(cache.name(StaticTypeId::FALSE), "false");
}

#[test]
fn fixed_flags() {
    let host = MockTypes::new();
    let cache = ExhaustivenessCache::new(&host);
    assert!(cache.flags(StaticTypeId::NULL).contains(TypeFlags::NULLABLE));
    assert!(cache.flags(StaticTypeId::NULLABLE_OBJECT).contains(TypeFlags::NULLABLE));
    assert!(!cache.flags(StaticTypeId::OBJECT).contains(TypeFlags::NULLABLE));
    assert!(cache.flags(StaticTypeId::UNKNOWN).contains(TypeFlags::UNKNOWN));
    assert!(cache.flags(StaticTypeId::BOOL).contains(TypeFlags::EXPANDABLE));
    assert!(cache.flags(StaticTypeId::TRUE).contains(TypeFlags::RESTRICTED));
}

// ── Checker types ─────────────────────────────────────────────

#[test]
fn special_checker_types_map_to_fixed_ids() {
    let host = MockTypes::new();
    let mut cache = ExhaustivenessCache::new(&host);
    assert_eq!(cache.create_static_type(&MockType::Never), StaticTypeId::NEVER);
    assert_eq!(cache.create_static_type(&MockType::Null), StaticTypeId::NULL);
    assert_eq!(cache.create_static_type(&MockType::Object), StaticTypeId::OBJECT);
    assert_eq!(
        cache.create_static_type(&MockType::Object.nullable()),
        StaticTypeId::NULLABLE_OBJECT
    );
    assert_eq!(
        cache.create_static_type(&MockType::Dynamic),
        StaticTypeId::NULLABLE_OBJECT
    );
    assert_eq!(cache.create_static_type(&MockType::Bool), StaticTypeId::BOOL);
    assert_eq!(cache.len(), StaticTypeId::FIRST_DYNAMIC as usize);
}

#[test]
fn create_static_type_is_memoized() {
    let host = MockTypes::new();
    let mut cache = ExhaustivenessCache::new(&host);
    let int = cache.create_static_type(&MockType::Int);
    let len = cache.len();
    assert_eq!(cache.create_static_type(&MockType::Int), int);
    assert_eq!(cache.len(), len);
    assert_ne!(cache.create_static_type(&MockType::Double), int);
    assert_eq!(cache.checker_type(int), Some(&MockType::Int));
    assert_eq!(cache.name(int), "int");
}

#[test]
fn nullable_types_wrap_their_underlying_type() {
    let host = MockTypes::new();
    let mut cache = ExhaustivenessCache::new(&host);
    let int = cache.create_static_type(&MockType::Int);
    let nullable_int = cache.create_static_type(&MockType::Int.nullable());
    assert_ne!(nullable_int, int);
    assert_eq!(cache.nullable(int), nullable_int);
    assert_eq!(cache.underlying(nullable_int), int);
    assert_eq!(cache.name(nullable_int), "int?");
    assert!(cache.is_nullable(nullable_int));
    assert_eq!(cache.checker_type(nullable_int), None);
}

#[test]
fn list_types_intern_their_element() {
    let host = MockTypes::new();
    let mut cache = ExhaustivenessCache::new(&host);
    let list = cache.create_static_type(&MockType::list(MockType::Int));
    assert!(cache.flags(list).contains(TypeFlags::LIST_LIKE));
    let int = cache.create_static_type(&MockType::Int);
    assert_eq!(cache.list_parts(list), Some((list, int)));
}

// ── Enums ─────────────────────────────────────────────────────

#[test]
fn enum_constants_are_interned_with_their_enum() {
    let host = colors();
    let mut cache = ExhaustivenessCache::new(&host);
    let color = cache.create_static_type(&MockType::class("Color"));
    let red = cache.create_enum_value_type(&element("red"));
    let green = cache.create_enum_value_type(&element("green"));
    assert_ne!(red, green);
    assert_eq!(cache.create_enum_value_type(&element("red")), red);
    assert_eq!(cache.name(red), "Color.red");
    assert_eq!(cache.name(green), "Color.green");
    assert!(cache.is_subtype_of(red, color));
}

#[test]
fn enum_value_before_enum_type() {
    let host = colors();
    let mut cache = ExhaustivenessCache::new(&host);
    let blue = cache.create_enum_value_type(&element("blue"));
    let color = cache.create_static_type(&MockType::class("Color"));
    assert!(cache.is_subtype_of(blue, color));
    assert_eq!(cache.expand(color).len(), 3);
}

// ── Constants and shapes ──────────────────────────────────────

#[test]
fn value_types_are_unique_per_identity() {
    let host = MockTypes::new();
    let mut cache = ExhaustivenessCache::new(&host);
    let int = cache.create_static_type(&MockType::Int);
    let one = cache.create_value_type(int, "1", "1");
    let two = cache.create_value_type(int, "2", "2");
    assert_ne!(one, two);
    assert_eq!(cache.create_value_type(int, "1", "1"), one);
    assert!(cache.flags(one).contains(TypeFlags::RESTRICTED));
}

#[test]
fn bool_constants_reuse_fixed_ids() {
    let host = MockTypes::new();
    let mut cache = ExhaustivenessCache::new(&host);
    assert_eq!(
        cache.create_value_type(StaticTypeId::BOOL, "true", "true"),
        StaticTypeId::TRUE
    );
    assert_eq!(
        cache.create_value_type(StaticTypeId::BOOL, "false", "false"),
        StaticTypeId::FALSE
    );
}

#[test]
fn list_shapes_are_deduplicated() {
    let host = MockTypes::new();
    let mut cache = ExhaustivenessCache::new(&host);
    let list = cache.create_static_type(&MockType::list(MockType::Int));
    let int = cache.create_static_type(&MockType::Int);
    let identity = ListTypeIdentity {
        element: int,
        type_argument_text: None,
        size: 2,
        has_rest: true,
    };
    let shape = cache.create_list_type(list, identity.clone());
    assert_eq!(cache.create_list_type(list, identity), shape);
    assert_eq!(cache.list_shape_like(list, int, 2, true), shape);
    assert_eq!(cache.name(shape), "List<int>[2+]");
    assert_eq!(cache.list_shape_size(shape), Some((2, true)));
    assert_ne!(cache.list_shape_like(list, int, 2, false), shape);
}

#[test]
fn map_shape_keys_are_canonical() {
    let host = MockTypes::new();
    let mut cache = ExhaustivenessCache::new(&host);
    let map = cache.create_static_type(&MockType::map(MockType::String, MockType::Int));
    let identity = |keys: &[&str]| MapTypeIdentity {
        key: StaticTypeId::NULLABLE_OBJECT,
        value: StaticTypeId::NULLABLE_OBJECT,
        type_argument_text: None,
        keys: keys.iter().map(|k| (*k).to_string()).collect(),
        has_rest: false,
    };
    let shuffled = cache.create_map_type(map, identity(&["'b'", "'a'", "'a'"]));
    let sorted = cache.create_map_type(map, identity(&["'a'", "'b'"]));
    assert_eq!(shuffled, sorted);
    assert_eq!(cache.name(sorted), "Map<String, int>{'a', 'b'}");
}

#[test]
fn sealed_subclasses_are_memoized() {
    let host = MockTypes::shapes();
    let mut cache = ExhaustivenessCache::new(&host);
    let subclasses = cache.sealed_subclasses(&"Shape".to_string());
    assert_eq!(subclasses, vec!["Circle", "Square", "Triangle"]);
    assert_eq!(cache.sealed_subclasses(&"Shape".to_string()), subclasses);
}

#[test]
fn unknown_type_is_fixed() {
    let host = MockTypes::new();
    let cache = ExhaustivenessCache::new(&host);
    assert_eq!(cache.create_unknown_static_type(), StaticTypeId::UNKNOWN);
}
