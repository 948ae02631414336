//! Test helpers for exhaustiveness unit testing.
//!
//! Provides `MockTypes`, a small host type system implementing every
//! collaborator trait, so the engine can be tested without a type checker.

#![allow(clippy::arithmetic_side_effects)]

use rustc_hash::FxHashMap;

use crate::ops::{EnumOperations, FieldLookup, SealedClassOperations, TypeOperations};
use crate::pattern::{ConstantValue, ListElement, Pattern};
use crate::{
    compute_witnesses, CheckerConfig, ExhaustivenessCache, Space, SpaceCreator, StaticTypeId,
};

/// A type in the mock type system.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MockType {
    Object,
    Null,
    Never,
    Dynamic,
    Bool,
    Int,
    Double,
    Num,
    String,
    Nullable(Box<MockType>),
    /// A declared class, sealed class or enum.
    Class(String),
    /// Record fields in order; positional ones are named `$1`, `$2`, ...
    Record(Vec<(String, MockType)>),
    List(Box<MockType>),
    Map(Box<MockType>, Box<MockType>),
    Future(Box<MockType>),
    FutureOr(Box<MockType>),
}

impl MockType {
    pub fn class(name: &str) -> Self {
        MockType::Class(name.to_string())
    }

    pub fn nullable(self) -> Self {
        MockType::Nullable(Box::new(self))
    }

    pub fn list(element: MockType) -> Self {
        MockType::List(Box::new(element))
    }

    pub fn map(key: MockType, value: MockType) -> Self {
        MockType::Map(Box::new(key), Box::new(value))
    }

    /// A record type with only positional fields.
    pub fn record(positional: &[MockType]) -> Self {
        MockType::Record(
            positional
                .iter()
                .enumerate()
                .map(|(i, ty)| (format!("${}", i + 1), ty.clone()))
                .collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MockEnumElement {
    pub class: String,
    pub name: String,
}

enum ClassKind {
    Plain,
    Sealed,
    Enum(Vec<String>),
}

struct ClassDecl {
    kind: ClassKind,
    supertypes: Vec<String>,
    fields: Vec<(String, MockType)>,
}

/// Mock host type system.
///
/// Classes are registered with the builder methods and keep their
/// declaration order, which is the order sealed subclasses are reported in.
pub struct MockTypes {
    classes: FxHashMap<String, ClassDecl>,
    order: Vec<String>,
}

impl MockTypes {
    pub fn new() -> Self {
        MockTypes {
            classes: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    fn declare(mut self, name: &str, kind: ClassKind, supertypes: &[&str]) -> Self {
        self.order.push(name.to_string());
        self.classes.insert(
            name.to_string(),
            ClassDecl {
                kind,
                supertypes: supertypes.iter().map(|s| (*s).to_string()).collect(),
                fields: Vec::new(),
            },
        );
        self
    }

    /// Register a plain class.
    pub fn with_class(self, name: &str, supertypes: &[&str]) -> Self {
        self.declare(name, ClassKind::Plain, supertypes)
    }

    /// Register a sealed class.
    pub fn with_sealed(self, name: &str, supertypes: &[&str]) -> Self {
        self.declare(name, ClassKind::Sealed, supertypes)
    }

    /// Register an enum with its constants.
    pub fn with_enum(self, name: &str, values: &[&str]) -> Self {
        let values = values.iter().map(|v| (*v).to_string()).collect();
        self.declare(name, ClassKind::Enum(values), &[])
    }

    /// Declare a field on a registered class.
    pub fn with_field(mut self, class: &str, field: &str, ty: MockType) -> Self {
        if let Some(decl) = self.classes.get_mut(class) {
            decl.fields.push((field.to_string(), ty));
        }
        self
    }

    /// `sealed Shape` with `Circle(radius: double)`, `Square`, `Triangle`.
    pub fn shapes() -> Self {
        MockTypes::new()
            .with_sealed("Shape", &[])
            .with_class("Circle", &["Shape"])
            .with_class("Square", &["Shape"])
            .with_class("Triangle", &["Shape"])
            .with_field("Circle", "radius", MockType::Double)
    }

    fn extends(&self, class: &str, ancestor: &str) -> bool {
        class == ancestor
            || self.classes.get(class).is_some_and(|decl| {
                decl.supertypes
                    .iter()
                    .any(|supertype| self.extends(supertype, ancestor))
            })
    }

    fn class_fields(&self, class: &str) -> Vec<(String, MockType)> {
        let Some(decl) = self.classes.get(class) else {
            return Vec::new();
        };
        let mut fields = decl.fields.clone();
        for supertype in &decl.supertypes {
            for inherited in self.class_fields(supertype) {
                if !fields.iter().any(|(name, _)| *name == inherited.0) {
                    fields.push(inherited);
                }
            }
        }
        fields
    }

    fn kind_of(&self, ty: &MockType) -> Option<&ClassKind> {
        match ty {
            MockType::Class(name) => self.classes.get(name).map(|decl| &decl.kind),
            _ => None,
        }
    }
}

impl TypeOperations for MockTypes {
    type Type = MockType;

    fn nullable_object_type(&self) -> MockType {
        MockType::Object.nullable()
    }

    fn non_nullable_object_type(&self) -> MockType {
        MockType::Object
    }

    fn bool_type(&self) -> MockType {
        MockType::Bool
    }

    fn is_subtype_of(&self, s: &MockType, t: &MockType) -> bool {
        if s == t {
            return true;
        }
        match (s, t) {
            (MockType::Never, _)
            | (_, MockType::Dynamic)
            | (MockType::Int | MockType::Double, MockType::Num) => true,
            (MockType::Dynamic, _) => *t == self.nullable_object_type(),
            (_, MockType::Nullable(inner)) => {
                *s == MockType::Null || self.is_subtype_of(&self.non_nullable(s), inner)
            }
            (MockType::Nullable(_) | MockType::Null, _) => false,
            (MockType::FutureOr(inner), _) => {
                self.is_subtype_of(inner, t)
                    && self.is_subtype_of(&MockType::Future(inner.clone()), t)
            }
            (_, MockType::Object) => !self.is_nullable(s),
            (_, MockType::FutureOr(inner)) => {
                self.is_subtype_of(s, inner)
                    || self.is_subtype_of(s, &MockType::Future(inner.clone()))
            }
            (MockType::Class(a), MockType::Class(b)) => self.extends(a, b),
            (MockType::Record(a), MockType::Record(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((name_a, ty_a), (name_b, ty_b))| {
                        name_a == name_b && self.is_subtype_of(ty_a, ty_b)
                    })
            }
            (MockType::List(a), MockType::List(b)) | (MockType::Future(a), MockType::Future(b)) => {
                self.is_subtype_of(a, b)
            }
            (MockType::Map(k1, v1), MockType::Map(k2, v2)) => {
                self.is_subtype_of(k1, k2) && self.is_subtype_of(v1, v2)
            }
            _ => false,
        }
    }

    fn is_nullable(&self, ty: &MockType) -> bool {
        match ty {
            MockType::Null | MockType::Dynamic | MockType::Nullable(_) => true,
            MockType::FutureOr(inner) => self.is_nullable(inner),
            _ => false,
        }
    }

    fn non_nullable(&self, ty: &MockType) -> MockType {
        match ty {
            MockType::Nullable(inner) => (**inner).clone(),
            MockType::Null => MockType::Never,
            MockType::Dynamic => MockType::Object,
            MockType::FutureOr(inner) => MockType::FutureOr(Box::new(self.non_nullable(inner))),
            other => other.clone(),
        }
    }

    fn is_null_type(&self, ty: &MockType) -> bool {
        *ty == MockType::Null
    }

    fn is_never_type(&self, ty: &MockType) -> bool {
        *ty == MockType::Never
    }

    fn is_dynamic(&self, ty: &MockType) -> bool {
        *ty == MockType::Dynamic
    }

    fn is_bool_type(&self, ty: &MockType) -> bool {
        *ty == MockType::Bool
    }

    fn is_record_type(&self, ty: &MockType) -> bool {
        matches!(ty, MockType::Record(_))
    }

    fn field_types(&self, ty: &MockType) -> Vec<(String, MockType)> {
        match ty {
            MockType::Record(fields) => fields.clone(),
            MockType::Class(name) => self.class_fields(name),
            _ => Vec::new(),
        }
    }

    fn list_element_type(&self, ty: &MockType) -> Option<MockType> {
        match ty {
            MockType::List(element) => Some((**element).clone()),
            _ => None,
        }
    }

    fn list_type(&self, element: &MockType) -> MockType {
        MockType::list(element.clone())
    }

    fn map_key_value_types(&self, ty: &MockType) -> Option<(MockType, MockType)> {
        match ty {
            MockType::Map(key, value) => Some(((**key).clone(), (**value).clone())),
            _ => None,
        }
    }

    fn map_type(&self, key: &MockType, value: &MockType) -> MockType {
        MockType::map(key.clone(), value.clone())
    }

    fn future_or_argument(&self, ty: &MockType) -> Option<MockType> {
        match ty {
            MockType::FutureOr(inner) => Some((**inner).clone()),
            _ => None,
        }
    }

    fn instantiate_future(&self, argument: &MockType) -> MockType {
        MockType::Future(Box::new(argument.clone()))
    }

    fn type_to_string(&self, ty: &MockType) -> String {
        match ty {
            MockType::Object => "Object".to_string(),
            MockType::Null => "Null".to_string(),
            MockType::Never => "Never".to_string(),
            MockType::Dynamic => "dynamic".to_string(),
            MockType::Bool => "bool".to_string(),
            MockType::Int => "int".to_string(),
            MockType::Double => "double".to_string(),
            MockType::Num => "num".to_string(),
            MockType::String => "String".to_string(),
            MockType::Nullable(inner) => format!("{}?", self.type_to_string(inner)),
            MockType::Class(name) => name.clone(),
            MockType::Record(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| {
                        if name.starts_with('$') {
                            self.type_to_string(ty)
                        } else {
                            format!("{name}: {}", self.type_to_string(ty))
                        }
                    })
                    .collect();
                format!("({})", parts.join(", "))
            }
            MockType::List(element) => format!("List<{}>", self.type_to_string(element)),
            MockType::Map(key, value) => format!(
                "Map<{}, {}>",
                self.type_to_string(key),
                self.type_to_string(value)
            ),
            MockType::Future(inner) => format!("Future<{}>", self.type_to_string(inner)),
            MockType::FutureOr(inner) => format!("FutureOr<{}>", self.type_to_string(inner)),
        }
    }
}

impl FieldLookup for MockTypes {
    fn object_field_type(&self, name: &str) -> Option<MockType> {
        match name {
            "hashCode" => Some(MockType::Int),
            "runtimeType" => Some(MockType::Object),
            _ => None,
        }
    }
}

impl EnumOperations for MockTypes {
    type EnumClass = String;
    type EnumElement = MockEnumElement;

    fn enum_class(&self, ty: &MockType) -> Option<String> {
        match (ty, self.kind_of(ty)) {
            (MockType::Class(name), Some(ClassKind::Enum(_))) => Some(name.clone()),
            _ => None,
        }
    }

    fn enum_elements(&self, class: &String) -> Vec<MockEnumElement> {
        match self.classes.get(class).map(|decl| &decl.kind) {
            Some(ClassKind::Enum(values)) => values
                .iter()
                .map(|name| MockEnumElement {
                    class: class.clone(),
                    name: name.clone(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn element_type(&self, element: &MockEnumElement) -> MockType {
        MockType::Class(element.class.clone())
    }

    fn element_name(&self, element: &MockEnumElement) -> String {
        element.name.clone()
    }
}

impl SealedClassOperations for MockTypes {
    type Class = String;

    fn sealed_class(&self, ty: &MockType) -> Option<String> {
        match (ty, self.kind_of(ty)) {
            (MockType::Class(name), Some(ClassKind::Sealed)) => Some(name.clone()),
            _ => None,
        }
    }

    fn direct_subclasses(&self, class: &String) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| {
                self.classes
                    .get(*name)
                    .is_some_and(|decl| decl.supertypes.contains(class))
            })
            .cloned()
            .collect()
    }

    fn subclass_as_instance_of(&self, subclass: &String, _sealed_type: &MockType) -> Option<MockType> {
        Some(MockType::Class(subclass.clone()))
    }
}

// ── Pattern builders ──────────────────────────────────────────────

pub type MockPattern = Pattern<MockType, MockEnumElement>;

pub fn wildcard() -> MockPattern {
    Pattern::wildcard()
}

pub fn typed(ty: MockType) -> MockPattern {
    Pattern::typed(ty)
}

pub fn bool_lit(value: bool) -> MockPattern {
    Pattern::bool(value)
}

pub fn null_lit() -> MockPattern {
    Pattern::null()
}

pub fn int_lit(value: i64) -> MockPattern {
    Pattern::Literal(ConstantValue::Other {
        ty: MockType::Int,
        identity: value.to_string(),
        text: value.to_string(),
    })
}

pub fn enum_lit(class: &str, name: &str) -> MockPattern {
    Pattern::Literal(ConstantValue::Enum(MockEnumElement {
        class: class.to_string(),
        name: name.to_string(),
    }))
}

/// `Class(field: pattern, ...)`
pub fn object(class: &str, fields: Vec<(&str, MockPattern)>) -> MockPattern {
    Pattern::object(
        MockType::class(class),
        fields
            .into_iter()
            .map(|(name, pattern)| (name.to_string(), pattern))
            .collect(),
    )
}

/// A positional record pattern `(p1, p2, ...)` of the given record type.
pub fn record(ty: &MockType, positional: Vec<MockPattern>) -> MockPattern {
    Pattern::object(
        ty.clone(),
        positional
            .into_iter()
            .enumerate()
            .map(|(i, pattern)| (format!("${}", i + 1), pattern))
            .collect(),
    )
}

/// `[p1, p2, ...]` without a type argument.
pub fn list(elements: Vec<ListElement<MockType, MockEnumElement>>) -> MockPattern {
    Pattern::List {
        type_argument: None,
        elements,
    }
}

pub fn element(pattern: MockPattern) -> ListElement<MockType, MockEnumElement> {
    ListElement::Pattern(pattern)
}

/// A bare `...` rest element.
pub fn rest() -> ListElement<MockType, MockEnumElement> {
    ListElement::Rest(None)
}

/// `{key: pattern, ...}` without type arguments.
pub fn map(entries: Vec<(&str, MockPattern)>) -> MockPattern {
    Pattern::Map {
        type_arguments: None,
        entries: entries
            .into_iter()
            .map(|(key, pattern)| (key.to_string(), pattern))
            .collect(),
        has_rest: false,
    }
}

pub fn null_check(pattern: MockPattern) -> MockPattern {
    Pattern::NullCheck(Box::new(pattern))
}

pub fn null_assert(pattern: MockPattern) -> MockPattern {
    Pattern::NullAssert(Box::new(pattern))
}

// ── Checking ──────────────────────────────────────────────────────

/// Build the unguarded case spaces of `cases` against `scrutinee`.
pub fn case_spaces(
    cache: &mut ExhaustivenessCache<'_, MockTypes>,
    scrutinee: StaticTypeId,
    cases: &[MockPattern],
) -> Vec<Space> {
    let mut creator = SpaceCreator::new(cache);
    cases
        .iter()
        .map(|case| creator.create_root_space(scrutinee, case, false))
        .collect()
}

/// The rendered witnesses for a switch over `scrutinee` with `cases` and no
/// default. Empty means exhaustive.
pub fn missing(host: &MockTypes, scrutinee: &MockType, cases: &[MockPattern]) -> Vec<String> {
    let mut cache = ExhaustivenessCache::new(host);
    let ty = cache.create_static_type(scrutinee);
    let spaces = case_spaces(&mut cache, ty, cases);
    compute_witnesses(&mut cache, ty, &spaces, &CheckerConfig::unlimited())
        .iter()
        .map(|witness| cache.format_witness(witness))
        .collect()
}
