//! The session-scoped owner of every static type.
//!
//! [`ExhaustivenessCache`] is created at the start of one exhaustiveness run
//! (one switch, or one compilation unit on one worker) and dropped at its end.
//! It is the uniqueness authority for static types: asking twice for the same
//! checker type, constant, or pattern shape returns the same [`StaticTypeId`].
//!
//! Population is purely additive. There is no invalidation; a new session
//! creates a new cache.

use rustc_hash::FxHashMap;

use crate::ops::ExhaustivenessHost;
use crate::static_type::{
    EnumInfo, ListTypeIdentity, MapTypeIdentity, SealedClassInfo, StaticTypeData,
    StaticTypeKind, TypeFamily, TypeFlags,
};
use crate::{Key, StaticTypeId};

/// Memoized expansion state of one static type.
pub(crate) enum Expansion {
    /// Being computed further up the stack. A re-entrant request treats the
    /// type as atomic instead of recursing again.
    InProgress,
    Done(Vec<StaticTypeId>),
}

/// Arena and memo tables for one exhaustiveness-checking session.
pub struct ExhaustivenessCache<'h, H: ExhaustivenessHost> {
    pub(crate) host: &'h H,
    types: Vec<StaticTypeData<H>>,
    /// Checker type to static type.
    by_type: FxHashMap<H::Type, StaticTypeId>,
    /// Non-nullable static type to its nullable wrapper.
    pub(crate) nullable_of: FxHashMap<StaticTypeId, StaticTypeId>,
    enum_infos: FxHashMap<H::EnumClass, EnumInfo<H>>,
    sealed_infos: FxHashMap<H::Class, SealedClassInfo<H>>,
    /// `(base, identity)` of a constant to its singleton type.
    values: FxHashMap<(StaticTypeId, String), StaticTypeId>,
    lists: FxHashMap<(StaticTypeId, ListTypeIdentity), StaticTypeId>,
    maps: FxHashMap<(StaticTypeId, MapTypeIdentity), StaticTypeId>,
    pub(crate) expansions: FxHashMap<StaticTypeId, Expansion>,
    pub(crate) fields: FxHashMap<(StaticTypeId, Key), StaticTypeId>,
}

impl<'h, H: ExhaustivenessHost> ExhaustivenessCache<'h, H> {
    /// Start a session over the given host type system.
    ///
    /// Interns the fixed types (`Never`, `Null`, `Object?`, `Object`, the
    /// unknown type, `bool`, `true`, `false`) at their reserved indices.
    pub fn new(host: &'h H) -> Self {
        let mut cache = ExhaustivenessCache {
            host,
            types: Vec::with_capacity(64),
            by_type: FxHashMap::default(),
            nullable_of: FxHashMap::default(),
            enum_infos: FxHashMap::default(),
            sealed_infos: FxHashMap::default(),
            values: FxHashMap::default(),
            lists: FxHashMap::default(),
            maps: FxHashMap::default(),
            expansions: FxHashMap::default(),
            fields: FxHashMap::default(),
        };

        let nullable_object = host.nullable_object_type();
        let object = host.non_nullable_object_type();
        let bool_ty = host.bool_type();

        cache.push(StaticTypeKind::Never, TypeFlags::empty(), "Never".to_string());
        cache.push(StaticTypeKind::Null, TypeFlags::NULLABLE, "Null".to_string());
        cache.push(
            StaticTypeKind::NullableObject {
                ty: nullable_object.clone(),
            },
            TypeFlags::NULLABLE | TypeFlags::EXPANDABLE,
            host.type_to_string(&nullable_object),
        );
        cache.push(
            StaticTypeKind::Object { ty: object.clone() },
            TypeFlags::empty(),
            host.type_to_string(&object),
        );
        cache.push(
            StaticTypeKind::Unknown,
            TypeFlags::UNKNOWN,
            "<unknown>".to_string(),
        );
        cache.push(
            StaticTypeKind::Typed {
                ty: bool_ty.clone(),
                family: TypeFamily::Bool,
            },
            TypeFlags::EXPANDABLE,
            host.type_to_string(&bool_ty),
        );
        for (value, text) in [(true, "true"), (false, "false")] {
            let id = cache.push(
                StaticTypeKind::Value {
                    base: StaticTypeId::BOOL,
                    text: text.to_string(),
                },
                TypeFlags::RESTRICTED,
                text.to_string(),
            );
            debug_assert_eq!(id, StaticTypeId::of_bool(value));
            cache.values.insert((StaticTypeId::BOOL, text.to_string()), id);
        }
        debug_assert_eq!(cache.types.len(), StaticTypeId::FIRST_DYNAMIC as usize);

        cache.by_type.insert(nullable_object, StaticTypeId::NULLABLE_OBJECT);
        cache.by_type.insert(object, StaticTypeId::OBJECT);
        cache.by_type.insert(bool_ty, StaticTypeId::BOOL);
        cache
            .nullable_of
            .insert(StaticTypeId::OBJECT, StaticTypeId::NULLABLE_OBJECT);
        cache
    }

    /// The host type system this session queries.
    #[inline]
    pub fn host(&self) -> &'h H {
        self.host
    }

    /// Number of interned static types.
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[inline]
    pub(crate) fn data(&self, id: StaticTypeId) -> &StaticTypeData<H> {
        &self.types[id.index()]
    }

    #[inline]
    pub(crate) fn kind(&self, id: StaticTypeId) -> &StaticTypeKind<H> {
        &self.data(id).kind
    }

    #[inline]
    pub fn flags(&self, id: StaticTypeId) -> TypeFlags {
        self.data(id).flags
    }

    /// Display name of a static type.
    pub fn name(&self, id: StaticTypeId) -> &str {
        &self.data(id).name
    }

    /// The checker type behind `id`, if it wraps one directly.
    pub fn checker_type(&self, id: StaticTypeId) -> Option<&H::Type> {
        match self.kind(id) {
            StaticTypeKind::NullableObject { ty }
            | StaticTypeKind::Object { ty }
            | StaticTypeKind::Typed { ty, .. } => Some(ty),
            _ => None,
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "a session interns far fewer than u32::MAX static types"
    )]
    fn push(&mut self, kind: StaticTypeKind<H>, flags: TypeFlags, name: String) -> StaticTypeId {
        let id = StaticTypeId::from_raw(self.types.len() as u32);
        tracing::trace!(?id, %name, "interned static type");
        self.types.push(StaticTypeData { kind, flags, name });
        id
    }

    /// Intern the `T?` wrapper of a non-nullable `underlying`.
    pub(crate) fn push_nullable(&mut self, underlying: StaticTypeId, name: String) -> StaticTypeId {
        self.push(
            StaticTypeKind::Nullable { underlying },
            TypeFlags::NULLABLE | TypeFlags::EXPANDABLE,
            name,
        )
    }

    // ── Construction ──────────────────────────────────────────────

    /// The canonical static type for a checker type.
    pub fn create_static_type(&mut self, ty: &H::Type) -> StaticTypeId {
        if let Some(&id) = self.by_type.get(ty) {
            return id;
        }
        let host = self.host;
        let id = if host.is_never_type(ty) {
            StaticTypeId::NEVER
        } else if host.is_null_type(ty) {
            StaticTypeId::NULL
        } else if host.is_dynamic(ty) {
            StaticTypeId::NULLABLE_OBJECT
        } else if host.is_nullable(ty) {
            let underlying = self.create_static_type(&host.non_nullable(ty));
            self.nullable(underlying)
        } else {
            self.create_non_nullable(ty)
        };
        self.by_type.insert(ty.clone(), id);
        id
    }

    fn create_non_nullable(&mut self, ty: &H::Type) -> StaticTypeId {
        let host = self.host;
        if host.is_bool_type(ty) {
            return StaticTypeId::BOOL;
        }
        let name = host.type_to_string(ty);

        if let Some(class) = host.enum_class(ty) {
            let id = self.push(
                StaticTypeKind::Typed {
                    ty: ty.clone(),
                    family: TypeFamily::Enum(class.clone()),
                },
                TypeFlags::EXPANDABLE,
                name.clone(),
            );
            // The enum type must exist before its constants, which point at it.
            self.by_type.insert(ty.clone(), id);
            self.ensure_enum_info(&class, id, &name);
            return id;
        }

        let (family, flags) = if let Some(class) = host.sealed_class(ty) {
            (TypeFamily::Sealed(class), TypeFlags::EXPANDABLE)
        } else if host.is_record_type(ty) {
            (TypeFamily::Record, TypeFlags::empty())
        } else if let Some(element) = host.list_element_type(ty) {
            let element = self.create_static_type(&element);
            (TypeFamily::List { element }, TypeFlags::LIST_LIKE)
        } else if let Some((key, value)) = host.map_key_value_types(ty) {
            let key = self.create_static_type(&key);
            let value = self.create_static_type(&value);
            (TypeFamily::Map { key, value }, TypeFlags::empty())
        } else if let Some(argument) = host.future_or_argument(ty) {
            (TypeFamily::FutureOr { argument }, TypeFlags::EXPANDABLE)
        } else {
            (TypeFamily::Interface, TypeFlags::empty())
        };

        self.push(
            StaticTypeKind::Typed {
                ty: ty.clone(),
                family,
            },
            flags,
            name,
        )
    }

    fn ensure_enum_info(&mut self, class: &H::EnumClass, enum_id: StaticTypeId, enum_name: &str) {
        if self.enum_infos.contains_key(class) {
            return;
        }
        let host = self.host;
        let elements = host.enum_elements(class);
        let mut values = Vec::with_capacity(elements.len());
        let mut by_element = FxHashMap::default();
        for element in elements {
            let text = format!("{enum_name}.{}", host.element_name(&element));
            let id = self.push(
                StaticTypeKind::Value {
                    base: enum_id,
                    text: text.clone(),
                },
                TypeFlags::RESTRICTED,
                text,
            );
            values.push(id);
            by_element.insert(element, id);
        }
        tracing::trace!(?class, count = values.len(), "collected enum constants");
        self.enum_infos
            .insert(class.clone(), EnumInfo { values, by_element });
    }

    /// The singleton types of an enum type's constants, in declaration order.
    pub(crate) fn enum_values(&self, class: &H::EnumClass) -> Vec<StaticTypeId> {
        self.enum_infos
            .get(class)
            .map(|info| info.values.clone())
            .unwrap_or_default()
    }

    /// The direct subclasses of a sealed class, memoized per class.
    pub(crate) fn sealed_subclasses(&mut self, class: &H::Class) -> Vec<H::Class> {
        if let Some(info) = self.sealed_infos.get(class) {
            return info.subclasses.clone();
        }
        let subclasses = self.host.direct_subclasses(class);
        tracing::trace!(?class, count = subclasses.len(), "collected sealed subclasses");
        self.sealed_infos.insert(
            class.clone(),
            SealedClassInfo {
                subclasses: subclasses.clone(),
            },
        );
        subclasses
    }

    /// The static type standing for values no pattern information describes.
    #[inline]
    pub fn create_unknown_static_type(&self) -> StaticTypeId {
        StaticTypeId::UNKNOWN
    }

    /// The singleton type of an enum constant.
    pub fn create_enum_value_type(&mut self, element: &H::EnumElement) -> StaticTypeId {
        let enum_ty = self.host.element_type(element);
        let enum_id = self.create_static_type(&enum_ty);
        let found = self
            .host
            .enum_class(&enum_ty)
            .and_then(|class| self.enum_infos.get(&class))
            .and_then(|info| info.by_element.get(element).copied());
        if let Some(id) = found {
            return id;
        }
        // The host disagrees with itself about the element's enum.
        // Fall back to a plain constant of that type.
        let text = format!("{}.{}", self.name(enum_id), self.host.element_name(element));
        self.create_value_type(enum_id, &text, &text)
    }

    /// The unique static type of one constant pattern.
    ///
    /// Constants with different identities are disjoint even when they share
    /// a type, so `case 1:` and `case 2:` never cover each other.
    pub fn create_value_type(
        &mut self,
        base: StaticTypeId,
        identity: &str,
        text: &str,
    ) -> StaticTypeId {
        if base == StaticTypeId::BOOL {
            match identity {
                "true" => return StaticTypeId::TRUE,
                "false" => return StaticTypeId::FALSE,
                _ => {}
            }
        }
        let key = (base, identity.to_string());
        if let Some(&id) = self.values.get(&key) {
            return id;
        }
        let mut flags = TypeFlags::RESTRICTED;
        if self.flags(base).contains(TypeFlags::NULLABLE) {
            flags |= TypeFlags::NULLABLE;
        }
        let id = self.push(
            StaticTypeKind::Value {
                base,
                text: text.to_string(),
            },
            flags,
            text.to_string(),
        );
        self.values.insert(key, id);
        id
    }

    /// The static type of a list pattern shape over the list type `base`.
    pub fn create_list_type(&mut self, base: StaticTypeId, identity: ListTypeIdentity) -> StaticTypeId {
        let key = (base, identity);
        if let Some(&id) = self.lists.get(&key) {
            return id;
        }
        let identity = &key.1;
        let name = format!(
            "{}[{}{}]",
            self.name(base),
            identity.size,
            if identity.has_rest { "+" } else { "" }
        );
        let id = self.push(
            StaticTypeKind::ListShape {
                base,
                identity: identity.clone(),
            },
            TypeFlags::SHAPE | TypeFlags::LIST_LIKE,
            name,
        );
        self.lists.insert(key, id);
        id
    }

    /// The static type of a map pattern shape over the map type `base`.
    pub fn create_map_type(&mut self, base: StaticTypeId, mut identity: MapTypeIdentity) -> StaticTypeId {
        identity.keys.sort();
        identity.keys.dedup();
        let key = (base, identity);
        if let Some(&id) = self.maps.get(&key) {
            return id;
        }
        let identity = &key.1;
        let name = format!("{}{{{}}}", self.name(base), identity.keys.join(", "));
        let id = self.push(
            StaticTypeKind::MapShape {
                base,
                identity: identity.clone(),
            },
            TypeFlags::SHAPE,
            name,
        );
        self.maps.insert(key, id);
        id
    }

    /// An untyped-argument list shape of `size` elements, open-ended when
    /// `has_rest`. Used when coverage splits a list type by length.
    pub(crate) fn list_shape_like(
        &mut self,
        base: StaticTypeId,
        element: StaticTypeId,
        size: u32,
        has_rest: bool,
    ) -> StaticTypeId {
        self.create_list_type(
            base,
            ListTypeIdentity {
                element,
                type_argument_text: None,
                size,
                has_rest,
            },
        )
    }
}

#[cfg(test)]
mod tests;
