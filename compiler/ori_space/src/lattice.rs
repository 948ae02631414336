//! Lattice queries over static types.
//!
//! Subtyping, nullability, field lookup and the expansion of a type into a
//! finite partition of disjoint leaves. Everything here is defined on
//! [`ExhaustivenessCache`] because static types are arena handles.
//!
//! # Expansion
//!
//! | Type            | Leaves                                      |
//! |-----------------|---------------------------------------------|
//! | `Never`         | none                                        |
//! | `bool`          | `true`, `false`                             |
//! | enum `E`        | one singleton per constant                  |
//! | sealed `S`      | the leaves of each direct subtype           |
//! | `FutureOr<T>`   | the leaves of `T`, then `Future<T>`         |
//! | `T?`            | the leaves of `T`, then `Null`              |
//! | `Object?`       | `Object`, `Null`                            |
//! | anything else   | itself                                      |
//!
//! Expansions are memoized and fully flattened, so repeated calls return
//! equal partitions.

use crate::cache::Expansion;
use crate::ops::ExhaustivenessHost;
use crate::stack::ensure_sufficient_stack;
use crate::static_type::{StaticTypeKind, TypeFamily, TypeFlags};
use crate::{ExhaustivenessCache, Key, StaticTypeId};

/// What an expansion has to do, copied out of the arena so the cache can be
/// mutated while it runs.
enum ExpansionPlan<H: ExhaustivenessHost> {
    Leaves(Vec<StaticTypeId>),
    Nullable(StaticTypeId),
    Enum(H::EnumClass),
    Sealed { class: H::Class, ty: H::Type },
    FutureOr(H::Type),
}

/// Where the fields of a type come from.
enum FieldSource<H: ExhaustivenessHost> {
    /// Constants have the fields of their type.
    Delegate(StaticTypeId),
    List {
        base: StaticTypeId,
        element: StaticTypeId,
        size: u32,
        has_rest: bool,
        is_shape: bool,
    },
    Map {
        base: StaticTypeId,
        value: StaticTypeId,
        is_shape: bool,
    },
    Declared(H::Type),
    /// Only the members every object has.
    ObjectMembers,
}

impl<H: ExhaustivenessHost> ExhaustivenessCache<'_, H> {
    // ── Nullability ───────────────────────────────────────────────

    /// Whether `null` is a member of `id`.
    #[inline]
    pub fn is_nullable(&self, id: StaticTypeId) -> bool {
        self.flags(id).contains(TypeFlags::NULLABLE)
    }

    /// The nullable form of `id`.
    ///
    /// Wrapping is idempotent and memoized, so
    /// `nullable(underlying(t)) == t` for every nullable `t`.
    pub fn nullable(&mut self, id: StaticTypeId) -> StaticTypeId {
        match self.kind(id) {
            StaticTypeKind::Never | StaticTypeKind::Null => return StaticTypeId::NULL,
            StaticTypeKind::Unknown
            | StaticTypeKind::NullableObject { .. }
            | StaticTypeKind::Nullable { .. } => return id,
            _ => {}
        }
        if self.is_nullable(id) {
            return id;
        }
        if let Some(&wrapped) = self.nullable_of.get(&id) {
            return wrapped;
        }
        let name = format!("{}?", self.name(id));
        let wrapped = self.push_nullable(id, name);
        self.nullable_of.insert(id, wrapped);
        wrapped
    }

    /// The non-nullable type under `id`.
    ///
    /// `T?` gives `T`, `Object?` gives `Object`, `Null` gives `Never`, and a
    /// non-nullable type gives itself.
    pub fn underlying(&self, id: StaticTypeId) -> StaticTypeId {
        match self.kind(id) {
            StaticTypeKind::Nullable { underlying } => *underlying,
            StaticTypeKind::NullableObject { .. } => StaticTypeId::OBJECT,
            StaticTypeKind::Null => StaticTypeId::NEVER,
            _ => id,
        }
    }

    // ── Subtyping ─────────────────────────────────────────────────

    /// Whether every value of `a` is a value of `b`.
    ///
    /// A partial order extending the host's subtyping, with `Never` at the
    /// bottom and `Object?` at the top. The unknown type is the one
    /// exception to reflexivity: it is a subtype only of `Object?`, and
    /// only `Never` is a subtype of it.
    pub fn is_subtype_of(&self, a: StaticTypeId, b: StaticTypeId) -> bool {
        if a == b {
            return a != StaticTypeId::UNKNOWN;
        }
        if a == StaticTypeId::NEVER || b == StaticTypeId::NULLABLE_OBJECT {
            return true;
        }
        if a == StaticTypeId::UNKNOWN || b == StaticTypeId::UNKNOWN || b == StaticTypeId::NEVER {
            return false;
        }

        match (self.kind(a), self.kind(b)) {
            (StaticTypeKind::Null, StaticTypeKind::Nullable { .. }) => true,
            (
                StaticTypeKind::Nullable { underlying: left },
                StaticTypeKind::Nullable { underlying: right },
            ) => self.is_subtype_of(*left, *right),
            (
                StaticTypeKind::Null
                | StaticTypeKind::Nullable { .. }
                | StaticTypeKind::NullableObject { .. },
                _,
            )
            | (_, StaticTypeKind::Null) => false,
            (_, StaticTypeKind::Nullable { underlying }) => self.is_subtype_of(a, *underlying),
            (_, StaticTypeKind::Object { .. }) => true,
            (StaticTypeKind::Value { base, .. }, _) => self.is_subtype_of(*base, b),
            (
                StaticTypeKind::ListShape { identity: left, .. },
                StaticTypeKind::ListShape { identity: right, .. },
            ) => left.fits_within(right) && self.is_subtype_of(left.element, right.element),
            (StaticTypeKind::ListShape { base, .. }, _) => self.is_subtype_of(*base, b),
            // `[...]` matches every list.
            (_, StaticTypeKind::ListShape { base, identity }) => {
                identity.has_rest && identity.size == 0 && self.is_subtype_of(a, *base)
            }
            (
                StaticTypeKind::MapShape { identity: left, .. },
                StaticTypeKind::MapShape { identity: right, .. },
            ) => {
                left.fits_within(right)
                    && self.is_subtype_of(left.key, right.key)
                    && self.is_subtype_of(left.value, right.value)
            }
            (StaticTypeKind::MapShape { base, .. }, _) => self.is_subtype_of(*base, b),
            // A map pattern without entries matches every map.
            (_, StaticTypeKind::MapShape { base, identity }) => {
                identity.keys.is_empty() && self.is_subtype_of(a, *base)
            }
            (
                StaticTypeKind::Typed { ty: left, .. } | StaticTypeKind::Object { ty: left },
                StaticTypeKind::Typed { ty: right, .. },
            ) => self.host.is_subtype_of(left, right),
            _ => false,
        }
    }

    /// Whether `a` and `b` share no leaf, as far as the lattice can tell.
    ///
    /// Two types are disjoint when no leaf of one is a subtype or supertype
    /// of a leaf of the other. The unknown type is never disjoint from
    /// anything.
    pub fn is_disjoint(&mut self, a: StaticTypeId, b: StaticTypeId) -> bool {
        if a == StaticTypeId::UNKNOWN || b == StaticTypeId::UNKNOWN {
            return false;
        }
        // Constants are interned, so two distinct non-null constants never meet.
        let constant = |flags: TypeFlags| {
            flags.contains(TypeFlags::RESTRICTED) && !flags.contains(TypeFlags::NULLABLE)
        };
        if a != b && constant(self.flags(a)) && constant(self.flags(b)) {
            return true;
        }
        let left = self.expand(a);
        let right = self.expand(b);
        !left.iter().any(|&x| {
            right
                .iter()
                .any(|&y| self.is_subtype_of(x, y) || self.is_subtype_of(y, x))
        })
    }

    // ── Expansion ─────────────────────────────────────────────────

    /// The disjoint leaves whose union is `id`.
    ///
    /// An empty result means `id` is uninhabited (an enum without
    /// constants, a sealed class without subclasses, `Never`).
    pub fn expand(&mut self, id: StaticTypeId) -> Vec<StaticTypeId> {
        if id == StaticTypeId::NEVER {
            return Vec::new();
        }
        if !self.flags(id).contains(TypeFlags::EXPANDABLE) {
            return vec![id];
        }
        match self.expansions.get(&id) {
            Some(Expansion::Done(leaves)) => return leaves.clone(),
            Some(Expansion::InProgress) => {
                tracing::trace!(?id, "re-entrant expansion treated as atomic");
                return vec![id];
            }
            None => {}
        }

        self.expansions.insert(id, Expansion::InProgress);
        let leaves = ensure_sufficient_stack(|| self.compute_expansion(id));
        tracing::trace!(?id, count = leaves.len(), "expanded static type");
        self.expansions.insert(id, Expansion::Done(leaves.clone()));
        leaves
    }

    fn compute_expansion(&mut self, id: StaticTypeId) -> Vec<StaticTypeId> {
        let plan: ExpansionPlan<H> = match self.kind(id) {
            StaticTypeKind::NullableObject { .. } => {
                ExpansionPlan::Leaves(vec![StaticTypeId::OBJECT, StaticTypeId::NULL])
            }
            StaticTypeKind::Nullable { underlying } => ExpansionPlan::Nullable(*underlying),
            StaticTypeKind::Typed { ty, family } => match family {
                TypeFamily::Bool => {
                    ExpansionPlan::Leaves(vec![StaticTypeId::TRUE, StaticTypeId::FALSE])
                }
                TypeFamily::Enum(class) => ExpansionPlan::Enum(class.clone()),
                TypeFamily::Sealed(class) => ExpansionPlan::Sealed {
                    class: class.clone(),
                    ty: ty.clone(),
                },
                TypeFamily::FutureOr { argument } => ExpansionPlan::FutureOr(argument.clone()),
                TypeFamily::Record
                | TypeFamily::List { .. }
                | TypeFamily::Map { .. }
                | TypeFamily::Interface => ExpansionPlan::Leaves(vec![id]),
            },
            _ => ExpansionPlan::Leaves(vec![id]),
        };

        let mut leaves = Vec::new();
        match plan {
            ExpansionPlan::Leaves(ids) => leaves = ids,
            ExpansionPlan::Nullable(underlying) => {
                leaves.extend(self.expand(underlying));
                leaves.push(StaticTypeId::NULL);
            }
            ExpansionPlan::Enum(class) => leaves = self.enum_values(&class),
            ExpansionPlan::Sealed { class, ty } => {
                let host = self.host;
                for subclass in self.sealed_subclasses(&class) {
                    let Some(subtype) = host.subclass_as_instance_of(&subclass, &ty) else {
                        continue;
                    };
                    let sub_id = self.create_static_type(&subtype);
                    leaves.extend(self.expand(sub_id));
                }
            }
            ExpansionPlan::FutureOr(argument) => {
                let host = self.host;
                let value = self.create_static_type(&argument);
                leaves.extend(self.expand(value));
                let future = self.create_static_type(&host.instantiate_future(&argument));
                leaves.extend(self.expand(future));
            }
        }

        let mut seen = rustc_hash::FxHashSet::default();
        leaves.retain(|leaf| seen.insert(*leaf));
        leaves
    }

    /// Split a list leaf by length around the largest fixed size `n` among
    /// the list patterns under test.
    ///
    /// An open list (a list type, or a shape with a rest element and fewer
    /// than `n` fixed elements) becomes one exact shape per length below `n`
    /// plus one open shape of `n` elements. Anything else is returned as is.
    pub(crate) fn split_by_length(&mut self, leaf: StaticTypeId, n: u32) -> Vec<StaticTypeId> {
        if !self.flags(leaf).contains(TypeFlags::LIST_LIKE) {
            return vec![leaf];
        }
        let (base, element, min, open) = match self.kind(leaf) {
            StaticTypeKind::Typed {
                family: TypeFamily::List { element },
                ..
            } => (leaf, *element, 0, true),
            StaticTypeKind::ListShape { base, identity } => {
                (*base, identity.element, identity.size, identity.has_rest)
            }
            _ => return vec![leaf],
        };
        if !open || n <= min {
            return vec![leaf];
        }
        let mut parts: Vec<StaticTypeId> = (min..n)
            .map(|size| self.list_shape_like(base, element, size, false))
            .collect();
        parts.push(self.list_shape_like(base, element, n, true));
        parts
    }

    /// The fixed element count and openness of a list shape.
    pub(crate) fn list_shape_size(&self, id: StaticTypeId) -> Option<(u32, bool)> {
        if !self.flags(id).contains(TypeFlags::SHAPE | TypeFlags::LIST_LIKE) {
            return None;
        }
        match self.kind(id) {
            StaticTypeKind::ListShape { identity, .. } => Some((identity.size, identity.has_rest)),
            _ => None,
        }
    }

    /// The list type and element type behind a list type or shape.
    pub(crate) fn list_parts(&self, id: StaticTypeId) -> Option<(StaticTypeId, StaticTypeId)> {
        match self.kind(id) {
            StaticTypeKind::Typed {
                family: TypeFamily::List { element },
                ..
            } => Some((id, *element)),
            StaticTypeKind::ListShape { base, identity } => Some((*base, identity.element)),
            StaticTypeKind::Nullable { underlying } => self.list_parts(*underlying),
            _ => None,
        }
    }

    /// The map type, key type and value type behind a map type or shape.
    pub(crate) fn map_parts(
        &self,
        id: StaticTypeId,
    ) -> Option<(StaticTypeId, StaticTypeId, StaticTypeId)> {
        match self.kind(id) {
            StaticTypeKind::Typed {
                family: TypeFamily::Map { key, value },
                ..
            } => Some((id, *key, *value)),
            StaticTypeKind::MapShape { base, identity } => {
                Some((*base, identity.key, identity.value))
            }
            StaticTypeKind::Nullable { underlying } => self.map_parts(*underlying),
            _ => None,
        }
    }

    // ── Fields ────────────────────────────────────────────────────

    /// The static type of the part of `id` addressed by `key`.
    ///
    /// Named fields resolve through [`FieldLookup`](crate::FieldLookup),
    /// falling back to the members every object has. A key with no meaning
    /// on `id` resolves to `Object?`.
    pub fn get_field(&mut self, id: StaticTypeId, key: &Key) -> StaticTypeId {
        if let Some(&field) = self.fields.get(&(id, key.clone())) {
            return field;
        }
        let field = self.compute_field(id, key);
        self.fields.insert((id, key.clone()), field);
        field
    }

    fn compute_field(&mut self, id: StaticTypeId, key: &Key) -> StaticTypeId {
        let source: FieldSource<H> = match self.kind(id) {
            StaticTypeKind::Value { base, .. } => FieldSource::Delegate(*base),
            StaticTypeKind::ListShape { base, identity } => FieldSource::List {
                base: *base,
                element: identity.element,
                size: identity.size,
                has_rest: identity.has_rest,
                is_shape: true,
            },
            StaticTypeKind::MapShape { base, identity } => FieldSource::Map {
                base: *base,
                value: identity.value,
                is_shape: true,
            },
            StaticTypeKind::Typed {
                family: TypeFamily::List { element },
                ..
            } => FieldSource::List {
                base: id,
                element: *element,
                size: 0,
                has_rest: true,
                is_shape: false,
            },
            StaticTypeKind::Typed {
                family: TypeFamily::Map { value, .. },
                ..
            } => FieldSource::Map {
                base: id,
                value: *value,
                is_shape: false,
            },
            StaticTypeKind::Typed { ty, .. } | StaticTypeKind::Object { ty } => {
                FieldSource::Declared(ty.clone())
            }
            _ => FieldSource::ObjectMembers,
        };

        match (source, key) {
            (FieldSource::Delegate(base), _)
            | (
                FieldSource::List {
                    base,
                    is_shape: true,
                    ..
                }
                | FieldSource::Map {
                    base,
                    is_shape: true,
                    ..
                },
                Key::Field(_),
            ) => self.get_field(base, key),
            (FieldSource::List { element, .. }, Key::ListHead(_) | Key::ListTail(_)) => element,
            (
                FieldSource::List {
                    base,
                    element,
                    size,
                    has_rest,
                    is_shape,
                },
                Key::ListRest { head, tail },
            ) => {
                if is_shape {
                    let remaining = size.saturating_sub(head.saturating_add(*tail));
                    self.list_shape_like(base, element, remaining, has_rest)
                } else {
                    base
                }
            }
            (FieldSource::Map { value, .. }, Key::MapKey(_)) => value,
            (FieldSource::Declared(ty), Key::Field(name)) => {
                let declared = self.host.field_type(&ty, name);
                self.resolve_field(declared, name)
            }
            (_, Key::Field(name)) => self.resolve_field(None, name),
            (_, _) => {
                tracing::debug!(?id, %key, "key does not apply to type; using Object?");
                StaticTypeId::NULLABLE_OBJECT
            }
        }
    }

    fn resolve_field(&mut self, declared: Option<H::Type>, name: &str) -> StaticTypeId {
        let host = self.host;
        if let Some(ty) = declared.or_else(|| host.object_field_type(name)) {
            return self.create_static_type(&ty);
        }
        tracing::debug!(%name, "unresolved field; using Object?");
        StaticTypeId::NULLABLE_OBJECT
    }
}
