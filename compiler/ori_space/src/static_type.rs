//! Static types: the lattice nodes coverage is computed over.
//!
//! A static type stands for the set of runtime values a checker type admits.
//! All static types live in the [`ExhaustivenessCache`](crate::ExhaustivenessCache)
//! arena and are referenced by [`StaticTypeId`].
//!
//! # Design (from the Ori type pool)
//!
//! - 32-bit handles, equality is index comparison
//! - The bottom, top, `null` and unknown types have fixed indices
//! - Per-type [`TypeFlags`] are computed once at interning time

use std::fmt;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::ops::ExhaustivenessHost;

/// Handle to a static type in an [`ExhaustivenessCache`](crate::ExhaustivenessCache).
///
/// Two handles from the same cache are equal exactly when they denote the
/// same static type. Handles from different caches must not be mixed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct StaticTypeId(u32);

impl StaticTypeId {
    // === Pre-interned types (indices 0-7) ===

    /// The empty type. Subtype of everything.
    pub const NEVER: Self = Self(0);
    /// The type whose only value is `null`.
    pub const NULL: Self = Self(1);
    /// The nullable top type `Object?`. Supertype of everything.
    pub const NULLABLE_OBJECT: Self = Self(2);
    /// The non-nullable top type `Object`.
    pub const OBJECT: Self = Self(3);
    /// Stand-in for values a pattern cannot describe precisely.
    ///
    /// It covers nothing and is covered by nothing but `Object?`.
    pub const UNKNOWN: Self = Self(4);
    /// The `bool` type.
    pub const BOOL: Self = Self(5);
    /// The singleton type of `true`.
    pub const TRUE: Self = Self(6);
    /// The singleton type of `false`.
    pub const FALSE: Self = Self(7);

    /// First index for types interned on demand.
    pub(crate) const FIRST_DYNAMIC: u32 = 8;

    /// The singleton type of a `bool` constant.
    #[inline]
    pub const fn of_bool(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    #[inline]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StaticTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NEVER => write!(f, "StaticTypeId::NEVER"),
            Self::NULL => write!(f, "StaticTypeId::NULL"),
            Self::NULLABLE_OBJECT => write!(f, "StaticTypeId::NULLABLE_OBJECT"),
            Self::OBJECT => write!(f, "StaticTypeId::OBJECT"),
            Self::UNKNOWN => write!(f, "StaticTypeId::UNKNOWN"),
            Self::BOOL => write!(f, "StaticTypeId::BOOL"),
            Self::TRUE => write!(f, "StaticTypeId::TRUE"),
            Self::FALSE => write!(f, "StaticTypeId::FALSE"),
            Self(raw) => write!(f, "StaticTypeId({raw})"),
        }
    }
}

bitflags! {
    /// Pre-computed properties of a static type.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeFlags: u8 {
        /// `null` is a member.
        const NULLABLE = 1 << 0;
        /// The expansion may contain more than the type itself.
        const EXPANDABLE = 1 << 1;
        /// A single constant value (`true`, `Color.red`, `1`).
        const RESTRICTED = 1 << 2;
        /// A list or map pattern shape.
        const SHAPE = 1 << 3;
        /// A list type or list shape, which coverage may split by length.
        const LIST_LIKE = 1 << 4;
        /// The designated unknown type.
        const UNKNOWN = 1 << 5;
    }
}

/// The family of a non-nullable checker type.
pub(crate) enum TypeFamily<H: ExhaustivenessHost> {
    Bool,
    Enum(H::EnumClass),
    Sealed(H::Class),
    Record,
    List { element: StaticTypeId },
    Map { key: StaticTypeId, value: StaticTypeId },
    FutureOr { argument: H::Type },
    /// Any other class or interface. Atomic for coverage purposes.
    Interface,
}

pub(crate) enum StaticTypeKind<H: ExhaustivenessHost> {
    Never,
    Null,
    Unknown,
    /// `Object?`.
    NullableObject { ty: H::Type },
    /// `Object`.
    Object { ty: H::Type },
    /// A non-nullable checker type.
    Typed { ty: H::Type, family: TypeFamily<H> },
    /// `T?` for a non-nullable `underlying`.
    Nullable { underlying: StaticTypeId },
    /// A single constant of `base`, disjoint from every other constant.
    Value { base: StaticTypeId, text: String },
    /// The lists a list pattern of a given shape matches.
    ListShape {
        base: StaticTypeId,
        identity: ListTypeIdentity,
    },
    /// The maps a map pattern with a given key set matches.
    MapShape {
        base: StaticTypeId,
        identity: MapTypeIdentity,
    },
}

/// One entry in the static type arena.
pub(crate) struct StaticTypeData<H: ExhaustivenessHost> {
    pub(crate) kind: StaticTypeKind<H>,
    pub(crate) flags: TypeFlags,
    /// Display name for diagnostics.
    pub(crate) name: String,
}

/// Structural identity of a list pattern shape.
///
/// Two list patterns with equal identities share one static type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListTypeIdentity {
    pub element: StaticTypeId,
    /// The explicit type argument as written (`<int>[...]`), if any.
    pub type_argument_text: Option<String>,
    /// Number of element subpatterns, excluding the rest element.
    pub size: u32,
    pub has_rest: bool,
}

impl ListTypeIdentity {
    /// Whether every list of shape `self` also has shape `other`.
    pub(crate) fn fits_within(&self, other: &ListTypeIdentity) -> bool {
        if other.has_rest {
            self.size >= other.size
        } else {
            !self.has_rest && self.size == other.size
        }
    }
}

/// Structural identity of a map pattern shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapTypeIdentity {
    pub key: StaticTypeId,
    pub value: StaticTypeId,
    pub type_argument_text: Option<String>,
    /// Canonical texts of the constant keys, sorted and deduplicated.
    pub keys: Vec<String>,
    pub has_rest: bool,
}

impl MapTypeIdentity {
    /// Whether every map of shape `self` also has shape `other`.
    pub(crate) fn fits_within(&self, other: &MapTypeIdentity) -> bool {
        other.keys.iter().all(|key| self.keys.binary_search(key).is_ok())
    }
}

/// The constants of one enum class.
pub(crate) struct EnumInfo<H: ExhaustivenessHost> {
    /// Singleton static types, in declaration order.
    pub(crate) values: Vec<StaticTypeId>,
    pub(crate) by_element: FxHashMap<H::EnumElement, StaticTypeId>,
}

/// The direct subclasses of one sealed class.
pub(crate) struct SealedClassInfo<H: ExhaustivenessHost> {
    pub(crate) subclasses: Vec<H::Class>,
}
