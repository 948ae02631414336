//! Contracts the type checker implements for the exhaustiveness engine.
//!
//! The engine never inspects the checker's type representation directly.
//! Everything it needs is asked through these traits, and every answer is
//! memoized by the [`ExhaustivenessCache`](crate::ExhaustivenessCache), so
//! implementations are free to be slow but must be deterministic for the
//! lifetime of one cache.

use std::fmt;
use std::hash::Hash;

/// Structural queries on the checker's types.
pub trait TypeOperations {
    /// The checker's type handle. Equal handles must denote the same type.
    type Type: Clone + Eq + Hash + fmt::Debug;

    /// The nullable top type (`Object?`).
    fn nullable_object_type(&self) -> Self::Type;

    /// The non-nullable top type (`Object`).
    fn non_nullable_object_type(&self) -> Self::Type;

    /// The `bool` type.
    fn bool_type(&self) -> Self::Type;

    /// Whether every value of `s` is a value of `t`.
    fn is_subtype_of(&self, s: &Self::Type, t: &Self::Type) -> bool;

    /// Whether `null` is a value of `ty`.
    fn is_nullable(&self, ty: &Self::Type) -> bool;

    /// `ty` with `null` removed (`T?` becomes `T`).
    fn non_nullable(&self, ty: &Self::Type) -> Self::Type;

    fn is_null_type(&self, ty: &Self::Type) -> bool;

    fn is_never_type(&self, ty: &Self::Type) -> bool;

    /// Whether `ty` is the dynamic type. Dynamic is treated as `Object?`.
    fn is_dynamic(&self, ty: &Self::Type) -> bool;

    fn is_bool_type(&self, ty: &Self::Type) -> bool;

    fn is_record_type(&self, ty: &Self::Type) -> bool;

    /// The declared fields of `ty`, in declaration order.
    ///
    /// For records this is the positional fields (`$1`, `$2`, ...) followed
    /// by the named ones.
    fn field_types(&self, ty: &Self::Type) -> Vec<(String, Self::Type)>;

    /// The element type if `ty` is a list type.
    fn list_element_type(&self, ty: &Self::Type) -> Option<Self::Type>;

    /// The list type with the given element type.
    fn list_type(&self, element: &Self::Type) -> Self::Type;

    /// The key and value types if `ty` is a map type.
    fn map_key_value_types(&self, ty: &Self::Type) -> Option<(Self::Type, Self::Type)>;

    /// The map type with the given key and value types.
    fn map_type(&self, key: &Self::Type, value: &Self::Type) -> Self::Type;

    /// `T` if `ty` is `FutureOr<T>`.
    fn future_or_argument(&self, ty: &Self::Type) -> Option<Self::Type>;

    /// `Future<T>` for the given `T`.
    fn instantiate_future(&self, argument: &Self::Type) -> Self::Type;

    /// Source-level rendering of `ty`, used in witnesses.
    fn type_to_string(&self, ty: &Self::Type) -> String;
}

/// Resolution of named fields (getters) on a type.
pub trait FieldLookup: TypeOperations {
    /// The type of field `name` declared on `ty`.
    ///
    /// The default looks the name up in [`TypeOperations::field_types`].
    fn field_type(&self, ty: &Self::Type, name: &str) -> Option<Self::Type> {
        self.field_types(ty)
            .into_iter()
            .find_map(|(field, field_ty)| (field == name).then_some(field_ty))
    }

    /// The type of a member every value has (`hashCode`, `runtimeType`).
    ///
    /// Used as the fallback when `name` is not declared on the type itself,
    /// and for fields of `null`.
    fn object_field_type(&self, name: &str) -> Option<Self::Type>;
}

/// Enum classes and their constants.
pub trait EnumOperations: TypeOperations {
    type EnumClass: Clone + Eq + Hash + fmt::Debug;
    type EnumElement: Clone + Eq + Hash + fmt::Debug;

    /// The enum class declaring `ty`, if `ty` is an enum type.
    fn enum_class(&self, ty: &Self::Type) -> Option<Self::EnumClass>;

    /// The constants of `class`, in declaration order.
    fn enum_elements(&self, class: &Self::EnumClass) -> Vec<Self::EnumElement>;

    /// The enum type a constant belongs to.
    fn element_type(&self, element: &Self::EnumElement) -> Self::Type;

    /// The constant's declared name (`red` in `Color.red`).
    fn element_name(&self, element: &Self::EnumElement) -> String;
}

/// Sealed class hierarchies.
pub trait SealedClassOperations: TypeOperations {
    type Class: Clone + Eq + Hash + fmt::Debug;

    /// The sealed class declaring `ty`, if `ty` is a sealed type.
    fn sealed_class(&self, ty: &Self::Type) -> Option<Self::Class>;

    /// The direct subclasses of a sealed class, in declaration order.
    fn direct_subclasses(&self, class: &Self::Class) -> Vec<Self::Class>;

    /// `subclass` instantiated as a subtype of `sealed_type`.
    ///
    /// Returns `None` when no instantiation of `subclass` can be a subtype of
    /// `sealed_type` (a generic subclass fixed to other type arguments), in
    /// which case the subclass is not part of the partition.
    fn subclass_as_instance_of(
        &self,
        subclass: &Self::Class,
        sealed_type: &Self::Type,
    ) -> Option<Self::Type>;
}

/// Everything the engine needs from the checker, as one bound.
pub trait ExhaustivenessHost:
    TypeOperations + FieldLookup + EnumOperations + SealedClassOperations
{
}

impl<H> ExhaustivenessHost for H where
    H: TypeOperations + FieldLookup + EnumOperations + SealedClassOperations
{
}
