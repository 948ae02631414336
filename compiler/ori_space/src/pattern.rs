//! The patterns the engine understands.
//!
//! A closed sum type over every pattern shape the frontend can produce. The
//! frontend lowers its own AST into [`Pattern`] and hands it to
//! [`SpaceCreator`](crate::SpaceCreator), which is total over the variants.
//!
//! `T` is the checker's type handle and `E` its enum constant handle; use
//! [`HostPattern`] to name the instantiation for a given host.

use crate::ops::{EnumOperations, TypeOperations};

/// A constant in a constant pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue<T, E> {
    Null,
    Bool(bool),
    /// An enum constant (`Color.red`).
    Enum(E),
    /// Any other constant of type `ty`.
    ///
    /// `identity` is the canonical value used for equality: two constant
    /// patterns with the same type and identity match the same value.
    /// `text` is how the constant is shown in witnesses.
    Other { ty: T, identity: String, text: String },
}

/// One element of a list pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum ListElement<T, E> {
    Pattern(Pattern<T, E>),
    /// `...` or `...rest`, with the optional sub-list pattern.
    Rest(Option<Box<Pattern<T, E>>>),
}

/// A pattern, after the frontend has resolved its types.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern<T, E> {
    /// `var x`, `int x`, `_`. A `None` type takes the matched value's type.
    Variable { declared: Option<T> },
    /// `null`, `true`, `Color.red`, `1`, `'a'`.
    Literal(ConstantValue<T, E>),
    /// `Circle(radius: r)` and record patterns `(a, name: b)`.
    ///
    /// Record positional fields use the `$1`, `$2`, ... names.
    Object {
        ty: T,
        fields: Vec<(String, Pattern<T, E>)>,
    },
    /// `[a, b, ...rest, c]`, with `<T>[...]` giving `type_argument`.
    List {
        type_argument: Option<T>,
        elements: Vec<ListElement<T, E>>,
    },
    /// `{'a': x, 'b': y}`. Keys are the canonical texts of the key constants.
    Map {
        type_arguments: Option<(T, T)>,
        entries: Vec<(String, Pattern<T, E>)>,
        has_rest: bool,
    },
    /// `p?`
    NullCheck(Box<Pattern<T, E>>),
    /// `p!`
    NullAssert(Box<Pattern<T, E>>),
    /// `p1 || p2`
    LogicalOr(Box<Pattern<T, E>>, Box<Pattern<T, E>>),
    /// `p1 && p2`
    LogicalAnd(Box<Pattern<T, E>>, Box<Pattern<T, E>>),
    /// `p as T`
    Cast { ty: T, pattern: Box<Pattern<T, E>> },
    /// `< x`, `== x` and friends. Never analyzed.
    Relational,
}

/// The pattern type for a host type system.
pub type HostPattern<H> =
    Pattern<<H as TypeOperations>::Type, <H as EnumOperations>::EnumElement>;

impl<T, E> Pattern<T, E> {
    /// The untyped wildcard `_`.
    pub fn wildcard() -> Self {
        Pattern::Variable { declared: None }
    }

    /// A variable or wildcard with a declared type (`int _`).
    pub fn typed(ty: T) -> Self {
        Pattern::Variable { declared: Some(ty) }
    }

    pub fn null() -> Self {
        Pattern::Literal(ConstantValue::Null)
    }

    pub fn bool(value: bool) -> Self {
        Pattern::Literal(ConstantValue::Bool(value))
    }

    pub fn object(ty: T, fields: Vec<(String, Pattern<T, E>)>) -> Self {
        Pattern::Object { ty, fields }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Pattern::LogicalOr(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Pattern::LogicalAnd(Box::new(self), Box::new(other))
    }
}
