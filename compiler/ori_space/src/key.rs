//! Keys identifying a sub-position of a matched value.
//!
//! A [`Key`] names one step from a value to one of its parts: a getter or
//! record field, the entry stored under a constant map key, or an element of
//! a list pattern. Keys index the nested spaces of a
//! [`SingleSpace`](crate::SingleSpace), so they compare by value.

use std::fmt;

/// One step from a value to a part of it.
///
/// The derived ordering sorts field keys before map keys before list keys,
/// and list heads by index. Witness rendering relies on that order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    /// A named getter or record field. Positional record fields use the
    /// `$1`, `$2`, ... naming.
    Field(String),
    /// The value stored under a constant key in a map pattern.
    ///
    /// The string is the canonical text of the key constant, so two map
    /// patterns using the same constant address the same entry.
    MapKey(String),
    /// Element `index` counted from the start of a list.
    ListHead(u32),
    /// Element `index` counted from the end of a list (`0` is the last).
    ListTail(u32),
    /// The sub-list left after `head` leading and `tail` trailing elements.
    ListRest { head: u32, tail: u32 },
}

impl Key {
    /// Create a field key.
    pub fn field(name: impl Into<String>) -> Self {
        Key::Field(name.into())
    }

    /// The key of the `index`-th positional record field (zero-based).
    pub fn positional(index: usize) -> Self {
        Key::Field(format!("${}", index + 1))
    }

    /// Whether this key addresses a list element or sub-list.
    #[inline]
    pub fn is_list_key(&self) -> bool {
        matches!(
            self,
            Key::ListHead(_) | Key::ListTail(_) | Key::ListRest { .. }
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Field(name) => write!(f, ".{name}"),
            Key::MapKey(text) => write!(f, "[{text}]"),
            Key::ListHead(index) => write!(f, "[{index}]"),
            Key::ListTail(index) => write!(f, "[-{}]", u64::from(*index) + 1),
            Key::ListRest { head, tail } => write!(f, "[{head}:-{tail}]"),
        }
    }
}
