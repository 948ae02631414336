//! Paths from the matched value to a sub-position.

use std::fmt;

use smallvec::SmallVec;

use crate::Key;

/// A sequence of [`Key`]s from the root of a match to a sub-value.
///
/// Paths are immutable: [`Path::add`] returns a new path and never shares a
/// mutable suffix with its parent. Typical pattern nesting is shallow, so the
/// keys live inline up to a depth of four.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path(SmallVec<[Key; 4]>);

impl Path {
    /// The path of the matched value itself.
    pub fn root() -> Self {
        Path(SmallVec::new())
    }

    /// Extend this path by one key.
    #[must_use]
    pub fn add(&self, key: Key) -> Self {
        let mut keys = self.0.clone();
        keys.push(key);
        Path(keys)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    /// The path without its last key, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Path(init.iter().cloned().collect()))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for key in &self.0 {
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
