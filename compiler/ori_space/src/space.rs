//! Spaces: the sets of values patterns match.
//!
//! A [`Space`] is a union of [`SingleSpace`]s at one [`Path`]. Each single
//! space is a static type narrowed by nested spaces on some of its fields,
//! so `Circle(radius: 1) || Square()` becomes two singles, the first with a
//! nested space at `.radius`.

use std::collections::BTreeMap;

use crate::ops::ExhaustivenessHost;
use crate::solver;
use crate::{ExhaustivenessCache, Key, Path, StaticTypeId};

/// One disjunct of a [`Space`]: the values of `ty` whose fields also lie in
/// the nested spaces.
///
/// An empty field map means every value of `ty`.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleSpace {
    pub ty: StaticTypeId,
    pub fields: BTreeMap<Key, Space>,
}

impl SingleSpace {
    pub fn new(ty: StaticTypeId) -> Self {
        SingleSpace {
            ty,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_fields(ty: StaticTypeId, fields: BTreeMap<Key, Space>) -> Self {
        SingleSpace { ty, fields }
    }

    /// Whether no field is constrained.
    #[inline]
    pub fn is_unconstrained(&self) -> bool {
        self.fields.is_empty()
    }

    fn intersect<H: ExhaustivenessHost>(
        &self,
        other: &SingleSpace,
        cache: &mut ExhaustivenessCache<'_, H>,
    ) -> Option<SingleSpace> {
        if self.ty == StaticTypeId::UNKNOWN || other.ty == StaticTypeId::UNKNOWN {
            return Some(SingleSpace::new(StaticTypeId::UNKNOWN));
        }
        // Only comparable types intersect. Incomparable pairs are dropped even
        // when they share values, which can only under-approximate coverage.
        let ty = if cache.is_subtype_of(self.ty, other.ty) {
            self.ty
        } else if cache.is_subtype_of(other.ty, self.ty) {
            other.ty
        } else {
            return None;
        };

        let mut fields = self.fields.clone();
        for (key, theirs) in &other.fields {
            let merged = match fields.get(key) {
                Some(ours) => ours.intersect(theirs, cache),
                None => theirs.clone(),
            };
            if merged.is_empty() {
                return None;
            }
            fields.insert(key.clone(), merged);
        }
        Some(SingleSpace { ty, fields })
    }
}

/// The set of values matched at one [`Path`], as a union of single spaces.
///
/// Order is kept for diagnostics; it carries no meaning for coverage. A
/// space without singles is empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Space {
    pub path: Path,
    pub singles: Vec<SingleSpace>,
}

impl Space {
    /// The empty set.
    pub fn empty(path: Path) -> Self {
        Space {
            path,
            singles: Vec::new(),
        }
    }

    /// Every value of `ty`.
    pub fn single(path: Path, ty: StaticTypeId) -> Self {
        Space::from_single(path, SingleSpace::new(ty))
    }

    pub fn from_single(path: Path, single: SingleSpace) -> Self {
        Space {
            path,
            singles: vec![single],
        }
    }

    /// The space of a pattern the engine cannot analyze.
    ///
    /// It covers no other space and is covered by nothing short of an
    /// unconstrained `Object?`.
    pub fn unknown(path: Path) -> Self {
        Space::single(path, StaticTypeId::UNKNOWN)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.singles.is_empty()
    }

    /// Whether any single is the unknown type.
    pub fn contains_unknown(&self) -> bool {
        self.singles
            .iter()
            .any(|single| single.ty == StaticTypeId::UNKNOWN)
    }

    /// Whether this space is every value of `ty` and nothing narrower.
    pub(crate) fn is_unconstrained_for<H: ExhaustivenessHost>(
        &self,
        ty: StaticTypeId,
        cache: &ExhaustivenessCache<'_, H>,
    ) -> bool {
        self.singles
            .iter()
            .any(|single| single.is_unconstrained() && cache.is_subtype_of(ty, single.ty))
    }

    /// The union of both spaces, dropping singles already present.
    #[must_use]
    pub fn union(&self, other: &Space) -> Space {
        let mut singles = self.singles.clone();
        for single in &other.singles {
            if !singles.contains(single) {
                singles.push(single.clone());
            }
        }
        Space {
            path: self.path.clone(),
            singles,
        }
    }

    /// The union of both spaces, dropping every single covered by one kept
    /// before it.
    #[must_use]
    pub fn union_with<H: ExhaustivenessHost>(
        &self,
        other: &Space,
        cache: &mut ExhaustivenessCache<'_, H>,
    ) -> Space {
        let mut kept: Vec<SingleSpace> = Vec::with_capacity(self.singles.len() + other.singles.len());
        for single in self.singles.iter().chain(&other.singles) {
            let candidate = Space::from_single(self.path.clone(), single.clone());
            let covered = kept.iter().any(|earlier| {
                let earlier = Space::from_single(self.path.clone(), earlier.clone());
                solver::is_covered_by(cache, &candidate, &[&earlier])
            });
            if !covered {
                kept.push(single.clone());
            }
        }
        Space {
            path: self.path.clone(),
            singles: kept,
        }
    }

    /// The values both spaces match, approximately.
    ///
    /// Pairs of singles keep the narrower type when one type is a subtype of
    /// the other and are dropped otherwise. Shared fields intersect
    /// recursively; a field constrained on one side only keeps that side's
    /// space. Anything intersected with the unknown type is unknown.
    #[must_use]
    pub fn intersect<H: ExhaustivenessHost>(
        &self,
        other: &Space,
        cache: &mut ExhaustivenessCache<'_, H>,
    ) -> Space {
        let mut singles = Vec::new();
        for ours in &self.singles {
            for theirs in &other.singles {
                if let Some(single) = ours.intersect(theirs, cache) {
                    if !singles.contains(&single) {
                        singles.push(single);
                    }
                }
            }
        }
        Space {
            path: self.path.clone(),
            singles,
        }
    }

    /// Whether every value in this space is also in `other`.
    pub fn is_subspace_of<H: ExhaustivenessHost>(
        &self,
        other: &Space,
        cache: &mut ExhaustivenessCache<'_, H>,
    ) -> bool {
        solver::is_covered_by(cache, self, &[other])
    }
}
