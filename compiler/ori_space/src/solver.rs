//! Coverage search over spaces.
//!
//! # Algorithm
//!
//! A usefulness search over a pattern matrix. Each row is one case (or one
//! covering space), each column one position in the matched value. A value
//! vector describes the values still to be accounted for; a column holds
//! either every value of a static type or the values of a [`Space`].
//!
//! For the first column:
//!
//! 1. Split its type into leaves. The type is expanded unless some row
//!    covers it and no row constrains it with a type that is neither a
//!    supertype nor disjoint. List types are further split by length (see
//!    [`split_by_length`](ExhaustivenessCache::split_by_length)).
//! 2. For each leaf keep the rows whose type covers the leaf, and replace
//!    the column with one column per field key any of them (or the value)
//!    constrains. Rows without a constraint on a key get a wildcard there.
//! 3. Recurse. When no rows are left the remaining values are unmatched and
//!    become a witness.
//!
//! Every step consumes one column and only adds columns for fields of finite
//! nested spaces, so the search terminates. Witness budgets bound the work
//! done on badly non-exhaustive switches.

use std::collections::{BTreeMap, BTreeSet};

use crate::ops::ExhaustivenessHost;
use crate::problem::{CheckResult, PatternProblem};
use crate::stack::ensure_sufficient_stack;
use crate::{CheckerConfig, ExhaustivenessCache, Key, SingleSpace, Space, StaticTypeId, Witness};

/// One cell of a case row.
#[derive(Clone, Copy)]
enum RowCell<'s> {
    /// Matches everything at this position.
    Any,
    Space(&'s Space),
}

/// One column of the values still to cover.
#[derive(Clone, Copy)]
enum ValueCell<'s> {
    /// Every value of the type.
    Type(StaticTypeId),
    Space(&'s Space),
}

/// A row that matched a leaf: its field cells and the rest of the row.
struct Specialized<'s, 'r> {
    /// `None` when the row had a wildcard, which matches every field.
    fields: Option<BTreeMap<Key, &'s Space>>,
    rest: &'r [RowCell<'s>],
}

struct Search<'c, 'h, H: ExhaustivenessHost> {
    cache: &'c mut ExhaustivenessCache<'h, H>,
}

impl<H: ExhaustivenessHost> Search<'_, '_, H> {
    /// Up to `budget` witness vectors, one witness per column, for values in
    /// `values` that no row matches.
    fn unmatched<'s>(
        &mut self,
        rows: &[Vec<RowCell<'s>>],
        values: &[ValueCell<'s>],
        budget: usize,
    ) -> Vec<Vec<Witness>> {
        if budget == 0 {
            return Vec::new();
        }
        if rows.is_empty() {
            return self.inhabitants(values).into_iter().collect();
        }
        let Some((first, rest)) = values.split_first() else {
            // A row with no columns left matches.
            return Vec::new();
        };
        ensure_sufficient_stack(|| self.unmatched_column(rows, *first, rest, budget))
    }

    fn unmatched_column<'s>(
        &mut self,
        rows: &[Vec<RowCell<'s>>],
        first: ValueCell<'s>,
        rest: &[ValueCell<'s>],
        budget: usize,
    ) -> Vec<Vec<Witness>> {
        let alternatives: Vec<(StaticTypeId, Option<&'s SingleSpace>)> = match first {
            ValueCell::Type(ty) => vec![(ty, None)],
            ValueCell::Space(space) => space
                .singles
                .iter()
                .map(|single| (single.ty, Some(single)))
                .collect(),
        };

        // Two singles can reach the same leaf, so duplicates are dropped here
        // rather than after the budget is spent.
        let mut found: Vec<Vec<Witness>> = Vec::new();
        for (ty, value) in alternatives {
            for leaf in self.partition(ty, rows) {
                if found.len() >= budget {
                    return found;
                }
                let remaining = budget - found.len();
                for witnesses in self.unmatched_leaf(rows, leaf, value, rest, remaining) {
                    if !found.contains(&witnesses) {
                        found.push(witnesses);
                    }
                }
            }
        }
        found
    }

    /// The leaves of `ty` the rows' first column distinguishes.
    fn partition(&mut self, ty: StaticTypeId, rows: &[Vec<RowCell<'_>>]) -> Vec<StaticTypeId> {
        let row_types: Vec<StaticTypeId> = rows
            .iter()
            .filter_map(|row| match row.first() {
                Some(RowCell::Space(space)) => Some(*space),
                _ => None,
            })
            .flat_map(|space| space.singles.iter().map(|single| single.ty))
            .collect();

        let has_wildcard = rows
            .iter()
            .any(|row| matches!(row.first(), Some(RowCell::Any)));
        let expansion = self.cache.expand(ty);
        let covered = has_wildcard
            || row_types
                .iter()
                .any(|&row_ty| self.cache.is_subtype_of(ty, row_ty));
        let needs_expansion = expansion.is_empty()
            || !covered
            || row_types.iter().any(|&row_ty| {
                !self.cache.is_subtype_of(ty, row_ty) && !self.cache.is_disjoint(ty, row_ty)
            });
        let leaves = if needs_expansion { expansion } else { vec![ty] };

        // An exact shape of n elements needs lists of n + 1 to be told apart.
        let split = row_types
            .iter()
            .filter_map(|&row_ty| self.cache.list_shape_size(row_ty))
            .map(|(size, has_rest)| if has_rest { size } else { size + 1 })
            .max();
        let Some(n) = split else {
            return leaves;
        };
        leaves
            .into_iter()
            .flat_map(|leaf| self.cache.split_by_length(leaf, n))
            .collect()
    }

    fn unmatched_leaf<'s>(
        &mut self,
        rows: &[Vec<RowCell<'s>>],
        leaf: StaticTypeId,
        value: Option<&'s SingleSpace>,
        rest: &[ValueCell<'s>],
        budget: usize,
    ) -> Vec<Vec<Witness>> {
        let exact_size = self
            .cache
            .list_shape_size(leaf)
            .and_then(|(size, has_rest)| (!has_rest).then_some(size));

        let mut matches: Vec<Specialized<'s, '_>> = Vec::new();
        for row in rows {
            let Some((head, tail)) = row.split_first() else {
                continue;
            };
            match *head {
                RowCell::Any => matches.push(Specialized {
                    fields: None,
                    rest: tail,
                }),
                RowCell::Space(space) => {
                    for single in &space.singles {
                        if single.ty != StaticTypeId::UNKNOWN
                            && self.cache.is_subtype_of(leaf, single.ty)
                        {
                            matches.push(Specialized {
                                fields: Some(field_cells(single, exact_size)),
                                rest: tail,
                            });
                        }
                    }
                }
            }
        }

        let value_fields = value
            .map(|single| field_cells(single, exact_size))
            .unwrap_or_default();
        let keys: Vec<Key> = matches
            .iter()
            .filter_map(|row| row.fields.as_ref())
            .flat_map(BTreeMap::keys)
            .chain(value_fields.keys())
            .cloned()
            .collect::<BTreeSet<Key>>()
            .into_iter()
            .collect();

        let mut sub_values: Vec<ValueCell<'s>> = Vec::with_capacity(keys.len() + rest.len());
        for key in &keys {
            sub_values.push(match value_fields.get(key) {
                Some(&space) => ValueCell::Space(space),
                None => ValueCell::Type(self.cache.get_field(leaf, key)),
            });
        }
        sub_values.extend_from_slice(rest);

        let sub_rows: Vec<Vec<RowCell<'s>>> = matches
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(sub_values.len());
                for key in &keys {
                    let cell = row
                        .fields
                        .as_ref()
                        .and_then(|fields| fields.get(key).copied())
                        .map_or(RowCell::Any, RowCell::Space);
                    cells.push(cell);
                }
                cells.extend_from_slice(row.rest);
                cells
            })
            .collect();

        self.unmatched(&sub_rows, &sub_values, budget)
            .into_iter()
            .map(|mut witnesses| {
                let remaining = witnesses.split_off(keys.len());
                let fields = keys
                    .iter()
                    .cloned()
                    .zip(witnesses)
                    .filter(|(_, witness)| !witness.is_any())
                    .collect();
                let mut row = Vec::with_capacity(remaining.len() + 1);
                row.push(Witness::Value { ty: leaf, fields });
                row.extend(remaining);
                row
            })
            .collect()
    }

    /// One witness per column, or `None` if some column has no values.
    fn inhabitants(&mut self, values: &[ValueCell<'_>]) -> Option<Vec<Witness>> {
        values.iter().map(|cell| self.inhabitant(*cell)).collect()
    }

    fn inhabitant(&mut self, cell: ValueCell<'_>) -> Option<Witness> {
        match cell {
            ValueCell::Type(ty) => {
                (!self.cache.expand(ty).is_empty()).then_some(Witness::Any(ty))
            }
            ValueCell::Space(space) => space
                .singles
                .iter()
                .find_map(|single| self.single_inhabitant(single)),
        }
    }

    fn single_inhabitant(&mut self, single: &SingleSpace) -> Option<Witness> {
        if self.cache.expand(single.ty).is_empty() {
            return None;
        }
        let mut fields = Vec::new();
        for (key, space) in &single.fields {
            let witness = self.inhabitant(ValueCell::Space(space))?;
            if !witness.is_any() {
                fields.push((key.clone(), witness));
            }
        }
        Some(Witness::Value {
            ty: single.ty,
            fields,
        })
    }
}

/// The nested spaces of a single, keyed as seen from `leaf`.
///
/// On a list of known length every element has a head index, so tail keys
/// are rewritten to the head key of the same element.
fn field_cells(single: &SingleSpace, exact_size: Option<u32>) -> BTreeMap<Key, &Space> {
    single
        .fields
        .iter()
        .map(|(key, space)| {
            let key = match (key, exact_size) {
                (Key::ListTail(index), Some(size)) if *index < size => {
                    Key::ListHead(size - 1 - index)
                }
                _ => key.clone(),
            };
            (key, space)
        })
        .collect()
}

fn witnesses_for<H: ExhaustivenessHost>(
    cache: &mut ExhaustivenessCache<'_, H>,
    scrutinee: StaticTypeId,
    cases: &[&Space],
    budget: usize,
) -> Vec<Witness> {
    let covered_outright = cases
        .iter()
        .flat_map(|case| &case.singles)
        .any(|single| single.is_unconstrained() && cache.is_subtype_of(scrutinee, single.ty));
    if covered_outright {
        return Vec::new();
    }

    let rows: Vec<Vec<RowCell<'_>>> = cases.iter().map(|case| vec![RowCell::Space(*case)]).collect();
    // The root always goes through the leaves of the scrutinee, even with no
    // cases, so every missing leaf is named on its own.
    Search { cache }
        .unmatched_column(&rows, ValueCell::Type(scrutinee), &[], budget)
        .into_iter()
        .filter_map(|mut row| row.pop())
        .collect()
}

/// Values of `scrutinee` that none of `cases` match, up to the configured
/// witness limit. Empty when the cases are exhaustive.
#[tracing::instrument(level = "debug", skip_all, fields(scrutinee = ?scrutinee, cases = cases.len()))]
pub fn compute_witnesses<H: ExhaustivenessHost>(
    cache: &mut ExhaustivenessCache<'_, H>,
    scrutinee: StaticTypeId,
    cases: &[Space],
    config: &CheckerConfig,
) -> Vec<Witness> {
    let cases: Vec<&Space> = cases.iter().collect();
    witnesses_for(cache, scrutinee, &cases, config.witness_budget())
}

/// Whether `cases` together match every value of `scrutinee`.
pub fn is_exhaustive<H: ExhaustivenessHost>(
    cache: &mut ExhaustivenessCache<'_, H>,
    scrutinee: StaticTypeId,
    cases: &[Space],
) -> bool {
    let cases: Vec<&Space> = cases.iter().collect();
    witnesses_for(cache, scrutinee, &cases, 1).is_empty()
}

/// Whether every value in `space` is matched by one of `others`.
pub fn is_covered_by<H: ExhaustivenessHost>(
    cache: &mut ExhaustivenessCache<'_, H>,
    space: &Space,
    others: &[&Space],
) -> bool {
    let rows: Vec<Vec<RowCell<'_>>> = others.iter().map(|other| vec![RowCell::Space(*other)]).collect();
    Search { cache }
        .unmatched(&rows, &[ValueCell::Space(space)], 1)
        .is_empty()
}

/// Check one switch: report missing values (unless there is a default) and
/// cases the cases before them already cover.
///
/// `cases` are the case spaces in source order, as built by
/// [`SpaceCreator::create_root_space`](crate::SpaceCreator::create_root_space).
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(scrutinee = ?scrutinee, cases = cases.len(), has_default)
)]
pub fn check_switch<H: ExhaustivenessHost>(
    cache: &mut ExhaustivenessCache<'_, H>,
    scrutinee: StaticTypeId,
    cases: &[Space],
    has_default: bool,
    config: &CheckerConfig,
) -> CheckResult {
    let mut problems = Vec::new();

    if !has_default {
        let witnesses = compute_witnesses(cache, scrutinee, cases, config);
        if !witnesses.is_empty() {
            tracing::debug!(count = witnesses.len(), "switch is not exhaustive");
            problems.push(PatternProblem::NonExhaustive { witnesses });
        }
    }

    if config.report_unreachable {
        let mut earlier: Vec<&Space> = Vec::with_capacity(cases.len());
        for (case_index, case) in cases.iter().enumerate() {
            if is_covered_by(cache, case, &earlier) {
                tracing::debug!(case_index, "case is unreachable");
                problems.push(PatternProblem::UnreachableCase { case_index });
            }
            earlier.push(case);
        }
    }

    CheckResult { problems }
}
