//! Findings of a switch check.

use crate::ops::ExhaustivenessHost;
use crate::{ExhaustivenessCache, Witness};

/// A coverage problem in one switch.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternProblem {
    /// Some values reach no case.
    NonExhaustive { witnesses: Vec<Witness> },
    /// The cases before this one already match everything it matches.
    UnreachableCase { case_index: usize },
}

/// Result of checking one switch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub problems: Vec<PatternProblem>,
}

impl CheckResult {
    /// Whether every value reaches some case.
    pub fn is_exhaustive(&self) -> bool {
        !self
            .problems
            .iter()
            .any(|problem| matches!(problem, PatternProblem::NonExhaustive { .. }))
    }

    /// The witnesses of the non-exhaustiveness problem, if any.
    pub fn witnesses(&self) -> &[Witness] {
        self.problems
            .iter()
            .find_map(|problem| match problem {
                PatternProblem::NonExhaustive { witnesses } => Some(witnesses.as_slice()),
                PatternProblem::UnreachableCase { .. } => None,
            })
            .unwrap_or_default()
    }

    /// Indices of the unreachable cases, ascending.
    pub fn unreachable_cases(&self) -> impl Iterator<Item = usize> + '_ {
        self.problems.iter().filter_map(|problem| match problem {
            PatternProblem::UnreachableCase { case_index } => Some(*case_index),
            PatternProblem::NonExhaustive { .. } => None,
        })
    }

    /// One message per problem, with witnesses rendered as patterns.
    pub fn describe<H: ExhaustivenessHost>(&self, cache: &ExhaustivenessCache<'_, H>) -> Vec<String> {
        self.problems
            .iter()
            .map(|problem| match problem {
                PatternProblem::NonExhaustive { witnesses } => {
                    let missing: Vec<String> = witnesses
                        .iter()
                        .map(|witness| cache.format_witness(witness))
                        .collect();
                    format!("non-exhaustive switch: missing {}", missing.join(", "))
                }
                PatternProblem::UnreachableCase { case_index } => {
                    format!("case {case_index} is covered by the cases before it")
                }
            })
            .collect()
    }
}
