//! Space-based pattern exhaustiveness for Ori.
//!
//! Decides whether the cases of a switch cover every value of the matched
//! type, and describes the values they miss.
//!
//! # Pipeline
//!
//! ```text
//! Pattern ──SpaceCreator──▶ Space ──solver──▶ CheckResult
//!              │                      │
//!              └──── ExhaustivenessCache (static types) ────┘
//! ```
//!
//! - Static types ([`StaticTypeId`]) are sets of values, arranged in a
//!   lattice by [`ExhaustivenessCache::is_subtype_of`] and split into
//!   disjoint leaves by [`ExhaustivenessCache::expand`].
//! - Spaces ([`Space`]) narrow a static type by constraining its fields.
//! - The solver searches for values of the scrutinee no case space matches
//!   and reports them as [`Witness`]es.
//!
//! The checker's type system is reached only through the traits in [`ops`];
//! one [`ExhaustivenessCache`] per checking session owns every static type.

mod cache;
mod config;
mod creator;
mod key;
mod lattice;
mod path;
mod pattern;
mod problem;
mod solver;
mod space;
mod stack;
mod static_type;
mod witness;

pub mod ops;

#[cfg(test)]
mod test_helpers;

pub use cache::ExhaustivenessCache;
pub use config::{CheckerConfig, ConfigError, REPORT_UNREACHABLE_VAR, WITNESS_LIMIT_VAR};
pub use creator::SpaceCreator;
pub use key::Key;
pub use ops::{
    EnumOperations, ExhaustivenessHost, FieldLookup, SealedClassOperations, TypeOperations,
};
pub use path::Path;
pub use pattern::{ConstantValue, HostPattern, ListElement, Pattern};
pub use problem::{CheckResult, PatternProblem};
pub use solver::{check_switch, compute_witnesses, is_covered_by, is_exhaustive};
pub use space::{SingleSpace, Space};
pub use static_type::{ListTypeIdentity, MapTypeIdentity, StaticTypeId, TypeFlags};
pub use witness::Witness;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debugging.
///
/// Call this at the start of tests or the compiler driver to enable
/// tracing output. Use the `RUST_LOG` environment variable to control
/// output:
///
/// ```bash
/// RUST_LOG=ori_space=debug cargo test
/// RUST_LOG=ori_space::solver=trace cargo test
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

// StaticTypeId is stored in every space and memo key.
#[cfg(target_pointer_width = "64")]
const _: () = assert!(std::mem::size_of::<StaticTypeId>() == 4);
