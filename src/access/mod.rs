//! Role-based access control
//!
//! The pipeline has two halves. At startup, [`baker::bake`] compiles
//! author-supplied role definitions into immutable [`BakedRole`]s, dropping
//! anything invalid with a diagnostic. At request time, [`AccessEngine`]
//! resolves the caller through the configured user store, merges the grants
//! of every matching role into an [`AuthenticatedUser`], and answers
//! `is_allowed(identity, system, resource, verb)` queries.
//!
//! Degradation is always toward denial: a dropped role grants nothing, an
//! unresolvable identity is a denial, and an identity matching no role is
//! authenticated but authorized for nothing.

pub mod baker;
pub mod engine;
pub mod pattern;
pub mod types;

pub use baker::bake;
pub use engine::AccessEngine;
pub use pattern::Pattern;
pub use types::{AuthenticatedUser, BakedRole, BakedRule, System, Verb};
