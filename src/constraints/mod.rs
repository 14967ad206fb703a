//! Hard pairing constraints and swap legality.
//!
//! - [`ConstraintSet`]: disjoint together-groups and symmetric apart-pairs
//! - [`MoveValidator`]: the `breaks_together` / `breaks_apart` predicates
//!   applied to a proposed two-entity swap

mod set;
mod validator;

pub use set::{ConstraintSet, Violation};
pub use validator::{MoveValidator, TogetherRule};
