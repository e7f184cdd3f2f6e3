//! # seqarrange smt
//!
//! Incremental satisfiability over linear real arithmetic, sized for the
//! arrangement encoder: a few hundred real variables, disjunctions of linear
//! comparisons, scoped assertions and one-shot assumptions.
//!
//! ## Components
//!
//! - [`LinearExpr`] / [`LinearConstraint`]: exact rational linear terms
//! - [`Formula`]: Boolean structure over atoms and Boolean variables
//! - [`SolverSession`]: the session interface (`push`/`pop`/`check`/model access)
//! - [`LraSession`]: CDCL search with an exact bounded simplex as theory
//!
//! ## Example
//!
//! ```rust
//! use num_rational::BigRational;
//! use seqarrange_core::Budget;
//! use seqarrange_smt::{CheckOutcome, LinearExpr, LraSession, SolverSession};
//!
//! let mut session = LraSession::new();
//! let t = session.declare_real("t");
//! let two = LinearExpr::constant(BigRational::from_integer(2.into()));
//! session.assert(&LinearExpr::var(t).ge(&two).into()).unwrap();
//!
//! assert_eq!(session.check(&[], &Budget::unlimited()), CheckOutcome::Sat);
//! ```

pub mod error;
pub mod formula;
pub mod linear;
mod literal;
pub mod lra;
pub mod session;
mod simplex;

pub use error::SessionError;
pub use formula::Formula;
pub use linear::{BoolVar, LinearConstraint, LinearExpr, RealVar, Relation};
pub use lra::LraSession;
pub use session::{CheckOutcome, SessionStats, SolverSession};
