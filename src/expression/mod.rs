//! Expression tree and its evaluation.
//!
//! A tagged `Expression` enum (column reference / constant / function
//! application) is the only node kind operators deal in - there's no dyn
//! dispatch here, the executor switches on `FunctionType` directly. Aggregate
//! state machines live alongside it since they share the same chunk model.

pub mod aggregate;
pub mod executor;
pub mod expression;

pub use aggregate::*;
pub use executor::*;
pub use expression::*;
