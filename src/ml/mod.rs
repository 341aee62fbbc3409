//! Model-facing helpers: the estimator contract, a baseline linear model,
//! submission files and grid-search score extraction.

pub mod estimator;
pub mod grid;
pub mod linear;
pub mod submission;
