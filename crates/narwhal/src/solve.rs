//! Small builders over the numeric solvers used by the layout stages.
//!
//! Linear and integer programs go through `good_lp` with the pure-Rust `microlp` backend;
//! quadratic programs go through `osqp`. Variables are addressed by dense `usize` indices.

mod lp;
mod qp;

pub(crate) use lp::{LinearProgram, VarKind};
pub(crate) use qp::QuadraticProgram;
