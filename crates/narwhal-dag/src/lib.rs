//! Directed acyclic graph model used by `narwhal`.
//!
//! A [`Dag`] is an arena of nodes with ordered child links. Parents, roots and components are
//! derived on demand. Cycle removal ([`Dag::decycle`]) reverses links instead of dropping them.

pub mod alg;
pub mod construct;
mod dag;
pub mod decycle;
mod error;
mod traverse;

pub use construct::{Connect, Hierarchy, Stratify};
pub use dag::{Dag, Link, LinkIx, LinkRef, NodeIx, Point, RESERVED_SEPARATOR};
pub use error::{Error, Result};
pub use traverse::Traversal;
