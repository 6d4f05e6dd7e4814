#![forbid(unsafe_code)]

//! Layered (Sugiyama) layout for directed acyclic graphs.
//!
//! The pipeline runs in fixed stages, each with interchangeable strategies:
//!
//! 1. [`layering`] assigns every node a layer so links point downward.
//! 2. [`sugi`] materializes the layers, replacing long links with chains of dummy nodes.
//! 3. [`decross`] reorders nodes within layers to reduce crossings.
//! 4. [`coord`] assigns horizontal coordinates.
//!
//! [`Sugiyama`] wires the stages together and writes `x`/`y` onto nodes and polylines onto
//! links of the input [`dag::Dag`].

pub use narwhal_dag as dag;

pub mod coord;
pub mod decross;
pub mod error;
pub mod layering;
mod solve;
pub mod sugi;
mod sugiyama;

pub use coord::Coord;
pub use decross::Decross;
pub use error::{Error, Result};
pub use layering::Layering;
pub use sugi::{Materialize, SugiGraph, SugiKind, SugiNode};
pub use sugiyama::{LayoutInfo, Sugiyama};
