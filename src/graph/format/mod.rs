//! Sparse-matrix output formats (§6).

pub mod hb;
pub mod mm;
