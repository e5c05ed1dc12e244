//! # Core Module
//!
//! The stateless foundation of OccuProb: physical constants and edge-safe
//! scalar transforms, the validated input models, symmetry analysis of atomic
//! geometries, and the I/O boundary.
//!
//! ## Architecture
//!
//! - **Numerics** ([`numeric`]) - `NumericCore`, masked exponents and the
//!   hyperbolic helpers shared by every partition-function contribution
//! - **Input Models** ([`models`]) - Minima, temperature grids, geometries and element masses
//! - **Symmetry** ([`symmetry`]) - Rotational symmetry numbers from atomic geometries
//! - **File I/O** ([`io`]) - Provider, analyzer and sink traits plus their file-based implementations
//! - **Errors** ([`error`]) - Domain errors raised while validating inputs

pub mod error;
pub mod io;
pub mod models;
pub mod numeric;
pub mod symmetry;
