//! # Core Models Module
//!
//! Data structures describing the inputs of a thermodynamic calculation.
//!
//! ## Key Components
//!
//! - [`minimum`] - A single minimum and the validated, energy-shifted `MinimaSet`
//! - [`grid`] - The temperature grid every quantity is evaluated on
//! - [`geometry`] - Atomic geometries, inertia tensors and principal moments
//! - [`element`] - Standard atomic weights
//!
//! ## Usage
//!
//! ```
//! use occuprob::core::models::minimum::{MinimaSet, Minimum};
//!
//! let minima = MinimaSet::new(vec![
//!     Minimum::new(-10.0).with_frequencies(vec![5.0, 7.5]),
//!     Minimum::new(-9.5).with_frequencies(vec![4.0, 8.0]).with_symmetry_order(2),
//! ])
//! .unwrap();
//! assert_eq!(minima.relative_energies(), &[0.0, 0.5]);
//! ```

pub mod element;
pub mod geometry;
pub mod grid;
pub mod minimum;
