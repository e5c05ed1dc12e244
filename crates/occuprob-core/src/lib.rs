//! # OccuProb Core Library
//!
//! Equilibrium thermodynamics of an ensemble of potential-energy minima in the
//! superposition approximation: occupation probabilities, ensemble averages and
//! heat capacity over a temperature grid.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Minimum`, `MinimaSet`,
//!   `TemperatureGrid`, `Geometry`), the `NumericCore` that fixes every formula's
//!   behavior at T = 0 and T = ∞, symmetry analysis, and I/O adapters.
//!
//! - **[`engine`]: The Logic Core.** Degree-of-freedom contributions to the
//!   partition function and the `SuperpositionModel` that combines them per
//!   minimum and across minima.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into a
//!   complete calculation driven by a `ThermoConfig`.

pub mod core;
pub mod engine;
pub mod workflows;
