//! # Engine Module
//!
//! The partition-function engine: degree-of-freedom contributions and the
//! superposition model that composes them.
//!
//! ## Architecture
//!
//! - **Contributions** ([`dof`]) - Electronic, rotational and harmonic (classical or
//!   quantum) factors of each minimum's partition function, with their β-derivative moments
//! - **Superposition** ([`superposition`]) - Probabilities, ensemble averages, heat capacity
//!   and mean energy of the whole ensemble
//! - **Configuration** ([`config`]) - Degree-of-freedom selection and temperature range
//! - **Progress Monitoring** ([`progress`]) - Optional observer for workflow stages
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! ## Numerical Contract
//!
//! Every quantity is finite or a genuine limit at `T = 0` and `T = ∞`. Partition
//! functions are reported divided by a factor shared by all minima, which keeps
//! probabilities exact while removing prefactors that vanish or diverge at the
//! ends of the temperature axis.

pub mod config;
pub mod dof;
pub mod error;
pub mod progress;
pub mod superposition;
