//! # Workflows Module
//!
//! High-level entry points that run a complete thermodynamic calculation.
//!
//! - **Thermodynamics Workflow** ([`thermo`]) - Builds the contributions selected in a
//!   `ThermoConfig`, evaluates probabilities, heat capacity and mean energy over the
//!   configured temperature range, and reports progress along the way.

pub mod thermo;
