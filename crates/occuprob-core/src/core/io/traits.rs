use crate::core::models::geometry::Geometry;
use crate::core::models::grid::TemperatureGrid;
use crate::core::models::minimum::MinimaSet;
use crate::core::symmetry::SymmetryError;
use nalgebra::{DMatrix, DVector};
use std::error::Error;

/// Supplies the static properties of every minimum in an ensemble.
///
/// Implementors handle a specific source (files, databases, in-memory fixtures);
/// the thermodynamic engine only ever sees the validated [`MinimaSet`].
pub trait StructureProvider {
    /// The error type for loading operations.
    type Error: Error;

    /// Loads and validates the minima.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or a property is invalid.
    fn load_minima(&self) -> Result<MinimaSet, Self::Error>;
}

/// Determines the order of the rotational subgroup of a geometry's point group.
pub trait SymmetryAnalyzer {
    /// # Errors
    ///
    /// Returns [`SymmetryError`] if the order cannot be determined.
    fn symmetry_order(&self, geometry: &Geometry) -> Result<u32, SymmetryError>;
}

/// Consumes computed results for persistence or display.
pub trait ResultSink {
    /// The error type for write operations.
    type Error: Error;

    /// Receives the occupation probability matrix (minima × temperatures).
    fn write_probability(
        &mut self,
        grid: &TemperatureGrid,
        probability: &DMatrix<f64>,
    ) -> Result<(), Self::Error>;

    /// Receives the heat capacity (in units of k_B) at every temperature.
    fn write_heat_capacity(
        &mut self,
        grid: &TemperatureGrid,
        heat_capacity: &DVector<f64>,
    ) -> Result<(), Self::Error>;
}
