use super::element::atomic_mass;
use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

/// Relative threshold below which a principal moment is treated as exactly zero.
const ZERO_MOMENT_THRESHOLD: f64 = 1e-8;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Geometry contains no atoms")]
    Empty,
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
}

/// An atom of a minimum's geometry: element symbol and Cartesian position in Å.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryAtom {
    pub element: String,
    pub position: Point3<f64>,
}

impl GeometryAtom {
    pub fn new(element: &str, position: Point3<f64>) -> Self {
        Self {
            element: element.to_string(),
            position,
        }
    }
}

/// Principal moments (ascending, amu·Å²) and the matching unit axes.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalFrame {
    pub moments: [f64; 3],
    pub axes: [Vector3<f64>; 3],
    pub center_of_mass: Point3<f64>,
}

/// The atomic geometry of a single minimum, with masses resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    atoms: Vec<GeometryAtom>,
    masses: Vec<f64>,
}

impl Geometry {
    /// # Errors
    ///
    /// Returns [`GeometryError`] if `atoms` is empty or contains an element
    /// symbol without a known atomic mass.
    pub fn new(atoms: Vec<GeometryAtom>) -> Result<Self, GeometryError> {
        if atoms.is_empty() {
            return Err(GeometryError::Empty);
        }
        let masses = atoms
            .iter()
            .map(|a| {
                atomic_mass(&a.element).ok_or_else(|| GeometryError::UnknownElement(a.element.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { atoms, masses })
    }

    pub fn atoms(&self) -> &[GeometryAtom] {
        &self.atoms
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn center_of_mass(&self) -> Point3<f64> {
        let total_mass: f64 = self.masses.iter().sum();
        let weighted = self
            .atoms
            .iter()
            .zip(&self.masses)
            .fold(Vector3::zeros(), |acc, (atom, &m)| acc + atom.position.coords * m);
        Point3::from(weighted / total_mass)
    }

    /// Atom positions relative to the center of mass.
    pub fn centered_positions(&self) -> Vec<Vector3<f64>> {
        let com = self.center_of_mass();
        self.atoms.iter().map(|a| a.position - com).collect()
    }

    pub fn inertia_tensor(&self) -> Matrix3<f64> {
        self.centered_positions()
            .iter()
            .zip(&self.masses)
            .fold(Matrix3::zeros(), |acc, (r, &m)| {
                acc + (Matrix3::identity() * r.norm_squared() - r * r.transpose()) * m
            })
    }

    pub fn principal_frame(&self) -> PrincipalFrame {
        let eigen = self.inertia_tensor().symmetric_eigen();
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[a]
                .partial_cmp(&eigen.eigenvalues[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let largest = eigen.eigenvalues.iter().cloned().fold(0.0, f64::max);
        let threshold = ZERO_MOMENT_THRESHOLD * largest.max(1.0);
        let moments = order.map(|i| {
            let value = eigen.eigenvalues[i];
            if value.abs() < threshold { 0.0 } else { value }
        });
        let axes = order.map(|i| eigen.eigenvectors.column(i).into_owned());

        PrincipalFrame {
            moments,
            axes,
            center_of_mass: self.center_of_mass(),
        }
    }

    /// Principal moments of inertia in ascending order (amu·Å²).
    pub fn principal_moments(&self) -> [f64; 3] {
        self.principal_frame().moments
    }

    /// Whether every atom lies within `tolerance` Å of a single line through
    /// the center of mass. Single atoms count as linear.
    pub fn is_linear(&self, tolerance: f64) -> bool {
        if self.atoms.len() <= 2 {
            return true;
        }
        let axis = self.principal_frame().axes[0];
        self.centered_positions()
            .iter()
            .all(|r| (r - axis * r.dot(&axis)).norm() < tolerance)
    }
}
