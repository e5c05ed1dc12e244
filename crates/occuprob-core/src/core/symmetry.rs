use crate::core::io::traits::SymmetryAnalyzer;
use crate::core::models::geometry::{Geometry, GeometryError};
use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use std::f64::consts::TAU;
use thiserror::Error;
use tracing::trace;

const DEFAULT_TOLERANCE: f64 = 0.05;
const DEFAULT_MAX_AXIS_ORDER: u32 = 8;
/// Order of the icosahedral rotation group, the largest finite one.
const MAX_GROUP_ORDER: usize = 60;
const AXIS_PARALLEL_THRESHOLD: f64 = 1e-6;
const ROTATION_MATCH_THRESHOLD: f64 = 1e-3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SymmetryError {
    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Rotation group exceeds 60 elements; the tolerance is probably too loose")]
    GroupTooLarge,
}

/// Counts the proper rotations that map a geometry onto itself.
///
/// Candidate axes are the principal axes, the directions of atoms and of
/// midpoints between equivalent atoms, and normals of atom pairs. Rotations found
/// about these axes are then closed under composition, which recovers axes that
/// pass through none of the candidates (e.g. the C₃ axes of an octahedron).
/// Linear geometries have order 2 when centrosymmetric and 1 otherwise; single
/// atoms have order 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationalSymmetry {
    tolerance: f64,
    max_axis_order: u32,
}

impl Default for RotationalSymmetry {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_axis_order: DEFAULT_MAX_AXIS_ORDER,
        }
    }
}

impl RotationalSymmetry {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn maps_onto_itself(
        &self,
        geometry: &Geometry,
        positions: &[Vector3<f64>],
        operation: &Matrix3<f64>,
    ) -> bool {
        let masses = geometry.masses();
        positions.iter().enumerate().all(|(i, r)| {
            let image = operation * r;
            positions
                .iter()
                .enumerate()
                .any(|(j, s)| masses[i] == masses[j] && (image - s).norm() < self.tolerance)
        })
    }

    fn candidate_axes(&self, geometry: &Geometry, positions: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        let masses = geometry.masses();
        let mut raw: Vec<Vector3<f64>> = geometry.principal_frame().axes.to_vec();
        raw.extend(positions.iter().copied());
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                if masses[i] == masses[j] {
                    raw.push((positions[i] + positions[j]) * 0.5);
                }
                raw.push(positions[i].cross(&positions[j]));
            }
        }

        let mut axes: Vec<Vector3<f64>> = Vec::new();
        for candidate in raw {
            let norm = candidate.norm();
            if norm < self.tolerance {
                continue;
            }
            let axis = candidate / norm;
            let duplicate = axes
                .iter()
                .any(|a| a.dot(&axis).abs() > 1.0 - AXIS_PARALLEL_THRESHOLD);
            if !duplicate {
                axes.push(axis);
            }
        }
        axes
    }
}

fn push_unique(rotations: &mut Vec<Matrix3<f64>>, rotation: Matrix3<f64>) -> bool {
    if rotations
        .iter()
        .any(|r| (r - rotation).norm() < ROTATION_MATCH_THRESHOLD)
    {
        return false;
    }
    rotations.push(rotation);
    true
}

impl SymmetryAnalyzer for RotationalSymmetry {
    fn symmetry_order(&self, geometry: &Geometry) -> Result<u32, SymmetryError> {
        if geometry.len() == 1 {
            return Ok(1);
        }
        let positions = geometry.centered_positions();

        if geometry.is_linear(self.tolerance) {
            let inversion = -Matrix3::<f64>::identity();
            let centrosymmetric = self.maps_onto_itself(geometry, &positions, &inversion);
            return Ok(if centrosymmetric { 2 } else { 1 });
        }

        let mut rotations = vec![Matrix3::identity()];
        for axis in self.candidate_axes(geometry, &positions) {
            let unit = Unit::new_normalize(axis);
            for n in 2..=self.max_axis_order {
                let step = Rotation3::from_axis_angle(&unit, TAU / n as f64).into_inner();
                if !self.maps_onto_itself(geometry, &positions, &step) {
                    continue;
                }
                let mut power = step;
                for _ in 1..n {
                    push_unique(&mut rotations, power);
                    power = step * power;
                }
                if rotations.len() > MAX_GROUP_ORDER {
                    return Err(SymmetryError::GroupTooLarge);
                }
            }
        }

        loop {
            let snapshot = rotations.clone();
            let mut added = false;
            for a in &snapshot {
                for b in &snapshot {
                    let product = a * b;
                    if self.maps_onto_itself(geometry, &positions, &product)
                        && push_unique(&mut rotations, product)
                    {
                        added = true;
                        if rotations.len() > MAX_GROUP_ORDER {
                            return Err(SymmetryError::GroupTooLarge);
                        }
                    }
                }
            }
            if !added {
                break;
            }
        }

        trace!(order = rotations.len(), "Rotational subgroup resolved.");
        Ok(rotations.len() as u32)
    }
}
