use crate::core::error::DomainError;
use crate::core::models::grid::TemperatureGrid;
use crate::core::models::minimum::MinimaSet;
use crate::core::numeric::{
    NumericCore, fluctuation, geometric_mean, masked_exponent, thermal_excitation,
};
use nalgebra::{DMatrix, DVector};

/// Rotational and classical contributions scale as a fixed power of `β`,
/// so their reduced moments are constant.
const ROTATIONAL_MOMENT: f64 = 1.5;

/// Electronic partition function `g_k · exp(−β·ΔE_k)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectronicDof {
    numeric: NumericCore,
    relative_energies: Vec<f64>,
    degeneracies: Vec<f64>,
}

impl ElectronicDof {
    /// With `include_spin` the degeneracy of each minimum is its spin
    /// multiplicity; otherwise every minimum has degeneracy 1.
    pub fn new(numeric: NumericCore, minima: &MinimaSet, include_spin: bool) -> Self {
        let degeneracies = minima
            .iter()
            .map(|m| if include_spin { m.spin_multiplicity } else { 1.0 })
            .collect();
        Self {
            numeric,
            relative_energies: minima.relative_energies().to_vec(),
            degeneracies,
        }
    }
}

/// Rigid-rotor partition function, reported as `√(I₁I₂I₃)/σ_k`.
///
/// Zero moments (linear molecules, single atoms) are replaced by 1 so that the
/// contribution reduces to the symmetry factor alone.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationalDof {
    numeric: NumericCore,
    log_values: Vec<f64>,
}

impl RotationalDof {
    pub fn new(numeric: NumericCore, minima: &MinimaSet) -> Self {
        let log_values = minima
            .iter()
            .map(|m| {
                let log_moments: f64 = m
                    .moments_of_inertia
                    .iter()
                    .map(|&i| if i == 0.0 { 0.0 } else { i.ln() })
                    .sum();
                0.5 * log_moments - f64::from(m.symmetry_order).ln()
            })
            .collect();
        Self {
            numeric,
            log_values,
        }
    }
}

/// Classical harmonic partition function, reported as `ν̄_k^{−κ}` with `ν̄_k`
/// the geometric-mean frequency and `κ` the shared number of modes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicalVibrationalDof {
    numeric: NumericCore,
    modes: usize,
    log_values: Vec<f64>,
}

impl ClassicalVibrationalDof {
    /// # Errors
    ///
    /// Returns [`DomainError::InconsistentModeCount`] unless every minimum has
    /// the same number of frequencies.
    pub fn new(numeric: NumericCore, minima: &MinimaSet) -> Result<Self, DomainError> {
        let modes = minima.uniform_mode_count()?;
        let log_values = minima
            .iter()
            .map(|m| Ok(-(modes as f64) * geometric_mean(&m.frequencies)?.ln()))
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(Self {
            numeric,
            modes,
            log_values,
        })
    }

    pub fn modes(&self) -> usize {
        self.modes
    }
}

/// Quantum harmonic partition function `∏ᵢ ½·csch(β·h·ν_{k,i}/2)`.
///
/// The zero-point energy of each minimum is carried as a ground energy; the
/// remaining product is normalized mode by mode against a 1 THz oscillator.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumVibrationalDof {
    numeric: NumericCore,
    modes: usize,
    frequencies: Vec<Vec<f64>>,
    zero_point_energies: Vec<f64>,
}

impl QuantumVibrationalDof {
    /// # Errors
    ///
    /// Returns [`DomainError::InconsistentModeCount`] unless every minimum has
    /// the same number of frequencies.
    pub fn new(numeric: NumericCore, minima: &MinimaSet) -> Result<Self, DomainError> {
        let modes = minima.uniform_mode_count()?;
        let frequencies: Vec<Vec<f64>> = minima.iter().map(|m| m.frequencies.clone()).collect();
        let zero_point_energies = frequencies
            .iter()
            .map(|modes| modes.iter().map(|&f| numeric.zero_point_energy(f)).sum())
            .collect();
        Ok(Self {
            numeric,
            modes,
            frequencies,
            zero_point_energies,
        })
    }

    pub fn modes(&self) -> usize {
        self.modes
    }

    pub fn zero_point_energies(&self) -> &[f64] {
        &self.zero_point_energies
    }
}

/// One factor of the per-minimum partition function.
///
/// Every variant is split into three per-minimum, per-`β` parts:
///
/// - a **ground energy** carried by a Boltzmann factor (relative electronic
///   energy, zero-point energy, or 0),
/// - a **log-prefactor**, finite on the whole temperature axis, and
/// - a **thermal moment**, the part of `W = −β·∂ln Z/∂β` not carried by the
///   ground energy.
///
/// Values are reduced: each is divided by a factor shared by every minimum,
/// which cancels in probabilities and leaves the moments unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum DofContribution {
    Electronic(ElectronicDof),
    Rotational(RotationalDof),
    ClassicalVibrational(ClassicalVibrationalDof),
    QuantumVibrational(QuantumVibrationalDof),
}

impl DofContribution {
    pub fn electronic(numeric: NumericCore, minima: &MinimaSet, include_spin: bool) -> Self {
        Self::Electronic(ElectronicDof::new(numeric, minima, include_spin))
    }

    pub fn rotational(numeric: NumericCore, minima: &MinimaSet) -> Self {
        Self::Rotational(RotationalDof::new(numeric, minima))
    }

    pub fn classical_vibrational(
        numeric: NumericCore,
        minima: &MinimaSet,
    ) -> Result<Self, DomainError> {
        ClassicalVibrationalDof::new(numeric, minima).map(Self::ClassicalVibrational)
    }

    pub fn quantum_vibrational(
        numeric: NumericCore,
        minima: &MinimaSet,
    ) -> Result<Self, DomainError> {
        QuantumVibrationalDof::new(numeric, minima).map(Self::QuantumVibrational)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Electronic(_) => "electronic",
            Self::Rotational(_) => "rotational",
            Self::ClassicalVibrational(_) => "classical vibrational",
            Self::QuantumVibrational(_) => "quantum vibrational",
        }
    }

    pub fn numeric(&self) -> &NumericCore {
        match self {
            Self::Electronic(d) => &d.numeric,
            Self::Rotational(d) => &d.numeric,
            Self::ClassicalVibrational(d) => &d.numeric,
            Self::QuantumVibrational(d) => &d.numeric,
        }
    }

    /// Number of minima this contribution is bound to.
    pub fn n_minima(&self) -> usize {
        match self {
            Self::Electronic(d) => d.relative_energies.len(),
            Self::Rotational(d) => d.log_values.len(),
            Self::ClassicalVibrational(d) => d.log_values.len(),
            Self::QuantumVibrational(d) => d.zero_point_energies.len(),
        }
    }

    /// Temperature-independent energy offset of minimum `k`, in eV.
    pub fn ground_energy(&self, k: usize) -> f64 {
        match self {
            Self::Electronic(d) => d.relative_energies[k],
            Self::QuantumVibrational(d) => d.zero_point_energies[k],
            Self::Rotational(_) | Self::ClassicalVibrational(_) => 0.0,
        }
    }

    pub fn ground_energies(&self) -> DVector<f64> {
        DVector::from_fn(self.n_minima(), |k, _| self.ground_energy(k))
    }

    fn lowest_ground_energy(&self) -> f64 {
        (0..self.n_minima())
            .map(|k| self.ground_energy(k))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn log_prefactor(&self, k: usize, beta: f64) -> f64 {
        match self {
            Self::Electronic(d) => d.degeneracies[k].ln(),
            Self::Rotational(d) => d.log_values[k],
            Self::ClassicalVibrational(d) => d.log_values[k],
            Self::QuantumVibrational(d) => d.frequencies[k]
                .iter()
                .map(|&f| d.numeric.log_mode_ratio(f, beta))
                .sum(),
        }
    }

    pub fn thermal_moment(&self, k: usize, beta: f64) -> f64 {
        match self {
            Self::Electronic(_) => 0.0,
            Self::Rotational(_) => ROTATIONAL_MOMENT,
            Self::ClassicalVibrational(d) => d.modes as f64,
            Self::QuantumVibrational(d) => d.frequencies[k]
                .iter()
                .map(|&f| thermal_excitation(d.numeric.mode_exponent(f, beta)))
                .sum(),
        }
    }

    /// `V = β²·∂²ln Z/∂β²` of minimum `k`.
    pub fn second_moment(&self, k: usize, beta: f64) -> f64 {
        match self {
            Self::Electronic(_) => 0.0,
            Self::Rotational(_) => ROTATIONAL_MOMENT,
            Self::ClassicalVibrational(d) => d.modes as f64,
            Self::QuantumVibrational(d) => d.frequencies[k]
                .iter()
                .map(|&f| fluctuation(d.numeric.mode_exponent(f, beta)))
                .sum(),
        }
    }

    fn tabulate<F>(&self, grid: &TemperatureGrid, f: F) -> DMatrix<f64>
    where
        F: Fn(usize, f64) -> f64,
    {
        let betas = grid.betas(self.numeric());
        DMatrix::from_fn(self.n_minima(), betas.len(), |k, j| f(k, betas[j]))
    }

    /// Reduced partition function values `Z[N, M]`.
    pub fn calc_value(&self, grid: &TemperatureGrid) -> DMatrix<f64> {
        let lowest = self.lowest_ground_energy();
        self.tabulate(grid, |k, beta| {
            let ground = masked_exponent(self.ground_energy(k) - lowest, beta);
            (self.log_prefactor(k, beta) - ground).exp()
        })
    }

    /// `W = −β·∂ln Z/∂β`, measured from the lowest ground energy of this
    /// contribution. Minima above that energy have `W = ∞` at `T = 0`.
    pub fn calc_w(&self, grid: &TemperatureGrid) -> DMatrix<f64> {
        let lowest = self.lowest_ground_energy();
        self.tabulate(grid, |k, beta| {
            masked_exponent(self.ground_energy(k) - lowest, beta) + self.thermal_moment(k, beta)
        })
    }

    pub fn calc_v(&self, grid: &TemperatureGrid) -> DMatrix<f64> {
        self.tabulate(grid, |k, beta| self.second_moment(k, beta))
    }

    pub fn calc_log_prefactor(&self, grid: &TemperatureGrid) -> DMatrix<f64> {
        self.tabulate(grid, |k, beta| self.log_prefactor(k, beta))
    }

    pub fn calc_thermal_moment(&self, grid: &TemperatureGrid) -> DMatrix<f64> {
        self.tabulate(grid, |k, beta| self.thermal_moment(k, beta))
    }
}
