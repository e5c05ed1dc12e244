use super::dof::DofContribution;
use super::error::ThermoError;
use crate::core::error::DomainError;
use crate::core::models::grid::TemperatureGrid;
use crate::core::numeric::{NumericCore, masked_exponent};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::debug;

/// How per-contribution tables are reduced over the dof axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Product,
    Sum,
}

impl Reduction {
    fn apply(self, acc: DMatrix<f64>, next: &DMatrix<f64>) -> DMatrix<f64> {
        match self {
            Self::Product => acc.component_mul(next),
            Self::Sum => acc + next,
        }
    }
}

/// The superposition of per-minimum partition functions.
///
/// Each minimum's partition function is the product of the registered
/// contributions; the ensemble partition function is the sum over minima. The
/// contribution list is fixed at construction and every output is recomputed
/// on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperpositionModel {
    contributions: Vec<DofContribution>,
    n_minima: usize,
}

impl SuperpositionModel {
    /// Registers the contributions in the given order.
    ///
    /// An empty list is accepted here; every evaluation then fails with
    /// [`ThermoError::NoContributions`].
    ///
    /// # Errors
    ///
    /// Returns [`ThermoError::MinimaMismatch`] if the contributions are bound to
    /// different numbers of minima.
    pub fn new(contributions: Vec<DofContribution>) -> Result<Self, ThermoError> {
        let n_minima = contributions.first().map_or(0, DofContribution::n_minima);
        if let Some((contribution, c)) = contributions
            .iter()
            .enumerate()
            .find(|(_, c)| c.n_minima() != n_minima)
        {
            return Err(ThermoError::MinimaMismatch {
                contribution,
                expected: n_minima,
                found: c.n_minima(),
            });
        }
        Ok(Self {
            contributions,
            n_minima,
        })
    }

    pub fn contributions(&self) -> &[DofContribution] {
        &self.contributions
    }

    pub fn n_minima(&self) -> usize {
        self.n_minima
    }

    fn numeric(&self) -> Result<&NumericCore, ThermoError> {
        self.contributions
            .first()
            .map(DofContribution::numeric)
            .ok_or(ThermoError::NoContributions)
    }

    /// Evaluates `getter` on every contribution and reduces the resulting
    /// `N×M` tables with `op`.
    ///
    /// Contributions are evaluated in parallel; the reduction runs in
    /// registration order, so results do not depend on scheduling.
    pub fn combine<F>(
        &self,
        grid: &TemperatureGrid,
        op: Reduction,
        getter: F,
    ) -> Result<DMatrix<f64>, ThermoError>
    where
        F: Fn(&DofContribution, &TemperatureGrid) -> DMatrix<f64> + Sync,
    {
        let tables: Vec<DMatrix<f64>> = self
            .contributions
            .par_iter()
            .map(|c| getter(c, grid))
            .collect();
        let mut tables = tables.into_iter();
        let first = tables.next().ok_or(ThermoError::NoContributions)?;
        Ok(tables.fold(first, |acc, table| op.apply(acc, &table)))
    }

    /// Summed ground energy of every minimum, relative to the lowest one (eV).
    pub fn ground_energy_offsets(&self) -> Result<DVector<f64>, ThermoError> {
        if self.contributions.is_empty() {
            return Err(ThermoError::NoContributions);
        }
        let totals = DVector::from_fn(self.n_minima, |k, _| {
            self.contributions.iter().map(|c| c.ground_energy(k)).sum::<f64>()
        });
        let lowest = totals.iter().copied().fold(f64::INFINITY, f64::min);
        Ok(totals.map(|g| g - lowest))
    }

    fn ground_exponents(&self, grid: &TemperatureGrid) -> Result<DMatrix<f64>, ThermoError> {
        let offsets = self.ground_energy_offsets()?;
        let betas = grid.betas(self.numeric()?);
        Ok(DMatrix::from_fn(self.n_minima, betas.len(), |k, j| {
            masked_exponent(offsets[k], betas[j])
        }))
    }

    /// `ln Z[N, M]` up to a minimum-independent additive term.
    pub fn log_partition_functions(
        &self,
        grid: &TemperatureGrid,
    ) -> Result<DMatrix<f64>, ThermoError> {
        let log_prefactors = self.combine(grid, Reduction::Sum, |c, g| c.calc_log_prefactor(g))?;
        Ok(log_prefactors - self.ground_exponents(grid)?)
    }

    /// Per-minimum partition functions `Z[N, M]`, reduced by a factor shared by
    /// every minimum.
    pub fn partition_functions(&self, grid: &TemperatureGrid) -> Result<DMatrix<f64>, ThermoError> {
        Ok(self.log_partition_functions(grid)?.map(f64::exp))
    }

    /// Occupation probabilities `P[N, M]`; every column sums to 1.
    ///
    /// At `T = 0` the probability is shared by the minima with the lowest
    /// summed ground energy, in proportion to their prefactors.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoError::NoContributions`] for an empty model and
    /// [`ThermoError::Internal`] if a column cannot be normalized.
    pub fn probability(&self, grid: &TemperatureGrid) -> Result<DMatrix<f64>, ThermoError> {
        debug!(
            contributions = self.contributions.len(),
            minima = self.n_minima,
            temperatures = grid.len(),
            "Evaluating occupation probabilities."
        );
        let log_z = self.log_partition_functions(grid)?;
        let mut probability = DMatrix::zeros(self.n_minima, grid.len());

        for j in 0..grid.len() {
            let column = log_z.column(j);
            if let Some(k) = column.iter().position(|lz| lz.is_nan()) {
                return Err(ThermoError::Internal(format!(
                    "Partition function of minimum {} at T = {} K is not a number",
                    k,
                    grid.values()[j]
                )));
            }
            let peak = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if !peak.is_finite() {
                return Err(ThermoError::Internal(format!(
                    "Partition functions at T = {} K cannot be normalized (peak log value {})",
                    grid.values()[j],
                    peak
                )));
            }
            let weights: Vec<f64> = column.iter().map(|&lz| (lz - peak).exp()).collect();
            let total: f64 = weights.iter().sum();
            if !total.is_finite() {
                return Err(ThermoError::Internal(format!(
                    "Normalization of partition functions at T = {} K is not finite ({})",
                    grid.values()[j],
                    total
                )));
            }
            for (k, weight) in weights.into_iter().enumerate() {
                probability[(k, j)] = weight / total;
            }
        }
        Ok(probability)
    }

    /// `Σ_k observable_k · P_k(T)` for a temperature-independent observable.
    pub fn ensemble_average(
        &self,
        grid: &TemperatureGrid,
        observable: &DVector<f64>,
    ) -> Result<DVector<f64>, ThermoError> {
        if observable.len() != self.n_minima {
            return Err(DomainError::ObservableShape {
                expected: self.n_minima,
                found: observable.len(),
            }
            .into());
        }
        let values = DMatrix::from_fn(self.n_minima, grid.len(), |k, _| observable[k]);
        Ok(weighted_average(&self.probability(grid)?, &values))
    }

    /// `Σ_k observable_{k,j} · P_{k,j}` for an observable tabulated on the grid.
    pub fn ensemble_average_of(
        &self,
        grid: &TemperatureGrid,
        observable: &DMatrix<f64>,
    ) -> Result<DVector<f64>, ThermoError> {
        if observable.nrows() != self.n_minima {
            return Err(DomainError::ObservableShape {
                expected: self.n_minima,
                found: observable.nrows(),
            }
            .into());
        }
        if observable.ncols() != grid.len() {
            return Err(DomainError::ObservableColumns {
                expected: grid.len(),
                found: observable.ncols(),
            }
            .into());
        }
        Ok(weighted_average(&self.probability(grid)?, observable))
    }

    /// `W[N, M]` of the whole superposition, measured from the lowest summed
    /// ground energy.
    fn total_w(&self, grid: &TemperatureGrid) -> Result<DMatrix<f64>, ThermoError> {
        let thermal = self.combine(grid, Reduction::Sum, |c, g| c.calc_thermal_moment(g))?;
        Ok(self.ground_exponents(grid)? + thermal)
    }

    /// Heat capacity in units of `k_B`: `⟨V⟩ + ⟨W²⟩ − ⟨W⟩²`.
    pub fn heat_capacity(&self, grid: &TemperatureGrid) -> Result<DVector<f64>, ThermoError> {
        let probability = self.probability(grid)?;
        let v = self.combine(grid, Reduction::Sum, |c, g| c.calc_v(g))?;
        let w = self.total_w(grid)?;
        let w_squared = w.component_mul(&w);

        let mean_v = weighted_average(&probability, &v);
        let mean_w = weighted_average(&probability, &w);
        let mean_w_squared = weighted_average(&probability, &w_squared);

        Ok(DVector::from_fn(grid.len(), |j, _| {
            mean_v[j] + mean_w_squared[j] - mean_w[j] * mean_w[j]
        }))
    }

    /// Mean energy in eV, relative to the lowest summed ground energy.
    ///
    /// Ground energies are averaged directly; thermal moments are scaled by
    /// `k_B·T`, so the result is 0 at `T = 0` and diverges at `T = ∞` only when
    /// some contribution has a non-zero thermal moment.
    pub fn mean_energy(&self, grid: &TemperatureGrid) -> Result<DVector<f64>, ThermoError> {
        let numeric = self.numeric()?;
        let probability = self.probability(grid)?;
        let offsets = self.ground_energy_offsets()?;
        let ground = DMatrix::from_fn(self.n_minima, grid.len(), |k, _| offsets[k]);
        let thermal = self.combine(grid, Reduction::Sum, |c, g| c.calc_thermal_moment(g))?;

        let mean_ground = weighted_average(&probability, &ground);
        let mean_thermal = weighted_average(&probability, &thermal);
        let betas = grid.betas(numeric);

        Ok(DVector::from_fn(grid.len(), |j, _| {
            let thermal_part = if mean_thermal[j] == 0.0 {
                0.0
            } else {
                numeric.thermal_energy(betas[j]) * mean_thermal[j]
            };
            mean_ground[j] + thermal_part
        }))
    }
}

/// Column-wise `Σ_k P·X`, where entries with zero probability contribute
/// exactly 0 whatever their value.
fn weighted_average(probability: &DMatrix<f64>, values: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_fn(probability.ncols(), |j, _| {
        (0..probability.nrows())
            .map(|k| {
                let p = probability[(k, j)];
                if p == 0.0 { 0.0 } else { p * values[(k, j)] }
            })
            .sum()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::minimum::{MinimaSet, Minimum};
    use crate::core::numeric::{BOLTZMANN_EV_PER_K, PhysicalConstants};

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn two_level(gap: f64) -> MinimaSet {
        MinimaSet::new(vec![Minimum::new(0.0), Minimum::new(gap)]).unwrap()
    }

    fn electronic_model(minima: &MinimaSet) -> SuperpositionModel {
        SuperpositionModel::new(vec![DofContribution::electronic(
            NumericCore::default(),
            minima,
            true,
        )])
        .unwrap()
    }

    #[test]
    fn empty_model_fails_at_evaluation_time() {
        let model = SuperpositionModel::new(vec![]).unwrap();
        let grid = TemperatureGrid::new(vec![300.0]).unwrap();
        assert_eq!(model.probability(&grid), Err(ThermoError::NoContributions));
        assert_eq!(model.heat_capacity(&grid), Err(ThermoError::NoContributions));
        assert_eq!(
            model.combine(&grid, Reduction::Product, |c, g| c.calc_value(g)),
            Err(ThermoError::NoContributions)
        );
    }

    #[test]
    fn new_rejects_contributions_bound_to_different_minima() {
        let numeric = NumericCore::default();
        let result = SuperpositionModel::new(vec![
            DofContribution::electronic(numeric, &two_level(0.1), false),
            DofContribution::rotational(
                numeric,
                &MinimaSet::new(vec![Minimum::new(0.0)]).unwrap(),
            ),
        ]);
        assert_eq!(
            result,
            Err(ThermoError::MinimaMismatch {
                contribution: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn probability_reports_partition_functions_that_are_not_numbers() {
        // Zero-point energies overflow to infinity for every minimum, so the
        // offsets between them are undefined.
        let minima = MinimaSet::new(vec![
            Minimum::new(0.0).with_frequencies(vec![f64::MAX; 1000]),
            Minimum::new(0.1).with_frequencies(vec![f64::MAX; 1000]),
        ])
        .unwrap();
        let model = SuperpositionModel::new(vec![
            DofContribution::quantum_vibrational(NumericCore::default(), &minima).unwrap(),
        ])
        .unwrap();
        let grid = TemperatureGrid::new(vec![300.0, f64::INFINITY]).unwrap();

        assert!(matches!(
            model.probability(&grid),
            Err(ThermoError::Internal(_))
        ));
        assert!(matches!(
            model.heat_capacity(&grid),
            Err(ThermoError::Internal(_))
        ));
    }

    #[test]
    fn combine_multiplies_values_in_registration_order() {
        let numeric = NumericCore::default();
        let minima = MinimaSet::new(vec![
            Minimum::new(0.0).with_symmetry_order(2),
            Minimum::new(0.0).with_spin_multiplicity(3.0),
        ])
        .unwrap();
        let model = SuperpositionModel::new(vec![
            DofContribution::electronic(numeric, &minima, true),
            DofContribution::rotational(numeric, &minima),
        ])
        .unwrap();
        let grid = TemperatureGrid::new(vec![100.0]).unwrap();
        let product = model
            .combine(&grid, Reduction::Product, |c, g| c.calc_value(g))
            .unwrap();
        assert!(f64_approx_equal(product[(0, 0)], 0.5));
        assert!(f64_approx_equal(product[(1, 0)], 3.0));

        let sum = model.combine(&grid, Reduction::Sum, |c, g| c.calc_v(g)).unwrap();
        assert_eq!(sum[(0, 0)], 1.5);
    }

    #[test]
    fn probability_columns_sum_to_one() {
        let minima = MinimaSet::new(vec![
            Minimum::new(0.0).with_frequencies(vec![3.0, 5.0]),
            Minimum::new(0.02).with_frequencies(vec![2.0, 4.0]).with_spin_multiplicity(2.0),
            Minimum::new(0.05).with_frequencies(vec![1.0, 9.0]).with_symmetry_order(3),
        ])
        .unwrap();
        let numeric = NumericCore::default();
        let model = SuperpositionModel::new(vec![
            DofContribution::electronic(numeric, &minima, true),
            DofContribution::quantum_vibrational(numeric, &minima).unwrap(),
            DofContribution::rotational(numeric, &minima),
        ])
        .unwrap();
        let grid = TemperatureGrid::new(vec![0.0, 1.0, 50.0, 300.0, 1e5, f64::INFINITY]).unwrap();
        let probability = model.probability(&grid).unwrap();
        for column in probability.column_iter() {
            assert!((column.sum() - 1.0).abs() < 1e-12);
            assert!(column.iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }

    #[test]
    fn probability_is_bit_identical_across_calls() {
        let minima = two_level(0.01);
        let model = electronic_model(&minima);
        let grid = TemperatureGrid::range(0.0, 500.0, 25.0).unwrap();
        assert_eq!(model.probability(&grid), model.probability(&grid));
    }

    #[test]
    fn tied_ground_minima_share_probability_at_zero_temperature() {
        let minima = MinimaSet::new(vec![
            Minimum::new(0.0),
            Minimum::new(0.0),
            Minimum::new(0.3),
        ])
        .unwrap();
        let model = electronic_model(&minima);
        let grid = TemperatureGrid::new(vec![0.0]).unwrap();
        let probability = model.probability(&grid).unwrap();
        assert_eq!(probability[(0, 0)], 0.5);
        assert_eq!(probability[(1, 0)], 0.5);
        assert_eq!(probability[(2, 0)], 0.0);
    }

    #[test]
    fn infinite_temperature_electronic_probability_follows_degeneracy() {
        let minima = MinimaSet::new(vec![
            Minimum::new(0.0),
            Minimum::new(0.4).with_spin_multiplicity(3.0),
        ])
        .unwrap();
        let model = electronic_model(&minima);
        let grid = TemperatureGrid::new(vec![f64::INFINITY]).unwrap();
        let probability = model.probability(&grid).unwrap();
        assert!(f64_approx_equal(probability[(0, 0)], 0.25));
        assert!(f64_approx_equal(probability[(1, 0)], 0.75));
    }

    #[test]
    fn ensemble_average_ignores_values_of_unoccupied_minima() {
        let model = electronic_model(&two_level(0.5));
        let grid = TemperatureGrid::new(vec![0.0, f64::INFINITY]).unwrap();
        let observable = DVector::from_vec(vec![2.0, f64::INFINITY]);
        let average = model.ensemble_average(&grid, &observable).unwrap();
        assert_eq!(average[0], 2.0);
        assert_eq!(average[1], f64::INFINITY);

        let finite = DVector::from_vec(vec![2.0, 4.0]);
        let average = model.ensemble_average(&grid, &finite).unwrap();
        assert!(f64_approx_equal(average[1], 3.0));
    }

    #[test]
    fn ensemble_average_rejects_mismatched_observables() {
        let model = electronic_model(&two_level(0.5));
        let grid = TemperatureGrid::new(vec![1.0, 2.0]).unwrap();
        assert_eq!(
            model.ensemble_average(&grid, &DVector::from_vec(vec![1.0])),
            Err(ThermoError::Domain {
                source: DomainError::ObservableShape {
                    expected: 2,
                    found: 1
                }
            })
        );
        assert_eq!(
            model.ensemble_average_of(&grid, &DMatrix::zeros(2, 3)),
            Err(ThermoError::Domain {
                source: DomainError::ObservableColumns {
                    expected: 2,
                    found: 3
                }
            })
        );
    }

    #[test]
    fn ensemble_average_of_tabulated_observable_uses_matching_columns() {
        let model = electronic_model(&two_level(0.5));
        let grid = TemperatureGrid::new(vec![0.0, f64::INFINITY]).unwrap();
        let observable = DMatrix::from_row_slice(2, 2, &[1.0, 10.0, 5.0, 20.0]);
        let average = model.ensemble_average_of(&grid, &observable).unwrap();
        assert_eq!(average[0], 1.0);
        assert!(f64_approx_equal(average[1], 15.0));
    }

    #[test]
    fn two_level_heat_capacity_reproduces_schottky_anomaly() {
        let gap = 0.01;
        let model = SuperpositionModel::new(vec![DofContribution::electronic(
            NumericCore::default(),
            &two_level(gap),
            false,
        )])
        .unwrap();
        let grid = TemperatureGrid::new(vec![0.0, gap / BOLTZMANN_EV_PER_K, f64::INFINITY]).unwrap();
        let capacity = model.heat_capacity(&grid).unwrap();
        let e = (-1.0f64).exp();
        assert_eq!(capacity[0], 0.0);
        assert!((capacity[1] - e / (1.0 + e).powi(2)).abs() < 1e-9);
        assert!(f64_approx_equal(capacity[2], 0.0));
    }

    #[test]
    fn single_oscillator_heat_capacity_follows_einstein_limits() {
        let numeric = NumericCore::new(PhysicalConstants {
            boltzmann: 1.0,
            planck: 1.0,
        });
        let minima = MinimaSet::new(vec![Minimum::new(0.0).with_frequencies(vec![2.0])]).unwrap();
        let model =
            SuperpositionModel::new(vec![DofContribution::quantum_vibrational(numeric, &minima)
                .unwrap()])
            .unwrap();
        let grid = TemperatureGrid::new(vec![0.0, 1.0, f64::INFINITY]).unwrap();
        let capacity = model.heat_capacity(&grid).unwrap();
        let x: f64 = 1.0;
        assert_eq!(capacity[0], 0.0);
        assert!(f64_approx_equal(capacity[1], (x / x.sinh()).powi(2)));
        assert!(f64_approx_equal(capacity[2], 1.0));
    }

    #[test]
    fn classical_heat_capacity_obeys_equipartition() {
        let numeric = NumericCore::default();
        let minima = MinimaSet::new(vec![
            Minimum::new(0.0).with_frequencies(vec![1.0, 2.0, 3.0]),
            Minimum::new(0.0).with_frequencies(vec![4.0, 5.0, 6.0]),
        ])
        .unwrap();
        let model = SuperpositionModel::new(vec![
            DofContribution::classical_vibrational(numeric, &minima).unwrap(),
            DofContribution::rotational(numeric, &minima),
        ])
        .unwrap();
        let grid = TemperatureGrid::new(vec![10.0, 300.0, 5000.0]).unwrap();
        let capacity = model.heat_capacity(&grid).unwrap();
        assert!(capacity.iter().all(|&c| f64_approx_equal(c, 4.5)));
    }

    #[test]
    fn mean_energy_of_electronic_two_level_system() {
        let model = electronic_model(&two_level(0.5));
        let grid = TemperatureGrid::new(vec![0.0, f64::INFINITY]).unwrap();
        let energy = model.mean_energy(&grid).unwrap();
        assert_eq!(energy[0], 0.0);
        assert!(f64_approx_equal(energy[1], 0.25));
    }

    #[test]
    fn mean_energy_includes_classical_thermal_energy() {
        let numeric = NumericCore::new(PhysicalConstants {
            boltzmann: 1.0,
            planck: 1.0,
        });
        let minima = MinimaSet::new(vec![Minimum::new(0.0).with_frequencies(vec![1.0, 2.0])]).unwrap();
        let model =
            SuperpositionModel::new(vec![DofContribution::classical_vibrational(numeric, &minima)
                .unwrap()])
            .unwrap();
        let grid = TemperatureGrid::new(vec![0.0, 3.0, f64::INFINITY]).unwrap();
        let energy = model.mean_energy(&grid).unwrap();
        assert_eq!(energy[0], 0.0);
        assert!(f64_approx_equal(energy[1], 6.0));
        assert_eq!(energy[2], f64::INFINITY);
    }
}
