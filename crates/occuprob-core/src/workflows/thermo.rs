use crate::core::models::grid::TemperatureGrid;
use crate::core::models::minimum::MinimaSet;
use crate::core::numeric::NumericCore;
use crate::engine::config::{DofSelection, ElectronicModel, ThermoConfig, VibrationalModel};
use crate::engine::dof::DofContribution;
use crate::engine::error::ThermoError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::superposition::SuperpositionModel;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct ThermoResult {
    pub grid: TemperatureGrid,
    /// Occupation probabilities, one row per minimum and one column per temperature.
    pub probability: DMatrix<f64>,
    /// Heat capacity in units of k_B.
    pub heat_capacity: DVector<f64>,
    /// Mean energy in eV above the lowest summed ground energy.
    pub mean_energy: DVector<f64>,
    pub labels: Vec<String>,
}

impl ThermoResult {
    /// Index of the most probable minimum at every temperature.
    pub fn dominant_minima(&self) -> Vec<usize> {
        self.probability
            .column_iter()
            .map(|column| column.imax())
            .collect()
    }
}

#[instrument(skip_all, name = "thermo_workflow")]
pub fn run(
    minima: &MinimaSet,
    config: &ThermoConfig,
    reporter: &ProgressReporter,
) -> Result<ThermoResult, ThermoError> {
    // === Phase 0: Preparation ===
    reporter.report(Progress::StageStart {
        name: "Preparation",
    });
    let grid = config.temperatures.to_grid()?;
    let numeric = NumericCore::new(config.constants);
    info!(
        minima = minima.len(),
        temperatures = grid.len(),
        "Starting thermodynamics workflow."
    );
    reporter.report(Progress::StageFinish);

    // === Phase 1: Build contributions ===
    let model = build_model(minima, &config.dofs, numeric, reporter)?;
    let names: Vec<&str> = model.contributions().iter().map(|c| c.name()).collect();
    reporter.report(Progress::Message(format!(
        "Partition function per minimum: {}",
        names.join(" × ")
    )));

    // === Phase 2: Occupation probabilities ===
    reporter.report(Progress::StageStart {
        name: "Occupation probabilities",
    });
    let probability = model.probability(&grid)?;
    reporter.report(Progress::StageFinish);

    // === Phase 3: Heat capacity and mean energy ===
    reporter.report(Progress::StageStart {
        name: "Heat capacity",
    });
    let heat_capacity = model.heat_capacity(&grid)?;
    let mean_energy = model.mean_energy(&grid)?;
    reporter.report(Progress::StageFinish);

    let labels = (0..minima.len()).map(|k| minima.label(k)).collect();
    let result = ThermoResult {
        grid,
        probability,
        heat_capacity,
        mean_energy,
        labels,
    };

    info!(
        "Workflow complete. Evaluated {} minima at {} temperatures.",
        minima.len(),
        result.grid.len()
    );
    Ok(result)
}

/// Builds the superposition for `dofs` in a fixed order: electronic,
/// vibrational, rotational.
pub fn build_model(
    minima: &MinimaSet,
    dofs: &DofSelection,
    numeric: NumericCore,
    reporter: &ProgressReporter,
) -> Result<SuperpositionModel, ThermoError> {
    reporter.report(Progress::ContributionsStart {
        total: dofs.count() as u64,
    });

    let mut contributions = Vec::with_capacity(dofs.count());
    match dofs.electronic {
        ElectronicModel::None => {}
        ElectronicModel::Degenerate => {
            contributions.push(DofContribution::electronic(numeric, minima, false))
        }
        ElectronicModel::Spin => {
            contributions.push(DofContribution::electronic(numeric, minima, true))
        }
    }
    match dofs.vibrational {
        VibrationalModel::None => {}
        VibrationalModel::Classical => {
            contributions.push(DofContribution::classical_vibrational(numeric, minima)?)
        }
        VibrationalModel::Quantum => {
            contributions.push(DofContribution::quantum_vibrational(numeric, minima)?)
        }
    }
    if dofs.rotational {
        contributions.push(DofContribution::rotational(numeric, minima));
    }

    for contribution in &contributions {
        debug!(name = contribution.name(), "Registered contribution.");
        reporter.report(Progress::ContributionBuilt {
            name: contribution.name(),
        });
    }
    reporter.report(Progress::ContributionsFinish);

    if contributions.is_empty() {
        return Err(ThermoError::NoContributions);
    }
    SuperpositionModel::new(contributions)
}
