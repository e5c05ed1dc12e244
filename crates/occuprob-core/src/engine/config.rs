use crate::core::error::DomainError;
use crate::core::models::grid::TemperatureGrid;
use crate::core::numeric::PhysicalConstants;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("At least one degree of freedom must be selected")]
    NoDofSelected,
}

/// How the electronic partition function treats each minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElectronicModel {
    #[default]
    None,
    /// Boltzmann factor of the relative energy only (every g = 1).
    Degenerate,
    /// Boltzmann factor weighted by the spin multiplicity.
    Spin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VibrationalModel {
    #[default]
    None,
    Classical,
    Quantum,
}

/// The degrees of freedom included in the superposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DofSelection {
    pub electronic: ElectronicModel,
    pub vibrational: VibrationalModel,
    pub rotational: bool,
}

impl DofSelection {
    pub fn is_empty(&self) -> bool {
        self.electronic == ElectronicModel::None
            && self.vibrational == VibrationalModel::None
            && !self.rotational
    }

    /// Number of contributions this selection produces.
    pub fn count(&self) -> usize {
        usize::from(self.electronic != ElectronicModel::None)
            + usize::from(self.vibrational != VibrationalModel::None)
            + usize::from(self.rotational)
    }
}

/// An inclusive temperature range in K.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl TemperatureRange {
    pub fn to_grid(&self) -> Result<TemperatureGrid, DomainError> {
        TemperatureGrid::range(self.min, self.max, self.step)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThermoConfig {
    pub dofs: DofSelection,
    pub temperatures: TemperatureRange,
    pub constants: PhysicalConstants,
}

#[derive(Default)]
pub struct ThermoConfigBuilder {
    dofs: Option<DofSelection>,
    min_temperature: Option<f64>,
    max_temperature: Option<f64>,
    temperature_step: Option<f64>,
    constants: Option<PhysicalConstants>,
}

impl ThermoConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dofs(mut self, dofs: DofSelection) -> Self {
        self.dofs = Some(dofs);
        self
    }
    pub fn min_temperature(mut self, kelvin: f64) -> Self {
        self.min_temperature = Some(kelvin);
        self
    }
    pub fn max_temperature(mut self, kelvin: f64) -> Self {
        self.max_temperature = Some(kelvin);
        self
    }
    pub fn temperature_step(mut self, kelvin: f64) -> Self {
        self.temperature_step = Some(kelvin);
        self
    }
    pub fn constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = Some(constants);
        self
    }

    pub fn build(self) -> Result<ThermoConfig, ConfigError> {
        let dofs = self.dofs.ok_or(ConfigError::MissingParameter("dofs"))?;
        if dofs.is_empty() {
            return Err(ConfigError::NoDofSelected);
        }
        let temperatures = TemperatureRange {
            min: self
                .min_temperature
                .ok_or(ConfigError::MissingParameter("min_temperature"))?,
            max: self
                .max_temperature
                .ok_or(ConfigError::MissingParameter("max_temperature"))?,
            step: self
                .temperature_step
                .ok_or(ConfigError::MissingParameter("temperature_step"))?,
        };
        Ok(ThermoConfig {
            dofs,
            temperatures,
            constants: self.constants.unwrap_or_default(),
        })
    }
}
