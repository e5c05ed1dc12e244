use thiserror::Error;

/// Rejected input values.
///
/// Every variant is raised while building the validated inputs of a calculation
/// (minima sets, temperature grids, contributions), never from inside a formula.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Temperature must be non-negative, found {value} K")]
    NegativeTemperature { value: f64 },

    #[error("Temperature is not a number")]
    NanTemperature,

    #[error("Invalid temperature range: min={min} K, max={max} K, step={step} K")]
    InvalidTemperatureRange { min: f64, max: f64, step: f64 },

    #[error("Temperature range holds {points} points, more than the limit of {max}")]
    GridTooLarge { points: f64, max: usize },

    #[error("The minima set is empty")]
    EmptyMinima,

    #[error("Potential energy of minimum {minimum} is not finite ({value})")]
    NonFiniteEnergy { minimum: usize, value: f64 },

    #[error("Frequency {mode} of minimum {minimum} must be positive, found {value} THz")]
    NonPositiveFrequency {
        minimum: usize,
        mode: usize,
        value: f64,
    },

    #[error("Symmetry order of minimum {minimum} must be at least 1")]
    NonPositiveSymmetryOrder { minimum: usize },

    #[error("Spin multiplicity of minimum {minimum} must be positive, found {value}")]
    NonPositiveMultiplicity { minimum: usize, value: f64 },

    #[error("Moment of inertia {axis} of minimum {minimum} must be non-negative, found {value}")]
    NegativeMomentOfInertia {
        minimum: usize,
        axis: usize,
        value: f64,
    },

    #[error("Minimum {minimum} has {found} vibrational modes, expected {expected}")]
    InconsistentModeCount {
        minimum: usize,
        expected: usize,
        found: usize,
    },

    #[error("Geometric mean is only defined for positive values, found {value}")]
    NonPositiveMeanInput { value: f64 },

    #[error("Observable has {found} rows, expected one per minimum ({expected})")]
    ObservableShape { expected: usize, found: usize },

    #[error("Observable has {found} columns, expected one per temperature ({expected})")]
    ObservableColumns { expected: usize, found: usize },
}
