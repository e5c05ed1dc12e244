use crate::core::error::DomainError;
use crate::core::numeric::NumericCore;

/// Upper bound on the number of points [`TemperatureGrid::range`] will generate.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// An ordered sequence of temperatures (K) at which every quantity is evaluated.
///
/// Values need not be sorted. `0` and `+∞` are valid and are evaluated as the
/// limiting cases of the formulas; negative and NaN values are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureGrid {
    values: Vec<f64>,
}

impl TemperatureGrid {
    pub fn new(values: Vec<f64>) -> Result<Self, DomainError> {
        for &value in &values {
            if value.is_nan() {
                return Err(DomainError::NanTemperature);
            }
            if value < 0.0 {
                return Err(DomainError::NegativeTemperature { value });
            }
        }
        Ok(Self { values })
    }

    /// Builds the inclusive range `min, min + step, …` up to `max`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTemperatureRange`] unless
    /// `0 ≤ min ≤ max < ∞` and `step > 0`, and [`DomainError::GridTooLarge`]
    /// if the range holds more than [`MAX_GRID_POINTS`] points.
    pub fn range(min: f64, max: f64, step: f64) -> Result<Self, DomainError> {
        let valid = min.is_finite()
            && max.is_finite()
            && step.is_finite()
            && min >= 0.0
            && max >= min
            && step > 0.0;
        if !valid {
            return Err(DomainError::InvalidTemperatureRange { min, max, step });
        }

        // Tolerates round-off so that `max` is kept when it lies on the grid.
        let intervals = ((max - min) / step + 1e-9).floor();
        let count = if intervals < MAX_GRID_POINTS as f64 {
            (intervals as usize).checked_add(1)
        } else {
            None
        }
        .filter(|&count| count <= MAX_GRID_POINTS)
        .ok_or(DomainError::GridTooLarge {
            points: intervals + 1.0,
            max: MAX_GRID_POINTS,
        })?;
        let values = (0..count).map(|i| min + i as f64 * step).collect();
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    /// Inverse temperatures `β = 1/(k_B·T)` for every grid point.
    pub fn betas(&self, numeric: &NumericCore) -> Vec<f64> {
        self.values
            .iter()
            .map(|&t| numeric.beta_unchecked(t))
            .collect()
    }
}
