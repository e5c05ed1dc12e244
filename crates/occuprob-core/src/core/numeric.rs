use super::error::DomainError;

/// Boltzmann constant in eV/K.
pub const BOLTZMANN_EV_PER_K: f64 = 8.617333262145e-5;
/// Planck constant in eV/THz.
pub const PLANCK_EV_PER_THZ: f64 = 4.135667696e-3;
/// Frequency used to normalize vibrational partition functions, in THz.
pub const REFERENCE_FREQUENCY_THZ: f64 = 1.0;

/// The physical constants every temperature-dependent formula is evaluated with.
///
/// Energies are in eV, temperatures in K and frequencies in THz. Tests may swap
/// in a different unit system by constructing the struct directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    /// Boltzmann constant (energy per kelvin).
    pub boltzmann: f64,
    /// Planck constant (energy per frequency unit).
    pub planck: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            boltzmann: BOLTZMANN_EV_PER_K,
            planck: PLANCK_EV_PER_THZ,
        }
    }
}

/// Scalar transforms that fix the behavior of every formula at T = 0 and T = ∞.
///
/// All partition-function contributions route their exponents through this type,
/// so the whole crate shares a single edge-case contract:
///
/// - `T = 0` maps to `β = +∞` and `T = +∞` maps to `β = 0`; neither is an error.
/// - Products of an energy with `β` are masked to zero where the energy is not
///   positive, so a zero energy never meets an infinite `β` (`0·∞ = NaN`).
/// - Hyperbolic terms are evaluated through their asymptotic limits at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericCore {
    constants: PhysicalConstants,
}

impl NumericCore {
    pub fn new(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// Converts a temperature into the inverse temperature `β = 1/(k_B·T)`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] for negative or NaN temperatures.
    pub fn beta_of(&self, temperature: f64) -> Result<f64, DomainError> {
        if temperature.is_nan() {
            return Err(DomainError::NanTemperature);
        }
        if temperature < 0.0 {
            return Err(DomainError::NegativeTemperature { value: temperature });
        }
        Ok(self.beta_unchecked(temperature))
    }

    #[inline]
    pub(crate) fn beta_unchecked(&self, temperature: f64) -> f64 {
        if temperature == 0.0 {
            f64::INFINITY
        } else {
            1.0 / (self.constants.boltzmann * temperature)
        }
    }

    /// Converts an inverse temperature back into `k_B·T` (energy units).
    #[inline]
    pub fn thermal_energy(&self, beta: f64) -> f64 {
        if beta.is_infinite() {
            0.0
        } else {
            1.0 / beta
        }
    }

    /// Dimensionless half-quantum `x = β·h·ν/2` of a vibrational mode.
    #[inline]
    pub fn mode_exponent(&self, frequency: f64, beta: f64) -> f64 {
        masked_exponent(0.5 * self.constants.planck * frequency, beta)
    }

    /// Zero-point energy `h·ν/2` of a vibrational mode.
    #[inline]
    pub fn zero_point_energy(&self, frequency: f64) -> f64 {
        0.5 * self.constants.planck * frequency
    }

    /// Logarithm of the normalized quantum weight of a mode,
    /// `ln[(1 − e^{−2s}) / (1 − e^{−2x})]`, with `x` the half-quantum of the mode
    /// and `s` the half-quantum of the reference frequency.
    ///
    /// The ratio tends to `ν_ref/ν` as `β → 0` and to `1` as `β → ∞`, so it stays
    /// finite on the whole temperature axis.
    pub fn log_mode_ratio(&self, frequency: f64, beta: f64) -> f64 {
        let x = self.mode_exponent(frequency, beta);
        let s = self.mode_exponent(REFERENCE_FREQUENCY_THZ, beta);
        if x == 0.0 || s == 0.0 {
            return (REFERENCE_FREQUENCY_THZ / frequency).ln();
        }
        (-(-2.0 * s).exp_m1()).ln() - (-(-2.0 * x).exp_m1()).ln()
    }
}

/// Returns `energy·β`, forced to zero wherever `energy ≤ 0`.
#[inline]
pub fn masked_exponent(energy: f64, beta: f64) -> f64 {
    if energy <= 0.0 { 0.0 } else { energy * beta }
}

/// Boltzmann factor `exp(−energy·β)` built on [`masked_exponent`].
#[inline]
pub fn boltzmann_factor(energy: f64, beta: f64) -> f64 {
    (-masked_exponent(energy, beta)).exp()
}

/// Geometric mean `exp(mean(ln f))` of strictly positive values.
///
/// The empty sequence has mean 1.
pub fn geometric_mean(values: &[f64]) -> Result<f64, DomainError> {
    if values.is_empty() {
        return Ok(1.0);
    }
    let mut log_sum = 0.0;
    for &value in values {
        if value.is_nan() || value <= 0.0 {
            return Err(DomainError::NonPositiveMeanInput { value });
        }
        log_sum += value.ln();
    }
    Ok((log_sum / values.len() as f64).exp())
}

/// `x·coth(x) − x = 2x / (e^{2x} − 1)`: the thermal part of a quantum mode's
/// reduced energy. Equals 1 at `x = 0` and 0 at `x = ∞`.
#[inline]
pub fn thermal_excitation(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else if x.is_infinite() {
        0.0
    } else {
        2.0 * x / (2.0 * x).exp_m1()
    }
}

/// `x²·csch²(x)`: the reduced energy fluctuation of a quantum mode.
/// Equals 1 at `x = 0` and 0 at `x = ∞`.
#[inline]
pub fn fluctuation(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else if x.is_infinite() {
        0.0
    } else {
        let ratio = x / x.sinh();
        ratio * ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn beta_of_zero_temperature_is_infinite() {
        let numeric = NumericCore::default();
        assert_eq!(numeric.beta_of(0.0).unwrap(), f64::INFINITY);
    }

    #[test]
    fn beta_of_infinite_temperature_is_zero() {
        let numeric = NumericCore::default();
        assert_eq!(numeric.beta_of(f64::INFINITY).unwrap(), 0.0);
    }

    #[test]
    fn beta_of_one_electronvolt_temperature_is_one() {
        let numeric = NumericCore::default();
        let beta = numeric.beta_of(11604.5181216).unwrap();
        assert!((beta - 1.0).abs() < 1e-8);
    }

    #[test]
    fn beta_of_rejects_negative_and_nan_temperatures() {
        let numeric = NumericCore::default();
        assert_eq!(
            numeric.beta_of(-1.0),
            Err(DomainError::NegativeTemperature { value: -1.0 })
        );
        assert_eq!(numeric.beta_of(f64::NAN), Err(DomainError::NanTemperature));
    }

    #[test]
    fn beta_uses_injected_constants() {
        let numeric = NumericCore::new(PhysicalConstants {
            boltzmann: 1.0,
            planck: 1.0,
        });
        assert!(f64_approx_equal(numeric.beta_of(4.0).unwrap(), 0.25));
    }

    #[test]
    fn masked_exponent_is_zero_for_non_positive_energy_even_at_infinite_beta() {
        assert_eq!(masked_exponent(0.0, f64::INFINITY), 0.0);
        assert_eq!(masked_exponent(-1.0, f64::INFINITY), 0.0);
        assert_eq!(masked_exponent(1.0, f64::INFINITY), f64::INFINITY);
        assert_eq!(masked_exponent(1.0, 0.0), 0.0);
        assert!(f64_approx_equal(masked_exponent(2.0, 1.5), 3.0));
    }

    #[test]
    fn boltzmann_factor_matches_limits() {
        assert_eq!(boltzmann_factor(0.0, f64::INFINITY), 1.0);
        assert_eq!(boltzmann_factor(1.0, f64::INFINITY), 0.0);
        assert!(f64_approx_equal(boltzmann_factor(1.0, 1.0), 0.367879441171));
    }

    #[test]
    fn geometric_mean_of_constant_values_is_that_value() {
        assert!(f64_approx_equal(geometric_mean(&[3.0, 3.0]).unwrap(), 3.0));
        assert!(f64_approx_equal(geometric_mean(&[1.0, 4.0]).unwrap(), 2.0));
        assert_eq!(geometric_mean(&[]).unwrap(), 1.0);
    }

    #[test]
    fn geometric_mean_rejects_non_positive_values() {
        assert_eq!(
            geometric_mean(&[1.0, 0.0]),
            Err(DomainError::NonPositiveMeanInput { value: 0.0 })
        );
    }

    #[test]
    fn thermal_excitation_has_finite_limits() {
        assert_eq!(thermal_excitation(0.0), 1.0);
        assert_eq!(thermal_excitation(f64::INFINITY), 0.0);
        assert_eq!(thermal_excitation(1000.0), 0.0);
        let x: f64 = 0.7;
        assert!(f64_approx_equal(thermal_excitation(x), x / x.tanh() - x));
    }

    #[test]
    fn fluctuation_has_finite_limits() {
        assert_eq!(fluctuation(0.0), 1.0);
        assert_eq!(fluctuation(f64::INFINITY), 0.0);
        assert_eq!(fluctuation(1000.0), 0.0);
        let x: f64 = 0.7;
        assert!(f64_approx_equal(fluctuation(x), (x / x.sinh()).powi(2)));
    }

    #[test]
    fn log_mode_ratio_interpolates_between_classical_and_ground_state_limits() {
        let numeric = NumericCore::default();
        assert!(f64_approx_equal(
            numeric.log_mode_ratio(3.0, 0.0),
            (1.0f64 / 3.0).ln()
        ));
        assert_eq!(numeric.log_mode_ratio(3.0, f64::INFINITY), 0.0);
        assert!(f64_approx_equal(
            numeric.log_mode_ratio(REFERENCE_FREQUENCY_THZ, 2.5),
            0.0
        ));
        let tiny_beta = 1e-9;
        assert!((numeric.log_mode_ratio(3.0, tiny_beta) - (1.0f64 / 3.0).ln()).abs() < 1e-6);
    }
}
