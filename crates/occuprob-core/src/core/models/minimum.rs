use crate::core::error::DomainError;

/// A local minimum (isomer) of the potential-energy surface and its static properties.
///
/// A `Minimum` is constructed once from the output of a structure provider and
/// never mutated afterwards. Unset properties default to those of a
/// non-degenerate, asymmetric minimum without vibrational data.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Optional label used in logs and summaries.
    pub name: Option<String>,
    /// Potential energy in eV.
    pub potential_energy: f64,
    /// Vibrational frequencies in THz.
    pub frequencies: Vec<f64>,
    /// Order of the rotational subgroup of the point group.
    pub symmetry_order: u32,
    /// Electronic (spin) degeneracy.
    pub spin_multiplicity: f64,
    /// Principal moments of inertia in amu·Å².
    pub moments_of_inertia: [f64; 3],
}

impl Minimum {
    pub fn new(potential_energy: f64) -> Self {
        Self {
            name: None,
            potential_energy,
            frequencies: Vec::new(),
            symmetry_order: 1,
            spin_multiplicity: 1.0,
            moments_of_inertia: [0.0; 3],
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_frequencies(mut self, frequencies: Vec<f64>) -> Self {
        self.frequencies = frequencies;
        self
    }

    pub fn with_symmetry_order(mut self, symmetry_order: u32) -> Self {
        self.symmetry_order = symmetry_order;
        self
    }

    pub fn with_spin_multiplicity(mut self, spin_multiplicity: f64) -> Self {
        self.spin_multiplicity = spin_multiplicity;
        self
    }

    pub fn with_moments_of_inertia(mut self, moments: [f64; 3]) -> Self {
        self.moments_of_inertia = moments;
        self
    }

    /// Number of vibrational modes.
    pub fn mode_count(&self) -> usize {
        self.frequencies.len()
    }

    fn validate(&self, index: usize) -> Result<(), DomainError> {
        if !self.potential_energy.is_finite() {
            return Err(DomainError::NonFiniteEnergy {
                minimum: index,
                value: self.potential_energy,
            });
        }
        if let Some((mode, &value)) = self
            .frequencies
            .iter()
            .enumerate()
            .find(|(_, f)| f.is_nan() || **f <= 0.0 || f.is_infinite())
        {
            return Err(DomainError::NonPositiveFrequency {
                minimum: index,
                mode,
                value,
            });
        }
        if self.symmetry_order == 0 {
            return Err(DomainError::NonPositiveSymmetryOrder { minimum: index });
        }
        if self.spin_multiplicity.is_nan()
            || self.spin_multiplicity <= 0.0
            || self.spin_multiplicity.is_infinite()
        {
            return Err(DomainError::NonPositiveMultiplicity {
                minimum: index,
                value: self.spin_multiplicity,
            });
        }
        if let Some((axis, &value)) = self
            .moments_of_inertia
            .iter()
            .enumerate()
            .find(|(_, m)| m.is_nan() || **m < 0.0 || m.is_infinite())
        {
            return Err(DomainError::NegativeMomentOfInertia {
                minimum: index,
                axis,
                value,
            });
        }
        Ok(())
    }
}

/// A validated, non-empty, ordered collection of minima.
///
/// Relative energies are computed once at construction so that every
/// exponential downstream is evaluated on shifted, non-negative energies.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimaSet {
    minima: Vec<Minimum>,
    relative_energies: Vec<f64>,
}

impl MinimaSet {
    /// Validates every minimum and derives the relative energies.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] if the set is empty or any minimum carries an
    /// invalid property.
    pub fn new(minima: Vec<Minimum>) -> Result<Self, DomainError> {
        if minima.is_empty() {
            return Err(DomainError::EmptyMinima);
        }
        for (index, minimum) in minima.iter().enumerate() {
            minimum.validate(index)?;
        }

        let reference = minima
            .iter()
            .map(|m| m.potential_energy)
            .fold(f64::INFINITY, f64::min);
        let relative_energies: Vec<f64> = minima
            .iter()
            .map(|m| m.potential_energy - reference)
            .collect();
        if let Some((minimum, &value)) = relative_energies
            .iter()
            .enumerate()
            .find(|(_, e)| !e.is_finite())
        {
            return Err(DomainError::NonFiniteEnergy { minimum, value });
        }

        Ok(Self {
            minima,
            relative_energies,
        })
    }

    pub fn len(&self) -> usize {
        self.minima.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.minima.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Minimum> {
        self.minima.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Minimum> {
        self.minima.get(index)
    }

    pub fn as_slice(&self) -> &[Minimum] {
        &self.minima
    }

    /// Energies relative to the lowest minimum, in eV. The global minimum is at 0.
    pub fn relative_energies(&self) -> &[f64] {
        &self.relative_energies
    }

    /// Index of the first minimum with zero relative energy.
    pub fn global_minimum_index(&self) -> usize {
        self.relative_energies
            .iter()
            .position(|&e| e == 0.0)
            .unwrap_or(0)
    }

    /// The vibrational mode count shared by every minimum.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InconsistentModeCount`] naming the first minimum
    /// whose mode count differs from that of minimum 0.
    pub fn uniform_mode_count(&self) -> Result<usize, DomainError> {
        let expected = self.minima[0].mode_count();
        match self
            .minima
            .iter()
            .enumerate()
            .find(|(_, m)| m.mode_count() != expected)
        {
            Some((minimum, m)) => Err(DomainError::InconsistentModeCount {
                minimum,
                expected,
                found: m.mode_count(),
            }),
            None => Ok(expected),
        }
    }

    pub fn label(&self, index: usize) -> String {
        match self.minima.get(index).and_then(|m| m.name.as_deref()) {
            Some(name) => name.to_string(),
            None => format!("#{}", index),
        }
    }
}
