use super::extxyz::{self, ExtXyzError};
use super::traits::{StructureProvider, SymmetryAnalyzer};
use crate::core::error::DomainError;
use crate::core::models::geometry::{Geometry, GeometryAtom, GeometryError};
use crate::core::models::minimum::{MinimaSet, Minimum};
use crate::core::symmetry::{RotationalSymmetry, SymmetryError};
use nalgebra::Point3;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum IsomerFileError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Extended XYZ parsing error for '{path}': {source}")]
    ExtXyz {
        path: String,
        source: ExtXyzError,
    },
    #[error("Isomer {isomer} has an invalid geometry: {source}")]
    Geometry {
        isomer: usize,
        source: GeometryError,
    },
    #[error("Symmetry analysis failed for isomer {isomer}: {source}")]
    Symmetry {
        isomer: usize,
        source: SymmetryError,
    },
    #[error("Invalid isomer data: {0}")]
    Domain(#[from] DomainError),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AtomRecord {
    pub element: String,
    pub position: [f64; 3],
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct IsomerRecord {
    pub name: Option<String>,
    pub energy: f64,
    #[serde(default = "default_multiplicity")]
    pub multiplicity: f64,
    #[serde(default)]
    pub frequencies: Vec<f64>,
    pub symmetry_order: Option<u32>,
    pub moments: Option<[f64; 3]>,
    #[serde(default)]
    pub atoms: Vec<AtomRecord>,
}

fn default_multiplicity() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IsomerDocument {
    #[serde(rename = "isomer", default)]
    isomers: Vec<IsomerRecord>,
}

/// A TOML document listing isomers as `[[isomer]]` tables.
///
/// ```toml
/// [[isomer]]
/// name = "H2O"
/// energy = -14.22          # eV
/// multiplicity = 1
/// frequencies = [48.1, 113.4, 116.3]   # THz
/// atoms = [
///     { element = "O", position = [0.0, 0.0, 0.1173] },
///     { element = "H", position = [0.0, 0.7572, -0.4692] },
///     { element = "H", position = [0.0, -0.7572, -0.4692] },
/// ]
/// ```
///
/// `moments` (amu·Å²) and `symmetry-order` may be given explicitly; when they
/// are absent they are derived from `atoms`, the latter through the configured
/// [`SymmetryAnalyzer`]. Isomers without either fall back to zero moments and a
/// symmetry order of 1.
///
/// Extended XYZ files (`.xyz`, `.extxyz`) are read as well, one isomer per
/// frame; see [`extxyz::read_records`] for the recognised properties.
#[derive(Debug, Clone)]
pub struct IsomerFile<A = RotationalSymmetry> {
    records: Vec<IsomerRecord>,
    analyzer: A,
}

impl IsomerFile<RotationalSymmetry> {
    /// Reads an isomer file, choosing the format from the extension: `xyz` and
    /// `extxyz` are extended XYZ, anything else is TOML.
    pub fn from_path(path: &Path) -> Result<Self, IsomerFileError> {
        let path_label = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| IsomerFileError::Io {
            path: path_label.clone(),
            source: e,
        })?;
        let is_extxyz = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case("xyz") || ext.eq_ignore_ascii_case("extxyz")
            });
        if is_extxyz {
            Self::parse_extxyz(&content, &path_label)
        } else {
            Self::parse_toml(&content, &path_label)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, IsomerFileError> {
        Self::parse_toml(content, "<string>")
    }

    pub fn from_extxyz_str(content: &str) -> Result<Self, IsomerFileError> {
        Self::parse_extxyz(content, "<string>")
    }

    fn parse_toml(content: &str, origin: &str) -> Result<Self, IsomerFileError> {
        let document: IsomerDocument =
            toml::from_str(content).map_err(|e| IsomerFileError::Toml {
                path: origin.to_string(),
                source: e,
            })?;
        Ok(Self::from_records(document.isomers, origin))
    }

    fn parse_extxyz(content: &str, origin: &str) -> Result<Self, IsomerFileError> {
        let records = extxyz::read_records(content).map_err(|e| IsomerFileError::ExtXyz {
            path: origin.to_string(),
            source: e,
        })?;
        Ok(Self::from_records(records, origin))
    }

    fn from_records(records: Vec<IsomerRecord>, origin: &str) -> Self {
        debug!(isomers = records.len(), "Parsed isomer file '{}'.", origin);
        Self {
            records,
            analyzer: RotationalSymmetry::default(),
        }
    }
}

impl<A> IsomerFile<A> {
    /// Replaces the analyzer used for isomers without an explicit symmetry order.
    pub fn with_analyzer<B>(self, analyzer: B) -> IsomerFile<B> {
        IsomerFile {
            records: self.records,
            analyzer,
        }
    }

    pub fn records(&self) -> &[IsomerRecord] {
        &self.records
    }
}

impl<A: SymmetryAnalyzer> IsomerFile<A> {
    fn resolve(&self, index: usize, record: &IsomerRecord) -> Result<Minimum, IsomerFileError> {
        let geometry = if record.atoms.is_empty() {
            None
        } else {
            let atoms = record
                .atoms
                .iter()
                .map(|a| {
                    let [x, y, z] = a.position;
                    GeometryAtom::new(&a.element, Point3::new(x, y, z))
                })
                .collect();
            Some(
                Geometry::new(atoms).map_err(|source| IsomerFileError::Geometry {
                    isomer: index,
                    source,
                })?,
            )
        };

        let moments = match (record.moments, &geometry) {
            (Some(moments), _) => moments,
            (None, Some(geometry)) => geometry.principal_moments(),
            (None, None) => {
                debug!(isomer = index, "No moments or atoms given; using zero moments.");
                [0.0; 3]
            }
        };

        let symmetry_order = match (record.symmetry_order, &geometry) {
            (Some(order), _) => order,
            (None, Some(geometry)) => self.analyzer.symmetry_order(geometry).map_err(|source| {
                IsomerFileError::Symmetry {
                    isomer: index,
                    source,
                }
            })?,
            (None, None) => {
                warn!(
                    isomer = index,
                    "No symmetry order or atoms given; assuming a symmetry order of 1."
                );
                1
            }
        };

        let mut minimum = Minimum::new(record.energy)
            .with_frequencies(record.frequencies.clone())
            .with_spin_multiplicity(record.multiplicity)
            .with_symmetry_order(symmetry_order)
            .with_moments_of_inertia(moments);
        if let Some(name) = &record.name {
            minimum = minimum.with_name(name.clone());
        }
        Ok(minimum)
    }
}

impl<A: SymmetryAnalyzer> StructureProvider for IsomerFile<A> {
    type Error = IsomerFileError;

    #[instrument(skip_all, name = "isomer_file_load")]
    fn load_minima(&self) -> Result<MinimaSet, Self::Error> {
        let minima = self
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| self.resolve(index, record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MinimaSet::new(minima)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const WATER_AND_HYDROGEN: &str = r#"
        [[isomer]]
        name = "water"
        energy = -14.0
        frequencies = [48.0, 113.0, 116.0]
        atoms = [
            { element = "O", position = [0.0, 0.0, 0.1173] },
            { element = "H", position = [0.0, 0.7572, -0.4692] },
            { element = "H", position = [0.0, -0.7572, -0.4692] },
        ]

        [[isomer]]
        energy = -13.5
        multiplicity = 3
        frequencies = [40.0, 100.0, 120.0]
        symmetry-order = 6
        moments = [1.0, 2.0, 3.0]
    "#;

    struct FixedOrder(u32);

    impl SymmetryAnalyzer for FixedOrder {
        fn symmetry_order(&self, _geometry: &Geometry) -> Result<u32, SymmetryError> {
            Ok(self.0)
        }
    }

    #[test]
    fn load_minima_resolves_explicit_and_derived_properties() {
        let file = IsomerFile::from_toml_str(WATER_AND_HYDROGEN).unwrap();
        let minima = file.load_minima().unwrap();

        assert_eq!(minima.len(), 2);
        assert_eq!(minima.relative_energies(), &[0.0, 0.5]);

        let water = minima.get(0).unwrap();
        assert_eq!(water.name.as_deref(), Some("water"));
        assert_eq!(water.symmetry_order, 2);
        assert_eq!(water.spin_multiplicity, 1.0);
        assert!(water.moments_of_inertia.iter().all(|&m| m > 0.0));

        let second = minima.get(1).unwrap();
        assert_eq!(second.symmetry_order, 6);
        assert_eq!(second.spin_multiplicity, 3.0);
        assert_eq!(second.moments_of_inertia, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn custom_analyzer_is_used_for_missing_symmetry_orders() {
        let file = IsomerFile::from_toml_str(WATER_AND_HYDROGEN)
            .unwrap()
            .with_analyzer(FixedOrder(5));
        let minima = file.load_minima().unwrap();
        assert_eq!(minima.get(0).unwrap().symmetry_order, 5);
        assert_eq!(minima.get(1).unwrap().symmetry_order, 6);
    }

    #[test]
    fn isomer_without_geometry_defaults_to_order_one_and_zero_moments() {
        let file = IsomerFile::from_toml_str("[[isomer]]\nenergy = 0.0\n").unwrap();
        let minima = file.load_minima().unwrap();
        let minimum = minima.get(0).unwrap();
        assert_eq!(minimum.symmetry_order, 1);
        assert_eq!(minimum.moments_of_inertia, [0.0; 3]);
        assert!(minimum.frequencies.is_empty());
    }

    #[test]
    fn from_path_reads_file_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("isomers.toml");
        fs::write(&path, WATER_AND_HYDROGEN).unwrap();
        let file = IsomerFile::from_path(&path).unwrap();
        assert_eq!(file.records().len(), 2);
    }

    const HYDROGEN_FRAMES: &str = "\
2
name=H2 energy=-6.5 multiplicity=1 frequencies=\"131.9\"
H 0.0 0.0 0.5
H 0.0 0.0 -0.5
3
name=H3 energy=-5.9 multiplicity=2 frequencies=\"50.0 80.0 80.0\"
H 0.577350 0.0 0.0
H -0.288675 0.5 0.0
H -0.288675 -0.5 0.0
";

    #[test]
    fn extxyz_frames_derive_moments_and_symmetry_from_atoms() {
        let minima = IsomerFile::from_extxyz_str(HYDROGEN_FRAMES)
            .unwrap()
            .load_minima()
            .unwrap();
        assert_eq!(minima.len(), 2);
        assert!((minima.relative_energies()[1] - 0.6).abs() < 1e-12);

        let dimer = minima.get(0).unwrap();
        assert_eq!(dimer.name.as_deref(), Some("H2"));
        assert_eq!(dimer.frequencies, vec![131.9]);
        assert_eq!(dimer.symmetry_order, 2);
        assert!(dimer.moments_of_inertia[0].abs() < 1e-9);
        assert!((dimer.moments_of_inertia[1] - 0.504).abs() < 1e-3);
        assert!((dimer.moments_of_inertia[2] - 0.504).abs() < 1e-3);

        let trimer = minima.get(1).unwrap();
        assert_eq!(trimer.spin_multiplicity, 2.0);
        assert_eq!(trimer.symmetry_order, 6);
        assert!((trimer.moments_of_inertia[2] - 1.008).abs() < 1e-3);
    }

    #[test]
    fn from_path_dispatches_on_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hydrogen.xyz");
        fs::write(&path, HYDROGEN_FRAMES).unwrap();
        let file = IsomerFile::from_path(&path).unwrap();
        assert_eq!(file.records().len(), 2);
        assert_eq!(file.records()[1].atoms.len(), 3);

        let as_toml = dir.path().join("hydrogen.toml");
        fs::write(&as_toml, HYDROGEN_FRAMES).unwrap();
        assert!(matches!(
            IsomerFile::from_path(&as_toml),
            Err(IsomerFileError::Toml { .. })
        ));
    }

    #[test]
    fn malformed_extxyz_is_reported_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.extxyz");
        fs::write(&path, "1\nmultiplicity=2\nH 0 0 0\n").unwrap();
        match IsomerFile::from_path(&path) {
            Err(IsomerFileError::ExtXyz { path: label, source }) => {
                assert!(label.ends_with("broken.extxyz"));
                assert_eq!(
                    source,
                    ExtXyzError::MissingProperty {
                        frame: 0,
                        key: "energy"
                    }
                );
            }
            other => panic!("Expected an extended XYZ error, got {:?}", other),
        }
    }

    #[test]
    fn from_path_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = IsomerFile::from_path(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(IsomerFileError::Io { .. })));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let result = IsomerFile::from_toml_str("this is not toml");
        assert!(matches!(result, Err(IsomerFileError::Toml { .. })));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = IsomerFile::from_toml_str("[[isomer]]\nenergy = 0.0\ncharge = 1\n");
        assert!(matches!(result, Err(IsomerFileError::Toml { .. })));
    }

    #[test]
    fn unknown_element_is_reported_with_isomer_index() {
        let file = IsomerFile::from_toml_str(
            "[[isomer]]\nenergy = 0.0\natoms = [{ element = \"Zz\", position = [0.0, 0.0, 0.0] }]\n",
        )
        .unwrap();
        let result = file.load_minima();
        assert!(matches!(
            result,
            Err(IsomerFileError::Geometry { isomer: 0, .. })
        ));
    }

    #[test]
    fn empty_document_is_a_domain_error() {
        let file = IsomerFile::from_toml_str("").unwrap();
        assert!(matches!(
            file.load_minima(),
            Err(IsomerFileError::Domain(DomainError::EmptyMinima))
        ));
    }

    #[test]
    fn invalid_frequency_is_a_domain_error() {
        let file =
            IsomerFile::from_toml_str("[[isomer]]\nenergy = 0.0\nfrequencies = [1.0, -2.0]\n")
                .unwrap();
        assert!(matches!(
            file.load_minima(),
            Err(IsomerFileError::Domain(DomainError::NonPositiveFrequency { .. }))
        ));
    }
}
