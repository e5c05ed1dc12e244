use crate::error::{CliError, Result};
use occuprob::engine::config as core_config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileElectronicModel {
    None,
    Degenerate,
    Spin,
}

impl From<FileElectronicModel> for core_config::ElectronicModel {
    fn from(p: FileElectronicModel) -> Self {
        match p {
            FileElectronicModel::None => Self::None,
            FileElectronicModel::Degenerate => Self::Degenerate,
            FileElectronicModel::Spin => Self::Spin,
        }
    }
}

impl FileElectronicModel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "degenerate" => Some(Self::Degenerate),
            "spin" => Some(Self::Spin),
            _ => None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileVibrationalModel {
    None,
    Classical,
    Quantum,
}

impl From<FileVibrationalModel> for core_config::VibrationalModel {
    fn from(p: FileVibrationalModel) -> Self {
        match p {
            FileVibrationalModel::None => Self::None,
            FileVibrationalModel::Classical => Self::Classical,
            FileVibrationalModel::Quantum => Self::Quantum,
        }
    }
}

impl FileVibrationalModel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "classical" => Some(Self::Classical),
            "quantum" => Some(Self::Quantum),
            _ => None,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileDofConfig {
    pub electronic: Option<FileElectronicModel>,
    pub vibrational: Option<FileVibrationalModel>,
    pub rotational: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileTemperatureConfig {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileSymmetryConfig {
    pub tolerance: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub output: Option<PathBuf>,
    pub dofs: Option<FileDofConfig>,
    pub temperature: Option<FileTemperatureConfig>,
    pub symmetry: Option<FileSymmetryConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading run configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn from_file_parses_every_section() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(
            &path,
            r#"
            output = "results/cluster"

            [dofs]
            electronic = "spin"
            vibrational = "quantum"
            rotational = true

            [temperature]
            min = 10.0
            max = 800.0
            step = 5.0

            [symmetry]
            tolerance = 0.1
            "#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(config.output, Some(PathBuf::from("results/cluster")));
        let dofs = config.dofs.unwrap();
        assert_eq!(dofs.electronic, Some(FileElectronicModel::Spin));
        assert_eq!(dofs.vibrational, Some(FileVibrationalModel::Quantum));
        assert_eq!(dofs.rotational, Some(true));
        assert_eq!(config.temperature.unwrap().step, Some(5.0));
        assert_eq!(config.symmetry.unwrap().tolerance, Some(0.1));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, "[temperature]\nmaximum = 10.0\n").unwrap();
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn model_names_parse_from_strings() {
        assert_eq!(
            FileElectronicModel::parse("degenerate"),
            Some(FileElectronicModel::Degenerate)
        );
        assert_eq!(
            FileVibrationalModel::parse("classical"),
            Some(FileVibrationalModel::Classical)
        );
        assert_eq!(FileVibrationalModel::parse("anharmonic"), None);
    }
}
