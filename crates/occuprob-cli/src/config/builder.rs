use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileElectronicModel, FileVibrationalModel};
use super::models::AppConfig;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use occuprob::engine::config as core_config;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub fn build_config(args: &RunArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let dof_file = file_config.dofs.take().unwrap_or_default();
    let electronic = match (args.electronic.electronic, args.electronic.spin) {
        (true, _) => core_config::ElectronicModel::Degenerate,
        (_, true) => core_config::ElectronicModel::Spin,
        _ => dof_file.electronic.map(Into::into).unwrap_or_default(),
    };
    let vibrational = match (args.vibrational.classical, args.vibrational.quantum) {
        (true, _) => core_config::VibrationalModel::Classical,
        (_, true) => core_config::VibrationalModel::Quantum,
        _ => dof_file.vibrational.map(Into::into).unwrap_or_default(),
    };
    let rotational = args.rotational || dof_file.rotational.unwrap_or(false);
    let dofs = core_config::DofSelection {
        electronic,
        vibrational,
        rotational,
    };

    let temperature_file = file_config.temperature.take().unwrap_or_default();
    let min_temperature = args
        .min_temp
        .or(temperature_file.min)
        .unwrap_or(defaults.min_temperature);
    let max_temperature = args
        .max_temp
        .or(temperature_file.max)
        .unwrap_or(defaults.max_temperature);
    let temperature_step = args
        .step
        .or(temperature_file.step)
        .unwrap_or(defaults.temperature_step);

    let symmetry_tolerance = args
        .symmetry_tolerance
        .or(file_config.symmetry.take().and_then(|s| s.tolerance))
        .unwrap_or(defaults.symmetry_tolerance);
    if symmetry_tolerance.is_nan() || symmetry_tolerance <= 0.0 {
        return Err(CliError::Argument(format!(
            "Symmetry tolerance must be positive, got {}",
            symmetry_tolerance
        )));
    }

    let core_config = core_config::ThermoConfigBuilder::new()
        .dofs(dofs)
        .min_temperature(min_temperature)
        .max_temperature(max_temperature)
        .temperature_step(temperature_step)
        .build()
        .map_err(|e| match e {
            core_config::ConfigError::NoDofSelected => CliError::Argument(
                "You must include at least one partition function (-e/-s, -c/-Q, -r).".to_string(),
            ),
            other => CliError::Config(other.to_string()),
        })?;

    // Checked here so that a bad range is reported before the input is read.
    core_config
        .temperatures
        .to_grid()
        .map_err(|e| CliError::Argument(e.to_string()))?;

    let output_prefix = args
        .output
        .clone()
        .or(file_config.output.take())
        .unwrap_or_else(|| default_output_prefix(&args.input));

    Ok(AppConfig {
        input_path: args.input.clone(),
        output_prefix,
        symmetry_tolerance,
        core_config,
    })
}

/// The input path with its extension removed, e.g. `data/cluster.toml` becomes `data/cluster`.
fn default_output_prefix(input: &Path) -> PathBuf {
    input.with_extension("")
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "output" => config.output = Some(PathBuf::from(value_str)),
            "temperature.min" => {
                config.temperature.get_or_insert_with(Default::default).min =
                    Some(parse_value(key, value_str, "float")?);
            }
            "temperature.max" => {
                config.temperature.get_or_insert_with(Default::default).max =
                    Some(parse_value(key, value_str, "float")?);
            }
            "temperature.step" => {
                config.temperature.get_or_insert_with(Default::default).step =
                    Some(parse_value(key, value_str, "float")?);
            }
            "symmetry.tolerance" => {
                config.symmetry.get_or_insert_with(Default::default).tolerance =
                    Some(parse_value(key, value_str, "float")?);
            }
            "dofs.rotational" => {
                config.dofs.get_or_insert_with(Default::default).rotational =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            "dofs.electronic" => {
                let model = FileElectronicModel::parse(value_str).ok_or_else(|| {
                    CliError::Config(format!(
                        "Invalid value for {}: {}. Expected none, degenerate or spin.",
                        key, value_str
                    ))
                })?;
                config.dofs.get_or_insert_with(Default::default).electronic = Some(model);
            }
            "dofs.vibrational" => {
                let model = FileVibrationalModel::parse(value_str).ok_or_else(|| {
                    CliError::Config(format!(
                        "Invalid value for {}: {}. Expected none, classical or quantum.",
                        key, value_str
                    ))
                })?;
                config.dofs.get_or_insert_with(Default::default).vibrational = Some(model);
            }
            _ => {
                return Err(CliError::Config(format!("Unknown --set key: '{}'", key)));
            }
        }
    }
    Ok(config)
}
