use crate::cli::RunArgs;
use crate::config::{self, AppConfig};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use occuprob::{
    core::io::{
        dat::DatSink,
        isomers::IsomerFile,
        traits::{ResultSink, StructureProvider},
    },
    core::symmetry::RotationalSymmetry,
    engine::progress::ProgressReporter,
    workflows::{self, thermo::ThermoResult},
};
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = config::build_config(&args)?;

    let result = compute(&app_config)?;

    let mut sink = DatSink::new(&app_config.output_prefix);
    sink.write_probability(&result.grid, &result.probability)?;
    sink.write_heat_capacity(&result.grid, &result.heat_capacity)?;

    print_summary(&result);
    println!(
        "✓ Occupation probabilities written to: {}",
        sink.probability_path().display()
    );
    println!(
        "✓ Heat capacity written to: {}",
        sink.heat_capacity_path().display()
    );
    Ok(())
}

fn compute(app_config: &AppConfig) -> Result<ThermoResult> {
    info!("Loading isomers from {:?}", &app_config.input_path);
    let minima = IsomerFile::from_path(&app_config.input_path)?
        .with_analyzer(RotationalSymmetry::new(app_config.symmetry_tolerance))
        .load_minima()?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Evaluating {} isomer(s)...", minima.len());
    info!("Invoking the thermodynamics workflow...");
    let result = workflows::thermo::run(&minima, &app_config.core_config, &reporter);
    progress_handler.finish();
    result.map_err(Into::into)
}

fn print_summary(result: &ThermoResult) {
    let dominant = result.dominant_minima();
    let (Some(&first), Some(&last)) = (dominant.first(), dominant.last()) else {
        return;
    };
    let values = result.grid.values();
    println!(
        "Most probable isomer: {} at {} K, {} at {} K.",
        result.labels[first],
        values[0],
        result.labels[last],
        values[values.len() - 1]
    );

    let peak = result
        .heat_capacity
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_finite())
        .max_by(|a, b| a.1.total_cmp(b.1));
    if let Some((j, capacity)) = peak {
        println!(
            "Heat capacity maximum: {:.4} k_B at {} K.",
            capacity, values[j]
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ElectronicFlags, VibrationalFlags};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const INPUT: &str = r#"
        [[isomer]]
        name = "A"
        energy = 0.0
        frequencies = [5.0, 6.0]
        symmetry-order = 2
        moments = [1.0, 2.0, 3.0]

        [[isomer]]
        name = "B"
        energy = 0.02
        multiplicity = 3
        frequencies = [2.0, 3.0]
        moments = [2.0, 2.0, 4.0]
    "#;

    fn args_for(input: PathBuf, output: PathBuf) -> RunArgs {
        RunArgs {
            input,
            output: Some(output),
            config: None,
            electronic: ElectronicFlags {
                electronic: false,
                spin: true,
            },
            vibrational: VibrationalFlags {
                classical: false,
                quantum: true,
            },
            rotational: true,
            min_temp: Some(0.0),
            max_temp: Some(100.0),
            step: Some(10.0),
            symmetry_tolerance: None,
            set_values: vec![],
        }
    }

    #[test]
    fn run_writes_probability_and_heat_capacity_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("isomers.toml");
        fs::write(&input, INPUT).unwrap();
        let prefix = dir.path().join("result");

        run(args_for(input, prefix.clone())).unwrap();

        let probability = fs::read_to_string(dir.path().join("result_p.dat")).unwrap();
        let capacity = fs::read_to_string(dir.path().join("result_c.dat")).unwrap();
        assert_eq!(probability.lines().count(), 11);
        assert_eq!(capacity.lines().count(), 11);
        assert_eq!(
            probability.lines().next().unwrap().split_whitespace().count(),
            3
        );
    }

    #[test]
    fn run_reports_missing_input() {
        let dir = tempdir().unwrap();
        let result = run(args_for(
            dir.path().join("missing.toml"),
            dir.path().join("result"),
        ));
        assert!(matches!(result, Err(crate::error::CliError::Input(_))));
    }
}
