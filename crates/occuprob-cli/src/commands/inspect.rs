use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use occuprob::core::io::isomers::IsomerFile;
use occuprob::core::io::traits::StructureProvider;
use occuprob::core::models::minimum::MinimaSet;
use occuprob::core::symmetry::RotationalSymmetry;
use std::fmt::Write;
use tracing::info;

const DEFAULT_SYMMETRY_TOLERANCE: f64 = 0.05;

pub fn run(args: InspectArgs) -> Result<()> {
    let tolerance = args.symmetry_tolerance.unwrap_or(DEFAULT_SYMMETRY_TOLERANCE);
    info!("Inspecting isomers in {:?}", &args.input);
    let minima = IsomerFile::from_path(&args.input)?
        .with_analyzer(RotationalSymmetry::new(tolerance))
        .load_minima()?;

    print!("{}", render_table(&minima)?);
    Ok(())
}

fn render_table(minima: &MinimaSet) -> Result<String> {
    let mut out = String::new();
    let fmt_err = |e: std::fmt::Error| CliError::Other(e.into());

    writeln!(
        out,
        "{:<4} {:<16} {:>12} {:>6} {:>4} {:>6} {:>30}",
        "#", "Label", "ΔE (eV)", "Mult.", "σ", "Modes", "Moments (amu·Å²)"
    )
    .map_err(fmt_err)?;

    for (k, minimum) in minima.iter().enumerate() {
        let [a, b, c] = minimum.moments_of_inertia;
        writeln!(
            out,
            "{:<4} {:<16} {:>12.6} {:>6} {:>4} {:>6} {:>30}",
            k,
            minima.label(k),
            minima.relative_energies()[k],
            minimum.spin_multiplicity,
            minimum.symmetry_order,
            minimum.mode_count(),
            format!("{:.3} {:.3} {:.3}", a, b, c)
        )
        .map_err(fmt_err)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use occuprob::core::models::minimum::Minimum;

    #[test]
    fn table_lists_every_isomer_with_relative_energy() {
        let minima = MinimaSet::new(vec![
            Minimum::new(-2.0).with_name("ring").with_frequencies(vec![1.0, 2.0]),
            Minimum::new(-1.5)
                .with_symmetry_order(6)
                .with_moments_of_inertia([1.0, 2.0, 3.0]),
        ])
        .unwrap();

        let table = render_table(&minima).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("ring"));
        assert!(lines[1].contains("0.000000"));
        assert!(lines[2].starts_with("1    #1"));
        assert!(lines[2].contains("0.500000"));
        assert!(lines[2].contains("1.000 2.000 3.000"));
    }
}
