use super::traits::ResultSink;
use crate::core::models::grid::TemperatureGrid;
use nalgebra::{DMatrix, DVector};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Failed to flush '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Result has {found} temperature columns but the grid has {expected}")]
    Shape { expected: usize, found: usize },
}

/// Writes results as whitespace-separated text tables.
///
/// Each file has one row per temperature: the temperature itself followed by
/// the values at that temperature (one per minimum for probabilities, a single
/// value for the heat capacity).
#[derive(Debug, Clone)]
pub struct DatSink {
    prefix: PathBuf,
}

impl DatSink {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn probability_path(&self) -> PathBuf {
        self.with_suffix("_p.dat")
    }

    pub fn heat_capacity_path(&self) -> PathBuf {
        self.with_suffix("_c.dat")
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self.prefix.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn write_rows<F>(path: &Path, grid: &TemperatureGrid, row: F) -> Result<(), SinkError>
    where
        F: Fn(usize) -> Vec<f64>,
    {
        let path_label = path.to_string_lossy().to_string();
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_path(path)
            .map_err(|e| SinkError::Csv {
                path: path_label.clone(),
                source: e,
            })?;

        for (j, &temperature) in grid.iter().enumerate() {
            let record = std::iter::once(temperature)
                .chain(row(j))
                .map(|value| format!("{:.18e}", value));
            writer.write_record(record).map_err(|e| SinkError::Csv {
                path: path_label.clone(),
                source: e,
            })?;
        }

        writer.flush().map_err(|e| SinkError::Io {
            path: path_label.clone(),
            source: e,
        })?;
        info!("Wrote {} rows to '{}'.", grid.len(), path_label);
        Ok(())
    }
}

impl ResultSink for DatSink {
    type Error = SinkError;

    fn write_probability(
        &mut self,
        grid: &TemperatureGrid,
        probability: &DMatrix<f64>,
    ) -> Result<(), Self::Error> {
        if probability.ncols() != grid.len() {
            return Err(SinkError::Shape {
                expected: grid.len(),
                found: probability.ncols(),
            });
        }
        Self::write_rows(&self.probability_path(), grid, |j| {
            probability.column(j).iter().copied().collect()
        })
    }

    fn write_heat_capacity(
        &mut self,
        grid: &TemperatureGrid,
        heat_capacity: &DVector<f64>,
    ) -> Result<(), Self::Error> {
        if heat_capacity.len() != grid.len() {
            return Err(SinkError::Shape {
                expected: grid.len(),
                found: heat_capacity.len(),
            });
        }
        Self::write_rows(&self.heat_capacity_path(), grid, |j| vec![heat_capacity[j]])
    }
}
