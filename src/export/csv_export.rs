//! CSV time-series export for simulation metrics.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::state::SimulationMetrics;

/// Record for CSV time-series export
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesRecord {
    pub frame: u64,
    /// Simulation time (seconds)
    pub time_sec: f64,
    pub max_length_error: f32,
    pub mean_relative_stretch: f32,
    pub mean_tip_displacement: f32,
    pub max_vertex_speed: f32,
    pub kinetic_energy: f32,
}

impl From<&SimulationMetrics> for TimeSeriesRecord {
    fn from(m: &SimulationMetrics) -> Self {
        Self {
            frame: m.frame,
            time_sec: m.simulation_time_sec,
            max_length_error: m.max_length_error,
            mean_relative_stretch: m.mean_relative_stretch,
            mean_tip_displacement: m.mean_tip_displacement,
            max_vertex_speed: m.max_vertex_speed,
            kinetic_energy: m.kinetic_energy,
        }
    }
}

/// CSV exporter for time-series data
pub struct CsvExporter {
    writer: csv::Writer<File>,
    /// Sample interval in seconds
    sample_interval_sec: f64,
    /// Last sample time
    last_sample_time: f64,
    /// Path to output file
    path: PathBuf,
}

impl CsvExporter {
    /// Create a new CSV exporter in `exports/`
    ///
    /// Filename is auto-generated with timestamp.
    pub fn new(sample_interval_sec: f64) -> Result<Self> {
        Self::new_in("exports", sample_interval_sec)
    }

    /// Create a new CSV exporter in `dir`, creating it if needed
    pub fn new_in<P: AsRef<Path>>(dir: P, sample_interval_sec: f64) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating export directory {}", dir.display()))?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("timeseries_{}.csv", timestamp));

        let file = File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self {
            writer,
            sample_interval_sec,
            last_sample_time: -sample_interval_sec, // Ensure first sample is recorded
            path,
        })
    }

    /// Record a sample if the interval has elapsed
    pub fn maybe_record(&mut self, metrics: &SimulationMetrics) -> Result<bool> {
        let time = metrics.simulation_time_sec;

        if time - self.last_sample_time >= self.sample_interval_sec {
            self.record(metrics)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Force record a sample regardless of interval
    pub fn record(&mut self, metrics: &SimulationMetrics) -> Result<()> {
        let record = TimeSeriesRecord::from(metrics);
        self.writer.serialize(&record)?;
        self.last_sample_time = metrics.simulation_time_sec;
        Ok(())
    }

    /// Finish writing and return the output path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        log::info!("CSV export completed: {}", self.path.display());
        Ok(self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
