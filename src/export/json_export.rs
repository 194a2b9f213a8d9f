//! JSON state export for simulation snapshots.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::config::HairConfig;
use crate::state::{SimulationMetrics, StrandInstance};

/// Full state export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateExport {
    /// Export timestamp
    pub exported_at: String,
    /// Export version for compatibility
    pub version: String,
    pub metrics: SimulationMetrics,
    pub config: HairConfig,
    /// Current positions, strand-major
    pub positions: Vec<[f32; 3]>,
    /// Previous positions, strand-major
    pub previous_positions: Vec<[f32; 3]>,
}

impl StateExport {
    pub fn capture(instance: &StrandInstance) -> Self {
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: "1.0.0".to_string(),
            metrics: SimulationMetrics::measure(instance),
            config: instance.config().clone(),
            positions: instance.positions().iter().map(|p| p.to_array()).collect(),
            previous_positions: instance
                .previous_positions()
                .iter()
                .map(|p| p.to_array())
                .collect(),
        }
    }
}

/// Export current instance state to `exports/state_YYYYMMDD_HHMMSS.json`
///
/// Returns the path to the saved JSON file.
pub fn export_state_json(instance: &StrandInstance) -> Result<PathBuf> {
    let dir = PathBuf::from("exports");
    std::fs::create_dir_all(&dir)?;

    let filename = format!("state_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);
    export_state_json_to(instance, &path)?;
    Ok(path)
}

/// Export state to a specific file
pub fn export_state_json_to(instance: &StrandInstance, path: &Path) -> Result<()> {
    let export = StateExport::capture(instance);

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &export)?;

    log::info!("JSON state exported: {}", path.display());
    Ok(())
}
