//! State management for strand simulation.
//!
//! Holds the mutable per-instance buffers and the metrics derived from
//! them.

mod instance;
mod metrics;

pub use instance::StrandInstance;
pub use metrics::SimulationMetrics;
