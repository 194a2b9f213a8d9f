//! Configuration module for loading simulation parameters.
//!
//! Parameters load from JSON and fall back to defaults when a file is
//! missing or malformed.

mod parameters;

pub use parameters::{
    GroomParameters, HairConfig, Parameters, SimulationParameters, GRAVITY_M_PER_SEC2,
    MAX_LOCAL_CONSTRAINT,
};
