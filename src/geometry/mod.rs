//! Geometry module for hair strand models.
//!
//! Contains the binary asset codec, the rest-pose frame precomputation,
//! the immutable strand model and the procedural groom generator.

pub mod asset;
pub mod frames;
mod groom;
mod model;

pub use asset::{load_asset, read_asset, save_asset, write_asset, LoadError, RawAsset, RootTriangle};
pub use frames::StrandFrames;
pub use model::{StrandModel, StrandVertex, MIN_SEGMENT_LENGTH};
