//! Core 2-D space-colonization tree growth library.
//!
//! Main components:
//! - [`tree`] — the growth engine: construction, stepping, snapshots.
//! - [`phases`] — the phases of one growth iteration.
//! - [`branch`] — branches and the position-unique branch arena.
//! - [`attractor`] — attraction points and their scattering.
//! - [`crown`] — the rectangle attraction points are scattered in.
//! - [`config`] — parameter ranges and concrete growth parameters.
//! - [`influence_buffer`] — per-iteration grow-direction accumulators.
//! - [`vector`] — vector alias and normalization policy.
//! - [`error`] — configuration errors.
//! - [`types`] — shared ids and keys.

pub mod attractor;
pub mod branch;
pub mod config;
pub mod crown;
pub mod error;
pub mod influence_buffer;
pub mod phases;
pub mod tree;
pub mod types;
pub mod vector;

pub use config::{GrowthParams, ParamRange, TreeConfig};
pub use error::ConfigError;
pub use tree::{DoneReason, GrowthState, StepOutcome, Tree, TreeSnapshot, TreeStatus};
pub use vector::Vector2;
