//! Generation parameters and the ranges they are drawn from.
//!
//! A [`TreeConfig`] describes closed ranges for every parameter. Sampling
//! it with a random source yields concrete [`GrowthParams`], which is what
//! the engine actually runs with.

use crate::error::ConfigError;
use rand::{
    Rng,
    distr::{Uniform, uniform::SampleUniform},
};
use serde::Deserialize;
use std::{fmt::Display, fs, path::Path};

/// Size assigned to every newly created branch.
pub const INITIAL_SIZE: f64 = 0.002;

/// Amount a parent's size exceeds its child's after thickening.
pub const GROW_INCREMENT: f64 = 0.002;

/// A closed range `[min, max]` a parameter is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ParamRange<T> {
    pub min: T,
    pub max: T,
}

impl<T> ParamRange<T>
where
    T: SampleUniform + PartialOrd + Copy + Display,
{
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Fails unless the range can be sampled: bounds in order, finite, and
    /// with a finite width.
    pub fn check(&self, name: &'static str) -> Result<(), ConfigError> {
        Uniform::new_inclusive(self.min, self.max)
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidRange {
                name,
                min: self.min.to_string(),
                max: self.max.to_string(),
                reason: e.to_string(),
            })
    }

    /// Draws a value uniformly from the closed range.
    ///
    /// ### Panics
    /// Panics if the range cannot be sampled; call [`ParamRange::check`] first.
    pub fn sample(&self, rng: &mut impl Rng) -> T {
        rng.random_range(self.min..=self.max)
    }
}

/// Ranges for every generation parameter.
///
/// Missing fields in a TOML file fall back to the defaults, so a config file
/// only needs to name what it changes:
///
/// ```toml
/// canvas_height = 400.0
///
/// [branch_length]
/// min = 3.0
/// max = 3.0
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    pub attraction_point_count: ParamRange<usize>,
    /// Height of the area the tree should fit in.
    pub canvas_height: f64,
    /// Space kept free above the crown.
    pub margin: f64,
    pub trunk_height: ParamRange<f64>,
    pub crown_width: ParamRange<f64>,
    /// Fraction of `canvas_height - margin - trunk_height` used as the crown height.
    pub crown_height_fraction: ParamRange<f64>,
    pub min_distance: ParamRange<f64>,
    pub max_distance: ParamRange<f64>,
    pub branch_length: ParamRange<f64>,
    pub initial_size: f64,
    pub grow_increment: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        // Trunk and crown width are 5-35% and 20-75% of the canvas height.
        Self {
            attraction_point_count: ParamRange::new(400, 600),
            canvas_height: 300.0,
            margin: 20.0,
            trunk_height: ParamRange::new(15.0, 105.0),
            crown_width: ParamRange::new(60.0, 225.0),
            crown_height_fraction: ParamRange::new(0.75, 1.0),
            min_distance: ParamRange::new(3.0, 8.0),
            max_distance: ParamRange::new(15.0, 30.0),
            branch_length: ParamRange::new(4.0, 10.0),
            initial_size: INITIAL_SIZE,
            grow_increment: GROW_INCREMENT,
        }
    }
}

impl TreeConfig {
    /// Parses a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn check_ranges(&self) -> Result<(), ConfigError> {
        self.attraction_point_count.check("attraction_point_count")?;
        self.trunk_height.check("trunk_height")?;
        self.crown_width.check("crown_width")?;
        self.crown_height_fraction.check("crown_height_fraction")?;
        self.min_distance.check("min_distance")?;
        self.max_distance.check("max_distance")?;
        self.branch_length.check("branch_length")
    }

    /// Draws concrete parameters from the configured ranges.
    ///
    /// Values are drawn in a fixed order (point count, trunk height, crown
    /// width, crown height, min distance, max distance, branch length) so a
    /// seeded generator always produces the same parameters.
    pub fn sample(&self, rng: &mut impl Rng) -> Result<GrowthParams, ConfigError> {
        self.check_ranges()?;

        let attraction_point_count = self.attraction_point_count.sample(rng);
        let trunk_height = self.trunk_height.sample(rng);
        let crown_width = self.crown_width.sample(rng);
        let available = self.canvas_height - self.margin - trunk_height;
        let crown_height = available * self.crown_height_fraction.sample(rng);

        let params = GrowthParams {
            attraction_point_count,
            crown_width,
            crown_height,
            trunk_height,
            min_distance: self.min_distance.sample(rng),
            max_distance: self.max_distance.sample(rng),
            branch_length: self.branch_length.sample(rng),
            initial_size: self.initial_size,
            grow_increment: self.grow_increment,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Concrete parameters a tree is generated and grown with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthParams {
    pub attraction_point_count: usize,
    pub crown_width: f64,
    pub crown_height: f64,
    pub trunk_height: f64,
    /// Points this close to any branch are consumed.
    pub min_distance: f64,
    /// Points further than this from every branch exert no pull.
    pub max_distance: f64,
    pub branch_length: f64,
    pub initial_size: f64,
    pub grow_increment: f64,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            attraction_point_count: 400,
            crown_width: 80.0,
            crown_height: 150.0,
            trunk_height: 40.0,
            min_distance: 2.0,
            max_distance: 15.0,
            branch_length: 2.0,
            initial_size: INITIAL_SIZE,
            grow_increment: GROW_INCREMENT,
        }
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NegativeThickness { name, value })
    }
}

impl GrowthParams {
    /// Checks every parameter, including the attraction point count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attraction_point_count == 0 {
            return Err(ConfigError::ZeroPointCount);
        }
        self.validate_geometry()
    }

    /// Checks distances, lengths and thickening constants only.
    ///
    /// Used when attraction points are supplied explicitly instead of being
    /// scattered from `attraction_point_count`.
    pub fn validate_geometry(&self) -> Result<(), ConfigError> {
        require_positive("crown_width", self.crown_width)?;
        require_positive("crown_height", self.crown_height)?;
        require_positive("trunk_height", self.trunk_height)?;
        require_positive("min_distance", self.min_distance)?;
        require_positive("max_distance", self.max_distance)?;
        require_positive("branch_length", self.branch_length)?;
        if self.min_distance >= self.max_distance {
            return Err(ConfigError::DistanceOrder {
                min: self.min_distance,
                max: self.max_distance,
            });
        }
        require_non_negative("initial_size", self.initial_size)?;
        require_non_negative("grow_increment", self.grow_increment)
    }
}
