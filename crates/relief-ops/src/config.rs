//! Configuration for parameter validation and geometry staging.
//!
//! Every field has a default, so a TOML override only needs the keys it changes:
//!
//! ```toml
//! [limits]
//! diameter = { min = 5.0, max = 150.0 }
//!
//! [tolerance]
//! overlap = 0.02
//! ```

use relief_types::Flattening;
use serde::{Deserialize, Serialize};

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Accepted parameter ranges. Lengths in mm, fractions of total depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub diameter: Range,
    pub total_depth: Range,
    pub mountain_fraction: Range,
    pub trail_fraction: Range,
    pub bolt_fraction: Range,
    /// Applies to both in-plane offsets, for logo and QR alike.
    pub offset: Range,
    pub qr_size: Range,
    pub qr_height: Range,
    pub max_border: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            diameter: Range::new(5.0, 100.0),
            total_depth: Range::new(0.10, 5.00),
            mountain_fraction: Range::new(0.10, 0.90),
            trail_fraction: Range::new(0.05, 0.80),
            bolt_fraction: Range::new(0.05, 0.70),
            offset: Range::new(-500.0, 500.0),
            qr_size: Range::new(5.0, 200.0),
            qr_height: Range::new(0.10, 5.00),
            max_border: 8,
        }
    }
}

/// Geometric tolerances used while building cutters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// How far cutters start above the face, and fuse solids start inside it (mm).
    pub overlap: f64,
    /// Curve flattening resolution for outlines.
    pub flattening: Flattening,
    /// Loops enclosing less area than this are degenerate (mm²).
    pub min_loop_area: f64,
    /// QR modules smaller than this trigger a printability warning (mm).
    pub min_module_size: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            overlap: 0.01,
            flattening: Flattening::default(),
            min_loop_area: 1e-9,
            min_module_size: 0.3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefConfig {
    pub limits: Limits,
    pub tolerance: ToleranceConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid relief config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ReliefConfig {
    /// Parse overrides from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}
