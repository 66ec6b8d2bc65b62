use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for the ranking layout. Passed by value into each run; never shared or global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutSettings {
    /// Number of landmark nodes requested from the distance oracle.
    pub pivot_count: usize,
    /// Drawing units per unit of standardized embedding coordinate.
    pub scale_x: f64,
    /// Drawing units per unit of square-rooted standardized centrality.
    pub scale_y: f64,
    /// Minimum gap kept between node shapes after overlap removal.
    pub node_separation: f64,
    /// Padding added around the final bounding box.
    pub margin: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            pivot_count: 50,
            scale_x: 200.0,
            scale_y: 200.0,
            node_separation: 10.0,
            margin: 10.0,
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Result<()> {
        if self.pivot_count == 0 {
            return Err(Error::invalid("pivotCount must be positive"));
        }
        if !(self.scale_x.is_finite() && self.scale_x > 0.0) {
            return Err(Error::invalid(format!(
                "scaleX must be a positive number, got {}",
                self.scale_x
            )));
        }
        if !(self.scale_y.is_finite() && self.scale_y > 0.0) {
            return Err(Error::invalid(format!(
                "scaleY must be a positive number, got {}",
                self.scale_y
            )));
        }
        if !(self.node_separation.is_finite() && self.node_separation >= 0.0) {
            return Err(Error::invalid(format!(
                "nodeSeparation must be a non-negative number, got {}",
                self.node_separation
            )));
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(Error::invalid(format!(
                "margin must be a non-negative number, got {}",
                self.margin
            )));
        }
        Ok(())
    }
}
