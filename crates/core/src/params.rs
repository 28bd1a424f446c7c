//! Grouping parameters.
//!
//! Contains GroupingParams, the per-call configuration of a grouping pass.

use crate::error::{GroupingError, Result};
use crate::threshold::MergeThresholdKind;

/// Parameters for one grouping pass.
///
/// Passed by reference to every call; nothing is kept between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingParams {
    /// Regions whose percent confidence is at or below this fraction (times
    /// 100) go to the low-confidence list. Range: 0.0 to 1.0.
    pub confidence_threshold: f64,

    /// Strategy that yields the gap tolerance for each unit pair.
    pub merge_threshold: MergeThresholdKind,

    /// Largest difference, in pixels, between two units' center, top and
    /// bottom y for them to count as the same line.
    pub same_line_tolerance: i32,

    /// Units whose connecting direction is at or above this angle (degrees)
    /// are never merged.
    pub max_merge_angle: f64,
}

impl Default for GroupingParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            merge_threshold: MergeThresholdKind::Fixed,
            same_line_tolerance: 5,
            max_merge_angle: 30.0,
        }
    }
}

impl GroupingParams {
    /// Creates validated parameters with default geometry tolerances.
    pub fn new(confidence_threshold: f64, merge_threshold: MergeThresholdKind) -> Result<Self> {
        let params = Self {
            confidence_threshold,
            merge_threshold,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_same_line_tolerance(mut self, tolerance: i32) -> Self {
        self.same_line_tolerance = tolerance;
        self
    }

    pub fn with_max_merge_angle(mut self, degrees: f64) -> Self {
        self.max_merge_angle = degrees;
        self
    }

    /// Confidence threshold on the 0-100 scale used by regions.
    pub fn confidence_cutoff(&self) -> f64 {
        self.confidence_threshold * 100.0
    }

    pub fn validate(&self) -> Result<()> {
        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(GroupingError::InvalidConfig {
                field: "confidence_threshold",
                reason: format!("{} is outside [0, 1]", self.confidence_threshold),
            });
        }
        if self.same_line_tolerance < 0 {
            return Err(GroupingError::InvalidConfig {
                field: "same_line_tolerance",
                reason: format!("{} is negative", self.same_line_tolerance),
            });
        }
        if !(self.max_merge_angle > 0.0 && self.max_merge_angle <= 180.0) {
            return Err(GroupingError::InvalidConfig {
                field: "max_merge_angle",
                reason: format!("{} is outside (0, 180]", self.max_merge_angle),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = GroupingParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.confidence_threshold, 0.8);
        assert_eq!(params.merge_threshold, MergeThresholdKind::Fixed);
        assert_eq!(params.confidence_cutoff(), 80.0);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        for bad in [-0.1, 1.01, f64::NAN, f64::INFINITY] {
            let err = GroupingParams::new(bad, MergeThresholdKind::Fixed).unwrap_err();
            assert!(matches!(
                err,
                GroupingError::InvalidConfig {
                    field: "confidence_threshold",
                    ..
                }
            ));
        }
        assert!(GroupingParams::new(0.0, MergeThresholdKind::Fixed).is_ok());
        assert!(GroupingParams::new(1.0, MergeThresholdKind::AdaptiveInference).is_ok());
    }

    #[test]
    fn rejects_bad_geometry_tolerances() {
        let params = GroupingParams::default().with_same_line_tolerance(-1);
        assert!(params.validate().is_err());
        let params = GroupingParams::default().with_max_merge_angle(0.0);
        assert!(params.validate().is_err());
        let params = GroupingParams::default().with_max_merge_angle(f64::NAN);
        assert!(params.validate().is_err());
    }
}
