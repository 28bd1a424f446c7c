//! Grouped regions and the partitioned grouping result.

use crate::error::{GroupingError, Result};
use crate::geometry::Rect;
use crate::params::GroupingParams;
use crate::unit::MinimumUnit;

/// A merged run of units recognized as one word or phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedRegion {
    pub text: String,
    /// Mean unit confidence as an integer percentage (0-100).
    pub confidence: u8,
    pub bounds: Rect,
}

impl GroupedRegion {
    pub fn new(text: String, confidence: u8, bounds: Rect) -> Self {
        Self {
            text,
            confidence,
            bounds,
        }
    }

    /// Whether the region falls at or below the confidence cutoff of `params`.
    pub fn is_low_confidence(&self, params: &GroupingParams) -> bool {
        f64::from(self.confidence) <= params.confidence_cutoff()
    }
}

/// Regions partitioned by confidence, each list in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedResult {
    pub accepted: Vec<GroupedRegion>,
    pub low_confidence: Vec<GroupedRegion>,
}

impl GroupedResult {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.low_confidence.is_empty()
    }

    pub fn len(&self) -> usize {
        self.accepted.len() + self.low_confidence.len()
    }

    /// All regions: accepted first, then low-confidence.
    pub fn iter(&self) -> impl Iterator<Item = &GroupedRegion> {
        self.accepted.iter().chain(self.low_confidence.iter())
    }

    /// Drains `staged` into the two lists according to the confidence cutoff.
    pub(crate) fn take_partitioned(
        &mut self,
        staged: &mut Vec<GroupedRegion>,
        params: &GroupingParams,
    ) {
        for region in staged.drain(..) {
            if region.is_low_confidence(params) {
                self.low_confidence.push(region);
            } else {
                self.accepted.push(region);
            }
        }
    }
}

/// Combines a run of units into one region.
///
/// Text is the concatenated display text. Bounds run horizontally from the
/// first unit's real upper-left to the last unit's real upper-right, and
/// vertically from the smallest real upper y to the largest real lower y.
/// Confidence is the mean unit confidence in percent, rounded half to even.
pub fn combine_units<'a, I>(units: I) -> Result<GroupedRegion>
where
    I: IntoIterator<Item = &'a MinimumUnit>,
{
    let mut iter = units.into_iter();
    let first = iter.next().ok_or(GroupingError::EmptyRegion)?;

    let mut text = first.display_text();
    let mut min_y = first.real_upper_left().y;
    let mut max_y = first.real_lower_left().y;
    let mut confidence_sum = first.confidence();
    let mut count = 1usize;
    let mut last = first;

    for unit in iter {
        text.push_str(&unit.display_text());
        min_y = min_y.min(unit.real_upper_left().y);
        max_y = max_y.max(unit.real_lower_left().y);
        confidence_sum += unit.confidence();
        count += 1;
        last = unit;
    }

    let min_x = first.real_upper_left().x;
    let max_x = last.real_upper_right().x;
    let bounds = Rect::new(min_x, min_y, max_x - min_x, max_y - min_y);

    let mean = confidence_sum / count as f64;
    let confidence = (mean * 100.0).round_ties_even().clamp(0.0, 100.0) as u8;

    Ok(GroupedRegion::new(text, confidence, bounds))
}
