//! Unit-to-region grouping.
//!
//! Contains the Grouper engine, which merges ordered minimum units into word
//! and phrase regions in a single left-to-right scan.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::Result;
use crate::geometry::angle_degrees;
use crate::obstruction::ObstructionIndex;
use crate::params::GroupingParams;
use crate::region::{GroupedRegion, GroupedResult, combine_units};
use crate::threshold::{ThresholdFn, ThresholdRegistry};
use crate::unit::{MinimumUnit, UnitType};

/// Where a punctuation unit ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Appended to the previous unit; the region ends here.
    Stop,
    /// Appended to the previous unit, which now glues to the next token.
    Join,
    /// Appended to the previous unit, which now carries a hard break.
    Split,
    /// Closing bracket appended to the previous unit.
    RightBracket,
    /// Prepended to the next unit.
    Forward,
    /// No rule applied; the mark is discarded.
    Dropped,
}

/// Whether two units sit on the same text line.
///
/// Center, top and bottom y must each differ by at most `tolerance`.
pub fn is_same_line(a: &MinimumUnit, b: &MinimumUnit, tolerance: i32) -> bool {
    let (top_a, bottom_a) = a.vertical_extent();
    let (top_b, bottom_b) = b.vertical_extent();
    let center_diff = (a.center().y - b.center().y).abs();
    center_diff <= tolerance
        && (top_a - top_b).abs() <= tolerance
        && (bottom_a - bottom_b).abs() <= tolerance
}

/// Gap-consistency test between the previous and current unit.
///
/// The front gap must be close to the back gap (toward the next unit) or to
/// the gap carried from the previous merge. A zero back gap means there is
/// no usable next unit, so only the carried gap is compared.
fn can_combine(
    front_gap: i32,
    back_gap: i32,
    last_gap: i32,
    angle: f64,
    threshold: i32,
    max_angle: f64,
) -> bool {
    if angle >= max_angle {
        return false;
    }
    let front = front_gap.abs();
    let back = back_gap.abs();
    if back != 0 {
        (front - back).abs() < threshold || (front - last_gap).abs() < threshold
    } else {
        (front - last_gap).abs() < threshold
    }
}

fn obstructed(separators: Option<&ObstructionIndex>, a: &MinimumUnit, b: &MinimumUnit) -> bool {
    separators.is_some_and(|index| index.exists_between(a, b))
}

/// Mutable state of one scan.
struct Scan<'p> {
    params: &'p GroupingParams,
    /// Indices of units in the region being built.
    buffer: SmallVec<[usize; 16]>,
    /// Completed regions not yet partitioned.
    staged: Vec<GroupedRegion>,
    result: GroupedResult,
    /// Front gap of the last distance check within the current region.
    running_gap: i32,
}

impl<'p> Scan<'p> {
    fn new(params: &'p GroupingParams, capacity: usize) -> Self {
        Self {
            params,
            buffer: SmallVec::new(),
            staged: Vec::with_capacity(capacity),
            result: GroupedResult::default(),
            running_gap: 0,
        }
    }

    /// Closes the current region, if any, and resets the carried gap.
    fn flush(&mut self, units: &[MinimumUnit]) -> Result<()> {
        self.running_gap = 0;
        if self.buffer.is_empty() {
            return Ok(());
        }
        let region = combine_units(self.buffer.iter().map(|&i| &units[i]))?;
        debug!(
            text = %region.text,
            confidence = region.confidence,
            units = self.buffer.len(),
            "region closed"
        );
        self.staged.push(region);
        self.buffer.clear();
        Ok(())
    }

    /// Moves staged regions into the partitioned result.
    fn commit(&mut self) {
        if self.staged.is_empty() {
            return;
        }
        debug!(regions = self.staged.len(), "committing staged regions");
        self.result
            .take_partitioned(&mut self.staged, self.params);
    }

    fn finish(mut self, units: &[MinimumUnit]) -> Result<GroupedResult> {
        self.flush(units)?;
        self.commit();
        Ok(self.result)
    }
}

/// Grouping engine.
///
/// Holds the merge-threshold strategies; configuration is supplied per call,
/// so one instance can serve concurrent callers with different settings.
#[derive(Debug, Clone, Default)]
pub struct Grouper {
    registry: ThresholdRegistry,
}

impl Grouper {
    pub fn new(registry: ThresholdRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ThresholdRegistry {
        &self.registry
    }

    /// Groups `units` into regions.
    ///
    /// Units must already be in reading order (see
    /// [`sort_reading_order`](crate::order::sort_reading_order)). Separator
    /// lines, when given, block merges across them. An empty input yields an
    /// empty result.
    ///
    /// # Errors
    /// - [`InvalidConfig`](crate::GroupingError::InvalidConfig) for bad params
    /// - [`UnregisteredStrategy`](crate::GroupingError::UnregisteredStrategy)
    ///   if the selected threshold kind has no function
    /// - [`InvalidUnit`](crate::GroupingError::InvalidUnit) for the first
    ///   malformed unit
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(units = units.len(), strategy = ?params.merge_threshold)
    )]
    pub fn group(
        &self,
        mut units: Vec<MinimumUnit>,
        separators: Option<&ObstructionIndex>,
        params: &GroupingParams,
    ) -> Result<GroupedResult> {
        if units.is_empty() {
            return Ok(GroupedResult::default());
        }
        params.validate()?;
        let threshold_fn = self.registry.resolve(params.merge_threshold)?;
        for (index, unit) in units.iter().enumerate() {
            unit.validate(index)?;
        }

        let mut scan = Scan::new(params, units.len() / 4 + 1);
        for i in 0..units.len() {
            let Some(&prev) = scan.buffer.last() else {
                scan.buffer.push(i);
                continue;
            };

            if units[prev].is_stop() {
                scan.flush(&units)?;
                scan.buffer.push(i);
                continue;
            }

            let next = (i + 1 < units.len()).then_some(i + 1);

            if units[i].is_punctuation() {
                units[i].set_unit_type(UnitType::Punctuation);
                let placement = place_punctuation(&mut units, prev, i, next, separators, params);
                trace!(index = i, text = units[i].text(), ?placement, "punctuation");
                if placement == Placement::Stop {
                    scan.flush(&units)?;
                }
                continue;
            }

            let mergeable = distance_check(
                &units,
                prev,
                i,
                next,
                threshold_fn,
                separators,
                &mut scan,
            );
            if !mergeable {
                scan.flush(&units)?;
                if units[i].hard_break() {
                    scan.commit();
                }
            }
            scan.buffer.push(i);
        }

        scan.finish(&units)
    }
}

/// Decides whether unit `cur` continues the region ending at `prev`.
///
/// Always carries the front gap forward, whatever the outcome.
#[allow(clippy::too_many_arguments)]
fn distance_check(
    units: &[MinimumUnit],
    prev: usize,
    cur: usize,
    next: Option<usize>,
    threshold_fn: ThresholdFn,
    separators: Option<&ObstructionIndex>,
    scan: &mut Scan<'_>,
) -> bool {
    let previous = &units[prev];
    let current = &units[cur];

    let front_gap = current.real_upper_left().x - previous.real_upper_right().x;
    let back_gap = next.map_or(0, |n| {
        units[n].real_upper_left().x - current.real_upper_right().x
    });
    let angle = angle_degrees(previous.real_upper_right(), current.real_upper_left());
    let threshold = threshold_fn(units, cur);

    let mut mergeable = can_combine(
        front_gap,
        back_gap,
        scan.running_gap,
        angle,
        threshold,
        scan.params.max_merge_angle,
    );
    let last_gap = scan.running_gap;
    scan.running_gap = front_gap;

    if mergeable && obstructed(separators, previous, current) {
        trace!(index = cur, "merge blocked by separator line");
        mergeable = false;
    }

    trace!(
        index = cur,
        front_gap,
        back_gap,
        last_gap,
        angle,
        threshold,
        mergeable,
        "distance check"
    );
    mergeable
}

/// Applies the attachment rules to the punctuation unit at `cur`.
fn place_punctuation(
    units: &mut [MinimumUnit],
    prev: usize,
    cur: usize,
    next: Option<usize>,
    separators: Option<&ObstructionIndex>,
    params: &GroupingParams,
) -> Placement {
    let tolerance = params.same_line_tolerance;
    let same_line = is_same_line(&units[prev], &units[cur], tolerance);
    let blocked_behind = obstructed(separators, &units[prev], &units[cur]);
    let binds_forward = next.is_some_and(|n| {
        is_same_line(&units[n], &units[cur], tolerance)
            && !obstructed(separators, &units[cur], &units[n])
    });

    let current = &units[cur];
    let placement = if same_line && !current.is_right_bracket() {
        if !blocked_behind && current.is_stop() {
            Placement::Stop
        } else if !blocked_behind && current.is_join() {
            Placement::Join
        } else if !blocked_behind && current.is_split() {
            Placement::Split
        } else if binds_forward {
            Placement::Forward
        } else {
            Placement::Dropped
        }
    } else if same_line && !blocked_behind {
        Placement::RightBracket
    } else if binds_forward {
        Placement::Forward
    } else {
        Placement::Dropped
    };

    match placement {
        Placement::Stop => {
            let upper_right = units[prev].real_upper_right();
            let lower_right = units[prev].real_lower_right();
            units[cur].set_right_edge(upper_right, lower_right);
            units[cur].set_hard_break(true);
            units[prev].set_hard_break(true);
            let mark = units[cur].to_attachment();
            units[prev].append(mark);
        }
        Placement::Join => {
            let mark = units[cur].to_attachment();
            units[prev].append(mark);
            units[prev].set_unit_type(UnitType::CharWithJoin);
        }
        Placement::Split => {
            let mark = units[cur].to_attachment();
            units[prev].append(mark);
            units[prev].set_hard_break(true);
        }
        Placement::RightBracket => {
            let mark = units[cur].to_attachment();
            units[prev].append(mark);
        }
        Placement::Forward => {
            // binds_forward implies a next unit
            if let Some(n) = next {
                let mark = units[cur].to_attachment();
                units[n].prepend(mark);
            }
        }
        Placement::Dropped => {
            debug!(index = cur, text = units[cur].text(), "punctuation dropped");
        }
    }
    placement
}

/// Groups `units` with the default strategy registry.
pub fn group_units(
    units: Vec<MinimumUnit>,
    separators: Option<&ObstructionIndex>,
    params: &GroupingParams,
) -> Result<GroupedResult> {
    Grouper::default().group(units, separators, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cjk(text: &str, x0: i32, y0: i32, x1: i32, y1: i32) -> MinimumUnit {
        MinimumUnit::from_rect(text, (x0, y0, x1, y1), 0.9, UnitType::Cjk)
    }

    #[test]
    fn same_line_boundary() {
        let a = cjk("A", 0, 0, 10, 10);
        let b = cjk("B", 12, 5, 22, 15);
        assert!(is_same_line(&a, &b, 5));
        let c = cjk("C", 12, 7, 22, 17);
        assert!(!is_same_line(&a, &c, 5));
    }

    #[test]
    fn can_combine_uses_back_or_carried_gap() {
        // back gap matches
        assert!(can_combine(20, 22, 0, 0.0, 15, 30.0));
        // neither matches
        assert!(!can_combine(40, 2, 0, 0.0, 15, 30.0));
        // carried gap matches
        assert!(can_combine(40, 2, 35, 0.0, 15, 30.0));
        // no next unit: only carried gap
        assert!(!can_combine(40, 0, 0, 0.0, 15, 30.0));
        assert!(can_combine(4, 0, 0, 0.0, 15, 30.0));
        // steep angle
        assert!(!can_combine(2, 2, 2, 30.0, 15, 30.0));
        // negative gaps compare by magnitude
        assert!(can_combine(-3, 0, 0, 0.0, 15, 30.0));
    }

    #[test]
    fn threshold_zero_never_merges() {
        assert!(!can_combine(0, 0, 0, 0.0, 0, 30.0));
    }

    #[test]
    fn running_gap_is_reset_after_flush() {
        let units = vec![
            cjk("A", 0, 0, 10, 10),
            cjk("B", 60, 0, 70, 10),
            cjk("C", 72, 0, 82, 10),
        ];
        let result = group_units(units, None, &GroupingParams::default()).unwrap();
        let texts: Vec<_> = result.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["A", "BC"]);
    }

    #[test]
    fn split_mark_sets_break_on_previous() {
        let mut units = vec![cjk("A", 0, 0, 10, 10), cjk("、", 10, 0, 14, 10)];
        let placement =
            place_punctuation(&mut units, 0, 1, None, None, &GroupingParams::default());
        assert_eq!(placement, Placement::Split);
        assert!(units[0].hard_break());
        assert_eq!(units[0].display_text(), "A、");
    }

    #[test]
    fn join_mark_reclassifies_previous() {
        let mut units = vec![cjk("A", 0, 0, 10, 10), cjk("-", 10, 0, 14, 10)];
        let placement =
            place_punctuation(&mut units, 0, 1, None, None, &GroupingParams::default());
        assert_eq!(placement, Placement::Join);
        assert_eq!(units[0].unit_type(), UnitType::CharWithJoin);
    }

    #[test]
    fn stop_mark_takes_previous_right_edge() {
        let mut units = vec![cjk("A", 0, 0, 10, 10), cjk(".", 11, 1, 14, 10)];
        let placement =
            place_punctuation(&mut units, 0, 1, None, None, &GroupingParams::default());
        assert_eq!(placement, Placement::Stop);
        assert!(units[0].hard_break());
        assert!(units[1].hard_break());
        assert_eq!(units[0].real_upper_right().x, 10);
    }

    #[test]
    fn unplaceable_mark_is_dropped() {
        // different line from previous, no next unit
        let mut units = vec![cjk("A", 0, 0, 10, 10), cjk("「", 0, 40, 5, 50)];
        let placement =
            place_punctuation(&mut units, 0, 1, None, None, &GroupingParams::default());
        assert_eq!(placement, Placement::Dropped);
        assert_eq!(units[0].display_text(), "A");
    }
}
