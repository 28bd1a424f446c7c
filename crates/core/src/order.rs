//! Reading-order sorting for units.
//!
//! The grouping scan expects its input already in reading order and never
//! sorts. Callers whose recognizer emits units in arbitrary order can use
//! these helpers first.

use std::cmp::Ordering;

use crate::unit::MinimumUnit;

/// Orders by real top y, then by real left x.
pub fn reading_order_cmp(a: &MinimumUnit, b: &MinimumUnit) -> Ordering {
    let (top_a, _) = a.vertical_extent();
    let (top_b, _) = b.vertical_extent();
    top_a
        .cmp(&top_b)
        .then_with(|| a.real_upper_left().x.cmp(&b.real_upper_left().x))
}

/// Sorts units into rows, top to bottom, and each row left to right.
///
/// Rows are clustered by top y: a unit joins the current row when its top is
/// within `tolerance` of the previous unit's top.
pub fn sort_reading_order(units: &mut [MinimumUnit], tolerance: i32) {
    units.sort_by(reading_order_cmp);
    if tolerance <= 0 || units.len() < 2 {
        return;
    }

    let mut start = 0;
    while start < units.len() {
        let mut last_top = units[start].vertical_extent().0;
        let mut end = start + 1;
        while end < units.len() {
            let top = units[end].vertical_extent().0;
            if top > last_top.saturating_add(tolerance) {
                break;
            }
            last_top = top;
            end += 1;
        }
        units[start..end].sort_by_key(|u| u.real_upper_left().x);
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitType;

    fn u(text: &str, x: i32, y: i32) -> MinimumUnit {
        MinimumUnit::from_rect(text, (x, y, x + 10, y + 10), 1.0, UnitType::Cjk)
    }

    fn texts(units: &[MinimumUnit]) -> Vec<&str> {
        units.iter().map(|u| u.text()).collect()
    }

    #[test]
    fn jittered_row_sorts_left_to_right() {
        let mut units = vec![u("C", 40, 0), u("A", 0, 3), u("B", 20, 1), u("D", 0, 30)];
        sort_reading_order(&mut units, 5);
        assert_eq!(texts(&units), ["A", "B", "C", "D"]);
    }

    #[test]
    fn zero_tolerance_is_plain_top_then_left() {
        let mut units = vec![u("B", 20, 1), u("A", 0, 3)];
        sort_reading_order(&mut units, 0);
        assert_eq!(texts(&units), ["B", "A"]);
    }
}
