//! Spatial index over separator lines (table borders, rules).
//!
//! Answers whether any separator passes between two units, which blocks
//! merging them even when they are geometrically close.

use std::fmt;

use geo_index::rtree::sort::HilbertSort;
use geo_index::rtree::{RTree as GeoRTree, RTreeBuilder, RTreeIndex};
use rstar::{AABB, RTree, RTreeObject};
use tracing::debug;

use crate::geometry::Rect;
use crate::unit::MinimumUnit;

/// A straight separator segment in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl LineSegment {
    pub const fn new(start: (f64, f64), end: (f64, f64)) -> Self {
        Self { start, end }
    }

    /// Envelope as (min_x, min_y, max_x, max_y).
    pub fn envelope(&self) -> (f64, f64, f64, f64) {
        (
            self.start.0.min(self.end.0),
            self.start.1.min(self.end.1),
            self.start.0.max(self.end.0),
            self.start.1.max(self.end.1),
        )
    }

    fn is_finite(&self) -> bool {
        self.start.0.is_finite()
            && self.start.1.is_finite()
            && self.end.0.is_finite()
            && self.end.1.is_finite()
    }

    /// True when the segment passes through the open interior of `rect`.
    ///
    /// Segments that only touch the boundary do not count, and a rectangle
    /// without area has no interior.
    pub fn crosses_interior(&self, rect: Rect) -> bool {
        if rect.is_degenerate() {
            return false;
        }
        let (xmin, ymin) = (f64::from(rect.left()), f64::from(rect.top()));
        let (xmax, ymax) = (f64::from(rect.right()), f64::from(rect.bottom()));
        let (x1, y1) = self.start;
        let dx = self.end.0 - x1;
        let dy = self.end.1 - y1;

        // Liang-Barsky clip against the closed rectangle.
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;
        for (p, q) in [
            (-dx, x1 - xmin),
            (dx, xmax - x1),
            (-dy, y1 - ymin),
            (dy, ymax - y1),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return false;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return false;
                }
                t1 = t1.min(r);
            }
        }

        // A chord of a convex set has an interior point iff its midpoint is interior.
        let tm = (t0 + t1) / 2.0;
        let mx = x1 + tm * dx;
        let my = y1 + tm * dy;
        mx > xmin && mx < xmax && my > ymin && my < ymax
    }
}

#[derive(Clone)]
struct SegmentNode {
    id: usize,
    envelope: (f64, f64, f64, f64),
}

impl PartialEq for SegmentNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl RTreeObject for SegmentNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let (x0, y0, x1, y1) = self.envelope;
        AABB::from_corners([x0, y0], [x1, y1])
    }
}

/// Separator lines indexed for rectangle queries.
///
/// Lines given at construction are bulk-loaded into a static packed R-tree;
/// lines inserted later go into a dynamic R-tree. Ids are stable
/// (id == position in insertion order).
pub struct ObstructionIndex {
    lines: Vec<LineSegment>,
    /// Static spatial index for bulk-loaded lines
    static_tree: Option<GeoRTree<f64>>,
    /// Count of lines in the static tree (ids 0..static_count)
    static_count: usize,
    dynamic_tree: RTree<SegmentNode>,
}

impl Default for ObstructionIndex {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            static_tree: None,
            static_count: 0,
            dynamic_tree: RTree::new(),
        }
    }
}

impl fmt::Debug for ObstructionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObstructionIndex")
            .field("lines", &self.lines.len())
            .field("static_count", &self.static_count)
            .finish()
    }
}

impl ObstructionIndex {
    /// Builds the index from a set of separator segments.
    ///
    /// Segments with non-finite coordinates are skipped.
    pub fn new(lines: impl IntoIterator<Item = LineSegment>) -> Self {
        let mut index = Self::default();
        let mut skipped = 0usize;
        index.lines = lines
            .into_iter()
            .filter(|l| {
                let ok = l.is_finite();
                if !ok {
                    skipped += 1;
                }
                ok
            })
            .collect();
        if skipped > 0 {
            debug!(skipped, "ignoring separator lines with non-finite coordinates");
        }

        if !index.lines.is_empty() {
            let mut builder: RTreeBuilder<f64> = RTreeBuilder::new(index.lines.len() as u32);
            for line in &index.lines {
                let (x0, y0, x1, y1) = line.envelope();
                builder.add(x0, y0, x1, y1);
            }
            index.static_tree = Some(builder.finish::<HilbertSort>());
            index.static_count = index.lines.len();
        }
        index
    }

    /// Adds a line after construction (indexed immediately).
    ///
    /// Returns false if the line has non-finite coordinates and was ignored.
    pub fn insert(&mut self, line: LineSegment) -> bool {
        if !line.is_finite() {
            return false;
        }
        let id = self.lines.len();
        self.lines.push(line);
        self.dynamic_tree.insert(SegmentNode {
            id,
            envelope: line.envelope(),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[LineSegment] {
        &self.lines
    }

    fn candidate_ids(&self, rect: Rect) -> impl Iterator<Item = usize> + '_ {
        let (x0, y0) = (f64::from(rect.left()), f64::from(rect.top()));
        let (x1, y1) = (f64::from(rect.right()), f64::from(rect.bottom()));
        let env = AABB::from_corners([x0, y0], [x1, y1]);
        let static_count = self.static_count;

        let from_static = self
            .static_tree
            .as_ref()
            .map(|tree| tree.search(x0, y0, x1, y1))
            .unwrap_or_default()
            .into_iter()
            .map(|id| id as usize)
            .filter(move |&id| id < static_count);
        let from_dynamic = self
            .dynamic_tree
            .locate_in_envelope_intersecting(&env)
            .map(|node| node.id);
        from_static.chain(from_dynamic)
    }

    /// Separator lines crossing the interior of `rect`, in id order.
    pub fn lines_in_region(&self, rect: Rect) -> Vec<&LineSegment> {
        if rect.is_degenerate() {
            return Vec::new();
        }
        let mut ids: Vec<usize> = self
            .candidate_ids(rect)
            .filter(|&id| self.lines[id].crosses_interior(rect))
            .collect();
        ids.sort_unstable();
        ids.into_iter().map(|id| &self.lines[id]).collect()
    }

    /// Whether any separator line crosses the interior of `rect`.
    pub fn exists_line_in_region(&self, rect: Rect) -> bool {
        if self.lines.is_empty() || rect.is_degenerate() {
            return false;
        }
        self.candidate_ids(rect)
            .any(|id| self.lines[id].crosses_interior(rect))
    }

    /// Whether a separator passes through the region spanned by two units.
    pub fn exists_between(&self, a: &MinimumUnit, b: &MinimumUnit) -> bool {
        self.exists_line_in_region(region_between(a, b))
    }
}

/// Query rectangle spanning two units.
///
/// Horizontally it runs from the left unit's real left edge to the right
/// unit's real right edge; vertically it covers both units' real extents.
pub fn region_between(a: &MinimumUnit, b: &MinimumUnit) -> Rect {
    let (left, right) = if a.real_upper_right().x < b.real_upper_right().x {
        (a, b)
    } else {
        (b, a)
    };
    let (top_a, bottom_a) = left.vertical_extent();
    let (top_b, bottom_b) = right.vertical_extent();
    let x = left.real_upper_left().x;
    let y = top_a.min(top_b);
    Rect::new(
        x,
        y,
        (right.real_upper_right().x - x).abs(),
        bottom_a.max(bottom_b) - y,
    )
}
