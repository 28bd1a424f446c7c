//! Integer geometry shared by units and regions.
//!
//! Coordinates use a top-left origin: x grows to the right, y grows downward,
//! so a unit's "upper" corners carry the smaller y.

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle stored as origin plus extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the rectangle spanning two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x0 = a.x.min(b.x);
        let y0 = a.y.min(b.y);
        Self {
            x: x0,
            y: y0,
            width: a.x.max(b.x) - x0,
            height: a.y.max(b.y) - y0,
        }
    }

    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// True when the rectangle encloses no area.
    #[inline]
    pub const fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Direction from `from` to `to` in degrees.
///
/// The raw `atan2` result lies in (-180, 180]; only a straight-left direction
/// of exactly 180 is folded to 0, so the result is in (-180, 180). Negative
/// angles (`to` above `from`) are not folded, so an upward step always
/// passes a `< max_merge_angle` test.
pub fn angle_degrees(from: Point, to: Point) -> f64 {
    let dx = f64::from(to.x) - f64::from(from.x);
    let dy = f64::from(to.y) - f64::from(from.y);
    let angle = dy.atan2(dx).to_degrees();
    if angle >= 180.0 { angle - 180.0 } else { angle }
}
