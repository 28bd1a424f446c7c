//! Minimum text units and their punctuation attachments.
//!
//! Use `MinimumUnit::builder()` to construct units with optional fields.

use smol_str::SmolStr;

use crate::error::{GroupingError, Result, UnitField};
use crate::geometry::Point;
use crate::punctuation;

/// Largest coordinate magnitude accepted on a unit or its attachments.
///
/// Keeps every corner sum, gap and rectangle edge computed during grouping
/// inside `i32`.
pub const MAX_COORDINATE: i32 = 1 << 28;

/// Coarse type tag assigned by the recognizer.
///
/// `Number` covers digit runs only, e.g. 10, 100, 999.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UnitType {
    #[default]
    Cjk,
    Latin,
    Number,
    Punctuation,
    /// Token glued to the following one by a connective mark.
    CharWithJoin,
    TableLine,
}

/// The four corners of a detected glyph, clockwise from upper-left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Quad {
    pub upper_left: Point,
    pub upper_right: Point,
    pub lower_right: Point,
    pub lower_left: Point,
}

impl Quad {
    pub const fn new(
        upper_left: Point,
        upper_right: Point,
        lower_right: Point,
        lower_left: Point,
    ) -> Self {
        Self {
            upper_left,
            upper_right,
            lower_right,
            lower_left,
        }
    }

    /// Axis-aligned quad spanning `(x0, y0)` to `(x1, y1)`.
    pub const fn from_rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            upper_left: Point::new(x0, y0),
            upper_right: Point::new(x1, y0),
            lower_right: Point::new(x1, y1),
            lower_left: Point::new(x0, y1),
        }
    }
}

/// Punctuation bound to the side of a unit.
///
/// An attachment carries only text and corners, so it can never hold
/// attachments of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    text: SmolStr,
    quad: Quad,
}

impl Attachment {
    pub fn new(text: &str, quad: Quad) -> Self {
        Self {
            text: SmolStr::new(text),
            quad,
        }
    }

    /// Attachment known only by its left edge, as used for prepended marks.
    pub fn from_left_edge(text: &str, upper_left: Point, lower_left: Point) -> Self {
        Self::new(
            text,
            Quad {
                upper_left,
                lower_left,
                ..Quad::default()
            },
        )
    }

    /// Attachment known only by its right edge, as used for appended marks.
    pub fn from_right_edge(text: &str, upper_right: Point, lower_right: Point) -> Self {
        Self::new(
            text,
            Quad {
                upper_right,
                lower_right,
                ..Quad::default()
            },
        )
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn quad(&self) -> &Quad {
        &self.quad
    }
}

/// Builder for MinimumUnit with fluent API for optional fields.
#[derive(Debug, Clone)]
pub struct MinimumUnitBuilder {
    text: SmolStr,
    quad: Quad,
    confidence: f64,
    unit_type: UnitType,
    hard_break: bool,
}

impl MinimumUnitBuilder {
    /// Creates a new builder. Optional fields default to: confidence=1.0,
    /// unit_type=Cjk, hard_break=false.
    pub fn new(text: &str, quad: Quad) -> Self {
        Self {
            text: SmolStr::new(text),
            quad,
            confidence: 1.0,
            unit_type: UnitType::default(),
            hard_break: false,
        }
    }

    pub const fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub const fn unit_type(mut self, unit_type: UnitType) -> Self {
        self.unit_type = unit_type;
        self
    }

    /// Marks the unit as starting a new line or paragraph.
    pub const fn hard_break(mut self, hard_break: bool) -> Self {
        self.hard_break = hard_break;
        self
    }

    pub fn build(self) -> MinimumUnit {
        MinimumUnit {
            quad: self.quad,
            text: self.text,
            confidence: self.confidence,
            unit_type: self.unit_type,
            hard_break: self.hard_break,
            prepended: None,
            appended: None,
        }
    }
}

/// Smallest recognized text primitive: one glyph with geometry and score.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumUnit {
    quad: Quad,
    text: SmolStr,
    confidence: f64,
    unit_type: UnitType,
    hard_break: bool,
    prepended: Option<Attachment>,
    appended: Option<Attachment>,
}

impl MinimumUnit {
    pub fn builder(text: &str, quad: Quad) -> MinimumUnitBuilder {
        MinimumUnitBuilder::new(text, quad)
    }

    /// Axis-aligned unit with the given confidence and type.
    pub fn from_rect(
        text: &str,
        (x0, y0, x1, y1): (i32, i32, i32, i32),
        confidence: f64,
        unit_type: UnitType,
    ) -> Self {
        Self::builder(text, Quad::from_rect(x0, y0, x1, y1))
            .confidence(confidence)
            .unit_type(unit_type)
            .build()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn quad(&self) -> &Quad {
        &self.quad
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    pub fn set_unit_type(&mut self, unit_type: UnitType) {
        self.unit_type = unit_type;
    }

    pub fn hard_break(&self) -> bool {
        self.hard_break
    }

    pub fn set_hard_break(&mut self, hard_break: bool) {
        self.hard_break = hard_break;
    }

    /// Overwrites the right-side corners of the unit's own quad.
    pub fn set_right_edge(&mut self, upper_right: Point, lower_right: Point) {
        self.quad.upper_right = upper_right;
        self.quad.lower_right = lower_right;
    }

    /// Text as it appears in a region: prepended mark, glyph, appended mark,
    /// and a trailing space for Latin units.
    pub fn display_text(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + 8);
        if let Some(pre) = &self.prepended {
            out.push_str(pre.text());
        }
        out.push_str(&self.text);
        if let Some(app) = &self.appended {
            out.push_str(app.text());
        }
        if self.unit_type == UnitType::Latin {
            out.push(' ');
        }
        out
    }

    pub fn width(&self) -> i32 {
        self.real_upper_right().x - self.real_upper_left().x
    }

    pub fn height(&self) -> i32 {
        self.real_lower_right().y - self.real_upper_right().y
    }

    pub fn real_upper_left(&self) -> Point {
        self.prepended
            .as_ref()
            .map_or(self.quad.upper_left, |a| a.quad.upper_left)
    }

    pub fn real_upper_right(&self) -> Point {
        self.appended
            .as_ref()
            .map_or(self.quad.upper_right, |a| a.quad.upper_right)
    }

    pub fn real_lower_right(&self) -> Point {
        self.appended
            .as_ref()
            .map_or(self.quad.lower_right, |a| a.quad.lower_right)
    }

    pub fn real_lower_left(&self) -> Point {
        self.prepended
            .as_ref()
            .map_or(self.quad.lower_left, |a| a.quad.lower_left)
    }

    /// Smallest upper y and largest lower y over the real corners.
    pub fn vertical_extent(&self) -> (i32, i32) {
        let top = self.real_upper_right().y.min(self.real_upper_left().y);
        let bottom = self.real_lower_right().y.max(self.real_lower_left().y);
        (top, bottom)
    }

    /// Mean of the four real corners, truncated toward zero.
    pub fn center(&self) -> Point {
        let corners = [
            self.real_upper_left(),
            self.real_upper_right(),
            self.real_lower_right(),
            self.real_lower_left(),
        ];
        let sx: i64 = corners.iter().map(|p| i64::from(p.x)).sum();
        let sy: i64 = corners.iter().map(|p| i64::from(p.y)).sum();
        // the mean of four i32 values always fits back into i32
        Point::new((sx / 4) as i32, (sy / 4) as i32)
    }

    pub fn is_punctuation(&self) -> bool {
        punctuation::is_punctuation(&self.text)
    }

    pub fn is_stop(&self) -> bool {
        punctuation::is_stop(&self.text)
    }

    pub fn is_special(&self) -> bool {
        punctuation::is_special(&self.text)
    }

    pub fn is_join(&self) -> bool {
        punctuation::is_join(&self.text)
    }

    pub fn is_split(&self) -> bool {
        punctuation::is_split(&self.text)
    }

    pub fn is_left_bracket(&self) -> bool {
        punctuation::is_left_bracket(&self.text)
    }

    pub fn is_right_bracket(&self) -> bool {
        punctuation::is_right_bracket(&self.text)
    }

    /// Snapshot of this unit as an attachment; its own attachments are not carried.
    pub fn to_attachment(&self) -> Attachment {
        Attachment {
            text: self.text.clone(),
            quad: self.quad,
        }
    }

    pub fn prepended(&self) -> Option<&Attachment> {
        self.prepended.as_ref()
    }

    pub fn appended(&self) -> Option<&Attachment> {
        self.appended.as_ref()
    }

    /// Binds `attachment` before the glyph, replacing any previous one.
    pub fn prepend(&mut self, attachment: Attachment) {
        self.prepended = Some(attachment);
    }

    pub fn prepend_text(&mut self, text: &str, upper_left: Point, lower_left: Point) {
        self.prepended = Some(Attachment::from_left_edge(text, upper_left, lower_left));
    }

    /// Binds `attachment` after the glyph, replacing any previous one.
    pub fn append(&mut self, attachment: Attachment) {
        self.appended = Some(attachment);
    }

    pub fn append_text(&mut self, text: &str, upper_right: Point, lower_right: Point) {
        self.appended = Some(Attachment::from_right_edge(text, upper_right, lower_right));
    }

    pub fn discard_prepend(&mut self) -> Option<Attachment> {
        self.prepended.take()
    }

    pub fn discard_append(&mut self) -> Option<Attachment> {
        self.appended.take()
    }

    pub fn prepended_text(&self) -> &str {
        self.prepended.as_ref().map_or("", |a| a.text())
    }

    /// Checks that the unit is usable for grouping.
    ///
    /// `index` is the unit's position in the input and is reported in errors.
    pub fn validate(&self, index: usize) -> Result<()> {
        let invalid = |field, reason: &str| GroupingError::InvalidUnit {
            index,
            field,
            reason: reason.to_string(),
        };

        if self.text.is_empty() {
            return Err(invalid(UnitField::Text, "must not be empty"));
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(GroupingError::InvalidUnit {
                index,
                field: UnitField::Confidence,
                reason: format!("{} is outside [0, 1]", self.confidence),
            });
        }

        let limit = MAX_COORDINATE.unsigned_abs();
        let in_range = |p: &Point| p.x.unsigned_abs() <= limit && p.y.unsigned_abs() <= limit;
        let attachments = [self.prepended.as_ref(), self.appended.as_ref()];
        let mut quads =
            std::iter::once(&self.quad).chain(attachments.into_iter().flatten().map(Attachment::quad));
        if !quads.all(|q| {
            [q.upper_left, q.upper_right, q.lower_right, q.lower_left]
                .iter()
                .all(in_range)
        }) {
            return Err(GroupingError::InvalidUnit {
                index,
                field: UnitField::Corners,
                reason: format!("coordinate outside [-{MAX_COORDINATE}, {MAX_COORDINATE}]"),
            });
        }

        let q = &self.quad;
        if q.upper_right.x < q.upper_left.x || q.lower_right.x < q.lower_left.x {
            return Err(invalid(UnitField::Corners, "right edge lies left of left edge"));
        }
        if q.lower_left.y < q.upper_left.y || q.lower_right.y < q.upper_right.y {
            return Err(invalid(UnitField::Corners, "lower edge lies above upper edge"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(text: &str, x0: i32, x1: i32) -> MinimumUnit {
        MinimumUnit::from_rect(text, (x0, 0, x1, 10), 0.9, UnitType::Cjk)
    }

    #[test]
    fn display_text_includes_attachments() {
        let mut u = unit("A", 10, 20);
        u.prepend_text("(", Point::new(5, 0), Point::new(5, 10));
        u.append_text(")", Point::new(25, 0), Point::new(25, 10));
        assert_eq!(u.display_text(), "(A)");
        assert_eq!(u.prepended_text(), "(");
    }

    #[test]
    fn latin_units_get_trailing_space() {
        let u = MinimumUnit::from_rect("word", (0, 0, 40, 10), 0.9, UnitType::Latin);
        assert_eq!(u.display_text(), "word ");
    }

    #[test]
    fn real_corners_defer_to_attachments() {
        let mut u = unit("A", 10, 20);
        assert_eq!(u.real_upper_left(), Point::new(10, 0));
        assert_eq!(u.width(), 10);
        assert_eq!(u.height(), 10);

        u.prepend(Attachment::new("「", Quad::from_rect(2, 0, 8, 10)));
        u.append(Attachment::new("」", Quad::from_rect(22, 0, 30, 12)));
        assert_eq!(u.real_upper_left(), Point::new(2, 0));
        assert_eq!(u.real_lower_left(), Point::new(2, 10));
        assert_eq!(u.real_upper_right(), Point::new(30, 0));
        assert_eq!(u.real_lower_right(), Point::new(30, 12));
        assert_eq!(u.width(), 28);
        assert_eq!(u.vertical_extent(), (0, 12));

        assert!(u.discard_prepend().is_some());
        assert!(u.discard_append().is_some());
        assert_eq!(u.real_upper_left(), Point::new(10, 0));
        assert_eq!(u.prepended_text(), "");
    }

    #[test]
    fn attaching_overwrites_previous_mark() {
        let mut u = unit("A", 10, 20);
        u.append_text(",", Point::new(22, 0), Point::new(22, 10));
        u.append_text(";", Point::new(24, 0), Point::new(24, 10));
        assert_eq!(u.display_text(), "A;");
    }

    #[test]
    fn to_attachment_drops_nested_marks() {
        let mut u = unit("A", 10, 20);
        u.append_text(",", Point::new(22, 0), Point::new(22, 10));
        let att = u.to_attachment();
        assert_eq!(att.text(), "A");
        assert_eq!(att.quad().upper_right, Point::new(20, 0));
    }

    #[test]
    fn center_truncates() {
        let u = MinimumUnit::from_rect("A", (0, 0, 3, 3), 1.0, UnitType::Cjk);
        assert_eq!(u.center(), Point::new(1, 1));
    }

    #[test]
    fn center_of_far_corners_does_not_overflow() {
        let u = MinimumUnit::from_rect("A", (0, i32::MAX - 10, 10, i32::MAX), 1.0, UnitType::Cjk);
        assert_eq!(u.center(), Point::new(5, i32::MAX - 5));
    }

    #[test]
    fn validate_rejects_coordinates_out_of_range() {
        let edge = MinimumUnit::from_rect(
            "A",
            (-MAX_COORDINATE, MAX_COORDINATE - 10, -MAX_COORDINATE + 10, MAX_COORDINATE),
            1.0,
            UnitType::Cjk,
        );
        assert!(edge.validate(0).is_ok());

        let far =
            MinimumUnit::from_rect("A", (0, 600_000_000, 10, 600_000_010), 1.0, UnitType::Cjk);
        assert!(matches!(
            far.validate(2),
            Err(GroupingError::InvalidUnit {
                index: 2,
                field: UnitField::Corners,
                ..
            })
        ));

        let mut attached = unit("A", 0, 10);
        attached.append_text(")", Point::new(i32::MIN, 0), Point::new(12, 10));
        assert!(matches!(
            attached.validate(0),
            Err(GroupingError::InvalidUnit {
                field: UnitField::Corners,
                ..
            })
        ));
    }

    #[test]
    fn validate_reports_offending_field() {
        assert!(unit("A", 0, 10).validate(0).is_ok());

        let empty = unit("", 0, 10);
        assert!(matches!(
            empty.validate(3),
            Err(GroupingError::InvalidUnit {
                index: 3,
                field: UnitField::Text,
                ..
            })
        ));

        let bad_conf = MinimumUnit::from_rect("A", (0, 0, 10, 10), 1.5, UnitType::Cjk);
        assert!(matches!(
            bad_conf.validate(0),
            Err(GroupingError::InvalidUnit {
                field: UnitField::Confidence,
                ..
            })
        ));

        let nan_conf = MinimumUnit::from_rect("A", (0, 0, 10, 10), f64::NAN, UnitType::Cjk);
        assert!(nan_conf.validate(0).is_err());

        let flipped = MinimumUnit::from_rect("A", (10, 0, 0, 10), 0.5, UnitType::Cjk);
        assert!(matches!(
            flipped.validate(1),
            Err(GroupingError::InvalidUnit {
                field: UnitField::Corners,
                ..
            })
        ));
    }
}
