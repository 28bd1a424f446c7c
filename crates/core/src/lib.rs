//! unitgroup - groups recognized glyph units into word and phrase regions.
//!
//! Input is a reading-ordered list of [`MinimumUnit`]s from a recognizer,
//! optionally with separator lines (table borders) indexed in an
//! [`ObstructionIndex`]. [`Grouper::group`] merges units into
//! [`GroupedRegion`]s and partitions them by confidence.

pub mod error;
pub mod geometry;
pub mod grouping;
pub mod obstruction;
pub mod order;
pub mod params;
pub mod punctuation;
pub mod region;
pub mod threshold;
pub mod unit;

pub use error::{GroupingError, Result, UnitField};
pub use geometry::{Point, Rect};
pub use grouping::{Grouper, group_units, is_same_line};
pub use obstruction::{LineSegment, ObstructionIndex};
pub use order::sort_reading_order;
pub use params::GroupingParams;
pub use punctuation::PunctuationKind;
pub use region::{GroupedRegion, GroupedResult, combine_units};
pub use threshold::{MergeThresholdKind, ThresholdFn, ThresholdRegistry};
pub use unit::{Attachment, MinimumUnit, MinimumUnitBuilder, Quad, UnitType};
