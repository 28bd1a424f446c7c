//! Punctuation lookup for single-glyph text.
//!
//! Each predicate is a constant-time membership test against a fixed glyph
//! set. Text that is in no set is not punctuation.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Marks that end a region as soon as they are attached.
static STOP: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| [":", ".", "。"].into_iter().collect());

static SPECIAL: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| [",", ":", ".", "/", "／"].into_iter().collect());

/// Marks that close a clause; the boundary is honored at the next gap.
static SPLIT: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["、", ";", "!", "?", "。", "！", "？"].into_iter().collect());

/// Connective marks that glue the preceding token to the following one.
static JOIN: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["-", "'", "・", "@"].into_iter().collect());

static LEFT_BRACKET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "(", "⦅", "{", "[", "<", "（", "「", "『", "［", "【", "＜", "｟", "〚", "｛", "《", "⟪",
        "〖", "〈",
    ]
    .into_iter()
    .collect()
});

static RIGHT_BRACKET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        ")", "⦆", "}", "]", ">", "）", "」", "』", "］", "】", "＞", "｠", "〛", "｝", "》", "⟫",
        "〗", "〉",
    ]
    .into_iter()
    .collect()
});

const VERTICAL_BAR: &str = "|";

/// Role of a punctuation glyph during grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctuationKind {
    Stop,
    Split,
    Join,
    LeftBracket,
    RightBracket,
    Special,
}

/// Classifies `text`, returning the first matching role.
///
/// Roles are checked in the order of [`PunctuationKind`]'s variants, so a
/// glyph that is both a stop and a split mark (`。`) reports `Stop`.
pub fn classify(text: &str) -> Option<PunctuationKind> {
    if is_stop(text) {
        Some(PunctuationKind::Stop)
    } else if is_split(text) {
        Some(PunctuationKind::Split)
    } else if is_join(text) {
        Some(PunctuationKind::Join)
    } else if is_left_bracket(text) {
        Some(PunctuationKind::LeftBracket)
    } else if is_right_bracket(text) {
        Some(PunctuationKind::RightBracket)
    } else if is_special(text) {
        Some(PunctuationKind::Special)
    } else {
        None
    }
}

pub fn is_punctuation(text: &str) -> bool {
    is_special(text)
        || is_join(text)
        || is_split(text)
        || is_left_bracket(text)
        || is_right_bracket(text)
}

pub fn is_stop(text: &str) -> bool {
    STOP.contains(text)
}

pub fn is_special(text: &str) -> bool {
    SPECIAL.contains(text)
}

pub fn is_join(text: &str) -> bool {
    JOIN.contains(text)
}

pub fn is_split(text: &str) -> bool {
    SPLIT.contains(text)
}

pub fn is_left_bracket(text: &str) -> bool {
    LEFT_BRACKET.contains(text)
}

pub fn is_right_bracket(text: &str) -> bool {
    RIGHT_BRACKET.contains(text)
}

pub fn is_vertical_bar(text: &str) -> bool {
    text == VERTICAL_BAR
}
