//! Collation weight synthesis: the wrapped "underlying engine".
//!
//! Every public operation of the crate (comparison, sort keys, element
//! iteration) draws from the single element source defined here, which is what
//! makes the byte order of sort keys agree with [`crate::Collator::compare`]
//! by construction.
//!
//! The weight model is deliberately compact. Each Unicode scalar yields one
//! element with three weights:
//!
//! - **primary** (`u32`): the case-folded code point, offset into a reserved
//!   region and left-shifted by one byte so that rule tailorings can insert
//!   up to 255 characters between any two implicit primaries,
//! - **secondary** (`u16`): a common weight for base characters; combining
//!   marks are primary-ignorable and carry a mark-derived secondary,
//! - **tertiary** (`u16`): the case distinction (lowercase before uppercase).
//!
//! Numeric collation replaces a digit run with a run-length element followed
//! by per-digit elements, which orders runs by magnitude before digit value.

use tinyvec::TinyVec;
use unicode_segmentation::UnicodeSegmentation;

use crate::attrs::{Alternate, Attributes, CaseFirst, Strength};

/// Region offset keeping all implicit primaries above the tailoring floor.
const PRIMARY_BASE: u32 = 0x2_0000;

/// Common secondary weight of non-mark characters.
pub(crate) const SECONDARY_COMMON: u16 = 0x0200;

/// Secondary region for combining marks, above the common weight.
const MARK_SECONDARY_BASE: u16 = 0x0220;

pub(crate) const TERTIARY_LOWER: u16 = 0x02;
pub(crate) const TERTIARY_UPPER: u16 = 0x08;

/// Distance between the lowercase and uppercase tertiary regions; tailoring
/// chains must stay within one region (see `rules`).
pub(crate) const TERTIARY_CASE_SPAN: u16 = TERTIARY_UPPER - TERTIARY_LOWER;

/// Quaternary filler for non-variable elements under shifted handling.
const QUATERNARY_COMMON: u32 = 0xFFFF_FF00;

/// Offset applied to code points at the identical level so that every weight
/// byte group starts above the level separator.
const IDENTICAL_BASE: u32 = 0x0200_0000;

/// Longest digit run distinguished by magnitude under numeric collation.
pub(crate) const MAX_DIGIT_RUN: usize = 254;

/// One collation element: the weight triple produced for a source scalar (or
/// for a digit run under numeric collation).
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CollationElement {
    pub primary: u32,
    pub secondary: u16,
    pub tertiary: u16,
}

impl CollationElement {
    /// True for elements that carry no primary distinction (combining marks,
    /// shifted-away variables).
    pub fn is_primary_ignorable(&self) -> bool {
        self.primary == 0
    }
}

/// An element annotated with whether its source character is variable
/// (subject to shifted alternate handling).
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub(crate) struct ScanElement {
    pub element: CollationElement,
    pub variable: bool,
}

/// Character-to-element overrides produced by rule tailoring.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tailoring {
    map: ahash::AHashMap<char, CollationElement>,
}

impl Tailoring {
    pub fn get(&self, c: char) -> Option<CollationElement> {
        self.map.get(&c).copied()
    }

    pub fn insert(&mut self, c: char, element: CollationElement) {
        self.map.insert(c, element);
    }
}

/// Implicit primary weight of a (case-folded) character.
pub(crate) fn implicit_primary(c: char) -> u32 {
    (PRIMARY_BASE + c as u32) << 8
}

/// Simple case folding: the single-scalar lowercase mapping, or the character
/// itself when the full mapping expands.
pub(crate) fn fold_case(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Compact combining-mark classifier covering the common nonspacing ranges.
fn is_combining_mark(c: char) -> bool {
    matches!(
        c as u32,
        0x0300..=0x036F
            | 0x0483..=0x0489
            | 0x0591..=0x05BD
            | 0x0610..=0x061A
            | 0x064B..=0x065F
            | 0x06D6..=0x06DC
            | 0x0730..=0x074A
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x20D0..=0x20FF
            | 0xFE20..=0xFE2F
    )
}

/// Variable characters are demoted to the quaternary level under shifted
/// alternate handling.
fn is_variable(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation()
}

/// Synthesizes the element for one scalar: tailoring override first, then the
/// case-folded tailoring (uppercase of a tailored lowercase keeps its primary
/// and secondary), then mark or implicit weights.
pub(crate) fn element_for_char(c: char, tailoring: &Tailoring) -> ScanElement {
    let variable = is_variable(c);
    if let Some(element) = tailoring.get(c) {
        return ScanElement { element, variable };
    }
    let folded = fold_case(c);
    if folded != c {
        if let Some(element) = tailoring.get(folded) {
            return ScanElement {
                element: CollationElement {
                    tertiary: TERTIARY_UPPER,
                    ..element
                },
                variable,
            };
        }
    }
    if is_combining_mark(c) {
        return ScanElement {
            element: CollationElement {
                primary: 0,
                secondary: MARK_SECONDARY_BASE + ((c as u32) & 0x1FF) as u16,
                tertiary: TERTIARY_LOWER,
            },
            variable: false,
        };
    }
    let tertiary = if c != folded {
        TERTIARY_UPPER
    } else {
        TERTIARY_LOWER
    };
    ScanElement {
        element: CollationElement {
            primary: implicit_primary(folded),
            secondary: SECONDARY_COMMON,
            tertiary,
        },
        variable,
    }
}

/// Pending-element buffer: large enough inline for any grapheme cluster or
/// short digit run seen in practice.
pub(crate) type ElementBuf = TinyVec<[ScanElement; 8]>;

/// Appends the elements of one grapheme cluster, one per scalar.
pub(crate) fn push_grapheme_elements(grapheme: &str, tailoring: &Tailoring, out: &mut ElementBuf) {
    for c in grapheme.chars() {
        out.push(element_for_char(c, tailoring));
    }
}

/// Appends the elements of one ASCII digit run under numeric collation: a
/// run-length element (magnitude) followed by one element per significant
/// digit. Leading zeros do not participate.
pub(crate) fn push_digit_run_elements(run: &str, out: &mut ElementBuf) {
    let significant = run.trim_start_matches('0');
    let significant = if significant.is_empty() {
        &run[run.len() - 1..]
    } else {
        significant
    };
    let magnitude = significant.len().min(MAX_DIGIT_RUN) as u32;
    out.push(ScanElement {
        element: CollationElement {
            primary: implicit_primary('0') | magnitude,
            secondary: SECONDARY_COMMON,
            tertiary: TERTIARY_LOWER,
        },
        variable: false,
    });
    for digit in significant.chars() {
        out.push(ScanElement {
            element: CollationElement {
                primary: implicit_primary(digit),
                secondary: SECONDARY_COMMON,
                tertiary: TERTIARY_LOWER,
            },
            variable: false,
        });
    }
}

/// True for the run-length elements produced by numeric collation.
pub(crate) fn is_numeric_run_element(element: CollationElement) -> bool {
    element.primary & 0xFF != 0 && element.primary >> 8 == PRIMARY_BASE + '0' as u32
}

/// Forward scanner over the element sequence of a string.
pub(crate) struct ElementScan<'a> {
    text: &'a str,
    tailoring: &'a Tailoring,
    numeric: bool,
    byte_pos: usize,
    pending: ElementBuf,
    pending_idx: usize,
}

impl<'a> ElementScan<'a> {
    pub fn new(text: &'a str, tailoring: &'a Tailoring, numeric: bool) -> ElementScan<'a> {
        ElementScan {
            text,
            tailoring,
            numeric,
            byte_pos: 0,
            pending: ElementBuf::default(),
            pending_idx: 0,
        }
    }
}

impl Iterator for ElementScan<'_> {
    type Item = ScanElement;

    fn next(&mut self) -> Option<ScanElement> {
        loop {
            if self.pending_idx < self.pending.len() {
                let element = self.pending[self.pending_idx];
                self.pending_idx += 1;
                return Some(element);
            }
            if self.byte_pos >= self.text.len() {
                return None;
            }
            self.pending.clear();
            self.pending_idx = 0;
            let rest = &self.text[self.byte_pos..];
            if self.numeric && rest.starts_with(|c: char| c.is_ascii_digit()) {
                let end = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                push_digit_run_elements(&rest[..end], &mut self.pending);
                self.byte_pos += end;
            } else {
                let Some(grapheme) = rest.graphemes(true).next() else {
                    return None;
                };
                push_grapheme_elements(grapheme, self.tailoring, &mut self.pending);
                self.byte_pos += grapheme.len();
            }
        }
    }
}

/// The ordered comparison levels a collator configuration enables.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Level {
    Primary,
    Secondary,
    Case,
    Tertiary,
    Quaternary,
    Identical,
}

impl Level {
    /// Big-endian byte width of one weight of this level in a sort key.
    pub fn weight_width(&self) -> usize {
        match self {
            Level::Primary | Level::Quaternary | Level::Identical => 4,
            Level::Secondary => 2,
            Level::Case | Level::Tertiary => 1,
        }
    }
}

/// Levels in comparison order for the given attribute set.
pub(crate) fn enabled_levels(attrs: &Attributes) -> Vec<Level> {
    let mut levels = vec![Level::Primary];
    if attrs.strength >= Strength::Secondary {
        levels.push(Level::Secondary);
    }
    if attrs.case_level {
        levels.push(Level::Case);
    }
    if attrs.strength >= Strength::Tertiary {
        levels.push(Level::Tertiary);
    }
    if attrs.strength >= Strength::Quaternary && attrs.alternate == Alternate::Shifted {
        levels.push(Level::Quaternary);
    }
    if attrs.strength == Strength::Identical {
        levels.push(Level::Identical);
    }
    levels
}

/// Collects the weight sequence of `text` at one level into `out` (cleared
/// first). French secondary ordering reverses the secondary sequence.
pub(crate) fn level_weights(
    text: &str,
    tailoring: &Tailoring,
    attrs: &Attributes,
    level: Level,
    out: &mut Vec<u32>,
) {
    out.clear();
    if level == Level::Identical {
        out.extend(text.chars().map(|c| IDENTICAL_BASE + c as u32));
        return;
    }
    let shifted = attrs.alternate == Alternate::Shifted;
    for scan in ElementScan::new(text, tailoring, attrs.numeric) {
        let e = scan.element;
        let demoted = shifted && scan.variable;
        match level {
            Level::Primary => {
                if !demoted && e.primary != 0 {
                    out.push(e.primary);
                }
            }
            Level::Secondary => {
                if !demoted && e.secondary != 0 {
                    out.push(e.secondary as u32);
                }
            }
            Level::Case => {
                if !demoted && e.primary != 0 {
                    out.push(case_weight(e.tertiary, attrs.case_first) as u32);
                }
            }
            Level::Tertiary => {
                if !demoted && e.tertiary != 0 {
                    out.push(tertiary_weight(e.tertiary, attrs) as u32);
                }
            }
            Level::Quaternary => {
                if demoted {
                    out.push(e.primary);
                } else if e.primary != 0 {
                    out.push(QUATERNARY_COMMON);
                }
            }
            Level::Identical => unreachable!("handled above"),
        }
    }
    if level == Level::Secondary && attrs.french {
        out.reverse();
    }
}

fn is_upper_tertiary(tertiary: u16) -> bool {
    tertiary >= TERTIARY_UPPER
}

/// Case-level weight: the preferred case sorts first.
fn case_weight(tertiary: u16, case_first: CaseFirst) -> u16 {
    let upper = is_upper_tertiary(tertiary);
    let first = match case_first {
        CaseFirst::UpperFirst => upper,
        CaseFirst::Off | CaseFirst::LowerFirst => !upper,
    };
    if first { 0x02 } else { 0x04 }
}

/// Tertiary weight after case-first and case-level adjustments. With a
/// separate case level the tertiary is stripped of its case bits; with
/// upper-first the two case regions swap.
fn tertiary_weight(tertiary: u16, attrs: &Attributes) -> u16 {
    if attrs.case_level {
        if is_upper_tertiary(tertiary) {
            tertiary - TERTIARY_CASE_SPAN
        } else {
            tertiary
        }
    } else if attrs.case_first == CaseFirst::UpperFirst {
        if is_upper_tertiary(tertiary) {
            tertiary - TERTIARY_CASE_SPAN
        } else {
            tertiary + TERTIARY_CASE_SPAN
        }
    } else {
        tertiary
    }
}

/// Worst-case number of source characters that can produce `element` under a
/// collator with the given numeric setting. Only numeric run-length elements
/// aggregate more than one character in this engine.
pub(crate) fn max_expansion(element: CollationElement, numeric: bool) -> usize {
    if numeric && is_numeric_run_element(element) {
        MAX_DIGIT_RUN
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(text: &str, attrs: &Attributes, level: Level) -> Vec<u32> {
        let mut out = Vec::new();
        level_weights(text, &Tailoring::default(), attrs, level, &mut out);
        out
    }

    #[test]
    fn implicit_primaries_follow_code_points() {
        assert!(implicit_primary('a') < implicit_primary('b'));
        assert!(implicit_primary('z') < implicit_primary('\u{e9}'));
    }

    #[test]
    fn case_is_tertiary_only() {
        let a = element_for_char('a', &Tailoring::default()).element;
        let upper_a = element_for_char('A', &Tailoring::default()).element;
        assert_eq!(a.primary, upper_a.primary);
        assert_eq!(a.secondary, upper_a.secondary);
        assert!(a.tertiary < upper_a.tertiary);
    }

    #[test]
    fn combining_marks_are_primary_ignorable() {
        let acute = element_for_char('\u{301}', &Tailoring::default()).element;
        assert!(acute.is_primary_ignorable());
        assert!(acute.secondary > SECONDARY_COMMON);
    }

    #[test]
    fn shifted_punctuation_leaves_primary_level() {
        let mut attrs = Attributes::default();
        assert_eq!(weights("a b", &attrs, Level::Primary).len(), 3);
        attrs.alternate = Alternate::Shifted;
        assert_eq!(weights("a b", &attrs, Level::Primary).len(), 2);
        assert_eq!(
            weights("a b", &attrs, Level::Primary),
            weights("ab", &attrs, Level::Primary)
        );
    }

    #[test]
    fn numeric_runs_order_by_magnitude() {
        let attrs = Attributes {
            numeric: true,
            ..Attributes::default()
        };
        let nine = weights("9", &attrs, Level::Primary);
        let ten = weights("10", &attrs, Level::Primary);
        let twelve = weights("12", &attrs, Level::Primary);
        assert!(nine < ten, "9 must collate before 10");
        assert!(ten < twelve);
    }

    #[test]
    fn numeric_leading_zeros_are_insignificant() {
        let attrs = Attributes {
            numeric: true,
            ..Attributes::default()
        };
        assert_eq!(
            weights("007", &attrs, Level::Primary),
            weights("7", &attrs, Level::Primary)
        );
        assert_eq!(
            weights("000", &attrs, Level::Primary),
            weights("0", &attrs, Level::Primary)
        );
    }

    #[test]
    fn french_reverses_secondaries() {
        let attrs = Attributes {
            french: true,
            ..Attributes::default()
        };
        let plain = Attributes::default();
        let forward = weights("e\u{301}a\u{300}", &plain, Level::Secondary);
        let mut reversed = weights("e\u{301}a\u{300}", &attrs, Level::Secondary);
        reversed.reverse();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn enabled_levels_track_strength() {
        let mut attrs = Attributes::default();
        assert_eq!(
            enabled_levels(&attrs),
            vec![Level::Primary, Level::Secondary, Level::Tertiary]
        );
        attrs.strength = Strength::Primary;
        assert_eq!(enabled_levels(&attrs), vec![Level::Primary]);
        attrs.strength = Strength::Identical;
        attrs.case_level = true;
        assert_eq!(
            enabled_levels(&attrs),
            vec![
                Level::Primary,
                Level::Secondary,
                Level::Case,
                Level::Tertiary,
                Level::Identical
            ]
        );
    }

    #[test]
    fn scan_is_restartable_per_call() {
        let tailoring = Tailoring::default();
        let first: Vec<_> = ElementScan::new("abc", &tailoring, false).collect();
        let second: Vec<_> = ElementScan::new("abc", &tailoring, false).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
