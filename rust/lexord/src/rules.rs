//! Tailoring rule parser.
//!
//! The grammar is the reset/relation subset used by the built-in locale data
//! and accepted from callers:
//!
//! ```text
//! rules    := (reset chain)*
//! reset    := '&' target
//! chain    := (relation target)*
//! relation := '<' | '<<' | '<<<' | '='
//! target   := one non-syntax character
//! ```
//!
//! Whitespace between tokens is ignored. `<` orders the target after the
//! anchor at the primary level, `<<` at the secondary level, `<<<` at the
//! tertiary level, and `=` makes it equivalent. Each relation re-anchors on
//! its target, so `&a<b<c` chains naturally.
//!
//! Tailored weights are carved out of the fractional space the implicit
//! weights leave free (one byte below every primary, a bounded gap at the
//! secondary and tertiary levels), so a long enough chain exhausts the space
//! and is reported as a syntax error rather than producing wrong order.

use lexord_common::{Result, error::Error};

use crate::weights::{
    CollationElement, SECONDARY_COMMON, TERTIARY_LOWER, TERTIARY_UPPER, Tailoring,
    element_for_char,
};

/// Secondary tailoring slots available below the combining-mark region.
const SECONDARY_GAP: u16 = 0x1F;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Relation {
    Primary,
    Secondary,
    Tertiary,
    Equal,
}

/// Parses rule text into a tailoring, layered on top of `base` (built-in
/// locale rules compile with an empty base; caller rules compile on top of
/// the locale's).
pub(crate) fn parse(text: &str, base: &Tailoring) -> Result<Tailoring> {
    let mut tailoring = base.clone();
    let mut cursor = Cursor::new(text);
    cursor.skip_ws();
    if cursor.at_end() {
        return Ok(tailoring);
    }
    while !cursor.at_end() {
        if !cursor.eat('&') {
            return Err(Error::rule_syntax(cursor.pos, "expected '&' reset"));
        }
        cursor.skip_ws();
        let anchor_char = cursor.target()?;
        let mut anchor = element_for_char(anchor_char, &tailoring).element;
        cursor.skip_ws();
        let mut chained = false;
        while let Some(relation) = cursor.relation()? {
            cursor.skip_ws();
            let target = cursor.target()?;
            anchor = tailored_element(anchor, relation, cursor.pos)?;
            tailoring.insert(target, anchor);
            cursor.skip_ws();
            chained = true;
        }
        if !chained {
            return Err(Error::rule_syntax(cursor.pos, "reset without relations"));
        }
    }
    Ok(tailoring)
}

/// Derives the element one step after `anchor` at the relation's level.
fn tailored_element(anchor: CollationElement, relation: Relation, pos: usize) -> Result<CollationElement> {
    match relation {
        Relation::Primary => {
            if anchor.primary & 0xFF == 0xFF {
                return Err(Error::rule_syntax(pos, "primary tailoring space exhausted"));
            }
            Ok(CollationElement {
                primary: anchor.primary + 1,
                secondary: SECONDARY_COMMON,
                tertiary: TERTIARY_LOWER,
            })
        }
        Relation::Secondary => {
            if anchor.secondary >= SECONDARY_COMMON + SECONDARY_GAP {
                return Err(Error::rule_syntax(pos, "secondary tailoring space exhausted"));
            }
            Ok(CollationElement {
                primary: anchor.primary,
                secondary: anchor.secondary + 1,
                tertiary: TERTIARY_LOWER,
            })
        }
        Relation::Tertiary => {
            let limit = if anchor.tertiary < TERTIARY_UPPER {
                TERTIARY_UPPER - 1
            } else {
                TERTIARY_UPPER + (TERTIARY_UPPER - TERTIARY_LOWER) - 1
            };
            if anchor.tertiary >= limit {
                return Err(Error::rule_syntax(pos, "tertiary tailoring space exhausted"));
            }
            Ok(CollationElement {
                tertiary: anchor.tertiary + 1,
                ..anchor
            })
        }
        Relation::Equal => Ok(anchor),
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Cursor<'a> {
        Cursor { text, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    /// Next relation operator, or `None` at a reset boundary or end of text.
    fn relation(&mut self) -> Result<Option<Relation>> {
        match self.peek() {
            None | Some('&') => Ok(None),
            Some('=') => {
                self.bump();
                Ok(Some(Relation::Equal))
            }
            Some('<') => {
                self.bump();
                if self.eat('<') {
                    if self.eat('<') {
                        Ok(Some(Relation::Tertiary))
                    } else {
                        Ok(Some(Relation::Secondary))
                    }
                } else {
                    Ok(Some(Relation::Primary))
                }
            }
            Some(c) => Err(Error::rule_syntax(
                self.pos,
                format!("expected a relation, found '{c}'"),
            )),
        }
    }

    /// One relation target character. Multi-character targets (contractions)
    /// are not part of the accepted grammar and surface here as the stray
    /// character failing the following relation parse.
    fn target(&mut self) -> Result<char> {
        match self.bump() {
            Some(c) if !matches!(c, '&' | '<' | '=') => Ok(c),
            Some(c) => Err(Error::rule_syntax(
                self.pos,
                format!("expected a target character, found '{c}'"),
            )),
            None => Err(Error::rule_syntax(self.pos, "unexpected end of rules")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::implicit_primary;

    fn parse_rules(text: &str) -> Tailoring {
        parse(text, &Tailoring::default()).unwrap()
    }

    #[test]
    fn empty_rules_are_valid() {
        assert!(parse("", &Tailoring::default()).is_ok());
        assert!(parse("   ", &Tailoring::default()).is_ok());
    }

    #[test]
    fn primary_relation_inserts_after_anchor() {
        let tailoring = parse_rules("&a<b");
        let b = tailoring.get('b').unwrap();
        assert_eq!(b.primary, implicit_primary('a') + 1);
        assert!(b.primary < implicit_primary('b'));
    }

    #[test]
    fn chained_relations_re_anchor() {
        let tailoring = parse_rules("&a<b<c<<d<<<e=f");
        let b = tailoring.get('b').unwrap();
        let c = tailoring.get('c').unwrap();
        let d = tailoring.get('d').unwrap();
        let e = tailoring.get('e').unwrap();
        let f = tailoring.get('f').unwrap();
        assert!(b.primary < c.primary);
        assert_eq!(d.primary, c.primary);
        assert!(d.secondary > c.secondary);
        assert_eq!((e.primary, e.secondary), (d.primary, d.secondary));
        assert!(e.tertiary > d.tertiary);
        assert_eq!(f, e);
    }

    #[test]
    fn multiple_resets() {
        let tailoring = parse_rules("&a<b &x<<y");
        assert!(tailoring.get('b').is_some());
        let x = element_for_char('x', &Tailoring::default()).element;
        let y = tailoring.get('y').unwrap();
        assert_eq!(y.primary, x.primary);
        assert!(y.secondary > x.secondary);
    }

    #[test]
    fn syntax_errors_carry_position() {
        let err = parse("a<b", &Tailoring::default()).unwrap_err();
        assert!(err.to_string().contains("offset 0"));

        let err = parse("&a<", &Tailoring::default()).unwrap_err();
        assert!(err.to_string().contains("unexpected end"));

        let err = parse("&a", &Tailoring::default()).unwrap_err();
        assert!(err.to_string().contains("reset without relations"));
    }

    #[test]
    fn tailoring_space_is_bounded() {
        let mut rules = String::from("&a");
        for _ in 0..600 {
            rules.push_str("<\u{3041}");
        }
        assert!(parse(&rules, &Tailoring::default()).is_err());
    }

    #[test]
    fn base_tailoring_is_layered() {
        let base = parse_rules("&a<b");
        let combined = parse("&b<q", &base).unwrap();
        let b = combined.get('b').unwrap();
        let q = combined.get('q').unwrap();
        assert_eq!(q.primary, b.primary + 1);
    }
}
