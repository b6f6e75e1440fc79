//! Element-by-element iteration over a string's collation weights.
//!
//! An [`ElementIterator`] binds a borrowed [`Collator`] to one source string.
//! The string's backing storage is pinned (see the `pin` module) for as long
//! as the iterator is bound to it: rebinding releases the previous pin before
//! acquiring the next, and closing releases it exactly once.
//!
//! Stepping is grapheme-cluster granular: each call that exhausts the pending
//! buffer consumes one cluster (or one digit run under numeric collation) and
//! replays its elements one at a time. Offsets are reported in source
//! character (scalar) units.

use std::sync::Arc;

use log::debug;
use unicode_segmentation::UnicodeSegmentation;

use lexord_common::{Result, error::Error};

use crate::collator::Collator;
use crate::pin::SourcePin;
use crate::weights::{
    CollationElement, ElementBuf, max_expansion, push_digit_run_elements, push_grapheme_elements,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum State {
    Bound,
    Closed,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Direction {
    Forward,
    Backward,
}

/// Iterator over the collation elements of one pinned source string.
///
/// Not for concurrent use: position and pin are single-owner mutable state.
/// The borrow of the collator keeps attribute mutation from racing iteration.
#[derive(Debug)]
pub struct ElementIterator<'a> {
    collator: &'a Collator,
    state: State,
    pin: Option<SourcePin>,
    byte_pos: usize,
    char_pos: usize,
    pending: ElementBuf,
    pending_idx: usize,
    direction: Direction,
}

impl<'a> ElementIterator<'a> {
    /// Creates an iterator bound to `source`, acquiring the text pin.
    pub(crate) fn new(collator: &'a Collator, source: Arc<str>) -> Result<ElementIterator<'a>> {
        Ok(ElementIterator {
            collator,
            state: State::Bound,
            pin: Some(SourcePin::acquire(&source)),
            byte_pos: 0,
            char_pos: 0,
            pending: ElementBuf::default(),
            pending_idx: 0,
            direction: Direction::Forward,
        })
    }

    /// Rebinds the iterator onto `source` without recreating it.
    ///
    /// The previous pin is released first; only once the new pin is held does
    /// the position reset to the start of the new text. Internal buffers are
    /// reused across rebinds.
    pub fn set_text(&mut self, source: Arc<str>) -> Result<()> {
        self.ensure_bound("set_text")?;
        if let Some(previous) = self.pin.take() {
            previous.release();
        }
        self.pin = Some(SourcePin::acquire(&source));
        self.byte_pos = 0;
        self.char_pos = 0;
        self.pending.clear();
        self.pending_idx = 0;
        self.direction = Direction::Forward;
        debug!("element iterator rebound to {} bytes of text", source.len());
        Ok(())
    }

    /// Advances one element forward. `Ok(None)` is the end-of-text sentinel
    /// and repeats on every further call.
    pub fn next(&mut self) -> Result<Option<CollationElement>> {
        self.ensure_bound("next")?;
        if self.direction == Direction::Forward && self.pending_idx < self.pending.len() {
            let element = self.pending[self.pending_idx].element;
            self.pending_idx += 1;
            return Ok(Some(element));
        }
        let mut pending = std::mem::take(&mut self.pending);
        pending.clear();
        let text = self.pinned_text("next")?;
        let step = {
            let rest = &text[self.byte_pos..];
            if rest.is_empty() {
                None
            } else if self.collator.attributes().numeric
                && rest.starts_with(|c: char| c.is_ascii_digit())
            {
                let end = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                push_digit_run_elements(&rest[..end], &mut pending);
                Some((end, rest[..end].chars().count()))
            } else if let Some(grapheme) = rest.graphemes(true).next() {
                push_grapheme_elements(grapheme, self.collator.tailoring(), &mut pending);
                Some((grapheme.len(), grapheme.chars().count()))
            } else {
                None
            }
        };
        self.pending = pending;
        let Some((bytes, chars)) = step else {
            return Ok(None);
        };
        self.byte_pos += bytes;
        self.char_pos += chars;
        self.direction = Direction::Forward;
        self.pending_idx = 1;
        Ok(Some(self.pending[0].element))
    }

    /// Steps one element backward. `Ok(None)` is the start-of-text sentinel
    /// and repeats on every further call. Elements come back in reverse of
    /// the order `next` yields them.
    pub fn previous(&mut self) -> Result<Option<CollationElement>> {
        self.ensure_bound("previous")?;
        if self.direction == Direction::Backward && self.pending_idx > 0 {
            self.pending_idx -= 1;
            return Ok(Some(self.pending[self.pending_idx].element));
        }
        let mut pending = std::mem::take(&mut self.pending);
        pending.clear();
        let text = self.pinned_text("previous")?;
        let step = {
            let prefix = &text[..self.byte_pos];
            if prefix.is_empty() {
                None
            } else if self.collator.attributes().numeric
                && prefix.ends_with(|c: char| c.is_ascii_digit())
            {
                let start = prefix
                    .char_indices()
                    .rev()
                    .find(|(_, c)| !c.is_ascii_digit())
                    .map(|(i, c)| i + c.len_utf8())
                    .unwrap_or(0);
                let run = &prefix[start..];
                push_digit_run_elements(run, &mut pending);
                Some((run.len(), run.chars().count()))
            } else if let Some(grapheme) = prefix.graphemes(true).next_back() {
                push_grapheme_elements(grapheme, self.collator.tailoring(), &mut pending);
                Some((grapheme.len(), grapheme.chars().count()))
            } else {
                None
            }
        };
        self.pending = pending;
        let Some((bytes, chars)) = step else {
            return Ok(None);
        };
        self.byte_pos -= bytes;
        self.char_pos -= chars;
        self.direction = Direction::Backward;
        self.pending_idx = self.pending.len() - 1;
        Ok(Some(self.pending[self.pending_idx].element))
    }

    /// Current position in source character units.
    pub fn offset(&self) -> usize {
        self.char_pos
    }

    /// Repositions within the bound text without rebinding it. The offset is
    /// in source character units and must lie inside `0..=len`.
    pub fn set_offset(&mut self, offset: usize) -> Result<()> {
        self.ensure_bound("set_offset")?;
        let text = self.pinned_text("set_offset")?;
        let mut byte = None;
        let mut count = 0usize;
        for (index, (byte_index, _)) in text.char_indices().enumerate() {
            if index == offset {
                byte = Some(byte_index);
            }
            count += 1;
        }
        if offset == count {
            byte = Some(text.len());
        }
        let Some(byte) = byte else {
            return Err(Error::invalid_offset(offset, count));
        };
        self.byte_pos = byte;
        self.char_pos = offset;
        self.pending.clear();
        self.pending_idx = 0;
        self.direction = Direction::Forward;
        Ok(())
    }

    /// Worst-case number of source characters that can produce `element`
    /// under the bound collator.
    pub fn max_expansion(&self, element: CollationElement) -> Result<usize> {
        self.ensure_bound("max_expansion")?;
        Ok(max_expansion(element, self.collator.attributes().numeric))
    }

    /// Returns the iteration position to the start of the bound text. The
    /// pin and collator reference are untouched.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_bound("reset")?;
        self.byte_pos = 0;
        self.char_pos = 0;
        self.pending.clear();
        self.pending_idx = 0;
        self.direction = Direction::Forward;
        Ok(())
    }

    /// Closes the iterator: releases the pin and terminal-states the
    /// iterator. Idempotent; also performed on drop.
    pub fn close(&mut self) {
        if let Some(pin) = self.pin.take() {
            pin.release();
            debug!("element iterator closed");
        }
        self.state = State::Closed;
        self.pending.clear();
        self.pending_idx = 0;
        self.byte_pos = 0;
        self.char_pos = 0;
    }

    fn ensure_bound(&self, operation: &str) -> Result<()> {
        if self.state == State::Closed {
            return Err(Error::invalid_operation(format!(
                "{operation} on closed element iterator"
            )));
        }
        Ok(())
    }

    /// The pinned text. `Bound` state implies a held pin.
    fn pinned_text(&self, operation: &str) -> Result<&str> {
        match &self.pin {
            Some(pin) => Ok(pin.text()),
            None => Err(Error::invalid_operation(format!(
                "{operation} on unpinned element iterator"
            ))),
        }
    }
}

impl Drop for ElementIterator<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::{AttributeKind, AttributeValue};

    fn collator() -> Collator {
        Collator::open("en_US").unwrap()
    }

    #[test]
    fn forward_iteration_with_offsets() {
        let collator = collator();
        let mut iter = collator.elements(Arc::from("abc")).unwrap();
        assert_eq!(iter.offset(), 0);
        let mut offsets = Vec::new();
        while let Some(_element) = iter.next().unwrap() {
            offsets.push(iter.offset());
        }
        assert_eq!(offsets, vec![1, 2, 3]);
        assert!(iter.next().unwrap().is_none());
        assert!(iter.next().unwrap().is_none());
    }

    #[test]
    fn previous_mirrors_next() {
        let collator = collator();
        let mut iter = collator.elements(Arc::from("ab")).unwrap();
        let mut forward = Vec::new();
        while let Some(element) = iter.next().unwrap() {
            forward.push(element);
        }
        let mut backward = Vec::new();
        while let Some(element) = iter.previous().unwrap() {
            backward.push(element);
        }
        backward.reverse();
        assert_eq!(forward, backward);
        assert!(iter.previous().unwrap().is_none());
        assert_eq!(iter.offset(), 0);
    }

    #[test]
    fn combining_cluster_yields_two_elements_one_offset_step() {
        let collator = collator();
        let mut iter = collator.elements(Arc::from("e\u{301}x")).unwrap();
        let first = iter.next().unwrap().unwrap();
        assert!(!first.is_primary_ignorable());
        assert_eq!(iter.offset(), 2);
        let second = iter.next().unwrap().unwrap();
        assert!(second.is_primary_ignorable());
        assert_eq!(iter.offset(), 2);
        let third = iter.next().unwrap().unwrap();
        assert!(!third.is_primary_ignorable());
        assert_eq!(iter.offset(), 3);
    }

    #[test]
    fn set_offset_repositions() {
        let collator = collator();
        let mut iter = collator.elements(Arc::from("abc")).unwrap();
        iter.set_offset(2).unwrap();
        let element = iter.next().unwrap().unwrap();
        let mut fresh = collator.elements(Arc::from("c")).unwrap();
        assert_eq!(element, fresh.next().unwrap().unwrap());
        assert!(iter.set_offset(4).is_err());
    }

    #[test]
    fn reset_restarts_iteration() {
        let collator = collator();
        let mut iter = collator.elements(Arc::from("ab")).unwrap();
        let first = iter.next().unwrap().unwrap();
        iter.next().unwrap().unwrap();
        iter.reset().unwrap();
        assert_eq!(iter.offset(), 0);
        assert_eq!(iter.next().unwrap().unwrap(), first);
    }

    #[test]
    fn set_text_releases_previous_pin() {
        let collator = collator();
        let first: Arc<str> = Arc::from("first");
        let second: Arc<str> = Arc::from("second");
        let mut iter = collator.elements(Arc::clone(&first)).unwrap();
        iter.next().unwrap().unwrap();
        assert_eq!(Arc::strong_count(&first), 2);
        iter.set_text(Arc::clone(&second)).unwrap();
        assert_eq!(Arc::strong_count(&first), 1);
        assert_eq!(Arc::strong_count(&second), 2);
        // The first string's storage can go away entirely.
        drop(first);
        let element = iter.next().unwrap().unwrap();
        let mut fresh = collator.elements(Arc::clone(&second)).unwrap();
        assert_eq!(element, fresh.next().unwrap().unwrap());
    }

    #[test]
    fn close_is_idempotent_and_terminal() {
        let collator = collator();
        let source: Arc<str> = Arc::from("abc");
        let mut iter = collator.elements(Arc::clone(&source)).unwrap();
        iter.close();
        assert_eq!(Arc::strong_count(&source), 1);
        iter.close();
        assert_eq!(Arc::strong_count(&source), 1);
        assert!(iter.next().is_err());
        assert!(iter.previous().is_err());
        assert!(iter.set_text(Arc::clone(&source)).is_err());
        assert!(iter.set_offset(0).is_err());
        assert!(iter.reset().is_err());
        assert!(iter.max_expansion(CollationElement::default()).is_err());
    }

    #[test]
    fn drop_releases_pin() {
        let collator = collator();
        let source: Arc<str> = Arc::from("abc");
        {
            let mut iter = collator.elements(Arc::clone(&source)).unwrap();
            iter.next().unwrap().unwrap();
            assert_eq!(Arc::strong_count(&source), 2);
        }
        assert_eq!(Arc::strong_count(&source), 1);
    }

    #[test]
    fn numeric_run_reports_expansion() {
        let mut collator = collator();
        collator
            .set_attribute(AttributeKind::NumericCollation, AttributeValue::On)
            .unwrap();
        let mut iter = collator.elements(Arc::from("42")).unwrap();
        let run = iter.next().unwrap().unwrap();
        assert!(iter.max_expansion(run).unwrap() > 1);
        let digit = iter.next().unwrap().unwrap();
        assert_eq!(iter.max_expansion(digit).unwrap(), 1);
        assert_eq!(iter.offset(), 2);
    }

    #[test]
    fn direction_change_mid_cluster_restarts_from_boundary() {
        let collator = collator();
        let mut iter = collator.elements(Arc::from("ab")).unwrap();
        iter.next().unwrap().unwrap();
        let back = iter.previous().unwrap().unwrap();
        let mut fresh = collator.elements(Arc::from("a")).unwrap();
        assert_eq!(back, fresh.next().unwrap().unwrap());
        assert_eq!(iter.offset(), 0);
    }
}
