//! Binary sort-key encoding.
//!
//! A key is the concatenation of each enabled level's weight sequence as
//! fixed-width big-endian groups, with a `0x01` separator between levels and
//! a `0x00` terminator. Every weight's leading byte is at least `0x02`, so
//! byte-lexicographic comparison of two keys proceeds level by level exactly
//! like [`crate::Collator::compare`] does over the same weight streams.
//!
//! Encoding always reports the number of bytes the full key requires and
//! writes only what fits in the destination, which is what enables the
//! try-small/measure/retry-large protocol in [`crate::Collator::sort_key`].

use crate::attrs::Attributes;
use crate::weights::{Tailoring, enabled_levels, level_weights};

const LEVEL_SEPARATOR: u8 = 0x01;
const TERMINATOR: u8 = 0x00;

/// Stack probe size for the first encoding pass; sized for the overwhelmingly
/// common case so most keys never touch the heap.
pub(crate) const SORT_KEY_PROBE: usize = 128;

/// Destination wrapper that truncates writes but keeps counting.
pub(crate) struct KeyWriter<'a> {
    dest: &'a mut [u8],
    required: usize,
    weights: usize,
}

impl<'a> KeyWriter<'a> {
    pub fn new(dest: &'a mut [u8]) -> KeyWriter<'a> {
        KeyWriter {
            dest,
            required: 0,
            weights: 0,
        }
    }

    fn push(&mut self, byte: u8) {
        if self.required < self.dest.len() {
            self.dest[self.required] = byte;
        }
        self.required += 1;
    }

    fn push_weight(&mut self, weight: u32, width: usize) {
        self.weights += 1;
        for shift in (0..width).rev() {
            self.push((weight >> (shift * 8)) as u8);
        }
    }

    /// Bytes the complete key needs, regardless of destination capacity.
    pub fn required(&self) -> usize {
        self.required
    }

    pub fn weight_count(&self) -> usize {
        self.weights
    }
}

/// Encodes the sort key of `source` into `dest`, returning the required
/// length. A return of zero means the source produced no collation weights at
/// any enabled level (the empty-key case, distinct from an error).
pub(crate) fn write_sort_key(
    tailoring: &Tailoring,
    attrs: &Attributes,
    source: &str,
    dest: &mut [u8],
) -> usize {
    let mut writer = KeyWriter::new(dest);
    let mut weights = Vec::new();
    for (index, level) in enabled_levels(attrs).into_iter().enumerate() {
        if index > 0 {
            writer.push(LEVEL_SEPARATOR);
        }
        level_weights(source, tailoring, attrs, level, &mut weights);
        for &weight in &weights {
            writer.push_weight(weight, level.weight_width());
        }
    }
    writer.push(TERMINATOR);
    if writer.weight_count() == 0 {
        return 0;
    }
    writer.required()
}
