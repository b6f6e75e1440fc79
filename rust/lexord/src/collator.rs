//! The collator handle: a configured ruleset plus its attribute set.
//!
//! A `Collator` is opened from a locale tag or from explicit rule text,
//! carries mutable attributes, and backs the three consumer surfaces:
//! direct comparison, sort-key encoding, and element iteration. Cloning
//! produces a deep, independent handle; dropping is closing.

use std::cmp::Ordering;
use std::sync::Arc;

use log::debug;

use lexord_common::{Result, error::Error};

use crate::attrs::{AttributeKind, AttributeValue, Attributes, NormalizationMode, Strength};
use crate::elements::ElementIterator;
use crate::sort_key::{SORT_KEY_PROBE, write_sort_key};
use crate::weights::{Tailoring, enabled_levels, level_weights};
use crate::{locale, rules};

/// Internal status code reported when built-in locale rules fail to compile.
const STATUS_BAD_LOCALE_DATA: i32 = -3;
/// Internal status code for a sort key whose measured size changed between
/// the probe and the full encoding pass.
const STATUS_KEY_SIZE_DRIFT: i32 = -7;

/// A configured collation engine instance.
///
/// Read-only operations take `&self` and may run concurrently; attribute
/// mutation takes `&mut self`, which also serializes it against any live
/// [`ElementIterator`] borrowing this handle.
#[derive(Debug, Clone)]
pub struct Collator {
    locale: Option<String>,
    base_rules: &'static str,
    user_rules: String,
    tailoring: Tailoring,
    attrs: Attributes,
}

impl Collator {
    /// Opens a collator for a locale tag such as `"en_US"`.
    ///
    /// A recognized language with an unrecognized region falls back to the
    /// language-level rules; an unrecognized or malformed tag fails with
    /// `InvalidLocale`.
    pub fn open(tag: &str) -> Result<Collator> {
        let canonical = locale::canonicalize(tag)?;
        let data = locale::resolve(tag)?;
        let tailoring = rules::parse(data.rules, &Tailoring::default()).map_err(|err| {
            Error::internal(
                STATUS_BAD_LOCALE_DATA,
                format!("locale data for '{}': {err}", data.tag),
            )
        })?;
        let attrs = Attributes {
            french: data.french,
            ..Attributes::default()
        };
        debug!("opened collator for locale '{canonical}' (data '{}')", data.tag);
        Ok(Collator {
            locale: Some(canonical),
            base_rules: data.rules,
            user_rules: String::new(),
            tailoring,
            attrs,
        })
    }

    /// Opens a collator from explicit rule text in the tailoring grammar
    /// accepted by this engine (see the `rules` module).
    pub fn open_from_rules(
        rule_text: &str,
        normalization: NormalizationMode,
        strength: Strength,
    ) -> Result<Collator> {
        let tailoring = rules::parse(rule_text, &Tailoring::default())?;
        let attrs = Attributes {
            strength,
            normalization,
            ..Attributes::default()
        };
        debug!(
            "opened collator from {} bytes of rules at {} strength",
            rule_text.len(),
            strength.name()
        );
        Ok(Collator {
            locale: None,
            base_rules: "",
            user_rules: rule_text.to_string(),
            tailoring,
            attrs,
        })
    }

    /// The canonical locale tag this collator was opened for, if any.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// The full textual ruleset in effect: the base (locale) rules followed
    /// by any caller-supplied tailoring.
    pub fn rules(&self) -> String {
        let mut text = String::with_capacity(self.base_rules.len() + self.user_rules.len());
        text.push_str(self.base_rules);
        text.push_str(&self.user_rules);
        text
    }

    /// Reads one attribute.
    pub fn attribute(&self, kind: AttributeKind) -> AttributeValue {
        self.attrs.get(kind)
    }

    /// Sets one attribute, rejecting kind/value combinations the engine does
    /// not recognize.
    pub fn set_attribute(&mut self, kind: AttributeKind, value: AttributeValue) -> Result<()> {
        self.attrs.set(kind, value)?;
        debug!("set {} = {}", kind.name(), value.name());
        Ok(())
    }

    /// Compares two strings under this collator's configuration.
    ///
    /// The result is a total order: reflexive, antisymmetric and transitive
    /// for a fixed configuration. Failures are always surfaced as `Err`; this
    /// engine never substitutes an invented ordering, so any
    /// treat-as-equal fallback is the caller's explicit policy.
    pub fn compare(&self, a: &str, b: &str) -> Result<Ordering> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for level in enabled_levels(&self.attrs) {
            level_weights(a, &self.tailoring, &self.attrs, level, &mut left);
            level_weights(b, &self.tailoring, &self.attrs, level, &mut right);
            match left.cmp(&right) {
                Ordering::Equal => {}
                decided => return Ok(decided),
            }
        }
        Ok(Ordering::Equal)
    }

    /// Whether two strings collate as equal under this configuration.
    pub fn equal(&self, a: &str, b: &str) -> Result<bool> {
        Ok(self.compare(a, b)? == Ordering::Equal)
    }

    /// Produces the binary sort key of `source`.
    ///
    /// Byte-lexicographic comparison of two keys from the same collator
    /// matches [`Collator::compare`] on the source strings. The key is
    /// encoded into a stack buffer first; only keys larger than the probe
    /// size cost a heap allocation, sized exactly from the probe's measured
    /// requirement. An empty key means the source produced no collation
    /// weights at all.
    pub fn sort_key(&self, source: &str) -> Result<Vec<u8>> {
        let mut probe = [0u8; SORT_KEY_PROBE];
        let required = self.write_sort_key(source, &mut probe);
        if required == 0 {
            return Ok(Vec::new());
        }
        if required <= probe.len() {
            return Ok(probe[..required].to_vec());
        }
        let mut full = vec![0u8; required];
        let written = self.write_sort_key(source, &mut full);
        if written != required {
            return Err(Error::internal(
                STATUS_KEY_SIZE_DRIFT,
                format!("sort key measured {required} bytes, re-encoded to {written}"),
            ));
        }
        Ok(full)
    }

    /// Encodes the sort key of `source` into `dest`, truncating if it does
    /// not fit, and returns the required length (zero for the empty key).
    ///
    /// This is the measuring half of the two-phase protocol behind
    /// [`Collator::sort_key`], exposed for callers that manage their own
    /// buffers.
    pub fn write_sort_key(&self, source: &str, dest: &mut [u8]) -> usize {
        write_sort_key(&self.tailoring, &self.attrs, source, dest)
    }

    /// Opens an element iterator bound to `source`, pinning its storage for
    /// the iterator's lifetime. The iterator borrows this collator.
    pub fn elements(&self, source: Arc<str>) -> Result<ElementIterator<'_>> {
        ElementIterator::new(self, source)
    }

    pub(crate) fn tailoring(&self) -> &Tailoring {
        &self.tailoring
    }

    pub(crate) fn attributes(&self) -> &Attributes {
        &self.attrs
    }
}
