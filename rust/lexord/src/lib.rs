//! Locale-aware string collation engine.
//!
//! `lexord` compares strings according to locale-specific ordering rules,
//! produces binary sort keys whose byte order matches collation order, and
//! iterates element by element over the collation weights of a string.
//!
//! # Core Concepts
//!
//! ## Collator
//!
//! A [`Collator`] is a configured engine instance: locale rules (or explicit
//! tailoring rule text) plus a set of tunable attributes such as
//! [`Strength`]. It backs three consumer surfaces:
//!
//! - [`Collator::compare`] — direct, strength-aware comparison,
//! - [`Collator::sort_key`] — a cacheable byte key comparable with plain
//!   `memcmp` semantics,
//! - [`Collator::elements`] — an [`ElementIterator`] for element-level
//!   inspection (substring matching, search highlighting).
//!
//! ## Pinned iteration
//!
//! An element iterator's position is only meaningful against the exact
//! character buffer it was started on, so the iterator pins that buffer
//! (an owned `Arc<str>` reference) for as long as it is bound: rebinding via
//! [`ElementIterator::set_text`] releases the old pin before taking the new
//! one, and closing releases it exactly once.
//!
//! # Example
//!
//! ```
//! use std::cmp::Ordering;
//! use lexord::{AttributeKind, AttributeValue, Collator};
//!
//! let mut collator = Collator::open("en_US")?;
//! assert_eq!(collator.compare("a", "b")?, Ordering::Less);
//! assert_ne!(collator.compare("a", "A")?, Ordering::Equal);
//!
//! collator.set_attribute(AttributeKind::Strength, AttributeValue::Primary)?;
//! assert_eq!(collator.compare("a", "A")?, Ordering::Equal);
//! # Ok::<(), lexord_common::error::Error>(())
//! ```

pub mod attrs;
pub mod collator;
pub mod elements;
mod locale;
mod pin;
mod rules;
mod sort_key;
mod weights;

pub use attrs::{AttributeKind, AttributeValue, NormalizationMode, Strength};
pub use collator::Collator;
pub use elements::ElementIterator;
pub use weights::CollationElement;
