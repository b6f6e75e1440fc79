//! Source-text pinning for element iteration.
//!
//! An element iterator's position and expansion state are only meaningful
//! against the exact character buffer it was started on, so the buffer must
//! stay alive and at a stable address for as long as the iterator is bound to
//! it. The iterator never relies on its caller to guarantee that; it takes
//! its own pin.
//!
//! A [`SourcePin`] is an owned `Arc<str>` clone: the shared allocation cannot
//! be freed or moved while the pin exists, and releasing is dropping. The
//! discipline enforced by the iterator is: exactly one pin per bound
//! iterator, the old pin is released before a replacement is acquired, and
//! the pin is released exactly once on close (an `Option::take` makes a
//! double release unrepresentable).

use std::sync::Arc;

/// Holds one source string's backing storage alive and immobile.
#[derive(Debug)]
pub(crate) struct SourcePin {
    text: Arc<str>,
}

impl SourcePin {
    /// Acquires a pin on `text`'s storage.
    pub fn acquire(text: &Arc<str>) -> SourcePin {
        SourcePin {
            text: Arc::clone(text),
        }
    }

    /// The pinned character data. Stable for the pin's entire lifetime.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Releases the pin, consuming it.
    pub fn release(self) {}
}
