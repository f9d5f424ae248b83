#![forbid(unsafe_code)]

//! Cross-tracker coordination of document-root touch-action suppression.
//!
//! Every bound element shares one document root. While any tracker is
//! mid-gesture the root's native touch handling must stay off, so a swipe
//! that wanders outside its element still resolves instead of turning into a
//! page scroll. [`TouchCoordinator`] counts active gestures and remembers
//! whether the root is currently suppressed, independently of which tracker
//! suppressed it.
//!
//! # Invariants
//! 1. `active()` equals the number of trackers between an accepted start and
//!    their reset.
//! 2. The count never underflows; an unmatched `release()` is logged and
//!    leaves the count at zero.
//! 3. Once the count is back at zero, [`restore_root_if_idle`] reports a
//!    pending restore exactly once, whichever tracker released last.
//!
//! [`restore_root_if_idle`]: TouchCoordinator::restore_root_if_idle

use std::cell::Cell;
use std::rc::Rc;

/// Counter of in-flight gestures across all trackers on one document.
#[derive(Debug, Default)]
pub struct TouchCoordinator {
    active: Cell<usize>,
    root_suppressed: Cell<bool>,
}

thread_local! {
    static SHARED: Rc<TouchCoordinator> = Rc::new(TouchCoordinator::default());
}

impl TouchCoordinator {
    /// Fresh coordinator, independent of [`shared`](Self::shared).
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Process-wide coordinator for the current (single) UI thread.
    #[must_use]
    pub fn shared() -> Rc<Self> {
        SHARED.with(Rc::clone)
    }

    /// Register a gesture start. Returns `true` if it is the first active one.
    pub fn acquire(&self) -> bool {
        let before = self.active.get();
        self.active.set(before.saturating_add(1));
        before == 0
    }

    /// Register a gesture reset. Returns `true` if no gestures remain active.
    pub fn release(&self) -> bool {
        let before = self.active.get();
        if before == 0 {
            tracing::warn!("touch coordinator released with no active gestures");
            return true;
        }
        self.active.set(before - 1);
        before == 1
    }

    /// Record that the root's touch-action was turned off. Returns `true` if
    /// it was not already, i.e. the caller must emit the style change.
    pub fn suppress_root(&self) -> bool {
        !self.root_suppressed.replace(true)
    }

    /// Clear the suppression flag once no gesture is in flight. Returns
    /// `true` if the caller must restore the root style now.
    pub fn restore_root_if_idle(&self) -> bool {
        self.is_idle() && self.root_suppressed.replace(false)
    }

    #[inline]
    #[must_use]
    pub fn is_root_suppressed(&self) -> bool {
        self.root_suppressed.get()
    }

    /// Number of gestures currently in flight.
    #[inline]
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.get()
    }

    /// Whether no tracker is mid-gesture.
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.get() == 0
    }
}
