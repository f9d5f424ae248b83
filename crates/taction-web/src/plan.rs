#![forbid(unsafe_code)]

//! Host-command to DOM-operation planning.
//!
//! [`taction_core::SwipeTracker`] speaks in [`HostCommand`]s. This module
//! expands each command, plus binding and unbinding, into the concrete
//! [`DomOp`] list the wasm layer executes. It is plain Rust so the exact
//! listener and style traffic can be asserted in native tests. Numeric
//! field checks for loosely-typed event objects live here for the same
//! reason.

use taction_core::{EventFamily, HostCommand, ListenerScope, PointerPhase, SwipeAxis};

/// Attribute marking an element as already bound.
pub const BOUND_MARKER: &str = "data-taction-bound";

/// Standard touch-action property.
pub const TOUCH_ACTION: &str = "touch-action";

/// Prefixed property read by IE10/IE11.
pub const MS_TOUCH_ACTION: &str = "-ms-touch-action";

/// Value written to the root while a gesture is in flight.
pub const ROOT_SUPPRESSED: &str = "none";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Node a DOM operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomTarget {
    /// The bound element.
    Element,
    /// `document.documentElement`.
    Root,
}

impl From<ListenerScope> for DomTarget {
    fn from(scope: ListenerScope) -> Self {
        match scope {
            ListenerScope::Element => Self::Element,
            ListenerScope::Root => Self::Root,
        }
    }
}

/// One concrete DOM mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomOp {
    Listen {
        target: DomTarget,
        phase: PointerPhase,
        event: &'static str,
    },
    Unlisten {
        target: DomTarget,
        phase: PointerPhase,
        event: &'static str,
    },
    /// Set both touch-action properties.
    SetTouchAction {
        target: DomTarget,
        value: &'static str,
    },
    /// Remove both touch-action properties.
    ClearTouchAction { target: DomTarget },
    SetMarker,
    ClearMarker,
    /// Cancel the native default of the event being handled.
    PreventDefault,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Operations that bind a tracker to its element.
///
/// The element's own touch-action comes from its axis. Start and cancel
/// listeners stay on the element for the binding's lifetime.
#[must_use]
pub fn bind_ops(family: EventFamily, axis: SwipeAxis) -> Vec<DomOp> {
    vec![
        DomOp::SetTouchAction {
            target: DomTarget::Element,
            value: axis.touch_action(),
        },
        DomOp::SetMarker,
        listen(DomTarget::Element, family, PointerPhase::Start),
        listen(DomTarget::Element, family, PointerPhase::Cancel),
    ]
}

/// Inverse of [`bind_ops`].
#[must_use]
pub fn unbind_ops(family: EventFamily) -> Vec<DomOp> {
    vec![
        unlisten(DomTarget::Element, family, PointerPhase::Start),
        unlisten(DomTarget::Element, family, PointerPhase::Cancel),
        DomOp::ClearTouchAction {
            target: DomTarget::Element,
        },
        DomOp::ClearMarker,
    ]
}

/// Expand one tracker command.
#[must_use]
pub fn command_ops(family: EventFamily, command: HostCommand) -> Vec<DomOp> {
    match command {
        HostCommand::AttachTracking { scope } => vec![
            listen(scope.into(), family, PointerPhase::Move),
            listen(scope.into(), family, PointerPhase::End),
        ],
        HostCommand::DetachTracking { scope } => vec![
            unlisten(scope.into(), family, PointerPhase::Move),
            unlisten(scope.into(), family, PointerPhase::End),
        ],
        HostCommand::SuppressRootTouchAction => vec![DomOp::SetTouchAction {
            target: DomTarget::Root,
            value: ROOT_SUPPRESSED,
        }],
        HostCommand::RestoreRootTouchAction => vec![DomOp::ClearTouchAction {
            target: DomTarget::Root,
        }],
        HostCommand::PreventDefault => vec![DomOp::PreventDefault],
    }
}

fn listen(target: DomTarget, family: EventFamily, phase: PointerPhase) -> DomOp {
    DomOp::Listen {
        target,
        phase,
        event: family.event_name(phase),
    }
}

fn unlisten(target: DomTarget, family: EventFamily, phase: PointerPhase) -> DomOp {
    DomOp::Unlisten {
        target,
        phase,
        event: family.event_name(phase),
    }
}

// ---------------------------------------------------------------------------
// Event fields
// ---------------------------------------------------------------------------

/// A JS number as an integer of type `I`, or `None` if it is fractional,
/// non-finite, or out of range.
#[must_use]
pub fn exact_int<I: TryFrom<i64>>(value: f64) -> Option<I> {
    // 2^63; every f64 below it fits in an i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !value.is_finite() || value.fract() != 0.0 || value < -LIMIT || value >= LIMIT {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    I::try_from(value as i64).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
