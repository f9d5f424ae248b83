#![forbid(unsafe_code)]

//! Platform event adapter: concrete browser event families to logical phases.
//!
//! Three event families have shipped for touch input:
//!
//! | Phase  | [`EventFamily::Pointer`] | [`EventFamily::MsPointer`] | [`EventFamily::Touch`] |
//! |--------|--------------------------|----------------------------|------------------------|
//! | start  | `pointerdown`            | `MSPointerDown`            | `touchstart`           |
//! | move   | `pointermove`            | `MSPointerMove`            | `touchmove`            |
//! | end    | `pointerup`              | `MSPointerUp`              | `touchend`             |
//! | cancel | `pointercancel`          | `MSPointerCancel`          | `touchcancel`          |
//!
//! Hosts convert a native event into a [`RawPointerEvent`] and hand it to a
//! [`PlatformAdapter`], which either produces a [`PointerSample`] or reports
//! that the event is unrelated to gesture tracking (`None`). Adapters hold no
//! state.

use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::event::{PointerPhase, PointerSample};

/// Legacy `MSPOINTER_TYPE_TOUCH` code reported by IE10.
pub const MS_POINTER_TYPE_TOUCH: u32 = 2;
/// Legacy `MSPOINTER_TYPE_PEN` code.
pub const MS_POINTER_TYPE_PEN: u32 = 3;
/// Legacy `MSPOINTER_TYPE_MOUSE` code.
pub const MS_POINTER_TYPE_MOUSE: u32 = 4;

// ---------------------------------------------------------------------------
// Families
// ---------------------------------------------------------------------------

/// Concrete browser event family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventFamily {
    /// W3C pointer events.
    Pointer,
    /// Prefixed pointer events from IE10/IE11.
    MsPointer,
    /// WebKit-style touch events.
    Touch,
}

impl EventFamily {
    /// Concrete DOM event name for `phase`.
    #[must_use]
    pub const fn event_name(self, phase: PointerPhase) -> &'static str {
        match (self, phase) {
            (Self::Pointer, PointerPhase::Start) => "pointerdown",
            (Self::Pointer, PointerPhase::Move) => "pointermove",
            (Self::Pointer, PointerPhase::End) => "pointerup",
            (Self::Pointer, PointerPhase::Cancel) => "pointercancel",
            (Self::MsPointer, PointerPhase::Start) => "MSPointerDown",
            (Self::MsPointer, PointerPhase::Move) => "MSPointerMove",
            (Self::MsPointer, PointerPhase::End) => "MSPointerUp",
            (Self::MsPointer, PointerPhase::Cancel) => "MSPointerCancel",
            (Self::Touch, PointerPhase::Start) => "touchstart",
            (Self::Touch, PointerPhase::Move) => "touchmove",
            (Self::Touch, PointerPhase::End) => "touchend",
            (Self::Touch, PointerPhase::Cancel) => "touchcancel",
        }
    }

    /// Reverse lookup of [`event_name`](Self::event_name).
    #[must_use]
    pub fn phase_of(self, event_name: &str) -> Option<PointerPhase> {
        PointerPhase::ALL
            .into_iter()
            .find(|&phase| self.event_name(phase) == event_name)
    }

    /// Whether move/end listeners go on the document root instead of the
    /// element.
    ///
    /// Pointer events retarget to whatever is under the contact, so once the
    /// finger leaves the element only the root still hears it. Touch events
    /// stay targeted at the element where the touch began.
    #[must_use]
    pub const fn requires_root_tracking(self) -> bool {
        matches!(self, Self::Pointer | Self::MsPointer)
    }

    /// Pick the family for the runtime's capabilities.
    #[must_use]
    pub const fn detect(caps: PlatformCaps) -> Self {
        if caps.pointer_events {
            Self::Pointer
        } else if caps.ms_pointer_enabled && caps.touch_enabled {
            Self::MsPointer
        } else {
            Self::Touch
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pointer => "pointer",
            Self::MsPointer => "ms_pointer",
            Self::Touch => "touch",
        }
    }
}

/// Input capabilities reported by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformCaps {
    /// `window.PointerEvent` exists.
    pub pointer_events: bool,
    /// `navigator.msPointerEnabled` is set.
    pub ms_pointer_enabled: bool,
    /// `ontouchstart` exists or a max-touch-points property is above zero.
    pub touch_enabled: bool,
}

// ---------------------------------------------------------------------------
// Raw events
// ---------------------------------------------------------------------------

/// A native event, copied out of the host before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPointerEvent {
    Pointer(RawPointer),
    MsPointer(RawMsPointer),
    Touch(RawTouch),
}

impl RawPointerEvent {
    /// Family this payload was captured from.
    #[must_use]
    pub const fn family(&self) -> EventFamily {
        match self {
            Self::Pointer(_) => EventFamily::Pointer,
            Self::MsPointer(_) => EventFamily::MsPointer,
            Self::Touch(_) => EventFamily::Touch,
        }
    }
}

/// Fields of a W3C `PointerEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPointer {
    pub pointer_id: i32,
    /// DOM `pointerType` (`"touch"`, `"pen"`, `"mouse"`, or vendor strings).
    pub pointer_type: Box<str>,
    pub client_x: f64,
    pub client_y: f64,
}

/// `pointerType` of an `MSPointerEvent`: a string on IE11, a code on IE10.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MsPointerType {
    Named(Box<str>),
    Code(u32),
}

/// Fields of a prefixed `MSPointerEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMsPointer {
    pub pointer_id: i32,
    pub pointer_type: MsPointerType,
    pub client_x: f64,
    pub client_y: f64,
}

/// One entry of a `TouchList`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub identifier: i32,
    pub client_x: f64,
    pub client_y: f64,
}

/// Fields of a `TouchEvent`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTouch {
    /// Touches still on the element that received the event.
    pub target_touches: Vec<TouchPoint>,
    /// Touches that changed in this event (the lifted finger on `touchend`).
    pub changed_touches: Vec<TouchPoint>,
}

// ---------------------------------------------------------------------------
// Adapter trait
// ---------------------------------------------------------------------------

/// Normalizes one event family into the logical vocabulary.
pub trait PlatformAdapter {
    /// Family this adapter understands.
    fn family(&self) -> EventFamily;

    /// Produce a sample, or `None` if the event is unrelated to tracking.
    fn normalize(&self, phase: PointerPhase, raw: &RawPointerEvent) -> Option<PointerSample>;

    /// Concrete event name to listen for.
    fn event_name(&self, phase: PointerPhase) -> &'static str {
        self.family().event_name(phase)
    }

    /// Whether move/end listeners go on the document root.
    fn requires_root_tracking(&self) -> bool {
        self.family().requires_root_tracking()
    }
}

/// Production adapter: W3C pointer events.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerEventsAdapter;

impl PlatformAdapter for PointerEventsAdapter {
    fn family(&self) -> EventFamily {
        EventFamily::Pointer
    }

    fn normalize(&self, _phase: PointerPhase, raw: &RawPointerEvent) -> Option<PointerSample> {
        let RawPointerEvent::Pointer(event) = raw else {
            return None;
        };
        Some(PointerSample {
            pointer_id: event.pointer_id,
            x: event.client_x,
            y: event.client_y,
            is_touch: &*event.pointer_type == "touch",
        })
    }
}

/// Alternate adapter: IE10/IE11 prefixed pointer events.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsPointerEventsAdapter;

impl PlatformAdapter for MsPointerEventsAdapter {
    fn family(&self) -> EventFamily {
        EventFamily::MsPointer
    }

    fn normalize(&self, _phase: PointerPhase, raw: &RawPointerEvent) -> Option<PointerSample> {
        let RawPointerEvent::MsPointer(event) = raw else {
            return None;
        };
        let is_touch = match &event.pointer_type {
            MsPointerType::Named(name) => &**name == "touch",
            MsPointerType::Code(code) => *code == MS_POINTER_TYPE_TOUCH,
        };
        Some(PointerSample {
            pointer_id: event.pointer_id,
            x: event.client_x,
            y: event.client_y,
            is_touch,
        })
    }
}

/// Alternate adapter: WebKit touch events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchEventsAdapter;

impl PlatformAdapter for TouchEventsAdapter {
    fn family(&self) -> EventFamily {
        EventFamily::Touch
    }

    fn normalize(&self, phase: PointerPhase, raw: &RawPointerEvent) -> Option<PointerSample> {
        let RawPointerEvent::Touch(event) = raw else {
            return None;
        };
        // targetTouches is empty once the last finger lifts.
        let list = match phase {
            PointerPhase::Start | PointerPhase::Move => &event.target_touches,
            PointerPhase::End | PointerPhase::Cancel => &event.changed_touches,
        };
        let touch = list.first()?;
        Some(PointerSample::touch(
            touch.identifier,
            touch.client_x,
            touch.client_y,
        ))
    }
}

/// Shared adapter for `family`.
#[must_use]
pub fn adapter_for(family: EventFamily) -> Rc<dyn PlatformAdapter> {
    match family {
        EventFamily::Pointer => Rc::new(PointerEventsAdapter),
        EventFamily::MsPointer => Rc::new(MsPointerEventsAdapter),
        EventFamily::Touch => Rc::new(TouchEventsAdapter),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
