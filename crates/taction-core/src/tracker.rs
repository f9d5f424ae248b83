#![forbid(unsafe_code)]

//! Per-element swipe state machine.
//!
//! [`SwipeTracker`] consumes logical pointer phases for one bound element and
//! drives the configured callbacks. It never touches the host directly:
//! every side effect comes back as a [`HostCommand`] in the returned
//! [`SwipeDispatch`], next to a structured [`SwipeLogEntry`].
//!
//! # State Machine
//!
//! ```text
//!   Idle --start--> Active(ambiguous) --move(swipe)--> Active(confirmed)
//!                        |                                  |
//!                   move(scroll)                      move / end
//!                        v                                  v
//!                      Reset <-------- cancel / abort --- Reset --> Idle
//! ```
//!
//! # Invariants
//!
//! 1. `active_pointer_id` is `None` iff the element is idle, and both deltas
//!    are zero whenever it is `None`.
//! 2. Reset is idempotent: it only acts on an active tracker, so the shared
//!    [`TouchCoordinator`] is released exactly once per accepted start.
//! 3. `on_reset` fires exactly once per gesture and is always the last
//!    callback of that gesture.
//! 4. After a callback returns [`Flow::Abort`] no callback other than
//!    `on_reset` runs for the gesture.
//!
//! # Failure Modes
//!
//! - Events for another pointer, non-touch input, and moves or ends on an
//!   idle element are ignored and logged; they never change state.
//! - A second finger while one is tracked is ignored; multi-touch gestures
//!   are not recognized.

use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adapter::{PlatformAdapter, RawPointerEvent};
use crate::config::{DeltaCallback, Flow, GestureConfig, SwipeAxis, SwipeStart};
use crate::coordinator::TouchCoordinator;
use crate::error::ConfigError;
use crate::event::{PointerPhase, PointerSample, SwipeDelta, SwipeDirection};

// ---------------------------------------------------------------------------
// State record
// ---------------------------------------------------------------------------

/// Explicit tracking state for one bound element.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackedElement {
    /// Contact being tracked; `None` while idle.
    pub active_pointer_id: Option<i32>,
    pub origin_x: f64,
    pub origin_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    /// Still undecided between page scroll and swipe.
    pub is_scroll_intent: bool,
    /// A reset already ran during the current gesture cycle.
    pub reset_fired: bool,
}

impl TrackedElement {
    /// Idle state for `axis`.
    #[must_use]
    pub const fn idle(axis: SwipeAxis) -> Self {
        Self {
            active_pointer_id: None,
            origin_x: 0.0,
            origin_y: 0.0,
            delta_x: 0.0,
            delta_y: 0.0,
            is_scroll_intent: axis.initial_scroll_intent(),
            reset_fired: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active_pointer_id.is_some()
    }

    /// Current displacement from the origin.
    #[must_use]
    pub const fn delta(&self) -> SwipeDelta {
        SwipeDelta::new(self.delta_x, self.delta_y)
    }
}

// ---------------------------------------------------------------------------
// Host commands and logs
// ---------------------------------------------------------------------------

/// Where move/end listeners live for the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ListenerScope {
    /// The bound element itself (touch events stay targeted at it).
    Element,
    /// The document root. Events on the element reach it by bubbling, and
    /// it keeps receiving them after the pointer leaves the element.
    Root,
}

impl ListenerScope {
    #[must_use]
    pub const fn is_root(self) -> bool {
        matches!(self, Self::Root)
    }
}

/// Side effect the host must apply after a dispatch, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "command", rename_all = "snake_case"))]
pub enum HostCommand {
    /// Start listening for move/end events.
    AttachTracking { scope: ListenerScope },
    /// Stop listening for move/end events.
    DetachTracking { scope: ListenerScope },
    /// Set the document root's `touch-action` to `none`.
    SuppressRootTouchAction,
    /// Clear the document root's `touch-action`.
    RestoreRootTouchAction,
    /// Cancel the native default of the event being dispatched.
    PreventDefault,
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SwipeLifecyclePhase {
    Start,
    Move,
    End,
    Cancel,
    ForcedReset,
}

impl SwipeLifecyclePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Move => "move",
            Self::End => "end",
            Self::Cancel => "cancel",
            Self::ForcedReset => "forced_reset",
        }
    }
}

impl From<PointerPhase> for SwipeLifecyclePhase {
    fn from(phase: PointerPhase) -> Self {
        match phase {
            PointerPhase::Start => Self::Start,
            PointerPhase::Move => Self::Move,
            PointerPhase::End => Self::End,
            PointerPhase::Cancel => Self::Cancel,
        }
    }
}

/// Why an incoming event left the tracker untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SwipeIgnoredReason {
    /// The adapter could not extract a contact from the event.
    UnrelatedEvent,
    /// Mouse or pen input.
    NonTouchInput,
    /// A contact is already tracked on this element.
    ActivePointerAlreadyInProgress,
    /// No gesture in progress.
    NoActivePointer,
    /// Event belongs to a different contact.
    PointerMismatch,
}

impl SwipeIgnoredReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnrelatedEvent => "unrelated_event",
            Self::NonTouchInput => "non_touch_input",
            Self::ActivePointerAlreadyInProgress => "active_pointer_already_in_progress",
            Self::NoActivePointer => "no_active_pointer",
            Self::PointerMismatch => "pointer_mismatch",
        }
    }
}

/// Outcome category of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum SwipeLogOutcome {
    Started,
    Moved,
    Ended { direction: Option<SwipeDirection> },
    YieldedToScroll,
    Cancelled,
    ForcedReset,
    /// A callback returned [`Flow::Abort`] during this dispatch.
    Aborted,
    Ignored { reason: SwipeIgnoredReason },
}

impl SwipeLogOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Moved => "moved",
            Self::Ended { .. } => "ended",
            Self::YieldedToScroll => "yielded_to_scroll",
            Self::Cancelled => "cancelled",
            Self::ForcedReset => "forced_reset",
            Self::Aborted => "aborted",
            Self::Ignored { .. } => "ignored",
        }
    }
}

/// Structured record of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwipeLogEntry {
    pub phase: SwipeLifecyclePhase,
    pub pointer_id: Option<i32>,
    pub position: Option<(f64, f64)>,
    pub outcome: SwipeLogOutcome,
}

impl fmt::Display for SwipeLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "swipe phase={} outcome={}",
            self.phase.as_str(),
            self.outcome.as_str()
        )?;
        if let Some(id) = self.pointer_id {
            write!(f, " pointer_id={id}")?;
        }
        match self.outcome {
            SwipeLogOutcome::Ignored { reason } => write!(f, " reason={}", reason.as_str()),
            SwipeLogOutcome::Ended {
                direction: Some(direction),
            } => write!(f, " direction={}", direction.as_str()),
            _ => Ok(()),
        }
    }
}

/// Result of one dispatch: host commands to apply, plus the log record.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeDispatch {
    pub commands: Vec<HostCommand>,
    pub log: SwipeLogEntry,
}

impl SwipeDispatch {
    fn ignored(
        phase: SwipeLifecyclePhase,
        reason: SwipeIgnoredReason,
        sample: Option<&PointerSample>,
    ) -> Self {
        tracing::trace!(
            phase = phase.as_str(),
            reason = reason.as_str(),
            "swipe event ignored"
        );
        Self {
            commands: Vec::new(),
            log: SwipeLogEntry {
                phase,
                pointer_id: sample.map(|s| s.pointer_id),
                position: sample.map(|s| (s.x, s.y)),
                outcome: SwipeLogOutcome::Ignored { reason },
            },
        }
    }

    /// Whether the event changed tracker state.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        !matches!(self.log.outcome, SwipeLogOutcome::Ignored { .. })
    }

    /// Whether the host must cancel the native default of the event.
    #[must_use]
    pub fn prevents_default(&self) -> bool {
        self.commands.contains(&HostCommand::PreventDefault)
    }
}

// ---------------------------------------------------------------------------
// SwipeTracker
// ---------------------------------------------------------------------------

/// Swipe recognizer bound to one element.
pub struct SwipeTracker<T> {
    element: T,
    is_root: bool,
    config: GestureConfig<T>,
    adapter: Rc<dyn PlatformAdapter>,
    coordinator: Rc<TouchCoordinator>,
    state: TrackedElement,
    last_payload: SwipeDelta,
    listener_scope: Option<ListenerScope>,
}

impl<T> fmt::Debug for SwipeTracker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwipeTracker")
            .field("family", &self.adapter.family())
            .field("axis", &self.config.axis)
            .field("is_root", &self.is_root)
            .field("state", &self.state)
            .finish()
    }
}

impl<T> SwipeTracker<T> {
    /// Bind a tracker to `element`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn new(
        element: T,
        config: GestureConfig<T>,
        adapter: Rc<dyn PlatformAdapter>,
        coordinator: Rc<TouchCoordinator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = TrackedElement::idle(config.axis);
        Ok(Self {
            element,
            is_root: false,
            config,
            adapter,
            coordinator,
            state,
            last_payload: SwipeDelta::ZERO,
            listener_scope: None,
        })
    }

    /// Mark the element as the document root, which never suppresses its
    /// own touch-action.
    #[must_use]
    pub fn at_document_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    #[must_use]
    pub const fn element(&self) -> &T {
        &self.element
    }

    #[must_use]
    pub const fn config(&self) -> &GestureConfig<T> {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &TrackedElement {
        &self.state
    }

    #[must_use]
    pub fn adapter(&self) -> &dyn PlatformAdapter {
        &*self.adapter
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.is_root
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Where move/end listeners are currently attached, if anywhere.
    #[must_use]
    pub const fn listener_scope(&self) -> Option<ListenerScope> {
        self.listener_scope
    }

    /// CSS `touch-action` the host applies to the bound element.
    #[must_use]
    pub const fn touch_action(&self) -> &'static str {
        self.config.axis.touch_action()
    }

    /// Normalize a native event and route it to the matching phase handler.
    ///
    /// Cancel resets regardless of which contact it names.
    pub fn dispatch(&mut self, phase: PointerPhase, raw: &RawPointerEvent) -> SwipeDispatch {
        if phase == PointerPhase::Cancel {
            return self.cancel();
        }
        let Some(sample) = self.adapter.normalize(phase, raw) else {
            return SwipeDispatch::ignored(phase.into(), SwipeIgnoredReason::UnrelatedEvent, None);
        };
        match phase {
            PointerPhase::Start => self.pointer_down(sample, raw),
            PointerPhase::Move => self.pointer_move(sample),
            PointerPhase::End => self.pointer_up(sample),
            PointerPhase::Cancel => self.cancel(),
        }
    }

    /// Idle -> Active on a fresh finger contact.
    pub fn pointer_down(&mut self, sample: PointerSample, raw: &RawPointerEvent) -> SwipeDispatch {
        let phase = SwipeLifecyclePhase::Start;
        if !sample.is_touch {
            return SwipeDispatch::ignored(phase, SwipeIgnoredReason::NonTouchInput, Some(&sample));
        }
        if self.state.is_active() {
            return SwipeDispatch::ignored(
                phase,
                SwipeIgnoredReason::ActivePointerAlreadyInProgress,
                Some(&sample),
            );
        }

        let mut commands = Vec::with_capacity(2);
        self.state = TrackedElement {
            active_pointer_id: Some(sample.pointer_id),
            origin_x: sample.x,
            origin_y: sample.y,
            ..TrackedElement::idle(self.config.axis)
        };
        self.last_payload = SwipeDelta::ZERO;

        let scope = if self.adapter.requires_root_tracking() {
            ListenerScope::Root
        } else {
            ListenerScope::Element
        };
        self.listener_scope = Some(scope);
        commands.push(HostCommand::AttachTracking { scope });

        self.coordinator.acquire();
        if !self.is_root && self.coordinator.suppress_root() {
            commands.push(HostCommand::SuppressRootTouchAction);
        }

        tracing::debug!(
            pointer_id = sample.pointer_id,
            x = sample.x,
            y = sample.y,
            active = self.coordinator.active(),
            "swipe started"
        );

        let mut aborted = false;
        if let Some(callback) = self.config.callbacks.on_start.clone() {
            let flow = callback(&SwipeStart {
                element: &self.element,
                event: raw,
                pointer_id: sample.pointer_id,
                origin_x: sample.x,
                origin_y: sample.y,
            });
            aborted = self.after_callback("start", flow, &mut commands);
        }

        Self::finish(
            phase,
            Some(&sample),
            if aborted {
                SwipeLogOutcome::Aborted
            } else {
                SwipeLogOutcome::Started
            },
            commands,
        )
    }

    /// Active -> Active on movement of the tracked contact.
    pub fn pointer_move(&mut self, sample: PointerSample) -> SwipeDispatch {
        let phase = SwipeLifecyclePhase::Move;
        if let Err(reason) = self.check_tracked(&sample) {
            return SwipeDispatch::ignored(phase, reason, Some(&sample));
        }

        let delta = SwipeDelta::new(sample.x - self.state.origin_x, sample.y - self.state.origin_y);
        self.state.delta_x = delta.delta_x;
        self.state.delta_y = delta.delta_y;

        let mut commands = Vec::new();
        if self.state.is_scroll_intent {
            if self.config.axis.resolves_to_scroll(delta) {
                tracing::debug!(
                    pointer_id = sample.pointer_id,
                    dx = delta.delta_x,
                    dy = delta.delta_y,
                    "swipe yielded to native scroll"
                );
                self.reset(&mut commands);
                return Self::finish(
                    phase,
                    Some(&sample),
                    SwipeLogOutcome::YieldedToScroll,
                    commands,
                );
            }
            self.state.is_scroll_intent = false;
        }

        commands.push(HostCommand::PreventDefault);
        self.last_payload = delta;
        tracing::trace!(
            pointer_id = sample.pointer_id,
            dx = delta.delta_x,
            dy = delta.delta_y,
            "swipe moving"
        );
        let aborted = self.trigger("moving", self.config.callbacks.on_moving.clone(), &mut commands);

        Self::finish(
            phase,
            Some(&sample),
            if aborted {
                SwipeLogOutcome::Aborted
            } else {
                SwipeLogOutcome::Moved
            },
            commands,
        )
    }

    /// Active -> Idle when the tracked contact lifts.
    pub fn pointer_up(&mut self, sample: PointerSample) -> SwipeDispatch {
        let phase = SwipeLifecyclePhase::End;
        if let Err(reason) = self.check_tracked(&sample) {
            return SwipeDispatch::ignored(phase, reason, Some(&sample));
        }

        let mut commands = Vec::new();
        let mut aborted = false;
        let mut direction = None;
        if !self.state.is_scroll_intent {
            direction = self
                .config
                .axis
                .resolve_direction(self.config.threshold, self.last_payload);
            aborted |= self.trigger(
                "before_end",
                self.config.callbacks.on_before_end.clone(),
                &mut commands,
            );
            if let Some(direction) = direction {
                let slot = self.config.callbacks.for_direction(direction).cloned();
                aborted |= self.trigger(direction.as_str(), slot, &mut commands);
            }
            aborted |= self.trigger("end", self.config.callbacks.on_end.clone(), &mut commands);
        }

        tracing::debug!(
            pointer_id = sample.pointer_id,
            direction = direction.map(SwipeDirection::as_str),
            "swipe ended"
        );
        self.reset(&mut commands);

        Self::finish(
            phase,
            Some(&sample),
            if aborted {
                SwipeLogOutcome::Aborted
            } else {
                SwipeLogOutcome::Ended { direction }
            },
            commands,
        )
    }

    /// Active -> Idle on a platform interruption. Only `on_reset` fires.
    pub fn cancel(&mut self) -> SwipeDispatch {
        self.interrupt(SwipeLifecyclePhase::Cancel, SwipeLogOutcome::Cancelled)
    }

    /// Host-initiated early exit, e.g. when the element is unbound mid-gesture.
    pub fn force_reset(&mut self) -> SwipeDispatch {
        self.interrupt(SwipeLifecyclePhase::ForcedReset, SwipeLogOutcome::ForcedReset)
    }

    fn interrupt(&mut self, phase: SwipeLifecyclePhase, outcome: SwipeLogOutcome) -> SwipeDispatch {
        let Some(pointer_id) = self.state.active_pointer_id else {
            return SwipeDispatch::ignored(phase, SwipeIgnoredReason::NoActivePointer, None);
        };
        tracing::debug!(pointer_id, phase = phase.as_str(), "swipe interrupted");
        let mut commands = Vec::new();
        self.reset(&mut commands);
        SwipeDispatch {
            commands,
            log: SwipeLogEntry {
                phase,
                pointer_id: Some(pointer_id),
                position: None,
                outcome,
            },
        }
    }

    fn check_tracked(&self, sample: &PointerSample) -> Result<(), SwipeIgnoredReason> {
        match self.state.active_pointer_id {
            None => Err(SwipeIgnoredReason::NoActivePointer),
            Some(id) if id != sample.pointer_id => Err(SwipeIgnoredReason::PointerMismatch),
            Some(_) => Ok(()),
        }
    }

    /// Invoke a delta callback unless a reset already ran this gesture.
    /// Returns `true` if the callback aborted.
    fn trigger(
        &mut self,
        name: &'static str,
        callback: Option<DeltaCallback>,
        commands: &mut Vec<HostCommand>,
    ) -> bool {
        let Some(callback) = callback else {
            return false;
        };
        if self.state.reset_fired {
            return false;
        }
        let flow = callback(&self.last_payload);
        self.after_callback(name, flow, commands)
    }

    fn after_callback(
        &mut self,
        name: &'static str,
        flow: Flow,
        commands: &mut Vec<HostCommand>,
    ) -> bool {
        if !flow.is_abort() {
            return false;
        }
        tracing::debug!(callback = name, "swipe aborted by callback");
        self.reset(commands);
        true
    }

    /// Idempotent exit path. Returns `false` if the tracker was already idle.
    fn reset(&mut self, commands: &mut Vec<HostCommand>) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.coordinator.release();
        if let Some(scope) = self.listener_scope.take() {
            commands.push(HostCommand::DetachTracking { scope });
        }
        // Whoever releases last restores, even the root's own tracker.
        if self.coordinator.restore_root_if_idle() {
            commands.push(HostCommand::RestoreRootTouchAction);
        }
        self.state = TrackedElement {
            reset_fired: true,
            ..TrackedElement::idle(self.config.axis)
        };

        let payload = self.last_payload;
        if let Some(callback) = self.config.callbacks.on_reset.clone() {
            // Already resetting; an abort here has nothing left to stop.
            let _ = callback(&payload);
        }
        true
    }

    fn finish(
        phase: SwipeLifecyclePhase,
        sample: Option<&PointerSample>,
        outcome: SwipeLogOutcome,
        commands: Vec<HostCommand>,
    ) -> SwipeDispatch {
        SwipeDispatch {
            commands,
            log: SwipeLogEntry {
                phase,
                pointer_id: sample.map(|s| s.pointer_id),
                position: sample.map(|s| (s.x, s.y)),
                outcome,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
