#![forbid(unsafe_code)]

//! Core: host-independent swipe recognition over pointer and touch streams.
//!
//! # Role in Taction
//! `taction-core` owns the gesture state machine. It knows nothing about the
//! DOM: hosts feed it raw events, and it answers with callbacks into user
//! code plus a list of [`HostCommand`]s describing the side effects the host
//! must apply (listener attach/detach, root touch-action, prevent default).
//!
//! # Primary responsibilities
//! - **Adapter**: normalize pointer, MS pointer and touch payloads into one
//!   [`PointerSample`].
//! - **Tracker**: per-element [`SwipeTracker`] deciding scroll vs swipe and
//!   classifying the final direction.
//! - **Coordinator**: shared [`TouchCoordinator`] counting in-flight gestures
//!   across elements.
//! - **Config**: [`GestureConfig`] with threshold, axis and callback slots.
//!
//! # How it fits in the system
//! `taction-web` wraps one [`SwipeTracker`] per bound `HtmlElement` and
//! applies the returned commands to the real document. Everything here is
//! plain Rust and runs in native tests.

pub mod adapter;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod tracker;

pub use adapter::{
    EventFamily, MsPointerEventsAdapter, MsPointerType, PlatformAdapter, PlatformCaps,
    PointerEventsAdapter, RawMsPointer, RawPointer, RawPointerEvent, RawTouch, TouchEventsAdapter,
    TouchPoint, adapter_for,
};
pub use config::{
    DEFAULT_THRESHOLD, DeltaCallback, Flow, GestureConfig, StartCallback, SwipeAxis,
    SwipeCallbacks, SwipeOptions, SwipeStart,
};
pub use coordinator::TouchCoordinator;
pub use error::ConfigError;
pub use event::{PointerPhase, PointerSample, SwipeDelta, SwipeDirection};
pub use tracker::{
    HostCommand, ListenerScope, SwipeDispatch, SwipeIgnoredReason, SwipeLifecyclePhase,
    SwipeLogEntry, SwipeLogOutcome, SwipeTracker, TrackedElement,
};
