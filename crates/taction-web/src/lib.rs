#![forbid(unsafe_code)]

//! Web binding for Taction swipe recognition.
//!
//! # Role in Taction
//! `taction-web` attaches [`taction_core::SwipeTracker`]s to DOM elements.
//! It detects the browser's event family, copies native events into the
//! core's raw event records, and executes the host commands the trackers
//! return.
//!
//! # Surfaces
//! - **Rust**: `track` / `track_one` return [`SwipeBinding`] handles that
//!   unbind on drop.
//! - **JavaScript**: `taction(elements, options)` mirrors the classic
//!   plugin call and returns a `TactionHandle` with `destroy()`.
//!
//! Only [`plan`] and [`TrackError`] build off `wasm32`; they carry the
//! DOM-independent parts so native tests can cover them.

mod error;
pub mod plan;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod js;

pub use error::TrackError;
pub use taction_core;

#[cfg(target_arch = "wasm32")]
pub use dom::{SwipeBinding, current_event, track, track_one};
#[cfg(target_arch = "wasm32")]
pub use js::{TactionHandle, taction};
