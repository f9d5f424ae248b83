#![forbid(unsafe_code)]

//! Per-binding swipe configuration and callback slots.
//!
//! A [`GestureConfig`] is immutable once handed to a tracker. Callback slots
//! are reference-counted, so cloning a config onto many elements shares the
//! same closures.
//!
//! Every callback returns a [`Flow`]. Closures returning `()` continue;
//! closures returning `bool` follow the DOM convention where `false` stops
//! the gesture.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adapter::RawPointerEvent;
use crate::error::ConfigError;
use crate::event::{SwipeDelta, SwipeDirection};

/// Default distance (CSS pixels) a swipe must travel to pick a direction.
pub const DEFAULT_THRESHOLD: f64 = 20.0;

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// Which swipe direction the tracker claims from native scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SwipeAxis {
    /// Left/right swipes; vertical movement scrolls.
    #[default]
    Horizontal,
    /// Up/down swipes; horizontal movement scrolls.
    Vertical,
    /// Any direction; no directional callbacks fire.
    Omni,
}

impl SwipeAxis {
    /// CSS `touch-action` applied to the bound element.
    #[must_use]
    pub const fn touch_action(self) -> &'static str {
        match self {
            Self::Horizontal => "pan-y",
            Self::Vertical => "pan-x",
            Self::Omni => "none",
        }
    }

    /// Whether a fresh gesture starts out ambiguous with scrolling.
    #[must_use]
    pub const fn initial_scroll_intent(self) -> bool {
        !matches!(self, Self::Omni)
    }

    /// Resolve an ambiguous gesture: `true` means the user is scrolling.
    ///
    /// The tracked axis must strictly dominate; a tie yields to scrolling.
    #[must_use]
    pub fn resolves_to_scroll(self, delta: SwipeDelta) -> bool {
        let (dx, dy) = (delta.delta_x.abs(), delta.delta_y.abs());
        match self {
            Self::Horizontal => dx <= dy,
            Self::Vertical => dy <= dx,
            Self::Omni => false,
        }
    }

    /// Direction of a completed swipe, or `None` for [`SwipeAxis::Omni`].
    #[must_use]
    pub fn resolve_direction(self, threshold: f64, delta: SwipeDelta) -> Option<SwipeDirection> {
        let classify = |value: f64, positive, negative| {
            if value > threshold {
                positive
            } else if value < -threshold {
                negative
            } else {
                SwipeDirection::NotReached
            }
        };
        match self {
            Self::Horizontal => Some(classify(
                delta.delta_x,
                SwipeDirection::Right,
                SwipeDirection::Left,
            )),
            Self::Vertical => Some(classify(
                delta.delta_y,
                SwipeDirection::Down,
                SwipeDirection::Up,
            )),
            Self::Omni => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Omni => "all",
        }
    }
}

impl FromStr for SwipeAxis {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            "all" | "omni" => Ok(Self::Omni),
            other => Err(ConfigError::InvalidAxis {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for SwipeAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Flow control
// ---------------------------------------------------------------------------

/// Result of a callback: keep tracking, or stop the gesture now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Continue,
    Abort,
}

impl Flow {
    #[must_use]
    pub const fn is_abort(self) -> bool {
        matches!(self, Self::Abort)
    }
}

impl From<()> for Flow {
    fn from((): ()) -> Self {
        Self::Continue
    }
}

impl From<bool> for Flow {
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Self::Continue
        } else {
            Self::Abort
        }
    }
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Payload of the start callback.
#[derive(Debug)]
pub struct SwipeStart<'a, T> {
    /// Element the gesture was bound to.
    pub element: &'a T,
    /// Native event that opened the gesture.
    pub event: &'a RawPointerEvent,
    pub pointer_id: i32,
    pub origin_x: f64,
    pub origin_y: f64,
}

pub type StartCallback<T> = Rc<dyn Fn(&SwipeStart<'_, T>) -> Flow>;
pub type DeltaCallback = Rc<dyn Fn(&SwipeDelta) -> Flow>;

/// Named callback slots. Unset slots are no-ops.
pub struct SwipeCallbacks<T> {
    pub on_start: Option<StartCallback<T>>,
    pub on_moving: Option<DeltaCallback>,
    pub on_before_end: Option<DeltaCallback>,
    pub on_end: Option<DeltaCallback>,
    pub on_reset: Option<DeltaCallback>,
    pub on_not_reached: Option<DeltaCallback>,
    pub on_left: Option<DeltaCallback>,
    pub on_right: Option<DeltaCallback>,
    pub on_up: Option<DeltaCallback>,
    pub on_down: Option<DeltaCallback>,
}

impl<T> SwipeCallbacks<T> {
    /// Slot fired for a resolved direction.
    #[must_use]
    pub fn for_direction(&self, direction: SwipeDirection) -> Option<&DeltaCallback> {
        match direction {
            SwipeDirection::Left => self.on_left.as_ref(),
            SwipeDirection::Right => self.on_right.as_ref(),
            SwipeDirection::Up => self.on_up.as_ref(),
            SwipeDirection::Down => self.on_down.as_ref(),
            SwipeDirection::NotReached => self.on_not_reached.as_ref(),
        }
    }

    fn slot_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.on_start.is_some() {
            names.push("start");
        }
        let slots = [
            ("moving", &self.on_moving),
            ("before_end", &self.on_before_end),
            ("end", &self.on_end),
            ("reset", &self.on_reset),
            ("not_reached", &self.on_not_reached),
            ("left", &self.on_left),
            ("right", &self.on_right),
            ("up", &self.on_up),
            ("down", &self.on_down),
        ];
        names.extend(
            slots
                .iter()
                .filter(|(_, slot)| slot.is_some())
                .map(|(name, _)| *name),
        );
        names
    }
}

impl<T> Default for SwipeCallbacks<T> {
    fn default() -> Self {
        Self {
            on_start: None,
            on_moving: None,
            on_before_end: None,
            on_end: None,
            on_reset: None,
            on_not_reached: None,
            on_left: None,
            on_right: None,
            on_up: None,
            on_down: None,
        }
    }
}

impl<T> Clone for SwipeCallbacks<T> {
    fn clone(&self) -> Self {
        Self {
            on_start: self.on_start.clone(),
            on_moving: self.on_moving.clone(),
            on_before_end: self.on_before_end.clone(),
            on_end: self.on_end.clone(),
            on_reset: self.on_reset.clone(),
            on_not_reached: self.on_not_reached.clone(),
            on_left: self.on_left.clone(),
            on_right: self.on_right.clone(),
            on_up: self.on_up.clone(),
            on_down: self.on_down.clone(),
        }
    }
}

impl<T> fmt::Debug for SwipeCallbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwipeCallbacks")
            .field("set", &self.slot_names())
            .finish()
    }
}

fn delta_callback<F, R>(f: F) -> DeltaCallback
where
    F: Fn(&SwipeDelta) -> R + 'static,
    R: Into<Flow>,
{
    Rc::new(move |delta: &SwipeDelta| f(delta).into())
}

// ---------------------------------------------------------------------------
// GestureConfig
// ---------------------------------------------------------------------------

/// Loosely-typed options as a page script would pass them.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct SwipeOptions {
    pub threshold: Option<f64>,
    /// `"horizontal"`, `"vertical"` or `"all"`.
    pub swipe_direction: Option<String>,
}

/// Threshold, axis and callbacks for one binding.
///
/// `T` is the host's element type, handed back to the start callback.
pub struct GestureConfig<T> {
    pub threshold: f64,
    pub axis: SwipeAxis,
    pub callbacks: SwipeCallbacks<T>,
}

impl<T> Default for GestureConfig<T> {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            axis: SwipeAxis::Horizontal,
            callbacks: SwipeCallbacks::default(),
        }
    }
}

impl<T> Clone for GestureConfig<T> {
    fn clone(&self) -> Self {
        Self {
            threshold: self.threshold,
            axis: self.axis,
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<T> fmt::Debug for GestureConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureConfig")
            .field("threshold", &self.threshold)
            .field("axis", &self.axis)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl<T> GestureConfig<T> {
    /// Defaults: threshold 20, horizontal, no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge page-script options over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown direction or a bad threshold.
    pub fn from_options(options: &SwipeOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(threshold) = options.threshold {
            config.threshold = threshold;
        }
        if let Some(direction) = options.swipe_direction.as_deref() {
            config.axis = direction.parse()?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the numeric settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidThreshold`] if the threshold is negative
    /// or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                value: self.threshold,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_axis(mut self, axis: SwipeAxis) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub fn on_start<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&SwipeStart<'_, T>) -> R + 'static,
        R: Into<Flow>,
    {
        self.callbacks.on_start = Some(Rc::new(move |start: &SwipeStart<'_, T>| f(start).into()));
        self
    }

    #[must_use]
    pub fn on_moving<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&SwipeDelta) -> R + 'static,
        R: Into<Flow>,
    {
        self.callbacks.on_moving = Some(delta_callback(f));
        self
    }

    #[must_use]
    pub fn on_before_end<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&SwipeDelta) -> R + 'static,
        R: Into<Flow>,
    {
        self.callbacks.on_before_end = Some(delta_callback(f));
        self
    }

    #[must_use]
    pub fn on_end<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&SwipeDelta) -> R + 'static,
        R: Into<Flow>,
    {
        self.callbacks.on_end = Some(delta_callback(f));
        self
    }

    /// The reset callback's return value is ignored.
    #[must_use]
    pub fn on_reset<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&SwipeDelta) -> R + 'static,
        R: Into<Flow>,
    {
        self.callbacks.on_reset = Some(delta_callback(f));
        self
    }

    #[must_use]
    pub fn on_not_reached<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&SwipeDelta) -> R + 'static,
        R: Into<Flow>,
    {
        self.callbacks.on_not_reached = Some(delta_callback(f));
        self
    }

    #[must_use]
    pub fn on_left<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&SwipeDelta) -> R + 'static,
        R: Into<Flow>,
    {
        self.callbacks.on_left = Some(delta_callback(f));
        self
    }

    #[must_use]
    pub fn on_right<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&SwipeDelta) -> R + 'static,
        R: Into<Flow>,
    {
        self.callbacks.on_right = Some(delta_callback(f));
        self
    }

    #[must_use]
    pub fn on_up<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&SwipeDelta) -> R + 'static,
        R: Into<Flow>,
    {
        self.callbacks.on_up = Some(delta_callback(f));
        self
    }

    #[must_use]
    pub fn on_down<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&SwipeDelta) -> R + 'static,
        R: Into<Flow>,
    {
        self.callbacks.on_down = Some(delta_callback(f));
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
