#![forbid(unsafe_code)]

//! Logical pointer vocabulary shared by the adapter and the tracker.
//!
//! Browsers report touch contacts through three divergent event families.
//! The adapter layer collapses all of them into the four [`PointerPhase`]s
//! and one [`PointerSample`] record, so the tracker never sees a concrete
//! platform event name.
//!
//! # Invariants
//! 1. A start always precedes its moves, which precede one end or cancel,
//!    per pointer identifier (delivery order is the host's responsibility).
//! 2. [`SwipeDelta`] is cumulative displacement from the gesture origin,
//!    never a per-move increment.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Logical lifecycle phase of a pointer contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl PointerPhase {
    /// All phases in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Start, Self::Move, Self::End, Self::Cancel];

    /// Stable lowercase label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Move => "move",
            Self::End => "end",
            Self::Cancel => "cancel",
        }
    }
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// Normalized contact point produced by a platform adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointerSample {
    /// Stable identifier of the touch/pointer for the lifetime of the contact.
    pub pointer_id: i32,
    /// Client X coordinate in CSS pixels.
    pub x: f64,
    /// Client Y coordinate in CSS pixels.
    pub y: f64,
    /// True for finger input; false for mouse or pen on hybrid devices.
    pub is_touch: bool,
}

impl PointerSample {
    /// Finger contact at `(x, y)`.
    #[must_use]
    pub const fn touch(pointer_id: i32, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            x,
            y,
            is_touch: true,
        }
    }

    /// Non-finger contact (mouse or pen) at `(x, y)`.
    #[must_use]
    pub const fn non_touch(pointer_id: i32, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            x,
            y,
            is_touch: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Callback payload: signed displacement from the gesture origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SwipeDelta {
    pub delta_x: f64,
    pub delta_y: f64,
}

impl SwipeDelta {
    pub const ZERO: Self = Self {
        delta_x: 0.0,
        delta_y: 0.0,
    };

    #[must_use]
    pub const fn new(delta_x: f64, delta_y: f64) -> Self {
        Self { delta_x, delta_y }
    }

    /// True when neither axis has moved.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.delta_x == 0.0 && self.delta_y == 0.0
    }
}

impl From<(f64, f64)> for SwipeDelta {
    fn from((delta_x, delta_y): (f64, f64)) -> Self {
        Self { delta_x, delta_y }
    }
}

/// Resolved outcome of a completed swipe on a constrained axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SwipeDirection {
    /// Finger moved right to left.
    Left,
    /// Finger moved left to right.
    Right,
    /// Finger moved bottom to top.
    Up,
    /// Finger moved top to bottom.
    Down,
    /// Displacement stayed within the threshold.
    NotReached,
}

impl SwipeDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::NotReached => "not_reached",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
