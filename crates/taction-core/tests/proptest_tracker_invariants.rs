//! Property-based invariants of the swipe tracker.
//!
//! Arbitrary event streams (including out-of-order phases, foreign pointer
//! ids, mouse input and aborting callbacks) are replayed against one or two
//! trackers sharing a coordinator, the second bound to the document root.
//! After every step:
//!
//! 1. **Idle state is clean**: no pointer id means zero origin and deltas.
//! 2. **Coordinator matches reality**: the active count equals the number of
//!    trackers mid-gesture. The root stays suppressed while the element
//!    tracker is active and is restored once nothing is.
//! 3. **Reset is last and once**: every accepted start is followed by exactly
//!    one reset, and no callback fires after it until the next start.
//! 4. **One outcome per swipe**: a completed swipe fires at most one of
//!    left/right/up/down/not-reached, and none on the omni axis.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use taction_core::{
    EventFamily, GestureConfig, PointerPhase, RawPointer, RawPointerEvent, SwipeAxis,
    SwipeDirection, SwipeTracker, TouchCoordinator, adapter_for,
};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Step {
    target: usize,
    phase: PointerPhase,
    pointer_id: i32,
    x: f64,
    y: f64,
    touch: bool,
}

fn phase_strategy() -> impl Strategy<Value = PointerPhase> {
    prop_oneof![
        2 => Just(PointerPhase::Start),
        5 => Just(PointerPhase::Move),
        2 => Just(PointerPhase::End),
        1 => Just(PointerPhase::Cancel),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    (
        0usize..2,
        phase_strategy(),
        1i32..3,
        -200.0f64..200.0,
        -200.0f64..200.0,
        prop::bool::weighted(0.9),
    )
        .prop_map(|(target, phase, pointer_id, x, y, touch)| Step {
            target,
            phase,
            pointer_id,
            x: x.round(),
            y: y.round(),
            touch,
        })
}

fn axis_strategy() -> impl Strategy<Value = SwipeAxis> {
    prop_oneof![
        Just(SwipeAxis::Horizontal),
        Just(SwipeAxis::Vertical),
        Just(SwipeAxis::Omni),
    ]
}

// ── Recorder ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Event {
    Start,
    Moving,
    Direction(SwipeDirection),
    End,
    Reset,
}

type Trace = Rc<RefCell<Vec<Event>>>;

fn config(trace: &Trace, axis: SwipeAxis, threshold: f64, abort_over: f64) -> GestureConfig<usize> {
    let t = Rc::clone(trace);
    let mut config = GestureConfig::new()
        .with_axis(axis)
        .with_threshold(threshold)
        .on_start(move |_| t.borrow_mut().push(Event::Start));
    let t = Rc::clone(trace);
    config = config.on_moving(move |d| {
        t.borrow_mut().push(Event::Moving);
        d.delta_x.abs().max(d.delta_y.abs()) <= abort_over
    });
    let t = Rc::clone(trace);
    config = config.on_end(move |_| t.borrow_mut().push(Event::End));
    let t = Rc::clone(trace);
    config = config.on_reset(move |_| t.borrow_mut().push(Event::Reset));
    for direction in [
        SwipeDirection::Left,
        SwipeDirection::Right,
        SwipeDirection::Up,
        SwipeDirection::Down,
        SwipeDirection::NotReached,
    ] {
        let t = Rc::clone(trace);
        let push = move |_: &taction_core::SwipeDelta| {
            t.borrow_mut().push(Event::Direction(direction));
        };
        config = match direction {
            SwipeDirection::Left => config.on_left(push),
            SwipeDirection::Right => config.on_right(push),
            SwipeDirection::Up => config.on_up(push),
            SwipeDirection::Down => config.on_down(push),
            SwipeDirection::NotReached => config.on_not_reached(push),
        };
    }
    config
}

fn raw(step: &Step) -> RawPointerEvent {
    RawPointerEvent::Pointer(RawPointer {
        pointer_id: step.pointer_id,
        pointer_type: if step.touch { "touch" } else { "mouse" }.into(),
        client_x: step.x,
        client_y: step.y,
    })
}

/// Split a trace into gesture cycles, each starting at `Start`.
fn cycles(trace: &[Event]) -> Vec<&[Event]> {
    let mut out = Vec::new();
    let mut begin = None;
    for (i, event) in trace.iter().enumerate() {
        if *event == Event::Start {
            if let Some(b) = begin {
                out.push(&trace[b..i]);
            }
            begin = Some(i);
        }
    }
    if let Some(b) = begin {
        out.push(&trace[b..]);
    }
    out
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn state_and_coordinator_stay_consistent(
        axis in axis_strategy(),
        threshold in 0.0f64..60.0,
        abort_over in 20.0f64..400.0,
        steps in prop::collection::vec(step_strategy(), 1..60),
    ) {
        let coordinator = TouchCoordinator::new();
        let traces: [Trace; 2] = [Trace::default(), Trace::default()];
        let mut trackers: Vec<SwipeTracker<usize>> = (0..2)
            .map(|i| {
                SwipeTracker::new(
                    i,
                    config(&traces[i], axis, threshold, abort_over),
                    adapter_for(EventFamily::Pointer),
                    Rc::clone(&coordinator),
                )
                .unwrap()
                .at_document_root(i == 1)
            })
            .collect();

        for step in &steps {
            let _ = trackers[step.target].dispatch(step.phase, &raw(step));

            for tracker in &trackers {
                let state = tracker.state();
                if state.active_pointer_id.is_none() {
                    prop_assert_eq!(state.delta_x, 0.0);
                    prop_assert_eq!(state.delta_y, 0.0);
                    prop_assert_eq!(state.origin_x, 0.0);
                    prop_assert_eq!(state.origin_y, 0.0);
                    prop_assert!(tracker.listener_scope().is_none());
                }
            }
            let active = trackers.iter().filter(|t| t.is_active()).count();
            prop_assert_eq!(coordinator.active(), active);
            if trackers[0].is_active() {
                prop_assert!(coordinator.is_root_suppressed());
            }
            if coordinator.is_idle() {
                prop_assert!(!coordinator.is_root_suppressed());
            }
        }

        for (tracker, trace) in trackers.iter().zip(&traces) {
            let trace = trace.borrow();
            for cycle in cycles(&trace) {
                let resets = cycle.iter().filter(|e| **e == Event::Reset).count();
                let closed = resets == 1;
                let open = resets == 0 && tracker.is_active();
                prop_assert!(closed || open, "cycle {:?}", cycle);
                if closed {
                    prop_assert_eq!(cycle.last(), Some(&Event::Reset));
                }

                let directions = cycle
                    .iter()
                    .filter(|e| matches!(e, Event::Direction(_)))
                    .count();
                prop_assert!(directions <= 1);
                if axis == SwipeAxis::Omni {
                    prop_assert_eq!(directions, 0);
                }
            }
        }
    }

    #[test]
    fn completed_horizontal_swipe_fires_matching_direction(
        dx in -150.0f64..150.0,
        dy_ratio in 0.0f64..0.9,
        threshold in 0.0f64..60.0,
    ) {
        prop_assume!(dx.abs() > 0.5);
        let dy = (dx.abs() * dy_ratio).floor();
        let trace = Trace::default();
        let mut tracker = SwipeTracker::new(
            0,
            config(&trace, SwipeAxis::Horizontal, threshold, f64::INFINITY),
            adapter_for(EventFamily::Pointer),
            TouchCoordinator::new(),
        )
        .unwrap();

        let at = |x: f64, y: f64| Step { target: 0, phase: PointerPhase::Start, pointer_id: 1, x, y, touch: true };
        tracker.dispatch(PointerPhase::Start, &raw(&at(0.0, 0.0)));
        tracker.dispatch(PointerPhase::Move, &raw(&at(dx, dy)));
        tracker.dispatch(PointerPhase::End, &raw(&at(dx, dy)));

        let expected = if dx > threshold {
            SwipeDirection::Right
        } else if dx < -threshold {
            SwipeDirection::Left
        } else {
            SwipeDirection::NotReached
        };
        prop_assert_eq!(
            trace.borrow().clone(),
            vec![
                Event::Start,
                Event::Moving,
                Event::Direction(expected),
                Event::End,
                Event::Reset,
            ]
        );
    }
}
