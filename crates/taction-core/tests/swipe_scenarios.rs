//! End-to-end swipe scenarios driven through raw event payloads.
//!
//! Each test records every callback invocation in order and compares the
//! whole sequence, so ordering regressions (reset not last, directional
//! callback after end, …) show up as a readable diff.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use taction_core::{
    EventFamily, GestureConfig, HostCommand, ListenerScope, MsPointerType, PointerPhase,
    RawMsPointer, RawPointer, RawPointerEvent, RawTouch, SwipeAxis, SwipeDelta, SwipeDirection,
    SwipeLogOutcome, SwipeTracker, TouchCoordinator, TouchPoint, adapter_for,
};

// ── Recorder ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Start(i32, f64, f64),
    Moving(f64, f64),
    BeforeEnd,
    Direction(SwipeDirection),
    End(f64, f64),
    Reset(f64, f64),
}

type Log = Rc<RefCell<Vec<Call>>>;

fn recording(log: &Log) -> GestureConfig<()> {
    let l = Rc::clone(log);
    let mut config = GestureConfig::new().on_start(move |s| {
        l.borrow_mut()
            .push(Call::Start(s.pointer_id, s.origin_x, s.origin_y));
    });
    let l = Rc::clone(log);
    config = config.on_moving(move |d| l.borrow_mut().push(Call::Moving(d.delta_x, d.delta_y)));
    let l = Rc::clone(log);
    config = config.on_before_end(move |_| l.borrow_mut().push(Call::BeforeEnd));
    let l = Rc::clone(log);
    config = config.on_end(move |d| l.borrow_mut().push(Call::End(d.delta_x, d.delta_y)));
    let l = Rc::clone(log);
    config = config.on_reset(move |d| l.borrow_mut().push(Call::Reset(d.delta_x, d.delta_y)));
    for direction in [
        SwipeDirection::Left,
        SwipeDirection::Right,
        SwipeDirection::Up,
        SwipeDirection::Down,
        SwipeDirection::NotReached,
    ] {
        let l = Rc::clone(log);
        let push = move |_: &SwipeDelta| l.borrow_mut().push(Call::Direction(direction));
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

fn pointer(id: i32, x: f64, y: f64) -> RawPointerEvent {
    RawPointerEvent::Pointer(RawPointer {
        pointer_id: id,
        pointer_type: "touch".into(),
        client_x: x,
        client_y: y,
    })
}

struct Harness {
    tracker: SwipeTracker<()>,
    coordinator: Rc<TouchCoordinator>,
    log: Log,
}

impl Harness {
    fn new(axis: SwipeAxis, threshold: f64) -> Self {
        Self::with_family(EventFamily::Pointer, axis, threshold)
    }

    fn with_family(family: EventFamily, axis: SwipeAxis, threshold: f64) -> Self {
        let log = Log::default();
        let coordinator = TouchCoordinator::new();
        let config = recording(&log).with_axis(axis).with_threshold(threshold);
        let tracker =
            SwipeTracker::new((), config, adapter_for(family), Rc::clone(&coordinator)).unwrap();
        Self {
            tracker,
            coordinator,
            log,
        }
    }

    fn send(&mut self, phase: PointerPhase, x: f64, y: f64) -> SwipeLogOutcome {
        self.tracker.dispatch(phase, &pointer(1, x, y)).log.outcome
    }

    fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }
}

// ── Scenarios ───────────────────────────────────────────────────────────

#[test]
fn horizontal_swipe_right() {
    let mut h = Harness::new(SwipeAxis::Horizontal, 20.0);
    h.send(PointerPhase::Start, 0.0, 0.0);
    h.send(PointerPhase::Move, 30.0, 2.0);
    let outcome = h.send(PointerPhase::End, 30.0, 2.0);

    assert_eq!(
        outcome,
        SwipeLogOutcome::Ended {
            direction: Some(SwipeDirection::Right)
        }
    );
    assert_eq!(
        h.calls(),
        vec![
            Call::Start(1, 0.0, 0.0),
            Call::Moving(30.0, 2.0),
            Call::BeforeEnd,
            Call::Direction(SwipeDirection::Right),
            Call::End(30.0, 2.0),
            Call::Reset(30.0, 2.0),
        ]
    );
    assert!(h.coordinator.is_idle());
}

#[test]
fn diagonal_tie_yields_to_scroll() {
    let mut h = Harness::new(SwipeAxis::Horizontal, 20.0);
    h.send(PointerPhase::Start, 0.0, 0.0);
    assert_eq!(
        h.send(PointerPhase::Move, 5.0, 5.0),
        SwipeLogOutcome::YieldedToScroll
    );
    h.send(PointerPhase::Move, 40.0, 6.0);
    h.send(PointerPhase::End, 40.0, 6.0);

    assert_eq!(
        h.calls(),
        vec![Call::Start(1, 0.0, 0.0), Call::Reset(0.0, 0.0)]
    );
    assert!(!h.tracker.is_active());
}

#[test]
fn vertical_zero_threshold_swipe_up() {
    let mut h = Harness::new(SwipeAxis::Vertical, 0.0);
    h.send(PointerPhase::Start, 0.0, 0.0);
    h.send(PointerPhase::Move, 0.0, -1.0);
    h.send(PointerPhase::End, 0.0, -1.0);

    assert_eq!(
        h.calls(),
        vec![
            Call::Start(1, 0.0, 0.0),
            Call::Moving(0.0, -1.0),
            Call::BeforeEnd,
            Call::Direction(SwipeDirection::Up),
            Call::End(0.0, -1.0),
            Call::Reset(0.0, -1.0),
        ]
    );
}

#[test]
fn short_swipe_is_not_reached() {
    let mut h = Harness::new(SwipeAxis::Horizontal, 20.0);
    h.send(PointerPhase::Start, 100.0, 100.0);
    h.send(PointerPhase::Move, 110.0, 101.0);
    h.send(PointerPhase::End, 110.0, 101.0);

    assert_eq!(
        h.calls(),
        vec![
            Call::Start(1, 100.0, 100.0),
            Call::Moving(10.0, 1.0),
            Call::BeforeEnd,
            Call::Direction(SwipeDirection::NotReached),
            Call::End(10.0, 1.0),
            Call::Reset(10.0, 1.0),
        ]
    );
}

#[test]
fn cancel_after_moving_only_resets() {
    let mut h = Harness::new(SwipeAxis::Horizontal, 20.0);
    h.send(PointerPhase::Start, 0.0, 0.0);
    h.send(PointerPhase::Move, 12.0, 1.0);
    assert_eq!(
        h.send(PointerPhase::Cancel, 12.0, 1.0),
        SwipeLogOutcome::Cancelled
    );

    assert_eq!(
        h.calls(),
        vec![
            Call::Start(1, 0.0, 0.0),
            Call::Moving(12.0, 1.0),
            Call::Reset(12.0, 1.0),
        ]
    );
    assert!(h.coordinator.is_idle());
}

#[test]
fn omni_reports_raw_deltas_without_direction() {
    let mut h = Harness::new(SwipeAxis::Omni, 20.0);
    h.send(PointerPhase::Start, 0.0, 0.0);
    h.send(PointerPhase::Move, -3.0, 50.0);
    h.send(PointerPhase::End, -3.0, 50.0);

    assert_eq!(
        h.calls(),
        vec![
            Call::Start(1, 0.0, 0.0),
            Call::Moving(-3.0, 50.0),
            Call::BeforeEnd,
            Call::End(-3.0, 50.0),
            Call::Reset(-3.0, 50.0),
        ]
    );
}

#[test]
fn back_to_back_gestures_are_independent() {
    let mut h = Harness::new(SwipeAxis::Horizontal, 20.0);
    h.send(PointerPhase::Start, 0.0, 0.0);
    h.send(PointerPhase::Move, -40.0, 0.0);
    h.send(PointerPhase::End, -40.0, 0.0);
    h.log.borrow_mut().clear();

    h.send(PointerPhase::Start, 10.0, 10.0);
    h.send(PointerPhase::End, 10.0, 10.0);
    assert_eq!(
        h.calls(),
        vec![Call::Start(1, 10.0, 10.0), Call::Reset(0.0, 0.0)]
    );
}

// ── Host commands across a full gesture ─────────────────────────────────

#[test]
fn pointer_gesture_command_stream() {
    let coordinator = TouchCoordinator::new();
    let mut tracker = SwipeTracker::new(
        (),
        GestureConfig::new(),
        adapter_for(EventFamily::Pointer),
        Rc::clone(&coordinator),
    )
    .unwrap();

    let mut commands = Vec::new();
    for (phase, x) in [
        (PointerPhase::Start, 0.0),
        (PointerPhase::Move, 15.0),
        (PointerPhase::Move, 35.0),
        (PointerPhase::End, 35.0),
    ] {
        commands.extend(tracker.dispatch(phase, &pointer(9, x, 0.0)).commands);
    }

    let scope = ListenerScope::Root;
    assert_eq!(
        commands,
        vec![
            HostCommand::AttachTracking { scope },
            HostCommand::SuppressRootTouchAction,
            HostCommand::PreventDefault,
            HostCommand::PreventDefault,
            HostCommand::DetachTracking { scope },
            HostCommand::RestoreRootTouchAction,
        ]
    );
}

#[test]
fn touch_family_end_reads_changed_touches() {
    let mut h = Harness::with_family(EventFamily::Touch, SwipeAxis::Horizontal, 20.0);
    let touch = |x: f64| TouchPoint {
        identifier: 4,
        client_x: x,
        client_y: 0.0,
    };
    let t = &mut h.tracker;
    t.dispatch(
        PointerPhase::Start,
        &RawPointerEvent::Touch(RawTouch {
            target_touches: vec![touch(0.0)],
            changed_touches: vec![touch(0.0)],
        }),
    );
    t.dispatch(
        PointerPhase::Move,
        &RawPointerEvent::Touch(RawTouch {
            target_touches: vec![touch(-25.0)],
            changed_touches: vec![touch(-25.0)],
        }),
    );
    let end = t.dispatch(
        PointerPhase::End,
        &RawPointerEvent::Touch(RawTouch {
            target_touches: Vec::new(),
            changed_touches: vec![touch(-25.0)],
        }),
    );

    assert_eq!(
        end.log.outcome,
        SwipeLogOutcome::Ended {
            direction: Some(SwipeDirection::Left)
        }
    );
    assert_eq!(
        end.commands,
        vec![
            HostCommand::DetachTracking {
                scope: ListenerScope::Element
            },
            HostCommand::RestoreRootTouchAction,
        ]
    );
}

#[test]
fn ms_pointer_legacy_touch_code_is_accepted() {
    let mut h = Harness::with_family(EventFamily::MsPointer, SwipeAxis::Vertical, 20.0);
    let ms = |x: f64, y: f64, kind: MsPointerType| {
        RawPointerEvent::MsPointer(RawMsPointer {
            pointer_id: 2,
            pointer_type: kind,
            client_x: x,
            client_y: y,
        })
    };
    let t = &mut h.tracker;
    let pen = t.dispatch(PointerPhase::Start, &ms(0.0, 0.0, MsPointerType::Code(3)));
    assert!(!pen.accepted());

    t.dispatch(PointerPhase::Start, &ms(0.0, 0.0, MsPointerType::Code(2)));
    t.dispatch(PointerPhase::Move, &ms(1.0, 30.0, MsPointerType::Code(2)));
    t.dispatch(PointerPhase::End, &ms(1.0, 30.0, MsPointerType::Code(2)));

    assert_eq!(
        h.calls(),
        vec![
            Call::Start(2, 0.0, 0.0),
            Call::Moving(1.0, 30.0),
            Call::BeforeEnd,
            Call::Direction(SwipeDirection::Down),
            Call::End(1.0, 30.0),
            Call::Reset(1.0, 30.0),
        ]
    );
}

#[test]
fn shared_config_drives_independent_elements() {
    let log = Log::default();
    let coordinator = TouchCoordinator::new();
    let config = recording(&log);
    let mut left = SwipeTracker::new(
        (),
        config.clone(),
        adapter_for(EventFamily::Pointer),
        Rc::clone(&coordinator),
    )
    .unwrap();
    let mut right = SwipeTracker::new(
        (),
        config,
        adapter_for(EventFamily::Pointer),
        Rc::clone(&coordinator),
    )
    .unwrap();

    left.dispatch(PointerPhase::Start, &pointer(1, 0.0, 0.0));
    right.dispatch(PointerPhase::Start, &pointer(2, 0.0, 0.0));
    assert_eq!(coordinator.active(), 2);

    let right_end = right.dispatch(PointerPhase::End, &pointer(2, 0.0, 0.0));
    assert!(!right_end
        .commands
        .contains(&HostCommand::RestoreRootTouchAction));
    let left_end = left.dispatch(PointerPhase::End, &pointer(1, 0.0, 0.0));
    assert!(left_end
        .commands
        .contains(&HostCommand::RestoreRootTouchAction));
    assert!(coordinator.is_idle());
}
