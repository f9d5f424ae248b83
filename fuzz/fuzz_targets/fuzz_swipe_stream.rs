#![no_main]

use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use taction_core::{
    EventFamily, GestureConfig, MsPointerType, PointerPhase, RawMsPointer, RawPointer,
    RawPointerEvent, RawTouch, SwipeAxis, SwipeTracker, TouchCoordinator, TouchPoint,
    adapter_for,
};

#[derive(Debug, Arbitrary)]
enum Payload {
    Pointer { id: i8, touch: bool },
    MsPointer { id: i8, code: u8 },
    Touch { target: Vec<i8>, changed: Vec<i8> },
}

#[derive(Debug, Arbitrary)]
struct Step {
    target: bool,
    phase: u8,
    x: i16,
    y: i16,
    payload: Payload,
    force_reset: bool,
}

#[derive(Debug, Arbitrary)]
struct Input {
    family: u8,
    axis: u8,
    threshold: u8,
    abort_every: u8,
    steps: Vec<Step>,
}

fn raw(step: &Step) -> RawPointerEvent {
    let (x, y) = (f64::from(step.x), f64::from(step.y));
    let point = |id: &i8| TouchPoint {
        identifier: i32::from(*id),
        client_x: x,
        client_y: y,
    };
    match &step.payload {
        Payload::Pointer { id, touch } => RawPointerEvent::Pointer(RawPointer {
            pointer_id: i32::from(*id),
            pointer_type: if *touch { "touch" } else { "pen" }.into(),
            client_x: x,
            client_y: y,
        }),
        Payload::MsPointer { id, code } => RawPointerEvent::MsPointer(RawMsPointer {
            pointer_id: i32::from(*id),
            pointer_type: MsPointerType::Code(u32::from(*code % 5)),
            client_x: x,
            client_y: y,
        }),
        Payload::Touch { target, changed } => RawPointerEvent::Touch(RawTouch {
            target_touches: target.iter().take(4).map(point).collect(),
            changed_touches: changed.iter().take(4).map(point).collect(),
        }),
    }
}

fuzz_target!(|input: Input| {
    if input.steps.len() > 512 {
        return;
    }
    let family = [EventFamily::Pointer, EventFamily::MsPointer, EventFamily::Touch]
        [usize::from(input.family % 3)];
    let axis = [SwipeAxis::Horizontal, SwipeAxis::Vertical, SwipeAxis::Omni]
        [usize::from(input.axis % 3)];
    let abort_every = usize::from(input.abort_every).max(1);

    let coordinator = TouchCoordinator::new();
    let counter = Rc::new(std::cell::Cell::new(0usize));
    let make = || {
        let counter = Rc::clone(&counter);
        let config = GestureConfig::new()
            .with_axis(axis)
            .with_threshold(f64::from(input.threshold))
            .on_moving(move |_| {
                counter.set(counter.get() + 1);
                counter.get() % abort_every != 0
            });
        SwipeTracker::new((), config, adapter_for(family), Rc::clone(&coordinator))
            .expect("valid config")
    };
    let mut trackers = [make(), make()];

    for step in &input.steps {
        let tracker = &mut trackers[usize::from(step.target)];
        if step.force_reset {
            let _ = tracker.force_reset();
            continue;
        }
        let phase = PointerPhase::ALL[usize::from(step.phase % 4)];
        let _ = tracker.dispatch(phase, &raw(step));

        for tracker in &trackers {
            let state = tracker.state();
            if !state.is_active() {
                assert_eq!((state.delta_x, state.delta_y), (0.0, 0.0));
                assert!(tracker.listener_scope().is_none());
            }
        }
        let active = trackers.iter().filter(|t| t.is_active()).count();
        assert_eq!(coordinator.active(), active, "coordinator drifted");
    }

    for tracker in &mut trackers {
        let _ = tracker.force_reset();
    }
    assert!(coordinator.is_idle());
    assert!(!coordinator.is_root_suppressed(), "root left suppressed");
});
