#![forbid(unsafe_code)]

//! DOM binding: one [`SwipeTracker`] per `HtmlElement`.
//!
//! Native events are copied into [`RawPointerEvent`]s, dispatched to the
//! tracker, and the returned host commands are expanded through
//! [`crate::plan`] and executed against the live document. Listener closures
//! hold only a weak reference to their binding, so dropping the
//! [`SwipeBinding`] is enough to tear everything down.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use js_sys::Reflect;
use taction_core::{
    EventFamily, Flow, GestureConfig, HostCommand, MsPointerType, PlatformCaps, PointerPhase,
    RawMsPointer, RawPointer, RawPointerEvent, RawTouch, SwipeDelta, SwipeStart, SwipeTracker,
    TouchCoordinator, TouchPoint, adapter_for,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlElement, PointerEvent, TouchEvent, TouchList, Window};

use crate::error::TrackError;
use crate::plan::{
    self, BOUND_MARKER, DomOp, DomTarget, MS_TOUCH_ACTION, TOUCH_ACTION, exact_int,
};

type Handler = Closure<dyn FnMut(Event)>;

thread_local! {
    static CURRENT_EVENT: RefCell<Option<Event>> = const { RefCell::new(None) };
}

/// Native event currently being dispatched to a tracker, if any.
///
/// Callbacks receive normalized payloads; this gives them the original DOM
/// event (for `stopPropagation`, target inspection, and so on).
#[must_use]
pub fn current_event() -> Option<Event> {
    CURRENT_EVENT.with(|current| current.borrow().clone())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Bind swipe tracking to every element in `elements`.
///
/// Either every element is bound or none is: the collection is checked for
/// existing bindings up front, and a failure part-way drops (and so unbinds)
/// the bindings already made.
///
/// # Errors
///
/// - [`TrackError::Config`] if `config` is invalid.
/// - [`TrackError::AlreadyBound`] if an element is bound already or listed twice.
/// - [`TrackError::NoDocument`] outside a browsing context.
/// - [`TrackError::Dom`] if listener or style setup throws.
pub fn track(
    elements: &[HtmlElement],
    config: GestureConfig<HtmlElement>,
) -> Result<Vec<SwipeBinding>, TrackError> {
    config.validate()?;
    for (i, element) in elements.iter().enumerate() {
        let repeated = elements[..i]
            .iter()
            .any(|other| other.is_same_node(Some(element.as_ref())));
        if repeated || element.has_attribute(BOUND_MARKER) {
            return Err(TrackError::AlreadyBound);
        }
    }

    let window = web_sys::window().ok_or(TrackError::NoDocument)?;
    let root = window
        .document()
        .and_then(|document| document.document_element())
        .and_then(|root| root.dyn_into::<HtmlElement>().ok())
        .ok_or(TrackError::NoDocument)?;
    let family = EventFamily::detect(platform_caps(&window));
    let coordinator = TouchCoordinator::shared();

    elements
        .iter()
        .map(|element| {
            SwipeBinding::bind(element.clone(), &root, family, config.clone(), &coordinator)
        })
        .collect()
}

/// Bind swipe tracking to a single element.
///
/// # Errors
///
/// Same as [`track`].
pub fn track_one(
    element: &HtmlElement,
    config: GestureConfig<HtmlElement>,
) -> Result<SwipeBinding, TrackError> {
    let mut bindings = track(std::slice::from_ref(element), config)?;
    bindings.pop().ok_or(TrackError::NoDocument)
}

/// Handle to one bound element. Dropping it unbinds.
pub struct SwipeBinding {
    bound: Rc<Bound>,
}

impl std::fmt::Debug for SwipeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwipeBinding")
            .field("family", &self.bound.family)
            .field("released", &self.bound.released.get())
            .finish()
    }
}

impl SwipeBinding {
    fn bind(
        element: HtmlElement,
        root: &HtmlElement,
        family: EventFamily,
        config: GestureConfig<HtmlElement>,
        coordinator: &Rc<TouchCoordinator>,
    ) -> Result<Self, TrackError> {
        let is_root = element.is_same_node(Some(root.as_ref()));
        let axis = config.axis;
        let active = Rc::new(Cell::new(false));
        let tracker = SwipeTracker::new(
            element.clone(),
            mirror_activity(config, &active),
            adapter_for(family),
            Rc::clone(coordinator),
        )?
        .at_document_root(is_root);

        let bound = Rc::new_cyclic(|weak| Bound {
            element,
            root: root.clone(),
            family,
            tracker: RefCell::new(tracker),
            listeners: Listeners::new(weak),
            active,
            unbound: Cell::new(false),
            released: Cell::new(false),
        });
        let binding = Self { bound };
        for op in plan::bind_ops(family, axis) {
            binding
                .bound
                .apply(op, None)
                .map_err(|err| TrackError::Dom(describe(&err)))?;
        }
        tracing::debug!(
            family = family.as_str(),
            axis = axis.as_str(),
            is_root,
            "swipe binding attached"
        );
        Ok(binding)
    }

    /// The bound element.
    #[must_use]
    pub fn element(&self) -> &HtmlElement {
        &self.bound.element
    }

    /// Event family the binding listens to.
    #[must_use]
    pub fn family(&self) -> EventFamily {
        self.bound.family
    }

    /// Whether a gesture is in flight on the element.
    ///
    /// Accurate from inside swipe callbacks too: it turns `true` before
    /// `on_start` runs and `false` before `on_reset` runs.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bound.active.get()
    }

    /// Remove all listeners, reset any gesture in flight, and clear the
    /// element's touch-action and bound marker.
    ///
    /// Safe to call from inside a swipe callback; the teardown then runs as
    /// soon as the current dispatch returns.
    pub fn unbind(&self) {
        self.bound.unbound.set(true);
        self.bound.release();
    }

    /// Keep the binding alive for the rest of the page's life.
    pub fn forget(self) {
        std::mem::forget(self);
    }
}

impl Drop for SwipeBinding {
    fn drop(&mut self) {
        self.unbind();
    }
}

// ---------------------------------------------------------------------------
// Binding internals
// ---------------------------------------------------------------------------

struct Listeners {
    start: Handler,
    moving: Handler,
    end: Handler,
    cancel: Handler,
}

impl Listeners {
    fn new(bound: &Weak<Bound>) -> Self {
        Self {
            start: handler(bound, PointerPhase::Start),
            moving: handler(bound, PointerPhase::Move),
            end: handler(bound, PointerPhase::End),
            cancel: handler(bound, PointerPhase::Cancel),
        }
    }

    fn get(&self, phase: PointerPhase) -> &Handler {
        match phase {
            PointerPhase::Start => &self.start,
            PointerPhase::Move => &self.moving,
            PointerPhase::End => &self.end,
            PointerPhase::Cancel => &self.cancel,
        }
    }
}

fn handler(bound: &Weak<Bound>, phase: PointerPhase) -> Handler {
    let bound = Weak::clone(bound);
    Closure::wrap(Box::new(move |event: Event| {
        if let Some(bound) = bound.upgrade() {
            bound.handle(phase, &event);
        }
    }) as Box<dyn FnMut(Event)>)
}

/// Wrap the start and reset slots so `active` follows the tracker state while
/// the tracker itself is borrowed by a dispatch.
fn mirror_activity(
    mut config: GestureConfig<HtmlElement>,
    active: &Rc<Cell<bool>>,
) -> GestureConfig<HtmlElement> {
    let callbacks = &mut config.callbacks;

    let on_start = callbacks.on_start.take();
    let flag = Rc::clone(active);
    callbacks.on_start = Some(Rc::new(move |start: &SwipeStart<'_, HtmlElement>| {
        flag.set(true);
        on_start.as_ref().map_or(Flow::Continue, |callback| callback(start))
    }));

    let on_reset = callbacks.on_reset.take();
    let flag = Rc::clone(active);
    callbacks.on_reset = Some(Rc::new(move |delta: &SwipeDelta| {
        flag.set(false);
        on_reset.as_ref().map_or(Flow::Continue, |callback| callback(delta))
    }));
    config
}

struct Bound {
    element: HtmlElement,
    root: HtmlElement,
    family: EventFamily,
    tracker: RefCell<SwipeTracker<HtmlElement>>,
    listeners: Listeners,
    active: Rc<Cell<bool>>,
    unbound: Cell<bool>,
    released: Cell<bool>,
}

impl Bound {
    fn handle(&self, phase: PointerPhase, event: &Event) {
        if self.released.get() {
            return;
        }
        let raw = if phase == PointerPhase::Cancel {
            None
        } else {
            let Some(raw) = raw_event(self.family, event) else {
                tracing::trace!(event = %event.type_(), "unreadable swipe event");
                return;
            };
            Some(raw)
        };

        let previous = CURRENT_EVENT.with(|current| current.replace(Some(event.clone())));
        let dispatch = match self.tracker.try_borrow_mut() {
            Ok(mut tracker) => Some(match &raw {
                Some(raw) => tracker.dispatch(phase, raw),
                None => tracker.cancel(),
            }),
            Err(_) => None,
        };
        CURRENT_EVENT.with(|current| current.replace(previous));

        let Some(dispatch) = dispatch else {
            tracing::warn!(phase = phase.as_str(), "re-entrant swipe event dropped");
            return;
        };
        tracing::trace!(entry = %dispatch.log, "swipe dispatch");
        self.run(&dispatch.commands, Some(event));

        if self.unbound.get() {
            self.release();
        }
    }

    /// Tear down once no dispatch is in flight.
    fn release(&self) {
        if self.released.get() {
            return;
        }
        let dispatch = {
            let Ok(mut tracker) = self.tracker.try_borrow_mut() else {
                return;
            };
            tracker.force_reset()
        };
        self.released.set(true);
        self.run(&dispatch.commands, None);
        for op in plan::unbind_ops(self.family) {
            if let Err(err) = self.apply(op, None) {
                tracing::warn!(?op, error = %describe(&err), "swipe unbind step failed");
            }
        }
        tracing::debug!(family = self.family.as_str(), "swipe binding released");
    }

    fn run(&self, commands: &[HostCommand], event: Option<&Event>) {
        for &command in commands {
            for op in plan::command_ops(self.family, command) {
                if let Err(err) = self.apply(op, event) {
                    tracing::warn!(?op, error = %describe(&err), "swipe DOM operation failed");
                }
            }
        }
    }

    fn node(&self, target: DomTarget) -> &HtmlElement {
        match target {
            DomTarget::Element => &self.element,
            DomTarget::Root => &self.root,
        }
    }

    fn apply(&self, op: DomOp, event: Option<&Event>) -> Result<(), JsValue> {
        match op {
            DomOp::Listen {
                target,
                phase,
                event: name,
            } => self.node(target).add_event_listener_with_callback(
                name,
                self.listeners.get(phase).as_ref().unchecked_ref(),
            ),
            DomOp::Unlisten {
                target,
                phase,
                event: name,
            } => self.node(target).remove_event_listener_with_callback(
                name,
                self.listeners.get(phase).as_ref().unchecked_ref(),
            ),
            DomOp::SetTouchAction { target, value } => {
                let style = self.node(target).style();
                style.set_property(TOUCH_ACTION, value)?;
                style.set_property(MS_TOUCH_ACTION, value)
            }
            DomOp::ClearTouchAction { target } => {
                let style = self.node(target).style();
                style.remove_property(TOUCH_ACTION)?;
                style.remove_property(MS_TOUCH_ACTION).map(drop)
            }
            DomOp::SetMarker => self.element.set_attribute(BOUND_MARKER, ""),
            DomOp::ClearMarker => self.element.remove_attribute(BOUND_MARKER),
            DomOp::PreventDefault => {
                if let Some(event) = event {
                    event.prevent_default();
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Event conversion
// ---------------------------------------------------------------------------

fn raw_event(family: EventFamily, event: &Event) -> Option<RawPointerEvent> {
    match family {
        EventFamily::Pointer => {
            let event = event.dyn_ref::<PointerEvent>()?;
            Some(RawPointerEvent::Pointer(RawPointer {
                pointer_id: event.pointer_id(),
                pointer_type: event.pointer_type().into(),
                client_x: f64::from(event.client_x()),
                client_y: f64::from(event.client_y()),
            }))
        }
        EventFamily::MsPointer => {
            // MSPointerEvent has no web-sys binding; read its fields directly.
            let field = |key: &str| Reflect::get(event, &JsValue::from_str(key)).ok();
            let pointer_type = field("pointerType")?;
            let pointer_type = match pointer_type.as_string() {
                Some(name) => MsPointerType::Named(name.into()),
                None => MsPointerType::Code(exact_int(pointer_type.as_f64()?)?),
            };
            Some(RawPointerEvent::MsPointer(RawMsPointer {
                pointer_id: exact_int(field("pointerId")?.as_f64()?)?,
                pointer_type,
                client_x: field("clientX")?.as_f64()?,
                client_y: field("clientY")?.as_f64()?,
            }))
        }
        EventFamily::Touch => {
            let event = event.dyn_ref::<TouchEvent>()?;
            Some(RawPointerEvent::Touch(RawTouch {
                target_touches: touch_points(&event.target_touches()),
                changed_touches: touch_points(&event.changed_touches()),
            }))
        }
    }
}

fn touch_points(list: &TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|touch| TouchPoint {
            identifier: touch.identifier(),
            client_x: f64::from(touch.client_x()),
            client_y: f64::from(touch.client_y()),
        })
        .collect()
}

fn platform_caps(window: &Window) -> PlatformCaps {
    let has = |key: &str| Reflect::has(window, &JsValue::from_str(key)).unwrap_or(false);
    let navigator = window.navigator();
    let ms_pointer_enabled = Reflect::get(&navigator, &JsValue::from_str("msPointerEnabled"))
        .ok()
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    PlatformCaps {
        pointer_events: has("PointerEvent"),
        ms_pointer_enabled,
        touch_enabled: has("ontouchstart") || navigator.max_touch_points() > 0,
    }
}

/// Best-effort message for a thrown JS value.
pub(crate) fn describe(err: &JsValue) -> String {
    if let Some(message) = err.as_string() {
        return message;
    }
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{err:?}")
}
