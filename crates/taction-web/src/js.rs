#![forbid(unsafe_code)]

//! `wasm-bindgen` export for page scripts.
//!
//! ```js
//! const handle = taction(document.querySelectorAll(".card"), {
//!     threshold: 30,
//!     swipeDirection: "horizontal",
//!     left: (d) => next(),
//!     moving: (d) => d.x < 300, // returning false ends the gesture
//! });
//! handle.destroy();
//! ```

use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect};
use taction_core::{DeltaCallback, Flow, GestureConfig, SwipeDelta, SwipeOptions, SwipeStart};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::dom::{self, SwipeBinding, describe};

/// Bindings created by one `taction(...)` call.
#[wasm_bindgen]
pub struct TactionHandle {
    bindings: Vec<SwipeBinding>,
}

#[wasm_bindgen]
impl TactionHandle {
    /// Unbind every element.
    pub fn destroy(&mut self) {
        for binding in self.bindings.drain(..) {
            binding.unbind();
        }
    }

    /// Number of bound elements.
    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[wasm_bindgen(getter, js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Bind swipe tracking to one element or an array-like of elements.
///
/// # Errors
///
/// Throws a string describing an invalid option, a non-element entry, or an
/// element that is already bound.
#[wasm_bindgen(js_name = taction)]
pub fn taction(elements: JsValue, options: JsValue) -> Result<TactionHandle, JsValue> {
    install_panic_hook();
    let elements = collect_elements(&elements)?;
    let config = config_from_js(&options)?;
    let bindings = dom::track(&elements, config).map_err(|err| to_js(&err))?;
    Ok(TactionHandle { bindings })
}

fn to_js(err: &impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("taction: {err}"))
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = match info.location() {
                Some(loc) => format!("taction panicked at {}:{}: {info}", loc.file(), loc.line()),
                None => format!("taction panicked: {info}"),
            };
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

/// A single element, `null`/`undefined` (nothing to bind), or anything
/// `Array.from` accepts (arrays, `NodeList`, `HTMLCollection`, jQuery).
fn collect_elements(value: &JsValue) -> Result<Vec<HtmlElement>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(Vec::new());
    }
    if let Some(element) = value.dyn_ref::<HtmlElement>() {
        return Ok(vec![element.clone()]);
    }
    Array::from(value)
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.dyn_into::<HtmlElement>()
                .map_err(|_| to_js(&format!("entry {i} is not an HTMLElement")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

fn get(options: &JsValue, key: &str) -> Option<JsValue> {
    let value = Reflect::get(options, &JsValue::from_str(key)).ok()?;
    (!value.is_undefined() && !value.is_null()).then_some(value)
}

fn function(options: &JsValue, key: &str) -> Option<Function> {
    get(options, key)?.dyn_into::<Function>().ok()
}

fn config_from_js(options: &JsValue) -> Result<GestureConfig<HtmlElement>, JsValue> {
    // Present but mistyped values must still fail validation, not fall back
    // to the defaults.
    let swipe_options = SwipeOptions {
        threshold: get(options, "threshold").map(|value| value.as_f64().unwrap_or(f64::NAN)),
        swipe_direction: get(options, "swipeDirection")
            .map(|value| value.as_string().unwrap_or_else(|| format!("{value:?}"))),
    };
    let mut config = GestureConfig::from_options(&swipe_options).map_err(|err| to_js(&err))?;

    if let Some(callback) = function(options, "start") {
        config.callbacks.on_start = Some(Rc::new(move |start: &SwipeStart<'_, HtmlElement>| {
            let payload = Object::new();
            set(&payload, "el", start.element.as_ref());
            if let Some(event) = dom::current_event() {
                set(&payload, "event", event.as_ref());
            }
            flow(callback.call1(&JsValue::NULL, &payload), "start")
        }));
    }

    let callbacks = &mut config.callbacks;
    let slots = [
        ("moving", &mut callbacks.on_moving),
        ("beforeEnd", &mut callbacks.on_before_end),
        ("end", &mut callbacks.on_end),
        ("reset", &mut callbacks.on_reset),
        ("notReached", &mut callbacks.on_not_reached),
        ("left", &mut callbacks.on_left),
        ("right", &mut callbacks.on_right),
        ("up", &mut callbacks.on_up),
        ("down", &mut callbacks.on_down),
    ];
    for (name, slot) in slots {
        if let Some(callback) = function(options, name) {
            *slot = Some(delta_callback(callback, name));
        }
    }
    Ok(config)
}

fn delta_callback(callback: Function, name: &'static str) -> DeltaCallback {
    Rc::new(move |delta: &SwipeDelta| {
        flow(callback.call1(&JsValue::NULL, &delta_payload(delta)), name)
    })
}

/// `{deltaX, deltaY, x, y}`; `x`/`y` mirror the deltas for older page code.
fn delta_payload(delta: &SwipeDelta) -> JsValue {
    let payload = Object::new();
    let dx = JsValue::from_f64(delta.delta_x);
    let dy = JsValue::from_f64(delta.delta_y);
    set(&payload, "deltaX", &dx);
    set(&payload, "deltaY", &dy);
    set(&payload, "x", &dx);
    set(&payload, "y", &dy);
    payload.into()
}

fn set(obj: &Object, key: &str, value: &JsValue) {
    if let Err(err) = Reflect::set(obj, &JsValue::from_str(key), value) {
        tracing::trace!(key, error = %describe(&err), "swipe payload field not set");
    }
}

/// `false` stops the gesture; so does a callback that throws.
fn flow(result: Result<JsValue, JsValue>, name: &str) -> Flow {
    match result {
        Ok(value) => Flow::from(value.as_bool() != Some(false)),
        Err(err) => {
            tracing::warn!(callback = name, error = %describe(&err), "swipe callback threw");
            Flow::Abort
        }
    }
}
