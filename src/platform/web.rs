//! Browser implementations of the platform traits

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Navigator;

use super::{Haptics, RecurringTask};

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

/// `navigator.vibrate`, when the browser exposes it
pub struct WebHaptics {
    navigator: Option<Navigator>,
}

impl WebHaptics {
    pub fn detect() -> Self {
        let navigator = web_sys::window()
            .map(|w| w.navigator())
            .filter(|n| js_sys::Reflect::has(n, &JsValue::from_str("vibrate")).unwrap_or(false));
        if navigator.is_none() {
            log::info!("Vibration not supported - haptics disabled");
        }
        Self { navigator }
    }
}

impl Haptics for WebHaptics {
    fn pulse(&self, duration_ms: u32) -> bool {
        match &self.navigator {
            Some(navigator) => navigator.vibrate_with_duration(duration_ms),
            None => false,
        }
    }
}

/// `setInterval` timer that is cleared on cancel or drop
pub struct IntervalTask {
    handle: Option<i32>,
    closure: Option<Closure<dyn FnMut()>>,
}

impl IntervalTask {
    pub fn start(period_ms: u32, callback: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut()>::new(callback);
        let handle = window()?.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period_ms as i32,
        )?;
        Ok(Self {
            handle: Some(handle),
            closure: Some(closure),
        })
    }
}

impl RecurringTask for IntervalTask {
    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(w) = web_sys::window() {
                w.clear_interval_with_handle(handle);
            }
        }
        self.closure = None;
    }
}

impl Drop for IntervalTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Self-rescheduling `requestAnimationFrame` loop
pub struct AnimationFrameTask {
    callback: FrameCallback,
    pending: Rc<Cell<Option<i32>>>,
    cancelled: Rc<Cell<bool>>,
}

impl AnimationFrameTask {
    /// Start the loop. `on_frame` receives the host timestamp (ms).
    pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));
        let cancelled = Rc::new(Cell::new(false));

        let f = callback.clone();
        let p = pending.clone();
        let c = cancelled.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            p.set(None);
            if c.get() {
                return;
            }
            on_frame(ts);
            // on_frame may have torn the loop down
            if c.get() {
                return;
            }
            if let Some(cb) = f.borrow().as_ref() {
                match request_frame(cb) {
                    Ok(id) => p.set(Some(id)),
                    Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
                }
            }
        }) as Box<dyn FnMut(f64)>));

        if let Some(cb) = callback.borrow().as_ref() {
            pending.set(Some(request_frame(cb)?));
        }

        Ok(Self {
            callback,
            pending,
            cancelled,
        })
    }
}

fn request_frame(cb: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    window()?.request_animation_frame(cb.as_ref().unchecked_ref())
}

impl RecurringTask for AnimationFrameTask {
    fn cancel(&mut self) {
        self.cancelled.set(true);
        if let Some(id) = self.pending.take() {
            if let Some(w) = web_sys::window() {
                let _ = w.cancel_animation_frame(id);
            }
        }
        // Breaks the closure -> Rc -> closure cycle
        self.callback.borrow_mut().take();
    }
}

impl Drop for AnimationFrameTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
