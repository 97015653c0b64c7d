//! `requestAnimationFrame` scheduler for the browser build

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{FrameScheduler, TickHandle};

/// Schedules a single shared callback through `requestAnimationFrame`
pub struct RafScheduler {
    callback: Closure<dyn FnMut(f64)>,
}

impl RafScheduler {
    /// The callback receives the frame timestamp (ms) and must route it to the
    /// session's frame handler.
    pub fn new(callback: impl FnMut(f64) + 'static) -> Self {
        Self {
            callback: Closure::<dyn FnMut(f64)>::new(callback),
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_tick(&mut self) -> TickHandle {
        let id = web_sys::window()
            .and_then(|w| {
                w.request_animation_frame(self.callback.as_ref().unchecked_ref())
                    .ok()
            })
            .unwrap_or_else(|| {
                log::error!("requestAnimationFrame unavailable");
                0
            });
        TickHandle(id)
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.cancel_animation_frame(handle.0) {
                log::warn!("cancelAnimationFrame failed: {:?}", e);
            }
        }
    }
}
