use mtlaunch_core::FrameClock;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Runs scheduler frames from `window.requestAnimationFrame`.
pub struct AnimationFrameClock;

impl FrameClock for AnimationFrameClock {
    fn request_frame(&self, frame: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            log::error!("requestAnimationFrame: no window");
            return;
        };
        let callback = Closure::once_into_js(move |_time: f64| frame());
        if let Err(e) = window.request_animation_frame(callback.unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
    }
}
