use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, Window};

use crate::anim::FrameScheduler;
use crate::error::FxError;

/// `requestAnimationFrame` as a [`FrameScheduler`].
pub struct RafScheduler {
    window: Window,
}

impl RafScheduler {
    pub fn new() -> Result<Self, FxError> {
        let window = window().ok_or_else(|| FxError::Dom("no window".into()))?;
        Ok(Self { window })
    }
}

impl FrameScheduler for RafScheduler {
    type Callback = Closure<dyn FnMut(f64)>;
    type Token = i32;

    fn bind(&self, step: Box<dyn FnMut(f64)>) -> Self::Callback {
        Closure::wrap(step)
    }

    fn request(&self, callback: &Self::Callback) -> Result<i32, FxError> {
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| FxError::Schedule(format!("{e:?}")))
    }

    fn cancel(&self, token: i32) {
        if let Err(e) = self.window.cancel_animation_frame(token) {
            log::debug!("cancelAnimationFrame({token}) failed: {e:?}");
        }
    }
}

/// A one-shot `setTimeout` that is cleared when dropped.
pub struct Timeout {
    window: Window,
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Timeout {
    pub fn schedule(delay_ms: f64, f: impl FnOnce() + 'static) -> Result<Self, FxError> {
        let window = window().ok_or_else(|| FxError::Dom("no window".into()))?;
        let mut f = Some(f);
        let callback = Closure::wrap(Box::new(move || {
            if let Some(f) = f.take() {
                f();
            }
        }) as Box<dyn FnMut()>);
        let id = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay_ms.clamp(0.0, i32::MAX as f64) as i32,
        )?;
        Ok(Self {
            window,
            id,
            _callback: callback,
        })
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.window.clear_timeout_with_handle(self.id);
    }
}

/// Milliseconds on the same clock as animation-frame timestamps.
pub fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}
