//! Frame loop ownership and easing helpers.
//!
//! Every recurring animation is an [`AnimationLoop`] owned by the component
//! that drives it. The loop asks a [`FrameScheduler`] for one frame at a time
//! and re-requests after each step, the same way a `requestAnimationFrame`
//! chain works, but the pending request is tracked so it can be cancelled
//! exactly once on `stop()` or drop.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::FxError;

/// Host facility that invokes a bound callback once on the next frame.
pub trait FrameScheduler: 'static {
    /// Host representation of a frame callback (a JS closure in the browser).
    type Callback: 'static;
    /// Identifier of one outstanding request.
    type Token: Copy + 'static;

    fn bind(&self, step: Box<dyn FnMut(f64)>) -> Self::Callback;
    fn request(&self, callback: &Self::Callback) -> Result<Self::Token, FxError>;
    fn cancel(&self, token: Self::Token);
}

/// An owned, cancellable per-frame loop.
pub struct AnimationLoop<S: FrameScheduler> {
    inner: Rc<LoopInner<S>>,
}

struct LoopInner<S: FrameScheduler> {
    scheduler: S,
    callback: RefCell<Option<S::Callback>>,
    pending: Cell<Option<S::Token>>,
    running: Cell<bool>,
    step: RefCell<Box<dyn FnMut(f64)>>,
}

impl<S: FrameScheduler> AnimationLoop<S> {
    /// Creates a stopped loop that will call `step` with the frame timestamp
    /// (milliseconds) once per frame after [`start`](Self::start).
    pub fn new(scheduler: S, step: impl FnMut(f64) + 'static) -> Self {
        let inner = Rc::new(LoopInner {
            scheduler,
            callback: RefCell::new(None),
            pending: Cell::new(None),
            running: Cell::new(false),
            step: RefCell::new(Box::new(step)),
        });

        // The host callback only holds a weak reference so a dropped loop can
        // never be kept alive by its own pending frame.
        let weak: Weak<LoopInner<S>> = Rc::downgrade(&inner);
        let callback = inner.scheduler.bind(Box::new(move |timestamp| {
            if let Some(inner) = weak.upgrade() {
                inner.fire(timestamp);
            }
        }));
        *inner.callback.borrow_mut() = Some(callback);

        Self { inner }
    }

    pub fn start(&self) -> Result<(), FxError> {
        if self.inner.running.replace(true) {
            return Ok(());
        }
        self.inner.schedule().inspect_err(|_| self.inner.running.set(false))
    }

    /// Stops the loop and cancels the pending frame. Returns whether the loop
    /// was running; stopping a stopped loop is a no-op.
    pub fn stop(&self) -> bool {
        self.inner.halt()
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    pub fn scheduler(&self) -> &S {
        &self.inner.scheduler
    }
}

impl<S: FrameScheduler> LoopInner<S> {
    fn schedule(&self) -> Result<(), FxError> {
        let callback = self.callback.borrow();
        let callback = callback
            .as_ref()
            .ok_or_else(|| FxError::Schedule("loop already torn down".into()))?;
        let token = self.scheduler.request(callback)?;
        self.pending.set(Some(token));
        Ok(())
    }

    fn fire(&self, timestamp: f64) {
        self.pending.set(None);
        if !self.running.get() {
            return;
        }
        (self.step.borrow_mut())(timestamp);
        if self.running.get() {
            if let Err(err) = self.schedule() {
                log::warn!("animation loop halted: {err}");
                self.running.set(false);
            }
        }
    }

    fn halt(&self) -> bool {
        let was_running = self.running.replace(false);
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }
        was_running
    }
}

impl<S: FrameScheduler> Drop for AnimationLoop<S> {
    fn drop(&mut self) {
        self.inner.halt();
        self.inner.callback.borrow_mut().take();
    }
}

type ManualCallback = Rc<RefCell<Box<dyn FnMut(f64)>>>;

/// A scheduler whose frames are fired explicitly with [`advance`](Self::advance).
///
/// Used for headless rendering and for driving loops deterministically in
/// tests. Clones share the same queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Vec<(u64, ManualCallback)>>>,
    next_token: Rc<Cell<u64>>,
    cancelled: Rc<Cell<usize>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every callback requested before this call. Returns how many ran.
    pub fn advance(&self, timestamp: f64) -> usize {
        let due: Vec<(u64, ManualCallback)> = self.queue.borrow_mut().drain(..).collect();
        for (_, callback) in &due {
            (callback.borrow_mut())(timestamp);
        }
        due.len()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Total number of requests withdrawn through `cancel`.
    pub fn cancelled(&self) -> usize {
        self.cancelled.get()
    }
}

impl FrameScheduler for ManualScheduler {
    type Callback = ManualCallback;
    type Token = u64;

    fn bind(&self, step: Box<dyn FnMut(f64)>) -> Self::Callback {
        Rc::new(RefCell::new(step))
    }

    fn request(&self, callback: &Self::Callback) -> Result<u64, FxError> {
        let token = self.next_token.get();
        self.next_token.set(token + 1);
        self.queue.borrow_mut().push((token, Rc::clone(callback)));
        Ok(token)
    }

    fn cancel(&self, token: u64) {
        let mut queue = self.queue.borrow_mut();
        let before = queue.len();
        queue.retain(|(queued, _)| *queued != token);
        if queue.len() != before {
            self.cancelled.set(self.cancelled.get() + 1);
        }
    }
}

/// CSS-style cubic Bézier timing function through (0,0) and (1,1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

/// The CSS `ease` keyword.
pub const EASE: CubicBezier = CubicBezier::new(0.25, 0.1, 0.25, 1.0);

impl CubicBezier {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Eased progress for linear progress `t`, clamped to `[0, 1]`.
    pub fn apply(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let s = self.solve_x(t);
        bezier(self.y1, self.y2, s)
    }

    fn solve_x(&self, x: f64) -> f64 {
        // Newton first; fall back to bisection where the slope flattens out.
        let mut s = x;
        for _ in 0..8 {
            let err = bezier(self.x1, self.x2, s) - x;
            if err.abs() < 1e-7 {
                return s;
            }
            let slope = bezier_slope(self.x1, self.x2, s);
            if slope.abs() < 1e-6 {
                break;
            }
            s -= err / slope;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        s = x;
        while hi - lo > 1e-7 {
            let value = bezier(self.x1, self.x2, s);
            if (value - x).abs() < 1e-7 {
                break;
            }
            if value < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) * 0.5;
        }
        s
    }
}

fn bezier(a1: f64, a2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * a1 + 3.0 * inv * s * s * a2 + s * s * s
}

fn bezier_slope(a1: f64, a2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * a1 + 6.0 * inv * s * (a2 - a1) + 3.0 * s * s * (1.0 - a2)
}

/// Moves `current` a fixed fraction of the way toward `target`.
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}
