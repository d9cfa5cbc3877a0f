use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, Window};

use super::events::Listener;
use super::raf::{now_ms, RafScheduler};
use crate::anim::AnimationLoop;
use crate::error::FxError;
use crate::scroll::{page_progress, section_progress, Parallax, ParallaxConfig, Reveal, RevealConfig, Tracking};

fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0)
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = element.style().set_property(property, value) {
        log::debug!("{property} rejected: {e:?}");
    }
}

/// Listens for `scroll` and `resize` on the window, raising `dirty`.
fn watch_viewport(window: &Window, dirty: &Rc<Cell<bool>>) -> Result<Vec<Listener>, FxError> {
    ["scroll", "resize"]
        .into_iter()
        .map(|kind| {
            let d = Rc::clone(dirty);
            Listener::new(window.as_ref(), kind, move |_| d.set(true))
        })
        .collect()
}

/// Scroll-linked offset, fade and scale. The host is measured; the
/// transform lands on its `[data-fx-layer]` children, or on the host itself
/// when it tracks page scroll and has none.
pub struct ParallaxSurface {
    _listeners: Vec<Listener>,
    _frames: AnimationLoop<RafScheduler>,
}

impl ParallaxSurface {
    pub fn mount(host: &HtmlElement, config: ParallaxConfig) -> Result<Self, FxError> {
        let parallax = Parallax::new(config)?;
        let list = host.query_selector_all("[data-fx-layer]")?;
        let mut layers: Vec<HtmlElement> = (0..list.length())
            .filter_map(|i| list.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()))
            .collect();
        if layers.is_empty() {
            if parallax.tracking() == Tracking::Section {
                return Err(FxError::Dom("section parallax needs [data-fx-layer] children".into()));
            }
            layers.push(host.clone());
        }
        for layer in &layers {
            set_style(layer, "will-change", "transform, opacity");
        }

        let window = web_sys::window().ok_or_else(|| FxError::Dom("no window".into()))?;
        let dirty = Rc::new(Cell::new(true));
        let listeners = watch_viewport(&window, &dirty)?;

        let measured = host.clone();
        let frames = AnimationLoop::new(RafScheduler::new()?, move |_| {
            if !dirty.replace(false) {
                return;
            }
            let viewport = viewport_height(&window);
            let progress = match parallax.tracking() {
                Tracking::Page => {
                    let scroll_top = window.scroll_y().unwrap_or(0.0);
                    let scroll_height = window
                        .document()
                        .and_then(|d| d.document_element())
                        .map_or(0.0, |e| f64::from(e.scroll_height()));
                    page_progress(scroll_top, scroll_height, viewport)
                }
                Tracking::Section => {
                    let rect = measured.get_bounding_client_rect();
                    section_progress(rect.top(), rect.height(), viewport)
                }
            };
            let frame = parallax.frame(progress);
            let transform = frame.transform();
            let opacity = format!("{:.4}", frame.opacity);
            for layer in &layers {
                set_style(layer, "transform", &transform);
                set_style(layer, "opacity", &opacity);
            }
        });
        frames.start()?;

        Ok(Self {
            _listeners: listeners,
            _frames: frames,
        })
    }
}

/// Hides the host until it first scrolls into view, then plays its entrance
/// once.
pub struct RevealSurface {
    _listeners: Vec<Listener>,
    _frames: AnimationLoop<RafScheduler>,
}

impl RevealSurface {
    pub fn mount(host: &HtmlElement, config: RevealConfig) -> Result<Self, FxError> {
        let mut reveal = Reveal::new(config)?;
        let hidden = reveal.frame(now_ms());
        host.style().set_property("opacity", "0")?;
        host.style().set_property("transform", &hidden.transform())?;

        let window = web_sys::window().ok_or_else(|| FxError::Dom("no window".into()))?;
        let dirty = Rc::new(Cell::new(true));
        let listeners = watch_viewport(&window, &dirty)?;

        let target = host.clone();
        let mut finished = false;
        let frames = AnimationLoop::new(RafScheduler::new()?, move |timestamp| {
            if finished {
                return;
            }
            if dirty.replace(false) && !reveal.is_revealed() {
                let rect = target.get_bounding_client_rect();
                reveal.observe(rect.top(), rect.bottom(), viewport_height(&window), timestamp);
            }
            if !reveal.is_revealed() {
                return;
            }
            let frame = reveal.frame(timestamp);
            set_style(&target, "opacity", &format!("{:.4}", frame.opacity));
            set_style(&target, "transform", &frame.transform());
            if frame.finished {
                set_style(&target, "transform", "none");
                finished = true;
            }
        });
        frames.start()?;

        Ok(Self {
            _listeners: listeners,
            _frames: frames,
        })
    }
}
