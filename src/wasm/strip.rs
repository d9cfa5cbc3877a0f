use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, FocusEvent, HtmlElement, Node};

use super::events::Listener;
use super::raf::{now_ms, RafScheduler};
use crate::anim::AnimationLoop;
use crate::error::FxError;
use crate::strip::{ExpandableStrip, StripConfig};

/// DOM nodes of one panel: the panel box, its image and its overlay.
struct PanelNodes {
    panel: HtmlElement,
    image: Option<HtmlElement>,
    overlay: Option<HtmlElement>,
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = element.style().set_property(property, value) {
        log::debug!("strip {property} rejected: {e:?}");
    }
}

fn child(panel: &Element, selector: &str) -> Result<Option<HtmlElement>, FxError> {
    Ok(panel
        .query_selector(selector)?
        .and_then(|e| e.dyn_into::<HtmlElement>().ok()))
}

/// Expanding strip bound to the `[data-fx-panel]` children of a host.
pub struct StripSurface {
    _listeners: Vec<Listener>,
    _frames: AnimationLoop<RafScheduler>,
}

impl StripSurface {
    pub fn mount(host: &HtmlElement, config: StripConfig) -> Result<Self, FxError> {
        let list = host.query_selector_all("[data-fx-panel]")?;
        let mut nodes = Vec::with_capacity(list.length() as usize);
        for i in 0..list.length() {
            let Some(panel) = list.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            nodes.push(PanelNodes {
                image: child(&panel, "img")?,
                overlay: child(&panel, "[data-fx-overlay]")?,
                panel,
            });
        }
        if nodes.is_empty() {
            return Err(FxError::Dom("strip has no [data-fx-panel] children".into()));
        }

        let strip = Rc::new(RefCell::new(ExpandableStrip::new(
            config,
            nodes.len(),
            f64::from(host.client_width()),
        )?));
        // Set by every interaction; cleared once the layout has settled.
        let dirty = Rc::new(Cell::new(true));

        let mut listeners = Vec::new();
        for (index, node) in nodes.iter().enumerate() {
            for kind in ["pointerenter", "focusin"] {
                let (s, d) = (Rc::clone(&strip), Rc::clone(&dirty));
                listeners.push(Listener::new(node.panel.as_ref(), kind, move |_| {
                    s.borrow_mut().hover(Some(index), now_ms());
                    d.set(true);
                })?);
            }
        }
        {
            let (s, d) = (Rc::clone(&strip), Rc::clone(&dirty));
            listeners.push(Listener::new(host.as_ref(), "pointerleave", move |_| {
                s.borrow_mut().leave(now_ms());
                d.set(true);
            })?);
        }
        {
            // Focus moving between panels stays inside the host.
            let (s, d, h) = (Rc::clone(&strip), Rc::clone(&dirty), host.clone());
            listeners.push(Listener::new(host.as_ref(), "focusout", move |event| {
                let next = event
                    .dyn_ref::<FocusEvent>()
                    .and_then(FocusEvent::related_target)
                    .and_then(|t| t.dyn_into::<Node>().ok());
                s.borrow_mut().focus_out(focus_stays_within(&h, next.as_ref()), now_ms());
                d.set(true);
            })?);
        }
        let window = web_sys::window().ok_or_else(|| FxError::Dom("no window".into()))?;
        {
            let (s, d, h) = (Rc::clone(&strip), Rc::clone(&dirty), host.clone());
            listeners.push(Listener::new(window.as_ref(), "resize", move |_| {
                s.borrow_mut().resize(f64::from(h.client_width()));
                d.set(true);
            })?);
        }

        let frames = AnimationLoop::new(RafScheduler::new()?, move |_| {
            if !dirty.get() {
                return;
            }
            let frame = strip.borrow().frame(now_ms());
            for (node, panel) in nodes.iter().zip(&frame.panels) {
                set_style(&node.panel, "flex", &format!("0 0 {:.2}px", panel.width));
                if let Some(image) = &node.image {
                    set_style(image, "transform", &format!("scale({:.4})", panel.zoom));
                }
                if let Some(overlay) = &node.overlay {
                    set_style(overlay, "opacity", &format!("{:.4}", panel.overlay));
                }
            }
            if frame.settled {
                dirty.set(false);
            }
        });
        frames.start()?;

        Ok(Self {
            _listeners: listeners,
            _frames: frames,
        })
    }
}

/// Whether focus leaving for `next` stays inside `host`. Focus leaving the
/// document has no related target.
fn focus_stays_within(host: &HtmlElement, next: Option<&Node>) -> bool {
    next.is_some_and(|node| host.contains(Some(node)))
}
