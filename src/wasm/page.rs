//! Mounts every `[data-fx]` host in the document.
//!
//! A host names its component in `data-fx` (`gradient`, `ripple`, `strip`,
//! `emblem`, `parallax` or `reveal`), may pick a preset with `data-fx-preset` and may override fields
//! with a JSON object in `data-fx-config`.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement};

use super::emblem::EmblemSurface;
use super::gradient::GradientSurface;
use super::ripple::RippleGridSurface;
use super::scroll::{ParallaxSurface, RevealSurface};
use super::strip::StripSurface;
use crate::config::ComponentConfig;
use crate::emblem::EmblemConfig;
use crate::error::FxError;
use crate::gradient::GradientConfig;
use crate::ripple::RippleGridConfig;
use crate::scroll::{ParallaxConfig, RevealConfig};
use crate::strip::StripConfig;

/// Canvas surfaces never render above this pixel ratio.
const MAX_PIXEL_RATIO: f64 = 2.0;

enum Effect {
    Gradient(GradientSurface),
    Ripple(RippleGridSurface),
    Strip(StripSurface),
    Emblem(EmblemSurface),
    Parallax(ParallaxSurface),
    Reveal(RevealSurface),
}

impl Effect {
    fn kind(&self) -> &'static str {
        match self {
            Effect::Gradient(_) => "gradient",
            Effect::Ripple(_) => "ripple",
            Effect::Strip(_) => "strip",
            Effect::Emblem(_) => "emblem",
            Effect::Parallax(_) => "parallax",
            Effect::Reveal(_) => "reveal",
        }
    }
}

/// Owns every effect mounted by [`mount_page`]. Dropping it, or calling
/// `teardown`, stops all loops and removes all listeners.
#[wasm_bindgen]
pub struct PageEffects {
    effects: Vec<Effect>,
}

#[wasm_bindgen]
impl PageEffects {
    /// Number of effects currently mounted.
    pub fn mounted(&self) -> usize {
        self.effects.len()
    }

    /// Names of the mounted effects, in document order.
    pub fn kinds(&self) -> Vec<String> {
        self.effects.iter().map(|e| e.kind().to_string()).collect()
    }

    pub fn teardown(&mut self) {
        let count = self.effects.len();
        self.effects.clear();
        log::debug!("tore down {count} effects");
    }
}

#[wasm_bindgen]
pub fn mount_page() -> Result<PageEffects, JsValue> {
    let window = web_sys::window().ok_or_else(|| FxError::Dom("no window".into()))?;
    let document = window.document().ok_or_else(|| FxError::Dom("no document".into()))?;
    let dpr = window.device_pixel_ratio().clamp(1.0, MAX_PIXEL_RATIO);

    let hosts = document.query_selector_all("[data-fx]")?;
    let mut effects = Vec::with_capacity(hosts.length() as usize);
    for i in 0..hosts.length() {
        let Some(host) = hosts.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        let kind = host.get_attribute("data-fx").unwrap_or_default();
        match mount_host(&document, &host, &kind, dpr) {
            Ok(effect) => effects.push(effect),
            Err(err) => log::warn!("skipping data-fx=\"{kind}\" host: {err}"),
        }
    }
    log::debug!("mounted {} of {} effect hosts", effects.len(), hosts.length());
    Ok(PageEffects { effects })
}

fn config_for<C: ComponentConfig>(host: &Element) -> Result<C, FxError> {
    let preset = host.get_attribute("data-fx-preset");
    let overrides = host.get_attribute("data-fx-config");
    Ok(C::resolve(preset.as_deref(), overrides.as_deref())?)
}

fn mount_host(document: &Document, host: &HtmlElement, kind: &str, dpr: f64) -> Result<Effect, FxError> {
    match kind {
        "gradient" => Ok(Effect::Gradient(GradientSurface::mount(
            document,
            host,
            config_for::<GradientConfig>(host)?,
        )?)),
        "ripple" => Ok(Effect::Ripple(RippleGridSurface::mount(
            canvas_for(document, host)?,
            config_for::<RippleGridConfig>(host)?,
            dpr,
        )?)),
        "strip" => Ok(Effect::Strip(StripSurface::mount(
            host,
            config_for::<StripConfig>(host)?,
        )?)),
        "emblem" => Ok(Effect::Emblem(EmblemSurface::mount(
            canvas_for(document, host)?,
            config_for::<EmblemConfig>(host)?,
            dpr,
        )?)),
        "parallax" => Ok(Effect::Parallax(ParallaxSurface::mount(
            host,
            config_for::<ParallaxConfig>(host)?,
        )?)),
        "reveal" => Ok(Effect::Reveal(RevealSurface::mount(
            host,
            config_for::<RevealConfig>(host)?,
        )?)),
        other => Err(FxError::Dom(format!("unknown effect \"{other}\""))),
    }
}

/// The host itself if it is a canvas, else its first canvas child, else a new
/// canvas laid behind the host's content and filling it edge to edge.
fn canvas_for(document: &Document, host: &HtmlElement) -> Result<HtmlCanvasElement, FxError> {
    if let Some(canvas) = host.dyn_ref::<HtmlCanvasElement>() {
        return Ok(canvas.clone());
    }
    if let Some(canvas) = host
        .query_selector("canvas")?
        .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
    {
        return Ok(canvas);
    }
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| FxError::Dom("created element is not a canvas".into()))?;
    let style = canvas.style();
    for (property, value) in [
        ("display", "block"),
        ("position", "absolute"),
        ("inset", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("z-index", "0"),
        ("pointer-events", "auto"),
    ] {
        style.set_property(property, value)?;
    }
    host.prepend_with_node_1(&canvas)?;
    Ok(canvas)
}
