use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use super::raf::RafScheduler;
use crate::anim::AnimationLoop;
use crate::error::FxError;
use crate::gradient::{entrance_at, GradientConfig, GradientOscillator};

/// Breathing gradient painted into a layer appended to `host`. The layer is
/// removed again on drop.
pub struct GradientSurface {
    layer: HtmlElement,
    _frames: AnimationLoop<RafScheduler>,
}

impl GradientSurface {
    pub fn mount(document: &Document, host: &HtmlElement, config: GradientConfig) -> Result<Self, FxError> {
        let layer: HtmlElement = document
            .create_element("div")?
            .dyn_into()
            .map_err(|_| FxError::Dom("created element is not an HtmlElement".into()))?;
        let style = layer.style();
        for (property, value) in [
            ("position", "absolute"),
            ("inset", "0"),
            ("pointer-events", "none"),
            ("z-index", "0"),
            ("opacity", "0"),
        ] {
            style.set_property(property, value)?;
        }
        layer.set_attribute("aria-hidden", "true")?;
        host.prepend_with_node_1(&layer)?;

        let final_opacity = config.opacity;
        let mut oscillator = GradientOscillator::new(config)?;
        let mut started: Option<f64> = None;
        let mut entered = false;
        let target = layer.clone();

        let frames = AnimationLoop::new(RafScheduler::new()?, move |timestamp| {
            oscillator.step();
            let style = target.style();
            if let Err(e) = style.set_property("background", &oscillator.css()) {
                log::debug!("gradient background rejected: {e:?}");
            }
            if entered {
                return;
            }
            let start = *started.get_or_insert(timestamp);
            let frame = entrance_at(timestamp - start, final_opacity);
            for (property, value) in [
                ("opacity", frame.opacity.to_string()),
                ("transform", format!("scale({})", frame.scale)),
            ] {
                if let Err(e) = style.set_property(property, &value) {
                    log::debug!("gradient {property} rejected: {e:?}");
                }
            }
            entered = frame.finished;
        });
        frames.start()?;

        Ok(Self {
            layer,
            _frames: frames,
        })
    }
}

impl Drop for GradientSurface {
    fn drop(&mut self) {
        self.layer.remove();
    }
}
