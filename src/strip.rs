//! Hover-expanding image strip.
//!
//! Panels share a row; the hovered (or focused) panel grows to take the
//! surplus width while its siblings relax to their minimum. Changes animate
//! over a fixed duration with the CSS `ease` curve, and a new hover retargets
//! from wherever the previous transition currently is.

use serde::{Deserialize, Serialize};

use crate::anim::EASE;
use crate::config::{self, ComponentConfig};
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StripConfig {
    /// Minimum panel width in CSS pixels.
    pub min_width: f64,
    pub transition_ms: f64,
    /// Image zoom on the expanded panel.
    pub hover_zoom: f64,
    /// Darkening overlay opacity on the expanded panel.
    pub overlay_opacity: f64,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            min_width: 224.0,
            transition_ms: 500.0,
            hover_zoom: 1.05,
            overlay_opacity: 0.2,
        }
    }
}

impl ComponentConfig for StripConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        config::non_negative("minWidth", self.min_width)?;
        config::non_negative("transitionMs", self.transition_ms)?;
        config::positive("hoverZoom", self.hover_zoom)?;
        config::within("overlayOpacity", self.overlay_opacity, 0.0, 1.0)
    }

    fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" | "gallery" => Ok(Self::default()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// Resting widths for `panel_count` panels in a row of `container_width`.
///
/// With no hover every panel gets an equal share. With panel `hovered`
/// expanded, siblings shrink to `min_width` and the hovered panel takes the
/// rest; when the row cannot fit every panel at `min_width` the shares stay
/// equal. The result always sums to `container_width`.
pub fn compute_widths(
    panel_count: usize,
    hovered: Option<usize>,
    min_width: f64,
    container_width: f64,
) -> Vec<f64> {
    if panel_count == 0 {
        return Vec::new();
    }
    let container = container_width.max(0.0);
    let share = container / panel_count as f64;

    let Some(hovered) = hovered.filter(|&i| i < panel_count) else {
        return vec![share; panel_count];
    };
    if panel_count == 1 {
        return vec![container];
    }

    let siblings = (panel_count - 1) as f64;
    let expanded = (container - siblings * min_width.max(0.0)).max(share);
    let relaxed = (container - expanded) / siblings;

    (0..panel_count)
        .map(|i| if i == hovered { expanded } else { relaxed })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelFrame {
    pub width: f64,
    pub zoom: f64,
    pub overlay: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StripFrame {
    pub panels: Vec<PanelFrame>,
    /// True once the current transition has finished.
    pub settled: bool,
}

/// Animated layout of one strip.
#[derive(Clone, Debug)]
pub struct ExpandableStrip {
    config: StripConfig,
    container_width: f64,
    hovered: Option<usize>,
    transition: Transition,
}

#[derive(Clone, Debug)]
struct Transition {
    from: Vec<Panel>,
    to: Vec<Panel>,
    started_at: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Panel {
    width: f64,
    emphasis: f64,
}

impl ExpandableStrip {
    pub fn new(config: StripConfig, panel_count: usize, container_width: f64) -> Result<Self, ConfigError> {
        config.validate()?;
        let rest = resting(&config, panel_count, None, container_width);
        Ok(Self {
            config,
            container_width,
            hovered: None,
            transition: Transition {
                from: rest.clone(),
                to: rest,
                started_at: 0.0,
            },
        })
    }

    pub fn panel_count(&self) -> usize {
        self.transition.to.len()
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Expands `index` (or relaxes everything for `None`) starting at `now_ms`.
    /// Out-of-range indices are treated as no hover.
    pub fn hover(&mut self, index: Option<usize>, now_ms: f64) {
        let index = index.filter(|&i| i < self.panel_count());
        if index == self.hovered {
            return;
        }
        self.hovered = index;
        let current = self.panels_at(now_ms);
        self.transition = Transition {
            from: current,
            to: resting(&self.config, self.panel_count(), index, self.container_width),
            started_at: now_ms,
        };
    }

    pub fn leave(&mut self, now_ms: f64) {
        self.hover(None, now_ms);
    }

    /// Focus left a panel. Moving to another element inside the strip keeps
    /// the current expansion; the panel that gains focus retargets it.
    pub fn focus_out(&mut self, stays_within: bool, now_ms: f64) {
        if !stays_within {
            self.leave(now_ms);
        }
    }

    /// Jumps straight to the resting layout for a new container width.
    pub fn resize(&mut self, container_width: f64) {
        self.container_width = container_width;
        let rest = resting(&self.config, self.panel_count(), self.hovered, container_width);
        self.transition.from = rest.clone();
        self.transition.to = rest;
    }

    pub fn widths_at(&self, now_ms: f64) -> Vec<f64> {
        self.panels_at(now_ms).iter().map(|p| p.width).collect()
    }

    pub fn frame(&self, now_ms: f64) -> StripFrame {
        let zoom_gain = self.config.hover_zoom - 1.0;
        let panels = self
            .panels_at(now_ms)
            .into_iter()
            .map(|p| PanelFrame {
                width: p.width,
                zoom: 1.0 + zoom_gain * p.emphasis,
                overlay: self.config.overlay_opacity * p.emphasis,
            })
            .collect();
        StripFrame {
            panels,
            settled: self.progress(now_ms) >= 1.0,
        }
    }

    fn progress(&self, now_ms: f64) -> f64 {
        if self.config.transition_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.transition.started_at) / self.config.transition_ms).clamp(0.0, 1.0)
    }

    fn panels_at(&self, now_ms: f64) -> Vec<Panel> {
        let eased = EASE.apply(self.progress(now_ms));
        self.transition
            .from
            .iter()
            .zip(&self.transition.to)
            .map(|(from, to)| Panel {
                width: from.width + (to.width - from.width) * eased,
                emphasis: from.emphasis + (to.emphasis - from.emphasis) * eased,
            })
            .collect()
    }
}

fn resting(config: &StripConfig, panel_count: usize, hovered: Option<usize>, container_width: f64) -> Vec<Panel> {
    compute_widths(panel_count, hovered, config.min_width, container_width)
        .into_iter()
        .enumerate()
        .map(|(i, width)| Panel {
            width,
            emphasis: if Some(i) == hovered { 1.0 } else { 0.0 },
        })
        .collect()
}
